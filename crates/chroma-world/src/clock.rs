//! Virtual millisecond clock driving every time-relative decision.
//!
//! The clock only moves forward. The driver advances it between ticks; the
//! step engine and organisms only ever read [`SimulationClock::now`].

use chroma_core::{Error, Millis, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationClock {
    now_ms: Millis,
}

impl SimulationClock {
    /// A clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Millis {
        self.now_ms
    }

    /// Move the clock forward by `delta_ms`
    pub fn advance(&mut self, delta_ms: u64) -> Millis {
        let delta = Millis::try_from(delta_ms).unwrap_or(Millis::MAX);
        self.now_ms = self.now_ms.saturating_add(delta);
        self.now_ms
    }

    /// Jump to an absolute time, which must not be in the past
    pub fn advance_to(&mut self, now_ms: Millis) -> Result<()> {
        if now_ms < self.now_ms {
            return Err(Error::InvalidState(format!(
                "clock cannot move backwards from {} to {}",
                self.now_ms, now_ms
            )));
        }
        self.now_ms = now_ms;
        Ok(())
    }
}
