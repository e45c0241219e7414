//! Organism state and the per-organism survival and reproduction rules.

use crate::rng::RandomSource;
use chroma_core::{Color, Millis, OrganismId, Position, SimulationConfig};
use serde::{Deserialize, Serialize};

/// A coloured square living on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organism {
    pub id: OrganismId,
    pub position: Position,
    pub color: Color,
    pub time_created_ms: Millis,
    /// When the last deletion check actually rolled
    pub last_checked_ms: Millis,
}

/// Position and colour of a child not yet placed in a population
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offspring {
    pub position: Position,
    pub color: Color,
}

impl Organism {
    pub fn new(id: OrganismId, position: Position, color: Color, now: Millis) -> Self {
        Self {
            id,
            position,
            color,
            time_created_ms: now,
            last_checked_ms: now,
        }
    }

    pub fn age_ms(&self, now: Millis) -> Millis {
        now.saturating_sub(self.time_created_ms)
    }

    pub fn is_mature(&self, now: Millis, config: &SimulationConfig) -> bool {
        self.age_ms(now) >= config.reproduction_age_ms
    }

    /// Roll for deletion against the current background.
    ///
    /// A fresh check interval is drawn on every call. Only once that much time
    /// has passed since the last roll does the organism roll again, recording
    /// `now` as the new check time whatever the outcome. The chance of deletion
    /// grows with the colour distance to the background.
    pub fn should_delete<R>(
        &mut self,
        environment: Color,
        now: Millis,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> bool
    where
        R: RandomSource + ?Sized,
    {
        let interval = config.deletion_check_interval;
        let wait = rng.int_inclusive(interval.min_ms, interval.max_ms);
        if now.saturating_sub(self.last_checked_ms) < wait {
            return false;
        }

        self.last_checked_ms = now;
        rng.unit() <= deletion_probability(self.color, environment, config)
    }

    /// Produce one child once the organism is old enough.
    ///
    /// There is no cooldown: a mature organism yields a child on every call.
    /// Only the population cap keeps that growth bounded.
    pub fn reproduce<R>(
        &self,
        now: Millis,
        config: &SimulationConfig,
        rng: &mut R,
    ) -> Option<Offspring>
    where
        R: RandomSource + ?Sized,
    {
        if !self.is_mature(now, config) {
            return None;
        }

        let distance = rng.int_inclusive(
            config.min_offspring_distance as i64,
            config.max_offspring_distance as i64,
        );
        let angle = rng.angle();
        let position = self.position.offset_polar(distance as f64, angle);

        let drift = config.color_drift as i64;
        let mut deltas = [0i32; 3];
        for delta in deltas.iter_mut() {
            *delta = rng.int_inclusive(-drift, drift) as i32;
        }

        Some(Offspring {
            position,
            color: self.color.shifted(deltas),
        })
    }

    /// Backdate creation so the organism may reproduce immediately
    pub fn force_maturity(&mut self, now: Millis, config: &SimulationConfig) {
        self.time_created_ms = now.saturating_sub(config.reproduction_age_ms);
    }
}

/// Chance that an organism of `color` is deleted when a check rolls
pub fn deletion_probability(color: Color, environment: Color, config: &SimulationConfig) -> f64 {
    config.base_deletion_chance + color.distance(&environment) as f64 / config.color_distance_scale
}
