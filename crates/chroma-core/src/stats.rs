//! Per-tick and cumulative population statistics.

use crate::types::Color;
use serde::{Deserialize, Serialize};

/// What happened during a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Whether a spawn attempt was made this tick
    pub spawn_attempted: bool,
    /// Whether that attempt produced an organism
    pub spawned: bool,
    /// Organisms removed by a failed deletion check
    pub deleted: usize,
    /// Offspring inserted
    pub born: usize,
    /// Organisms removed by cap enforcement
    pub culled: usize,
    /// Population size after the tick
    pub population: usize,
}

/// Running totals over a whole run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PopulationStats {
    pub ticks: u64,
    pub spawn_attempts: u64,
    pub total_spawned: u64,
    pub total_born: u64,
    pub total_deleted: u64,
    pub total_culled: u64,
    pub peak_population: usize,
    /// Ticks on which the cap had to remove organisms
    pub capped_ticks: u64,
}

impl PopulationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        if report.spawn_attempted {
            self.spawn_attempts += 1;
        }
        if report.spawned {
            self.total_spawned += 1;
        }
        self.total_born += report.born as u64;
        self.total_deleted += report.deleted as u64;
        self.total_culled += report.culled as u64;
        if report.culled > 0 {
            self.capped_ticks += 1;
        }
        self.peak_population = self.peak_population.max(report.population);
    }

    /// Fraction of spawn attempts that produced an organism
    pub fn spawn_success_rate(&self) -> f64 {
        if self.spawn_attempts == 0 {
            0.0
        } else {
            self.total_spawned as f64 / self.spawn_attempts as f64
        }
    }
}

/// Colour make-up of a population relative to the background
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorSummary {
    pub mean_color: Color,
    /// Mean colour distance to the background (0..=765)
    pub mean_distance: f64,
    pub min_distance: u32,
    pub max_distance: u32,
}

impl ColorSummary {
    /// Summarize a set of colours against a background; `None` when empty
    pub fn from_colors<I>(colors: I, background: Color) -> Option<Self>
    where
        I: IntoIterator<Item = Color>,
    {
        let mut count = 0u64;
        let mut sums = [0u64; 3];
        let mut distance_sum = 0u64;
        let mut min_distance = u32::MAX;
        let mut max_distance = 0;

        for color in colors {
            count += 1;
            for (sum, channel) in sums.iter_mut().zip(color.channels()) {
                *sum += channel as u64;
            }
            let distance = color.distance(&background);
            distance_sum += distance as u64;
            min_distance = min_distance.min(distance);
            max_distance = max_distance.max(distance);
        }

        if count == 0 {
            return None;
        }

        let mean = |sum: u64| (sum / count) as u8;
        Some(Self {
            mean_color: Color::new(mean(sums[0]), mean(sums[1]), mean(sums[2])),
            mean_distance: distance_sum as f64 / count as f64,
            min_distance,
            max_distance,
        })
    }
}
