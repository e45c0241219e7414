//! Configuration types for the simulation.
//!
//! Every default here is one of the simulation's fixed constants. The structs
//! exist so the constants travel together and can be checked once, up front.

use crate::error::{Error, Result};
use crate::types::{Color, Millis};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Inclusive range of milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalRange {
    pub min_ms: Millis,
    pub max_ms: Millis,
}

impl IntervalRange {
    pub fn new(min_ms: Millis, max_ms: Millis) -> Self {
        Self { min_ms, max_ms }
    }
}

/// Population dynamics parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Base cadence between spawn attempts
    pub generation_interval_ms: Millis,
    /// Divides the spawn cadence to speed up simulated time
    pub simulation_speed: i64,
    /// Probability that a spawn attempt produces an organism (0.0 to 1.0)
    pub generation_chance: f64,
    /// Hard ceiling on population size, enforced every tick
    pub population_cap: usize,
    /// Minimum age before an organism may reproduce
    pub reproduction_age_ms: Millis,
    /// Per-check randomized delay between deletion checks
    pub deletion_check_interval: IntervalRange,
    /// Deletion probability for an organism matching the background exactly
    pub base_deletion_chance: f64,
    /// Colour distance is divided by this before being added to the base chance
    pub color_distance_scale: f64,
    /// Spawned organisms land with x in [0, spawn_width]
    pub spawn_width: i32,
    /// Spawned organisms land with y in [0, spawn_height]
    pub spawn_height: i32,
    pub min_offspring_distance: i32,
    pub max_offspring_distance: i32,
    /// Maximum per-channel colour change between parent and offspring
    pub color_drift: i32,
    /// Side length of an organism's square when drawn
    pub organism_size: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            generation_interval_ms: 5000,
            simulation_speed: 100,
            generation_chance: 0.5,
            population_cap: 10_000,
            reproduction_age_ms: 10_000,
            deletion_check_interval: IntervalRange::new(1000, 3000),
            base_deletion_chance: 0.2,
            color_distance_scale: 1000.0,
            spawn_width: 1000,
            spawn_height: 2000,
            min_offspring_distance: 20,
            max_offspring_distance: 80,
            color_drift: 2,
            organism_size: 50,
        }
    }
}

impl SimulationConfig {
    /// Milliseconds between spawn attempts once the speed-up is applied
    pub fn spawn_cadence_ms(&self) -> Millis {
        self.generation_interval_ms / self.simulation_speed
    }

    /// Reject values that would stall or diverge the tick loop
    pub fn validate(&self) -> Result<()> {
        positive("generation_interval_ms", self.generation_interval_ms)?;
        positive("simulation_speed", self.simulation_speed)?;
        positive("reproduction_age_ms", self.reproduction_age_ms)?;
        probability("generation_chance", self.generation_chance)?;
        probability("base_deletion_chance", self.base_deletion_chance)?;

        positive("population_cap", self.population_cap as i64)?;

        let interval = self.deletion_check_interval;
        positive("deletion_check_interval.min_ms", interval.min_ms)?;
        if interval.min_ms > interval.max_ms {
            return Err(Error::Validation(format!(
                "deletion_check_interval min {} exceeds max {}",
                interval.min_ms, interval.max_ms
            )));
        }

        if !(self.color_distance_scale.is_finite() && self.color_distance_scale > 0.0) {
            return Err(Error::Validation(format!(
                "color_distance_scale must be positive, got {}",
                self.color_distance_scale
            )));
        }

        if self.spawn_width < 0 || self.spawn_height < 0 {
            return Err(Error::Validation(format!(
                "spawn area must not be negative, got {}x{}",
                self.spawn_width, self.spawn_height
            )));
        }

        positive("min_offspring_distance", self.min_offspring_distance as i64)?;
        if self.min_offspring_distance > self.max_offspring_distance {
            return Err(Error::Validation(format!(
                "offspring distance min {} exceeds max {}",
                self.min_offspring_distance, self.max_offspring_distance
            )));
        }

        if !(0..=255).contains(&self.color_drift) {
            return Err(Error::Validation(format!(
                "color_drift must lie in [0, 255], got {}",
                self.color_drift
            )));
        }

        positive("organism_size", self.organism_size as i64)?;

        Ok(())
    }
}

fn positive(name: &str, value: i64) -> Result<()> {
    if value <= 0 {
        return Err(Error::Validation(format!(
            "{} must be positive, got {}",
            name, value
        )));
    }
    Ok(())
}

fn probability(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::Validation(format!(
            "{} must lie in [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

/// Driver loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Target frame (and tick) rate
    pub frames_per_second: u32,
    /// Random seed; drawn from entropy when absent
    pub seed: Option<u64>,
    /// Stop after this many ticks
    pub max_ticks: Option<u64>,
    /// Log population metrics every N ticks
    pub report_every_ticks: u64,
    /// Advance the clock by a fixed frame step without sleeping
    pub fixed_step: bool,
    /// Write one JSON line per rendered frame to stdout
    pub emit_frames: bool,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub initial_background: Color,
    pub simulation: SimulationConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            frames_per_second: 60,
            seed: None,
            max_ticks: None,
            report_every_ticks: 600,
            fixed_step: false,
            emit_frames: false,
            canvas_width: 800,
            canvas_height: 600,
            initial_background: Color::WHITE,
            simulation: SimulationConfig::default(),
        }
    }
}

impl RunnerConfig {
    /// Parse a (possibly partial) JSON document over the defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RunnerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Clock advance per frame in fixed-step mode
    pub fn frame_step_ms(&self) -> Millis {
        1000 / self.frames_per_second as Millis
    }

    pub fn validate(&self) -> Result<()> {
        if self.frames_per_second == 0 || self.frames_per_second > 1000 {
            return Err(Error::Validation(format!(
                "frames_per_second must lie in [1, 1000], got {}",
                self.frames_per_second
            )));
        }

        positive("report_every_ticks", self.report_every_ticks as i64)?;

        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(Error::Validation(format!(
                "canvas must not be empty, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }

        self.simulation.validate()
    }
}
