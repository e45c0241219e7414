//! Simulation bundle: clock, population, step engine and randomness together.

use crate::clock::SimulationClock;
use crate::engine::StepEngine;
use crate::population::{Population, PopulationSnapshot};
use crate::rng::{RandomSource, SeededSource};
use chroma_core::{Color, ColorSummary, PopulationStats, Result, SimulationConfig, TickReport};
use tracing::{event, info, instrument, Level};

pub struct Simulation<R: RandomSource = SeededSource> {
    clock: SimulationClock,
    engine: StepEngine,
    population: Population,
    rng: R,
    stats: PopulationStats,
}

impl Simulation<SeededSource> {
    /// Seeded simulation; without a seed the generator draws from OS entropy
    pub fn new(config: SimulationConfig, seed: Option<u64>) -> Result<Self> {
        let rng = match seed {
            Some(seed) => SeededSource::new(seed),
            None => SeededSource::from_entropy(),
        };
        Self::with_source(config, rng)
    }
}

impl<R: RandomSource> Simulation<R> {
    pub fn with_source(config: SimulationConfig, rng: R) -> Result<Self> {
        let clock = SimulationClock::new();
        let engine = StepEngine::new(config, clock.now())?;

        Ok(Self {
            clock,
            engine,
            population: Population::new(),
            rng,
            stats: PopulationStats::new(),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        self.engine.config()
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn stats(&self) -> &PopulationStats {
        &self.stats
    }

    /// Source the driver can borrow for its own draws, e.g. a new background
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Advance the clock by `delta_ms`, then run one tick
    pub fn advance(&mut self, delta_ms: u64, environment: Color) -> TickReport {
        self.clock.advance(delta_ms);
        self.step(environment)
    }

    /// Run one tick at the current clock time
    pub fn step(&mut self, environment: Color) -> TickReport {
        let report = self.engine.tick(
            &mut self.population,
            self.clock.now(),
            environment,
            &mut self.rng,
        );
        self.stats.record(&report);
        report
    }

    /// Run `ticks` fixed-size steps against an unchanging background
    #[instrument(skip(self), fields(population = self.population.len()))]
    pub fn run_for(&mut self, ticks: u64, step_ms: u64, environment: Color) -> TickReport {
        let mut last = TickReport {
            population: self.population.len(),
            ..Default::default()
        };
        for _ in 0..ticks {
            last = self.advance(step_ms, environment);
        }
        last
    }

    pub fn snapshot(&self) -> PopulationSnapshot {
        self.population.snapshot(self.config().organism_size)
    }

    pub fn color_summary(&self, environment: Color) -> Option<ColorSummary> {
        ColorSummary::from_colors(self.population.iter().map(|o| o.color), environment)
    }

    /// Log a point-in-time view of the population
    pub fn emit_population_metrics(&self, environment: Color) {
        let summary = self.color_summary(environment);
        let mean_color = summary
            .map(|s| s.mean_color.to_string())
            .unwrap_or_default();
        let mean_distance = summary.map(|s| s.mean_distance).unwrap_or(0.0);

        info!(
            event = "population_metrics",
            tick = self.stats.ticks,
            now_ms = self.clock.now(),
            total_population = self.population.len(),
            peak_population = self.stats.peak_population,
            background = %environment,
            mean_color = %mean_color,
            mean_distance = mean_distance,
            total_spawned = self.stats.total_spawned,
            total_born = self.stats.total_born,
            total_deleted = self.stats.total_deleted,
            total_culled = self.stats.total_culled,
            "Population metrics snapshot"
        );

        event!(
            Level::INFO,
            gauge_name = "population_total",
            gauge_value = self.population.len(),
            tick = self.stats.ticks,
            "Population gauge"
        );
    }

    /// Log cumulative statistics for the whole run
    pub fn emit_summary(&self) {
        info!(
            event = "run_summary",
            total_ticks = self.stats.ticks,
            final_time_ms = self.clock.now(),
            final_population = self.population.len(),
            peak_population = self.stats.peak_population,
            spawn_attempts = self.stats.spawn_attempts,
            spawn_success_rate = format!("{:.2}%", self.stats.spawn_success_rate() * 100.0),
            total_spawned = self.stats.total_spawned,
            total_born = self.stats.total_born,
            total_deleted = self.stats.total_deleted,
            total_culled = self.stats.total_culled,
            capped_ticks = self.stats.capped_ticks,
            "Simulation finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_creation() {
        let sim = Simulation::new(SimulationConfig::default(), Some(42)).unwrap();
        assert!(sim.population().is_empty());
        assert_eq!(sim.clock().now(), 0);
        assert_eq!(sim.stats().ticks, 0);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = SimulationConfig {
            population_cap: 0,
            ..Default::default()
        };
        assert!(Simulation::new(config, Some(1)).is_err());
    }

    #[test]
    fn test_advance_moves_clock_and_records() {
        let config = SimulationConfig {
            generation_chance: 1.0,
            ..Default::default()
        };
        let mut sim = Simulation::new(config, Some(42)).unwrap();

        let report = sim.advance(50, Color::WHITE);
        assert_eq!(sim.clock().now(), 50);
        assert!(report.spawned);
        assert_eq!(sim.stats().ticks, 1);
        assert_eq!(sim.stats().total_spawned, 1);
        assert_eq!(sim.snapshot().len(), 1);
    }

    #[test]
    fn test_population_grows_then_caps() {
        // deletion effectively off, so growth is guaranteed once spawns mature
        let config = SimulationConfig {
            population_cap: 200,
            base_deletion_chance: 0.0,
            color_distance_scale: 1.0e9,
            ..Default::default()
        };
        let mut sim = Simulation::new(config, Some(7)).unwrap();

        // 30 simulated seconds at 60 frames per second
        let last = sim.run_for(1800, 16, Color::WHITE);
        assert_eq!(sim.clock().now(), 1800 * 16);
        assert_eq!(last.population, 200);
        assert!(sim.stats().peak_population <= 200);
        assert!(sim.stats().total_born > 0);
        assert!(sim.stats().total_spawned > 0);
    }

    #[test]
    fn test_color_summary_tracks_population() {
        let mut sim = Simulation::new(SimulationConfig::default(), Some(3)).unwrap();
        assert!(sim.color_summary(Color::WHITE).is_none());

        sim.run_for(100, 16, Color::WHITE);
        if !sim.population().is_empty() {
            let summary = sim.color_summary(Color::WHITE).unwrap();
            assert!(summary.mean_distance <= 765.0);
        }
    }
}
