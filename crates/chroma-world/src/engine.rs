//! The step engine: one discrete tick of population dynamics.

use crate::organism::Offspring;
use crate::population::Population;
use crate::rng::RandomSource;
use chroma_core::{Color, Millis, OrganismId, Position, Result, SimulationConfig, TickReport};
use std::collections::HashSet;
use tracing::{debug, trace};

/// Holds the spawn cadence state between ticks. Everything else a tick
/// needs is passed in.
#[derive(Debug, Clone)]
pub struct StepEngine {
    config: SimulationConfig,
    last_spawn_ms: Millis,
}

impl StepEngine {
    /// Validate `config` and start the spawn cadence at `now`
    pub fn new(config: SimulationConfig, now: Millis) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            last_spawn_ms: now,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn last_spawn_ms(&self) -> Millis {
        self.last_spawn_ms
    }

    /// Run one tick at time `now` against the given background.
    ///
    /// Deletion checks and reproduction both run for every organism present
    /// after the spawn step, even one marked for deletion. A freshly spawned
    /// organism is too young for either to fire. Removals and
    /// births are applied only after that pass, so children are first
    /// evaluated on the following tick. The cap is enforced last.
    pub fn tick<R>(
        &mut self,
        population: &mut Population,
        now: Millis,
        environment: Color,
        rng: &mut R,
    ) -> TickReport
    where
        R: RandomSource + ?Sized,
    {
        let mut report = TickReport::default();

        if now.saturating_sub(self.last_spawn_ms) >= self.config.spawn_cadence_ms() {
            self.last_spawn_ms = now;
            report.spawn_attempted = true;
            if rng.unit() <= self.config.generation_chance {
                let (position, color) = self.random_organism(rng);
                let id = population.spawn(position, color, now);
                report.spawned = true;
                trace!(
                    event = "organism_spawned",
                    organism_id = %id,
                    x = position.x,
                    y = position.y,
                    color = %color,
                    now = now,
                    "Spawned organism"
                );
            }
        }

        let mut doomed: HashSet<OrganismId> = HashSet::new();
        let mut offspring: Vec<Offspring> = Vec::new();

        for organism in population.iter_mut() {
            if organism.should_delete(environment, now, &self.config, rng) {
                doomed.insert(organism.id);
            }
            if let Some(child) = organism.reproduce(now, &self.config, rng) {
                offspring.push(child);
            }
        }

        report.deleted = population.remove_all(&doomed);
        report.born = offspring.len();
        for child in offspring {
            population.spawn(child.position, child.color, now);
        }

        report.culled = population
            .enforce_cap(self.config.population_cap, rng)
            .len();
        report.population = population.len();

        if report.deleted > 0 || report.born > 0 {
            debug!(
                event = "tick_changes",
                now = now,
                deleted = report.deleted,
                born = report.born,
                culled = report.culled,
                population = report.population,
                "Population changed"
            );
        }

        report
    }

    fn random_organism<R>(&self, rng: &mut R) -> (Position, Color)
    where
        R: RandomSource + ?Sized,
    {
        let x = rng.int_inclusive(0, self.config.spawn_width as i64) as i32;
        let y = rng.int_inclusive(0, self.config.spawn_height as i64) as i32;
        (Position::new(x, y), random_color(rng))
    }
}

/// A colour with every channel uniform in [0, 255]
pub fn random_color<R>(rng: &mut R) -> Color
where
    R: RandomSource + ?Sized,
{
    let mut channels = [0u8; 3];
    for channel in channels.iter_mut() {
        *channel = rng.int_inclusive(0, 255) as u8;
    }
    Color::from_channels(channels)
}
