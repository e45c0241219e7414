//! Population dynamics engine.
//!
//! Coloured squares spawn at random, reproduce once mature and are culled at a
//! rate that grows with their distance from the background colour. The crate
//! holds the rules; drawing and input are left to the driver.

pub mod clock;
pub mod engine;
pub mod organism;
pub mod population;
pub mod rng;
pub mod simulation;

pub use clock::SimulationClock;
pub use engine::{random_color, StepEngine};
pub use organism::{deletion_probability, Offspring, Organism};
pub use population::{OrganismView, Population, PopulationSnapshot};
pub use rng::{RandomSource, SeededSource};
pub use simulation::Simulation;
