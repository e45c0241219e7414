//! The population store: every live organism, in no particular order.

use crate::organism::Organism;
use crate::rng::RandomSource;
use chroma_core::{Color, Millis, OrganismId, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct Population {
    organisms: Vec<Organism>,
    next_id: u64,
}

impl Population {
    /// An empty population
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.organisms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.organisms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Organism> + '_ {
        self.organisms.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Organism> + '_ {
        self.organisms.iter_mut()
    }

    pub fn get(&self, id: OrganismId) -> Option<&Organism> {
        self.organisms.iter().find(|o| o.id == id)
    }

    pub fn contains(&self, id: OrganismId) -> bool {
        self.get(id).is_some()
    }

    /// Create an organism with a fresh id and add it
    pub fn spawn(&mut self, position: Position, color: Color, now: Millis) -> OrganismId {
        let id = OrganismId(self.next_id);
        self.organisms.push(Organism::new(id, position, color, now));
        self.next_id += 1;
        id
    }

    /// Add an organism built elsewhere. An organism whose id is already
    /// present replaces the existing one.
    pub fn insert(&mut self, organism: Organism) {
        self.next_id = self.next_id.max(organism.id.0.saturating_add(1));
        match self.organisms.iter_mut().find(|o| o.id == organism.id) {
            Some(existing) => *existing = organism,
            None => self.organisms.push(organism),
        }
    }

    /// Remove every organism whose id is in `ids`, returning how many went
    pub fn remove_all(&mut self, ids: &HashSet<OrganismId>) -> usize {
        if ids.is_empty() {
            return 0;
        }
        let before = self.organisms.len();
        self.organisms.retain(|o| !ids.contains(&o.id));
        before - self.organisms.len()
    }

    /// Remove `n` distinct organisms chosen uniformly at random.
    /// Asking for at least as many as exist clears the store.
    pub fn remove_random<R>(&mut self, n: usize, rng: &mut R) -> Vec<Organism>
    where
        R: RandomSource + ?Sized,
    {
        if n >= self.organisms.len() {
            return std::mem::take(&mut self.organisms);
        }

        // Partial Fisher-Yates: the last `n` slots end up holding a uniform
        // sample without replacement.
        let len = self.organisms.len();
        for i in 0..n {
            let last = len - 1 - i;
            let pick = rng.index(last + 1);
            self.organisms.swap(pick, last);
        }
        self.organisms.split_off(len - n)
    }

    /// Trim the population down to `max_size`, returning the organisms removed
    pub fn enforce_cap<R>(&mut self, max_size: usize, rng: &mut R) -> Vec<Organism>
    where
        R: RandomSource + ?Sized,
    {
        if self.organisms.len() <= max_size {
            return Vec::new();
        }

        let excess = self.organisms.len() - max_size;
        let removed = self.remove_random(excess, rng);
        debug!(
            event = "population_capped",
            removed = removed.len(),
            cap = max_size,
            "Population exceeded cap"
        );
        removed
    }

    /// Read-only copy of what a renderer needs to draw
    pub fn snapshot(&self, size: u32) -> PopulationSnapshot {
        PopulationSnapshot {
            organisms: self
                .organisms
                .iter()
                .map(|o| OrganismView {
                    id: o.id,
                    x: o.position.x,
                    y: o.position.y,
                    width: size,
                    height: size,
                    color: o.color,
                })
                .collect(),
        }
    }
}

/// A drawable organism
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganismView {
    pub id: OrganismId,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub color: Color,
}

/// The population as seen between ticks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub organisms: Vec<OrganismView>,
}

impl PopulationSnapshot {
    pub fn len(&self) -> usize {
        self.organisms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.organisms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::testing::ForcedSource;
    use crate::rng::SeededSource;
    use proptest::prelude::*;

    fn populated(n: usize) -> Population {
        let mut population = Population::new();
        for i in 0..n {
            population.spawn(Position::new(i as i32, 0), Color::BLACK, 0);
        }
        population
    }

    #[test]
    fn test_new_population_is_empty() {
        let population = Population::new();
        assert!(population.is_empty());
        assert_eq!(population.len(), 0);
    }

    #[test]
    fn test_spawn_issues_unique_ids() {
        let population = populated(10);
        let ids: HashSet<OrganismId> = population.iter().map(|o| o.id).collect();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn test_insert_and_get() {
        let mut population = populated(2);
        let organism = Organism::new(OrganismId(41), Position::new(1, 1), Color::WHITE, 5);
        population.insert(organism.clone());

        assert_eq!(population.len(), 3);
        assert_eq!(population.get(OrganismId(41)), Some(&organism));

        // ids keep counting past inserted organisms
        let id = population.spawn(Position::new(0, 0), Color::BLACK, 5);
        assert_eq!(id, OrganismId(42));
    }

    #[test]
    fn test_insert_replaces_same_id() {
        let mut population = populated(1);
        let id = population.iter().next().unwrap().id;
        population.insert(Organism::new(id, Position::new(9, 9), Color::WHITE, 0));

        assert_eq!(population.len(), 1);
        assert_eq!(population.get(id).unwrap().color, Color::WHITE);
    }

    #[test]
    fn test_remove_all() {
        let mut population = populated(5);
        let ids: HashSet<OrganismId> = [OrganismId(1), OrganismId(3), OrganismId(99)].into();

        assert_eq!(population.remove_all(&ids), 2);
        assert_eq!(population.len(), 3);
        assert!(!population.contains(OrganismId(1)));
        assert!(population.contains(OrganismId(0)));
    }

    #[test]
    fn test_remove_random_clears_when_asked_for_everything() {
        let mut population = populated(4);
        let removed = population.remove_random(10, &mut ForcedSource::always());
        assert_eq!(removed.len(), 4);
        assert!(population.is_empty());
    }

    #[test]
    fn test_remove_random_picks_distinct_organisms() {
        let mut population = populated(200);
        let mut rng = SeededSource::new(42);

        let removed = population.remove_random(150, &mut rng);
        let removed_ids: HashSet<OrganismId> = removed.iter().map(|o| o.id).collect();
        assert_eq!(removed_ids.len(), 150);
        assert_eq!(population.len(), 50);
    }

    #[test]
    fn test_enforce_cap_scenario() {
        let mut population = populated(10_050);
        let before: HashSet<OrganismId> = population.iter().map(|o| o.id).collect();
        let mut rng = SeededSource::new(42);

        let removed = population.enforce_cap(10_000, &mut rng);
        let removed_ids: HashSet<OrganismId> = removed.iter().map(|o| o.id).collect();
        assert_eq!(removed.len(), 50);
        assert_eq!(removed_ids.len(), 50);

        let remaining: HashSet<OrganismId> = population.iter().map(|o| o.id).collect();
        assert_eq!(remaining.len(), 10_000);
        assert!(remaining.is_disjoint(&removed_ids));
        assert_eq!(&remaining | &removed_ids, before);
    }

    #[test]
    fn test_enforce_cap() {
        let mut population = populated(10_050);
        let mut rng = SeededSource::new(1);

        assert_eq!(population.enforce_cap(10_000, &mut rng).len(), 50);
        assert_eq!(population.len(), 10_000);
        assert!(population.enforce_cap(10_000, &mut rng).is_empty());
    }

    #[test]
    fn test_insert_with_max_id_does_not_overflow() {
        let mut population = Population::new();
        let organism = Organism::new(OrganismId(u64::MAX), Position::new(0, 0), Color::WHITE, 0);

        population.insert(organism);
        assert!(population.contains(OrganismId(u64::MAX)));
        assert_eq!(population.len(), 1);
    }

    #[test]
    fn test_snapshot() {
        let population = populated(3);
        let snapshot = population.snapshot(50);

        assert_eq!(snapshot.len(), 3);
        assert!(snapshot.organisms.iter().all(|v| v.width == 50 && v.height == 50));
        assert_eq!(snapshot.organisms[2].x, 2);
    }

    proptest! {
        #[test]
        fn proptest_cap_holds(size in 0usize..300, cap in 1usize..200, seed in any::<u64>()) {
            let mut population = populated(size);
            let mut rng = SeededSource::new(seed);
            let removed = population.enforce_cap(cap, &mut rng);

            prop_assert!(population.len() <= cap);
            prop_assert_eq!(population.len() + removed.len(), size);
        }
    }
}
