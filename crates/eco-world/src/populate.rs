//! Initial placement of entities on an empty grid.

use crate::grid::Grid;
use eco_core::{Entity, Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Requested starting population
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Population {
    pub plants: usize,
    pub herbivores: usize,
    pub carnivores: usize,
}

impl Population {
    pub fn new(plants: usize, herbivores: usize, carnivores: usize) -> Self {
        Self {
            plants,
            herbivores,
            carnivores,
        }
    }

    /// Combined count; saturates rather than overflowing on absurd requests
    pub fn total(&self) -> usize {
        self.plants
            .saturating_add(self.herbivores)
            .saturating_add(self.carnivores)
    }

    /// Fails with `OverCapacity` when the request cannot fit in `capacity` cells.
    pub fn check_fits(&self, capacity: usize) -> Result<()> {
        let requested = self.total();
        if requested > capacity {
            return Err(Error::OverCapacity {
                requested,
                capacity,
            });
        }
        Ok(())
    }
}

/// Templates for freshly placed entities, one per species
#[derive(Debug, Clone, Copy)]
pub struct Newborns {
    pub plant: Entity,
    pub herbivore: Entity,
    pub carnivore: Entity,
}

/// Place `population` onto distinct empty cells chosen uniformly at random.
///
/// The empty cells are shuffled once and consumed in order, so placement never
/// retries. Nothing is written if the request does not fit.
pub fn populate<R: Rng + ?Sized>(
    grid: &mut Grid,
    population: Population,
    newborns: &Newborns,
    rng: &mut R,
) -> Result<()> {
    let mut free = grid.empty_positions();
    population.check_fits(free.len())?;

    free.shuffle(rng);

    let placements = std::iter::repeat(newborns.plant)
        .take(population.plants)
        .chain(std::iter::repeat(newborns.herbivore).take(population.herbivores))
        .chain(std::iter::repeat(newborns.carnivore).take(population.carnivores));

    for (pos, entity) in free.into_iter().zip(placements) {
        grid.set(pos, entity)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eco_core::{EntityKind, Position};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn newborns() -> Newborns {
        Newborns {
            plant: Entity::new(EntityKind::Plant, 0, 10),
            herbivore: Entity::new(EntityKind::Herbivore, 200, 50),
            carnivore: Entity::new(EntityKind::Carnivore, 200, 80),
        }
    }

    #[test]
    fn test_populate_exact_counts() {
        let mut grid = Grid::new(15);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        populate(&mut grid, Population::new(40, 20, 5), &newborns(), &mut rng).unwrap();

        let census = grid.census();
        assert_eq!(census.plants, 40);
        assert_eq!(census.herbivores, 20);
        assert_eq!(census.carnivores, 5);
        assert_eq!(census.empty, 225 - 65);
    }

    #[test]
    fn test_populate_full_grid() {
        let mut grid = Grid::new(15);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        populate(&mut grid, Population::new(225, 0, 0), &newborns(), &mut rng).unwrap();
        assert_eq!(grid.census().plants, 225);
    }

    #[test]
    fn test_over_capacity_leaves_grid_untouched() {
        let mut grid = Grid::new(15);
        grid.set(Position::new(3, 3), newborns().carnivore).unwrap();
        let before = grid.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let err = populate(&mut grid, Population::new(200, 20, 5), &newborns(), &mut rng)
            .unwrap_err();
        assert_eq!(
            err,
            Error::OverCapacity {
                requested: 225,
                capacity: 224
            }
        );
        assert_eq!(grid, before);
    }

    #[test]
    fn test_placed_entities_are_fresh() {
        let mut grid = Grid::new(5);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        populate(&mut grid, Population::new(3, 3, 3), &newborns(), &mut rng).unwrap();

        for (_, entity) in grid.iter() {
            match entity.kind {
                EntityKind::Plant => assert_eq!(*entity, newborns().plant),
                EntityKind::Herbivore => assert_eq!(*entity, newborns().herbivore),
                EntityKind::Carnivore => assert_eq!(*entity, newborns().carnivore),
                EntityKind::Empty => assert_eq!(*entity, Entity::EMPTY),
            }
        }
    }

    #[test]
    fn test_total_saturates() {
        let population = Population::new(usize::MAX, 1, 1);
        assert_eq!(population.total(), usize::MAX);
        assert!(population.check_fits(225).is_err());
    }

    proptest! {
        #[test]
        fn prop_populate_places_requested_counts(
            plants in 0usize..=100,
            herbivores in 0usize..=80,
            carnivores in 0usize..=45,
            seed in any::<u64>(),
        ) {
            let mut grid = Grid::new(15);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let population = Population::new(plants, herbivores, carnivores);
            populate(&mut grid, population, &newborns(), &mut rng).unwrap();

            let census = grid.census();
            prop_assert_eq!(census.plants, plants);
            prop_assert_eq!(census.herbivores, herbivores);
            prop_assert_eq!(census.carnivores, carnivores);
            prop_assert_eq!(census.total(), 225);
        }
    }
}
