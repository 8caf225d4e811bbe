//! Neighbour resolution shared by every spatial action.
//!
//! Candidates are the in-bounds orthogonal neighbours of a cell that satisfy a
//! predicate; one of them is then picked uniformly at random. Every action
//! (move, eat, reproduce, grow) goes through here so no direction is favoured.

use crate::grid::Grid;
use eco_core::{Direction, Entity, Position};
use rand::seq::SliceRandom;
use rand::Rng;

/// Neighbours of `pos` whose entity satisfies `predicate`, in N, S, W, E order.
pub fn candidates<P>(grid: &Grid, pos: Position, predicate: P) -> Vec<Position>
where
    P: Fn(&Entity) -> bool,
{
    Direction::all()
        .into_iter()
        .filter_map(|dir| pos.step(dir, grid.side()))
        .filter(|neighbor| {
            grid.get(*neighbor)
                .map(|entity| predicate(entity))
                .unwrap_or(false)
        })
        .collect()
}

/// Uniformly pick one candidate. `None` means there is no eligible target.
pub fn choose_one<R: Rng + ?Sized>(candidates: &[Position], rng: &mut R) -> Option<Position> {
    candidates.choose(rng).copied()
}

/// [`candidates`] followed by [`choose_one`].
pub fn pick_neighbor<P, R>(
    grid: &Grid,
    pos: Position,
    predicate: P,
    rng: &mut R,
) -> Option<Position>
where
    P: Fn(&Entity) -> bool,
    R: Rng + ?Sized,
{
    choose_one(&candidates(grid, pos, predicate), rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eco_core::EntityKind;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashMap;

    fn plant() -> Entity {
        Entity::new(EntityKind::Plant, 0, 10)
    }

    #[test]
    fn test_interior_cell_has_four_neighbors() {
        let grid = Grid::new(5);
        let found = candidates(&grid, Position::new(2, 2), Entity::is_empty);
        assert_eq!(
            found,
            vec![
                Position::new(1, 2),
                Position::new(3, 2),
                Position::new(2, 1),
                Position::new(2, 3),
            ]
        );
    }

    #[test]
    fn test_corner_has_two_neighbors() {
        let grid = Grid::new(5);
        let found = candidates(&grid, Position::new(0, 0), Entity::is_empty);
        assert_eq!(found, vec![Position::new(1, 0), Position::new(0, 1)]);

        let found = candidates(&grid, Position::new(4, 4), Entity::is_empty);
        assert_eq!(found, vec![Position::new(3, 4), Position::new(4, 3)]);
    }

    #[test]
    fn test_predicate_filters() {
        let mut grid = Grid::new(3);
        grid.set(Position::new(0, 1), plant()).unwrap();
        grid.set(Position::new(1, 0), plant()).unwrap();
        // Diagonal, never a candidate
        grid.set(Position::new(0, 0), plant()).unwrap();

        let plants = candidates(&grid, Position::new(1, 1), |e| e.is(EntityKind::Plant));
        assert_eq!(plants, vec![Position::new(0, 1), Position::new(1, 0)]);

        let empty = candidates(&grid, Position::new(1, 1), Entity::is_empty);
        assert_eq!(empty, vec![Position::new(2, 1), Position::new(1, 2)]);
    }

    #[test]
    fn test_choose_one_empty_is_none() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(choose_one(&[], &mut rng), None);

        let mut grid = Grid::new(1);
        grid.set(Position::new(0, 0), plant()).unwrap();
        assert_eq!(
            pick_neighbor(&grid, Position::new(0, 0), Entity::is_empty, &mut rng),
            None
        );
    }

    #[test]
    fn test_choice_is_unbiased() {
        let grid = Grid::new(3);
        let center = Position::new(1, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut counts: HashMap<Position, u32> = HashMap::new();

        for _ in 0..4000 {
            let picked = pick_neighbor(&grid, center, Entity::is_empty, &mut rng).unwrap();
            *counts.entry(picked).or_default() += 1;
        }

        assert_eq!(counts.len(), 4);
        for (_, count) in counts {
            // Expected 1000 each
            assert!((850..=1150).contains(&count), "count {count} out of range");
        }
    }
}
