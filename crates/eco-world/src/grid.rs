//! 2D grid for the world.

use eco_core::{Census, Entity, EntityKind, Error, GridSnapshot, Position, Result};
use serde::{Deserialize, Serialize};

/// A fixed-size square grid, bounded on every side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    side: usize,
    cells: Vec<Entity>,
}

impl Grid {
    pub fn new(side: usize) -> Self {
        Self {
            side,
            cells: vec![Entity::EMPTY; side * side],
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// Total number of cells
    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.side && pos.col < self.side
    }

    /// Get entity at position
    pub fn get(&self, pos: Position) -> Result<&Entity> {
        let index = self.pos_to_index(pos)?;
        Ok(&self.cells[index])
    }

    /// Get mutable entity at position
    pub fn get_mut(&mut self, pos: Position) -> Result<&mut Entity> {
        let index = self.pos_to_index(pos)?;
        Ok(&mut self.cells[index])
    }

    /// Set entity at position
    pub fn set(&mut self, pos: Position, entity: Entity) -> Result<()> {
        *self.get_mut(pos)? = entity;
        Ok(())
    }

    /// Reset the cell at `pos` to empty
    pub fn clear_cell(&mut self, pos: Position) -> Result<()> {
        self.set(pos, Entity::EMPTY)
    }

    /// Reset every cell to empty
    pub fn clear(&mut self) {
        self.cells.fill(Entity::EMPTY);
    }

    pub fn kind_at(&self, pos: Position) -> Result<EntityKind> {
        Ok(self.get(pos)?.kind)
    }

    fn pos_to_index(&self, pos: Position) -> Result<usize> {
        if !self.contains(pos) {
            return Err(Error::InvalidCoordinate {
                row: pos.row,
                col: pos.col,
                side: self.side,
            });
        }
        Ok(pos.row * self.side + pos.col)
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        Position::new(index / self.side, index % self.side)
    }

    /// Iterator over all entities with positions, row-major
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Entity)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, entity)| (self.index_to_pos(i), entity))
    }

    /// Mutable iterator over all entities, row-major
    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> + '_ {
        self.cells.iter_mut()
    }

    /// Positions of all empty cells, row-major
    pub fn empty_positions(&self) -> Vec<Position> {
        self.iter()
            .filter(|(_, entity)| entity.is_empty())
            .map(|(pos, _)| pos)
            .collect()
    }

    pub fn census(&self) -> Census {
        Census::from_cells(&self.cells)
    }

    pub fn is_barren(&self) -> bool {
        self.cells.iter().all(Entity::is_empty)
    }

    pub fn snapshot(&self) -> GridSnapshot {
        if self.side == 0 {
            return GridSnapshot { rows: Vec::new() };
        }
        GridSnapshot {
            rows: self.cells.chunks(self.side).map(<[Entity]>::to_vec).collect(),
        }
    }
}
