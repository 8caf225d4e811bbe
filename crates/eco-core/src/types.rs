//! Core type definitions for the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What occupies a grid cell.
///
/// Serializes to the one-character symbol used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    #[serde(rename = " ")]
    Empty,
    #[serde(rename = "P")]
    Plant,
    #[serde(rename = "H")]
    Herbivore,
    #[serde(rename = "C")]
    Carnivore,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Empty => "empty",
            EntityKind::Plant => "plant",
            EntityKind::Herbivore => "herbivore",
            EntityKind::Carnivore => "carnivore",
        };
        write!(f, "{}", name)
    }
}

/// State of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub energy: i32,
    pub age: i32,
}

impl Entity {
    pub const EMPTY: Entity = Entity {
        kind: EntityKind::Empty,
        energy: 0,
        age: 0,
    };

    pub fn new(kind: EntityKind, energy: i32, age: i32) -> Self {
        Self { kind, energy, age }
    }

    pub fn is_empty(&self) -> bool {
        self.kind == EntityKind::Empty
    }

    pub fn is(&self, kind: EntityKind) -> bool {
        self.kind == kind
    }

    /// Decrement remaining age. Returns `true` if the entity expired.
    pub fn grow_older(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        self.age -= 1;
        if self.age <= 0 {
            *self = Entity::EMPTY;
            return true;
        }
        false
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// How a single cell is presented to callers of the engine.
pub type CellView = Entity;

/// Cell coordinate, zero-based, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Neighbouring position in `dir`, or `None` if it would leave a grid of
    /// the given side. There is no wraparound.
    pub fn step(&self, dir: Direction, side: usize) -> Option<Position> {
        let (dr, dc) = dir.to_delta();
        let row = self.row.checked_add_signed(dr)?;
        let col = self.col.checked_add_signed(dc)?;
        if row < side && col < side {
            Some(Position::new(row, col))
        } else {
            None
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The four orthogonal directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    /// (row, col) offset
    pub fn to_delta(&self) -> (isize, isize) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
            Direction::East => (0, 1),
        }
    }

    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::West,
            Direction::East,
        ]
    }
}

/// Row-major copy of the whole grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridSnapshot {
    pub rows: Vec<Vec<CellView>>,
}

impl GridSnapshot {
    pub fn side(&self) -> usize {
        self.rows.len()
    }

    pub fn cells(&self) -> impl Iterator<Item = &CellView> + '_ {
        self.rows.iter().flatten()
    }

    pub fn census(&self) -> Census {
        Census::from_cells(self.cells())
    }
}

/// Per-kind cell counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Census {
    pub empty: usize,
    pub plants: usize,
    pub herbivores: usize,
    pub carnivores: usize,
}

impl Census {
    pub fn from_cells<'a>(cells: impl IntoIterator<Item = &'a Entity>) -> Self {
        let mut census = Census::default();
        for cell in cells {
            census.record(cell.kind);
        }
        census
    }

    pub fn record(&mut self, kind: EntityKind) {
        match kind {
            EntityKind::Empty => self.empty += 1,
            EntityKind::Plant => self.plants += 1,
            EntityKind::Herbivore => self.herbivores += 1,
            EntityKind::Carnivore => self.carnivores += 1,
        }
    }

    /// Number of non-empty cells
    pub fn living(&self) -> usize {
        self.plants + self.herbivores + self.carnivores
    }

    pub fn total(&self) -> usize {
        self.empty + self.living()
    }
}
