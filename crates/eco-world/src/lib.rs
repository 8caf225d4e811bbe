//! World simulation engine.
//!
//! This module implements the bounded 2D grid where plants grow, herbivores
//! graze and carnivores hunt, advanced one tick at a time.

pub mod grid;
pub mod neighbors;
pub mod actions;
pub mod populate;
pub mod simulation;

pub use grid::Grid;
pub use actions::ActionOutcome;
pub use populate::Population;
pub use simulation::{Ecosystem, TickReport};
