//! Core types and utilities for the Eco-Sim predator–prey ecosystem.

pub mod types;
pub mod config;
pub mod error;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
