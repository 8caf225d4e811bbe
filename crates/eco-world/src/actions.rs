//! Action primitives applied to a single cell.
//!
//! Each primitive mutates the grid in place and reports what happened. Finding
//! no eligible neighbour is a normal outcome, not an error; only an
//! out-of-bounds position produces `Err`.

use crate::grid::Grid;
use crate::neighbors::pick_neighbor;
use eco_core::{Entity, EntityKind, Position, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Result of applying one primitive to one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Moved { from: Position, to: Position },
    /// The move cost used up the last of the mover's energy.
    Starved { at: Position },
    Ate { prey_at: Position },
    Reproduced { child_at: Position, parent_died: bool },
    Grew { at: Position },
    /// No neighbour satisfied the action's target predicate.
    NoTarget,
    /// A precondition failed (empty cell, not enough energy).
    Skipped,
}

impl ActionOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, ActionOutcome::NoTarget | ActionOutcome::Skipped)
    }
}

/// Move the entity at `pos` into a random empty neighbour, paying `cost`.
///
/// A mover with less energy than `cost` stays put. A mover left with exactly
/// zero energy dies, so both cells end up empty.
pub fn move_entity<R: Rng + ?Sized>(
    grid: &mut Grid,
    pos: Position,
    cost: i32,
    rng: &mut R,
) -> Result<ActionOutcome> {
    let mover = *grid.get(pos)?;
    if mover.is_empty() || mover.energy < cost {
        return Ok(ActionOutcome::Skipped);
    }

    let Some(target) = pick_neighbor(grid, pos, Entity::is_empty, rng) else {
        return Ok(ActionOutcome::NoTarget);
    };

    grid.clear_cell(pos)?;
    let energy = mover.energy - cost;
    if energy <= 0 {
        trace!(kind = %mover.kind, at = %pos, "Starved while moving");
        return Ok(ActionOutcome::Starved { at: pos });
    }

    grid.set(target, Entity { energy, ..mover })?;
    trace!(kind = %mover.kind, from = %pos, to = %target, "Moved");
    Ok(ActionOutcome::Moved { from: pos, to: target })
}

/// Eat a random neighbour of kind `prey`, gaining `gain` energy up to `max_energy`.
pub fn eat<R: Rng + ?Sized>(
    grid: &mut Grid,
    pos: Position,
    prey: EntityKind,
    gain: i32,
    max_energy: i32,
    rng: &mut R,
) -> Result<ActionOutcome> {
    if grid.get(pos)?.is_empty() {
        return Ok(ActionOutcome::Skipped);
    }

    let Some(target) = pick_neighbor(grid, pos, |e| e.is(prey), rng) else {
        return Ok(ActionOutcome::NoTarget);
    };

    grid.clear_cell(target)?;
    let eater = grid.get_mut(pos)?;
    eater.energy = eater.energy.saturating_add(gain).min(max_energy);
    trace!(
        kind = %eater.kind,
        at = %pos,
        prey = %prey,
        prey_at = %target,
        energy = eater.energy,
        "Ate"
    );
    Ok(ActionOutcome::Ate { prey_at: target })
}

/// Place `offspring` in a random empty neighbour, paying `cost`.
///
/// Not attempted at all unless the parent holds at least `threshold` energy.
/// A parent left with no energy dies in the same step.
pub fn reproduce<R: Rng + ?Sized>(
    grid: &mut Grid,
    pos: Position,
    offspring: Entity,
    threshold: i32,
    cost: i32,
    rng: &mut R,
) -> Result<ActionOutcome> {
    let parent = *grid.get(pos)?;
    if parent.is_empty() || parent.energy < threshold {
        return Ok(ActionOutcome::Skipped);
    }

    let Some(target) = pick_neighbor(grid, pos, Entity::is_empty, rng) else {
        return Ok(ActionOutcome::NoTarget);
    };

    grid.set(target, offspring)?;
    let energy = parent.energy - cost;
    let parent_died = energy <= 0;
    if parent_died {
        grid.clear_cell(pos)?;
    } else {
        grid.get_mut(pos)?.energy = energy;
    }

    trace!(kind = %parent.kind, at = %pos, child_at = %target, parent_died, "Reproduced");
    Ok(ActionOutcome::Reproduced {
        child_at: target,
        parent_died,
    })
}

/// Seed `sprout` into a random empty neighbour. Free for the source plant.
pub fn grow<R: Rng + ?Sized>(
    grid: &mut Grid,
    pos: Position,
    sprout: Entity,
    rng: &mut R,
) -> Result<ActionOutcome> {
    if grid.get(pos)?.is_empty() {
        return Ok(ActionOutcome::Skipped);
    }

    let Some(target) = pick_neighbor(grid, pos, Entity::is_empty, rng) else {
        return Ok(ActionOutcome::NoTarget);
    };

    grid.set(target, sprout)?;
    trace!(at = %pos, sprout_at = %target, "Grew");
    Ok(ActionOutcome::Grew { at: target })
}
