//! Sliding-block Puzzle Solver Library
//!
//! Solves "Rush Hour" style escape puzzles: rigid blocks slide along their own
//! axis on a rectangular grid until the goal block can leave through the right
//! edge. The search is a depth-limited depth-first search that reports a
//! depth cutoff separately from a proven dead end.

pub mod grid;
pub mod moves;
pub mod path;
pub mod persistence;
pub mod pieces;
pub mod solver;

pub use grid::{goal_test, BoardState, Grid, MalformedPuzzleError, PuzzleConfig};
pub use path::Path;
pub use solver::{Outcome, SearchConfig, SearchReport, SearchStats};

/// Parses puzzle text and searches it.
///
/// Malformed input is rejected before any search runs. `Cutoff` and
/// `Exhausted` are ordinary outcomes, not errors.
pub fn solve(
    text: &str,
    puzzle: &PuzzleConfig,
    search: &SearchConfig,
) -> Result<Outcome, MalformedPuzzleError> {
    let root = BoardState::from_text(text, puzzle)?;
    Ok(solver::search(root, search).outcome)
}
