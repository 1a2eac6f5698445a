//! Legal move generation.
//!
//! A block slides along its own axis through the empty cells next to either
//! end of it. Every distance from one cell up to the full run of free cells is
//! a separate move, so one block can contribute several successors per
//! direction.

use crate::grid::BoardState;
use crate::pieces::{Block, Direction, Move};

/// Counts the empty cells directly beyond the block in `direction`.
///
/// Stops at the first occupied cell or at the board edge.
fn room(state: &BoardState, block: &Block, direction: Direction) -> usize {
    let (row_step, col_step) = direction.delta();
    let (mut row, mut col) = if direction.is_forward() {
        block.cell(block.length - 1)
    } else {
        block.cell(0)
    };

    let mut free = 0;
    while let (Some(next_row), Some(next_col)) = (
        row.checked_add_signed(row_step),
        col.checked_add_signed(col_step),
    ) {
        if !state.is_empty_cell(next_row, next_col) {
            break;
        }
        free += 1;
        row = next_row;
        col = next_col;
    }
    free
}

/// Enumerates moves with the index of the block they slide.
///
/// Order: blocks by identifier, forward direction before backward, then
/// increasing distance.
fn indexed_moves(state: &BoardState) -> impl Iterator<Item = (usize, Move)> + '_ {
    state
        .blocks()
        .iter()
        .enumerate()
        .flat_map(move |(index, block)| {
            block.orientation.directions().into_iter().flat_map(move |direction| {
                (1..=room(state, block, direction)).map(move |distance| {
                    (
                        index,
                        Move {
                            block: block.id,
                            direction,
                            distance,
                        },
                    )
                })
            })
        })
}

/// Builds the successor with block `index` slid by `mv`.
fn slide(state: &BoardState, index: usize, mv: Move) -> BoardState {
    let block = state.blocks()[index];
    let moved = block.shifted(mv.direction, mv.distance);

    let mut grid = state.grid().clone();
    // clear first: the old and new runs overlap for short slides
    for (row, col) in block.cells() {
        grid.set(row, col, state.empty_marker());
    }
    for (row, col) in moved.cells() {
        grid.set(row, col, block.id);
    }

    state.with_moved_block(grid, index, moved)
}

/// Lists every legal move from `state` without building successors.
pub fn legal_moves(state: &BoardState) -> Vec<Move> {
    indexed_moves(state).map(|(_, mv)| mv).collect()
}

/// Generates every state reachable by sliding exactly one block.
///
/// The input is untouched; each successor owns its grid.
pub fn expand(state: &BoardState) -> Vec<(Move, BoardState)> {
    indexed_moves(state)
        .map(|(index, mv)| (mv, slide(state, index, mv)))
        .collect()
}
