//! Grid snapshots and the board state derived from them.
//!
//! The grid is a rectangle of `char` cells, one row per line of input. Each
//! row sits behind an `Rc` and is copied on write, so sliding a horizontal
//! block reallocates one row and a vertical slide only the rows it crosses.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use thiserror::Error;

use crate::pieces::{Block, Orientation};

/// Reasons a puzzle grid is rejected before any search runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedPuzzleError {
    #[error("puzzle has no cells")]
    Empty,
    #[error("row {row} has width {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("block '{id}' occupies {length} cell(s), blocks need at least 2")]
    TooShort { id: char, length: usize },
    #[error("block '{id}' is not a single horizontal or vertical run")]
    NotContiguous { id: char },
    #[error("goal block '{id}' is missing")]
    MissingGoal { id: char },
    #[error("goal block '{id}' must be horizontal")]
    GoalNotHorizontal { id: char },
    #[error("empty marker and goal block are both '{0}'")]
    ConflictingMarkers(char),
    #[error("whitespace at row {row}, col {col} is neither a block nor the empty marker")]
    WhitespaceCell { row: usize, col: usize },
}

/// Cell tokens that carry meaning for a puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PuzzleConfig {
    /// Marker for an empty cell.
    pub empty: char,
    /// Identifier of the block that has to leave through the right edge.
    pub goal: char,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            empty: '.',
            goal: 'x',
        }
    }
}

/// A rectangular array of cells.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: Vec<Rc<Vec<char>>>,
    width: usize,
}

impl Grid {
    /// Builds a grid from rows of cells, rejecting ragged or empty input.
    pub fn from_rows(rows: Vec<Vec<char>>) -> Result<Self, MalformedPuzzleError> {
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 {
            return Err(MalformedPuzzleError::Empty);
        }

        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != width)
        {
            return Err(MalformedPuzzleError::RaggedRow {
                row,
                expected: width,
                found,
            });
        }

        Ok(Self {
            rows: rows.into_iter().map(Rc::new).collect(),
            width,
        })
    }

    /// Parses one row per line.
    ///
    /// Trailing whitespace is dropped unless it is the `empty` marker, and lines
    /// left with no cells are skipped.
    pub fn parse(text: &str, empty: char) -> Result<Self, MalformedPuzzleError> {
        let rows = text
            .lines()
            .map(|line| line.trim_end_matches(|c: char| c.is_whitespace() && c != empty))
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().collect())
            .collect();
        Self::from_rows(rows)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Returns the cell at `(row, col)`, or `None` off the board.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<char> {
        self.rows.get(row).and_then(|cells| cells.get(col)).copied()
    }

    /// Writes a cell, copying the row first if another grid shares it.
    #[inline]
    pub(crate) fn set(&mut self, row: usize, col: usize, value: char) {
        Rc::make_mut(&mut self.rows[row])[col] = value;
    }

    /// Iterates over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        self.rows.iter().map(|row| row.as_slice())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let line: String = row.iter().collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// An immutable grid snapshot plus the block metadata derived from it.
///
/// Equality and hashing look at the grid only: the metadata is a function of
/// the cells.
#[derive(Clone, Debug)]
pub struct BoardState {
    grid: Grid,
    /// Blocks in ascending identifier order.
    blocks: Vec<Block>,
    /// Index of the goal block in `blocks`.
    goal: usize,
    empty: char,
}

impl BoardState {
    /// Derives block metadata from a grid and validates it against `config`.
    pub fn parse(grid: Grid, config: &PuzzleConfig) -> Result<Self, MalformedPuzzleError> {
        if config.empty == config.goal {
            return Err(MalformedPuzzleError::ConflictingMarkers(config.empty));
        }

        // row-major scan, so each token's cells arrive sorted
        let mut cells_by_token: BTreeMap<char, Vec<(usize, usize)>> = BTreeMap::new();
        for (row, cells) in grid.rows().enumerate() {
            for (col, &token) in cells.iter().enumerate() {
                if token == config.empty {
                    continue;
                }
                if token.is_whitespace() {
                    return Err(MalformedPuzzleError::WhitespaceCell { row, col });
                }
                cells_by_token.entry(token).or_default().push((row, col));
            }
        }

        let blocks = cells_by_token
            .iter()
            .map(|(&id, cells)| derive_block(id, cells))
            .collect::<Result<Vec<_>, _>>()?;

        let goal = blocks
            .iter()
            .position(|block| block.id == config.goal)
            .ok_or(MalformedPuzzleError::MissingGoal { id: config.goal })?;
        if blocks[goal].orientation != Orientation::Horizontal {
            return Err(MalformedPuzzleError::GoalNotHorizontal { id: config.goal });
        }

        Ok(Self {
            grid,
            blocks,
            goal,
            empty: config.empty,
        })
    }

    /// Parses puzzle text straight into a board state.
    pub fn from_text(text: &str, config: &PuzzleConfig) -> Result<Self, MalformedPuzzleError> {
        Self::parse(Grid::parse(text, config.empty)?, config)
    }

    /// Builds a successor from an already-updated grid and block list.
    pub(crate) fn with_moved_block(&self, grid: Grid, index: usize, moved: Block) -> Self {
        let mut blocks = self.blocks.clone();
        blocks[index] = moved;
        Self {
            grid,
            blocks,
            goal: self.goal,
            empty: self.empty,
        }
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    #[inline]
    pub fn goal_block(&self) -> &Block {
        &self.blocks[self.goal]
    }

    /// Looks up a block by its identifier.
    pub fn block(&self, id: char) -> Option<&Block> {
        self.blocks
            .binary_search_by_key(&id, |block| block.id)
            .ok()
            .map(|index| &self.blocks[index])
    }

    #[inline]
    pub fn empty_marker(&self) -> char {
        self.empty
    }

    #[inline]
    pub fn is_empty_cell(&self, row: usize, col: usize) -> bool {
        self.grid.get(row, col) == Some(self.empty)
    }
}

impl PartialEq for BoardState {
    fn eq(&self, other: &Self) -> bool {
        self.grid == other.grid
    }
}

impl Eq for BoardState {}

impl Hash for BoardState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.grid.hash(state);
    }
}

/// Checks that a token's cells form one straight, gap-free run.
fn derive_block(id: char, cells: &[(usize, usize)]) -> Result<Block, MalformedPuzzleError> {
    let length = cells.len();
    if length < 2 {
        return Err(MalformedPuzzleError::TooShort { id, length });
    }

    let (row, col) = cells[0];
    let orientation = if cells.iter().all(|&(r, _)| r == row) {
        Orientation::Horizontal
    } else if cells.iter().all(|&(_, c)| c == col) {
        Orientation::Vertical
    } else {
        return Err(MalformedPuzzleError::NotContiguous { id });
    };

    let block = Block {
        id,
        row,
        col,
        length,
        orientation,
    };

    // sorted cells must match the run starting at the anchor exactly
    if !block.cells().eq(cells.iter().copied()) {
        return Err(MalformedPuzzleError::NotContiguous { id });
    }

    Ok(block)
}

/// True when the goal block is horizontal and touches the right edge.
#[inline]
pub fn goal_test(state: &BoardState) -> bool {
    let goal = state.goal_block();
    goal.orientation == Orientation::Horizontal && goal.col + goal.length == state.grid.width()
}

/// Formats the derived block metadata, one block per line.
pub fn format_blocks(state: &BoardState) -> String {
    let mut output = format!(
        "{}x{} grid, {} blocks\n",
        state.grid.height(),
        state.grid.width(),
        state.blocks.len()
    );

    for block in &state.blocks {
        let marker = if block.id == state.goal_block().id {
            " (goal)"
        } else {
            ""
        };
        output.push_str(&format!(
            "{}: {} length {} at row {}, col {}{}\n",
            block.id, block.orientation, block.length, block.row, block.col, marker
        ));
    }

    output
}
