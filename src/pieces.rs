//! Block metadata and move descriptions.
//!
//! A block is never stored on its own: it is derived from the cells of a grid
//! snapshot when a [`BoardState`](crate::grid::BoardState) is built. The types
//! here describe what was derived and how a block may slide.

use std::fmt;

/// The axis a block lies on, which is also the only axis it can slide along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// The two directions a block with this orientation can slide.
    ///
    /// The forward direction (increasing row/column) comes first.
    #[inline]
    pub const fn directions(self) -> [Direction; 2] {
        match self {
            Orientation::Horizontal => [Direction::Right, Direction::Left],
            Orientation::Vertical => [Direction::Down, Direction::Up],
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
        })
    }
}

/// A sliding direction on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Row and column step for one cell of movement.
    #[inline]
    pub const fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// True for directions that increase the row or column index.
    #[inline]
    pub const fn is_forward(self) -> bool {
        matches!(self, Direction::Down | Direction::Right)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        })
    }
}

/// A rigid run of same-identifier cells.
///
/// `row`/`col` is the anchor: the leftmost cell of a horizontal block or the
/// topmost cell of a vertical one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Block {
    pub id: char,
    pub row: usize,
    pub col: usize,
    pub length: usize,
    pub orientation: Orientation,
}

impl Block {
    /// Returns the cell `offset` steps from the anchor along the block's axis.
    #[inline]
    pub fn cell(&self, offset: usize) -> (usize, usize) {
        match self.orientation {
            Orientation::Horizontal => (self.row, self.col + offset),
            Orientation::Vertical => (self.row + offset, self.col),
        }
    }

    /// Iterates over the block's cells, anchor first.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.length).map(move |offset| self.cell(offset))
    }

    /// The rightmost column the block occupies.
    #[inline]
    pub fn last_col(&self) -> usize {
        match self.orientation {
            Orientation::Horizontal => self.col + self.length - 1,
            Orientation::Vertical => self.col,
        }
    }

    /// Returns a copy of this block shifted `distance` cells in `direction`.
    ///
    /// The caller guarantees the shift stays on the board.
    pub(crate) fn shifted(&self, direction: Direction, distance: usize) -> Self {
        let (row, col) = match direction {
            Direction::Up => (self.row - distance, self.col),
            Direction::Down => (self.row + distance, self.col),
            Direction::Left => (self.row, self.col - distance),
            Direction::Right => (self.row, self.col + distance),
        };
        Self { row, col, ..*self }
    }
}

/// One slide of one block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub block: char,
    pub direction: Direction,
    pub distance: usize,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.block, self.direction, self.distance)
    }
}

/// Named puzzles bundled with the solver, using `.` for empty and `x` for the
/// goal block.
pub const SAMPLES: &[(&str, &str)] = &[
    // one vertical block stands between the goal and the exit
    ("corner", "..a\nxxa\n...\n...\n"),
    // the goal must travel the full row once the blocker steps aside
    (
        "blocked-exit",
        "......\n.....a\nxx...a\n......\n......\n......\n",
    ),
    // two blockers of different lengths
    (
        "three-step",
        "..a...\n..a..b\nxxa..b\n...cc.\n......\n......\n",
    ),
    // crowded board where every exit needs a long detour
    (
        "jam",
        "aa...b\nc..d.b\ncxxd.b\nc..d..\ne...ff\ne.ggg.\n",
    ),
    // nothing can move
    ("static", "xxa\nbba\n"),
];

/// Looks up a bundled puzzle by name.
pub fn sample(name: &str) -> Option<&'static str> {
    SAMPLES
        .iter()
        .find(|(sample_name, _)| *sample_name == name)
        .map(|&(_, text)| text)
}
