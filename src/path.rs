//! Solution paths rebuilt from the search tree.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::grid::BoardState;
use crate::pieces::Move;
use crate::solver::Node;

/// One board along a solution path.
#[derive(Clone, Debug)]
pub struct Step {
    pub state: BoardState,
    pub depth: usize,
    /// The move that led here; `None` for the initial board.
    pub mv: Option<Move>,
}

/// The boards from the initial position to the solved one, in order.
#[derive(Clone, Debug)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    #[inline]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of moves, one less than the number of boards.
    #[inline]
    pub fn move_count(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    /// The moves in order, skipping the initial board.
    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.steps.iter().filter_map(|step| step.mv)
    }

    /// The solved board at the end of the path.
    pub fn goal_state(&self) -> &BoardState {
        // a path always holds at least the node it was rebuilt from
        &self.steps[self.steps.len() - 1].state
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (number, step) in self.steps.iter().enumerate() {
            match step.mv {
                Some(mv) => writeln!(f, "Move #{number}: {mv}")?,
                None => writeln!(f, "Move #{number}: initial position")?,
            }
            writeln!(f, "{}", step.state.grid())?;
        }
        Ok(())
    }
}

/// Walks parent links from `goal` back to the root and returns the path root
/// first.
///
/// A node is never recorded twice, so a corrupt parent chain ends the walk
/// instead of looping.
pub fn reconstruct(goal: &Rc<Node>) -> Path {
    let mut visited = FxHashSet::default();
    let mut steps = Vec::with_capacity(goal.depth() + 1);

    let mut cursor = Some(goal);
    while let Some(node) = cursor {
        if !visited.insert(Rc::as_ptr(node)) {
            break;
        }
        steps.push(Step {
            state: node.state().clone(),
            depth: node.depth(),
            mv: node.last_move(),
        });
        cursor = node.parent();
    }

    steps.reverse();
    Path { steps }
}
