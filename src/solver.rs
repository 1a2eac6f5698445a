//! Depth-limited search over board states.
//!
//! Key points:
//! - Nodes hold an `Rc` to their parent; dead branches are freed as they are popped
//! - The frontier is a LIFO stack of nodes
//! - A node deeper than the limit is dropped and only flags a cutoff
//! - Children are goal-tested as they are generated, before being pushed
//! - Revisiting a board is allowed unless `SearchConfig::dedup` is set

use std::cell::Cell;
use std::collections::hash_map::Entry;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::grid::{goal_test, BoardState, Grid};
use crate::moves;
use crate::path::{reconstruct, Path};
use crate::pieces::Move;

/// Knobs for one search run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// Nodes deeper than this are never expanded.
    pub depth_limit: usize,
    /// Prune boards already reached at the same or a smaller depth.
    pub dedup: bool,
    /// Run the search with limits `0..=depth_limit` until one is not cut off.
    pub iterative: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth_limit: 50,
            dedup: false,
            iterative: false,
        }
    }
}

/// How a search ended.
#[derive(Debug)]
pub enum Outcome {
    /// A goal-reaching path, root first.
    Solved(Path),
    /// Some node went past the depth limit; a larger limit may succeed.
    Cutoff,
    /// Everything reachable within the limit was searched without success.
    Exhausted,
}

impl Outcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Outcome::Solved(path) => Some(path),
            Outcome::Cutoff | Outcome::Exhausted => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, Outcome::Solved(_))
    }
}

/// Counters collected while searching.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes whose successors were generated.
    pub expanded: usize,
    /// Successors generated, including pruned ones.
    pub generated: usize,
    /// Successors dropped by the visited set.
    pub pruned: usize,
    /// Largest frontier size seen.
    pub peak_frontier: usize,
    /// Most nodes alive at once: the frontier plus the ancestors it keeps.
    pub peak_live: usize,
}

impl SearchStats {
    /// Folds the counters of a later run into this one.
    fn absorb(&mut self, other: SearchStats) {
        self.expanded += other.expanded;
        self.generated += other.generated;
        self.pruned += other.pruned;
        self.peak_frontier = self.peak_frontier.max(other.peak_frontier);
        self.peak_live = self.peak_live.max(other.peak_live);
    }
}

/// The outcome of a search together with its counters.
#[derive(Debug)]
pub struct SearchReport {
    pub outcome: Outcome,
    pub stats: SearchStats,
}

/// Shared count of search nodes that are still alive.
#[derive(Clone, Debug, Default)]
struct LiveNodes(Rc<Cell<usize>>);

impl LiveNodes {
    fn acquire(&self) -> Self {
        self.0.set(self.0.get() + 1);
        self.clone()
    }

    fn release(&self) {
        self.0.set(self.0.get() - 1);
    }

    fn get(&self) -> usize {
        self.0.get()
    }
}

/// A search node: a board plus its place in the tree.
///
/// A node owns a reference to its parent, so it stays alive exactly as long
/// as the frontier or one of its live descendants can reach it.
#[derive(Debug)]
pub struct Node {
    state: BoardState,
    depth: usize,
    parent: Option<Rc<Node>>,
    /// The move that produced this node from its parent.
    last_move: Option<Move>,
    live: LiveNodes,
}

impl Node {
    /// Wraps the initial board as a depth-0 node with no parent.
    pub fn root(state: BoardState) -> Rc<Self> {
        Self::root_counted(state, &LiveNodes::default())
    }

    fn root_counted(state: BoardState, live: &LiveNodes) -> Rc<Self> {
        Rc::new(Self {
            state,
            depth: 0,
            parent: None,
            last_move: None,
            live: live.acquire(),
        })
    }

    #[inline]
    pub fn state(&self) -> &BoardState {
        &self.state
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn parent(&self) -> Option<&Rc<Node>> {
        self.parent.as_ref()
    }

    #[inline]
    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    /// Builds every successor of `node`, each pointing back at it.
    pub fn expand(node: &Rc<Self>) -> Vec<Rc<Self>> {
        let depth = node.depth + 1;
        moves::expand(&node.state)
            .into_iter()
            .map(|(mv, state)| {
                Rc::new(Self {
                    state,
                    depth,
                    parent: Some(Rc::clone(node)),
                    last_move: Some(mv),
                    live: node.live.acquire(),
                })
            })
            .collect()
    }
}

impl Drop for Node {
    // unlink the parent chain iteratively so deep paths cannot overflow the stack
    fn drop(&mut self) {
        self.live.release();
        let mut parent = self.parent.take();
        while let Some(node) = parent {
            parent = match Rc::try_unwrap(node) {
                Ok(mut owned) => owned.parent.take(),
                Err(_) => None,
            };
        }
    }
}

/// Records `grid` at `depth`, returning false if it was already reached at
/// the same or a smaller depth.
fn remember(seen: &mut FxHashMap<Grid, usize>, grid: &Grid, depth: usize) -> bool {
    match seen.entry(grid.clone()) {
        Entry::Occupied(mut best) => {
            if *best.get() <= depth {
                return false;
            }
            best.insert(depth);
            true
        }
        Entry::Vacant(slot) => {
            slot.insert(depth);
            true
        }
    }
}

/// Runs one depth-limited search from `root`.
///
/// Returns the first goal-reaching node in LIFO traversal order, which is not
/// necessarily the shallowest one.
pub fn depth_limited_search(root: BoardState, depth_limit: usize, dedup: bool) -> SearchReport {
    let mut stats = SearchStats::default();
    let live = LiveNodes::default();
    let root = Node::root_counted(root, &live);

    if goal_test(root.state()) {
        debug!("initial board is already solved");
        return SearchReport {
            outcome: Outcome::Solved(reconstruct(&root)),
            stats,
        };
    }

    let mut seen: FxHashMap<Grid, usize> = FxHashMap::default();
    if dedup {
        seen.insert(root.state().grid().clone(), 0);
    }

    let mut frontier = vec![root];
    let mut cutoff = false;

    while let Some(node) = frontier.pop() {
        let depth = node.depth();
        if depth > depth_limit {
            if !cutoff {
                trace!(depth, depth_limit, "first node past the depth limit");
            }
            cutoff = true;
            continue;
        }

        stats.expanded += 1;
        let children = Node::expand(&node);
        stats.generated += children.len();

        for child in children {
            if goal_test(child.state()) {
                debug!(
                    depth = child.depth(),
                    expanded = stats.expanded,
                    live = live.get(),
                    "goal reached"
                );
                return SearchReport {
                    outcome: Outcome::Solved(reconstruct(&child)),
                    stats,
                };
            }

            if dedup && !remember(&mut seen, child.state().grid(), depth + 1) {
                stats.pruned += 1;
                continue;
            }
            frontier.push(child);
        }

        // a childless node, and any ancestors only it kept, is freed here
        drop(node);
        stats.peak_frontier = stats.peak_frontier.max(frontier.len());
        stats.peak_live = stats.peak_live.max(live.get());
    }

    let outcome = if cutoff {
        Outcome::Cutoff
    } else {
        Outcome::Exhausted
    };
    debug!(
        ?outcome,
        depth_limit,
        expanded = stats.expanded,
        peak_live = stats.peak_live,
        "frontier exhausted"
    );
    SearchReport { outcome, stats }
}

/// Repeats the depth-limited search with limits `0..=max_limit`.
///
/// Stops at the first run that is not cut off. Counters are summed over all
/// runs.
pub fn iterative_deepening(root: BoardState, max_limit: usize, dedup: bool) -> SearchReport {
    let mut stats = SearchStats::default();

    for limit in 0..=max_limit {
        let report = depth_limited_search(root.clone(), limit, dedup);
        stats.absorb(report.stats);

        match report.outcome {
            Outcome::Cutoff => trace!(limit, "cut off, deepening"),
            outcome => {
                debug!(limit, "iterative deepening settled");
                return SearchReport { outcome, stats };
            }
        }
    }

    SearchReport {
        outcome: Outcome::Cutoff,
        stats,
    }
}

/// Searches from `root` as configured.
pub fn search(root: BoardState, config: &SearchConfig) -> SearchReport {
    if config.iterative {
        iterative_deepening(root, config.depth_limit, config.dedup)
    } else {
        depth_limited_search(root, config.depth_limit, config.dedup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::PuzzleConfig;
    use crate::pieces::sample;

    const BLOCKED_EXIT: &str = "......\n.....a\nxx...a\n......\n......\n......\n";

    fn board(text: &str) -> BoardState {
        BoardState::from_text(text, &PuzzleConfig::default()).unwrap()
    }

    fn assert_solved_at_edge(outcome: &Outcome) {
        let path = outcome.path().expect("expected a solution");
        let goal = path.goal_state().goal_block();
        assert_eq!(goal.last_col(), path.goal_state().grid().width() - 1);
    }

    #[test]
    fn test_child_depth_is_parent_depth_plus_one() {
        let root = Node::root(board(BLOCKED_EXIT));
        assert_eq!(root.depth(), 0);
        assert!(root.parent().is_none());

        let children = Node::expand(&root);
        assert!(!children.is_empty());
        for child in &children {
            assert_eq!(child.depth(), 1);
            assert!(Rc::ptr_eq(child.parent().unwrap(), &root));
            assert!(child.last_move().is_some());
        }

        for grandchild in Node::expand(&children[0]) {
            assert_eq!(grandchild.depth(), 2);
            assert!(Rc::ptr_eq(grandchild.parent().unwrap(), &children[0]));
        }
    }

    #[test]
    fn test_dropped_leaf_frees_its_ancestors() {
        let live = LiveNodes::default();
        let root = Node::root_counted(board(BLOCKED_EXIT), &live);
        let children = Node::expand(&root);
        let leaf = Node::expand(&children[0]).swap_remove(0);
        drop(root);
        drop(children);

        // only the leaf and the chain it points back through survive
        assert_eq!(live.get(), 3);
        assert_eq!(leaf.depth(), 2);
        drop(leaf);
        assert_eq!(live.get(), 0);
    }

    #[test]
    fn test_live_nodes_bounded_by_frontier_and_depth() {
        let depth_limit = 3;
        let report = depth_limited_search(board(sample("jam").unwrap()), depth_limit, false);

        assert!(matches!(report.outcome, Outcome::Cutoff));
        let stats = report.stats;
        assert!(stats.peak_live <= stats.peak_frontier + depth_limit + 1, "{stats:?}");
        assert!(stats.generated > 10 * stats.peak_live, "{stats:?}");
    }

    #[test]
    fn test_blocker_scenario_solves_with_limit_one() {
        for depth_limit in [1, 2, 5] {
            let report = depth_limited_search(board(BLOCKED_EXIT), depth_limit, false);
            assert_solved_at_edge(&report.outcome);
        }
    }

    #[test]
    fn test_blocker_scenario_with_limit_zero_is_cutoff() {
        let report = depth_limited_search(board(BLOCKED_EXIT), 0, false);
        assert!(matches!(report.outcome, Outcome::Cutoff));
        assert_eq!(report.stats.expanded, 1);
    }

    #[test]
    fn test_already_solved_root() {
        let report = depth_limited_search(board("....\n..xx\n"), 0, false);
        let path = report.outcome.path().expect("root is a solution");
        assert_eq!(path.steps().len(), 1);
        assert_eq!(path.steps()[0].depth, 0);
        assert_eq!(path.steps()[0].mv, None);
        assert_eq!(report.stats.expanded, 0);
    }

    #[test]
    fn test_static_board_is_exhausted() {
        let report = depth_limited_search(board("xxa\nbba\n"), 10, false);
        assert!(matches!(report.outcome, Outcome::Exhausted));
    }

    #[test]
    fn test_dedup_exhausts_finite_space() {
        // x and b can each shuffle one cell but x never reaches the edge
        let text = "xx.a\nbb.a\n";

        let baseline = depth_limited_search(board(text), 10, false);
        assert!(matches!(baseline.outcome, Outcome::Cutoff));
        assert_eq!(baseline.stats.pruned, 0);

        let deduped = depth_limited_search(board(text), 10, true);
        assert!(matches!(deduped.outcome, Outcome::Exhausted));
        assert!(deduped.stats.pruned > 0);
        assert!(deduped.stats.expanded < baseline.stats.expanded);
    }

    #[test]
    fn test_dedup_keeps_solutions() {
        let report = depth_limited_search(board(BLOCKED_EXIT), 5, true);
        assert_solved_at_edge(&report.outcome);
    }

    #[test]
    fn test_revisit_at_shallower_depth_is_kept() {
        let mut seen = FxHashMap::default();
        let grid = Grid::parse("xx.\n", '.').unwrap();

        assert!(remember(&mut seen, &grid, 3));
        assert!(!remember(&mut seen, &grid, 3));
        assert!(!remember(&mut seen, &grid, 4));
        assert!(remember(&mut seen, &grid, 1));
        assert_eq!(seen.get(&grid), Some(&1));
    }

    #[test]
    fn test_corner_path() {
        let root = board(sample("corner").unwrap());
        let report = search(root, &SearchConfig::default());
        let path = report.outcome.path().expect("corner is solvable");

        let moves: Vec<String> = path.moves().map(|mv| mv.to_string()).collect();
        assert_eq!(moves, vec!["a down 2", "x right 1"]);
    }

    #[test]
    fn test_iterative_deepening() {
        let report = iterative_deepening(board(sample("three-step").unwrap()), 6, false);
        assert_solved_at_edge(&report.outcome);
        // no two-move solution exists, so the path needs at least three moves
        assert!(report.outcome.path().unwrap().move_count() >= 3);

        let static_board = iterative_deepening(board("xxa\nbba\n"), 6, false);
        assert!(matches!(static_board.outcome, Outcome::Exhausted));

        let too_shallow = iterative_deepening(board(BLOCKED_EXIT), 0, false);
        assert!(matches!(too_shallow.outcome, Outcome::Cutoff));
    }

    #[test]
    fn test_path_steps_follow_recorded_moves() {
        let config = SearchConfig {
            depth_limit: 4,
            dedup: true,
            iterative: false,
        };
        let report = search(board(sample("three-step").unwrap()), &config);
        let path = report.outcome.path().expect("three-step is solvable");

        for pair in path.steps().windows(2) {
            let (before, after) = (&pair[0], &pair[1]);
            assert_eq!(after.depth, before.depth + 1);
            let mv = after.mv.expect("non-root steps record their move");
            assert!(moves::expand(&before.state)
                .into_iter()
                .any(|(candidate, state)| candidate == mv && state == after.state));
        }
    }
}
