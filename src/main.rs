//! Sliding-block Puzzle Solver
//!
//! Reads an "Unblock Me" style grid, one row per line, and searches for a
//! sequence of slides that lets the goal block leave through the right edge.
//! The solution is printed as a numbered list of boards.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use unblock::grid::{self, BoardState, PuzzleConfig};
use unblock::moves;
use unblock::persistence::{self, LoadError, Source};
use unblock::solver::{self, Outcome, SearchConfig};

/// Solves sliding-block escape puzzles.
#[derive(Parser)]
#[command(name = "unblock")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search for a sequence of slides that frees the goal block.
    Solve(SolveArgs),
    /// Parse a puzzle and list its blocks.
    Check(PuzzleArgs),
    /// List the legal moves from the initial position.
    Moves(PuzzleArgs),
}

#[derive(Args)]
struct PuzzleArgs {
    /// Puzzle file, one row per line. Reads stdin when omitted.
    file: Option<PathBuf>,
    /// Use a bundled puzzle instead of a file.
    #[arg(long, conflicts_with = "file")]
    sample: Option<String>,
    /// Marker for empty cells.
    #[arg(long, default_value_t = '.')]
    empty: char,
    /// Identifier of the goal block.
    #[arg(long, default_value_t = 'x')]
    goal: char,
}

impl PuzzleArgs {
    fn config(&self) -> PuzzleConfig {
        PuzzleConfig {
            empty: self.empty,
            goal: self.goal,
        }
    }

    fn source(&self) -> Source<'_> {
        match (&self.sample, &self.file) {
            (Some(name), _) => Source::Sample(name),
            (None, Some(path)) => Source::File(path),
            (None, None) => Source::Stdin,
        }
    }
}

#[derive(Args)]
struct SolveArgs {
    #[command(flatten)]
    puzzle: PuzzleArgs,
    /// Deepest node the search may expand.
    #[arg(short = 'l', long, default_value_t = 50)]
    depth_limit: usize,
    /// Skip boards already reached at the same or a smaller depth.
    #[arg(long)]
    dedup: bool,
    /// Retry with limits 0, 1, 2, ... up to the depth limit.
    #[arg(long)]
    iterative: bool,
    /// Also write the solution to this file.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Solve(args) => run_solve(&args),
        Command::Check(args) => run_check(&args),
        Command::Moves(args) => run_moves(&args),
    }
}

/// Logs go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the puzzle, prompting first when reading from a terminal.
fn load_puzzle(args: &PuzzleArgs) -> Result<BoardState, LoadError> {
    let source = args.source();
    if matches!(source, Source::Stdin) && std::io::stdin().is_terminal() {
        eprintln!(
            "Enter the puzzle, one row per line ('{}' empty, '{}' goal block), then EOF:",
            args.empty, args.goal
        );
    }
    persistence::load(source, &args.config())
}

/// Renders a search outcome the way `solve` prints it.
fn describe_outcome(outcome: &Outcome, depth_limit: usize) -> String {
    match outcome {
        Outcome::Solved(path) => format!("{path}Solved in {} moves\n", path.move_count()),
        Outcome::Cutoff => format!(
            "FAILED: depth limit {depth_limit} reached without a solution. Try a larger limit.\n"
        ),
        Outcome::Exhausted => {
            "FAILED: no solution exists within the reachable boards.\n".to_string()
        }
    }
}

/// Solves the puzzle, prints the outcome and optionally saves the solution.
fn run_solve(args: &SolveArgs) -> ExitCode {
    let root = match load_puzzle(&args.puzzle) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let config = SearchConfig {
        depth_limit: args.depth_limit,
        dedup: args.dedup,
        iterative: args.iterative,
    };
    let report = solver::search(root, &config);
    info!(
        expanded = report.stats.expanded,
        generated = report.stats.generated,
        pruned = report.stats.pruned,
        peak_frontier = report.stats.peak_frontier,
        peak_live = report.stats.peak_live,
        "search finished"
    );

    let description = describe_outcome(&report.outcome, args.depth_limit);
    let Outcome::Solved(path) = &report.outcome else {
        eprint!("{description}");
        return ExitCode::from(2);
    };
    print!("{description}");

    if let Some(output) = &args.output {
        if let Err(e) = persistence::save_path(output, path) {
            eprintln!("Failed to save solution: {}", e);
            return ExitCode::FAILURE;
        }
        println!("Wrote {}", output.display());
    }
    ExitCode::SUCCESS
}

/// Prints the derived block metadata.
fn run_check(args: &PuzzleArgs) -> ExitCode {
    match load_puzzle(args) {
        Ok(state) => {
            print!("{}", grid::format_blocks(&state));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Prints each legal move from the initial position.
fn run_moves(args: &PuzzleArgs) -> ExitCode {
    match load_puzzle(args) {
        Ok(state) => {
            for mv in moves::legal_moves(&state) {
                println!("{mv}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unblock::pieces::sample;

    fn sample_board(name: &str) -> BoardState {
        BoardState::from_text(sample(name).unwrap(), &PuzzleConfig::default()).unwrap()
    }

    #[test]
    fn test_corner_solution_snapshot() {
        let report = solver::search(sample_board("corner"), &SearchConfig::default());
        let output = describe_outcome(&report.outcome, 50);

        insta::assert_snapshot!(output, @r"
        Move #0: initial position
        ..a
        xxa
        ...
        ...

        Move #1: a down 2
        ...
        xx.
        ..a
        ..a

        Move #2: x right 1
        ...
        .xx
        ..a
        ..a

        Solved in 2 moves
        ");
    }

    #[test]
    fn test_block_listing_snapshot() {
        let output = grid::format_blocks(&sample_board("three-step"));

        insta::assert_snapshot!(output, @r"
        6x6 grid, 4 blocks
        a: vertical length 3 at row 0, col 2
        b: vertical length 2 at row 1, col 5
        c: horizontal length 2 at row 3, col 3
        x: horizontal length 2 at row 2, col 0 (goal)
        ");
    }

    #[test]
    fn test_failure_messages_differ() {
        let cutoff = describe_outcome(&Outcome::Cutoff, 7);
        let exhausted = describe_outcome(&Outcome::Exhausted, 7);

        assert!(cutoff.contains("depth limit 7"));
        assert_ne!(cutoff, exhausted);
    }

    #[test]
    fn test_cli_parses_solve_flags() {
        let cli = Cli::parse_from([
            "unblock",
            "solve",
            "--sample",
            "corner",
            "-l",
            "12",
            "--dedup",
            "--goal",
            "r",
        ]);
        let Command::Solve(args) = cli.command else {
            panic!("expected the solve subcommand");
        };
        assert_eq!(args.depth_limit, 12);
        assert!(args.dedup);
        assert!(!args.iterative);
        assert_eq!(args.puzzle.config().goal, 'r');
        assert!(matches!(args.puzzle.source(), Source::Sample("corner")));
    }
}
