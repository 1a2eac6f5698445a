//! Loading puzzles and saving solutions.
//!
//! Puzzle format: one row per line, one character per cell. Solutions are
//! saved as the same numbered board listing the CLI prints.

use std::fs::{self, File};
use std::io::{self, Read, Write};

use thiserror::Error;

use crate::grid::{BoardState, MalformedPuzzleError, PuzzleConfig};
use crate::path::Path;
use crate::pieces;

/// Where puzzle text comes from.
#[derive(Clone, Copy, Debug)]
pub enum Source<'a> {
    File(&'a std::path::Path),
    Sample(&'a str),
    Stdin,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read puzzle: {0}")]
    Io(#[from] io::Error),
    #[error("malformed puzzle: {0}")]
    Malformed(#[from] MalformedPuzzleError),
    #[error("unknown sample '{0}'")]
    UnknownSample(String),
}

/// Reads everything from `reader` as puzzle text.
pub fn read_from(mut reader: impl Read) -> io::Result<String> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Ok(text)
}

/// Fetches the raw puzzle text for `source`.
pub fn read_text(source: Source<'_>) -> Result<String, LoadError> {
    match source {
        Source::File(path) => Ok(fs::read_to_string(path)?),
        Source::Sample(name) => pieces::sample(name)
            .map(str::to_owned)
            .ok_or_else(|| LoadError::UnknownSample(name.to_owned())),
        Source::Stdin => Ok(read_from(io::stdin().lock())?),
    }
}

/// Reads and parses a puzzle.
pub fn load(source: Source<'_>, config: &PuzzleConfig) -> Result<BoardState, LoadError> {
    let text = read_text(source)?;
    Ok(BoardState::from_text(&text, config)?)
}

/// Writes a solution in the human-readable listing format.
pub fn save_path(dest: &std::path::Path, path: &Path) -> io::Result<()> {
    let mut file = File::create(dest)?;
    writeln!(file, "Solved in {} moves:\n", path.move_count())?;
    write!(file, "{path}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{search, SearchConfig};

    #[test]
    fn test_read_from_reader() {
        let text = read_from(io::Cursor::new("xx.\n...\n")).unwrap();
        assert_eq!(text, "xx.\n...\n");
    }

    #[test]
    fn test_load_sample() {
        let state = load(Source::Sample("corner"), &PuzzleConfig::default()).unwrap();
        assert_eq!(state.grid().height(), 4);
        assert!(matches!(
            load(Source::Sample("nope"), &PuzzleConfig::default()),
            Err(LoadError::UnknownSample(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_load_reports_missing_file() {
        let missing = std::env::temp_dir().join("unblock-missing-puzzle.txt");
        let _ = fs::remove_file(&missing);
        assert!(matches!(
            load(Source::File(&missing), &PuzzleConfig::default()),
            Err(LoadError::Io(_))
        ));
    }

    #[test]
    fn test_load_rejects_ragged_file() {
        let file = std::env::temp_dir().join(format!("unblock-ragged-{}.txt", std::process::id()));
        fs::write(&file, "xx..\n...\n").unwrap();
        let result = load(Source::File(&file), &PuzzleConfig::default());
        let _ = fs::remove_file(&file);

        assert!(matches!(
            result,
            Err(LoadError::Malformed(MalformedPuzzleError::RaggedRow { .. }))
        ));
    }

    #[test]
    fn test_save_path_writes_listing() {
        let root = load(Source::Sample("corner"), &PuzzleConfig::default()).unwrap();
        let report = search(root, &SearchConfig::default());
        let path = report.outcome.path().unwrap();

        let dest = std::env::temp_dir().join(format!("unblock-solution-{}.txt", std::process::id()));
        save_path(&dest, path).unwrap();
        let written = fs::read_to_string(&dest).unwrap();
        let _ = fs::remove_file(&dest);

        assert!(written.starts_with("Solved in 2 moves:\n\nMove #0: initial position\n"));
        assert!(written.ends_with(".xx\n..a\n..a\n\n"));
    }
}
