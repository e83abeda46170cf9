//! The two choices a restore needs before it can start: which backup instance, and how to treat
//! collections that already exist at the destination.

use crate::restore::ConflictMode;
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("invalid selection {input:?}: expected a number between 1 and {available}")]
    InvalidSelection { input: String, available: usize },

    #[error("invalid restore mode {0:?}: expected 1 (append) or 2 (overwrite)")]
    InvalidMode(String),

    #[error("unknown backup instance {0:?}")]
    UnknownInstance(String),

    #[error("no input available")]
    EndOfInput,

    #[error("error talking to the terminal: {0}")]
    Io(#[from] io::Error),
}

/// Answers the restore questions. Every wrong answer is final: there is no re-prompt.
pub trait Selector: std::fmt::Debug + Send {
    /// Pick one of `candidates` and return its zero-based position.
    fn select_instance(&mut self, candidates: &[String]) -> Result<usize, SelectError>;

    fn select_mode(&mut self) -> Result<ConflictMode, SelectError>;
}

/// Asks on a line-oriented terminal.
#[derive(Debug)]
pub struct TerminalSelector<R, W> {
    input: R,
    output: W,
}

impl TerminalSelector<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R, W> TerminalSelector<R, W>
where
    R: BufRead,
    W: Write,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> Result<String, SelectError> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Err(SelectError::EndOfInput);
        }
        Ok(answer.trim().to_string())
    }
}

impl<R, W> Selector for TerminalSelector<R, W>
where
    R: BufRead + std::fmt::Debug + Send,
    W: Write + std::fmt::Debug + Send,
{
    fn select_instance(&mut self, candidates: &[String]) -> Result<usize, SelectError> {
        writeln!(self.output, "Available backup folders:")?;
        for (i, name) in candidates.iter().enumerate() {
            writeln!(self.output, "{}: {name}", i + 1)?;
        }

        let answer = self.ask("Enter folder number to restore: ")?;
        match answer.parse::<usize>() {
            Ok(n) if (1..=candidates.len()).contains(&n) => Ok(n - 1),
            _ => Err(SelectError::InvalidSelection {
                input: answer,
                available: candidates.len(),
            }),
        }
    }

    fn select_mode(&mut self) -> Result<ConflictMode, SelectError> {
        let answer =
            self.ask("Restore mode: [1] Append / [2] Overwrite (drop collections first): ")?;
        match answer.as_str() {
            "1" => Ok(ConflictMode::Append),
            "2" => Ok(ConflictMode::Overwrite),
            _ => Err(SelectError::InvalidMode(answer)),
        }
    }
}

/// Answers from choices made up front (command line flags), asking `fallback` for anything
/// left open.
#[derive(Debug)]
pub struct PresetSelector<S> {
    instance: Option<String>,
    mode: Option<ConflictMode>,
    fallback: S,
}

impl<S: Selector> PresetSelector<S> {
    pub fn new(instance: Option<String>, mode: Option<ConflictMode>, fallback: S) -> Self {
        Self {
            instance,
            mode,
            fallback,
        }
    }
}

impl<S: Selector> Selector for PresetSelector<S> {
    fn select_instance(&mut self, candidates: &[String]) -> Result<usize, SelectError> {
        match &self.instance {
            Some(name) => candidates
                .iter()
                .position(|candidate| candidate == name)
                .ok_or_else(|| SelectError::UnknownInstance(name.clone())),
            None => self.fallback.select_instance(candidates),
        }
    }

    fn select_mode(&mut self) -> Result<ConflictMode, SelectError> {
        match self.mode {
            Some(mode) => Ok(mode),
            None => self.fallback.select_mode(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn terminal(input: &str) -> TerminalSelector<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalSelector::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn candidates() -> Vec<String> {
        vec![
            "alice@c0_2024-01-01_00-00-00".to_string(),
            "alice@c0_2024-01-02_00-00-00".to_string(),
        ]
    }

    #[test]
    fn terminal_lists_and_picks_one_based() {
        let mut selector = terminal("2\n");
        assert_eq!(selector.select_instance(&candidates()).unwrap(), 1);

        let prompt = String::from_utf8(selector.output).unwrap();
        assert_eq!(
            prompt,
            "Available backup folders:\n\
             1: alice@c0_2024-01-01_00-00-00\n\
             2: alice@c0_2024-01-02_00-00-00\n\
             Enter folder number to restore: "
        );
    }

    #[test]
    fn terminal_rejects_out_of_range_without_retry() {
        for input in ["0\n", "3\n", "one\n", "\n", "-1\n"] {
            let mut selector = terminal(input);
            let err = selector.select_instance(&candidates()).unwrap_err();
            assert!(
                matches!(err, SelectError::InvalidSelection { available: 2, .. }),
                "input {input:?}: {err}"
            );
        }

        // a second valid line is never read
        let mut selector = terminal("9\n1\n");
        assert!(selector.select_instance(&candidates()).is_err());
    }

    #[test]
    fn terminal_mode() {
        assert_eq!(terminal("1\n").select_mode().unwrap(), ConflictMode::Append);
        assert_eq!(
            terminal(" 2 \n").select_mode().unwrap(),
            ConflictMode::Overwrite
        );
        assert!(matches!(
            terminal("3\n").select_mode().unwrap_err(),
            SelectError::InvalidMode(input) if input == "3"
        ));
        assert!(matches!(
            terminal("").select_mode().unwrap_err(),
            SelectError::EndOfInput
        ));
    }

    #[test]
    fn preset_answers_without_asking() {
        let mut selector = PresetSelector::new(
            Some("alice@c0_2024-01-02_00-00-00".to_string()),
            Some(ConflictMode::Overwrite),
            terminal(""),
        );
        assert_eq!(selector.select_instance(&candidates()).unwrap(), 1);
        assert_eq!(selector.select_mode().unwrap(), ConflictMode::Overwrite);
        assert!(selector.fallback.output.is_empty());
    }

    #[test]
    fn preset_falls_back_for_open_choices() {
        let mut selector = PresetSelector::new(None, None, terminal("1\n2\n"));
        assert_eq!(selector.select_instance(&candidates()).unwrap(), 0);
        assert_eq!(selector.select_mode().unwrap(), ConflictMode::Overwrite);
    }

    #[test]
    fn preset_unknown_instance() {
        let mut selector =
            PresetSelector::new(Some("missing".to_string()), None, terminal(""));
        assert!(matches!(
            selector.select_instance(&candidates()).unwrap_err(),
            SelectError::UnknownInstance(name) if name == "missing"
        ));
    }
}
