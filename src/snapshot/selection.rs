//! Snapshot selection providers
//!
//! A restore needs two answers from whoever drives it: which snapshot, and
//! whether to go ahead. `SelectionProvider` is that capability; the restore
//! executor never reads input itself.

use std::io::{BufRead, Write};

use chrono::Utc;

use super::catalog::Snapshot;
use crate::display::format_snapshot_list;
use crate::error::{SnapvaultError, SnapvaultResult};

/// Chooses a snapshot to restore and confirms the overwrite
pub trait SelectionProvider {
    /// Pick a position in `snapshots` (newest first), or `None` to cancel
    fn choose(&mut self, snapshots: &[Snapshot]) -> SnapvaultResult<Option<usize>>;

    /// Confirm that the live store may be overwritten from `snapshot`
    fn confirm(&mut self, snapshot: &Snapshot) -> SnapvaultResult<bool>;
}

/// A selection decided up front (command-line flags, RPC arguments, tests)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetSelection {
    /// Zero-based position in the newest-first listing
    pub index: usize,
    /// Whether the caller already confirmed the overwrite
    pub confirmed: bool,
}

impl PresetSelection {
    pub fn new(index: usize, confirmed: bool) -> Self {
        Self { index, confirmed }
    }
}

impl SelectionProvider for PresetSelection {
    fn choose(&mut self, snapshots: &[Snapshot]) -> SnapvaultResult<Option<usize>> {
        if self.index >= snapshots.len() {
            return Err(SnapvaultError::Validation(format!(
                "snapshot index {} is out of range (1-{})",
                self.index + 1,
                snapshots.len()
            )));
        }
        Ok(Some(self.index))
    }

    fn confirm(&mut self, _snapshot: &Snapshot) -> SnapvaultResult<bool> {
        Ok(self.confirmed)
    }
}

/// Line-based prompt over any reader/writer pair
///
/// Shows the numbered listing, reads a 1-based number (blank or EOF
/// cancels), then asks for `y`/`yes` before an overwrite.
pub struct TerminalSelector<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalSelector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn prompt(&mut self, question: &str) -> SnapvaultResult<Option<String>> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let answer = line.trim();
        Ok((!answer.is_empty()).then(|| answer.to_string()))
    }
}

impl<R: BufRead, W: Write> SelectionProvider for TerminalSelector<R, W> {
    fn choose(&mut self, snapshots: &[Snapshot]) -> SnapvaultResult<Option<usize>> {
        writeln!(self.output, "{}", format_snapshot_list(snapshots, Utc::now()))?;
        writeln!(self.output)?;

        let question = format!(
            "Select a snapshot to restore [1-{}] (blank to cancel): ",
            snapshots.len()
        );
        let Some(answer) = self.prompt(&question)? else {
            return Ok(None);
        };

        match answer.parse::<usize>() {
            Ok(n) if (1..=snapshots.len()).contains(&n) => Ok(Some(n - 1)),
            _ => Err(SnapvaultError::Validation(format!(
                "'{}' is not a snapshot number between 1 and {}",
                answer,
                snapshots.len()
            ))),
        }
    }

    fn confirm(&mut self, snapshot: &Snapshot) -> SnapvaultResult<bool> {
        writeln!(
            self.output,
            "WARNING: restoring {} overwrites the current data.",
            snapshot.name
        )?;

        let answer = self.prompt("Proceed? [y/N]: ")?;
        Ok(matches!(
            answer.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("y") | Some("yes")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn snapshots(count: usize) -> Vec<Snapshot> {
        (0..count)
            .map(|i| Snapshot {
                name: format!("backup-2024-01-{:02}T00-00-00-000Z.tar.gz", 10 - i),
                path: PathBuf::from(format!("{}", i)),
                created_at: Utc::now(),
                size_bytes: 10,
            })
            .collect()
    }

    #[test]
    fn test_preset_selection() {
        let list = snapshots(3);
        let mut preset = PresetSelection::new(2, true);

        assert_eq!(preset.choose(&list).unwrap(), Some(2));
        assert!(preset.confirm(&list[2]).unwrap());
    }

    #[test]
    fn test_preset_out_of_range() {
        let mut preset = PresetSelection::new(3, true);
        let err = preset.choose(&snapshots(3)).unwrap_err();
        assert!(matches!(err, SnapvaultError::Validation(_)));
    }

    #[test]
    fn test_terminal_choose_and_confirm() {
        let list = snapshots(3);
        let mut output = Vec::new();
        let mut selector = TerminalSelector::new(Cursor::new("2\nyes\n"), &mut output);

        assert_eq!(selector.choose(&list).unwrap(), Some(1));
        assert!(selector.confirm(&list[1]).unwrap());

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("backup-2024-01-10T00-00-00-000Z.tar.gz"));
        assert!(shown.contains("[1-3]"));
        assert!(shown.contains("Proceed?"));
    }

    #[test]
    fn test_terminal_blank_cancels() {
        let mut output = Vec::new();
        let mut selector = TerminalSelector::new(Cursor::new("\n"), &mut output);
        assert_eq!(selector.choose(&snapshots(2)).unwrap(), None);
    }

    #[test]
    fn test_terminal_eof_declines() {
        let list = snapshots(1);
        let mut output = Vec::new();
        let mut selector = TerminalSelector::new(Cursor::new(""), &mut output);
        assert!(!selector.confirm(&list[0]).unwrap());
    }

    #[test]
    fn test_terminal_rejects_bad_number() {
        let mut output = Vec::new();
        let mut selector = TerminalSelector::new(Cursor::new("9\n"), &mut output);
        let err = selector.choose(&snapshots(2)).unwrap_err();
        assert!(matches!(err, SnapvaultError::Validation(_)));
    }
}
