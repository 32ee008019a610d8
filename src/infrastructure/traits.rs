//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Interactive question/answer exchange with a user.
pub trait Prompter {
    /// Present a question and its options, return the chosen option text.
    /// Returns None when input is exhausted (EOF, Ctrl-D).
    fn choose(&mut self, question: &str, options: &[String]) -> io::Result<Option<String>>;

    /// Tell the user something went wrong with the last choice.
    fn notify(&mut self, message: &str) -> io::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Line-oriented prompter over any reader/writer pair.
///
/// Accepts either the exact option text or its 1-based number; a number is
/// translated to the option text before it is returned.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl LinePrompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompter on the process terminal.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn choose(&mut self, question: &str, options: &[String]) -> io::Result<Option<String>> {
        writeln!(self.output, "{}", question.cyan().bold())?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {}", i + 1, option)?;
        }
        write!(self.output, "> ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let choice = line.trim();

        let by_number = choice
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.get(i));
        Ok(Some(by_number.cloned().unwrap_or_else(|| choice.to_string())))
    }

    fn notify(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}: {}", "Warning".yellow(), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn options() -> Vec<String> {
        vec!["Yes".to_string(), "No".to_string()]
    }

    #[test]
    fn given_number_when_choosing_then_returns_option_text() {
        let mut prompter = LinePrompter::new(Cursor::new("2\n"), Vec::new());

        let choice = prompter.choose("Serviced?", &options()).unwrap();

        assert_eq!(choice.as_deref(), Some("No"));
        let shown = String::from_utf8(prompter.into_output()).unwrap();
        assert!(shown.contains("1) Yes"));
        assert!(shown.contains("2) No"));
    }

    #[test]
    fn given_text_when_choosing_then_returns_it_verbatim() {
        let mut prompter = LinePrompter::new(Cursor::new("  yes \n"), Vec::new());

        let choice = prompter.choose("Serviced?", &options()).unwrap();

        assert_eq!(choice.as_deref(), Some("yes"));
    }

    #[test]
    fn given_out_of_range_number_when_choosing_then_returns_raw_text() {
        let mut prompter = LinePrompter::new(Cursor::new("7\n"), Vec::new());

        let choice = prompter.choose("Serviced?", &options()).unwrap();

        assert_eq!(choice.as_deref(), Some("7"));
    }

    #[test]
    fn given_eof_when_choosing_then_returns_none() {
        let mut prompter = LinePrompter::new(Cursor::new(""), Vec::new());

        assert_eq!(prompter.choose("Serviced?", &options()).unwrap(), None);
    }
}
