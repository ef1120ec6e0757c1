//! Output streams the spinner set can paint on.
//!
//! A [`TermStream`] is a writer that can also answer two questions: is it
//! an interactive terminal, and how many columns does it have.

use std::io::{self, IsTerminal, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A writable terminal (or terminal stand-in).
pub trait TermStream: Write + Send {
    /// Whether the stream is attached to an interactive terminal.
    fn is_terminal(&self) -> bool;

    /// Current width in columns, if known.
    fn columns(&self) -> Option<usize>;
}

fn terminal_columns() -> Option<usize> {
    crossterm::terminal::size()
        .ok()
        .map(|(cols, _)| usize::from(cols))
        .filter(|cols| *cols > 0)
}

// ── StderrStream / StdoutStream ───────────────────────────────────────────────

/// The process's standard error, the default spinner surface.
pub struct StderrStream(io::Stderr);

impl StderrStream {
    pub fn new() -> Self {
        Self(io::stderr())
    }
}

impl Default for StderrStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for StderrStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl TermStream for StderrStream {
    fn is_terminal(&self) -> bool {
        self.0.is_terminal()
    }

    fn columns(&self) -> Option<usize> {
        if self.is_terminal() {
            terminal_columns()
        } else {
            None
        }
    }
}

/// The process's standard output.
pub struct StdoutStream(io::Stdout);

impl StdoutStream {
    pub fn new() -> Self {
        Self(io::stdout())
    }
}

impl Default for StdoutStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for StdoutStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl TermStream for StdoutStream {
    fn is_terminal(&self) -> bool {
        self.0.is_terminal()
    }

    fn columns(&self) -> Option<usize> {
        if self.is_terminal() {
            terminal_columns()
        } else {
            None
        }
    }
}

// ── MemoryStream ──────────────────────────────────────────────────────────────

/// An in-memory stream that records everything written to it.
///
/// Clones share the same buffer, so one clone can be handed to a spinner set
/// while another is kept to inspect the output. Column count and
/// interactivity are settable, which makes it the stream of choice for tests
/// and headless captures.
#[derive(Clone, Default)]
pub struct MemoryStream {
    buffer: Arc<Mutex<Vec<u8>>>,
    columns: Arc<AtomicUsize>,
    interactive: Arc<AtomicBool>,
}

impl MemoryStream {
    /// A non-interactive stream reporting `columns` (0 means unknown).
    pub fn new(columns: usize) -> Self {
        let stream = Self::default();
        stream.set_columns(columns);
        stream
    }

    /// Builder: report the stream as an interactive terminal.
    pub fn interactive(self, interactive: bool) -> Self {
        self.interactive.store(interactive, Ordering::SeqCst);
        self
    }

    /// Change the reported width.
    pub fn set_columns(&self, columns: usize) {
        self.columns.store(columns, Ordering::SeqCst);
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Return everything written so far and clear the buffer.
    pub fn take(&self) -> String {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        let text = String::from_utf8_lossy(&buffer).into_owned();
        buffer.clear();
        text
    }
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl TermStream for MemoryStream {
    fn is_terminal(&self) -> bool {
        self.interactive.load(Ordering::SeqCst)
    }

    fn columns(&self) -> Option<usize> {
        match self.columns.load(Ordering::SeqCst) {
            0 => None,
            cols => Some(cols),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_stream_clones_share_buffer() {
        let stream = MemoryStream::new(40);
        let mut writer = stream.clone();
        write!(writer, "hello").unwrap();
        assert_eq!(stream.contents(), "hello");
    }

    #[test]
    fn test_memory_stream_take_clears() {
        let mut stream = MemoryStream::new(40);
        write!(stream, "abc").unwrap();
        assert_eq!(stream.take(), "abc");
        assert_eq!(stream.contents(), "");
    }

    #[test]
    fn test_memory_stream_columns() {
        let stream = MemoryStream::new(0);
        assert_eq!(stream.columns(), None);
        stream.set_columns(120);
        assert_eq!(stream.columns(), Some(120));
    }

    #[test]
    fn test_memory_stream_interactive_flag() {
        assert!(!MemoryStream::new(10).is_terminal());
        assert!(MemoryStream::new(10).interactive(true).is_terminal());
    }
}
