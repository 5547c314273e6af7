//! The console seam: where a client session writes what the human reads.

/// Text output for a client session.
///
/// The session never prints directly. The binary plugs in a console that
/// writes to stdout/stderr; tests plug in [`BufferConsole`] and inspect
/// what would have been shown.
pub trait Console {
    /// Shows a status line.
    fn info(&mut self, line: &str);

    /// Shows an error line (rejected input, server rejections).
    fn error(&mut self, line: &str);
}

/// A [`Console`] that keeps every line in memory.
#[derive(Debug, Default, Clone)]
pub struct BufferConsole {
    /// Lines written with [`Console::info`], oldest first.
    pub info: Vec<String>,
    /// Lines written with [`Console::error`], oldest first.
    pub errors: Vec<String>,
}

impl BufferConsole {
    /// Creates an empty console.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if any info line contains `needle`.
    pub fn saw(&self, needle: &str) -> bool {
        self.info.iter().any(|line| line.contains(needle))
    }

    /// Forgets everything written so far.
    pub fn clear(&mut self) {
        self.info.clear();
        self.errors.clear();
    }
}

impl Console for BufferConsole {
    fn info(&mut self, line: &str) {
        self.info.push(line.to_string());
    }

    fn error(&mut self, line: &str) {
        self.errors.push(line.to_string());
    }
}
