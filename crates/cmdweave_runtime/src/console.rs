//! The console command source.

use std::io::{self, Write};

use cmdweave_command::CommandSource;
use tracing::warn;

/// A source that prints every message to standard output.
#[derive(Debug, Clone)]
pub struct ConsoleSource {
    name: String,
}

impl ConsoleSource {
    /// Creates a console source with the given display name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for ConsoleSource {
    fn default() -> Self {
        Self::new("console")
    }
}

impl CommandSource for ConsoleSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn send_message(&self, message: &str) {
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{message}").and_then(|()| stdout.flush()) {
            warn!(source = %self.name, error = %e, "failed to write to stdout");
        }
    }
}
