//! The interactive shell loop.

use std::sync::Arc;

use cmdweave_command::{CommandManager, CommandResult, CommandSource};
use cmdweave_foundation::Result;
use tracing::{debug, info};

use crate::config::ShellConfig;
use crate::console::ConsoleSource;
use crate::editor::{LineEditor, ReadResult, RustylineEditor};

/// Reads command lines and runs them through a [`CommandManager`].
pub struct Shell<E: LineEditor = RustylineEditor> {
    editor: E,
    manager: Arc<CommandManager>,
    source: Arc<dyn CommandSource>,
    config: ShellConfig,
}

impl Shell<RustylineEditor> {
    /// Creates a shell on the terminal, printing to standard output.
    ///
    /// # Errors
    ///
    /// Returns an error if the line editor fails to initialize.
    pub fn new(manager: Arc<CommandManager>, config: ShellConfig) -> Result<Self> {
        let source: Arc<dyn CommandSource> = Arc::new(ConsoleSource::new(config.source_name.clone()));
        let editor = RustylineEditor::new(Arc::clone(&manager), Arc::clone(&source), &config)?;
        Ok(Self {
            editor,
            manager,
            source,
            config,
        })
    }
}

impl<E: LineEditor> Shell<E> {
    /// Creates a shell over any editor and source.
    pub fn with_editor(
        editor: E,
        manager: Arc<CommandManager>,
        source: Arc<dyn CommandSource>,
        config: ShellConfig,
    ) -> Self {
        Self {
            editor,
            manager,
            source,
            config,
        }
    }

    /// The manager commands are sent to.
    #[must_use]
    pub fn manager(&self) -> &Arc<CommandManager> {
        &self.manager
    }

    /// Runs until end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails.
    pub fn run(&mut self) -> Result<()> {
        if let Some(banner) = &self.config.banner {
            self.source.send_message(banner);
        }
        info!(source = self.source.name(), "shell started");
        while self.step()? {}
        info!(source = self.source.name(), "shell stopped");
        Ok(())
    }

    /// Reads and runs one line. Returns `false` at end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails.
    pub fn step(&mut self) -> Result<bool> {
        match self.editor.read_line(&self.config.prompt)? {
            ReadResult::Line(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    self.editor.add_history(trimmed);
                    self.execute(trimmed);
                }
                Ok(true)
            }
            ReadResult::Interrupted => {
                debug!("line cancelled");
                Ok(true)
            }
            ReadResult::Eof => Ok(false),
        }
    }

    /// Runs one command line.
    pub fn execute(&self, line: &str) -> CommandResult {
        debug!(line, "executing");
        self.manager.process(self.source.as_ref(), line)
    }
}
