//! Line editor abstraction for the shell.
//!
//! The shell reads through the [`LineEditor`] trait so tests can script
//! input. [`RustylineEditor`] is the terminal implementation; its tab
//! completion asks the [`CommandManager`] for suggestions.

use std::borrow::Cow;
use std::sync::Arc;

use cmdweave_command::{CommandManager, CommandSource};
use cmdweave_foundation::{Error, Result};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::HistoryHinter;
use rustyline::history::DefaultHistory;
use rustyline::{Completer, CompletionType, Config, Context, Editor, Helper, Hinter, Validator};

use tracing::warn;

use crate::config::ShellConfig;

/// Result of reading a line from the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadResult {
    /// A line was read.
    Line(String),
    /// The user pressed Ctrl+C.
    Interrupted,
    /// The user pressed Ctrl+D or input ended.
    Eof,
}

/// Abstraction over line editing.
pub trait LineEditor {
    /// Reads a line with the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the terminal fails.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Records a line in history.
    fn add_history(&mut self, line: &str);
}

/// Splits the text left of the cursor into the start of the word being
/// typed and the completions for it.
#[must_use]
pub fn complete_line(
    manager: &CommandManager,
    source: &dyn CommandSource,
    line: &str,
    pos: usize,
) -> (usize, Vec<String>) {
    let before = line.get(..pos).unwrap_or(line);
    let start = before.rfind(' ').map_or(0, |i| i + 1);
    (start, manager.suggestions(source, before))
}

struct CommandCompleter {
    manager: Arc<CommandManager>,
    source: Arc<dyn CommandSource>,
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, suggestions) = complete_line(&self.manager, self.source.as_ref(), line, pos);
        let candidates = suggestions
            .into_iter()
            .map(|s| Pair {
                display: s.clone(),
                replacement: s,
            })
            .collect();
        Ok((start, candidates))
    }
}

#[derive(Helper, Completer, Hinter, Validator)]
struct CommandHelper {
    #[rustyline(Completer)]
    completer: CommandCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
}

impl Highlighter for CommandHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(&'s self, prompt: &'p str, default: bool) -> Cow<'b, str> {
        if default {
            Cow::Owned(format!("\x1b[1;36m{prompt}\x1b[0m"))
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[2m{hint}\x1b[0m"))
    }
}

/// Line editor backed by rustyline, completing through a command manager.
pub struct RustylineEditor {
    editor: Editor<CommandHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// Creates an editor whose completions come from `manager` on behalf
    /// of `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is rejected or the terminal
    /// cannot be initialized.
    pub fn new(
        manager: Arc<CommandManager>,
        source: Arc<dyn CommandSource>,
        config: &ShellConfig,
    ) -> Result<Self> {
        let editor_config = Config::builder()
            .auto_add_history(false)
            .completion_type(CompletionType::List)
            .max_history_size(config.history_size)
            .and_then(|builder| builder.history_ignore_dups(config.history_ignore_dups))
            .map_err(|e| Error::fault(e.to_string()))?
            .build();

        let helper = CommandHelper {
            completer: CommandCompleter { manager, source },
            hinter: HistoryHinter::new(),
        };

        let mut editor = Editor::with_config(editor_config).map_err(|e| Error::fault(e.to_string()))?;
        editor.set_helper(Some(helper));
        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::fault(e.to_string())),
        }
    }

    fn add_history(&mut self, line: &str) {
        if let Err(e) = self.editor.add_history_entry(line) {
            warn!(error = %e, "failed to record history");
        }
    }
}
