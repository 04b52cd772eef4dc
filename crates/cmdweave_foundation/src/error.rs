//! Error types for cmdweave.
//!
//! Parsing reports [`ArgumentParseError`], a positioned error that knows how
//! to point at the offending input. Everything that crosses a dispatch
//! boundary is wrapped in [`Error`], whose [`ErrorKind`] decides how the
//! top-level boundary presents it.

use std::fmt;

use thiserror::Error;

/// Width of the input window shown under a parse error.
const ANNOTATION_WIDTH: usize = 80;
/// Characters kept on either side of the error position when the input is windowed.
const ANNOTATION_RADIUS: usize = 37;
const ELLIPSIS: &str = "...";

/// A parse failure at a known position in the input.
///
/// The rendered form is the message, followed by the input text and a caret
/// line pointing at [`position`](Self::position). Positions are measured in
/// characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArgumentParseError {
    message: String,
    input: String,
    position: usize,
    usage: Option<String>,
}

impl ArgumentParseError {
    /// Creates a parse error pointing at `position` within `input`.
    #[must_use]
    pub fn new(message: impl Into<String>, input: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            input: input.into(),
            position,
            usage: None,
        }
    }

    /// Attaches a usage string, replacing any usage already present.
    #[must_use]
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    /// The bare message, without the position annotation.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The input text the error refers to.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Character offset of the error within [`input`](Self::input).
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Usage attached at a dispatch boundary, if any.
    #[must_use]
    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    /// Renders the input with a caret under the error position.
    ///
    /// Long inputs are cut down to a window around the position, with `...`
    /// marking the elided ends.
    #[must_use]
    pub fn annotated_position(&self) -> String {
        let chars: Vec<char> = self.input.chars().collect();
        let mut position = self.position;
        let shown = if chars.len() > ANNOTATION_WIDTH {
            if position >= ANNOTATION_RADIUS {
                let start = position - ANNOTATION_RADIUS;
                let end = (position + ANNOTATION_RADIUS).min(chars.len());
                let mut window = String::from(ELLIPSIS);
                window.extend(&chars[start.min(end)..end]);
                if end < chars.len() {
                    window.push_str(ELLIPSIS);
                }
                position = ELLIPSIS.len() + ANNOTATION_RADIUS;
                window
            } else {
                let mut window: String = chars[..ANNOTATION_WIDTH - ELLIPSIS.len()].iter().collect();
                window.push_str(ELLIPSIS);
                window
            }
        } else {
            self.input.clone()
        };
        format!("{shown}\n{}^", " ".repeat(position))
    }
}

impl fmt::Display for ArgumentParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.input.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}\n{}", self.message, self.annotated_position())
        }
    }
}

impl std::error::Error for ArgumentParseError {}

/// Misuse of a parse context accessor that demands exactly one value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// No value was stored under the key.
    #[error("no value present for key '{0}'")]
    NotFound(String),

    /// More than one value was stored under the key.
    #[error("{count} values present for key '{key}', expected exactly one")]
    Ambiguous {
        /// The key that was queried.
        key: String,
        /// How many values were found.
        count: usize,
    },
}

/// The error type returned across dispatch boundaries.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    /// Creates a command-not-found error for the attempted key.
    #[must_use]
    pub fn command_not_found(command: impl Into<String>) -> Self {
        Self::new(ErrorKind::CommandNotFound {
            command: command.into(),
        })
    }

    /// Creates a permission error with the default denial message.
    #[must_use]
    pub fn permission_denied() -> Self {
        Self::new(ErrorKind::PermissionDenied(
            "You do not have permission to use this command!".to_string(),
        ))
    }

    /// Creates a plain command error shown to the source without usage.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Command {
            message: message.into(),
            include_usage: false,
        })
    }

    /// Creates a command error that asks the boundary to print usage.
    #[must_use]
    pub fn with_usage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Command {
            message: message.into(),
            include_usage: true,
        })
    }

    /// Creates an invalid-spec error for builder misuse.
    #[must_use]
    pub fn invalid_spec(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidSpec(message.into()))
    }

    /// Creates a duplicate-alias error.
    #[must_use]
    pub fn duplicate_alias(owner: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateAlias {
            owner: owner.into(),
            alias: alias.into(),
        })
    }

    /// Wraps an unexpected failure raised while executing a command.
    #[must_use]
    pub fn fault(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::new(ErrorKind::Fault(error.into()))
    }

    /// Whether the boundary should follow this error with a usage line.
    #[must_use]
    pub fn include_usage(&self) -> bool {
        match &self.kind {
            ErrorKind::ArgumentParse(_) => true,
            ErrorKind::Command { include_usage, .. } => *include_usage,
            _ => false,
        }
    }

    /// Usage carried by the error itself, if any.
    #[must_use]
    pub fn usage(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::ArgumentParse(err) => err.usage(),
            _ => None,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<ArgumentParseError> for Error {
    fn from(err: ArgumentParseError) -> Self {
        Self::new(ErrorKind::ArgumentParse(err))
    }
}

impl From<ContextError> for Error {
    fn from(err: ContextError) -> Self {
        Self::new(ErrorKind::Context(err))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Tokenizing or parsing the arguments failed.
    #[error(transparent)]
    ArgumentParse(ArgumentParseError),

    /// No command is registered under the attempted key.
    #[error("No such command: {command}")]
    CommandNotFound {
        /// The key that failed to resolve.
        command: String,
    },

    /// The source may not run the command.
    #[error("{0}")]
    PermissionDenied(String),

    /// A user-facing command failure.
    #[error("{message}")]
    Command {
        /// Message shown to the source.
        message: String,
        /// Whether a usage line should follow the message.
        include_usage: bool,
    },

    /// A context accessor found zero or several values.
    #[error(transparent)]
    Context(ContextError),

    /// A command spec was assembled incorrectly.
    #[error("invalid command spec: {0}")]
    InvalidSpec(String),

    /// An owner tried to register the same alias twice.
    #[error("owner '{owner}' already registered the alias '{alias}'")]
    DuplicateAlias {
        /// Owner id.
        owner: String,
        /// The normalized alias.
        alias: String,
    },

    /// An unexpected failure inside an executor.
    #[error(transparent)]
    Fault(Box<dyn std::error::Error + Send + Sync>),
}
