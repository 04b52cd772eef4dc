//! Command sources: whoever typed the command and receives the replies.

use std::sync::{Mutex, PoisonError};

/// Locale reported by sources that do not override [`CommandSource::locale`].
pub const DEFAULT_LOCALE: &str = "en_US";

/// The sender of a command.
///
/// Parsing never looks at the source beyond passing it to dynamic choice
/// and suggestion providers. The top-level boundary uses
/// [`send_message`](Self::send_message) to report failures.
pub trait CommandSource: Send + Sync {
    /// Display name, used in logs.
    fn name(&self) -> &str;

    /// Delivers one line of rendered text.
    fn send_message(&self, message: &str);

    /// Presentation locale. Has no effect on parsing.
    fn locale(&self) -> &str {
        DEFAULT_LOCALE
    }

    /// Whether this source holds `permission`. Defaults to allowing everything.
    fn has_permission(&self, permission: &str) -> bool {
        let _ = permission;
        true
    }
}

/// A source that records every delivered line.
#[derive(Debug, Default)]
pub struct BufferedSource {
    name: String,
    denied: Vec<String>,
    messages: Mutex<Vec<String>>,
}

impl BufferedSource {
    /// Creates a buffered source with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Denies `permission` to this source.
    #[must_use]
    pub fn with_denied(mut self, permission: impl Into<String>) -> Self {
        self.denied.push(permission.into());
        self
    }

    /// Lines delivered so far.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns the lines delivered so far.
    pub fn take_messages(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl CommandSource for BufferedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn send_message(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }

    fn has_permission(&self, permission: &str) -> bool {
        !self.denied.iter().any(|p| p == permission)
    }
}
