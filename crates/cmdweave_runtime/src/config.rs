//! Console settings.

/// Settings for a [`Shell`](crate::Shell) and its line editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Prompt shown before each line.
    pub prompt: String,
    /// Text printed once when the shell starts.
    pub banner: Option<String>,
    /// Maximum number of history entries kept.
    pub history_size: usize,
    /// Skip a history entry equal to the previous one.
    pub history_ignore_dups: bool,
    /// Display name of the console source.
    pub source_name: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            banner: None,
            history_size: 1000,
            history_ignore_dups: true,
            source_name: "console".to_string(),
        }
    }
}

impl ShellConfig {
    /// Default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Sets the startup banner.
    #[must_use]
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    /// Disables the startup banner.
    #[must_use]
    pub fn without_banner(mut self) -> Self {
        self.banner = None;
        self
    }

    /// Sets the history capacity.
    #[must_use]
    pub const fn with_history_size(mut self, size: usize) -> Self {
        self.history_size = size;
        self
    }

    /// Sets whether consecutive duplicate lines are recorded once.
    #[must_use]
    pub const fn with_history_ignore_dups(mut self, ignore: bool) -> Self {
        self.history_ignore_dups = ignore;
        self
    }

    /// Sets the console source name.
    #[must_use]
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }
}
