//! The parse context: a multi-valued bag of parsed arguments.

use cmdweave_foundation::{ContextError, ListMultimap, Value};

/// Key set to `true` while a context is used to compute completions.
pub const TAB_COMPLETION: &str = "tab-complete-50456";

/// Immutable capture of a context's values.
#[derive(Clone, Debug, PartialEq)]
pub struct ContextSnapshot(ListMultimap<Value>);

/// Parsed arguments, keyed by element key.
///
/// A key may hold several values, in the order they were parsed.
#[derive(Clone, Debug, Default)]
pub struct CommandContext {
    values: ListMultimap<Value>,
}

impl CommandContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context flagged for completion.
    #[must_use]
    pub fn for_completion() -> Self {
        let mut context = Self::new();
        context.put_arg(TAB_COMPLETION, true);
        context
    }

    /// Appends a value under `key`.
    pub fn put_arg(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values = self.values.insert(key, value.into());
    }

    /// The value under `key`, if exactly one is present.
    #[must_use]
    pub fn get_one(&self, key: &str) -> Option<&Value> {
        match self.values.get(key) {
            Some(values) if values.len() == 1 => values.front(),
            _ => None,
        }
    }

    /// All values under `key`, in insertion order.
    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&Value> {
        self.values
            .get(key)
            .map(|values| values.iter().collect())
            .unwrap_or_default()
    }

    /// The single value under `key`.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotFound`] when there is no value, and
    /// [`ContextError::Ambiguous`] when there are several.
    pub fn require_one(&self, key: &str) -> Result<&Value, ContextError> {
        match self.values.get(key) {
            None => Err(ContextError::NotFound(key.to_string())),
            Some(values) if values.len() > 1 => Err(ContextError::Ambiguous {
                key: key.to_string(),
                count: values.len(),
            }),
            Some(values) => values
                .front()
                .ok_or_else(|| ContextError::NotFound(key.to_string())),
        }
    }

    /// Returns true if any value is stored under `key`.
    #[must_use]
    pub fn has_any(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns true while computing completions.
    #[must_use]
    pub fn is_completing(&self) -> bool {
        self.has_any(TAB_COMPLETION)
    }

    /// Iterates over stored keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys()
    }

    /// Captures every stored value.
    #[must_use]
    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot(self.values.clone())
    }

    /// Restores a snapshot, discarding anything stored since.
    pub fn apply_snapshot(&mut self, snapshot: &ContextSnapshot) {
        self.values = snapshot.0.clone();
    }
}
