//! The argument cursor.
//!
//! [`CommandArgs`] walks the tokens of one invocation. Elements consume
//! tokens through it, and speculative parses capture an [`ArgsSnapshot`]
//! first so they can rewind exactly. The token list is a persistent vector,
//! so snapshots stay O(1) even when flags edit the stream.

use cmdweave_foundation::ArgumentParseError;

use crate::tokenizer::Token;

/// Immutable capture of a cursor's position and token list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArgsSnapshot {
    consumed: usize,
    tokens: im::Vector<Token>,
}

/// Stateful cursor over the tokens of one invocation.
#[derive(Clone, Debug)]
pub struct CommandArgs {
    raw: String,
    tokens: im::Vector<Token>,
    /// Number of tokens consumed; the current token is `consumed - 1`.
    consumed: usize,
}

impl CommandArgs {
    /// Creates a cursor positioned before the first token.
    #[must_use]
    pub fn new(raw: impl Into<String>, tokens: impl IntoIterator<Item = Token>) -> Self {
        Self {
            raw: raw.into(),
            tokens: tokens.into_iter().collect(),
            consumed: 0,
        }
    }

    /// Returns true if another token can be read.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.consumed < self.tokens.len()
    }

    /// Returns the next token's value without advancing.
    ///
    /// # Errors
    ///
    /// Fails with "Not enough arguments!" when no tokens remain.
    pub fn peek(&self) -> Result<&str, ArgumentParseError> {
        self.tokens
            .get(self.consumed)
            .map(|t| t.value.as_str())
            .ok_or_else(|| self.create_error("Not enough arguments!"))
    }

    /// Returns the next token's value and advances.
    ///
    /// # Errors
    ///
    /// Fails with "Not enough arguments!" when no tokens remain.
    pub fn next(&mut self) -> Result<String, ArgumentParseError> {
        let value = self.peek()?.to_string();
        self.consumed += 1;
        Ok(value)
    }

    /// Returns the next token's value and advances, if there is one.
    pub fn next_if_present(&mut self) -> Option<String> {
        self.next().ok()
    }

    /// Steps back one token.
    pub fn previous(&mut self) {
        self.consumed = self.consumed.saturating_sub(1);
    }

    /// Number of tokens currently in the stream.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the stream holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token value at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(|t| t.value.as_str())
    }

    /// All token values, in order.
    #[must_use]
    pub fn all(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.value.clone()).collect()
    }

    /// The raw input the tokens were read from.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Character offset of the current token, or 0 before the first.
    #[must_use]
    pub fn raw_position(&self) -> usize {
        self.current().map_or(0, |t| t.start)
    }

    /// The raw input from the current token's start onward.
    #[must_use]
    pub fn raw_from_current(&self) -> String {
        self.raw.chars().skip(self.raw_position()).collect()
    }

    fn current(&self) -> Option<&Token> {
        self.consumed.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    /// Inserts a synthetic token right after the cursor.
    ///
    /// The new token is positioned at the end of the current token.
    pub fn insert_arg(&mut self, value: impl Into<String>) {
        let at = self.current().map_or(0, |t| t.end);
        self.tokens.insert(self.consumed, Token::new(value, at, at));
    }

    /// Removes the tokens consumed between two snapshots, inclusive of the
    /// token current at `start`.
    ///
    /// A cursor inside the removed range rolls back to just before it; a
    /// cursor past it shifts left by the removed count.
    pub fn remove_args(&mut self, start: &ArgsSnapshot, end: &ArgsSnapshot) {
        let Some(first) = start.consumed.checked_sub(1) else {
            return;
        };
        let Some(last) = end.consumed.checked_sub(1) else {
            return;
        };
        if self.consumed >= start.consumed {
            if self.consumed < end.consumed {
                self.consumed = first;
            } else {
                self.consumed -= end.consumed.saturating_sub(first);
            }
        }
        if last >= first && first < self.tokens.len() {
            let mut removed = self.tokens.split_off(first);
            let count = (last - first + 1).min(removed.len());
            self.tokens.append(removed.split_off(count));
        }
        self.consumed = self.consumed.min(self.tokens.len());
    }

    /// Captures the current position and tokens.
    #[must_use]
    pub fn snapshot(&self) -> ArgsSnapshot {
        ArgsSnapshot {
            consumed: self.consumed,
            tokens: self.tokens.clone(),
        }
    }

    /// Restores a snapshot.
    ///
    /// With `reset_tokens` false only the position is restored, keeping any
    /// edits made to the stream since.
    pub fn apply_snapshot(&mut self, snapshot: &ArgsSnapshot, reset_tokens: bool) {
        if reset_tokens {
            self.tokens = snapshot.tokens.clone();
        }
        self.consumed = snapshot.consumed.min(self.tokens.len());
    }

    /// Creates an error positioned at the current token.
    #[must_use]
    pub fn create_error(&self, message: impl Into<String>) -> ArgumentParseError {
        ArgumentParseError::new(message, self.raw.clone(), self.raw_position())
    }
}
