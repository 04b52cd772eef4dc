//! Callables, executors, and the mappings that bind them to aliases.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use cmdweave_foundation::Result;

use crate::context::CommandContext;
use crate::source::CommandSource;
use crate::spec::CommandSpec;

/// Outcome of running a command.
///
/// Both counts absent means the command did nothing worth reporting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommandResult {
    success_count: Option<i32>,
    query_result: Option<i32>,
}

impl CommandResult {
    /// A result carrying no counts.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            success_count: None,
            query_result: None,
        }
    }

    /// A result with a success count of one.
    #[must_use]
    pub const fn success() -> Self {
        Self::empty().with_success_count(1)
    }

    /// A result with the given query count.
    #[must_use]
    pub const fn query(count: i32) -> Self {
        Self::empty().with_query_result(count)
    }

    /// Sets the success count.
    #[must_use]
    pub const fn with_success_count(mut self, count: i32) -> Self {
        self.success_count = Some(count);
        self
    }

    /// Sets the query result.
    #[must_use]
    pub const fn with_query_result(mut self, count: i32) -> Self {
        self.query_result = Some(count);
        self
    }

    /// How many times the command succeeded.
    #[must_use]
    pub const fn success_count(&self) -> Option<i32> {
        self.success_count
    }

    /// Count reported by a query-style command.
    #[must_use]
    pub const fn query_result(&self) -> Option<i32> {
        self.query_result
    }

    /// Returns true if neither count is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.success_count.is_none() && self.query_result.is_none()
    }
}

/// Runs a command once its arguments are parsed.
pub trait CommandExecutor: Send + Sync {
    /// Executes with the parsed context.
    ///
    /// # Errors
    ///
    /// Any error; the top-level boundary turns it into a message.
    fn execute(&self, source: &dyn CommandSource, context: &CommandContext) -> Result<CommandResult>;
}

impl<F> CommandExecutor for F
where
    F: Fn(&dyn CommandSource, &CommandContext) -> Result<CommandResult> + Send + Sync,
{
    fn execute(&self, source: &dyn CommandSource, context: &CommandContext) -> Result<CommandResult> {
        self(source, context)
    }
}

/// Anything that can be registered in a dispatcher.
pub trait CommandCallable: Send + Sync {
    /// Parses `arguments` and runs the command.
    ///
    /// # Errors
    ///
    /// Parse, permission, lookup, and execution errors.
    fn process(&self, source: &dyn CommandSource, arguments: &str) -> Result<CommandResult>;

    /// Completions for the partially typed `arguments`.
    ///
    /// # Errors
    ///
    /// Implementations may fail; the boundary reports the failure.
    fn suggestions(&self, source: &dyn CommandSource, arguments: &str) -> Result<Vec<String>>;

    /// One-line description.
    fn short_description(&self, source: &dyn CommandSource) -> Option<String>;

    /// Full help text.
    fn help(&self, source: &dyn CommandSource) -> Option<String>;

    /// Usage string, without the command name.
    fn usage(&self, source: &dyn CommandSource) -> String;

    /// The grammar-backed spec behind this callable, if it has one.
    ///
    /// Child dispatch parses spec-backed subcommands in place instead of
    /// handing them the raw remainder.
    fn as_spec(&self) -> Option<&CommandSpec> {
        None
    }
}

/// A callable bound to its aliases.
pub struct CommandMapping {
    primary: String,
    aliases: BTreeSet<String>,
    callable: Arc<dyn CommandCallable>,
}

impl CommandMapping {
    /// Creates a mapping. The primary alias is always part of the alias set.
    #[must_use]
    pub fn new(
        primary: impl Into<String>,
        aliases: impl IntoIterator<Item = String>,
        callable: Arc<dyn CommandCallable>,
    ) -> Self {
        let primary = primary.into();
        let mut aliases: BTreeSet<String> = aliases.into_iter().collect();
        aliases.insert(primary.clone());
        Self {
            primary,
            aliases,
            callable,
        }
    }

    /// The alias the command is known by.
    #[must_use]
    pub fn primary_alias(&self) -> &str {
        &self.primary
    }

    /// Every alias, including the primary one.
    #[must_use]
    pub fn all_aliases(&self) -> &BTreeSet<String> {
        &self.aliases
    }

    /// The bound callable.
    #[must_use]
    pub fn callable(&self) -> &Arc<dyn CommandCallable> {
        &self.callable
    }
}

impl fmt::Debug for CommandMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandMapping")
            .field("primary", &self.primary)
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}
