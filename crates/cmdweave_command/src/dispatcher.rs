//! Alias-keyed command routing.
//!
//! A [`Dispatcher`] maps lowercase aliases to [`CommandMapping`]s. Several
//! mappings may share an alias; a [`Disambiguator`] picks one at lookup
//! time. The alias table is a persistent multimap behind an `RwLock`, so
//! readers clone it in O(1) and release the lock before running any
//! callback or callable.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use cmdweave_foundation::{Error, ErrorKind, ListMultimap, Result};

use crate::format::starts_with_ignore_case;
use crate::mapping::{CommandCallable, CommandMapping, CommandResult};
use crate::source::CommandSource;

/// Picks one mapping when several share the alias that was typed.
pub trait Disambiguator: Send + Sync {
    /// Chooses among `candidates`, which always holds at least two entries.
    fn disambiguate(
        &self,
        source: Option<&dyn CommandSource>,
        alias: &str,
        candidates: &[Arc<CommandMapping>],
    ) -> Option<Arc<CommandMapping>>;
}

impl<F> Disambiguator for F
where
    F: Fn(Option<&dyn CommandSource>, &str, &[Arc<CommandMapping>]) -> Option<Arc<CommandMapping>> + Send + Sync,
{
    fn disambiguate(
        &self,
        source: Option<&dyn CommandSource>,
        alias: &str,
        candidates: &[Arc<CommandMapping>],
    ) -> Option<Arc<CommandMapping>> {
        self(source, alias, candidates)
    }
}

/// Prefers the mapping whose primary alias is the one typed, else the
/// first registered.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstDisambiguator;

impl Disambiguator for FirstDisambiguator {
    fn disambiguate(
        &self,
        _source: Option<&dyn CommandSource>,
        alias: &str,
        candidates: &[Arc<CommandMapping>],
    ) -> Option<Arc<CommandMapping>> {
        let alias = alias.to_lowercase();
        candidates
            .iter()
            .find(|m| m.primary_alias().to_lowercase() == alias)
            .or_else(|| candidates.first())
            .cloned()
    }
}

/// Routes command lines to registered callables by their first word.
pub struct Dispatcher {
    disambiguator: Arc<dyn Disambiguator>,
    commands: RwLock<ListMultimap<Arc<CommandMapping>>>,
}

impl Dispatcher {
    /// Creates an empty dispatcher using [`FirstDisambiguator`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_disambiguator(FirstDisambiguator)
    }

    /// Creates an empty dispatcher with a custom disambiguator.
    #[must_use]
    pub fn with_disambiguator(disambiguator: impl Disambiguator + 'static) -> Self {
        Self {
            disambiguator: Arc::new(disambiguator),
            commands: RwLock::new(ListMultimap::new()),
        }
    }

    /// A snapshot of the alias table.
    #[must_use]
    pub fn table(&self) -> ListMultimap<Arc<CommandMapping>> {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write(&self) -> RwLockWriteGuard<'_, ListMultimap<Arc<CommandMapping>>> {
        self.commands.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `callable` under `aliases`; the first alias is the primary.
    ///
    /// Returns `None` when no aliases are given.
    pub fn register(
        &self,
        callable: Arc<dyn CommandCallable>,
        aliases: impl IntoIterator<Item = impl Into<String>>,
    ) -> Option<Arc<CommandMapping>> {
        self.register_with(callable, aliases, |aliases| aliases)
    }

    /// Registers `callable` under whatever aliases `callback` keeps.
    ///
    /// Returns `None` when the callback leaves no aliases.
    pub fn register_with(
        &self,
        callable: Arc<dyn CommandCallable>,
        aliases: impl IntoIterator<Item = impl Into<String>>,
        callback: impl FnOnce(Vec<String>) -> Vec<String>,
    ) -> Option<Arc<CommandMapping>> {
        let aliases = callback(aliases.into_iter().map(Into::into).collect());
        let (primary, secondary) = aliases.split_first()?;
        let mapping = Arc::new(CommandMapping::new(
            primary.clone(),
            secondary.iter().cloned(),
            callable,
        ));

        let mut commands = self.write();
        let mut table = commands.clone();
        for alias in &aliases {
            table = table.insert(alias.to_lowercase(), Arc::clone(&mapping));
        }
        *commands = table;
        Some(mapping)
    }

    /// Removes every mapping under `alias`, returning them.
    pub fn remove(&self, alias: &str) -> Vec<Arc<CommandMapping>> {
        let alias = alias.to_lowercase();
        let mut commands = self.write();
        let removed = commands
            .get(&alias)
            .map(|values| values.iter().cloned().collect())
            .unwrap_or_default();
        *commands = commands.remove_key(&alias);
        removed
    }

    /// Removes every mapping under each of `aliases`. Returns true if
    /// anything was removed.
    pub fn remove_all<S: AsRef<str>>(&self, aliases: &[S]) -> bool {
        let mut commands = self.write();
        let mut table = commands.clone();
        let mut found = false;
        for alias in aliases {
            let alias = alias.as_ref().to_lowercase();
            found |= table.contains_key(&alias);
            table = table.remove_key(&alias);
        }
        *commands = table;
        found
    }

    /// Removes `mapping` under every alias.
    pub fn remove_mapping(&self, mapping: &Arc<CommandMapping>) -> Option<Arc<CommandMapping>> {
        let mut commands = self.write();
        if !commands.values().any(|m| Arc::ptr_eq(m, mapping)) {
            return None;
        }
        *commands = commands.retain(|_, m| !Arc::ptr_eq(m, mapping));
        Some(Arc::clone(mapping))
    }

    /// Removes each of `mappings` under every alias. Returns true if
    /// anything was removed.
    pub fn remove_mappings(&self, mappings: &[Arc<CommandMapping>]) -> bool {
        let targeted = |m: &Arc<CommandMapping>| mappings.iter().any(|t| Arc::ptr_eq(t, m));
        let mut commands = self.write();
        let before = commands.len();
        *commands = commands.retain(|_, m| !targeted(m));
        commands.len() != before
    }

    /// Every registered mapping, once each.
    #[must_use]
    pub fn commands(&self) -> Vec<Arc<CommandMapping>> {
        let mut unique: Vec<Arc<CommandMapping>> = Vec::new();
        for mapping in self.table().values() {
            if !unique.iter().any(|m| Arc::ptr_eq(m, mapping)) {
                unique.push(Arc::clone(mapping));
            }
        }
        unique
    }

    /// The primary alias of every mapping.
    #[must_use]
    pub fn primary_aliases(&self) -> BTreeSet<String> {
        self.table()
            .values()
            .map(|m| m.primary_alias().to_string())
            .collect()
    }

    /// Every alias of every mapping.
    #[must_use]
    pub fn aliases(&self) -> BTreeSet<String> {
        self.table()
            .values()
            .flat_map(|m| m.all_aliases().iter().cloned())
            .collect()
    }

    /// Resolves `alias`, disambiguating when several mappings share it.
    #[must_use]
    pub fn get(&self, alias: &str, source: Option<&dyn CommandSource>) -> Option<Arc<CommandMapping>> {
        let candidates = self.get_all(alias);
        match candidates.as_slice() {
            [] => None,
            [only] => Some(Arc::clone(only)),
            _ => self.disambiguator.disambiguate(source, alias, &candidates),
        }
    }

    /// Every mapping registered under `alias`, in registration order.
    #[must_use]
    pub fn get_all(&self, alias: &str) -> Vec<Arc<CommandMapping>> {
        self.table()
            .get(&alias.to_lowercase())
            .map(|values| values.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns true if anything is registered under `alias`.
    #[must_use]
    pub fn contains_alias(&self, alias: &str) -> bool {
        self.table().contains_key(&alias.to_lowercase())
    }

    /// Returns true if `mapping` is registered under any alias.
    #[must_use]
    pub fn contains_mapping(&self, mapping: &Arc<CommandMapping>) -> bool {
        self.table().values().any(|m| Arc::ptr_eq(m, mapping))
    }

    /// Number of (alias, mapping) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("commands", &self.table())
            .finish_non_exhaustive()
    }
}

impl CommandCallable for Dispatcher {
    fn process(&self, source: &dyn CommandSource, line: &str) -> Result<CommandResult> {
        let (command, arguments) = line.split_once(' ').unwrap_or((line, ""));
        let mapping = self
            .get(command, Some(source))
            .ok_or_else(|| Error::command_not_found(command))?;
        mapping
            .callable()
            .process(source, arguments)
            .map_err(|err| match err.kind {
                ErrorKind::CommandNotFound { command } => {
                    Error::message(format!("No such child command: {command}"))
                }
                kind => Error::new(kind),
            })
    }

    fn suggestions(&self, source: &dyn CommandSource, line: &str) -> Result<Vec<String>> {
        let Some((command, arguments)) = line.split_once(' ') else {
            return Ok(self
                .table()
                .keys()
                .filter(|alias| starts_with_ignore_case(alias, line))
                .map(str::to_string)
                .collect());
        };
        match self.get(command, Some(source)) {
            Some(mapping) => mapping.callable().suggestions(source, arguments),
            None => Ok(Vec::new()),
        }
    }

    fn short_description(&self, _source: &dyn CommandSource) -> Option<String> {
        None
    }

    fn help(&self, source: &dyn CommandSource) -> Option<String> {
        let mappings = self.commands();
        if mappings.is_empty() {
            return None;
        }
        let mut lines = vec!["Available commands:".to_string()];
        for mapping in mappings {
            let callable = mapping.callable();
            let description = callable
                .short_description(source)
                .unwrap_or_else(|| callable.usage(source));
            lines.push(format!("{} {description}", mapping.primary_alias()));
        }
        Some(lines.join("\n"))
    }

    fn usage(&self, source: &dyn CommandSource) -> String {
        self.table()
            .keys()
            .filter(|alias| {
                self.get(alias, Some(source))
                    .is_some_and(|m| m.primary_alias().to_lowercase() == *alias)
            })
            .collect::<Vec<_>>()
            .join("|")
    }
}
