//! The owner-aware top-level command boundary.
//!
//! [`CommandManager`] wraps a [`Dispatcher`] and is what an application
//! talks to. It records which owner registered which mapping, namespaces
//! every alias as `owner:alias`, and turns every failure into text sent to
//! the source, so [`process`](CommandManager::process) never fails.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cmdweave_foundation::{Error, ErrorKind, Result};
use tracing::{debug, error, warn};

use crate::dispatcher::{Disambiguator, Dispatcher};
use crate::format::{self, normalize_fault_text};
use crate::mapping::{CommandCallable, CommandMapping, CommandResult};
use crate::source::CommandSource;

/// Describes whoever registers commands.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OwnerMetadata {
    /// Identifier used as the alias namespace.
    pub id: String,
    /// Human-readable name.
    pub name: Option<String>,
    /// Version string.
    pub version: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Home page.
    pub url: Option<String>,
    /// Authors.
    pub authors: Vec<String>,
}

impl OwnerMetadata {
    /// Metadata carrying only an id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

#[derive(Default)]
struct Owners {
    by_id: BTreeMap<String, (Arc<OwnerMetadata>, Vec<Arc<CommandMapping>>)>,
}

impl Owners {
    fn owns(&self, id: &str, mapping: &Arc<CommandMapping>) -> bool {
        self.by_id
            .get(id)
            .is_some_and(|(_, mappings)| mappings.iter().any(|m| Arc::ptr_eq(m, mapping)))
    }

    fn forget(&mut self, mapping: &Arc<CommandMapping>) {
        for (_, mappings) in self.by_id.values_mut() {
            mappings.retain(|m| !Arc::ptr_eq(m, mapping));
        }
        self.by_id.retain(|_, (_, mappings)| !mappings.is_empty());
    }
}

/// The top-level boundary: registration with ownership, and processing
/// that reports failures to the source instead of returning them.
pub struct CommandManager {
    dispatcher: Dispatcher,
    owners: Mutex<Owners>,
}

impl CommandManager {
    /// A manager that resolves shared aliases to the first registration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dispatcher: Dispatcher::new(),
            owners: Mutex::default(),
        }
    }

    /// A manager with a custom disambiguator.
    #[must_use]
    pub fn with_disambiguator(disambiguator: impl Disambiguator + 'static) -> Self {
        Self {
            dispatcher: Dispatcher::with_disambiguator(disambiguator),
            owners: Mutex::default(),
        }
    }

    fn owners(&self) -> MutexGuard<'_, Owners> {
        self.owners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `callable` for `owner`.
    ///
    /// Aliases are lowercased with spaces removed. Each one is registered
    /// bare and as `owner:alias`.
    ///
    /// # Errors
    ///
    /// A duplicate-alias error when `owner` already registered one of the
    /// aliases.
    pub fn register(
        &self,
        owner: &OwnerMetadata,
        callable: Arc<dyn CommandCallable>,
        aliases: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Option<Arc<CommandMapping>>> {
        self.register_with(owner, callable, aliases, |aliases| aliases)
    }

    /// Registers `callable` for `owner`, letting `callback` rewrite the
    /// final alias list.
    ///
    /// # Errors
    ///
    /// A duplicate-alias error when `owner` already registered one of the
    /// aliases.
    pub fn register_with(
        &self,
        owner: &OwnerMetadata,
        callable: Arc<dyn CommandCallable>,
        aliases: impl IntoIterator<Item = impl Into<String>>,
        callback: impl FnOnce(Vec<String>) -> Vec<String>,
    ) -> Result<Option<Arc<CommandMapping>>> {
        let mut owners = self.owners();

        let mut namespaced = Vec::new();
        let mut seen = Vec::new();
        for original in aliases {
            let alias = normalize_alias(&owner.id, &original.into());
            if seen.contains(&alias) {
                debug!(owner = %owner.id, %alias, "duplicate alias in one registration");
                continue;
            }
            if self
                .dispatcher
                .get_all(&alias)
                .iter()
                .any(|mapping| owners.owns(&owner.id, mapping))
            {
                return Err(Error::duplicate_alias(owner.id.clone(), alias));
            }
            namespaced.push(alias.clone());
            namespaced.push(format!("{}:{alias}", owner.id));
            seen.push(alias);
        }

        let mapping = self.dispatcher.register_with(callable, namespaced, callback);
        if let Some(mapping) = &mapping {
            debug!(owner = %owner.id, primary = mapping.primary_alias(), "registered command");
            owners
                .by_id
                .entry(owner.id.clone())
                .or_insert_with(|| (Arc::new(owner.clone()), Vec::new()))
                .1
                .push(Arc::clone(mapping));
        }
        Ok(mapping)
    }

    /// Removes `mapping` and forgets its owner.
    pub fn remove_mapping(&self, mapping: &Arc<CommandMapping>) -> Option<Arc<CommandMapping>> {
        let mut owners = self.owners();
        let removed = self.dispatcher.remove_mapping(mapping)?;
        owners.forget(&removed);
        Some(removed)
    }

    /// Removes every mapping under `alias`. Mappings still reachable
    /// through another alias keep their owner.
    pub fn remove(&self, alias: &str) -> Vec<Arc<CommandMapping>> {
        let mut owners = self.owners();
        let removed = self.dispatcher.remove(alias);
        self.forget_unreachable(&mut owners, &removed);
        removed
    }

    /// Removes every mapping under each of `aliases`. Returns true if
    /// anything was removed.
    pub fn remove_all<S: AsRef<str>>(&self, aliases: &[S]) -> bool {
        let mut owners = self.owners();
        let removed: Vec<_> = aliases
            .iter()
            .flat_map(|alias| self.dispatcher.get_all(alias.as_ref()))
            .collect();
        let found = self.dispatcher.remove_all(aliases);
        self.forget_unreachable(&mut owners, &removed);
        found
    }

    fn forget_unreachable(&self, owners: &mut Owners, removed: &[Arc<CommandMapping>]) {
        for mapping in removed {
            if !self.dispatcher.contains_mapping(mapping) {
                owners.forget(mapping);
            }
        }
    }

    /// Every owner with at least one registered mapping.
    #[must_use]
    pub fn owners_list(&self) -> Vec<Arc<OwnerMetadata>> {
        self.owners()
            .by_id
            .values()
            .map(|(owner, _)| Arc::clone(owner))
            .collect()
    }

    /// Mappings registered by the owner with `id`.
    #[must_use]
    pub fn owned_by(&self, id: &str) -> Vec<Arc<CommandMapping>> {
        self.owners()
            .by_id
            .get(id)
            .map(|(_, mappings)| mappings.clone())
            .unwrap_or_default()
    }

    /// The owner that registered `mapping`.
    #[must_use]
    pub fn owner_of(&self, mapping: &Arc<CommandMapping>) -> Option<Arc<OwnerMetadata>> {
        self.owners()
            .by_id
            .values()
            .find(|(_, mappings)| mappings.iter().any(|m| Arc::ptr_eq(m, mapping)))
            .map(|(owner, _)| Arc::clone(owner))
    }

    /// Every registered mapping, once each.
    #[must_use]
    pub fn commands(&self) -> Vec<Arc<CommandMapping>> {
        self.dispatcher.commands()
    }

    /// The mapping `alias` resolves to for `source`.
    #[must_use]
    pub fn get(&self, alias: &str, source: Option<&dyn CommandSource>) -> Option<Arc<CommandMapping>> {
        self.dispatcher.get(alias, source)
    }

    /// Whether any mapping is registered under `alias`.
    #[must_use]
    pub fn contains_alias(&self, alias: &str) -> bool {
        self.dispatcher.contains_alias(alias)
    }

    /// Number of alias entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dispatcher.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dispatcher.is_empty()
    }

    /// Runs `command`, reporting any failure to `source`.
    ///
    /// Returns [`CommandResult::empty`] when the command failed.
    pub fn process(&self, source: &dyn CommandSource, command: &str) -> CommandResult {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.dispatcher.process(source, command)));
        match outcome {
            Ok(Ok(result)) => return result,
            Ok(Err(err)) => self.report(source, command, &err),
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "panic".to_string());
                error!(command, source = source.name(), %message, "command panicked");
                report_fault(source, &message);
            }
        }
        CommandResult::empty()
    }

    fn report(&self, source: &dyn CommandSource, command: &str, err: &Error) {
        match &err.kind {
            ErrorKind::PermissionDenied(message) => source.send_message(&format::error(message)),
            ErrorKind::Fault(fault) => {
                let chain = error_chain(fault.as_ref());
                error!(command, source = source.name(), error = %chain, "error while executing command");
                report_fault(source, &chain);
            }
            _ => {
                source.send_message(&format::error(&err.to_string()));
                if err.include_usage() {
                    let name = command.split(' ').next().unwrap_or_default();
                    if let Some(mapping) = self.dispatcher.get(name, Some(source)) {
                        let usage = err
                            .usage()
                            .map_or_else(|| mapping.callable().usage(source), str::to_string);
                        source.send_message(&format::error(&format!("Usage: {name} {usage}")));
                    }
                }
            }
        }
    }

    /// Completions for a partially typed command line.
    ///
    /// Failures are reported to `source` and yield no completions.
    pub fn suggestions(&self, source: &dyn CommandSource, arguments: &str) -> Vec<String> {
        match self.dispatcher.suggestions(source, arguments) {
            Ok(suggestions) => suggestions,
            Err(err) => {
                source.send_message(&format::error(&format!("Error getting suggestions: {err}")));
                Vec::new()
            }
        }
    }

    /// One-line description of the whole command set.
    #[must_use]
    pub fn short_description(&self, source: &dyn CommandSource) -> Option<String> {
        self.dispatcher.short_description(source)
    }

    /// Help listing every command.
    #[must_use]
    pub fn help(&self, source: &dyn CommandSource) -> Option<String> {
        self.dispatcher.help(source)
    }

    /// Primary aliases joined by `|`.
    #[must_use]
    pub fn usage(&self, source: &dyn CommandSource) -> String {
        self.dispatcher.usage(source)
    }
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandManager")
            .field("dispatcher", &self.dispatcher)
            .field("owners", &self.owners().by_id.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn normalize_alias(owner: &str, original: &str) -> String {
    let lowered = original.to_lowercase();
    let case_changed = lowered != original;
    let space_found = original.contains(' ');
    let fixed = lowered.replace(' ', "");
    if case_changed || space_found {
        let what = match (case_changed, space_found) {
            (true, true) => "an uppercase character and a space",
            (true, false) => "an uppercase character",
            _ => "a space",
        };
        warn!(owner, alias = original, adjusted = %fixed, "alias contains {what}");
    }
    fixed
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        text.push_str("\nCaused by: ");
        text.push_str(&inner.to_string());
        cause = inner.source();
    }
    text
}

fn report_fault(source: &dyn CommandSource, message: &str) {
    source.send_message(&format::error(&format!(
        "Error occurred while executing command: {}",
        normalize_fault_text(message)
    )));
}
