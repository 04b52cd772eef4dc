//! Subcommands embedded in a grammar.
//!
//! [`ChildCommands`] is both an element and an executor. Parsing consumes
//! the subcommand key, resolves it through a nested [`Dispatcher`] and
//! parses the rest in place with the subcommand's own grammar, storing the
//! resolved mapping in the context. Executing then runs whichever
//! subcommand was stored, or the fallback executor when none was.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cmdweave_foundation::{ArgumentParseError, Error, Result, Value};

use crate::args::CommandArgs;
use crate::context::CommandContext;
use crate::dispatcher::Dispatcher;
use crate::element::Element;
use crate::format::{self, PIPE, extend_unique, starts_with_ignore_case};
use crate::mapping::{CommandCallable, CommandExecutor, CommandMapping, CommandResult};
use crate::source::CommandSource;

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A nested dispatcher of subcommands, usable as an element.
pub struct ChildCommands {
    key: String,
    fallback_executor: Option<Arc<dyn CommandExecutor>>,
    fallback_elements: Option<Element>,
    dispatcher: Dispatcher,
    fallback_on_fail: bool,
}

impl ChildCommands {
    /// Creates an empty set of subcommands.
    ///
    /// `fallback_executor` runs when no subcommand is given (or none
    /// matches and `fallback_elements` parse instead). With
    /// `fallback_on_fail`, a subcommand whose arguments fail to parse is
    /// retried against `fallback_elements`.
    #[must_use]
    pub fn new(
        fallback_executor: Option<Arc<dyn CommandExecutor>>,
        fallback_elements: Option<Element>,
        fallback_on_fail: bool,
    ) -> Self {
        let fallback_elements =
            fallback_elements.filter(|e| !matches!(e, Element::Sequence(elements) if elements.is_empty()));
        Self {
            key: format!("child{}", COUNTER.fetch_add(1, Ordering::Relaxed)),
            fallback_executor,
            fallback_elements,
            dispatcher: Dispatcher::new(),
            fallback_on_fail,
        }
    }

    /// The context key the resolved subcommand is stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The nested dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Registers a subcommand.
    pub fn register(
        &self,
        callable: Arc<dyn CommandCallable>,
        aliases: impl IntoIterator<Item = impl Into<String>>,
    ) -> Option<Arc<CommandMapping>> {
        self.dispatcher.register(callable, aliases)
    }

    fn args_key(&self) -> String {
        format!("{}_args", self.key)
    }

    pub(crate) fn parse(
        &self,
        source: &dyn CommandSource,
        args: &mut CommandArgs,
        context: &mut CommandContext,
    ) -> std::result::Result<(), ArgumentParseError> {
        if self.fallback_executor.is_some() && !args.has_next() {
            if let Some(fallback) = &self.fallback_elements {
                fallback.parse(source, args, context)?;
            }
            return Ok(());
        }

        let args_state = args.snapshot();
        let context_state = context.snapshot();
        let key = args.next()?;
        let Some(mapping) = self.dispatcher.get(&key, Some(source)) else {
            return match (&self.fallback_executor, &self.fallback_elements) {
                (Some(_), Some(fallback)) => {
                    args.apply_snapshot(&args_state, true);
                    fallback.parse(source, args, context)
                }
                _ => Err(args.create_error(format!(
                    "Input command {key} was not a valid subcommand!"
                ))),
            };
        };

        match self.populate(&mapping, source, args, context) {
            Ok(()) => {
                context.put_arg(self.key.clone(), Value::any(mapping));
                Ok(())
            }
            Err(err) => {
                args.apply_snapshot(&args_state, true);
                context.apply_snapshot(&context_state);
                if self.fallback_on_fail {
                    if let Some(fallback) = &self.fallback_elements {
                        return fallback.parse(source, args, context);
                    }
                }
                let inner = err
                    .usage()
                    .map_or_else(|| mapping.callable().usage(source), str::to_string);
                Err(err.with_usage(format!("{key} {inner}")))
            }
        }
    }

    fn populate(
        &self,
        mapping: &CommandMapping,
        source: &dyn CommandSource,
        args: &mut CommandArgs,
        context: &mut CommandContext,
    ) -> std::result::Result<(), ArgumentParseError> {
        if let Some(spec) = mapping.callable().as_spec() {
            return spec.populate_context(source, args, context);
        }
        let remainder = if args.has_next() {
            args.next()?;
            args.raw_from_current()
        } else {
            String::new()
        };
        while args.next_if_present().is_some() {}
        context.put_arg(self.args_key(), remainder);
        Ok(())
    }

    pub(crate) fn complete(
        &self,
        source: &dyn CommandSource,
        args: &mut CommandArgs,
        context: &mut CommandContext,
    ) -> Vec<String> {
        let mut completions = Vec::new();
        if let Some(fallback) = &self.fallback_elements {
            let args_state = args.snapshot();
            let context_state = context.snapshot();
            completions = fallback.complete(source, args, context);
            args.apply_snapshot(&args_state, true);
            context.apply_snapshot(&context_state);
        }

        let table = self.dispatcher.table();
        let Some(component) = args.next_if_present() else {
            extend_unique(&mut completions, table.keys().map(str::to_string));
            return completions;
        };
        if args.has_next() {
            let Some(mapping) = self.dispatcher.get(&component, Some(source)) else {
                return Vec::new();
            };
            if let Some(spec) = mapping.callable().as_spec() {
                return spec.complete(source, args, context);
            }
            args.next_if_present();
            let arguments = args.raw_from_current();
            while args.next_if_present().is_some() {}
            return match mapping.callable().suggestions(source, &arguments) {
                Ok(suggestions) => suggestions,
                Err(err) => {
                    source.send_message(&format::error(&err.to_string()));
                    Vec::new()
                }
            };
        }
        extend_unique(
            &mut completions,
            table
                .keys()
                .filter(|alias| starts_with_ignore_case(alias, &component))
                .map(str::to_string),
        );
        completions
    }

    pub(crate) fn usage(&self, source: &dyn CommandSource) -> String {
        let usage = self.dispatcher.usage(source);
        let Some(fallback) = &self.fallback_elements else {
            return usage;
        };
        let fallback_usage = fallback.usage(source);
        if fallback_usage.is_empty() {
            usage
        } else {
            format!("{usage}{PIPE}{fallback_usage}")
        }
    }
}

impl CommandExecutor for ChildCommands {
    fn execute(&self, source: &dyn CommandSource, context: &CommandContext) -> Result<CommandResult> {
        let mapping = context
            .get_one(&self.key)
            .and_then(|v| v.downcast_ref::<Arc<CommandMapping>>())
            .cloned();
        let Some(mapping) = mapping else {
            return match &self.fallback_executor {
                Some(executor) => executor.execute(source, context),
                None => Err(Error::message(format!(
                    "Invalid subcommand state -- no more than one mapping may be provided for child arg {}",
                    self.key
                ))),
            };
        };
        if let Some(spec) = mapping.callable().as_spec() {
            spec.check_permission(source)?;
            return spec.executor().execute(source, context);
        }
        let arguments = context
            .get_one(&self.args_key())
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        mapping.callable().process(source, &arguments)
    }
}

impl fmt::Debug for ChildCommands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildCommands")
            .field("key", &self.key)
            .field("fallback_elements", &self.fallback_elements)
            .field("dispatcher", &self.dispatcher)
            .field("fallback_on_fail", &self.fallback_on_fail)
            .finish_non_exhaustive()
    }
}
