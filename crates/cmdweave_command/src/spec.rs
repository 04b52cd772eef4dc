//! Grammar-backed commands.
//!
//! A [`CommandSpec`] binds an argument grammar to an executor together with
//! its metadata: descriptions, an optional permission, and the tokenizer
//! used to split its arguments. Specs are built with
//! [`CommandSpec::builder`] and may carry subcommands, which are wired in
//! through a [`ChildCommands`] element.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use cmdweave_command::{
//!     BufferedSource, CommandCallable, CommandContext, CommandResult, CommandSource, CommandSpec,
//!     Element,
//! };
//!
//! let greet = CommandSpec::builder()
//!     .description("Greets someone")
//!     .arguments(Element::string("name"))
//!     .executor(|source: &dyn CommandSource, context: &CommandContext| {
//!         let name = context.require_one("name")?;
//!         source.send_message(&format!("Hello, {name}!"));
//!         Ok(CommandResult::success())
//!     })
//!     .build()
//!     .unwrap();
//!
//! let source = BufferedSource::new("doc");
//! greet.process(&source, "world").unwrap();
//! assert_eq!(source.messages(), vec!["Hello, world!"]);
//! ```

use std::fmt;
use std::sync::Arc;

use cmdweave_foundation::{ArgumentParseError, Error, Result};

use crate::args::CommandArgs;
use crate::child::ChildCommands;
use crate::context::CommandContext;
use crate::element::Element;
use crate::mapping::{CommandCallable, CommandExecutor, CommandResult};
use crate::source::CommandSource;
use crate::tokenizer::InputTokenizer;

/// A command defined by an argument grammar and an executor.
pub struct CommandSpec {
    arguments: Element,
    executor: Arc<dyn CommandExecutor>,
    description: Option<String>,
    extended_description: Option<String>,
    permission: Option<String>,
    tokenizer: InputTokenizer,
}

impl CommandSpec {
    /// Starts building a spec.
    #[must_use]
    pub fn builder() -> CommandSpecBuilder {
        CommandSpecBuilder::default()
    }

    /// Parses `args` into `context` with this spec's grammar.
    ///
    /// # Errors
    ///
    /// The grammar's parse error, or "Too many arguments!" when tokens are
    /// left over.
    pub fn populate_context(
        &self,
        source: &dyn CommandSource,
        args: &mut CommandArgs,
        context: &mut CommandContext,
    ) -> std::result::Result<(), ArgumentParseError> {
        self.arguments.parse(source, args, context)?;
        if args.has_next() {
            args.next()?;
            return Err(args.create_error("Too many arguments!"));
        }
        Ok(())
    }

    /// Completions from this spec's grammar.
    pub fn complete(
        &self,
        source: &dyn CommandSource,
        args: &mut CommandArgs,
        context: &mut CommandContext,
    ) -> Vec<String> {
        self.arguments.complete(source, args, context)
    }

    /// The argument grammar.
    #[must_use]
    pub const fn arguments(&self) -> &Element {
        &self.arguments
    }

    /// The executor run after a successful parse.
    #[must_use]
    pub fn executor(&self) -> &Arc<dyn CommandExecutor> {
        &self.executor
    }

    /// The tokenizer for this spec's arguments.
    #[must_use]
    pub const fn tokenizer(&self) -> &InputTokenizer {
        &self.tokenizer
    }

    /// The permission a source needs, if any.
    #[must_use]
    pub fn permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    /// Long-form description.
    #[must_use]
    pub fn extended_description(&self) -> Option<&str> {
        self.extended_description.as_deref()
    }

    /// Whether `source` may run this command.
    #[must_use]
    pub fn test_permission(&self, source: &dyn CommandSource) -> bool {
        self.permission
            .as_deref()
            .is_none_or(|permission| source.has_permission(permission))
    }

    /// Fails unless `source` may run this command.
    ///
    /// # Errors
    ///
    /// A permission error when the source lacks the permission.
    pub fn check_permission(&self, source: &dyn CommandSource) -> Result<()> {
        if self.test_permission(source) {
            Ok(())
        } else {
            Err(Error::permission_denied())
        }
    }
}

impl CommandCallable for CommandSpec {
    fn process(&self, source: &dyn CommandSource, arguments: &str) -> Result<CommandResult> {
        self.check_permission(source)?;
        let tokens = self.tokenizer.tokenize(arguments, false)?;
        let mut args = CommandArgs::new(arguments, tokens);
        let mut context = CommandContext::new();
        self.populate_context(source, &mut args, &mut context)?;
        self.executor.execute(source, &context)
    }

    fn suggestions(&self, source: &dyn CommandSource, arguments: &str) -> Result<Vec<String>> {
        if !self.test_permission(source) {
            return Ok(Vec::new());
        }
        let tokens = self.tokenizer.tokenize(arguments, true)?;
        let mut args = CommandArgs::new(arguments, tokens);
        let mut context = CommandContext::for_completion();
        Ok(self.complete(source, &mut args, &mut context))
    }

    fn short_description(&self, _source: &dyn CommandSource) -> Option<String> {
        self.description.clone()
    }

    fn help(&self, source: &dyn CommandSource) -> Option<String> {
        let mut lines = Vec::new();
        if let Some(description) = &self.description {
            lines.push(description.clone());
        }
        lines.push(self.usage(source));
        if let Some(extended) = &self.extended_description {
            lines.push(extended.clone());
        }
        Some(lines.join("\n"))
    }

    fn usage(&self, source: &dyn CommandSource) -> String {
        self.arguments.usage(source)
    }

    fn as_spec(&self) -> Option<&CommandSpec> {
        Some(self)
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("arguments", &self.arguments)
            .field("description", &self.description)
            .field("permission", &self.permission)
            .field("tokenizer", &self.tokenizer)
            .finish_non_exhaustive()
    }
}

type Children = Vec<(Vec<String>, Arc<dyn CommandCallable>)>;

/// Builder for [`CommandSpec`].
pub struct CommandSpecBuilder {
    arguments: Option<Element>,
    executor: Option<Arc<dyn CommandExecutor>>,
    description: Option<String>,
    extended_description: Option<String>,
    permission: Option<String>,
    children: Children,
    child_fallback: bool,
    tokenizer: InputTokenizer,
}

impl Default for CommandSpecBuilder {
    fn default() -> Self {
        Self {
            arguments: None,
            executor: None,
            description: None,
            extended_description: None,
            permission: None,
            children: Vec::new(),
            child_fallback: true,
            tokenizer: InputTokenizer::default(),
        }
    }
}

impl CommandSpecBuilder {
    /// The argument grammar. Defaults to [`Element::none`].
    #[must_use]
    pub fn arguments(mut self, arguments: Element) -> Self {
        self.arguments = Some(arguments);
        self
    }

    /// The executor, from a closure.
    #[must_use]
    pub fn executor(
        self,
        executor: impl Fn(&dyn CommandSource, &CommandContext) -> Result<CommandResult> + Send + Sync + 'static,
    ) -> Self {
        self.executor_arc(Arc::new(executor))
    }

    /// The executor, already shared.
    #[must_use]
    pub fn executor_arc(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// One-line description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Long-form description shown after usage in help.
    #[must_use]
    pub fn extended_description(mut self, description: impl Into<String>) -> Self {
        self.extended_description = Some(description.into());
        self
    }

    /// Permission a source must hold to run or complete the command.
    #[must_use]
    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    /// Adds a subcommand.
    #[must_use]
    pub fn child(
        mut self,
        callable: Arc<dyn CommandCallable>,
        aliases: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.children
            .push((aliases.into_iter().map(Into::into).collect(), callable));
        self
    }

    /// Adds several subcommands.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = (Vec<String>, Arc<dyn CommandCallable>)>) -> Self {
        self.children.extend(children);
        self
    }

    /// Whether a subcommand whose arguments fail to parse falls back to
    /// this command's own arguments and executor. Defaults to true.
    #[must_use]
    pub const fn child_argument_parse_fallback(mut self, fallback: bool) -> Self {
        self.child_fallback = fallback;
        self
    }

    /// The tokenizer for the arguments. Defaults to strict quoted strings.
    #[must_use]
    pub fn input_tokenizer(mut self, tokenizer: InputTokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Finishes the spec.
    ///
    /// # Errors
    ///
    /// An invalid-spec error when there is neither an executor nor any
    /// subcommand.
    pub fn build(self) -> Result<CommandSpec> {
        let mut arguments = self.arguments;
        let executor: Arc<dyn CommandExecutor> = if self.children.is_empty() {
            self.executor
                .ok_or_else(|| Error::invalid_spec("An executor is required"))?
        } else {
            let child = match self.executor {
                // Subcommands follow this command's own arguments.
                None => {
                    let child = Arc::new(ChildCommands::new(None, None, false));
                    let element = Element::Child(Arc::clone(&child));
                    arguments = Some(match arguments {
                        Some(own) => Element::seq([own, element]),
                        None => element,
                    });
                    child
                }
                // This command's arguments and executor become the fallback.
                Some(executor) => {
                    let child = Arc::new(ChildCommands::new(
                        Some(executor),
                        arguments.take(),
                        self.child_fallback,
                    ));
                    arguments = Some(Element::Child(Arc::clone(&child)));
                    child
                }
            };
            for (aliases, callable) in self.children {
                child.register(callable, aliases);
            }
            child
        };

        Ok(CommandSpec {
            arguments: arguments.unwrap_or_else(Element::none),
            executor,
            description: self.description,
            extended_description: self.extended_description,
            permission: self.permission,
            tokenizer: self.tokenizer,
        })
    }
}

impl fmt::Debug for CommandSpecBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpecBuilder")
            .field("arguments", &self.arguments)
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}
