//! Argument parsing, completion, and alias dispatch for cmdweave.
//!
//! This crate provides:
//! - [`InputTokenizer`] - Splits input into positioned tokens
//! - [`CommandArgs`] and [`CommandContext`] - The parse cursor and its output
//! - [`Element`] - The composable argument grammar
//! - [`CommandFlags`] - Unix-style flags in front of a child grammar
//! - [`Dispatcher`] - Case-insensitive alias tables with pluggable disambiguation
//! - [`CommandSpec`] - Grammar-backed commands with optional subcommands
//! - [`CommandManager`] - The owner-aware boundary that never fails
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use cmdweave_command::{
//!     BufferedSource, CommandContext, CommandManager, CommandResult, CommandSource, CommandSpec,
//!     Element, OwnerMetadata,
//! };
//!
//! let manager = CommandManager::new();
//! let add = CommandSpec::builder()
//!     .arguments(Element::seq([Element::integer("a"), Element::integer("b")]))
//!     .executor(|source: &dyn CommandSource, context: &CommandContext| {
//!         let a = context.require_one("a")?.as_int().unwrap_or_default();
//!         let b = context.require_one("b")?.as_int().unwrap_or_default();
//!         source.send_message(&(a + b).to_string());
//!         Ok(CommandResult::success())
//!     })
//!     .build()
//!     .unwrap();
//! manager
//!     .register(&OwnerMetadata::new("math"), Arc::new(add), ["add"])
//!     .unwrap();
//!
//! let source = BufferedSource::new("doc");
//! manager.process(&source, "add 2 3");
//! assert_eq!(source.messages(), vec!["5"]);
//! assert_eq!(manager.suggestions(&source, "ma"), vec!["math:add"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod args;
pub mod child;
pub mod context;
pub mod dispatcher;
pub mod element;
pub mod flags;
pub mod format;
pub mod manager;
pub mod mapping;
pub mod source;
pub mod spec;
pub mod tokenizer;

pub use args::{ArgsSnapshot, CommandArgs};
pub use child::ChildCommands;
pub use context::{CommandContext, ContextSnapshot};
pub use dispatcher::{Disambiguator, Dispatcher, FirstDisambiguator};
pub use element::Element;
pub use flags::{CommandFlags, FlagsBuilder, UnknownFlagBehavior};
pub use manager::{CommandManager, OwnerMetadata};
pub use mapping::{CommandCallable, CommandExecutor, CommandMapping, CommandResult};
pub use source::{BufferedSource, CommandSource};
pub use spec::{CommandSpec, CommandSpecBuilder};
pub use tokenizer::{InputTokenizer, Token};

pub use cmdweave_foundation::{ArgumentParseError, ContextError, Error, ErrorKind, Result, Value};
