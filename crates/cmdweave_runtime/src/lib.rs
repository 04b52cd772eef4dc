//! Interactive console for cmdweave.
//!
//! This crate provides:
//! - [`Shell`] - Read-dispatch loop over a [`CommandManager`](cmdweave_command::CommandManager)
//! - [`RustylineEditor`] - Terminal line editor with tab completion
//! - [`ConsoleSource`] - A command source printing to standard output
//! - [`demo`] - Sample commands used by the `cmdweave` binary

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod console;
pub mod demo;
pub mod editor;
pub mod shell;

pub use config::ShellConfig;
pub use console::ConsoleSource;
pub use editor::{LineEditor, ReadResult, RustylineEditor, complete_line};
pub use shell::Shell;
