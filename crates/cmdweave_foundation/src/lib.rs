//! Core values, errors, and persistent collections for cmdweave.
//!
//! This crate provides:
//! - [`Value`] - The typed payload produced by argument parsing
//! - [`ArgumentParseError`] - Positioned parse errors with caret rendering
//! - [`Error`] - Errors crossing dispatch boundaries
//! - [`ListMultimap`] - Persistent string-keyed multimap with O(1) snapshots

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod error;
pub mod value;

pub use collections::ListMultimap;
pub use error::{ArgumentParseError, ContextError, Error, ErrorKind};
pub use value::Value;

/// Result type alias using cmdweave's Error type.
pub type Result<T> = std::result::Result<T, Error>;
