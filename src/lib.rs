//! cmdweave - Composable command-line argument parsing
//!
//! This crate re-exports all layers of cmdweave for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: cmdweave_runtime    - Interactive console, line editor, demo binary
//! Layer 1: cmdweave_command    - Tokenizer, elements, flags, dispatch, manager
//! Layer 0: cmdweave_foundation - Core types (Value, Error, ListMultimap)
//! ```

pub use cmdweave_command as command;
pub use cmdweave_foundation as foundation;
pub use cmdweave_runtime as runtime;
