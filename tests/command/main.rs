//! Integration tests for Layer 1: Command
//!
//! Tests for tokenizing, the element grammar, flags, completion, child
//! commands, dispatch, and the command manager.

mod arguments;
mod child_commands;
mod completion;
mod flags;
mod tokenizer;
