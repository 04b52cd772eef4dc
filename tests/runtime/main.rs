//! Integration tests for Layer 2: Runtime
//!
//! Tests for the shell loop, line completion, and the sample commands.
