//! Deterministic, pure logic behind the `req` commands.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! text and data structures and return deterministic outputs suitable for
//! tests.

pub mod analyzer;
pub mod compress;
pub mod doxygen;
pub mod find;
pub mod languages;
pub mod lexing;
pub mod markdown;
pub mod placeholders;
pub mod requirements;
pub mod sequencer;
pub mod tokens;
pub mod tree;
pub mod types;
