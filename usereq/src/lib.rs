//! Requirements workflow helper and source-analysis toolkit behind the `req` CLI.
//!
//! The crate keeps a strict split between:
//!
//! - **[`core`]**: Pure, deterministic logic (language analysis, compression,
//!   requirement IDs, step sequencing). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (filesystem, git, process execution,
//!   persisted configuration and run state).
//!
//! Orchestration modules ([`references`], [`extract`], [`commands`],
//! [`static_check`], [`workflow`]) combine the two to implement CLI commands,
//! and [`cli`] dispatches to them.

pub mod cli;
pub mod commands;
pub mod core;
pub mod error;
pub mod exit_codes;
pub mod extract;
pub mod io;
pub mod logging;
pub mod progress;
pub mod references;
pub mod static_check;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod workflow;
