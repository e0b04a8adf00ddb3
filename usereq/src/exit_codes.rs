//! Stable exit codes for `req` commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Generic failure: workflow aborts, ID violations, failed static checks.
pub const FAILURE: i32 = 1;
/// The project base passed with `--base` does not exist.
pub const BASE_MISSING: i32 = 2;
/// Invalid or conflicting argument combination.
pub const INVALID_ARGS: i32 = 4;
/// A `--docs-dir`, `--tests-dir` or `--src-dir` value is unusable.
pub const INVALID_DIR: i32 = 5;
/// The guidelines directory is missing or outside the project.
pub const GUIDELINES: i32 = 8;
/// `.req/config.json` is missing or malformed.
pub const CONFIG: i32 = 11;
