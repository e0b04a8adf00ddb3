//! Expected CLI failures with a user-facing message and an exit code.

use thiserror::Error;

use crate::exit_codes;

/// A failure the user can act on. `main` prints `message` verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ReqError {
    pub message: String,
    pub code: i32,
}

impl ReqError {
    pub fn new(message: impl Into<String>, code: i32) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, exit_codes::FAILURE)
    }
}

/// Find the first [`ReqError`] anywhere in an error chain.
pub fn find_req_error(err: &anyhow::Error) -> Option<&ReqError> {
    err.chain().find_map(|cause| cause.downcast_ref::<ReqError>())
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn req_error_survives_added_context() {
        let err = Err::<(), _>(ReqError::new("Error: boom", exit_codes::CONFIG))
            .context("loading config")
            .expect_err("error");
        let found = find_req_error(&err).expect("req error");
        assert_eq!(found.code, exit_codes::CONFIG);
        assert_eq!(found.to_string(), "Error: boom");
    }

    #[test]
    fn plain_errors_have_no_req_error() {
        let err = anyhow::anyhow!("unexpected");
        assert!(find_req_error(&err).is_none());
    }
}
