//! Execution error types

use thiserror::Error;
use toolstore::StoreError;

use crate::template::TemplateError;

/// Errors surfaced by the execution engine
///
/// Process failures (non-zero exit, timeout, missing executable) are not
/// errors at this level - they come back as a failed
/// [`RunOutput`](crate::runner::RunOutput) so the invocation can still be
/// recorded and reported. Everything here aborts the operation instead.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("{0}")]
    Validation(String),

    #[error("Tool not found: {id}")]
    ToolNotFound { id: String },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Provisioning failed: {0}")]
    Provision(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
