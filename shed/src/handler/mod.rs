//! Custom handlers - built-in extensions around the generic execution path
//!
//! Most tools go through plain template substitution. A handler owns its own
//! resolution and post-processing for tools that need artifacts prepared
//! before the run or output parsed after it. Which handler applies is a
//! tagged [`ExecutionStrategy`](crate::tool::ExecutionStrategy) on the tool
//! definition, not a magic id comparison.

mod file_finder;

pub use file_finder::FileFinderHandler;

use async_trait::async_trait;
use std::path::Path;
use toolstore::ArtifactStore;

use crate::error::ExecError;
use crate::runner::{CommandRunner, RunOutput};
use crate::tool::{ExecutionRequest, ToolDefinition};

/// Collaborators a handler borrows for one invocation
pub struct HandlerEnv<'a> {
    /// Output directory; also hosts the handler's ephemeral temp files
    pub artifacts: &'a ArtifactStore,
    pub runner: &'a CommandRunner,
    pub cwd: Option<&'a Path>,
}

/// A built-in extension providing bespoke pre/post-processing
///
/// `run` covers the whole invocation: validate inputs, resolve the command,
/// execute, and post-process. Implementations must remove any temporary
/// artifacts they create on every exit path, including validation failures.
#[async_trait]
pub trait CustomHandler: Send + Sync {
    /// Handler name, for logs
    fn name(&self) -> &'static str;

    async fn run(
        &self,
        tool: &ToolDefinition,
        inputs: &ExecutionRequest,
        env: &HandlerEnv<'_>,
    ) -> Result<RunOutput, ExecError>;
}
