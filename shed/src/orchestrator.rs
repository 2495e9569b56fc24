//! Execution orchestrator
//!
//! Composes the whole invocation path: look up the tool, pick the generic or
//! custom-handler route, resolve the working directory, execute, derive the
//! artifact name, persist the artifact, and record history. All collaborators
//! are constructed once from [`Config`] and passed in explicitly, so tests
//! can point everything at a temp directory.

use chrono::Local;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use toolstore::ArtifactStore;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::ExecError;
use crate::handler::{CustomHandler, FileFinderHandler, HandlerEnv};
use crate::history::{HistoryLog, HistoryRecord};
use crate::naming;
use crate::registry::ToolRegistry;
use crate::runner::{CommandRunner, RunStatus};
use crate::template;
use crate::tool::{ExecutionRequest, ExecutionStrategy, ToolDefinition};

/// What one invocation returns to the caller
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Final user-visible output (report text for custom handlers)
    pub output: String,

    /// Artifact leaf name inside the output directory
    pub output_file: String,

    pub status: RunStatus,
}

/// Composes templating, execution, naming, and persistence
pub struct Orchestrator {
    registry: ToolRegistry,
    history: HistoryLog,
    artifacts: ArtifactStore,
    runner: CommandRunner,
    base_dir: PathBuf,
}

impl Orchestrator {
    /// Build all collaborators from configuration
    pub fn new(config: &Config) -> Result<Self, ExecError> {
        Ok(Self {
            registry: ToolRegistry::open(config.storage.registry_path())?,
            history: HistoryLog::open(config.storage.history_path())?,
            artifacts: ArtifactStore::open(config.storage.output_dir())?,
            runner: CommandRunner::new(config.exec.timeout()),
            base_dir: config.storage.base_dir.clone(),
        })
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn runner(&self) -> &CommandRunner {
        &self.runner
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Invoke a tool with user-supplied inputs
    ///
    /// Unresolved placeholders abort before any process launches. Process
    /// failures do not - they come back as an error-status invocation with
    /// diagnostic output, recorded in history like any other run. Artifact
    /// or history write failures are logged and do not withhold the output
    /// from the caller.
    pub async fn invoke(&self, tool_id: &str, inputs: &ExecutionRequest) -> Result<Invocation, ExecError> {
        let tool = self.registry.get(tool_id)?.ok_or_else(|| ExecError::ToolNotFound {
            id: tool_id.to_string(),
        })?;
        debug!(tool_id = %tool.id, name = %tool.name, strategy = ?tool.strategy, "Invoking tool");

        let cwd = self.resolve_cwd(&tool);

        let output = match tool.strategy {
            ExecutionStrategy::Generic => {
                let values = field_values(&tool, inputs);
                let command = template::render_command(&tool.command_template, &values)?;
                self.runner.run(&command, cwd.as_deref()).await
            }
            ExecutionStrategy::FileFinder => {
                let handler = FileFinderHandler;
                debug!(tool_id = %tool.id, handler = handler.name(), "Dispatching to custom handler");
                let env = HandlerEnv {
                    artifacts: &self.artifacts,
                    runner: &self.runner,
                    cwd: cwd.as_deref(),
                };
                handler.run(&tool, inputs, &env).await?
            }
        };

        let timestamp = Local::now().format(naming::TIMESTAMP_FORMAT).to_string();
        let token = Uuid::new_v4().simple().to_string()[..8].to_string();
        let filename = naming::output_filename(&tool, inputs, &timestamp, &token);

        if let Err(e) = self.artifacts.write(&filename, &output.text) {
            error!(%filename, %e, "Failed to write output artifact");
        }

        let record = HistoryRecord::new(&tool, inputs.clone(), filename.clone(), output.status, &output.text);
        if let Err(e) = self.history.append(record) {
            error!(tool_id = %tool.id, %e, "Failed to append history record");
        }

        Ok(Invocation {
            output: output.text,
            output_file: filename,
            status: output.status,
        })
    }

    /// The tool's configured directory when it exists on disk, else default
    fn resolve_cwd(&self, tool: &ToolDefinition) -> Option<PathBuf> {
        let dir = tool.run_in_directory.as_ref()?;
        let candidate = self.base_dir.join(dir);
        if candidate.is_dir() {
            Some(candidate)
        } else {
            warn!(tool_id = %tool.id, dir = %candidate.display(), "Configured working directory not found, using default");
            None
        }
    }
}

/// Value map for the generic path: user value, else declared default, else empty
fn field_values(tool: &ToolDefinition, inputs: &ExecutionRequest) -> HashMap<String, String> {
    tool.input_fields
        .iter()
        .map(|field| {
            let value = inputs
                .get(&field.id)
                .cloned()
                .or_else(|| field.default_value.clone())
                .unwrap_or_default();
            (field.id.clone(), value)
        })
        .collect()
}
