//! Toolshed - registry and runner for external command-line tools
//!
//! Toolshed keeps a registry of external CLI tools described by command
//! templates with `{{placeholder}}` slots, runs them with shell-safe
//! substitution and a hard timeout, and records every invocation: the full
//! output lands as a named artifact on disk and a summary row in the
//! history log.
//!
//! # Core Concepts
//!
//! - **Templates, not shells**: commands are split into argv and run
//!   directly; user input is quoted so it can never grow new arguments
//! - **Everything persisted**: tool definitions, run history, and output
//!   artifacts all live as plain files under one base directory
//! - **Strategies**: most tools run through generic substitution; tagged
//!   strategies route to built-in handlers with bespoke pre/post-processing
//!
//! # Modules
//!
//! - [`tool`] - Tool definitions and input fields
//! - [`template`] - Placeholder parsing and shell-safe rendering
//! - [`runner`] - Child process execution with timeout
//! - [`handler`] - Custom execution strategies (file finder)
//! - [`orchestrator`] - The end-to-end invocation path
//! - [`registry`] / [`history`] - Persistence on top of `toolstore`
//! - [`provision`] - Clone-and-install at registration time
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod history;
pub mod naming;
pub mod orchestrator;
pub mod provision;
pub mod registry;
pub mod runner;
pub mod template;
pub mod tool;

// Re-export commonly used types
pub use config::{Config, ExecConfig, StorageConfig};
pub use error::ExecError;
pub use handler::{CustomHandler, FileFinderHandler, HandlerEnv};
pub use history::{HistoryLog, HistoryRecord};
pub use orchestrator::{Invocation, Orchestrator};
pub use registry::ToolRegistry;
pub use runner::{CommandRunner, RunOutput, RunStatus};
pub use template::{TemplateError, render_command};
pub use tool::{ExecutionRequest, ExecutionStrategy, InputField, ToolDefinition};
