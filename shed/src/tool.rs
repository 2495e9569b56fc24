//! Tool definition types
//!
//! A [`ToolDefinition`] is the operator-authored configuration for one
//! external command: its template, declared input fields, provisioning
//! needs, and output naming. Definitions are read-only during execution;
//! the registry owns their lifecycle.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;
use uuid::Uuid;

/// User-supplied values for one invocation, keyed by input-field id
pub type ExecutionRequest = HashMap<String, String>;

/// How a tool's command is resolved and executed
///
/// `Generic` substitutes the declared input fields into the template.
/// Other variants name a built-in handler with bespoke pre/post-processing
/// around the same execution path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionStrategy {
    #[default]
    Generic,
    FileFinder,
}

/// One declared input field of a tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputField {
    /// Identifier used as the `{{id}}` placeholder
    pub id: String,

    /// Human-readable label
    #[serde(default)]
    pub label: Option<String>,

    /// Value used when the caller omits this field
    #[serde(default, rename = "default-value")]
    pub default_value: Option<String>,
}

impl InputField {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            default_value: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// Configuration describing one external command-line tool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ToolDefinition {
    /// Unique identifier
    #[serde(default)]
    pub id: String,

    /// Display name
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Free-text operator notes
    #[serde(default)]
    pub notes: String,

    /// Command line with `{{id}}` placeholders
    pub command_template: String,

    /// Declared input fields, in display order
    #[serde(default)]
    pub input_fields: Vec<InputField>,

    /// Whether registration clones a repository for this tool
    #[serde(default)]
    pub requires_clone: bool,

    #[serde(default)]
    pub clone_url: String,

    /// Clone target, relative to the base dir; set during provisioning
    #[serde(default)]
    pub clone_dir: String,

    /// Requirements file inside the clone, installed once at registration
    #[serde(default)]
    pub requirements_file: String,

    /// Working directory override, relative to the base dir
    #[serde(default)]
    pub run_in_directory: Option<String>,

    /// Pattern for the persisted artifact name
    #[serde(default = "default_output_pattern")]
    pub output_filename_pattern: String,

    #[serde(default)]
    pub strategy: ExecutionStrategy,
}

fn default_output_pattern() -> String {
    "{{TOOL_NAME_SANITIZED}}_{{TIMESTAMP}}.txt".to_string()
}

impl ToolDefinition {
    /// Create a definition with a generated id
    pub fn new(name: impl Into<String>, command_template: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: String::new(),
            notes: String::new(),
            command_template: command_template.into(),
            input_fields: Vec::new(),
            requires_clone: false,
            clone_url: String::new(),
            clone_dir: String::new(),
            requirements_file: String::new(),
            run_in_directory: None,
            output_filename_pattern: default_output_pattern(),
            strategy: ExecutionStrategy::Generic,
        }
    }

    pub fn with_field(mut self, field: InputField) -> Self {
        self.input_fields.push(field);
        self
    }

    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Display name collapsed to a lower-case identifier
    pub fn sanitized_name(&self) -> String {
        sanitize(&self.name.to_lowercase())
    }
}

static NON_WORD: LazyLock<regex::Regex> = LazyLock::new(|| regex::Regex::new(r"[^A-Za-z0-9_]+").expect("valid regex"));

/// Collapse every run of non-word characters to a single underscore
pub fn sanitize(value: &str) -> String {
    NON_WORD.replace_all(value, "_").into_owned()
}
