//! Output artifact naming
//!
//! Derives a filesystem-safe leaf name from a tool's output pattern. Known
//! tokens are substituted with sanitized values; whatever survives (including
//! unrecognized tokens) goes through a final pass that maps every character
//! outside `[alphanumeric . _ -]` to `_`, so the result can never contain a
//! path separator and always stays inside the output directory.

use crate::tool::{ExecutionRequest, ToolDefinition, sanitize};

/// Maximum length of a substituted input value
const INPUT_VALUE_MAX: usize = 30;

/// Timestamp format for `{{TIMESTAMP}}` (`YYYYMMDD_HHMMSS`)
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Render the artifact name for one invocation
///
/// `timestamp` and `token` are injected so the result is deterministic for
/// callers that need it; the orchestrator passes the current time and a
/// fresh random token.
pub fn output_filename(tool: &ToolDefinition, inputs: &ExecutionRequest, timestamp: &str, token: &str) -> String {
    let mut name = tool.output_filename_pattern.clone();
    name = name.replace("{{TOOL_ID}}", &tool.id);
    name = name.replace("{{TOOL_NAME_SANITIZED}}", &tool.sanitized_name());
    name = name.replace("{{TIMESTAMP}}", timestamp);
    name = name.replace("{{UUID}}", token);

    for field in &tool.input_fields {
        let value = inputs.get(&field.id).map(String::as_str).unwrap_or("");
        let sanitized: String = sanitize(value).chars().take(INPUT_VALUE_MAX).collect();
        name = name.replace(&format!("{{{{INPUT__{}}}}}", field.id), &sanitized);
    }

    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
