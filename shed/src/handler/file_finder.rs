//! File-finder handler - wordlist-driven file discovery
//!
//! Wraps a fuzzing tool (ffuf-style) that probes a domain for a list of
//! filenames. The handler writes the user's filename list to a temporary
//! wordlist, points the tool's JSON output at a temporary results file,
//! runs the tool, and turns the results into a human-readable report. Both
//! temp files live in the output directory with random suffixes and are
//! removed on every exit path.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use toolstore::ArtifactStore;
use tracing::{debug, warn};

use super::{CustomHandler, HandlerEnv};
use crate::error::ExecError;
use crate::runner::RunOutput;
use crate::template;
use crate::tool::{ExecutionRequest, ToolDefinition};

const DEFAULT_PROTOCOL: &str = "https";

/// Wordlist-driven file discovery against a single domain
pub struct FileFinderHandler;

#[async_trait]
impl CustomHandler for FileFinderHandler {
    fn name(&self) -> &'static str {
        "file-finder"
    }

    async fn run(
        &self,
        tool: &ToolDefinition,
        inputs: &ExecutionRequest,
        env: &HandlerEnv<'_>,
    ) -> Result<RunOutput, ExecError> {
        let domain = required(inputs, "domain")?;
        let filenames = required(inputs, "filenames")?;
        let protocol = inputs
            .get("protocol")
            .filter(|p| !p.is_empty())
            .map(String::as_str)
            .unwrap_or(DEFAULT_PROTOCOL);

        let entries = wordlist_entries(filenames);
        if entries.is_empty() {
            return Err(ExecError::Validation(
                "Filenames input was empty or contained no valid filenames.".to_string(),
            ));
        }

        let wordlist = env.artifacts.temp_path("temp_wordlist", "txt");
        let results = env.artifacts.temp_path("finder_out", "json");
        fs::write(&wordlist, entries.join("\n") + "\n")?;
        debug!(wordlist = %wordlist.display(), lines = entries.len(), "Wrote temporary wordlist");

        // Everything after temp creation runs behind the cleanup below, so
        // an unresolved-template abort still removes both files
        let outcome = self.resolve_and_execute(tool, env, &wordlist, &results, protocol, domain).await;
        let cleanup_warning = remove_temp_files(env.artifacts, &[&wordlist, &results]);

        let mut output = outcome?;
        if let Some(warning) = cleanup_warning {
            output.text.push_str(&format!("\n{}", warning));
        }
        Ok(output)
    }
}

impl FileFinderHandler {
    async fn resolve_and_execute(
        &self,
        tool: &ToolDefinition,
        env: &HandlerEnv<'_>,
        wordlist: &Path,
        results: &Path,
        protocol: &str,
        domain: &str,
    ) -> Result<RunOutput, ExecError> {
        let mut values = HashMap::new();
        values.insert("wordlist_path".to_string(), wordlist.to_string_lossy().into_owned());
        values.insert("results_path".to_string(), results.to_string_lossy().into_owned());
        values.insert("protocol".to_string(), protocol.to_string());
        values.insert("domain".to_string(), domain.to_string());

        let command = template::render_command(&tool.command_template, &values)?;
        let run = env.runner.run(&command, env.cwd).await;

        Ok(RunOutput {
            text: build_report(&run.text, results),
            status: run.status,
        })
    }
}

/// Present and non-empty. A whitespace-only value passes here; for the
/// filename list that case is caught later as "no valid filenames", which is
/// a different user mistake than omitting the field.
fn required<'a>(inputs: &'a ExecutionRequest, key: &str) -> Result<&'a str, ExecError> {
    inputs
        .get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ExecError::Validation("Domain and filenames are required for the file finder.".to_string()))
}

/// Trimmed, non-blank lines with a leading `/` stripped
fn wordlist_entries(filenames: &str) -> Vec<&str> {
    filenames
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.strip_prefix('/').unwrap_or(line))
        .collect()
}

/// Shape of the tool's JSON results file
#[derive(Debug, Deserialize)]
struct FinderResults {
    #[serde(default)]
    results: Vec<FinderHit>,
}

#[derive(Debug, Deserialize)]
struct FinderHit {
    #[serde(default)]
    url: String,
    #[serde(default)]
    status: Option<i64>,
    #[serde(default)]
    length: Option<u64>,
}

/// Turn the raw console output plus the results file into the final report
///
/// A missing results file and a malformed one are reported distinctly; an
/// empty hit list is stated rather than silently succeeding.
fn build_report(console_output: &str, results_path: &Path) -> String {
    let mut report = format!("Console output:\n{}\n\nDiscovered files:\n", console_output);

    if !results_path.exists() {
        report.push_str("Results file was not created. Check the console output above for errors.\n");
        return report;
    }

    let content = match fs::read_to_string(results_path) {
        Ok(content) => content,
        Err(e) => {
            report.push_str(&format!("Error: Could not read the results file: {}\n", e));
            return report;
        }
    };

    match serde_json::from_str::<FinderResults>(&content) {
        Ok(parsed) if parsed.results.is_empty() => {
            report.push_str("No files found matching criteria.\n");
        }
        Ok(parsed) => {
            for hit in &parsed.results {
                let status = hit.status.map(|s| s.to_string()).unwrap_or_else(|| "?".to_string());
                let length = hit.length.map(|l| l.to_string()).unwrap_or_else(|| "?".to_string());
                report.push_str(&format!("- {} (Status: {}, Size: {})\n", hit.url, status, length));
            }
        }
        Err(_) => {
            report.push_str("Error: Could not decode the results JSON.\n");
        }
    }

    report
}

/// Best-effort temp file removal; a failure becomes a report warning
fn remove_temp_files(artifacts: &ArtifactStore, paths: &[&Path]) -> Option<String> {
    let mut failed = false;
    for path in paths {
        if let Err(e) = artifacts.remove(path) {
            warn!(path = %path.display(), %e, "Failed to remove temporary file");
            failed = true;
        }
    }
    failed.then(|| "Warning: Could not remove temporary files.".to_string())
}
