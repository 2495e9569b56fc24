//! One-time provisioning for tools that need a cloned repository
//!
//! Runs at registration, never on the execution hot path: clone the tool's
//! repository into `tools/<sanitized-name>` under the base dir, optionally
//! install its requirements file, and record the clone dir on the
//! definition. Removal deletes the clone dir only when it is contained in
//! the `tools/` directory.

use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

use crate::error::ExecError;
use crate::runner::CommandRunner;
use crate::tool::ToolDefinition;

/// Directory under the base dir that holds cloned tool repositories
pub const CLONE_ROOT: &str = "tools";

/// Clone and install a newly registered tool
///
/// Mutates `tool` (sets `clone_dir`, and `run_in_directory` when
/// `run_in_clone` is set) and returns a human-readable install log. A failed
/// clone is fatal; a failed requirements install is only a logged warning,
/// matching how much trust each step deserves - without the clone the tool
/// cannot run at all.
pub async fn provision(tool: &mut ToolDefinition, base_dir: &Path, runner: &CommandRunner, run_in_clone: bool) -> Result<String, ExecError> {
    if !tool.requires_clone || tool.clone_url.is_empty() {
        return Ok(String::new());
    }

    let relative_clone = PathBuf::from(CLONE_ROOT).join(tool.sanitized_name());
    tool.clone_dir = relative_clone.to_string_lossy().into_owned();
    let clone_target = base_dir.join(&relative_clone);

    let mut log = String::new();

    if clone_target.exists() {
        log.push_str(&format!("Directory {} already exists. Skipping clone.\n", clone_target.display()));
    } else {
        if let Some(parent) = clone_target.parent() {
            fs::create_dir_all(parent)?;
        }
        let command = format!(
            "git clone {} {}",
            quote(&tool.clone_url),
            quote(&clone_target.to_string_lossy())
        );
        log.push_str(&format!("Attempting to clone: {}\n", command));
        let clone = runner.run(&command, None).await;
        log.push_str(&format!("Clone result:\n{}\n", clone.text));
        if !clone.is_success() {
            return Err(ExecError::Provision(format!("Failed to clone repository.\n{}", clone.text)));
        }
        info!(url = %tool.clone_url, target = %clone_target.display(), "Cloned tool repository");
    }

    if !tool.requirements_file.is_empty() {
        let requirements = clone_target.join(&tool.requirements_file);
        if contained_in(&requirements, &clone_target) && requirements.exists() {
            let command = format!("pip install -r {}", quote(&requirements.to_string_lossy()));
            log.push_str(&format!("Attempting to install requirements: {}\n", command));
            let install = runner.run(&command, Some(&clone_target)).await;
            log.push_str(&format!("Install result:\n{}\n", install.text));
            if !install.is_success() {
                warn!(tool = %tool.name, "Requirements install failed");
                log.push_str("Warning: requirements install may have failed.\n");
            }
        } else {
            log.push_str(&format!(
                "Requirements file {} not found. Skipping install.\n",
                requirements.display()
            ));
        }
    }

    if run_in_clone {
        tool.run_in_directory = Some(tool.clone_dir.clone());
    }

    Ok(log)
}

/// Remove a tool's clone directory, if it has one and it is safely contained
///
/// Returns a message describing what happened; never fails the removal of
/// the definition itself.
pub fn remove_clone_dir(tool: &ToolDefinition, base_dir: &Path) -> String {
    if !tool.requires_clone || tool.clone_dir.is_empty() {
        return String::new();
    }

    let clone_root = base_dir.join(CLONE_ROOT);
    let target = base_dir.join(&tool.clone_dir);

    if !contained_in(&target, &clone_root) {
        warn!(dir = %target.display(), "Clone directory not contained, refusing to remove");
        return format!("Directory '{}' was not safe to remove. Not removed.", tool.clone_dir);
    }
    if !target.is_dir() {
        return String::new();
    }
    match fs::remove_dir_all(&target) {
        Ok(()) => format!("Associated directory '{}' also removed.", tool.clone_dir),
        Err(e) => format!("Failed to remove directory '{}': {}", tool.clone_dir, e),
    }
}

fn quote(value: &str) -> String {
    shlex::try_quote(value).map(|q| q.into_owned()).unwrap_or_default()
}

/// Lexical containment check (resolves `.` and `..`, no filesystem access)
fn contained_in(path: &Path, root: &Path) -> bool {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized.starts_with(root)
}
