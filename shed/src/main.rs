//! Toolshed CLI entry point

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use std::fs;
use tracing::info;
use uuid::Uuid;

use toolshed::cli::{Cli, Command};
use toolshed::config::Config;
use toolshed::orchestrator::Orchestrator;
use toolshed::provision;
use toolshed::runner::RunStatus;
use toolshed::tool::{ExecutionRequest, ToolDefinition};

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };

    // Logs go to stderr so stdout stays clean for command output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    fs::create_dir_all(&config.storage.base_dir).context("Failed to create storage directory")?;

    info!(base_dir = %config.storage.base_dir.display(), "toolshed starting");

    let orchestrator = Orchestrator::new(&config).context("Failed to open storage")?;

    match cli.command {
        Command::Tools => cmd_tools(&orchestrator),
        Command::Add { file, run_in_clone } => cmd_add(&orchestrator, &file, run_in_clone).await,
        Command::Rm { tool_id } => cmd_rm(&orchestrator, &tool_id),
        Command::Run { tool_id, inputs } => cmd_run(&orchestrator, &tool_id, inputs).await,
        Command::History { tool_id } => cmd_history(&orchestrator, tool_id.as_deref()),
        Command::Show { artifact } => cmd_show(&orchestrator, &artifact),
    }
}

/// List registered tools
fn cmd_tools(orchestrator: &Orchestrator) -> Result<()> {
    let tools = orchestrator.registry().list()?;

    if tools.is_empty() {
        println!("No tools registered");
        return Ok(());
    }

    for tool in tools {
        println!("{} {}", tool.id.yellow(), tool.name.cyan());
        if !tool.description.is_empty() {
            println!("  {}", tool.description);
        }
        println!("  {}", tool.command_template.dimmed());
    }

    Ok(())
}

/// Register a tool from a YAML definition file
async fn cmd_add(orchestrator: &Orchestrator, file: &std::path::Path, run_in_clone: bool) -> Result<()> {
    let content = fs::read_to_string(file).context(format!("Failed to read {}", file.display()))?;
    let mut tool: ToolDefinition =
        serde_yaml::from_str(&content).context(format!("Failed to parse tool definition {}", file.display()))?;

    if tool.id.is_empty() {
        tool.id = Uuid::new_v4().to_string();
    }

    let log = provision::provision(&mut tool, orchestrator.base_dir(), orchestrator.runner(), run_in_clone).await?;
    if !log.is_empty() {
        print!("{}", log);
    }

    let id = tool.id.clone();
    let name = tool.name.clone();
    orchestrator.registry().add(tool)?;

    println!("{} Registered tool: {} ({})", "✓".green(), name.cyan(), id.yellow());
    Ok(())
}

/// Remove a tool and its cloned repository
fn cmd_rm(orchestrator: &Orchestrator, tool_id: &str) -> Result<()> {
    match orchestrator.registry().remove(tool_id)? {
        Some(tool) => {
            let cleanup = provision::remove_clone_dir(&tool, orchestrator.base_dir());
            println!("{} Removed tool: {}", "✓".green(), tool.name.cyan());
            if !cleanup.is_empty() {
                println!("{}", cleanup);
            }
            Ok(())
        }
        None => Err(eyre::eyre!("Tool not found: {}", tool_id)),
    }
}

/// Run a tool with the given inputs
async fn cmd_run(orchestrator: &Orchestrator, tool_id: &str, inputs: Vec<(String, String)>) -> Result<()> {
    let request: ExecutionRequest = inputs.into_iter().collect();

    let invocation = orchestrator.invoke(tool_id, &request).await?;

    println!("{}", invocation.output);
    println!();
    println!("Status: {}", status_colored(invocation.status));
    println!("Output saved as: {}", invocation.output_file.yellow());

    Ok(())
}

/// Show past runs, newest first
fn cmd_history(orchestrator: &Orchestrator, tool_id: Option<&str>) -> Result<()> {
    let records = match tool_id {
        Some(id) => orchestrator.history().list_by_tool(id)?,
        None => orchestrator.history().all()?,
    };

    if records.is_empty() {
        println!("No history found");
        return Ok(());
    }

    for record in records {
        println!(
            "{} {} {} {}",
            record.timestamp.dimmed(),
            status_colored(record.status),
            record.tool_name.cyan(),
            record.output_file.yellow()
        );
        if !record.preview.is_empty() {
            println!("  {}", record.preview);
        }
    }

    Ok(())
}

/// Print a stored output artifact
fn cmd_show(orchestrator: &Orchestrator, artifact: &str) -> Result<()> {
    let content = orchestrator.artifacts().read(artifact)?;
    print!("{}", content);
    Ok(())
}

fn status_colored(status: RunStatus) -> ColoredString {
    match status {
        RunStatus::Success => "success".green(),
        RunStatus::Error => "error".red(),
    }
}
