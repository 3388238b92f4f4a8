//! courier - CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use courier::git::GitCli;
use courier::github::GitHubHost;
use courier::interaction::TerminalInteraction;
use courier::workflow::{Outcome, Preview, Workflow, WorkflowConfig, WorkflowState, preview};

/// Environment variable overriding the GitHub REST API base URL.
const API_BASE_ENV: &str = "COURIER_GITHUB_API";

/// Commit, push and open a pull request for the current changes.
#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(about = "Commit, push and open a pull request for the current changes")]
#[command(version)]
struct Cli {
    /// Remote to push to
    #[arg(long, default_value = "origin")]
    remote: String,

    /// Show the suggested commit and sensitive files without changing anything
    #[arg(long)]
    dry_run: bool,

    /// Print the preview or the final outcome as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Repository to operate on
    #[arg(short = 'C', long = "repo", default_value = ".")]
    repo: PathBuf,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("warn,courier=debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let vcs = GitCli::open(&cli.repo, cli.remote.clone())
        .context("Not a git repository. Run courier from within a git repository.")?;

    if cli.dry_run {
        let preview = preview(&vcs).context("Failed to read working tree changes")?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&preview.report())?);
        } else {
            print_preview(&preview);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let remote_url = vcs
        .remote_url()
        .context("Failed to read remote configuration")?;
    let api_base = std::env::var(API_BASE_ENV).ok();
    let host = GitHubHost::new(remote_url.as_deref(), api_base.as_deref())
        .context("Failed to set up GitHub client")?;

    let config = WorkflowConfig {
        remote: cli.remote,
        ..WorkflowConfig::default()
    };
    let mut workflow = Workflow::new(vcs, host, config);
    let outcome = workflow.drive(&mut TerminalInteraction::new()).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(ExitCode::from(outcome.exit_code() as u8))
}

fn print_preview(preview: &Preview) {
    match &preview.branch {
        Ok(branch) => println!("Branch: {}", branch),
        Err(reason) => println!("Branch: (unresolved) {}", reason),
    }

    if !preview.has_changes() {
        println!("Nothing to commit. Working tree is clean.");
        return;
    }

    println!();
    println!("Files:");
    for file in preview.change_set.files() {
        println!("  [{}] {}", file.status, file.path);
    }

    if let Some(message) = &preview.message {
        println!();
        println!("Suggested commit: {}", message);
    }
    if let Some(summary) = &preview.summary {
        for reason in &summary.rationale {
            println!("  - {}", reason);
        }
    }

    println!();
    if preview.findings.is_empty() {
        println!("  [PASS] No sensitive files");
    } else {
        for finding in &preview.findings {
            println!("  [WARN] {}", finding);
        }
    }

    println!();
    println!("Dry run complete. No changes made.");
}

fn print_outcome(outcome: &Outcome) {
    println!();
    match outcome.state {
        WorkflowState::Failed | WorkflowState::NotOnBranch => {
            eprintln!("  [FAIL] {}", outcome.message);
            if let Some(error) = &outcome.error {
                eprintln!();
                eprintln!("{}", error);
            }
        }
        WorkflowState::Aborted | WorkflowState::NoChanges => {
            println!("  [SKIP] {}", outcome.message);
        }
        _ => {
            if let Some(commit) = &outcome.commit {
                println!("  [DONE] Committed {}", commit);
            }
            println!("  [DONE] {}", outcome.message);
        }
    }
}
