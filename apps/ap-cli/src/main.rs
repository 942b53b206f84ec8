//! # ap-cli
//!
//! Command-line interface for Appraise.
//!
//! Drives the onboarding and approval workflow against a project-local store
//! under `.appraise/`:
//! - `ap actor add/show/password-changed` — manage actors and their flags
//! - `ap gate <path>` — ask the access gate where a session may go
//! - `ap goal show/save/history` — per-category goal records
//! - `ap onboarding submit/status` — GSP / Focus 30 submission
//! - `ap approval pending/resolve/bulk/watch` — the reviewer's queue
//! - `ap score show/set` — cached performance scores

mod commands;
mod config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use commands::Context;

/// Appraise CLI — goals, onboarding approvals and scores.
#[derive(Parser)]
#[command(name = "ap", version, about)]
struct Cli {
    /// Project root directory (defaults to current directory).
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Emit logs as JSON lines on stderr.
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage actors.
    Actor {
        #[command(subcommand)]
        command: commands::actor::ActorCommands,
    },
    /// Evaluate the access gate for a path.
    Gate {
        /// Requested path (e.g., "/dashboard").
        path: String,
        /// Signed-in actor; omit for an anonymous session.
        #[arg(long)]
        actor: Option<String>,
        /// Print the trace as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Read and write goal records.
    Goal {
        #[command(subcommand)]
        command: commands::goal::GoalCommands,
    },
    /// Submit onboarding and check its status.
    Onboarding {
        #[command(subcommand)]
        command: commands::onboarding::OnboardingCommands,
    },
    /// Review onboarding submissions.
    Approval {
        #[command(subcommand)]
        command: commands::approval::ApprovalCommands,
    },
    /// Show and record performance scores.
    Score {
        #[command(subcommand)]
        command: commands::score::ScoreCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json)?;

    let project_root = cli.project_root.canonicalize().unwrap_or(cli.project_root);
    let ctx = Context::open(&project_root).await?;

    match &cli.command {
        Commands::Actor { command } => commands::actor::execute(command, &ctx).await,
        Commands::Gate { path, actor, json } => {
            commands::gate::execute(&ctx, path, actor.as_deref(), *json).await
        }
        Commands::Goal { command } => commands::goal::execute(command, &ctx).await,
        Commands::Onboarding { command } => commands::onboarding::execute(command, &ctx).await,
        Commands::Approval { command } => commands::approval::execute(command, &ctx).await,
        Commands::Score { command } => commands::score::execute(command, &ctx).await,
    }
}

/// Logs go to stderr so command output stays pipeable. `RUST_LOG` overrides
/// the library default of `warn`.
fn init_tracing(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy()
        .add_directive("ap_cli=info".parse()?);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bulk_requires_exactly_one_decision() {
        let ok = Cli::try_parse_from([
            "ap", "approval", "bulk", "--reviewer", "m-1", "--approve", "a", "b",
        ]);
        assert!(ok.is_ok());
        let both = Cli::try_parse_from([
            "ap", "approval", "bulk", "--reviewer", "m-1", "--approve", "--reject", "a",
        ]);
        assert!(both.is_err());
        let neither = Cli::try_parse_from(["ap", "approval", "bulk", "--reviewer", "m-1", "a"]);
        assert!(neither.is_err());
    }

    #[test]
    fn category_arguments_are_parsed() {
        let cli = Cli::try_parse_from(["ap", "goal", "show", "093344", "people"]);
        assert!(cli.is_ok());
        let bad = Cli::try_parse_from(["ap", "goal", "show", "093344", "finance"]);
        assert!(bad.is_err());
    }
}
