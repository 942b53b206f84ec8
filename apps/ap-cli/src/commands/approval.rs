// approval.rs — Approval subcommands: pending, resolve, bulk, watch.

use ap_approval::{ApprovalQueue, Decision};
use ap_events::NotificationPoller;
use ap_store::ApprovalRequest;
use clap::{Args, Subcommand};

use super::Context;

/// `--approve` or `--reject`, exactly one.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = true, multiple = false)]
pub struct DecisionArgs {
    #[arg(long)]
    approve: bool,
    #[arg(long)]
    reject: bool,
}

impl DecisionArgs {
    fn decision(&self) -> Decision {
        if self.approve {
            Decision::Approved
        } else {
            Decision::Rejected
        }
    }
}

#[derive(Subcommand)]
pub enum ApprovalCommands {
    /// List subjects whose latest request is pending.
    Pending {
        reviewer: String,
    },
    /// Approve or reject one subject.
    Resolve {
        subject: String,
        #[arg(long)]
        reviewer: String,
        #[command(flatten)]
        decision: DecisionArgs,
    },
    /// Approve or reject several subjects at once. Failures are reported,
    /// not retried.
    Bulk {
        #[arg(long)]
        reviewer: String,
        #[command(flatten)]
        decision: DecisionArgs,
        #[arg(required = true)]
        subjects: Vec<String>,
    },
    /// Refresh the pending list on the configured interval.
    Watch {
        reviewer: String,
        /// Stop after this many refreshes (default: until Ctrl-C).
        #[arg(long)]
        ticks: Option<u32>,
    },
}

pub async fn execute(cmd: &ApprovalCommands, ctx: &Context) -> anyhow::Result<()> {
    let queue = ApprovalQueue::new(ctx.gateway()).with_events(ctx.events());

    match cmd {
        ApprovalCommands::Pending { reviewer } => {
            let pending = queue.pending(reviewer).await?;
            print_pending(reviewer, &pending);
            Ok(())
        }
        ApprovalCommands::Resolve {
            subject,
            reviewer,
            decision,
        } => {
            let resolved = queue.resolve(subject, decision.decision(), reviewer).await?;
            println!("{}: {}", resolved.subject_id, resolved.status);
            Ok(())
        }
        ApprovalCommands::Bulk {
            reviewer,
            decision,
            subjects,
        } => {
            let outcome = queue
                .resolve_bulk(subjects.iter().cloned(), decision.decision(), reviewer)
                .await;
            println!("{}", outcome);
            for failure in &outcome.failures {
                println!(
                    "  {:<12} {} ({})",
                    failure.subject_id,
                    failure.error,
                    failure.error.kind()
                );
            }
            if !outcome.is_complete_success() {
                println!(
                    "\nNot resolved: {}",
                    outcome.failed_subjects().join(" ")
                );
            }
            Ok(())
        }
        ApprovalCommands::Watch { reviewer, ticks } => watch(ctx, queue, reviewer, *ticks).await,
    }
}

async fn watch(
    ctx: &Context,
    queue: ApprovalQueue,
    reviewer: &str,
    ticks: Option<u32>,
) -> anyhow::Result<()> {
    let poller = NotificationPoller::from_config(&ctx.config.poller);
    let watched = reviewer.to_string();
    let mut handle = poller.start(move || {
        let queue = queue.clone();
        let reviewer = watched.clone();
        async move { queue.pending(&reviewer).await.map_err(|e| e.to_string()) }
    });
    println!(
        "Watching approvals for {} every {}s (Ctrl-C to stop).",
        reviewer,
        poller.interval().as_secs()
    );

    let mut seen = 0u32;
    loop {
        tokio::select! {
            changed = handle.changed() => {
                if !changed {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
        match handle.latest() {
            Some(Ok(pending)) => print_pending(reviewer, &pending),
            Some(Err(e)) => tracing::warn!("refresh failed: {}", e),
            None => {}
        }
        seen += 1;
        if ticks.is_some_and(|limit| seen >= limit) {
            break;
        }
    }
    handle.join().await;
    Ok(())
}

fn print_pending(reviewer: &str, pending: &[ApprovalRequest]) {
    if pending.is_empty() {
        println!("No pending approvals for {}.", reviewer);
        return;
    }
    println!("{:<12} {:<26} GSP", "SUBJECT", "SUBMITTED");
    for request in pending {
        println!(
            "{:<12} {:<26} {}",
            request.subject_id,
            request.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            first_line(&request.content.gsp)
        );
    }
    println!("\n{} pending.", pending.len());
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}
