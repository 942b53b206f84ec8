// onboarding.rs — Onboarding subcommands: submit, status.

use ap_approval::{ApprovalQueue, Onboarding};
use ap_store::{ApprovalStatus, OnboardingContent};
use clap::Subcommand;

use super::Context;

#[derive(Subcommand)]
pub enum OnboardingCommands {
    /// Submit (or resubmit after rejection) the GSP and Focus 30.
    Submit {
        actor: String,
        #[arg(long)]
        gsp: String,
        #[arg(long)]
        focus30: String,
    },
    /// Show the actor's latest approval request.
    Status {
        actor: String,
    },
}

pub async fn execute(cmd: &OnboardingCommands, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        OnboardingCommands::Submit {
            actor,
            gsp,
            focus30,
        } => {
            let onboarding =
                Onboarding::new(ctx.directory(), ctx.gateway()).with_events(ctx.events());
            let content = OnboardingContent {
                gsp: gsp.clone(),
                focus30: focus30.clone(),
            };
            let request = onboarding.submit(actor, content).await?;
            println!("Submitted for approval: {}", request.request_id);
            println!("  Reviewer: {}", request.reviewer_id);
            Ok(())
        }
        OnboardingCommands::Status { actor } => {
            let queue = ApprovalQueue::new(ctx.gateway());
            let Some(latest) = queue.status(actor).await? else {
                println!("{} has not submitted onboarding yet.", actor);
                return Ok(());
            };
            println!("Onboarding: {}", actor);
            println!("  Status:   {}", latest.status);
            println!("  Reviewer: {}", latest.reviewer_id);
            println!("  Updated:  {}", latest.created_at.to_rfc3339());
            if latest.status == ApprovalStatus::Rejected {
                println!();
                println!("Your submission was rejected. Update it and run:");
                println!("  ap onboarding submit {} --gsp ... --focus30 ...", actor);
            }
            Ok(())
        }
    }
}
