// actor.rs — Actor subcommands: add, show, password-changed.

use ap_approval::Onboarding;
use ap_gate::GateState;
use ap_store::Actor;
use clap::Subcommand;

use super::Context;

#[derive(Subcommand)]
pub enum ActorCommands {
    /// Register an actor (or rename one, keeping their flags).
    Add {
        /// Employee ID (e.g., "093344").
        id: String,
        /// Display name.
        name: String,
        /// Employee ID of the actor's reviewer.
        #[arg(long)]
        reviewer: Option<String>,
    },
    /// Show an actor's flags and gate state.
    Show {
        id: String,
    },
    /// Record that the actor replaced their initial password.
    PasswordChanged {
        id: String,
    },
}

pub async fn execute(cmd: &ActorCommands, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        ActorCommands::Add { id, name, reviewer } => {
            add_actor(ctx, id, name, reviewer.clone()).await
        }
        ActorCommands::Show { id } => show_actor(ctx, id).await,
        ActorCommands::PasswordChanged { id } => {
            let onboarding =
                Onboarding::new(ctx.directory(), ctx.gateway()).with_events(ctx.events());
            let actor = onboarding.change_password(id).await?;
            println!("Password changed: {} ({})", actor.id, actor.display_name);
            Ok(())
        }
    }
}

async fn add_actor(
    ctx: &Context,
    id: &str,
    name: &str,
    reviewer: Option<String>,
) -> anyhow::Result<()> {
    let directory = ctx.directory();
    let actor = match directory.actor(id).await? {
        Some(existing) => Actor {
            display_name: name.to_string(),
            ..existing
        },
        None => Actor::new(id, name),
    };
    directory.upsert(actor, reviewer.clone()).await?;

    println!("Actor saved: {} ({})", id, name);
    if let Some(reviewer) = reviewer {
        println!("  Reviewer: {}", reviewer);
    }
    Ok(())
}

async fn show_actor(ctx: &Context, id: &str) -> anyhow::Result<()> {
    let directory = ctx.directory();
    let Some(actor) = directory.actor(id).await? else {
        anyhow::bail!("actor not found: {}", id);
    };
    let reviewer = directory.reviewer_of(id).await?;

    println!("Actor:       {} ({})", actor.id, actor.display_name);
    println!("  Password:  {}", if actor.password_changed { "changed" } else { "initial" });
    println!(
        "  Onboarding: {}",
        if actor.onboarding_complete { "complete" } else { "pending" }
    );
    println!("  Reviewer:  {}", reviewer.as_deref().unwrap_or("(none)"));
    println!("  Gate:      {}", GateState::of(Some(&actor)));
    Ok(())
}
