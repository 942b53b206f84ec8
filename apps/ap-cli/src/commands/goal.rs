// goal.rs — Goal subcommands: show, save, history.

use ap_goal::{GoalLifecycle, SaveAs};
use ap_store::{Category, GoalRecord, Payload};
use clap::Subcommand;
use serde_json::Value;

use super::Context;

#[derive(Subcommand)]
pub enum GoalCommands {
    /// Show the current record for one category.
    Show {
        actor: String,
        /// business, people, collaboration, quality or industry.
        category: Category,
    },
    /// Append a new record (in progress, or submitted with --submit).
    Save {
        actor: String,
        category: Category,
        /// Payload field as key=value; values that parse as JSON are stored as JSON.
        #[arg(long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,
        /// Submit the record. Submitted records cannot be edited again.
        #[arg(long)]
        submit: bool,
    },
    /// List every saved record for one category, oldest first.
    History {
        actor: String,
        category: Category,
    },
}

pub async fn execute(cmd: &GoalCommands, ctx: &Context) -> anyhow::Result<()> {
    let lifecycle =
        GoalLifecycle::new(ctx.gateway(), ctx.config.validators()?).with_events(ctx.events());

    match cmd {
        GoalCommands::Show { actor, category } => {
            let record = lifecycle.current(actor, *category).await?;
            print_record(&record);
            Ok(())
        }
        GoalCommands::Save {
            actor,
            category,
            fields,
            submit,
        } => {
            let payload = parse_fields(fields)?;
            let target = if *submit {
                SaveAs::Submitted
            } else {
                SaveAs::InProgress
            };
            let record = lifecycle.save(actor, *category, payload, target).await?;
            println!("Goal saved.");
            print_record(&record);
            Ok(())
        }
        GoalCommands::History { actor, category } => {
            let rows = lifecycle.history(actor, *category).await?;
            if rows.is_empty() {
                println!("No {} records for {}.", category, actor);
                return Ok(());
            }
            println!("{:<38} {:<12} {:<26} FIELDS", "ROW", "STATUS", "CREATED");
            for row in &rows {
                println!(
                    "{:<38} {:<12} {:<26} {}",
                    row.record_id.map(|id| id.to_string()).unwrap_or_default(),
                    row.status.to_string(),
                    row.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                    row.payload.len()
                );
            }
            println!("\n{} record(s).", rows.len());
            Ok(())
        }
    }
}

fn print_record(record: &GoalRecord) {
    println!("Goal:      {} / {}", record.actor_id, record.category);
    println!("  Status:  {}", record.status);
    match record.record_id {
        Some(id) => println!("  Row:     {} ({})", id, record.created_at.to_rfc3339()),
        None => println!("  Row:     (nothing saved yet)"),
    }
    for (key, value) in &record.payload {
        println!("  {:<12} {}", key, value);
    }
}

fn parse_fields(fields: &[String]) -> anyhow::Result<Payload> {
    let mut payload = Payload::new();
    for field in fields {
        let Some((key, raw)) = field.split_once('=') else {
            anyhow::bail!("expected KEY=VALUE, got '{}'", field);
        };
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("empty field name in '{}'", field);
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        payload.insert(key.to_string(), value);
    }
    Ok(payload)
}
