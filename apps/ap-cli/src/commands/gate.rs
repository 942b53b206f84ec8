// gate.rs — `ap gate <path>`: evaluate the access gate for a navigation.

use ap_gate::AccessGate;

use super::Context;

pub async fn execute(
    ctx: &Context,
    path: &str,
    actor: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let gate = AccessGate::new(ctx.config.gate.clone());
    let directory = ctx.directory();
    let trace = gate.trace_for(directory.as_ref(), actor, path).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&trace)?);
        return Ok(());
    }

    println!("{} ({})", trace.decision, trace.state);
    for step in &trace.steps {
        let marker = if step.terminal { "*" } else { " " };
        println!("  {} {:<16} {}", marker, step.check, step.outcome);
    }
    Ok(())
}
