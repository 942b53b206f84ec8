// score.rs — Score subcommands: show, set.

use ap_score::ScoreCache;
use ap_store::{Category, PerformanceScore};
use clap::Subcommand;

use super::Context;

#[derive(Subcommand)]
pub enum ScoreCommands {
    /// Show an actor's scores (all categories, or one).
    Show {
        actor: String,
        category: Option<Category>,
    },
    /// Record a new current/target score for one category.
    Set {
        actor: String,
        category: Category,
        current: f64,
        target: f64,
    },
}

pub async fn execute(cmd: &ScoreCommands, ctx: &Context) -> anyhow::Result<()> {
    let cache = ScoreCache::new(ctx.gateway(), ctx.config.scores.clone());

    match cmd {
        ScoreCommands::Show { actor, category } => {
            cache.ensure_loaded(actor).await?;
            let scores = match category {
                Some(category) => cache.get(*category).await.into_iter().collect(),
                None => cache.all().await,
            };
            if scores.is_empty() {
                println!("No scores recorded for {}.", actor);
                return Ok(());
            }
            println!("{:<14} {:>9} {:>9} {:>9}", "CATEGORY", "CURRENT", "TARGET", "MAX");
            for score in &scores {
                print_score(score);
            }
            Ok(())
        }
        ScoreCommands::Set {
            actor,
            category,
            current,
            target,
        } => {
            cache.ensure_loaded(actor).await?;
            let score = cache.update(*category, *current, *target).await?;
            println!("Score recorded for {}:", actor);
            print_score(&score);
            Ok(())
        }
    }
}

fn print_score(score: &PerformanceScore) {
    println!(
        "{:<14} {:>9.1} {:>9.1} {:>9.1}",
        score.category.as_str(),
        score.current_score,
        score.target_score,
        score.max_score
    );
}
