use anyhow::{Context, Result};

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let vocabulary = app.vocabulary()?;
    let counts = vocabulary.counts();
    let stats = vocabulary.review_stats().context("Failed to load review history")?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "user": app.user_id,
                "language": app.language,
                "vocabulary": counts,
                "reviews": stats,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let accuracy = if stats.reviews_today > 0 {
                format!(" ({}% correct)", stats.correct_today * 100 / stats.reviews_today)
            } else {
                String::new()
            };

            println!("Language:       {}", app.language);
            println!("Words tracked:  {}", counts.total);
            println!("  known:        {}", counts.known);
            println!("  learning:     {}", counts.learning);
            println!("  ignored:      {}", counts.ignored);
            println!();
            println!("Due now:        {}", stats.due_items);
            println!("Never reviewed: {}", stats.new_items);
            println!("Reviews today:  {}{}", stats.reviews_today, accuracy);
            println!(
                "Streak:         {} day{}",
                stats.streak_days,
                if stats.streak_days == 1 { "" } else { "s" }
            );
        }
    }

    Ok(())
}
