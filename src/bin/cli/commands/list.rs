use anyhow::{Result, bail};

use lexis_lib::vocabulary::VocabularyItem;

use crate::app::App;
use crate::commands::status::parse_status;
use crate::render::terminal::{rule, status_label, truncate};
use crate::OutputFormat;

pub fn run(app: &App, status: Option<&str>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let filter = match status {
        Some(s) => match parse_status(s) {
            Some(status) => Some(status),
            None => bail!("Unknown status '{}'", s),
        },
        None => None,
    };

    let vocabulary = app.vocabulary()?;
    let items: Vec<&VocabularyItem> = vocabulary
        .items()
        .iter()
        .filter(|item| filter.map_or(true, |status| item.status == status))
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        OutputFormat::Plain => {
            if items.is_empty() {
                println!("No words tracked in {}.", app.language);
                return Ok(());
            }

            let counts = vocabulary.counts();
            println!(
                "{} words in {} ({} known, {} learning, {} ignored)",
                counts.total, app.language, counts.known, counts.learning, counts.ignored
            );
            println!();
            println!("{:<24} {:<12} {:<30} {}", "WORD", "STATUS", "TRANSLATION", "NEXT REVIEW");
            println!("{}", rule(80));

            for item in items {
                // Pad before coloring so escape codes don't break alignment
                let padding = " ".repeat(12usize.saturating_sub(item.status.label().len()));
                let label = format!("{}{}", status_label(item.status, use_color), padding);
                let next = if item.status.is_learning() {
                    item.next_review_date.format("%Y-%m-%d").to_string()
                } else {
                    "-".to_string()
                };
                println!(
                    "{:<24} {} {:<30} {}",
                    truncate(&item.word, 24),
                    label,
                    truncate(item.translation.as_deref().unwrap_or(""), 30),
                    next
                );
            }
        }
    }

    Ok(())
}
