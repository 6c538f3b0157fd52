use anyhow::Result;

use lexis_lib::clock::Clock;

use crate::app::App;
use crate::render::terminal::{rule, status_label, truncate};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let sessions = app.sessions();
    let due = sessions.get_due_items(&app.user_id, &app.language);
    let new_items: Vec<_> = sessions
        .session_pool(&app.user_id, &app.language)
        .into_iter()
        .filter(|item| !due.iter().any(|d| d.id == item.id))
        .collect();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "due": due,
                "new": new_items,
                "sessionCap": sessions.session_cap(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if due.is_empty() && new_items.is_empty() {
                println!("Nothing to review in {}.", app.language);
                return Ok(());
            }

            let now = app.clock.now();
            if !due.is_empty() {
                println!("{:<24} {:<12} {}", "DUE", "STATUS", "OVERDUE");
                println!("{}", rule(50));
                for item in &due {
                    let overdue = (now - item.next_review_date).num_days();
                    let padding = " ".repeat(12usize.saturating_sub(item.status.label().len()));
                    println!(
                        "{:<24} {}{} {}d",
                        truncate(&item.word, 24),
                        status_label(item.status, use_color),
                        padding,
                        overdue
                    );
                }
                println!();
            }

            if !new_items.is_empty() {
                println!("NEW");
                println!("{}", rule(50));
                for item in &new_items {
                    println!("{}", truncate(&item.word, 48));
                }
                println!();
            }

            println!("Next session: {} due, {} new", due.len(), new_items.len());
        }
    }

    Ok(())
}
