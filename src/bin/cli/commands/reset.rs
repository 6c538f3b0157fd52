use anyhow::{Context, Result, bail};

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, yes: bool, format: &OutputFormat) -> Result<()> {
    if !yes {
        bail!(
            "This deletes every {} word and its review history for '{}'. Re-run with --yes to confirm.",
            app.language,
            app.user_id
        );
    }

    let mut vocabulary = app.vocabulary()?;
    let removed = vocabulary
        .reset_language_progress()
        .with_context(|| format!("Failed to reset {} progress", app.language))?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "language": app.language,
                "removed": removed,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Removed {} words from {}", removed, app.language);
        }
    }

    Ok(())
}
