use anyhow::{Context, Result, bail};

use lexis_lib::vocabulary::{VocabularyItem, WordStatus};

use crate::app::App;
use crate::OutputFormat;

/// Parse a status given as its stored code (-1..5) or its name
pub fn parse_status(input: &str) -> Option<WordStatus> {
    let input = input.trim().to_lowercase();
    if let Ok(code) = input.parse::<i32>() {
        return (-1..=5).contains(&code).then(|| WordStatus::from_code(code));
    }

    let compact: String = input.chars().filter(|c| !c.is_whitespace() && *c != '-' && *c != '_').collect();
    match compact.as_str() {
        "ignored" | "ignore" => Some(WordStatus::Ignored),
        "known" => Some(WordStatus::Known),
        "new" => Some(WordStatus::New),
        "learning1" => Some(WordStatus::Learning1),
        "learning2" => Some(WordStatus::Learning2),
        "learning3" => Some(WordStatus::Learning3),
        "mastered" => Some(WordStatus::Mastered),
        _ => None,
    }
}

fn print_item(item: &VocabularyItem, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(item)?),
        OutputFormat::Plain => println!("'{}' is now {}", item.word, item.status.label()),
    }
    Ok(())
}

/// Set the status of a tracked word
pub fn run_set(app: &App, word: &str, status: &str, format: &OutputFormat) -> Result<()> {
    let Some(status) = parse_status(status) else {
        bail!(
            "Unknown status '{}'. Use -1..5 or one of: {}",
            status,
            WordStatus::ALL.iter().map(|s| s.label()).collect::<Vec<_>>().join(", ")
        );
    };

    let item = app.find_word(word)?;
    let mut vocabulary = app.vocabulary()?;
    let updated = vocabulary
        .update_status(item.id, status)
        .with_context(|| format!("Failed to update '{}'", item.word))?;
    print_item(&updated, format)
}

/// Mark words as known, tracking them first when needed
pub fn run_known(app: &App, words: &[String], format: &OutputFormat) -> Result<()> {
    let mut vocabulary = app.vocabulary()?;

    if let [word] = words {
        let item = vocabulary
            .mark_known(word)
            .with_context(|| format!("Failed to mark '{}' as known", word))?;
        return print_item(&item, format);
    }

    let marked = vocabulary
        .mark_all_known(words)
        .context("Failed to mark words as known")?;
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "marked": marked });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Marked {} new words as known", marked);
        }
    }
    Ok(())
}

pub fn run_ignore(app: &App, word: &str, format: &OutputFormat) -> Result<()> {
    let mut vocabulary = app.vocabulary()?;
    let item = vocabulary
        .ignore_word(word)
        .with_context(|| format!("Failed to ignore '{}'", word))?;
    print_item(&item, format)
}
