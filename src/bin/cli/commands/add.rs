use anyhow::{Context, Result, bail};

use lexis_lib::vocabulary::{ExampleSentence, NewWord};

use crate::app::App;
use crate::render::terminal::status_label;
use crate::OutputFormat;

/// Collect the optional flags of `add` into the content saved with a word
pub fn content(
    translation: Option<String>,
    definition: Option<String>,
    example: Option<String>,
    example_translation: Option<String>,
    lesson: Option<String>,
) -> NewWord {
    NewWord {
        translation,
        definition,
        lesson_id: lesson,
        example: example.map(|text| ExampleSentence {
            text,
            translation: example_translation,
        }),
    }
}

pub fn run(app: &App, word: &str, content: NewWord, format: &OutputFormat, use_color: bool) -> Result<()> {
    if word.trim().is_empty() {
        bail!("Word must not be empty");
    }

    let mut vocabulary = app.vocabulary()?;
    let already_tracked = vocabulary.find_word(word).is_some();
    let item = vocabulary
        .add_word(word, content)
        .with_context(|| format!("Failed to add '{}'", word))?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "added": !already_tracked,
                "item": item,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if already_tracked {
                println!(
                    "'{}' is already tracked ({})",
                    item.word,
                    status_label(item.status, use_color)
                );
            } else {
                println!("Added '{}' to {}", item.word, app.language);
            }
        }
    }

    Ok(())
}
