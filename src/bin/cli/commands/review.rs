use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use lexis_lib::srs::algorithm::format_interval;
use lexis_lib::srs::{ReviewCard, ReviewGrade, ReviewSession, SessionState};
use lexis_lib::vocabulary::{CardDirection, StoreError};

use crate::app::App;
use crate::render::terminal::{paint, rule, Color};
use crate::OutputFormat;

enum Input {
    Line(String),
    Quit,
}

fn prompt_line(lines: &mut impl Iterator<Item = io::Result<String>>, message: &str) -> Result<Input> {
    print!("{}", message);
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => {
            let line = line.context("Failed to read from stdin")?;
            if line.trim().eq_ignore_ascii_case("q") {
                Ok(Input::Quit)
            } else {
                Ok(Input::Line(line))
            }
        }
        None => Ok(Input::Quit),
    }
}

/// Parse an answer given as a 0-5 quality or as a grade name
fn parse_quality(input: &str) -> Option<i32> {
    let input = input.trim();
    if let Ok(quality) = input.parse::<i32>() {
        return (0..=5).contains(&quality).then_some(quality);
    }
    ReviewGrade::parse(input).map(ReviewGrade::quality)
}

/// e.g. "es \u{2192} en" for a card asking for the native-language answer
fn direction_hint(card: &ReviewCard, target: &str, native: &str) -> String {
    match card.direction {
        CardDirection::TargetToNative => format!("{} \u{2192} {}", target, native),
        CardDirection::NativeToTarget => format!("{} \u{2192} {}", native, target),
    }
}

pub fn run(app: &App, seed: Option<u64>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let sessions = app.sessions();
    let cards = match seed {
        Some(seed) => sessions.build_session(&app.user_id, &app.language, &mut StdRng::seed_from_u64(seed)),
        None => sessions.build_session(&app.user_id, &app.language, &mut rand::thread_rng()),
    };

    // JSON output lists the session without running it
    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }

    let mut session = ReviewSession::new();
    session.start(cards);
    if session.is_complete() {
        println!("Nothing to review in {}. Add words or come back later.", app.language);
        return Ok(());
    }

    let total = session.cards().len();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    'cards: while let Some(card) = session.current_card().cloned() {
        let SessionState::InProgress { card_index, .. } = session.state() else {
            break;
        };

        println!();
        println!(
            "{} {}",
            paint(&format!("[{}/{}]", card_index + 1, total), Color::GRAY, use_color),
            paint(
                &direction_hint(&card, &app.language, &app.config.native_language),
                Color::DIM,
                use_color
            )
        );
        println!("{}", paint(card.prompt(), Color::BOLD, use_color));

        match prompt_line(&mut lines, "Press Enter to show the answer (q to quit) ")? {
            Input::Quit => break,
            Input::Line(_) => session.reveal(),
        }

        println!("{}", rule(40));
        println!("{}", paint(card.answer(), Color::CYAN, use_color));

        let previews = sessions.preview_card(&card);
        let choices: Vec<String> = ReviewGrade::ALL
            .iter()
            .zip(previews)
            .map(|(grade, days)| format!("{:?} ({})", grade, format_interval(days)))
            .collect();
        println!("{}", paint(&choices.join("  "), Color::GRAY, use_color));

        loop {
            let line = match prompt_line(&mut lines, "Grade (again/hard/good/easy or 0-5): ")? {
                Input::Quit => break 'cards,
                Input::Line(line) => line,
            };
            let Some(quality) = parse_quality(&line) else {
                println!("Enter again, hard, good, easy, or a number from 0 to 5.");
                continue;
            };

            match sessions.submit_review(&card, quality) {
                Ok(updated) => {
                    println!(
                        "Next review in {} ({})",
                        format_interval(updated.interval_days),
                        updated.status.label()
                    );
                }
                Err(StoreError::NotFound(_)) => {
                    println!("'{}' is no longer tracked, skipping", card.item.word);
                }
                Err(e) => {
                    log::warn!("Review update for {} failed: {}", card.item.id, e);
                    println!("{}", paint("Update failed, try again.", Color::RED, use_color));
                    continue;
                }
            }
            session.record(quality);
            break;
        }
    }

    let summary = session.summary();
    println!();
    println!("{}", rule(40));
    if session.is_complete() {
        println!("Session complete");
    } else {
        println!("Session stopped");
    }
    println!(
        "Reviewed {}: {} correct, {} incorrect",
        summary.total,
        paint(&summary.correct.to_string(), Color::GREEN, use_color),
        paint(&summary.incorrect.to_string(), Color::RED, use_color)
    );

    Ok(())
}
