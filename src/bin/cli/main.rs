mod app;
mod commands;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "lexis-cli", about = "Lexis vocabulary review from the terminal", version)]
struct Cli {
    /// Data directory (default: platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// User the vocabulary belongs to
    #[arg(long, global = true, default_value = "local")]
    user: String,

    /// Language code being learned (e.g. "es")
    #[arg(long, short, global = true)]
    language: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Start tracking a word
    Add {
        word: String,
        #[arg(long)]
        translation: Option<String>,
        #[arg(long)]
        definition: Option<String>,
        /// Example sentence the word appeared in
        #[arg(long)]
        example: Option<String>,
        /// Translation of the example sentence
        #[arg(long, requires = "example")]
        example_translation: Option<String>,
        /// Lesson the word was saved from
        #[arg(long)]
        lesson: Option<String>,
    },

    /// List tracked words
    List {
        /// Only words with this status (-1..5 or a name like "new")
        #[arg(long, allow_hyphen_values = true)]
        status: Option<String>,
    },

    /// Set the learning status of a word
    Status {
        word: String,
        /// -1..5 or ignored/known/new/learning1/learning2/learning3/mastered
        #[arg(allow_hyphen_values = true)]
        status: String,
    },

    /// Mark words as known, adding any that are not tracked yet
    Known {
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Ignore a word
    Ignore { word: String },

    /// Show words due for review
    Due,

    /// Run an interactive review session
    Review {
        /// Seed for card order
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show vocabulary and review statistics
    Stats,

    /// Delete all vocabulary and review history for the language
    Reset {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && atty_check();
    let app = app::App::new(cli.data_dir, &cli.user, cli.language.as_deref())?;

    match cli.command {
        Command::Add {
            word,
            translation,
            definition,
            example,
            example_translation,
            lesson,
        } => {
            let content = commands::add::content(translation, definition, example, example_translation, lesson);
            commands::add::run(&app, &word, content, &cli.format, use_color)?;
        }
        Command::List { status } => {
            commands::list::run(&app, status.as_deref(), &cli.format, use_color)?;
        }
        Command::Status { word, status } => {
            commands::status::run_set(&app, &word, &status, &cli.format)?;
        }
        Command::Known { words } => {
            commands::status::run_known(&app, &words, &cli.format)?;
        }
        Command::Ignore { word } => {
            commands::status::run_ignore(&app, &word, &cli.format)?;
        }
        Command::Due => {
            commands::due::run(&app, &cli.format, use_color)?;
        }
        Command::Review { seed } => {
            commands::review::run(&app, seed, &cli.format, use_color)?;
        }
        Command::Stats => {
            commands::stats::run(&app, &cli.format)?;
        }
        Command::Reset { yes } => {
            commands::reset::run(&app, yes, &cli.format)?;
        }
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    use std::io::IsTerminal;
    std::io::stdout().is_terminal()
}
