use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use lexis_lib::clock::SystemClock;
use lexis_lib::config::LexisConfig;
use lexis_lib::srs::SessionBuilder;
use lexis_lib::vocabulary::{VocabularyItem, VocabularyService, VocabularyStore};

/// Shared application state for CLI commands
pub struct App {
    pub config: LexisConfig,
    pub store: Box<dyn VocabularyStore>,
    pub clock: SystemClock,
    pub user_id: String,
    pub language: String,
}

impl App {
    /// Initialize from the given or default data directory
    pub fn new(data_dir: Option<PathBuf>, user_id: &str, language: Option<&str>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => LexisConfig::default_data_dir().context("Failed to get data directory")?,
        };

        let language = match language.map(str::trim) {
            Some(code) if !code.is_empty() => code.to_lowercase(),
            _ => bail!("No language given. Pass --language <code>, e.g. --language es"),
        };
        if user_id.trim().is_empty() {
            bail!("User id must not be empty");
        }

        let config = LexisConfig::load(&data_dir)
            .with_context(|| format!("Failed to load config from {}", data_dir.display()))?;
        let store = lexis_lib::open_store(&data_dir, &config)
            .with_context(|| format!("Failed to open vocabulary store in {}", data_dir.display()))?;

        Ok(Self {
            config,
            store,
            clock: SystemClock,
            user_id: user_id.trim().to_string(),
            language,
        })
    }

    /// Word operations for the active user and language
    pub fn vocabulary(&self) -> Result<VocabularyService<'_, dyn VocabularyStore, SystemClock>> {
        let service = VocabularyService::open(self.store.as_ref(), &self.clock, &self.user_id, &self.language)
            .context("Failed to load vocabulary")?;
        Ok(service.with_new_word_ease(self.config.new_word_ease_factor))
    }

    pub fn sessions(&self) -> SessionBuilder<'_, dyn VocabularyStore, SystemClock> {
        SessionBuilder::new(self.store.as_ref(), &self.clock).with_session_cap(self.config.session_cap)
    }

    /// Find a tracked word, listing close matches when there is none
    pub fn find_word(&self, word: &str) -> Result<VocabularyItem> {
        let vocabulary = self.vocabulary()?;
        if let Some(item) = vocabulary.find_word(word) {
            return Ok(item.clone());
        }

        let needle = word.trim().to_lowercase();
        let similar: Vec<&str> = vocabulary
            .items()
            .iter()
            .filter(|item| !needle.is_empty() && item.word.starts_with(&needle))
            .map(|item| item.word.as_str())
            .take(10)
            .collect();

        if similar.is_empty() {
            bail!("'{}' is not tracked in {}", word, self.language);
        }
        bail!(
            "'{}' is not tracked in {}. Similar words:\n{}",
            word,
            self.language,
            similar.iter().map(|w| format!("  - {}", w)).collect::<Vec<_>>().join("\n")
        )
    }
}
