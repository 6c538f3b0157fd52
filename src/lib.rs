pub mod clock;
pub mod config;
pub mod srs;
pub mod vocabulary;

use std::path::Path;

use config::{LexisConfig, StoreBackend};
use vocabulary::{FileVocabularyStore, SqliteVocabularyStore, StoreError, VocabularyStore};

/// File name of the SQLite database inside the data directory
pub const SQLITE_FILE_NAME: &str = "lexis.db";

/// Open the item store selected by the config
pub fn open_store(
    data_dir: &Path,
    config: &LexisConfig,
) -> Result<Box<dyn VocabularyStore>, StoreError> {
    let store: Box<dyn VocabularyStore> = match config.backend {
        StoreBackend::Json => {
            let store = FileVocabularyStore::new(data_dir);
            store.init()?;
            Box::new(store)
        }
        StoreBackend::Sqlite => Box::new(SqliteVocabularyStore::open(&data_dir.join(SQLITE_FILE_NAME))?),
    };
    log::debug!("Opened {:?} store in {}", config.backend, data_dir.display());
    Ok(store)
}
