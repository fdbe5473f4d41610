//! Best score persistence
//!
//! A single integer survives between runs. Persisted to LocalStorage on the
//! web and to a small JSON file on native.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from a best-score store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored best score is corrupt: {0}")]
    Corrupt(String),

    #[error("storage is unavailable")]
    Unavailable,
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Corrupt(e.to_string())
    }
}

/// Persisted record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BestScore {
    pub best_score: u32,
}

impl BestScore {
    /// Raise the best if `score` beats it. Returns true when it changed.
    pub fn record(&mut self, score: u32) -> bool {
        if score > self.best_score {
            self.best_score = score;
            true
        } else {
            false
        }
    }
}

/// Where the best score lives between runs
pub trait ScoreStore {
    fn load_best(&self) -> Result<u32, StoreError>;
    fn save_best(&mut self, best: u32) -> Result<(), StoreError>;
}

/// In-process store (tests, headless runs)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    best: u32,
    /// Number of successful saves
    pub saves: u32,
}

impl MemoryStore {
    pub fn with_best(best: u32) -> Self {
        Self { best, saves: 0 }
    }

    pub fn best(&self) -> u32 {
        self.best
    }
}

impl ScoreStore for MemoryStore {
    fn load_best(&self) -> Result<u32, StoreError> {
        Ok(self.best)
    }

    fn save_best(&mut self, best: u32) -> Result<(), StoreError> {
        self.best = best;
        self.saves += 1;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::JsonFileStore;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};

    use super::{BestScore, ScoreStore, StoreError};

    /// Best score as a JSON file
    #[derive(Debug, Clone)]
    pub struct JsonFileStore {
        path: PathBuf,
    }

    impl JsonFileStore {
        const FILE_NAME: &'static str = "best_score.json";

        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        /// `<data dir>/pipe-runner/best_score.json`
        pub fn default_location() -> Result<Self, StoreError> {
            let dir = dirs::data_dir().ok_or(StoreError::Unavailable)?;
            Ok(Self::new(dir.join("pipe-runner").join(Self::FILE_NAME)))
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl ScoreStore for JsonFileStore {
        fn load_best(&self) -> Result<u32, StoreError> {
            if !self.path.exists() {
                log::info!("No best score at {}, starting fresh", self.path.display());
                return Ok(0);
            }
            let json = std::fs::read_to_string(&self.path)?;
            let record: BestScore = serde_json::from_str(&json)?;
            log::info!("Loaded best score {}", record.best_score);
            Ok(record.best_score)
        }

        fn save_best(&mut self, best: u32) -> Result<(), StoreError> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string(&BestScore { best_score: best })?;
            std::fs::write(&self.path, json)?;
            log::info!("Best score {} saved to {}", best, self.path.display());
            Ok(())
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorageStore;

#[cfg(target_arch = "wasm32")]
mod web {
    use super::{ScoreStore, StoreError};

    /// Best score under the `bestScore` LocalStorage key
    #[derive(Debug, Clone, Default)]
    pub struct LocalStorageStore;

    impl LocalStorageStore {
        const STORAGE_KEY: &'static str = "bestScore";

        fn storage() -> Result<web_sys::Storage, StoreError> {
            web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten()
                .ok_or(StoreError::Unavailable)
        }
    }

    impl ScoreStore for LocalStorageStore {
        fn load_best(&self) -> Result<u32, StoreError> {
            let storage = Self::storage()?;
            match storage.get_item(Self::STORAGE_KEY) {
                Ok(Some(value)) => value
                    .trim()
                    .parse()
                    .map_err(|_| StoreError::Corrupt(value.clone())),
                Ok(None) => Ok(0),
                Err(_) => Err(StoreError::Unavailable),
            }
        }

        fn save_best(&mut self, best: u32) -> Result<(), StoreError> {
            let storage = Self::storage()?;
            storage
                .set_item(Self::STORAGE_KEY, &best.to_string())
                .map_err(|_| StoreError::Unavailable)?;
            log::info!("Best score {} saved", best);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_only_raises() {
        let mut best = BestScore { best_score: 3 };
        assert!(best.record(7));
        assert_eq!(best.best_score, 7);
        assert!(!best.record(2));
        assert!(!best.record(7));
        assert_eq!(best.best_score, 7);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::with_best(4);
        assert_eq!(store.load_best().unwrap(), 4);
        store.save_best(9).unwrap();
        assert_eq!(store.load_best().unwrap(), 9);
        assert_eq!(store.saves, 1);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_json_file_store() {
        let dir = std::env::temp_dir().join(format!("pipe-runner-test-{}", std::process::id()));
        let mut store = JsonFileStore::new(dir.join("best_score.json"));
        assert_eq!(store.load_best().unwrap(), 0);

        store.save_best(12).unwrap();
        assert_eq!(store.load_best().unwrap(), 12);

        std::fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.load_best(), Err(StoreError::Corrupt(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
