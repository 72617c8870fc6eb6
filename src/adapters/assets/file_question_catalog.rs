//! File-based Question Catalog Adapter
//!
//! Reads `question_mapping.json` once at startup and loads the mapped
//! question file from `questions/` on every lookup.
//!
//! ```text
//! assets/
//! ├── question_mapping.json      {"0": "q0.json", ...}
//! └── questions/
//!     └── q0.json                {"question": "...", "choices": [...]}
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::question::QuestionRecord;
use crate::ports::{CatalogError, QuestionCatalog};

/// Mapping file name inside the assets directory.
pub const QUESTION_MAPPING_FILE: &str = "question_mapping.json";

/// Directory holding question files inside the assets directory.
pub const QUESTIONS_DIR: &str = "questions";

/// Question catalog backed by JSON files on disk.
#[derive(Debug, Clone)]
pub struct FileQuestionCatalog {
    questions_dir: PathBuf,
    mapping: HashMap<String, String>,
}

impl FileQuestionCatalog {
    /// Loads the identifier to filename mapping from `assets_dir`.
    ///
    /// # Errors
    ///
    /// - `AssetUnavailable` if the mapping file cannot be read
    /// - `Malformed` if it is not a JSON object of strings
    pub async fn load(assets_dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let assets_dir = assets_dir.as_ref();
        let mapping_path = assets_dir.join(QUESTION_MAPPING_FILE);
        let mapping = read_json::<HashMap<String, String>>(&mapping_path).await?;

        tracing::info!(
            path = %mapping_path.display(),
            questions = mapping.len(),
            "Loaded question mapping"
        );

        Ok(Self {
            questions_dir: assets_dir.join(QUESTIONS_DIR),
            mapping,
        })
    }

    /// Number of mapped question identifiers.
    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

#[async_trait]
impl QuestionCatalog for FileQuestionCatalog {
    async fn question(&self, question_id: &str) -> Result<QuestionRecord, CatalogError> {
        let file_name = self
            .mapping
            .get(question_id)
            .ok_or_else(|| CatalogError::UnknownQuestion(question_id.to_string()))?;

        let path = self.questions_dir.join(file_name);
        tracing::debug!(question_id, path = %path.display(), "Loading question");
        read_json(&path).await
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| CatalogError::AssetUnavailable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    serde_json::from_str(&content).map_err(|e| CatalogError::Malformed {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
