//! Chat log and transcript archive configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

use super::error::ValidationError;

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSONL chat log per session
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Azure Blob Storage connection string; local archive when unset
    pub archive_connection_string: Option<Secret<String>>,

    /// Blob container for transcripts
    #[serde(default = "default_container")]
    pub archive_container: String,

    /// Directory of the local archive
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,

    /// Blob upload timeout in seconds
    #[serde(default = "default_archive_timeout")]
    pub archive_timeout_secs: u64,
}

impl StorageConfig {
    /// Returns the blob connection string when one is configured.
    pub fn blob_connection_string(&self) -> Option<&str> {
        self.archive_connection_string
            .as_ref()
            .map(|s| s.expose_secret().as_str())
            .filter(|s| !s.trim().is_empty())
    }

    /// Validate storage configuration
    ///
    /// Container names follow the blob service rules: 3-63 lowercase
    /// letters, digits and single hyphens, starting with a letter or digit.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.blob_connection_string().is_some() && !is_valid_container(&self.archive_container)
        {
            return Err(ValidationError::InvalidContainerName(
                self.archive_container.clone(),
            ));
        }
        if self.blob_connection_string().is_none() && same_dir(&self.log_dir, &self.archive_dir) {
            return Err(ValidationError::ArchiveDirConflict(
                self.archive_dir.display().to_string(),
            ));
        }
        if self.archive_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

/// Both adapters name files `<session>.jsonl`, so a shared directory would
/// let an archive upload replace the chat log.
fn same_dir(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => lexical(a) == lexical(b),
    }
}

fn lexical(path: &Path) -> Vec<Component<'_>> {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn is_valid_container(name: &str) -> bool {
    (3..=63).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-')
        && !name.contains("--")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            archive_connection_string: None,
            archive_container: default_container(),
            archive_dir: default_archive_dir(),
            archive_timeout_secs: default_archive_timeout(),
        }
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("./logs")
}

fn default_container() -> String {
    "transcripts".to_string()
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("./archive")
}

fn default_archive_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_defaults() {
        let config = StorageConfig::default();
        assert_eq!(config.log_dir, PathBuf::from("./logs"));
        assert_eq!(config.archive_dir, PathBuf::from("./archive"));
        assert!(config.blob_connection_string().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_connection_string_means_local() {
        let config = StorageConfig {
            archive_connection_string: Some(Secret::new("  ".to_string())),
            ..Default::default()
        };
        assert!(config.blob_connection_string().is_none());
    }

    #[test]
    fn test_container_name_rules() {
        assert!(is_valid_container("transcripts"));
        assert!(is_valid_container("survey-2024"));
        assert!(!is_valid_container("ab"));
        assert!(!is_valid_container("Transcripts"));
        assert!(!is_valid_container("-transcripts"));
        assert!(!is_valid_container("a--b"));
    }

    #[test]
    fn test_shared_log_and_archive_dir_rejected() {
        let config = StorageConfig {
            log_dir: PathBuf::from("./data"),
            archive_dir: PathBuf::from("data"),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::ArchiveDirConflict(_))
        ));
    }

    #[test]
    fn test_shared_existing_dir_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            log_dir: tmp.path().to_path_buf(),
            archive_dir: tmp.path().join("."),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::ArchiveDirConflict(_))
        ));
    }

    #[test]
    fn test_shared_dir_allowed_with_blob_storage() {
        let config = StorageConfig {
            archive_connection_string: Some(Secret::new(
                "AccountName=acct;AccountKey=a2V5".to_string(),
            )),
            log_dir: PathBuf::from("./data"),
            archive_dir: PathBuf::from("./data"),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_container_rejected_with_blob_storage() {
        let config = StorageConfig {
            archive_connection_string: Some(Secret::new(
                "AccountName=acct;AccountKey=a2V5".to_string(),
            )),
            archive_container: "Bad_Name".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidContainerName(_))
        ));
    }
}
