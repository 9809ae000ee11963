//! Runtime configuration
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file. Every field has a default so the CLI works with no setup.

use std::path::PathBuf;

/// Default model identifier passed to the generator
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Maximum number of document characters sent to the model
pub const DEFAULT_PROMPT_CHAR_LIMIT: usize = 20_000;

/// Configuration for the study pipeline
#[derive(Debug, Clone)]
pub struct StudyConfig {
    /// Root directory for stored blobs and the job log
    pub data_dir: PathBuf,

    /// Model to request from the generator
    pub model: String,

    /// Document text beyond this many characters is dropped from prompts
    pub prompt_char_limit: usize,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            model: DEFAULT_MODEL.to_string(),
            prompt_char_limit: DEFAULT_PROMPT_CHAR_LIMIT,
        }
    }
}

impl StudyConfig {
    /// Build a config from `STUDYMATE_*` environment variables
    pub fn from_env() -> Self {
        load_dotenv();

        let mut config = Self::default();

        if let Ok(dir) = std::env::var("STUDYMATE_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }

        if let Ok(model) = std::env::var("STUDYMATE_MODEL") {
            if !model.trim().is_empty() {
                config.model = model;
            }
        }

        if let Ok(limit) = std::env::var("STUDYMATE_PROMPT_LIMIT") {
            match limit.trim().parse::<usize>() {
                Ok(value) if value > 0 => config.prompt_char_limit = value,
                _ => tracing::warn!(
                    "[StudyConfig] Ignoring invalid STUDYMATE_PROMPT_LIMIT={:?}, using {}",
                    limit,
                    config.prompt_char_limit
                ),
            }
        }

        tracing::debug!(
            "[StudyConfig] data_dir={} model={} prompt_char_limit={}",
            config.data_dir.display(),
            config.model,
            config.prompt_char_limit
        );

        config
    }

    /// Config rooted at an explicit directory (tests, CLI overrides)
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn blob_dir(&self) -> PathBuf {
        self.data_dir.join("blobs")
    }

    pub fn job_log_path(&self) -> PathBuf {
        self.data_dir.join("jobs.jsonl")
    }
}

/// Load a `.env` file from the working directory, falling back to its parent
pub fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path("../.env");
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("studymate")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StudyConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.prompt_char_limit, 20_000);
        assert!(config.data_dir.ends_with("studymate"));
    }

    #[test]
    fn test_paths_derive_from_data_dir() {
        let config = StudyConfig::with_data_dir("/tmp/sm");
        assert_eq!(config.blob_dir(), PathBuf::from("/tmp/sm/blobs"));
        assert_eq!(config.job_log_path(), PathBuf::from("/tmp/sm/jobs.jsonl"));
    }
}
