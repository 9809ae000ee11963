use crate::artifacts::ArtifactKind;
use crate::error::{Result, StudyError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Display name used when a job's input key has no file segment
pub const UNKNOWN_FILE: &str = "Unknown File";

/// One upload-to-artifact generation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Auto-incremented identifier, unique within a log
    pub id: u64,
    pub user_id: String,
    /// Artifact title, e.g. "Summary"
    pub title: String,
    pub input_key: String,
    pub output_key: String,
    pub kind: ArtifactKind,
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Uploaded file name, taken from the last segment of the input key
    pub fn original_filename(&self) -> &str {
        match self.input_key.rsplit('/').next() {
            Some(name) if !name.is_empty() => name,
            _ => UNKNOWN_FILE,
        }
    }
}

/// Fields supplied by the caller when recording a job
#[derive(Debug, Clone)]
pub struct NewJob {
    pub user_id: String,
    pub title: String,
    pub input_key: String,
    pub output_key: String,
    pub kind: ArtifactKind,
}

/// Append-only job table persisted as JSON lines
pub struct JobLog {
    path: PathBuf,
    jobs: Mutex<Vec<Job>>,
}

impl JobLog {
    /// Open a log file, loading existing entries. A missing file is an empty log.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let jobs = match tokio::fs::read_to_string(&path).await {
            Ok(content) => parse_lines(&path, &content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(StudyError::JobLog(format!(
                    "Failed to read job log {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        tracing::info!(
            "[JobLog] Opened {} ({} jobs)",
            path.display(),
            jobs.len()
        );

        Ok(Self {
            path,
            jobs: Mutex::new(jobs),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a job, assigning the next id
    pub async fn append(&self, new_job: NewJob) -> Result<Job> {
        let mut jobs = self.jobs.lock().await;

        let id = jobs.iter().map(|job| job.id).max().unwrap_or(0) + 1;
        let job = Job {
            id,
            user_id: new_job.user_id,
            title: new_job.title,
            input_key: new_job.input_key,
            output_key: new_job.output_key,
            kind: new_job.kind,
            created_at: Utc::now(),
        };

        let mut line = serde_json::to_string(&job)
            .map_err(|e| StudyError::JobLog(format!("Failed to serialize job: {}", e)))?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StudyError::JobLog(format!("Failed to create log directory: {}", e)))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StudyError::JobLog(format!("Failed to open job log: {}", e)))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| StudyError::JobLog(format!("Failed to write job log: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| StudyError::JobLog(format!("Failed to flush job log: {}", e)))?;

        tracing::info!(
            "[JobLog] Recorded job {} ({}) for user {}",
            job.id,
            job.kind,
            job.user_id
        );

        jobs.push(job.clone());
        Ok(job)
    }

    /// Look up a job owned by `user_id`; other users' jobs are invisible
    pub async fn get_for_user(&self, id: u64, user_id: &str) -> Option<Job> {
        self.jobs
            .lock()
            .await
            .iter()
            .find(|job| job.id == id && job.user_id == user_id)
            .cloned()
    }

    /// All jobs for a user, newest first
    pub async fn list_for_user(&self, user_id: &str) -> Vec<Job> {
        let mut jobs: Vec<Job> = self
            .jobs
            .lock()
            .await
            .iter()
            .filter(|job| job.user_id == user_id)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.id.cmp(&a.id));
        jobs
    }
}

/// Parse log lines, skipping entries that fail to decode
fn parse_lines(path: &Path, content: &str) -> Vec<Job> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| match serde_json::from_str::<Job>(line) {
            Ok(job) => Some(job),
            Err(e) => {
                tracing::warn!(
                    "[JobLog] Skipping malformed entry at {}:{}: {}",
                    path.display(),
                    index + 1,
                    e
                );
                None
            }
        })
        .collect()
}
