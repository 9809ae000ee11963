//! Upload-to-artifact pipeline
//!
//! One linear pass per upload: store the input, extract text, prompt the
//! model, render and store the output, record the job. Every outcome of
//! [`StudyPipeline::process_upload`] is a user-facing status message.
//! The view and download operations read jobs back, scoped to their owner.

use crate::ai::{build_prompt, TextGenerator};
use crate::artifacts::{
    parse_flashcards, parse_mind_map, parse_quiz, strip_code_fences, ArtifactKind, Flashcard,
    MindMapNode, Quiz,
};
use crate::config::StudyConfig;
use crate::error::{RenderError, Result, StudyError};
use crate::extract::{extension_of, extract_text, is_blank};
use crate::jobs::{Job, JobLog, NewJob};
use crate::render::{flashcards_to_pptx, PdfRenderer, PPTX_CONTENT_TYPE};
use crate::storage::{
    content_type_for_key, input_key, key_file_name, output_key, upload_content_type, BlobStore,
    LocalBlobStore,
};
use std::sync::Arc;

pub const MISSING_INPUT_MESSAGE: &str = "Please choose a file and a tool.";
pub const NO_TEXT_MESSAGE: &str = "Could not extract text from file. Please try a different file.";

/// Result of an upload, always carrying a status message
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    pub message: String,
    /// The recorded job, present only on success
    pub job: Option<Job>,
}

impl UploadOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            job: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.job.is_some()
    }
}

/// A stored file ready to hand back to the user
#[derive(Debug, Clone, PartialEq)]
pub struct Download {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Rendered summary or notes
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentView {
    pub title: String,
    pub pdf: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlashcardView {
    pub title: String,
    pub cards: Vec<Flashcard>,
}

/// Quiz or mind map: cleaned JSON as stored, plus the typed record when it parses
#[derive(Debug, Clone, PartialEq)]
pub struct JsonView<T> {
    pub title: String,
    pub json: String,
    pub parsed: Option<T>,
}

pub struct StudyPipeline {
    config: StudyConfig,
    store: Arc<dyn BlobStore>,
    jobs: JobLog,
    generator: Arc<dyn TextGenerator>,
    renderer: PdfRenderer,
}

impl StudyPipeline {
    pub fn new(
        config: StudyConfig,
        store: Arc<dyn BlobStore>,
        jobs: JobLog,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            config,
            store,
            jobs,
            generator,
            renderer: PdfRenderer::new(),
        }
    }

    /// Pipeline over the local blob store and job log under `config.data_dir`
    pub async fn open(config: StudyConfig, generator: Arc<dyn TextGenerator>) -> Result<Self> {
        let store = Arc::new(LocalBlobStore::new(config.blob_dir()));
        let jobs = JobLog::open(config.job_log_path()).await?;
        Ok(Self::new(config, store, jobs, generator))
    }

    pub fn config(&self) -> &StudyConfig {
        &self.config
    }

    pub fn jobs(&self) -> &JobLog {
        &self.jobs
    }

    /// Jobs for the dashboard, newest first
    pub async fn list_jobs(&self, user_id: &str) -> Vec<Job> {
        self.jobs.list_for_user(user_id).await
    }

    /// Turn an uploaded file into the artifact selected by `kind_value`
    pub async fn process_upload(
        &self,
        user_id: &str,
        filename: &str,
        bytes: &[u8],
        kind_value: &str,
    ) -> UploadOutcome {
        let kind = match ArtifactKind::from_form_value(kind_value) {
            Some(kind) if !filename.trim().is_empty() => kind,
            _ => {
                tracing::info!(
                    "[StudyPipeline] Rejected upload: filename={:?} kind={:?}",
                    filename,
                    kind_value
                );
                return UploadOutcome::failed(MISSING_INPUT_MESSAGE);
            }
        };

        let key_in = input_key(user_id, filename);
        if let Err(e) = self
            .store
            .put(&key_in, bytes, &upload_content_type(filename))
            .await
        {
            tracing::error!("[StudyPipeline] Failed to store input {}: {}", key_in, e);
            return UploadOutcome::failed(format!("Could not store upload: {}", e));
        }

        let text = self.extract(bytes, &extension_of(filename)).await;
        if is_blank(&text) {
            return UploadOutcome::failed(NO_TEXT_MESSAGE);
        }

        let title = kind.title();
        let prompt = build_prompt(kind, &text, self.config.prompt_char_limit);

        tracing::info!(
            "[StudyPipeline] Generating {} for {} ({} chars, model {})",
            title,
            filename,
            text.chars().count(),
            self.config.model
        );

        let result = match self.generator.generate(&self.config.model, &prompt).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("[StudyPipeline] Generation failed: {}", e);
                return UploadOutcome::failed(format!("AI generation failed: {}", e));
            }
        };

        let format = kind.output_format();
        let key_out = output_key(user_id, title, filename, format.extension());

        if let Err(e) = self.store_output(kind, &result, &key_out).await {
            tracing::error!("[StudyPipeline] Failed to save {}: {}", key_out, e);
            return UploadOutcome::failed(format!("Could not save {}: {}", title, e));
        }

        let new_job = NewJob {
            user_id: user_id.to_string(),
            title: title.to_string(),
            input_key: key_in,
            output_key: key_out,
            kind,
        };

        match self.jobs.append(new_job).await {
            Ok(job) => UploadOutcome {
                message: format!("{} ready!", title),
                job: Some(job),
            },
            Err(e) => {
                tracing::error!("[StudyPipeline] Failed to record job: {}", e);
                UploadOutcome::failed(format!("Could not record job: {}", e))
            }
        }
    }

    /// Extraction is CPU-bound; a failed task counts as no text
    async fn extract(&self, bytes: &[u8], extension: &str) -> String {
        let bytes = bytes.to_vec();
        let extension = extension.to_string();
        match tokio::task::spawn_blocking(move || extract_text(&bytes, &extension)).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("[StudyPipeline] Extraction task failed: {}", e);
                String::new()
            }
        }
    }

    async fn store_output(&self, kind: ArtifactKind, result: &str, key: &str) -> Result<()> {
        let format = kind.output_format();

        let bytes = if kind.is_document() {
            self.renderer
                .render_document_async(result.to_string(), kind.title().to_string())
                .await?
        } else {
            if kind == ArtifactKind::Mcq {
                log_quiz_issues(result);
            }
            result.as_bytes().to_vec()
        };

        self.store.put(key, &bytes, format.content_type()).await?;
        Ok(())
    }

    async fn owned_job(&self, job_id: u64, user_id: &str) -> Result<Job> {
        self.jobs
            .get_for_user(job_id, user_id)
            .await
            .ok_or(StudyError::JobNotFound(job_id))
    }

    async fn job_of_kind(
        &self,
        job_id: u64,
        user_id: &str,
        allowed: &[ArtifactKind],
        expected: &'static str,
    ) -> Result<Job> {
        let job = self.owned_job(job_id, user_id).await?;
        if !allowed.contains(&job.kind) {
            return Err(StudyError::WrongKind {
                id: job_id,
                expected,
                actual: job.kind.as_str(),
            });
        }
        Ok(job)
    }

    async fn output_text(&self, job: &Job) -> Result<String> {
        let bytes = self.store.get(&job.output_key).await?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Stored output as an attachment
    pub async fn download(&self, job_id: u64, user_id: &str) -> Result<Download> {
        let job = self.owned_job(job_id, user_id).await?;
        let bytes = self.store.get(&job.output_key).await?;
        Ok(Download {
            file_name: key_file_name(&job.output_key).to_string(),
            content_type: content_type_for_key(&job.output_key).to_string(),
            bytes,
        })
    }

    /// PDF of a summary or notes job
    pub async fn view_document(&self, job_id: u64, user_id: &str) -> Result<DocumentView> {
        let job = self
            .job_of_kind(
                job_id,
                user_id,
                &[ArtifactKind::Summarize, ArtifactKind::Notes],
                "document",
            )
            .await?;
        let pdf = self.store.get(&job.output_key).await?;
        Ok(DocumentView {
            title: job.title,
            pdf,
        })
    }

    pub async fn view_flashcards(&self, job_id: u64, user_id: &str) -> Result<FlashcardView> {
        let job = self
            .job_of_kind(job_id, user_id, &[ArtifactKind::Flashcards], "flashcards")
            .await?;
        let cards = parse_flashcards(&self.output_text(&job).await?);
        Ok(FlashcardView {
            title: job.title,
            cards,
        })
    }

    pub async fn view_quiz(&self, job_id: u64, user_id: &str) -> Result<JsonView<Quiz>> {
        let job = self
            .job_of_kind(job_id, user_id, &[ArtifactKind::Mcq], "mcq")
            .await?;
        let json = strip_code_fences(&self.output_text(&job).await?);
        let parsed = parse_quiz(&json)
            .map_err(|e| tracing::warn!("[StudyPipeline] Quiz {} does not parse: {}", job_id, e))
            .ok();
        Ok(JsonView {
            title: job.title,
            json,
            parsed,
        })
    }

    pub async fn view_mind_map(&self, job_id: u64, user_id: &str) -> Result<JsonView<MindMapNode>> {
        let job = self
            .job_of_kind(job_id, user_id, &[ArtifactKind::Mindmap], "mindmap")
            .await?;
        let json = strip_code_fences(&self.output_text(&job).await?);
        let parsed = parse_mind_map(&json)
            .map_err(|e| {
                tracing::warn!("[StudyPipeline] Mind map {} does not parse: {}", job_id, e)
            })
            .ok();
        Ok(JsonView {
            title: job.title,
            json,
            parsed,
        })
    }

    /// Flashcards as a two-slides-per-card presentation
    pub async fn export_flashcards_pptx(&self, job_id: u64, user_id: &str) -> Result<Download> {
        let view = self.view_flashcards(job_id, user_id).await?;
        let file_name = format!("{}_flashcards.pptx", view.title);

        let FlashcardView { title, cards } = view;
        let bytes = tokio::task::spawn_blocking(move || flashcards_to_pptx(&cards, &title))
            .await
            .map_err(|e| RenderError::Task(e.to_string()))??;

        Ok(Download {
            file_name,
            content_type: PPTX_CONTENT_TYPE.to_string(),
            bytes,
        })
    }
}

/// Quiz structure is never enforced; problems are only logged
fn log_quiz_issues(result: &str) {
    match parse_quiz(result) {
        Ok(quiz) => {
            for issue in quiz.validate() {
                tracing::warn!("[StudyPipeline] Quiz issue: {}", issue);
            }
        }
        Err(e) => tracing::warn!("[StudyPipeline] Quiz output is not valid JSON: {}", e),
    }
}
