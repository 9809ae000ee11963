//! Study artifact generation from uploaded course documents.
//!
//! An upload flows through [`extract`] (document text), [`ai`] (prompt and
//! model call), [`artifacts`] (parsing model output) and [`render`] (PDF,
//! PPTX, JSON), with [`storage`] and [`jobs`] persisting inputs, outputs and
//! the per-user job history. [`pipeline::StudyPipeline`] ties them together.

pub mod ai;
pub mod artifacts;
pub mod config;
pub mod error;
pub mod extract;
pub mod jobs;
pub mod pipeline;
pub mod render;
pub mod storage;

pub use config::StudyConfig;
pub use error::{Result, StudyError};
pub use pipeline::{StudyPipeline, UploadOutcome};
