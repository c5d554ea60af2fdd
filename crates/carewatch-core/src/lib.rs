//! Check-in pipeline for Carewatch.
//!
//! This crate owns validation, the history window loader, the risk
//! assessment engine with its deterministic fallback, and the orchestrator
//! that ties them to the stores.

pub mod engine;
pub mod error;
pub mod history;
pub mod orchestrator;
pub mod retry;
pub mod validation;

pub use engine::provider::ReasoningProvider;
pub use engine::{AssessmentRequest, RiskAssessmentEngine};
/// Error types surfaced by the pipeline.
pub use error::{CheckinError, ProviderError, ValidationError};
pub use history::HistoryWindowLoader;
pub use orchestrator::{CheckinService, SubmissionContext};
pub use retry::{RetryPolicy, Retryable};
