//! Observation store abstraction.

use crate::error::StorageError;
use crate::ordering::HistoryCursor;
use async_trait::async_trait;
use carewatch_protocol::{NewObservation, Observation, ObservationId, RiskAssessment, SubjectId};

/// Persistence for check-in observations.
///
/// Every write is atomic per document, and readers never see a partially
/// written observation. Listings are ordered newest first by
/// (date, created_at, id).
#[async_trait]
pub trait ObservationStore: Send + Sync {
    /// Persist a new observation and assign its identity.
    async fn save(&self, observation: NewObservation) -> Result<Observation, StorageError>;

    /// Replace the assessment of an existing observation.
    async fn update_assessment(
        &self,
        id: &ObservationId,
        assessment: RiskAssessment,
    ) -> Result<Observation, StorageError>;

    /// Fetch one observation; unknown or malformed ids yield `None`.
    async fn get(&self, id: &ObservationId) -> Result<Option<Observation>, StorageError>;

    /// Most recent observations for a subject, at most `limit`.
    async fn list_recent(
        &self,
        subject: &SubjectId,
        limit: usize,
    ) -> Result<Vec<Observation>, StorageError>;

    /// Most recent observations for a subject that sort strictly before `cursor`.
    async fn list_preceding(
        &self,
        subject: &SubjectId,
        cursor: &HistoryCursor,
        limit: usize,
    ) -> Result<Vec<Observation>, StorageError>;

    /// Observations across all subjects whose assessment is still pending.
    async fn list_pending(&self, limit: usize) -> Result<Vec<Observation>, StorageError>;
}
