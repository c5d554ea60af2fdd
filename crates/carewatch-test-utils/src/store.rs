use async_trait::async_trait;
use carewatch_protocol::{NewObservation, Observation, ObservationId, RiskAssessment, SubjectId};
use carewatch_store::{HistoryCursor, MemoryObservationStore, ObservationStore, StorageError};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Store operation a [`FlakyStore`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreFault {
    Save,
    Update,
    /// `get`, `list_recent` and `list_pending`.
    Read,
    /// `list_preceding`, used by the history window.
    History,
}

/// In-memory observation store with injectable failures.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryObservationStore,
    remaining: Mutex<HashMap<StoreFault, usize>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `times` calls of `fault`.
    pub fn fail(&self, fault: StoreFault, times: usize) -> &Self {
        self.remaining.lock().insert(fault, times);
        self
    }

    pub fn fail_always(&self, fault: StoreFault) -> &Self {
        self.fail(fault, usize::MAX)
    }

    pub fn heal(&self) {
        self.remaining.lock().clear();
    }

    /// The wrapped store, for seeding and inspection without faults.
    pub fn inner(&self) -> &MemoryObservationStore {
        &self.inner
    }

    fn check(&self, fault: StoreFault) -> Result<(), StorageError> {
        let mut remaining = self.remaining.lock();
        match remaining.get_mut(&fault) {
            Some(count) if *count > 0 => {
                if *count != usize::MAX {
                    *count -= 1;
                }
                Err(StorageError::Unavailable(format!(
                    "injected {fault:?} failure"
                )))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ObservationStore for FlakyStore {
    async fn save(&self, observation: NewObservation) -> Result<Observation, StorageError> {
        self.check(StoreFault::Save)?;
        self.inner.save(observation).await
    }

    async fn update_assessment(
        &self,
        id: &ObservationId,
        assessment: RiskAssessment,
    ) -> Result<Observation, StorageError> {
        self.check(StoreFault::Update)?;
        self.inner.update_assessment(id, assessment).await
    }

    async fn get(&self, id: &ObservationId) -> Result<Option<Observation>, StorageError> {
        self.check(StoreFault::Read)?;
        self.inner.get(id).await
    }

    async fn list_recent(
        &self,
        subject: &SubjectId,
        limit: usize,
    ) -> Result<Vec<Observation>, StorageError> {
        self.check(StoreFault::Read)?;
        self.inner.list_recent(subject, limit).await
    }

    async fn list_preceding(
        &self,
        subject: &SubjectId,
        cursor: &HistoryCursor,
        limit: usize,
    ) -> Result<Vec<Observation>, StorageError> {
        self.check(StoreFault::History)?;
        self.inner.list_preceding(subject, cursor, limit).await
    }

    async fn list_pending(&self, limit: usize) -> Result<Vec<Observation>, StorageError> {
        self.check(StoreFault::Read)?;
        self.inner.list_pending(limit).await
    }
}
