//! Loads the bounded window of prior observations for a new check-in.

use crate::retry::RetryPolicy;
use carewatch_protocol::Observation;
use carewatch_store::{HistoryCursor, ObservationStore, StorageError};
use log::debug;
use std::sync::Arc;

/// Reads the most recent prior observations of the same subject.
#[derive(Clone)]
pub struct HistoryWindowLoader {
    store: Arc<dyn ObservationStore>,
    window: usize,
    retry: RetryPolicy,
}

impl HistoryWindowLoader {
    pub fn new(store: Arc<dyn ObservationStore>, window: usize) -> Self {
        Self {
            store,
            window,
            retry: RetryPolicy::storage_reads(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Up to `window` observations strictly preceding `observation`, newest first.
    ///
    /// An empty result is valid for a first-time subject.
    pub async fn load_window(
        &self,
        observation: &Observation,
    ) -> Result<Vec<Observation>, StorageError> {
        let cursor = HistoryCursor::of(observation);
        let history = self
            .retry
            .run("history window read", || {
                self.store
                    .list_preceding(&observation.subject_id, &cursor, self.window)
            })
            .await?;
        debug!(
            "loaded history window (observation_id={}, subject={}, entries={})",
            observation.id,
            observation.subject_id,
            history.len()
        );
        Ok(history)
    }
}
