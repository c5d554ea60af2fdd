//! In-process stores for tests and ephemeral deployments.

use crate::error::StorageError;
use crate::ordering::{self, HistoryCursor};
use crate::profile::{self, ProfileStore};
use crate::store::ObservationStore;
use async_trait::async_trait;
use carewatch_protocol::{
    NewObservation, Observation, ObservationId, Profile, RiskAssessment, SubjectId,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryObservationStore {
    observations: RwLock<Vec<Observation>>,
}

impl MemoryObservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn select(&self, filter: impl Fn(&Observation) -> bool, limit: usize) -> Vec<Observation> {
        let matching = self
            .observations
            .read()
            .iter()
            .filter(|observation| filter(observation))
            .cloned()
            .collect();
        ordering::newest(matching, limit)
    }
}

#[async_trait]
impl ObservationStore for MemoryObservationStore {
    async fn save(&self, observation: NewObservation) -> Result<Observation, StorageError> {
        let stored = observation.into_observation(ObservationId::new(Uuid::new_v4().to_string()));
        self.observations.write().push(stored.clone());
        Ok(stored)
    }

    async fn update_assessment(
        &self,
        id: &ObservationId,
        assessment: RiskAssessment,
    ) -> Result<Observation, StorageError> {
        let mut observations = self.observations.write();
        let observation = observations
            .iter_mut()
            .find(|observation| &observation.id == id)
            .ok_or_else(|| StorageError::NotFound(id.clone()))?;
        observation.assessment = assessment;
        Ok(observation.clone())
    }

    async fn get(&self, id: &ObservationId) -> Result<Option<Observation>, StorageError> {
        Ok(self
            .observations
            .read()
            .iter()
            .find(|observation| &observation.id == id)
            .cloned())
    }

    async fn list_recent(
        &self,
        subject: &SubjectId,
        limit: usize,
    ) -> Result<Vec<Observation>, StorageError> {
        Ok(self.select(|observation| &observation.subject_id == subject, limit))
    }

    async fn list_preceding(
        &self,
        subject: &SubjectId,
        cursor: &HistoryCursor,
        limit: usize,
    ) -> Result<Vec<Observation>, StorageError> {
        Ok(self.select(
            |observation| {
                &observation.subject_id == subject && ordering::precedes(observation, cursor)
            },
            limit,
        ))
    }

    async fn list_pending(&self, limit: usize) -> Result<Vec<Observation>, StorageError> {
        Ok(self.select(|observation| observation.assessment.is_pending(), limit))
    }
}

#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<SubjectId, Profile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get(&self, subject: &SubjectId) -> Result<Option<Profile>, StorageError> {
        Ok(self.profiles.read().get(subject).cloned())
    }

    async fn upsert(&self, profile: Profile) -> Result<Profile, StorageError> {
        let mut profiles = self.profiles.write();
        let existing = profiles.get(&profile.id).cloned();
        let stamped = profile::stamp(profile, existing.as_ref());
        profiles.insert(stamped.id.clone(), stamped.clone());
        Ok(stamped)
    }
}
