//! Check-in orchestration.
//!
//! A submission is validated, saved with a pending assessment, enriched from
//! its history window, and saved again exactly once with the final
//! assessment. Provider trouble never fails a submission; only validation and
//! storage failures reach the caller.

use crate::engine::{AssessmentRequest, RiskAssessmentEngine};
use crate::error::{CheckinError, truncate_message};
use crate::history::HistoryWindowLoader;
use crate::retry::RetryPolicy;
use crate::validation;
use autoagents_llm::LLMProvider;
use carewatch_config::{CarewatchConfig, CheckinsConfig};
use carewatch_protocol::{
    CheckinInput, Observation, ObservationId, Profile, ProfileInput, RiskAssessment, SubjectId,
};
use carewatch_store::{ObservationStore, ProfileStore};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::sync::Arc;

/// Per-submission context threaded through the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionContext {
    pub received_at: DateTime<Utc>,
}

impl SubmissionContext {
    pub fn now() -> Self {
        Self {
            received_at: Utc::now(),
        }
    }
}

/// Entry point for every check-in and profile operation.
#[derive(Clone)]
pub struct CheckinService {
    observations: Arc<dyn ObservationStore>,
    profiles: Arc<dyn ProfileStore>,
    history: HistoryWindowLoader,
    engine: RiskAssessmentEngine,
    reads: RetryPolicy,
    limits: CheckinsConfig,
}

impl CheckinService {
    pub fn new(
        observations: Arc<dyn ObservationStore>,
        profiles: Arc<dyn ProfileStore>,
        engine: RiskAssessmentEngine,
        limits: CheckinsConfig,
    ) -> Self {
        let history =
            HistoryWindowLoader::new(observations.clone(), engine.settings().history_window);
        Self {
            observations,
            profiles,
            history,
            engine,
            reads: RetryPolicy::storage_reads(),
            limits,
        }
    }

    /// Wire a service from loaded config and an optional chat model.
    pub fn from_config(
        config: &CarewatchConfig,
        observations: Arc<dyn ObservationStore>,
        profiles: Arc<dyn ProfileStore>,
        llm: Option<Arc<dyn LLMProvider>>,
    ) -> Self {
        let engine = RiskAssessmentEngine::from_config(llm, &config.provider, &config.assessment);
        Self::new(observations, profiles, engine, config.checkins.clone())
    }

    /// Replace the retry policy used for store reads.
    pub fn with_read_retry(mut self, retry: RetryPolicy) -> Self {
        self.reads = retry;
        self.history = self.history.with_retry(retry);
        self
    }

    pub fn provider_configured(&self) -> bool {
        self.engine.provider_configured()
    }

    pub fn limits(&self) -> &CheckinsConfig {
        &self.limits
    }

    /// Validate, persist and enrich one check-in.
    ///
    /// The returned observation's assessment is completed or error, never pending.
    pub async fn submit(&self, input: CheckinInput) -> Result<Observation, CheckinError> {
        self.submit_with(input, SubmissionContext::now()).await
    }

    pub async fn submit_with(
        &self,
        input: CheckinInput,
        context: SubmissionContext,
    ) -> Result<Observation, CheckinError> {
        let observation = validation::validate_checkin(&input, &self.limits, context.received_at)?;
        let stored = self.observations.save(observation).await?;
        info!(
            "created check-in (observation_id={}, subject={}, date={})",
            stored.id, stored.subject_id, stored.date
        );
        self.enrich(stored).await
    }

    /// Run history loading, assessment and the final update for a saved observation.
    async fn enrich(&self, observation: Observation) -> Result<Observation, CheckinError> {
        let assessment = match self.history.load_window(&observation).await {
            Ok(history) => {
                let profile = self.profile_context(&observation.subject_id).await;
                self.engine
                    .assess(AssessmentRequest {
                        current: &observation,
                        history: &history,
                        profile: profile.as_ref(),
                    })
                    .await
            }
            Err(err) => {
                warn!(
                    "history unavailable, recording error assessment (observation_id={}, error={})",
                    observation.id, err
                );
                RiskAssessment::error(truncate_message(&format!(
                    "history unavailable: {err}"
                )))
            }
        };

        let status = assessment.status;
        let enriched = self
            .observations
            .update_assessment(&observation.id, assessment)
            .await
            .map_err(|source| CheckinError::Enrichment {
                observation_id: observation.id.clone(),
                source,
            })?;
        debug!(
            "stored assessment (observation_id={}, status={})",
            enriched.id,
            status.as_str()
        );
        Ok(enriched)
    }

    /// Profile used as prompt context; lookup failures only cost the context.
    async fn profile_context(&self, subject: &SubjectId) -> Option<Profile> {
        match self.profiles.get(subject).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(
                    "profile unavailable for assessment context (subject={}, error={})",
                    subject, err
                );
                None
            }
        }
    }

    /// Most recent check-ins for `subject`, with the limit clamped.
    pub async fn list(
        &self,
        subject: &SubjectId,
        limit: Option<i64>,
    ) -> Result<Vec<Observation>, CheckinError> {
        let limit = validation::clamp_limit(limit, &self.limits);
        let observations = self
            .reads
            .run("check-in listing", || {
                self.observations.list_recent(subject, limit)
            })
            .await?;
        Ok(observations)
    }

    pub async fn get(&self, id: &ObservationId) -> Result<Observation, CheckinError> {
        let observation = self
            .reads
            .run("check-in lookup", || self.observations.get(id))
            .await?;
        observation.ok_or_else(|| CheckinError::NotFound(id.clone()))
    }

    /// Finish enrichment for observations left pending by an interrupted run.
    ///
    /// Only observations created before `cutoff` are touched, so submissions
    /// still in flight are left to their own pipeline.
    pub async fn recover_pending(
        &self,
        limit: usize,
        cutoff: DateTime<Utc>,
    ) -> Result<usize, CheckinError> {
        let pending = self
            .reads
            .run("pending check-in listing", || {
                self.observations.list_pending(limit)
            })
            .await?;
        let mut recovered = 0;
        for observation in pending
            .into_iter()
            .filter(|observation| observation.created_at < cutoff)
        {
            let id = observation.id.clone();
            match self.enrich(observation).await {
                Ok(_) => recovered += 1,
                Err(err) => warn!(
                    "failed to recover pending check-in (observation_id={}, error={})",
                    id, err
                ),
            }
        }
        if recovered > 0 {
            info!("recovered pending check-ins (count={})", recovered);
        }
        Ok(recovered)
    }

    /// Stored profile, or a blank one if nothing was saved yet.
    pub async fn profile(&self, subject: &SubjectId) -> Result<Profile, CheckinError> {
        let profile = self
            .reads
            .run("profile lookup", || self.profiles.get(subject))
            .await?;
        Ok(profile.unwrap_or_else(|| Profile::blank(subject.clone())))
    }

    pub async fn update_profile(
        &self,
        subject: &SubjectId,
        input: ProfileInput,
    ) -> Result<Profile, CheckinError> {
        let current = self.profile(subject).await?;
        let profile = validation::validate_profile(current, &input)?;
        let saved = self.profiles.upsert(profile).await?;
        info!("updated profile (subject={})", saved.id);
        Ok(saved)
    }
}
