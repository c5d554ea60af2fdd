//! Risk assessment engine.
//!
//! The engine asks the reasoning provider first, when one is configured, and
//! falls back to deterministic trend analysis on any provider failure. It
//! always returns a completed assessment; failures never escape.

pub mod prompt;
pub mod provider;
pub mod response;
pub mod trend;

use crate::retry::RetryPolicy;
use autoagents_llm::LLMProvider;
use carewatch_config::{AssessmentConfig, ProviderConfig};
use carewatch_protocol::{Observation, Profile, RiskAssessment};
use log::{info, warn};
use provider::ReasoningProvider;
use std::sync::Arc;
use std::time::Duration;

/// Inputs for one assessment.
#[derive(Debug, Clone, Copy)]
pub struct AssessmentRequest<'a> {
    pub current: &'a Observation,
    /// Prior observations, newest first.
    pub history: &'a [Observation],
    pub profile: Option<&'a Profile>,
}

#[derive(Clone)]
pub struct RiskAssessmentEngine {
    provider: Option<ReasoningProvider>,
    retry: RetryPolicy,
    settings: AssessmentConfig,
}

impl RiskAssessmentEngine {
    /// Engine that only ever uses the deterministic fallback.
    pub fn fallback_only(settings: AssessmentConfig) -> Self {
        Self {
            provider: None,
            retry: RetryPolicy::none(),
            settings,
        }
    }

    pub fn new(
        provider: Option<ReasoningProvider>,
        retry: RetryPolicy,
        settings: AssessmentConfig,
    ) -> Self {
        Self {
            provider,
            retry,
            settings,
        }
    }

    /// Build from config around an optional chat model.
    pub fn from_config(
        llm: Option<Arc<dyn LLMProvider>>,
        provider: &ProviderConfig,
        settings: &AssessmentConfig,
    ) -> Self {
        let timeout = Duration::from_secs(provider.timeout_secs);
        Self::new(
            llm.map(|llm| ReasoningProvider::new(llm, timeout)),
            RetryPolicy::from_config(&provider.retry),
            settings.clone(),
        )
    }

    pub fn provider_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn settings(&self) -> &AssessmentConfig {
        &self.settings
    }

    pub async fn assess(&self, request: AssessmentRequest<'_>) -> RiskAssessment {
        let Some(provider) = &self.provider else {
            return trend::fallback_assessment(
                request.current,
                request.history,
                &self.settings,
                None,
            );
        };

        let messages = prompt::build_messages(request.current, request.history, request.profile);
        let reply = self
            .retry
            .run("reasoning provider call", || provider.complete(&messages))
            .await;
        let parsed =
            reply.and_then(|text| response::parse_reply(&text, self.settings.max_suggestions));

        match parsed {
            Ok(assessment) => {
                let analysis = trend::analyze(request.history, self.settings.trend_threshold);
                info!(
                    "provider assessment completed (observation_id={}, risk_level={})",
                    request.current.id,
                    assessment.risk_level.map_or("none", |level| level.as_str())
                );
                assessment.with_trend(analysis.trend)
            }
            Err(err) => {
                warn!(
                    "provider assessment failed, using fallback (observation_id={}, error={})",
                    request.current.id, err
                );
                trend::fallback_assessment(
                    request.current,
                    request.history,
                    &self.settings,
                    Some(&err),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carewatch_protocol::{AssessmentSource, AssessmentStatus, Mood, RiskLevel, Scores, Trend};
    use carewatch_test_utils::{FailingLLM, FixedLLM, FlakyLLM, RecordingChatLLM, fixtures};
    use pretty_assertions::assert_eq;

    fn engine(llm: Arc<dyn LLMProvider>) -> RiskAssessmentEngine {
        RiskAssessmentEngine::new(
            Some(ReasoningProvider::new(llm, Duration::from_secs(1))),
            RetryPolicy::new(2, Duration::ZERO),
            AssessmentConfig::default(),
        )
    }

    fn today() -> Observation {
        fixtures::observation("today", 10, Scores::new(3, 3, 3), Mood::Ok)
    }

    #[tokio::test]
    async fn provider_reply_is_used_when_valid() {
        let llm = Arc::new(FixedLLM::new(fixtures::provider_reply(
            "Low",
            "A steady day.",
            &["Keep going"],
        )));
        let current = today();
        let assessment = engine(llm)
            .assess(AssessmentRequest {
                current: &current,
                history: &[],
                profile: None,
            })
            .await;
        assert_eq!(assessment.source, Some(AssessmentSource::Provider));
        assert_eq!(assessment.risk_level, Some(RiskLevel::Low));
        assert_eq!(assessment.summary, "A steady day.");
        assert_eq!(assessment.trend, Some(Trend::InsufficientData));
    }

    #[tokio::test]
    async fn severe_risk_level_falls_back() {
        let llm = Arc::new(FixedLLM::new(fixtures::provider_reply(
            "Severe",
            "Very bad.",
            &[],
        )));
        let current = today();
        let assessment = engine(llm)
            .assess(AssessmentRequest {
                current: &current,
                history: &[],
                profile: None,
            })
            .await;
        assert_eq!(assessment.status, AssessmentStatus::Completed);
        assert_eq!(assessment.source, Some(AssessmentSource::Fallback));
        assert!(assessment.summary.contains("could not be generated"));
    }

    #[tokio::test]
    async fn one_transient_failure_is_retried() {
        let llm = Arc::new(FlakyLLM::new(
            1,
            fixtures::provider_reply("Monitor", "Some changes today.", &["Rest"]),
        ));
        let current = today();
        let assessment = engine(llm.clone())
            .assess(AssessmentRequest {
                current: &current,
                history: &[],
                profile: None,
            })
            .await;
        assert_eq!(assessment.source, Some(AssessmentSource::Provider));
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn persistent_failure_stops_after_two_attempts() {
        let llm = Arc::new(FlakyLLM::new(5, "{}"));
        let current = today();
        let assessment = engine(llm.clone())
            .assess(AssessmentRequest {
                current: &current,
                history: &[],
                profile: None,
            })
            .await;
        assert_eq!(assessment.source, Some(AssessmentSource::Fallback));
        assert_eq!(llm.calls(), 2);

        let failing = engine(Arc::new(FailingLLM::new("connection refused")))
            .assess(AssessmentRequest {
                current: &current,
                history: &[],
                profile: None,
            })
            .await;
        assert_eq!(failing.source, Some(AssessmentSource::Fallback));
    }

    #[tokio::test]
    async fn prompt_carries_history_and_profile() {
        let llm = RecordingChatLLM::new(fixtures::provider_reply("Low", "Fine.", &[]));
        let seen = llm.last_messages.clone();
        let current = today();
        let history = vec![fixtures::observation("prev", 9, Scores::new(2, 2, 2), Mood::Low)];
        let mut profile = Profile::blank(current.subject_id.clone());
        profile.age = Some(88);
        engine(Arc::new(llm))
            .assess(AssessmentRequest {
                current: &current,
                history: &history,
                profile: Some(&profile),
            })
            .await;
        let messages = seen.lock().clone();
        assert_eq!(messages.len(), 2);
        assert!(messages[1].content.contains("- Age: 88"));
        assert!(messages[1].content.contains("1. Date: 2024-06-09"));
    }

    #[tokio::test]
    async fn no_provider_is_not_an_error() {
        let current = today();
        let assessment = RiskAssessmentEngine::fallback_only(AssessmentConfig::default())
            .assess(AssessmentRequest {
                current: &current,
                history: &[],
                profile: None,
            })
            .await;
        assert_eq!(assessment.status, AssessmentStatus::Completed);
        assert_eq!(assessment.source, Some(AssessmentSource::Fallback));
        assert!(!assessment.summary.contains("could not be generated"));
    }
}
