//! Deterministic trend analysis used when no provider assessment is available.

use crate::error::ProviderError;
use carewatch_config::AssessmentConfig;
use carewatch_protocol::{AssessmentSource, Observation, RiskAssessment, RiskLevel, Trend};

/// Prior entries needed before a trend is computed.
pub const MIN_TREND_ENTRIES: usize = 2;

/// Outcome of comparing the recent and earlier halves of a history window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendAnalysis {
    pub trend: Trend,
    pub recent_mean: Option<f64>,
    pub earlier_mean: Option<f64>,
}

impl TrendAnalysis {
    pub fn delta(&self) -> Option<f64> {
        Some(self.recent_mean? - self.earlier_mean?)
    }
}

/// Compare per-item means of the newer and older halves of `history`.
///
/// `history` is newest first. The recent half is the first `len / 2` entries.
pub fn analyze(history: &[Observation], threshold: f64) -> TrendAnalysis {
    if history.len() < MIN_TREND_ENTRIES {
        return TrendAnalysis {
            trend: Trend::InsufficientData,
            recent_mean: None,
            earlier_mean: None,
        };
    }
    let (recent, earlier) = history.split_at(history.len() / 2);
    let recent_mean = mean(recent);
    let earlier_mean = mean(earlier);
    let delta = recent_mean - earlier_mean;
    let trend = if delta > threshold {
        Trend::Improving
    } else if delta < -threshold {
        Trend::Declining
    } else {
        Trend::Stable
    };
    TrendAnalysis {
        trend,
        recent_mean: Some(recent_mean),
        earlier_mean: Some(earlier_mean),
    }
}

fn mean(entries: &[Observation]) -> f64 {
    let total: f64 = entries
        .iter()
        .map(|entry| entry.scores.per_item_mean())
        .sum();
    total / entries.len() as f64
}

/// Risk level implied by a trend.
pub fn risk_level(analysis: &TrendAnalysis, concerning_threshold: f64) -> RiskLevel {
    match (analysis.trend, analysis.delta()) {
        (Trend::Declining, Some(delta)) if delta.abs() >= concerning_threshold => {
            RiskLevel::Concerning
        }
        (Trend::Declining, _) => RiskLevel::Monitor,
        _ => RiskLevel::Low,
    }
}

/// Build the completed fallback assessment for `current`.
///
/// `provider_failure` is set when a configured provider was tried and failed.
pub fn fallback_assessment(
    current: &Observation,
    history: &[Observation],
    settings: &AssessmentConfig,
    provider_failure: Option<&ProviderError>,
) -> RiskAssessment {
    let analysis = analyze(history, settings.trend_threshold);
    let level = risk_level(&analysis, settings.concerning_threshold);

    let mut sentences = vec![format!(
        "Today's average score is {:.1} out of 5.",
        current.scores.per_item_mean()
    )];
    match (analysis.recent_mean, analysis.earlier_mean) {
        (Some(recent), Some(earlier)) => sentences.push(format!(
            "Recent check-ins average {recent:.1} compared with {earlier:.1} earlier, which suggests a {} pattern.",
            pattern_word(analysis.trend)
        )),
        _ => sentences.push(format!(
            "There is insufficient data to identify a trend yet; at least {MIN_TREND_ENTRIES} earlier check-ins are needed."
        )),
    }
    if provider_failure.is_some() {
        sentences.push(
            "Automated feedback could not be generated, so this summary is based on score trends only."
                .to_string(),
        );
    }

    let suggestions = suggestions_for(level)
        .iter()
        .take(settings.max_suggestions)
        .map(|suggestion| suggestion.to_string())
        .collect();

    RiskAssessment::completed(
        level,
        sentences.join(" "),
        suggestions,
        AssessmentSource::Fallback,
    )
    .with_trend(analysis.trend)
}

fn pattern_word(trend: Trend) -> &'static str {
    match trend {
        Trend::Improving => "improving",
        Trend::Declining => "declining",
        Trend::Stable | Trend::InsufficientData => "stable",
    }
}

fn suggestions_for(level: RiskLevel) -> &'static [&'static str] {
    match level {
        RiskLevel::Low => &[
            "Keep up the daily check-ins to build a clear picture over time.",
            "Continue familiar routines and social activities.",
        ],
        RiskLevel::Monitor => &[
            "Keep notes of any changes to discuss with a healthcare provider.",
            "Watch for patterns in memory or orientation over the next few days.",
            "Keep the daily routine as consistent as possible.",
        ],
        RiskLevel::Concerning => &[
            "Consider contacting a healthcare professional to discuss the recent changes.",
            "Write down specific incidents, including the time and what happened.",
            "Review home safety, such as stove use and the risk of wandering.",
        ],
    }
}
