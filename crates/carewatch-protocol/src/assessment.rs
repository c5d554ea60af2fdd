//! Risk assessment attached to every stored observation.

use crate::ParseError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Informational notice attached to every assessment.
pub const DEFAULT_DISCLAIMER: &str = "This feedback is for informational purposes only and is not a medical diagnosis. Please consult a licensed healthcare professional for any concerns.";

/// Processing state of an assessment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentStatus {
    /// Stored but not yet enriched.
    Pending,
    /// A risk level was produced.
    Completed,
    /// Enrichment could not run.
    Error,
}

impl AssessmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentStatus::Pending => "pending",
            AssessmentStatus::Completed => "completed",
            AssessmentStatus::Error => "error",
        }
    }
}

/// Closed set of risk labels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Monitor,
    Concerning,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Monitor => "Monitor",
            RiskLevel::Concerning => "Concerning",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Low" => Ok(RiskLevel::Low),
            "Monitor" => Ok(RiskLevel::Monitor),
            "Concerning" => Ok(RiskLevel::Concerning),
            other => Err(ParseError::UnknownRiskLevel(other.to_string())),
        }
    }
}

/// Which path produced a completed assessment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentSource {
    /// External reasoning provider.
    Provider,
    /// Deterministic local trend analysis.
    Fallback,
}

/// Short-term direction of the combined scores.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
    /// Fewer than two prior check-ins.
    InsufficientData,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Stable => "stable",
            Trend::Declining => "declining",
            Trend::InsufficientData => "insufficient data",
        }
    }
}

/// Derived judgment stored alongside an observation.
///
/// `risk_level` is only ever set when `status` is [`AssessmentStatus::Completed`];
/// the constructors below are the only way this crate builds one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub status: AssessmentStatus,
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default = "default_disclaimer")]
    pub disclaimer: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub source: Option<AssessmentSource>,
    #[serde(default)]
    pub trend: Option<Trend>,
    #[serde(default)]
    pub assessed_at: Option<DateTime<Utc>>,
}

impl RiskAssessment {
    /// Placeholder written together with a freshly saved observation.
    pub fn pending() -> Self {
        Self {
            status: AssessmentStatus::Pending,
            risk_level: None,
            summary: String::new(),
            suggestions: Vec::new(),
            disclaimer: default_disclaimer(),
            error_message: None,
            source: None,
            trend: None,
            assessed_at: None,
        }
    }

    /// Completed assessment with a risk level.
    pub fn completed(
        risk_level: RiskLevel,
        summary: impl Into<String>,
        suggestions: Vec<String>,
        source: AssessmentSource,
    ) -> Self {
        Self {
            status: AssessmentStatus::Completed,
            risk_level: Some(risk_level),
            summary: summary.into(),
            suggestions,
            disclaimer: default_disclaimer(),
            error_message: None,
            source: Some(source),
            trend: None,
            assessed_at: Some(Utc::now()),
        }
    }

    /// Assessment recording that enrichment could not run.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: AssessmentStatus::Error,
            risk_level: None,
            summary: "Risk feedback is temporarily unavailable due to a technical issue."
                .to_string(),
            suggestions: vec![
                "Please try again later or consult a healthcare professional if you are worried."
                    .to_string(),
            ],
            disclaimer: default_disclaimer(),
            error_message: Some(message.into()),
            source: None,
            trend: None,
            assessed_at: Some(Utc::now()),
        }
    }

    pub fn with_trend(mut self, trend: Trend) -> Self {
        self.trend = Some(trend);
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == AssessmentStatus::Pending
    }
}

fn default_disclaimer() -> String {
    DEFAULT_DISCLAIMER.to_string()
}
