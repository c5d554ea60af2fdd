//! Closed-schema parsing of provider replies.

use crate::error::{ProviderError, truncate_message};
use carewatch_protocol::{AssessmentSource, RiskAssessment, RiskLevel};
use serde::Deserialize;

/// Exactly the keys a provider may return. `disclaimer` is accepted and ignored.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProviderReply {
    risk_level: String,
    summary: String,
    suggestions: Vec<String>,
    #[serde(default)]
    #[allow(dead_code)]
    disclaimer: Option<String>,
}

/// Parse a reply into a completed provider assessment.
pub fn parse_reply(text: &str, max_suggestions: usize) -> Result<RiskAssessment, ProviderError> {
    let body = strip_code_fence(text);
    let reply: ProviderReply = serde_json::from_str(body)
        .map_err(|err| ProviderError::Malformed(truncate_message(&err.to_string())))?;

    let risk_level = reply.risk_level.trim().parse::<RiskLevel>().map_err(|_| {
        ProviderError::ContractViolation(format!(
            "risk_level `{}` is not one of Low, Monitor, Concerning",
            truncate_message(&reply.risk_level)
        ))
    })?;

    let summary = reply.summary.trim();
    if summary.is_empty() {
        return Err(ProviderError::ContractViolation(
            "summary is empty".to_string(),
        ));
    }

    let suggestions = reply
        .suggestions
        .iter()
        .map(|suggestion| suggestion.trim())
        .filter(|suggestion| !suggestion.is_empty())
        .take(max_suggestions)
        .map(str::to_string)
        .collect();

    Ok(RiskAssessment::completed(
        risk_level,
        summary,
        suggestions,
        AssessmentSource::Provider,
    ))
}

/// Remove a surrounding Markdown code fence, with or without a language tag.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.split_once('\n') {
        Some((tag, body)) if tag.trim().chars().all(|ch| ch.is_ascii_alphanumeric()) => body,
        _ => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use carewatch_protocol::{AssessmentStatus, DEFAULT_DISCLAIMER};
    use pretty_assertions::assert_eq;

    const VALID: &str = r#"{"risk_level":"Monitor","summary":"A slightly harder day.","suggestions":["Keep a routine","Take a walk","Note changes","Call family"]}"#;

    #[test]
    fn valid_reply_is_completed_by_provider() {
        let assessment = parse_reply(VALID, 3).expect("parse");
        assert_eq!(assessment.status, AssessmentStatus::Completed);
        assert_eq!(assessment.risk_level, Some(RiskLevel::Monitor));
        assert_eq!(assessment.source, Some(AssessmentSource::Provider));
        assert_eq!(assessment.suggestions.len(), 3);
        assert_eq!(assessment.disclaimer, DEFAULT_DISCLAIMER);
    }

    #[test]
    fn code_fences_are_stripped() {
        let fenced = format!("```json\n{VALID}\n```");
        assert!(parse_reply(&fenced, 3).is_ok());
        let bare = format!("```{VALID}```");
        assert!(parse_reply(&bare, 3).is_ok());
    }

    #[test]
    fn unknown_risk_level_is_a_contract_violation() {
        let reply = r#"{"risk_level":"Severe","summary":"x","suggestions":[]}"#;
        assert!(matches!(
            parse_reply(reply, 3),
            Err(ProviderError::ContractViolation(_))
        ));
    }

    #[test]
    fn missing_fields_and_extra_keys_are_malformed() {
        let missing = r#"{"risk_level":"Low","suggestions":[]}"#;
        assert!(matches!(parse_reply(missing, 3), Err(ProviderError::Malformed(_))));
        let extra = r#"{"risk_level":"Low","summary":"x","suggestions":[],"diagnosis":"y"}"#;
        assert!(matches!(parse_reply(extra, 3), Err(ProviderError::Malformed(_))));
        assert!(matches!(
            parse_reply("Everything looks fine today.", 3),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn disclaimer_key_is_tolerated_but_not_used() {
        let reply = r#"{"risk_level":"Low","summary":"Good day.","suggestions":["Keep going"],"disclaimer":"custom"}"#;
        let assessment = parse_reply(reply, 3).expect("parse");
        assert_eq!(assessment.disclaimer, DEFAULT_DISCLAIMER);
    }

    #[test]
    fn blank_summary_is_rejected() {
        let reply = r#"{"risk_level":"Low","summary":"  ","suggestions":[]}"#;
        assert!(matches!(
            parse_reply(reply, 3),
            Err(ProviderError::ContractViolation(_))
        ));
    }
}
