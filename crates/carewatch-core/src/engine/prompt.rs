//! Prompt assembly for the reasoning provider.

use autoagents_llm::chat::{ChatMessage, ChatRole, MessageType};
use carewatch_protocol::{Observation, Profile};
use std::fmt::Write;

const SYSTEM_PROMPT: &str = "You are a helpful, caring assistant for family caregivers. \
You provide supportive, practical feedback but never diagnose medical conditions. \
Always respond with valid JSON only.";

const PREAMBLE: &str = "You are a caring, non-diagnostic assistant helping family caregivers \
track daily observations about an elderly loved one. You provide supportive, practical feedback \
but NEVER diagnose medical conditions.

SCORING GUIDE (1-5 scale):
- 1 = Much worse than usual
- 2 = Somewhat worse than usual
- 3 = About usual/typical
- 4 = Somewhat better than usual
- 5 = Much better than usual";

const GUIDELINES: &str = r#"CLASSIFICATION GUIDELINES:
- "Low" risk: Scores are mostly stable or higher (3-5), notes describe minor or infrequent issues
- "Monitor" risk: Some lower scores (2-3) or variable pattern, occasional forgetfulness or confusion
- "Concerning" risk: Very low scores (1-2) especially on memory/orientation, significant confusion, safety issues, or repeated concerning events

Provide your response in the following JSON format ONLY (no other text):
{
    "risk_level": "Low" or "Monitor" or "Concerning",
    "summary": "2-4 sentences summarizing today's observations in plain, friendly language. Mention if today differs from recent patterns.",
    "suggestions": [
        "First practical, non-medical suggestion",
        "Second practical suggestion",
        "Third suggestion if warranted"
    ]
}

Remember: Be supportive and practical. Do NOT diagnose any medical conditions. Focus on caregiving tips and when to consult professionals."#;

/// Render the user prompt for one assessment.
///
/// `history` is expected newest first, as returned by the history loader.
pub fn render_prompt(
    current: &Observation,
    history: &[Observation],
    profile: Option<&Profile>,
) -> String {
    let mut prompt = String::from(PREAMBLE);
    prompt.push_str("\n\n");

    if let Some(context) = profile.and_then(profile_context) {
        prompt.push_str(&context);
        prompt.push_str("\n\n");
    }

    let notes = if current.notes.is_empty() {
        "None provided"
    } else {
        current.notes.as_str()
    };
    let _ = write!(
        prompt,
        "TODAY'S CHECK-IN:\n\
         - Date: {}\n\
         - Memory Score: {}/5\n\
         - Orientation (time/place) Score: {}/5\n\
         - Daily Activities Score: {}/5\n\
         - Mood: {}\n\
         - Notes: {}\n",
        current.date,
        current.scores.memory,
        current.scores.orientation,
        current.scores.activities,
        current.mood,
        notes
    );

    if !history.is_empty() {
        prompt.push_str("\nRecent check-in history (most recent first):\n");
        for (index, entry) in history.iter().enumerate() {
            let _ = writeln!(
                prompt,
                "  {}. Date: {}, Memory: {}/5, Orientation: {}/5, Activities: {}/5, Mood: {}",
                index + 1,
                entry.date,
                entry.scores.memory,
                entry.scores.orientation,
                entry.scores.activities,
                entry.mood
            );
            if !entry.notes.is_empty() {
                let _ = writeln!(prompt, "     Notes: {}", entry.notes);
            }
        }
    }

    prompt.push('\n');
    prompt.push_str(GUIDELINES);
    prompt
}

/// System and user messages for one provider call.
pub fn build_messages(
    current: &Observation,
    history: &[Observation],
    profile: Option<&Profile>,
) -> Vec<ChatMessage> {
    vec![
        ChatMessage {
            role: ChatRole::System,
            message_type: MessageType::Text,
            content: SYSTEM_PROMPT.to_string(),
        },
        ChatMessage {
            role: ChatRole::User,
            message_type: MessageType::Text,
            content: render_prompt(current, history, profile),
        },
    ]
}

fn profile_context(profile: &Profile) -> Option<String> {
    let mut lines = Vec::new();
    if let Some(age) = profile.age {
        lines.push(format!("- Age: {age}"));
    }
    if let Some(years) = profile.education_years {
        lines.push(format!("- Years of education: {years}"));
    }
    if lines.is_empty() {
        return None;
    }
    Some(format!("ABOUT THE PERSON:\n{}", lines.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use carewatch_protocol::{Mood, Scores, SubjectId};
    use carewatch_test_utils::fixtures;
    use pretty_assertions::assert_eq;

    #[test]
    fn prompt_lists_today_and_history() {
        let current = fixtures::observation("current", 5, Scores::new(2, 3, 4), Mood::Low);
        let mut previous = fixtures::observation("prev", 4, Scores::new(4, 4, 4), Mood::Good);
        previous.notes = "Baked bread together".to_string();

        let prompt = render_prompt(&current, &[previous], None);
        assert!(prompt.contains("- Memory Score: 2/5"));
        assert!(prompt.contains("- Mood: Low"));
        assert!(prompt.contains("- Notes: None provided"));
        assert!(prompt.contains(
            "  1. Date: 2024-06-04, Memory: 4/5, Orientation: 4/5, Activities: 4/5, Mood: Good"
        ));
        assert!(prompt.contains("     Notes: Baked bread together"));
        assert!(!prompt.contains("ABOUT THE PERSON"));
    }

    #[test]
    fn profile_adds_age_and_education() {
        let current = fixtures::observation("current", 5, Scores::new(3, 3, 3), Mood::Ok);
        let mut profile = Profile::blank(SubjectId::default());
        profile.age = Some(79);
        profile.education_years = Some(12);

        let messages = build_messages(&current, &[], Some(&profile));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert!(messages[1].content.contains("- Age: 79\n- Years of education: 12"));
        assert!(!messages[1].content.contains("Recent check-in history"));
    }
}
