//! Prompt templates for topic classification and session analysis.

/// First `max_chars` characters of `text`.
pub(crate) fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Classification prompt asking whether `new_text` continues the topic of the
/// recent captures.
pub(crate) fn topic_shift_prompt(recent: &[&str], new_text: &str) -> String {
    let recent_texts = recent
        .iter()
        .enumerate()
        .map(|(i, text)| format!("Capture {}: {}", i + 1, text))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are a learning-topic recognition assistant. Analyze the user's learning captures and decide whether the new capture is related to the previous topic.

Recent captures:
{recent_texts}

New capture:
{new_text}

Consider:
1. What is the topic of the new capture?
2. Does it belong to the same learning topic as the previous captures?

Criteria:
- Same technology stack, same problem domain, or related concepts -> related
- A completely different field, technology or subject -> not related

Answer in JSON:
{{
  "related": true/false,
  "new_topic": "short description of the new topic (if not related)",
  "confidence": 0.0-1.0,
  "reason": "why you decided this"
}}"#
    )
}

/// Analysis prompt over a numbered list of capture excerpts.
pub(crate) fn analysis_prompt(excerpts: &[&str]) -> String {
    let captures_summary = excerpts
        .iter()
        .enumerate()
        .map(|(i, text)| format!("{}. {}", i + 1, text))
        .collect::<Vec<_>>()
        .join("\n");
    let count = excerpts.len();

    format!(
        r#"You are a learning-path analyst. Analyze the following {count} learning captures and identify the user's learning goal and patterns.

Learning captures:
{captures_summary}

Return the analysis as JSON with these fields:
- core_goal: the core learning goal (string, briefly describing what the user is learning)
- main_thread: the main questions (array of strings, 2-3 core concerns)
- branches: branch questions (array of strings, 1-3 extended or related questions)
- understood: what is already understood (array of strings, 1-3 points)
- unclear: what still needs clarifying (array of strings, 1-3 questions)
- action_guide: suggested next steps (array of strings, 3-5 concrete, actionable steps)
- learning_pattern: observed learning pattern (string, e.g. depth-first, breadth-first, problem-driven)

Return only the JSON, nothing else."#
    )
}
