//! Session analysis: ask the analysis model for a digest of a session's
//! captures, render it into a plain-text learning guide and store both.

use std::sync::OnceLock;

use regex::Regex;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::models::Capture;
use super::prompts::{analysis_prompt, excerpt};
use super::store::FocusStore;
use super::FocusError;
use crate::config::{ConfigError, GOOGLE_API_KEY_VAR};
use crate::llm::{GenerationOptions, TextModel};

/// Characters per capture in the analysis prompt.
const PROMPT_EXCERPT_CHARS: usize = 200;

/// Characters per capture in the guide's original-text section.
const GUIDE_EXCERPT_CHARS: usize = 150;

const GUIDE_SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Structured digest of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionAnalysis {
    #[serde(deserialize_with = "text")]
    pub core_goal: String,
    #[serde(deserialize_with = "text_list")]
    pub main_thread: Vec<String>,
    #[serde(deserialize_with = "text_list")]
    pub branches: Vec<String>,
    #[serde(deserialize_with = "text_list")]
    pub understood: Vec<String>,
    #[serde(deserialize_with = "text_list")]
    pub unclear: Vec<String>,
    #[serde(deserialize_with = "text_list")]
    pub action_guide: Vec<String>,
    #[serde(deserialize_with = "text")]
    pub learning_pattern: String,
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Accept a string, any scalar, or null.
fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(value_to_text(Value::deserialize(d)?))
}

/// Accept a list, a single string, or null.
fn text_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => Vec::new(),
        Value::Array(items) => items.into_iter().map(value_to_text).collect(),
        other => vec![value_to_text(other)],
    })
}

impl SessionAnalysis {
    /// Strip markup from every string field.
    fn cleaned(self) -> Self {
        let list = |items: Vec<String>| -> Vec<String> {
            items.iter().map(|s| clean_markup(s)).collect()
        };
        Self {
            core_goal: clean_markup(&self.core_goal),
            main_thread: list(self.main_thread),
            branches: list(self.branches),
            understood: list(self.understood),
            unclear: list(self.unclear),
            action_guide: list(self.action_guide),
            learning_pattern: clean_markup(&self.learning_pattern),
        }
    }
}

/// Result of analyzing a session.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub session_id: i64,
    pub analysis: SessionAnalysis,
    pub learning_guide: String,
    pub capture_count: usize,
}

fn break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid regex"))
}

fn blank_lines_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("valid regex"))
}

fn json_object_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"))
}

/// Turn break tags into newlines, drop other tags, collapse blank lines.
pub fn clean_markup(text: &str) -> String {
    let text = break_re().replace_all(text, "\n");
    let text = tag_re().replace_all(&text, "");
    let text = blank_lines_re().replace_all(&text, "\n");
    text.trim().to_string()
}

/// Parse model output as JSON, falling back to the outermost `{...}` block
/// when the model wrapped the object in prose or code fences.
pub(crate) fn parse_model_json<T: DeserializeOwned>(raw: &str) -> Result<T, FocusError> {
    let direct_err = match serde_json::from_str(raw.trim()) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };
    tracing::debug!("Direct JSON parse failed ({}), trying block extraction", direct_err);

    let block = json_object_re().find(raw).ok_or_else(|| {
        FocusError::Parse(format!(
            "No JSON found in response: {}",
            excerpt(raw, 200)
        ))
    })?;
    serde_json::from_str(block.as_str()).map_err(|e| {
        FocusError::Parse(format!(
            "Failed to parse extracted JSON ({}): {}",
            e,
            excerpt(block.as_str(), 200)
        ))
    })
}

pub fn parse_analysis(raw: &str) -> Result<SessionAnalysis, FocusError> {
    parse_model_json::<SessionAnalysis>(raw).map(SessionAnalysis::cleaned)
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

/// Render the plain-text learning guide, followed by the original captures.
pub fn render_guide(analysis: &SessionAnalysis, captures: &[Capture]) -> String {
    let originals = captures
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let text = excerpt(&c.selected_text, GUIDE_EXCERPT_CHARS);
            if text.len() < c.selected_text.len() {
                format!("{}. {}...", i + 1, text)
            } else {
                format!("{}. {}", i + 1, text)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "🎯 Core topic\n{core_goal}\n\n\
         📚 Key points\n{main_thread}\n\n\
         🔗 Related threads\n{branches}\n\n\
         ✅ Covered so far\n{understood}\n\n\
         ❓ Worth looking up\n{unclear}\n\n\
         💡 Review suggestions\n{action_guide}\n\n\
         📊 Learning pattern\n{learning_pattern}\n\n\
         {GUIDE_SEPARATOR}\n\n\
         📝 Original captures ({count} in total)\n\n\
         {originals}",
        core_goal = or_default(&analysis.core_goal, "Still learning..."),
        main_thread = numbered(&analysis.main_thread),
        branches = analysis.branches.join("\n"),
        understood = numbered(&analysis.understood),
        unclear = numbered(&analysis.unclear),
        action_guide = numbered(&analysis.action_guide),
        learning_pattern = or_default(&analysis.learning_pattern, "Keep up the steady pace"),
        count = captures.len(),
    )
}

/// Analyze a session and persist the result.
///
/// Fails with `NotFound` for an unknown session and `NoCaptures` for an empty
/// one; neither case touches the stored session.
pub async fn analyze_session(
    store: &FocusStore,
    model: Option<&dyn TextModel>,
    session_id: i64,
) -> Result<AnalysisReport, FocusError> {
    store
        .get_session(session_id)?
        .ok_or(FocusError::NotFound(session_id))?;

    let captures = store.captures_for_session(session_id)?;
    if captures.is_empty() {
        return Err(FocusError::NoCaptures);
    }

    let model =
        model.ok_or_else(|| ConfigError::MissingEnvVar(GOOGLE_API_KEY_VAR.to_string()))?;

    tracing::info!(
        "Starting analysis of session #{} ({} captures)",
        session_id,
        captures.len()
    );

    let excerpts: Vec<&str> = captures
        .iter()
        .map(|c| excerpt(&c.selected_text, PROMPT_EXCERPT_CHARS))
        .collect();
    let prompt = analysis_prompt(&excerpts);
    tracing::debug!("Analysis prompt length: {} chars", prompt.chars().count());

    let raw = model
        .generate(
            &prompt,
            GenerationOptions {
                temperature: None,
                json_response: true,
            },
        )
        .await?;
    tracing::debug!(
        "Analysis response ({} chars): {}",
        raw.chars().count(),
        excerpt(&raw, 500)
    );

    let analysis = parse_analysis(&raw)?;
    let learning_guide = render_guide(&analysis, &captures);

    store.save_analysis(
        session_id,
        &analysis.core_goal,
        &analysis.main_thread,
        &analysis.branches,
        &learning_guide,
    )?;
    tracing::info!("Analysis of session #{} saved", session_id);

    Ok(AnalysisReport {
        session_id,
        analysis,
        learning_guide,
        capture_count: captures.len(),
    })
}
