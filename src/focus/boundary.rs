//! Session boundary policy.
//!
//! A capture either continues the current active session or, when the
//! classifier is confident the topic changed, closes it and opens a new one.
//! Every failure along the way (no model, model error, unparseable verdict)
//! keeps the current session.

use serde::Deserialize;

use super::analysis::parse_model_json;
use super::models::{Capture, Session};
use super::prompts::{excerpt, topic_shift_prompt};
use super::store::FocusStore;
use super::FocusError;
use crate::llm::{GenerationOptions, TextModel};

/// Goal given to a session opened because no active session existed.
pub const DEFAULT_SESSION_GOAL: &str = "New learning session";

/// Tunables of the topic-shift decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryPolicy {
    /// Captures needed before a shift can be detected
    pub min_history: usize,
    /// A shift needs `confidence` strictly above this
    pub confidence_threshold: f64,
    /// Recent captures shown to the classifier
    pub context_captures: usize,
    /// Characters per capture excerpt in the prompt
    pub excerpt_chars: usize,
    /// Recent captures loaded from the active session
    pub history_window: usize,
    pub temperature: f32,
}

impl Default for BoundaryPolicy {
    fn default() -> Self {
        Self {
            min_history: 3,
            confidence_threshold: 0.6,
            context_captures: 3,
            excerpt_chars: 200,
            history_window: 5,
            temperature: 0.3,
        }
    }
}

fn default_related() -> bool {
    true
}

fn default_confidence() -> f64 {
    0.5
}

/// Classifier verdict. Missing fields lean towards "related".
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TopicVerdict {
    #[serde(default = "default_related")]
    pub related: bool,
    #[serde(default)]
    pub new_topic: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundaryDecision {
    pub shifted: bool,
    pub new_topic: String,
}

impl BoundaryDecision {
    fn keep() -> Self {
        Self::default()
    }
}

impl BoundaryPolicy {
    /// Apply the threshold to a verdict.
    pub fn evaluate(&self, verdict: &TopicVerdict) -> BoundaryDecision {
        if !verdict.related && verdict.confidence > self.confidence_threshold {
            BoundaryDecision {
                shifted: true,
                new_topic: verdict.new_topic.clone(),
            }
        } else {
            BoundaryDecision::keep()
        }
    }

    /// Decide whether `new_text` starts a new topic.
    ///
    /// `recent` holds the newest captures of the active session, newest first.
    pub async fn decide(
        &self,
        model: Option<&dyn TextModel>,
        new_text: &str,
        recent: &[Capture],
    ) -> BoundaryDecision {
        if recent.len() < self.min_history {
            return BoundaryDecision::keep();
        }
        let Some(model) = model else {
            tracing::debug!("No classification model configured, keeping current session");
            return BoundaryDecision::keep();
        };

        let context: Vec<&str> = recent
            .iter()
            .take(self.context_captures)
            .map(|c| excerpt(&c.selected_text, self.excerpt_chars))
            .collect();
        let prompt = topic_shift_prompt(&context, excerpt(new_text, self.excerpt_chars));

        let options = GenerationOptions {
            temperature: Some(self.temperature),
            json_response: true,
        };
        let raw = match model.generate(&prompt, options).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Topic detection failed: {}", e);
                return BoundaryDecision::keep();
            }
        };
        let verdict: TopicVerdict = match parse_model_json(&raw) {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!("Topic detection returned an unreadable verdict: {}", e);
                return BoundaryDecision::keep();
            }
        };

        tracing::info!(
            related = verdict.related,
            confidence = verdict.confidence,
            reason = %verdict.reason,
            "Topic detection verdict"
        );

        let decision = self.evaluate(&verdict);
        if decision.shifted {
            tracing::info!("Topic shift detected: {}", decision.new_topic);
        }
        decision
    }
}

/// The session a capture should go into.
#[derive(Debug, Clone)]
pub struct SessionSelection {
    pub session: Session,
    /// A topic shift closed the previous session
    pub shifted: bool,
    pub new_topic: String,
}

impl SessionSelection {
    fn keep(session: Session) -> Self {
        Self {
            session,
            shifted: false,
            new_topic: String::new(),
        }
    }
}

/// The active session and the history the boundary policy looks at.
#[derive(Debug, Clone)]
pub struct ActiveSnapshot {
    pub session: Session,
    /// The session was opened because none was active
    pub opened: bool,
    /// Newest captures of the session, newest first
    pub recent: Vec<Capture>,
}

/// Load the active session and its recent captures, opening a session when
/// none is active.
pub fn snapshot_active_session(
    store: &FocusStore,
    policy: &BoundaryPolicy,
) -> Result<ActiveSnapshot, FocusError> {
    match store.latest_active_session()? {
        Some(session) => {
            let recent = store.recent_captures(session.id, policy.history_window)?;
            Ok(ActiveSnapshot {
                session,
                opened: false,
                recent,
            })
        }
        None => {
            let session = store.create_session(Some(DEFAULT_SESSION_GOAL))?;
            tracing::info!("Created first session #{}", session.id);
            Ok(ActiveSnapshot {
                session,
                opened: true,
                recent: Vec::new(),
            })
        }
    }
}

/// Apply a boundary decision taken against `current`.
///
/// When another capture rotated the active session after `current` was read,
/// the newer active session is joined instead of rotating again.
pub fn apply_decision(
    store: &FocusStore,
    current: Session,
    decision: BoundaryDecision,
) -> Result<SessionSelection, FocusError> {
    if !decision.shifted {
        return Ok(SessionSelection::keep(current));
    }

    if let Some(active) = store.latest_active_session()? {
        if active.id != current.id {
            tracing::info!(
                "Session #{} was already replaced by #{}, joining it",
                current.id,
                active.id
            );
            return Ok(SessionSelection::keep(active));
        }
    }

    store.complete_session(current.id)?;
    let session = store.create_session(Some(decision.new_topic.as_str()))?;
    tracing::info!(
        "Topic shift: closed session #{}, opened #{}: {}",
        current.id,
        session.id,
        decision.new_topic
    );
    Ok(SessionSelection {
        session,
        shifted: true,
        new_topic: decision.new_topic,
    })
}

/// Find or open the session for the next capture.
///
/// With no active session a fresh one is opened. Otherwise, when `new_text`
/// is given, the boundary policy runs over the session's recent captures and
/// a shift completes the current session and opens one seeded with the new
/// topic.
pub async fn select_session(
    store: &FocusStore,
    policy: &BoundaryPolicy,
    model: Option<&dyn TextModel>,
    new_text: Option<&str>,
) -> Result<SessionSelection, FocusError> {
    let snapshot = snapshot_active_session(store, policy)?;
    if snapshot.opened {
        return Ok(SessionSelection::keep(snapshot.session));
    }

    let decision = match new_text.filter(|t| !t.is_empty()) {
        Some(text) => policy.decide(model, text, &snapshot.recent).await,
        None => BoundaryDecision::keep(),
    };
    apply_decision(store, snapshot.session, decision)
}
