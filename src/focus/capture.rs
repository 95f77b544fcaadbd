//! Recording a capture into the right session.

use std::time::Instant;

use tokio::sync::Mutex;

use super::boundary::{apply_decision, snapshot_active_session, BoundaryDecision, BoundaryPolicy};
use super::prompts::excerpt;
use super::store::FocusStore;
use super::FocusError;
use crate::llm::TextModel;

/// Capture count from which a session is worth analyzing.
pub const ANALYSIS_READY_CAPTURES: usize = 5;

#[derive(Debug, Clone)]
pub struct NewCapture {
    pub selected_text: String,
    pub page_url: String,
    pub page_title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CaptureReceipt {
    pub capture_id: i64,
    pub session_id: i64,
    pub topic_shifted: bool,
    pub new_topic: String,
    pub capture_count: usize,
    /// Human-readable summary for the capturing client
    pub message: String,
}

/// Pick the session (running the boundary policy) and store the capture.
///
/// `gate` is held while the active session is read and while the capture is
/// written, never across the classifier call.
pub async fn record_capture(
    store: &FocusStore,
    policy: &BoundaryPolicy,
    model: Option<&dyn TextModel>,
    gate: &Mutex<()>,
    capture: &NewCapture,
) -> Result<CaptureReceipt, FocusError> {
    let started = Instant::now();

    let snapshot = {
        let _guard = gate.lock().await;
        snapshot_active_session(store, policy)?
    };

    let decision = if snapshot.opened || capture.selected_text.is_empty() {
        BoundaryDecision::default()
    } else {
        policy
            .decide(model, &capture.selected_text, &snapshot.recent)
            .await
    };

    let _guard = gate.lock().await;
    let selection = apply_decision(store, snapshot.session, decision)?;
    let session_id = selection.session.id;

    let saved = store.insert_capture(
        session_id,
        &capture.selected_text,
        &capture.page_url,
        capture.page_title.as_deref(),
    )?;
    let capture_count = store.capture_count(session_id)?;

    let message = if selection.shifted {
        format!(
            "🔄 New topic detected: {}, started session #{}",
            selection.new_topic, session_id
        )
    } else {
        format!("✅ Captured into session #{}", session_id)
    };

    tracing::info!(
        capture_id = saved.id,
        session_id,
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "Captured: {}",
        excerpt(&capture.selected_text, 100)
    );
    if capture_count >= ANALYSIS_READY_CAPTURES {
        tracing::info!(
            "Session #{} has {} captures - ready for analysis",
            session_id,
            capture_count
        );
    }

    Ok(CaptureReceipt {
        capture_id: saved.id,
        session_id,
        topic_shifted: selection.shifted,
        new_topic: selection.new_topic,
        capture_count,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focus::boundary::tests::CannedModel;

    fn new_capture(text: &str) -> NewCapture {
        NewCapture {
            selected_text: text.to_string(),
            page_url: "https://doc.rust-lang.org/book/".to_string(),
            page_title: Some("The Rust Book".to_string()),
        }
    }

    #[tokio::test]
    async fn captures_accumulate_in_one_session() {
        let store = FocusStore::in_memory().unwrap();
        let policy = BoundaryPolicy::default();
        let gate = Mutex::new(());

        let first = record_capture(&store, &policy, None, &gate, &new_capture("ownership"))
            .await
            .unwrap();
        let second = record_capture(&store, &policy, None, &gate, &new_capture("borrowing"))
            .await
            .unwrap();

        assert_eq!(first.session_id, second.session_id);
        assert_eq!(second.capture_count, 2);
        assert_eq!(
            second.message,
            format!("✅ Captured into session #{}", second.session_id)
        );
        let stored = store.captures_for_session(first.session_id).unwrap();
        assert_eq!(stored[0].page_title.as_deref(), Some("The Rust Book"));
    }

    #[tokio::test]
    async fn shift_message_names_the_new_topic() {
        let store = FocusStore::in_memory().unwrap();
        let policy = BoundaryPolicy::default();
        let gate = Mutex::new(());
        for text in ["ownership", "borrowing", "lifetimes"] {
            record_capture(&store, &policy, None, &gate, &new_capture(text))
                .await
                .unwrap();
        }

        let model = CannedModel::ok(
            r#"{"related": false, "new_topic": "Roman cuisine", "confidence": 0.9, "reason": "food"}"#,
        );
        let receipt = record_capture(&store, &policy, Some(&model), &gate, &new_capture("best pizza in Rome"))
            .await
            .unwrap();

        assert!(receipt.topic_shifted);
        assert_eq!(receipt.capture_count, 1);
        assert_eq!(
            receipt.message,
            format!(
                "🔄 New topic detected: Roman cuisine, started session #{}",
                receipt.session_id
            )
        );
    }

    /// Classifier whose first call waits until released; later calls answer
    /// "related" at once.
    struct GatedModel {
        calls: std::sync::Mutex<usize>,
        release: tokio::sync::Notify,
    }

    #[async_trait::async_trait]
    impl TextModel for GatedModel {
        async fn generate(
            &self,
            _prompt: &str,
            _options: crate::llm::GenerationOptions,
        ) -> Result<String, crate::llm::LlmError> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                *calls += 1;
                *calls
            };
            if call == 1 {
                self.release.notified().await;
            }
            Ok(r#"{"related": true, "new_topic": "", "confidence": 0.9, "reason": "same"}"#.to_string())
        }
    }

    #[tokio::test]
    async fn slow_classification_does_not_block_other_captures() {
        let store = FocusStore::in_memory().unwrap();
        let policy = BoundaryPolicy::default();
        let gate = Mutex::new(());
        for text in ["ownership", "borrowing", "lifetimes"] {
            record_capture(&store, &policy, None, &gate, &new_capture(text))
                .await
                .unwrap();
        }
        let model = GatedModel {
            calls: std::sync::Mutex::new(0),
            release: tokio::sync::Notify::new(),
        };

        let traits = new_capture("traits");
        let slow = record_capture(&store, &policy, Some(&model), &gate, &traits);
        let fast = async {
            while *model.calls.lock().unwrap() == 0 {
                tokio::task::yield_now().await;
            }
            let receipt = record_capture(&store, &policy, Some(&model), &gate, &new_capture("generics"))
                .await
                .unwrap();
            // The first capture is still waiting on the classifier.
            assert_eq!(receipt.capture_count, 4);
            model.release.notify_one();
            receipt
        };

        let (slow, fast) = tokio::join!(slow, fast);
        let slow = slow.unwrap();
        assert_eq!(slow.session_id, fast.session_id);
        assert_eq!(slow.capture_count, 5);
    }
}
