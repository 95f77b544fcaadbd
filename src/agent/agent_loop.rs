//! Core agent loop implementation.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::llm::{
    truncate_body, ChatMessage, ChatResponse, LlmClient, LlmError, OpenAiClient, Role, ToolCall,
};
use crate::tools::{ToolError, ToolRegistry};

use super::prompt::*;

/// Consecutive tool-only turns after which an answer is forced.
pub const MAX_CONSECUTIVE_TOOL_TURNS: usize = 5;

/// Consecutive empty responses after which an answer is forced.
pub const MAX_CONSECUTIVE_EMPTY_RESPONSES: usize = 2;

/// Temperature of the tools-disabled call that forces a final answer.
const FORCED_ANSWER_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Error in agentic loop: {0}")]
    Llm(#[from] LlmError),
}

/// A tool call executed during a run, reported back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutedToolCall {
    pub id: String,
    pub function: String,
    pub arguments: Value,
}

/// Final answer of a run plus every tool call that was executed.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub content: String,
    pub tool_calls: Vec<ExecutedToolCall>,
}

/// Shape of a single model response.
#[derive(Debug)]
enum TurnOutcome {
    ToolsRequested {
        content: Option<String>,
        calls: Vec<ToolCall>,
    },
    FinalText(String),
    Empty,
}

impl From<ChatResponse> for TurnOutcome {
    fn from(response: ChatResponse) -> Self {
        match response.tool_calls {
            Some(calls) if !calls.is_empty() => TurnOutcome::ToolsRequested {
                content: response.content,
                calls,
            },
            _ => match response.content {
                Some(text) if !text.trim().is_empty() => TurnOutcome::FinalText(text),
                _ => TurnOutcome::Empty,
            },
        }
    }
}

/// Why the loop is forcing a tools-disabled answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForcedAnswer {
    ToolStall,
    LastTurn,
    EmptyResponses,
}

impl ForcedAnswer {
    fn directive(self) -> &'static str {
        match self {
            ForcedAnswer::ToolStall => TOOL_STALL_DIRECTIVE,
            ForcedAnswer::LastTurn => LAST_TURN_DIRECTIVE,
            ForcedAnswer::EmptyResponses => EMPTY_RESPONSE_DIRECTIVE,
        }
    }

    fn fallback(self) -> &'static str {
        match self {
            ForcedAnswer::ToolStall => TOOL_STALL_FALLBACK,
            ForcedAnswer::LastTurn => LAST_TURN_FALLBACK,
            ForcedAnswer::EmptyResponses => EMPTY_RESPONSE_FALLBACK,
        }
    }

    fn error_fallback(self) -> &'static str {
        match self {
            ForcedAnswer::EmptyResponses => EMPTY_RESPONSE_ERROR_FALLBACK,
            other => other.fallback(),
        }
    }
}

/// Tool-augmented chat agent.
#[derive(Clone)]
pub struct Agent {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    model: String,
    max_turns: usize,
}

impl Agent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: ToolRegistry,
        model: impl Into<String>,
        max_turns: usize,
    ) -> Self {
        Self {
            llm,
            tools,
            model: model.into(),
            max_turns,
        }
    }

    /// Build the agent with the chat-completions client and the built-in tools.
    ///
    /// Fails with `AgentError::Config` when the chat credential is missing.
    pub fn from_config(config: &Config) -> Result<Self, AgentError> {
        let api_key = config.require_llm_api_key()?;
        let llm = Arc::new(OpenAiClient::new(&config.llm.base_url, api_key)?);
        let tools = ToolRegistry::new(&config.llm, api_key);
        Ok(Self::new(llm, tools, &config.llm.chat_model, config.max_turns))
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run the agentic loop for one user message.
    ///
    /// Only a failure of a primary model call is fatal. Tool failures are fed
    /// back to the model and failures of a forced answer degrade to a fixed
    /// fallback text.
    pub async fn run(&self, user_message: &str) -> Result<AgentOutcome, AgentError> {
        let mut messages = vec![ChatMessage::user(user_message)];
        let mut executed = Vec::new();
        let tool_schemas = self.tools.get_tool_schemas();

        let mut consecutive_tool_turns = 0usize;
        let mut consecutive_empty = 0usize;

        tracing::info!(model = %self.model, "Agent started: {}", truncate_body(user_message, 100));

        for turn in 0..self.max_turns {
            let last_turn = turn + 1 == self.max_turns;
            tracing::debug!("Agent turn {}/{}", turn + 1, self.max_turns);

            let response = self
                .llm
                .chat_completion(&self.model, &messages, Some(tool_schemas.as_slice()), None)
                .await?;

            match TurnOutcome::from(response) {
                TurnOutcome::ToolsRequested { content, calls } => {
                    consecutive_tool_turns += 1;

                    let forced = if consecutive_tool_turns >= MAX_CONSECUTIVE_TOOL_TURNS {
                        tracing::warn!(
                            "{} consecutive tool-only turns, forcing an answer",
                            consecutive_tool_turns
                        );
                        Some(ForcedAnswer::ToolStall)
                    } else if last_turn {
                        tracing::warn!(
                            "Last turn reached with {} tool call(s) pending, forcing an answer",
                            calls.len()
                        );
                        Some(ForcedAnswer::LastTurn)
                    } else {
                        None
                    };

                    messages.push(ChatMessage::assistant_tool_calls(content, calls.clone()));

                    if let Some(reason) = forced {
                        for call in &calls {
                            messages.push(ChatMessage::tool_result(
                                &call.id,
                                json!({ "error": SKIPPED_TOOL_CALL_ERROR }).to_string(),
                            ));
                        }
                        let answer = self.force_answer(&mut messages, reason).await;
                        return Ok(self.finish(&messages, answer, executed));
                    }

                    tracing::debug!(
                        "Calling {} tool(s), consecutive tool-only turns: {}",
                        calls.len(),
                        consecutive_tool_turns
                    );
                    consecutive_empty = 0;

                    for call in &calls {
                        let (arguments, payload) = self.execute_tool_call(call).await;
                        executed.push(ExecutedToolCall {
                            id: call.id.clone(),
                            function: call.function.name.clone(),
                            arguments,
                        });
                        messages.push(ChatMessage::tool_result(&call.id, payload.to_string()));
                    }
                }
                TurnOutcome::FinalText(text) => {
                    tracing::info!("Agent final answer after {} turn(s)", turn + 1);
                    messages.push(ChatMessage::assistant(text.clone()));
                    return Ok(self.finish(&messages, text, executed));
                }
                TurnOutcome::Empty => {
                    consecutive_empty += 1;
                    tracing::warn!(
                        "Empty model response (consecutive: {}) on turn {}/{}",
                        consecutive_empty,
                        turn + 1,
                        self.max_turns
                    );

                    if consecutive_empty >= MAX_CONSECUTIVE_EMPTY_RESPONSES || last_turn {
                        let answer = self
                            .force_answer(&mut messages, ForcedAnswer::EmptyResponses)
                            .await;
                        return Ok(self.finish(&messages, answer, executed));
                    }

                    messages.push(ChatMessage::system(EMPTY_RESPONSE_GUIDANCE));
                }
            }
        }

        tracing::warn!("Max turns ({}) reached", self.max_turns);
        Ok(self.finish(&messages, MAX_STEPS_MESSAGE.to_string(), executed))
    }

    /// Execute one tool call, returning the recorded arguments and the payload
    /// to feed back to the model.
    async fn execute_tool_call(&self, call: &ToolCall) -> (Value, Value) {
        let name = &call.function.name;
        let raw = &call.function.arguments;

        let args: Value = match serde_json::from_str(raw) {
            Ok(args) => args,
            Err(e) => {
                tracing::warn!("Tool '{}' called with malformed arguments: {}", name, e);
                let err = ToolError::InvalidArguments(format!("arguments are not valid JSON: {}", e));
                return (Value::String(raw.clone()), err.payload());
            }
        };

        tracing::info!("Calling tool '{}' with args: {}", name, args);

        let payload = match self.tools.execute(name, args.clone()).await {
            Ok(result) => {
                tracing::debug!("Tool '{}' output: {}", name, truncate_body(&result.to_string(), 200));
                result
            }
            Err(e) => {
                tracing::warn!("Tool '{}' failed: {}", name, e);
                e.payload()
            }
        };

        (args, payload)
    }

    /// Inject the directive for `reason` and make one tools-disabled call.
    async fn force_answer(&self, messages: &mut Vec<ChatMessage>, reason: ForcedAnswer) -> String {
        messages.push(ChatMessage::system(reason.directive()));

        let answer = match self
            .llm
            .chat_completion(&self.model, messages, None, Some(FORCED_ANSWER_TEMPERATURE))
            .await
        {
            Ok(response) => response
                .content
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| reason.fallback().to_string()),
            Err(e) => {
                tracing::error!("Forced answer ({:?}) failed: {}", reason, e);
                return reason.error_fallback().to_string();
            }
        };

        tracing::info!("Forced answer ({:?}): {}", reason, truncate_body(&answer, 200));
        messages.push(ChatMessage::assistant(answer.clone()));
        answer
    }

    fn finish(
        &self,
        messages: &[ChatMessage],
        content: String,
        tool_calls: Vec<ExecutedToolCall>,
    ) -> AgentOutcome {
        log_transcript(messages);
        AgentOutcome {
            content,
            tool_calls,
        }
    }
}

/// Dump the full transcript at debug level.
fn log_transcript(messages: &[ChatMessage]) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    tracing::debug!("Transcript ({} messages):", messages.len());
    for (i, msg) in messages.iter().enumerate() {
        let role = match msg.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };
        let content = msg.content.as_deref().unwrap_or("(none)");
        match (&msg.tool_calls, &msg.tool_call_id) {
            (Some(calls), _) => {
                let names: Vec<_> = calls.iter().map(|c| c.function.name.as_str()).collect();
                tracing::debug!("  [{}] {} -> tools {:?}: {}", i + 1, role, names, truncate_body(content, 200));
            }
            (None, Some(id)) => {
                tracing::debug!("  [{}] {} ({}): {}", i + 1, role, id, truncate_body(content, 200));
            }
            (None, None) => {
                tracing::debug!("  [{}] {}: {}", i + 1, role, truncate_body(content, 200));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::Tool;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// One recorded request to the fake model.
    #[derive(Debug, Clone)]
    struct Request {
        tools_enabled: bool,
        messages: Vec<ChatMessage>,
    }

    /// Replays a fixed script of responses and records every request.
    struct ScriptedLlm {
        script: Mutex<VecDeque<Result<ChatResponse, LlmError>>>,
        requests: Mutex<Vec<Request>>,
    }

    impl ScriptedLlm {
        fn new(script: Vec<Result<ChatResponse, LlmError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<Request> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn chat_completion(
            &self,
            _model: &str,
            messages: &[ChatMessage],
            tools: Option<&[Value]>,
            _temperature: Option<f32>,
        ) -> Result<ChatResponse, LlmError> {
            self.requests.lock().unwrap().push(Request {
                tools_enabled: tools.is_some(),
                messages: messages.to_vec(),
            });
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(LlmError::MalformedResponse("script exhausted".into())))
        }
    }

    struct FakeSearch;

    #[async_trait]
    impl Tool for FakeSearch {
        fn name(&self) -> &str {
            "web_search"
        }

        fn description(&self) -> &str {
            "Search the web"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {"query": {"type": "string"}}, "required": ["query"]})
        }

        async fn execute(&self, args: Value) -> Result<Value, ToolError> {
            let query = args["query"].as_str().unwrap_or_default();
            if query == "fail" {
                return Err(ToolError::Upstream("HTTP 503".to_string()));
            }
            Ok(json!({"queries": [{"keyword": query, "results": []}]}))
        }
    }

    fn agent(llm: Arc<ScriptedLlm>, max_turns: usize) -> Agent {
        let mut tools = ToolRegistry::empty();
        tools.register(FakeSearch);
        Agent::new(llm, tools, "test-model", max_turns)
    }

    fn text(s: &str) -> Result<ChatResponse, LlmError> {
        Ok(ChatResponse {
            content: Some(s.to_string()),
            tool_calls: None,
        })
    }

    fn empty() -> Result<ChatResponse, LlmError> {
        Ok(ChatResponse::default())
    }

    fn search(id: &str, query: &str) -> Result<ChatResponse, LlmError> {
        Ok(ChatResponse {
            content: None,
            tool_calls: Some(vec![ToolCall::new(id, "web_search", json!({ "query": query }))]),
        })
    }

    fn calls(calls: Vec<ToolCall>) -> Result<ChatResponse, LlmError> {
        Ok(ChatResponse {
            content: None,
            tool_calls: Some(calls),
        })
    }

    /// Every tool message must answer a call of the closest preceding assistant message.
    fn assert_tool_ids_match(messages: &[ChatMessage]) {
        let mut pending: Vec<String> = Vec::new();
        for msg in messages {
            match msg.role {
                Role::Assistant => {
                    pending = msg
                        .tool_calls
                        .iter()
                        .flatten()
                        .map(|c| c.id.clone())
                        .collect();
                }
                Role::Tool => {
                    let id = msg.tool_call_id.as_deref().expect("tool message without id");
                    assert!(pending.iter().any(|p| p == id), "orphan tool result {id}");
                }
                _ => {}
            }
        }
    }

    fn has_system(messages: &[ChatMessage], directive: &str) -> bool {
        messages
            .iter()
            .any(|m| m.role == Role::System && m.content.as_deref() == Some(directive))
    }

    #[tokio::test]
    async fn final_text_on_first_turn_returns_immediately() {
        let llm = ScriptedLlm::new(vec![text("4")]);
        let outcome = agent(llm.clone(), 10).run("What is 2+2?").await.unwrap();

        assert_eq!(outcome.content, "4");
        assert!(outcome.tool_calls.is_empty());
        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].tools_enabled);
        assert_eq!(requests[0].messages.len(), 1);
        assert_eq!(requests[0].messages[0].role, Role::User);
    }

    #[tokio::test]
    async fn tool_results_are_fed_back_before_final_answer() {
        let llm = ScriptedLlm::new(vec![search("call_1", "rust 1.80"), text("Rust 1.80 shipped.")]);
        let outcome = agent(llm.clone(), 10).run("What's new in Rust?").await.unwrap();

        assert_eq!(outcome.content, "Rust 1.80 shipped.");
        assert_eq!(
            outcome.tool_calls,
            vec![ExecutedToolCall {
                id: "call_1".to_string(),
                function: "web_search".to_string(),
                arguments: json!({"query": "rust 1.80"}),
            }]
        );

        let second = &llm.requests()[1].messages;
        assert_eq!(second.len(), 3);
        assert_eq!(second[1].role, Role::Assistant);
        assert_eq!(second[1].content.as_deref(), Some(""));
        assert_eq!(second[2].role, Role::Tool);
        assert_eq!(second[2].tool_call_id.as_deref(), Some("call_1"));
        let payload: Value = serde_json::from_str(second[2].content.as_deref().unwrap()).unwrap();
        assert_eq!(payload["queries"][0]["keyword"], "rust 1.80");
    }

    #[tokio::test]
    async fn multiple_calls_run_in_order() {
        let llm = ScriptedLlm::new(vec![
            calls(vec![
                ToolCall::new("a", "web_search", json!({"query": "first"})),
                ToolCall::new("b", "web_search", json!({"query": "second"})),
            ]),
            text("done"),
        ]);
        let outcome = agent(llm.clone(), 10).run("compare").await.unwrap();

        let ids: Vec<_> = outcome.tool_calls.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        let transcript = &llm.requests()[1].messages;
        assert_eq!(transcript[2].tool_call_id.as_deref(), Some("a"));
        assert_eq!(transcript[3].tool_call_id.as_deref(), Some("b"));
        assert_tool_ids_match(transcript);
    }

    #[tokio::test]
    async fn tool_failures_do_not_abort_the_loop() {
        let llm = ScriptedLlm::new(vec![
            calls(vec![
                ToolCall::new("c1", "launch_rockets", json!({})),
                ToolCall::new("c2", "web_search", json!({"query": "fail"})),
            ]),
            text("recovered"),
        ]);
        let outcome = agent(llm.clone(), 10).run("go").await.unwrap();
        assert_eq!(outcome.content, "recovered");

        let transcript = &llm.requests()[1].messages;
        let unknown: Value = serde_json::from_str(transcript[2].content.as_deref().unwrap()).unwrap();
        assert_eq!(unknown, json!({"error": "Unknown tool: launch_rockets"}));
        let failed: Value = serde_json::from_str(transcript[3].content.as_deref().unwrap()).unwrap();
        assert_eq!(
            failed["error"],
            "Tool execution failed: Web search API call failed: HTTP 503"
        );
    }

    #[tokio::test]
    async fn malformed_arguments_become_an_error_payload() {
        let mut call = ToolCall::new("m1", "web_search", json!({}));
        call.function.arguments = "{not json".to_string();
        let llm = ScriptedLlm::new(vec![calls(vec![call]), text("ok")]);
        let outcome = agent(llm.clone(), 10).run("go").await.unwrap();

        assert_eq!(outcome.tool_calls[0].arguments, json!("{not json"));
        let transcript = &llm.requests()[1].messages;
        let payload: Value = serde_json::from_str(transcript[2].content.as_deref().unwrap()).unwrap();
        assert!(payload["error"].as_str().unwrap().contains("Invalid arguments"));
    }

    #[tokio::test]
    async fn five_tool_turns_force_an_answer_before_turn_six() {
        let mut script: Vec<_> = (1..=5).map(|i| search(&format!("s{i}"), "news")).collect();
        script.push(text("Here is what I found."));
        let llm = ScriptedLlm::new(script);

        let outcome = agent(llm.clone(), 10).run("latest news").await.unwrap();
        assert_eq!(outcome.content, "Here is what I found.");
        // The fifth turn's call is skipped, not executed.
        assert_eq!(outcome.tool_calls.len(), 4);

        let requests = llm.requests();
        assert_eq!(requests.len(), 6);
        assert!(requests[..5].iter().all(|r| r.tools_enabled));
        let forced = &requests[5];
        assert!(!forced.tools_enabled);
        assert!(has_system(&forced.messages, TOOL_STALL_DIRECTIVE));
        assert_tool_ids_match(&forced.messages);
    }

    #[tokio::test]
    async fn empty_forced_answer_uses_fallback() {
        let mut script: Vec<_> = (1..=5).map(|i| search(&format!("s{i}"), "news")).collect();
        script.push(empty());
        let llm = ScriptedLlm::new(script);

        let outcome = agent(llm, 10).run("latest news").await.unwrap();
        assert_eq!(outcome.content, TOOL_STALL_FALLBACK);
    }

    #[tokio::test]
    async fn last_turn_tool_request_forces_an_answer() {
        let llm = ScriptedLlm::new(vec![
            search("t1", "a"),
            search("t2", "b"),
            search("t3", "c"),
            text("partial answer"),
        ]);
        let outcome = agent(llm.clone(), 3).run("q").await.unwrap();

        assert_eq!(outcome.content, "partial answer");
        assert_eq!(outcome.tool_calls.len(), 2);
        let requests = llm.requests();
        assert_eq!(requests.len(), 4);
        assert!(!requests[3].tools_enabled);
        assert!(has_system(&requests[3].messages, LAST_TURN_DIRECTIVE));
    }

    #[tokio::test]
    async fn single_empty_response_adds_guidance_and_continues() {
        let llm = ScriptedLlm::new(vec![empty(), text("answer")]);
        let outcome = agent(llm.clone(), 10).run("q").await.unwrap();

        assert_eq!(outcome.content, "answer");
        let requests = llm.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].tools_enabled);
        assert!(has_system(&requests[1].messages, EMPTY_RESPONSE_GUIDANCE));
    }

    #[tokio::test]
    async fn two_empty_responses_force_an_answer() {
        let llm = ScriptedLlm::new(vec![empty(), empty(), text("forced")]);
        let outcome = agent(llm.clone(), 10).run("q").await.unwrap();

        assert_eq!(outcome.content, "forced");
        let requests = llm.requests();
        assert_eq!(requests.len(), 3);
        assert!(!requests[2].tools_enabled);
        assert!(has_system(&requests[2].messages, EMPTY_RESPONSE_DIRECTIVE));
    }

    #[tokio::test]
    async fn empty_response_on_last_turn_forces_an_answer() {
        let llm = ScriptedLlm::new(vec![search("x", "q"), empty(), text("late answer")]);
        let outcome = agent(llm.clone(), 2).run("q").await.unwrap();

        assert_eq!(outcome.content, "late answer");
        assert!(!llm.requests()[2].tools_enabled);
    }

    #[tokio::test]
    async fn forced_call_failure_degrades_to_fallback() {
        let llm = ScriptedLlm::new(vec![
            empty(),
            empty(),
            Err(LlmError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            }),
        ]);
        let outcome = agent(llm, 10).run("q").await.unwrap();
        assert_eq!(outcome.content, EMPTY_RESPONSE_ERROR_FALLBACK);
    }

    #[tokio::test]
    async fn primary_call_failure_is_fatal() {
        let llm = ScriptedLlm::new(vec![Err(LlmError::Transport("connection refused".into()))]);
        let err = agent(llm, 10).run("q").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error in agentic loop: LLM request failed: connection refused"
        );
    }

    #[tokio::test]
    async fn primary_calls_never_exceed_max_turns() {
        // Alternate tool turns and empty turns so neither counter trips early.
        let script = vec![
            search("1", "a"),
            empty(),
            search("2", "b"),
            empty(),
            search("3", "c"),
            empty(),
        ];
        let llm = ScriptedLlm::new(script);
        let outcome = agent(llm.clone(), 6).run("q").await.unwrap();

        let requests = llm.requests();
        let primary = requests.iter().filter(|r| r.tools_enabled).count();
        let forced = requests.iter().filter(|r| !r.tools_enabled).count();
        assert!(primary <= 6);
        assert_eq!(forced, 1);
        // The forced call hits the exhausted script and degrades.
        assert_eq!(outcome.content, EMPTY_RESPONSE_ERROR_FALLBACK);
    }

    #[tokio::test]
    async fn zero_turn_budget_reports_max_steps() {
        let llm = ScriptedLlm::new(vec![]);
        let outcome = agent(llm.clone(), 0).run("q").await.unwrap();
        assert_eq!(outcome.content, MAX_STEPS_MESSAGE);
        assert!(llm.requests().is_empty());
    }

    #[test]
    fn text_alongside_tool_calls_counts_as_tool_request() {
        let outcome = TurnOutcome::from(ChatResponse {
            content: Some("Let me search.".to_string()),
            tool_calls: Some(vec![ToolCall::new("1", "web_search", json!({"query": "x"}))]),
        });
        assert!(matches!(outcome, TurnOutcome::ToolsRequested { content: Some(_), .. }));
    }

    #[test]
    fn whitespace_only_text_is_empty() {
        let outcome = TurnOutcome::from(ChatResponse {
            content: Some("  \n".to_string()),
            tool_calls: Some(vec![]),
        });
        assert!(matches!(outcome, TurnOutcome::Empty));
    }
}
