//! Agent module - the tool-augmented chat loop.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Start the transcript with the user message
//! 2. Call the LLM with the available tools
//! 3. If the LLM requests tool calls, execute them and feed the results back
//! 4. Repeat until the LLM produces a final answer or the turn budget runs out
//!
//! A model that keeps calling tools, or keeps answering with nothing, is pushed
//! to a final answer with a system directive and one tools-disabled call.

mod agent_loop;
mod prompt;

pub use agent_loop::{
    Agent, AgentError, AgentOutcome, ExecutedToolCall, MAX_CONSECUTIVE_EMPTY_RESPONSES,
    MAX_CONSECUTIVE_TOOL_TURNS,
};
pub use prompt::MAX_STEPS_MESSAGE;
