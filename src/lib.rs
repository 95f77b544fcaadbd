//! # Focus Catcher
//!
//! A personal learning-focus capture service with a tool-augmented chat
//! endpoint.
//!
//! This library provides:
//! - An HTTP API for capturing text snippets from the browser
//! - Topic-shift detection that groups captures into learning sessions
//! - AI analysis that turns a session into a learning guide
//! - An agentic chat loop with web search and page reading tools
//!
//! ## Architecture
//!
//! The chat agent follows the "tools in a loop" pattern:
//! 1. Receive a user message via the API
//! 2. Call the LLM with the available tools
//! 3. Execute any requested tool calls and feed the results back
//! 4. Repeat until the LLM answers, forcing an answer when it stalls
//!
//! ## Example
//!
//! ```rust,ignore
//! use focus_catcher::{agent::Agent, config::Config};
//!
//! let config = Config::from_env()?;
//! let agent = Agent::from_config(&config)?;
//! let outcome = agent.run("What changed in the latest Rust release?").await?;
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod focus;
pub mod llm;
pub mod tools;

pub use config::Config;
