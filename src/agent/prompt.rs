//! Directives injected into the transcript when the model stalls, and the
//! fixed answers returned when a forced answer cannot be produced.

/// Injected after too many consecutive tool-only turns.
pub const TOOL_STALL_DIRECTIVE: &str = "You have gathered enough information. Stop searching now and write a complete answer based on all the results you already have. Even if the results do not contain a direct answer, summarize the links, titles and other information you found, or tell the user which relevant resources you located. Do not call any more tools.";

/// Injected when the model still requests tools on the final turn.
pub const LAST_TURN_DIRECTIVE: &str = "This is the final turn. Write the final answer from the information you already have and do not call any tools. If the information is incomplete, say so and give a partial answer.";

/// Injected after repeated empty responses, or an empty response on the final turn.
pub const EMPTY_RESPONSE_DIRECTIVE: &str = "You must produce an answer immediately. Answer the user's question using whatever information you gathered earlier. If there is not enough information, tell the user honestly that you could not find an accurate answer, but offer some related suggestions. Do not return an empty response.";

/// Softer nudge after a single empty response.
pub const EMPTY_RESPONSE_GUIDANCE: &str = "Write a complete answer based on the search results gathered so far. If the results contain relevant information, extract and summarize it. If the information is incomplete, say so and give a partial answer.";

pub const TOOL_STALL_FALLBACK: &str = "Sorry, I searched several times but could not put together a satisfying answer. You may want to check the relevant sites directly for the latest information.";

pub const LAST_TURN_FALLBACK: &str =
    "Sorry, I could not produce a complete answer. Please try simplifying your question.";

pub const EMPTY_RESPONSE_FALLBACK: &str = "Sorry, I ran into trouble with your question. I tried to look up related information but could not produce a complete answer. Please rephrase the question or break it into simpler parts.";

/// Returned when the forced answer call itself fails after empty responses.
pub const EMPTY_RESPONSE_ERROR_FALLBACK: &str = "Sorry, something went wrong while generating the answer. Please rephrase the question or break it into simpler parts.";

pub const MAX_STEPS_MESSAGE: &str =
    "I apologize, but I've reached the maximum number of steps. Please try rephrasing your question.";

/// Error payload for tool calls dropped because the loop is forcing an answer.
pub const SKIPPED_TOOL_CALL_ERROR: &str =
    "Tool call skipped: the agent is producing its final answer";
