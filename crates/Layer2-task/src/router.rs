//! Decides whether a chat message should go through the task engine
//! instead of a single model reply.

/// Phrases that suggest a multi-step workflow
pub const AGENTIC_KEYWORDS: &[&str] = &[
    "schedule",
    "create event",
    "send email",
    "update spreadsheet",
    "summarize",
    "find and",
    "search and",
    "then",
    "after that",
];

/// `true` if tools are available and the message reads like a multi-step request
///
/// Plain substring match on the lower-cased message, so "then" also matches
/// inside words like "authentication".
pub fn should_use_agentic_flow(message: &str, available_tools: usize) -> bool {
    if available_tools == 0 {
        return false;
    }
    let lower = message.to_lowercase();
    AGENTIC_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}
