//! Prompt templates shared by the session manager and the page analyzer.

use std::fmt::Write;

use crate::session::{PageContext, Turn};

/// System prompt for single-call requests (page analysis and the direct
/// pipeline backend).
pub const ASSISTANT_SYSTEM_PROMPT: &str = "You are a helpful browser assistant that analyzes web \
pages and answers questions about their content. Be concise, helpful, and accurate.";

/// Message sent through a freshly built client to check connectivity.
pub const PROBE_MESSAGE: &str = "Test message";

/// Build the prompt fed to the first pipeline stage: the page snapshot,
/// the user's question and every prior turn, newest last.
pub fn contextual_prompt(page: &PageContext, user_message: &str, history: &[Turn]) -> String {
    let mut prompt = format!(
        "You are a helpful browser assistant. The user is currently on this webpage:\n\n\
         URL: {}\nTitle: {}\nContent: {}\n\n\
         User's question: {}\n\n\
         Please provide a helpful response based on the webpage content and the user's \
         question. If the question is not related to the current page, you can still help \
         but mention that you're not sure about the current page context.\n\n\
         Previous conversation:\n",
        page.url, page.title, page.content, user_message
    );
    for (i, turn) in history.iter().enumerate() {
        if i > 0 {
            prompt.push('\n');
        }
        let _ = write!(prompt, "{}: {}", turn.role, turn.content);
    }
    prompt
}

/// Build the one-shot page analysis prompt.
pub fn analyze_prompt(page: &PageContext) -> String {
    format!(
        "Analyze the following webpage and provide a concise summary:\n\n\
         URL: {}\nTitle: {}\nContent: {}\n\n\
         Please provide:\n\
         1. A brief summary of what this page is about\n\
         2. Key topics or themes\n\
         3. Any notable information or insights\n\
         4. Suggestions for what the user might want to know more about\n\n\
         Keep the response concise and helpful.",
        page.url, page.title, page.content
    )
}
