//! Token usage tracking per session and pipeline stage.

use std::collections::HashMap;

use crate::TokenUsage;

/// Tracks cumulative token usage, broken down by stage name.
#[derive(Debug, Clone, Default)]
pub struct TokenTracker {
    /// Total usage across all stages.
    total: TokenUsage,
    /// Usage broken down by stage name.
    by_stage: HashMap<String, TokenUsage>,
    /// Number of model calls made.
    call_count: u64,
}

impl TokenTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record token usage from one model call.
    pub fn record(&mut self, stage: &str, usage: &TokenUsage) {
        self.total.input_tokens = self.total.input_tokens.saturating_add(usage.input_tokens);
        self.total.output_tokens = self.total.output_tokens.saturating_add(usage.output_tokens);
        self.call_count += 1;

        let entry = self.by_stage.entry(stage.to_string()).or_default();
        entry.input_tokens = entry.input_tokens.saturating_add(usage.input_tokens);
        entry.output_tokens = entry.output_tokens.saturating_add(usage.output_tokens);
    }

    pub fn total(&self) -> &TokenUsage {
        &self.total
    }

    pub fn for_stage(&self, stage: &str) -> Option<&TokenUsage> {
        self.by_stage.get(stage)
    }

    /// Total tokens (input + output).
    pub fn total_tokens(&self) -> u64 {
        self.total.total_tokens()
    }

    pub fn call_count(&self) -> u64 {
        self.call_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_per_stage_and_total() {
        let mut tracker = TokenTracker::new();
        tracker.record(
            "summarize",
            &TokenUsage {
                input_tokens: 100,
                output_tokens: 20,
            },
        );
        tracker.record(
            "diagram",
            &TokenUsage {
                input_tokens: 30,
                output_tokens: 40,
            },
        );
        tracker.record(
            "summarize",
            &TokenUsage {
                input_tokens: 1,
                output_tokens: 1,
            },
        );

        assert_eq!(tracker.call_count(), 3);
        assert_eq!(tracker.total_tokens(), 192);
        assert_eq!(tracker.total().input_tokens, 131);
        assert_eq!(tracker.for_stage("summarize").unwrap().output_tokens, 21);
        assert_eq!(tracker.for_stage("diagram").unwrap().input_tokens, 30);
        assert!(tracker.for_stage("respond").is_none());
    }
}
