//! Token usage accounting for LLM operations.

use serde::{Deserialize, Serialize};

/// Token usage statistics for a single LLM operation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_getters::Getters,
)]
pub struct TokenUsage {
    /// Tokens in the prompt/input.
    prompt_tokens: usize,
    /// Tokens in the response/output.
    completion_tokens: usize,
    /// Total tokens (prompt + completion).
    total_tokens: usize,
}

impl TokenUsage {
    /// Create a new token usage record.
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    /// Accumulate another usage record into this one.
    pub fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }

    /// Calculate cost in USD based on pricing per million tokens.
    ///
    /// # Arguments
    ///
    /// * `prompt_price_per_million` - Cost per million prompt tokens in USD
    /// * `completion_price_per_million` - Cost per million completion tokens in USD
    pub fn calculate_cost(
        &self,
        prompt_price_per_million: f64,
        completion_price_per_million: f64,
    ) -> f64 {
        let prompt_cost = (self.prompt_tokens as f64 / 1_000_000.0) * prompt_price_per_million;
        let completion_cost =
            (self.completion_tokens as f64 / 1_000_000.0) * completion_price_per_million;
        prompt_cost + completion_cost
    }
}
