//! Token accounting reported by oracle providers

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Cumulative token usage of an oracle client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed by prompts
    pub prompt_tokens: u64,

    /// Tokens produced by completions
    pub completion_tokens: u64,

    /// Number of requests sent
    pub requests: u64,
}

impl TokenUsage {
    /// Total tokens in both directions
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }

    /// Usage accrued since an earlier snapshot
    pub fn since(&self, earlier: &TokenUsage) -> TokenUsage {
        TokenUsage {
            prompt_tokens: self.prompt_tokens.saturating_sub(earlier.prompt_tokens),
            completion_tokens: self.completion_tokens.saturating_sub(earlier.completion_tokens),
            requests: self.requests.saturating_sub(earlier.requests),
        }
    }
}

impl Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, rhs: TokenUsage) -> TokenUsage {
        TokenUsage {
            prompt_tokens: self.prompt_tokens + rhs.prompt_tokens,
            completion_tokens: self.completion_tokens + rhs.completion_tokens,
            requests: self.requests + rhs.requests,
        }
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: TokenUsage) {
        *self = *self + rhs;
    }
}
