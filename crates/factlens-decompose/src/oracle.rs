//! Async, time-bounded access to a synchronous oracle

use crate::error::DecomposeError;
use factlens_domain::traits::LlmProvider;
use factlens_domain::TokenUsage;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Shared oracle client with a per-call timeout
///
/// Calls run on tokio's blocking pool. When the timeout fires, the call is
/// abandoned (its thread finishes on its own) and reported as
/// [`DecomposeError::Timeout`].
pub struct Oracle<L> {
    provider: Arc<L>,
    timeout: Duration,
}

impl<L> Clone for Oracle<L> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            timeout: self.timeout,
        }
    }
}

impl<L> Oracle<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Wrap `provider`, bounding every call by `timeout`
    pub fn new(provider: Arc<L>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Send one prompt with the given sampling seed
    pub async fn call(&self, prompt: &str, seed: u64) -> Result<String, DecomposeError> {
        let llm = Arc::clone(&self.provider);
        let prompt = prompt.to_string();

        // Call in a blocking context since LlmProvider is not async
        let task = tokio::task::spawn_blocking(move || {
            llm.generate(&prompt, seed)
                .map_err(|e| DecomposeError::Llm(e.to_string()))
        });

        let response = timeout(self.timeout, task)
            .await
            .map_err(|_| DecomposeError::Timeout(self.timeout))?
            .map_err(|e| DecomposeError::Llm(format!("Task join error: {}", e)))??;

        debug!("Oracle response length: {} chars (seed {})", response.len(), seed);
        Ok(response)
    }

    /// Cumulative usage reported by the provider
    pub fn usage(&self) -> TokenUsage {
        self.provider.usage()
    }

    /// Model identifier of the provider
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }
}
