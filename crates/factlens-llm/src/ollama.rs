//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local LLM API as the decomposition oracle.
//!
//! # Features
//!
//! - Async HTTP communication with Ollama API
//! - Per-call sampling seed and low temperature for reproducible retries
//! - JSON-oriented system prompt
//! - Token usage accounting from `prompt_eval_count` / `eval_count`
//! - Shared outbound rate limiter
//!
//! # Examples
//!
//! ```no_run
//! use factlens_llm::OllamaProvider;
//! use factlens_domain::traits::LlmProvider;
//!
//! let provider = OllamaProvider::new("http://localhost:11434", "llama3.1")?;
//! let text = provider.generate("Say hello as JSON", 42)?;
//! println!("{} ({} tokens so far)", text, provider.usage().total_tokens());
//! # Ok::<(), factlens_llm::LlmError>(())
//! ```

use crate::rate_limit::RateLimiter;
use crate::LlmError;
use factlens_domain::traits::LlmProvider as LlmProviderTrait;
use factlens_domain::TokenUsage;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default model
pub const DEFAULT_MODEL: &str = "llama3.1";

/// Default timeout for LLM requests (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default number of transport attempts per call
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Default system role sent with every prompt
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant designed to output JSON.";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Connection and sampling settings for [`OllamaProvider`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama API endpoint
    pub endpoint: String,

    /// Model to use
    pub model: String,

    /// System role prepended to every prompt
    pub system_prompt: String,

    /// Sampling temperature
    pub temperature: f32,

    /// HTTP timeout per request (seconds)
    pub timeout_secs: u64,

    /// Maximum requests per rate window (0 disables limiting)
    pub requests_per_window: usize,

    /// Rate window length (seconds)
    pub window_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            requests_per_window: 15,
            window_secs: 60,
        }
    }
}

/// Ollama API provider for local LLM inference
///
/// This provider communicates with a local Ollama instance to generate text.
pub struct OllamaProvider {
    endpoint: String,
    model: String,
    system_prompt: String,
    temperature: f32,
    client: reqwest::Client,
    max_retries: u32,
    limiter: Arc<RateLimiter>,
    usage: Mutex<TokenUsage>,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    seed: u64,
    temperature: f32,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[serde(default)]
    prompt_eval_count: u64,
    #[serde(default)]
    eval_count: u64,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3.1", "mistral")
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::from_config(&OllamaConfig {
            endpoint: endpoint.into(),
            model: model.into(),
            ..OllamaConfig::default()
        })
    }

    /// Create a new Ollama provider with default settings
    ///
    /// Uses `http://localhost:11434` as endpoint and requires a model name.
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Create a provider from a full configuration
    pub fn from_config(config: &OllamaConfig) -> Result<Self, LlmError> {
        // Calls may be driven by short-lived runtimes, so never keep idle
        // connections bound to a runtime that is gone.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
            temperature: config.temperature,
            client,
            max_retries: DEFAULT_MAX_RETRIES,
            limiter: Arc::new(RateLimiter::new(
                config.requests_per_window,
                Duration::from_secs(config.window_secs),
            )),
            usage: Mutex::new(TokenUsage::default()),
        })
    }

    /// Set the maximum number of transport attempts per call
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    /// Share a rate limiter with other clients of the same service
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Generate text using Ollama API
    ///
    /// # Parameters
    ///
    /// - `prompt`: Input prompt text
    /// - `seed`: Sampling seed
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Ollama is not running
    /// - Model is not available
    /// - Network communication fails
    /// - Response format is invalid
    pub async fn generate_async(&self, prompt: &str, seed: u64) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);

        let request_body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            system: &self.system_prompt,
            stream: false,
            options: OllamaOptions {
                seed,
                temperature: self.temperature,
            },
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_retries {
            self.wait_for_slot().await;

            match self.client.post(&url).json(&request_body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response.json::<OllamaGenerateResponse>().await.map_err(|e| {
                            LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                        })?;
                        self.record_usage(&body);
                        debug!(
                            "Ollama returned {} chars (seed {})",
                            body.response.len(),
                            seed
                        );
                        return Ok(body.response);
                    } else if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(LlmError::ModelNotAvailable(self.model.clone()));
                    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(LlmError::RateLimitExceeded);
                    } else {
                        let error_text = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Unknown error".to_string());
                        last_error = Some(LlmError::Communication(format!(
                            "HTTP {}: {}",
                            status, error_text
                        )));
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!("Ollama request failed, retrying in {:?}", delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }

    async fn wait_for_slot(&self) {
        while let Err(wait) = self.limiter.try_acquire() {
            debug!("Rate limit reached, waiting {:?}", wait);
            tokio::time::sleep(wait.max(Duration::from_millis(1))).await;
        }
    }

    fn record_usage(&self, body: &OllamaGenerateResponse) {
        let mut usage = self.usage.lock().unwrap_or_else(PoisonError::into_inner);
        *usage += TokenUsage {
            prompt_tokens: body.prompt_eval_count,
            completion_tokens: body.eval_count,
            requests: 1,
        };
    }
}

impl LlmProviderTrait for OllamaProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str, seed: u64) -> Result<String, Self::Error> {
        // Blocking wrapper: callers inside a runtime must be on a blocking
        // thread (spawn_blocking), where the ambient handle can drive the call.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle.block_on(self.generate_async(prompt, seed)),
            Err(_) => tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))?
                .block_on(self.generate_async(prompt, seed)),
        }
    }

    fn usage(&self) -> TokenUsage {
        *self.usage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
