//! End-to-end decomposition and hot reconfiguration

use crate::config::DecomposeConfig;
use crate::error::DecomposeError;
use crate::extractor::ClaimExtractor;
use crate::oracle::Oracle;
use crate::restorer::SpanRestorer;
use crate::types::Decomposition;
use factlens_domain::traits::LlmProvider;
use std::fmt::Display;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::task::JoinSet;
use tracing::{error, info};

/// Claim extraction followed by span restoration, under one configuration
///
/// The configuration is fixed at construction; build a new pipeline to
/// change it.
pub struct Pipeline<L> {
    provider: Arc<L>,
    config: Arc<DecomposeConfig>,
    extractor: ClaimExtractor<L>,
    restorer: SpanRestorer<L>,
}

impl<L> Pipeline<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Create a pipeline, rejecting an invalid configuration
    pub fn new(provider: Arc<L>, config: DecomposeConfig) -> Result<Self, DecomposeError> {
        config.validate().map_err(DecomposeError::Config)?;

        let config = Arc::new(config);
        let oracle = Oracle::new(Arc::clone(&provider), config.attempt_timeout());
        Ok(Self {
            extractor: ClaimExtractor::from_parts(oracle.clone(), Arc::clone(&config)),
            restorer: SpanRestorer::from_parts(oracle, Arc::clone(&config)),
            provider,
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &DecomposeConfig {
        &self.config
    }

    /// The claim extractor stage
    pub fn extractor(&self) -> &ClaimExtractor<L> {
        &self.extractor
    }

    /// The span restorer stage
    pub fn restorer(&self) -> &SpanRestorer<L> {
        &self.restorer
    }

    /// Decompose `document` into claims anchored to its text
    ///
    /// `usage` is the provider usage observed between start and finish, so it
    /// includes concurrent calls made through the same provider.
    pub async fn decompose(&self, document: &str) -> Decomposition {
        let before = self.provider.usage();

        let report = self.extractor.get_claims_with_report(document).await;
        let claims = self.restorer.restore(document, &report.claims).await;
        let usage = self.provider.usage().since(&before);

        info!(
            "Decomposed document into {} claims from {} ({}), {} oracle request(s), model {}",
            claims.len(),
            report.source,
            if claims.is_clean() { "clean" } else { "partial" },
            usage.requests,
            self.provider.model_name()
        );

        Decomposition {
            claims,
            source: report.source,
            usage,
        }
    }
}

/// Swappable reference to the active [`Pipeline`]
///
/// Each call takes a snapshot of the pipeline when it starts and keeps using
/// it even if [`PipelineHandle::reconfigure`] installs a new one meanwhile.
pub struct PipelineHandle<L> {
    provider: Arc<L>,
    current: RwLock<Arc<Pipeline<L>>>,
}

impl<L> PipelineHandle<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: Display,
{
    /// Create a handle with an initial configuration
    pub fn new(provider: Arc<L>, config: DecomposeConfig) -> Result<Self, DecomposeError> {
        let pipeline = Pipeline::new(Arc::clone(&provider), config)?;
        Ok(Self {
            provider,
            current: RwLock::new(Arc::new(pipeline)),
        })
    }

    /// The currently active pipeline
    pub fn snapshot(&self) -> Arc<Pipeline<L>> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replace the active pipeline with one built from `config`
    ///
    /// The old pipeline stays active if `config` is invalid.
    pub fn reconfigure(&self, config: DecomposeConfig) -> Result<(), DecomposeError> {
        let pipeline = Arc::new(Pipeline::new(Arc::clone(&self.provider), config)?);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = pipeline;
        info!("Pipeline reconfigured");
        Ok(())
    }

    /// Decompose one document with the current pipeline
    pub async fn decompose(&self, document: &str) -> Decomposition {
        self.snapshot().decompose(document).await
    }

    /// Decompose documents concurrently, returning results in input order
    pub async fn decompose_all(&self, documents: Vec<String>) -> Vec<Result<Decomposition, DecomposeError>> {
        let pipeline = self.snapshot();
        let count = documents.len();

        let mut tasks = JoinSet::new();
        for (idx, document) in documents.into_iter().enumerate() {
            let pipeline = Arc::clone(&pipeline);
            tasks.spawn(async move { (idx, pipeline.decompose(&document).await) });
        }

        let mut results: Vec<Result<Decomposition, DecomposeError>> = (0..count)
            .map(|_| Err(DecomposeError::Task("decomposition did not complete".to_string())))
            .collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, decomposition)) => results[idx] = Ok(decomposition),
                Err(e) => error!("Decomposition task failed: {}", e),
            }
        }
        results
    }
}
