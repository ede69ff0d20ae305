//! Startup ingestion: cache first, network as fallback, then write-back.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{Instrument, error, info, info_span, instrument, warn};

use crate::cache::{CacheError, CacheFile};
use crate::store::{Entry, SectionRegistry};

/// Where section questions come from on a cold start.
///
/// Implementations must not fail: problems are logged and reported as an
/// empty list so one broken page never blocks the other sections.
#[async_trait]
pub trait QuestionSource: Send + Sync + 'static {
    async fn fetch_entries(&self, url: &str) -> Vec<Entry>;
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("question cache failure: {0}")]
    Cache(#[from] CacheError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Cache,
    Network,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Cache => f.write_str("cache"),
            Origin::Network => f.write_str("network"),
        }
    }
}

/// Summary of one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub origin: Origin,
    pub sections: usize,
    pub questions: usize,
    pub empty_sections: Vec<String>,
}

impl IngestReport {
    fn new(origin: Origin, registry: &SectionRegistry) -> Self {
        Self {
            origin,
            sections: registry.len(),
            questions: registry.question_count(),
            empty_sections: registry
                .iter()
                .filter(|s| s.is_empty())
                .map(|s| s.key.clone())
                .collect(),
        }
    }
}

pub struct Ingestor {
    source: Arc<dyn QuestionSource>,
    cache: CacheFile,
    concurrency: usize,
}

impl Ingestor {
    /// `concurrency` bounds parallel section fetches; `1` fetches sequentially.
    pub fn new(source: Arc<dyn QuestionSource>, cache: CacheFile, concurrency: usize) -> Self {
        Self {
            source,
            cache,
            concurrency: concurrency.max(1),
        }
    }

    pub fn cache(&self) -> &CacheFile {
        &self.cache
    }

    /// Populate every section once.
    ///
    /// With `force_refresh` the cache file is deleted and the network is
    /// always used. Otherwise a readable cache wins and the network is not
    /// touched. After a network pass the cache is rewritten; failing to write
    /// it is the only error this returns.
    #[instrument(skip(self, registry))]
    pub async fn ingest(
        &self,
        registry: &mut SectionRegistry,
        force_refresh: bool,
    ) -> Result<IngestReport, IngestError> {
        if force_refresh {
            self.cache.remove().await?;
        } else if self.cache.load(registry).await {
            let report = IngestReport::new(Origin::Cache, registry);
            info!(questions = report.questions, "questions served from cache");
            return Ok(report);
        }

        self.fetch_all(registry).await;
        self.cache.save(registry).await?;

        let report = IngestReport::new(Origin::Network, registry);
        if !report.empty_sections.is_empty() {
            warn!(
                sections = ?report.empty_sections,
                "some sections have no questions"
            );
        }
        info!(questions = report.questions, "questions fetched from network");
        Ok(report)
    }

    /// Fetch all sections concurrently and assign results by key.
    ///
    /// Results are gathered before any are applied, so the outcome does not
    /// depend on which fetch finishes first.
    async fn fetch_all(&self, registry: &mut SectionRegistry) {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for section in registry.iter() {
            let key = section.key.clone();
            let url = section.url.clone();
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            let span = info_span!("section", key = %key);

            tasks.spawn(
                async move {
                    // The semaphore is never closed.
                    let _permit = semaphore.acquire_owned().await.ok();
                    let entries = source.fetch_entries(&url).await;
                    info!(count = entries.len(), "section fetched");
                    (key, entries)
                }
                .instrument(span),
            );
        }

        let mut fetched: HashMap<String, Vec<Entry>> = HashMap::with_capacity(registry.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((key, entries)) => {
                    fetched.insert(key, entries);
                }
                Err(e) => error!(error = %e, "section fetch task failed"),
            }
        }

        for (key, entries) in fetched {
            registry.set_entries(&key, entries);
        }
    }
}
