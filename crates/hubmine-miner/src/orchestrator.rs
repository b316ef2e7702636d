//! Mining orchestrator.
//!
//! This module provides the `MiningOrchestrator`, which runs one collection
//! task per entity on a bounded pool, optionally saving every record as soon
//! as it is collected, and reports progress as tasks complete.

use crate::error::Result;
use crate::options::RunOptions;
use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use hubmine_collector::{EntityCollector, Progress};
use hubmine_core::{CollectionMode, EntityId, EntityRecord, MinerConfig};
use hubmine_export::ExportSink;
use hubmine_github::{parse_repo_url, GitHubApi, GitHubClient};
use std::sync::Arc;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

/// Contributor names listed in the progress report before summarizing.
const CONTRIBUTOR_PREVIEW: usize = 10;

/// Success and failure counts of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    successful: usize,
    failed: usize,
}

impl Tally {
    fn done(self) -> usize {
        self.successful + self.failed
    }
}

/// Orchestrates mining across many entities.
pub struct MiningOrchestrator {
    /// Upstream API shared by every task
    api: Arc<dyn GitHubApi>,
    /// Progress reporting
    progress: Progress,
    /// Run-wide cancellation
    cancel: CancellationToken,
    /// Pinned clock for collection windows
    now: Option<DateTime<Utc>>,
}

impl MiningOrchestrator {
    /// Create an orchestrator over `api`.
    #[must_use]
    pub fn new(api: Arc<dyn GitHubApi>) -> Self {
        Self {
            api,
            progress: Progress::silent(),
            cancel: CancellationToken::new(),
            now: None,
        }
    }

    /// Create an orchestrator talking to GitHub as described by `config`.
    pub fn from_config(config: &MinerConfig) -> Result<Self> {
        let client = GitHubClient::new(&config.github)?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Report progress through `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Stop dispatching once `token` is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Pin the clock used by every collection.
    #[must_use]
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// A token that cancels this orchestrator's runs.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Mine every entity in `entities`.
    ///
    /// Options are validated before anything is dispatched. Individual
    /// entity failures are counted and reported, never returned; the result
    /// holds the collected records in completion order.
    pub async fn run(
        &self,
        entities: &[String],
        options: &RunOptions,
    ) -> Result<Vec<EntityRecord>> {
        options.validate()?;

        let sink = options.sink();
        let total = entities.len();
        let collector = Arc::new(self.collector());

        let mut tasks = FuturesUnordered::new();
        let mut records = Vec::new();
        let mut tally = Tally::default();

        for entity in entities {
            if self.cancel.is_cancelled() {
                let pending = total - tally.done() - tasks.len();
                tracing::info!("Run cancelled, {} entities not dispatched", pending);
                break;
            }

            let handle = tokio::spawn(mine_entity(
                Arc::clone(&collector),
                sink.clone(),
                self.progress.clone(),
                entity.clone(),
                options.mode,
            ));
            let entity = entity.clone();
            tasks.push(async move { (entity, handle.await) });

            // Respect concurrency limit
            while tasks.len() >= options.max_workers {
                if let Some((entity, outcome)) = tasks.next().await {
                    self.settle(&entity, outcome, total, &mut tally, &mut records);
                }
            }
        }

        // Collect remaining results
        while let Some((entity, outcome)) = tasks.next().await {
            self.settle(&entity, outcome, total, &mut tally, &mut records);
        }

        let saved = if sink.is_some() { " and saved" } else { "" };
        self.progress.emit(&format!(
            "All data collection completed! {}/{} users successfully processed{}",
            tally.successful, total, saved
        ));
        Ok(records)
    }

    /// Mine the user contributors of a repository.
    ///
    /// `repo_url` must name a GitHub repository
    /// (`https://github.com/<owner>/<repo>[.git]`). A failure to list the
    /// contributors is returned; everything after that behaves like
    /// [`run`](Self::run).
    pub async fn mine_repository_contributors(
        &self,
        repo_url: &str,
        options: &RunOptions,
    ) -> Result<Vec<EntityRecord>> {
        options.validate()?;
        let repo = parse_repo_url(repo_url)?;

        self.progress
            .emit(&format!("Getting contributors for {}", repo.full_name()));
        let contributors: Vec<String> = self
            .api
            .list_contributors(&repo.full_name(), None)
            .await?
            .into_iter()
            .filter(|c| c.is_user())
            .map(|c| c.login)
            .collect();

        let preview: Vec<&str> = contributors
            .iter()
            .take(CONTRIBUTOR_PREVIEW)
            .map(String::as_str)
            .collect();
        self.progress.emit(&format!(
            "Found {} contributors: {}",
            contributors.len(),
            preview.join(", ")
        ));
        if contributors.len() > CONTRIBUTOR_PREVIEW {
            self.progress.emit(&format!(
                "... and {} more",
                contributors.len() - CONTRIBUTOR_PREVIEW
            ));
        }

        if contributors.is_empty() {
            self.progress.emit("No contributors found for this repository");
            return Ok(Vec::new());
        }

        self.progress.emit(&format!(
            "Starting to mine data ({}) for {} contributors...",
            options.mode.fetch_mode().label(),
            contributors.len()
        ));
        let records = self.run(&contributors, options).await?;
        self.progress.emit(&format!(
            "Repository mining completed! {}/{} contributors processed",
            records.len(),
            contributors.len()
        ));
        Ok(records)
    }

    fn collector(&self) -> EntityCollector {
        let collector = EntityCollector::new(Arc::clone(&self.api))
            .with_progress(self.progress.clone())
            .with_cancellation(self.cancel.clone());
        match self.now {
            Some(now) => collector.with_now(now),
            None => collector,
        }
    }

    /// Account for one finished task.
    fn settle(
        &self,
        entity: &str,
        outcome: std::result::Result<Option<EntityRecord>, JoinError>,
        total: usize,
        tally: &mut Tally,
        records: &mut Vec<EntityRecord>,
    ) {
        let (mark, verb) = match outcome {
            Ok(Some(record)) => {
                tally.successful += 1;
                records.push(record);
                ("✓", "Completed")
            }
            Ok(None) => {
                tally.failed += 1;
                ("✗", "Failed")
            }
            Err(e) => {
                tally.failed += 1;
                tracing::error!("Error processing {}: {}", entity, e);
                ("✗", "Failed")
            }
        };

        self.progress.emit(&format!(
            "{mark} {verb} {entity} - Progress: {}/{total} ({} successful, {} failed)",
            tally.done(),
            tally.successful,
            tally.failed
        ));
    }
}

/// One pool task: collect an entity and save it if a sink is configured.
async fn mine_entity(
    collector: Arc<EntityCollector>,
    sink: Option<ExportSink>,
    progress: Progress,
    entity: String,
    mode: CollectionMode,
) -> Option<EntityRecord> {
    let id = match EntityId::new(entity.as_str()) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Error collecting data for {}: {}", entity, e);
            return None;
        }
    };

    progress.emit(&format!(
        "Starting data collection ({}) for {}",
        mode.fetch_mode().label(),
        id
    ));
    let record = collector.collect(&id, mode).await?;

    if let Some(sink) = sink {
        match sink.append_record(record.clone()).await {
            Ok(()) => progress.emit(&format!("Data for {id} collected and saved immediately")),
            Err(e) => tracing::error!("Failed to save data for {}: {}", id, e),
        }
    }
    Some(record)
}
