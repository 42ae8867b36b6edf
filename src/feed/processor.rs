//! Batch processing in two phases.
//!
//! Phase one prepares every feed without network access: defaults, link
//! synthesis and timestamp resolution against the raw batch. Phase two probes
//! link metadata for a bounded number of feeds at a time and keeps input order.

use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use thiserror::Error;

use super::defaults::{apply_defaults, synthesize_links};
use super::enrich::{enrich_entries, ProbeError, DEFAULT_PROBE_TIMEOUT};
use super::timestamps::{resolve_updated, FeedIndex};
use super::types::{Batch, Feed};

/// Feeds enriched at the same time unless configured otherwise.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Errors that abort processing of a batch.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// A link metadata probe failed
    #[error("Enrichment of feed `{feed_id}` failed: {source}")]
    Enrichment { feed_id: String, source: ProbeError },
}

/// Tuning knobs for [`process_batch`].
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Upper bound for each HEAD probe.
    pub probe_timeout: Duration,
    /// Number of feeds enriched concurrently (minimum 1).
    pub concurrency: usize,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Applies every processing step that needs no network access.
///
/// Defaults are merged, shorthand links synthesized (which clears the
/// shorthand slots and stamps language tags), then timestamps resolved
/// against `index`. The input feed is not modified.
pub fn prepare_feed(feed: &Feed, index: &FeedIndex<'_>) -> Feed {
    let mut feed = feed.clone();
    apply_defaults(&mut feed);
    synthesize_links(&mut feed);
    resolve_updated(&mut feed, index);
    feed
}

/// Fully processes a single feed: [`prepare_feed`] followed by link
/// enrichment.
pub async fn process_feed(
    client: &reqwest::Client,
    feed: &Feed,
    index: &FeedIndex<'_>,
    options: &ProcessOptions,
) -> Result<Feed, ProcessError> {
    let prepared = prepare_feed(feed, index);
    enrich_feed(client, prepared, options.probe_timeout).await
}

/// Processes every feed of `batch`, returning them in input order.
///
/// Runs in two phases. The first resolves timestamps for all feeds against
/// the untouched batch, so no feed ever observes another feed's processed
/// state. The second probes link metadata, up to `options.concurrency`
/// feeds at a time. The first probe failure aborts the whole batch.
pub async fn process_batch(
    client: &reqwest::Client,
    batch: &Batch,
    options: &ProcessOptions,
) -> Result<Vec<Feed>, ProcessError> {
    let index = FeedIndex::new(&batch.feeds);
    let prepared: Vec<Feed> = batch
        .feeds
        .iter()
        .map(|feed| prepare_feed(feed, &index))
        .collect();

    tracing::debug!(
        feeds = prepared.len(),
        concurrency = options.concurrency,
        "Prepared batch, enriching links"
    );

    let timeout = options.probe_timeout;
    stream::iter(prepared)
        .map(|feed| enrich_feed(client, feed, timeout))
        .buffered(options.concurrency.max(1))
        .try_collect::<Vec<Feed>>()
        .await
}

async fn enrich_feed(
    client: &reqwest::Client,
    mut feed: Feed,
    timeout: Duration,
) -> Result<Feed, ProcessError> {
    match enrich_entries(client, &mut feed.entries, timeout).await {
        Ok(0) => Ok(feed),
        Ok(probed) => {
            tracing::info!(feed = %feed.id, links = probed, "Enriched link metadata");
            Ok(feed)
        }
        Err(source) => {
            tracing::error!(feed = %feed.id, error = %source, "Link enrichment failed");
            Err(ProcessError::Enrichment {
                feed_id: feed.id,
                source,
            })
        }
    }
}
