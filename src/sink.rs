use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde_json::json;
use tracing::{info, warn};

use crate::model::CatalogEntry;

pub const DEFAULT_BATCH_SIZE: usize = 100;
const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 2000;
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Outcome of a push run. Failed batch indices are 1-based so the caller
/// can re-run exactly the missing ranges.
pub struct PushReport {
    pub batches_ok: usize,
    pub batches_failed: usize,
    pub rows_sent: usize,
    pub failed_batches: Vec<usize>,
}

impl PushReport {
    pub fn print(&self) {
        println!(
            "Pushed {} rows in {} batches ({} ok, {} failed).",
            self.rows_sent,
            self.batches_ok + self.batches_failed,
            self.batches_ok,
            self.batches_failed
        );
        if !self.failed_batches.is_empty() {
            println!("Failed batches: {:?}", self.failed_batches);
        }
    }
}

/// Client for the hosted datastore's bulk-upsert endpoint. The sink does
/// not enforce uniqueness; deduplication has already happened upstream.
pub struct SinkClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl SinkClient {
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("AIVERSE_SINK_URL")
            .context("AIVERSE_SINK_URL environment variable must be set")?;
        let api_key = std::env::var("AIVERSE_API_KEY")
            .context("AIVERSE_API_KEY environment variable must be set")?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(SinkClient { client, url, api_key })
    }

    /// Upsert entries in fixed-size batches. A failing batch is logged and
    /// skipped; later batches still run, and already-committed batches are
    /// never rolled back.
    pub async fn push(&self, entries: &[CatalogEntry], batch_size: usize) -> Result<PushReport> {
        if batch_size == 0 {
            bail!("batch size must be positive");
        }

        let mut report = PushReport {
            batches_ok: 0,
            batches_failed: 0,
            rows_sent: 0,
            failed_batches: Vec::new(),
        };

        let total_batches = entries.len().div_ceil(batch_size);
        for (index, batch) in entries.chunks(batch_size).enumerate() {
            match self.push_batch_with_retry(index, batch).await {
                Ok(()) => {
                    info!(
                        "Batch {}/{} upserted ({} rows)",
                        index + 1,
                        total_batches,
                        batch.len()
                    );
                    report.batches_ok += 1;
                    report.rows_sent += batch.len();
                }
                Err(e) => {
                    warn!("Batch {}/{} failed: {}", index + 1, total_batches, e);
                    report.batches_failed += 1;
                    report.failed_batches.push(index + 1);
                }
            }
        }

        Ok(report)
    }

    async fn push_batch_with_retry(&self, index: usize, batch: &[CatalogEntry]) -> Result<()> {
        let mut attempt = 0;
        loop {
            let err = match self.push_batch(batch).await {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };

            if attempt >= MAX_RETRIES || !should_retry(&err.to_string()) {
                return Err(err);
            }

            let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
            warn!(
                "Batch {} attempt {}/{} failed ({}), backing off {:.1}s",
                index + 1,
                attempt + 1,
                MAX_RETRIES,
                err,
                backoff.as_secs_f64()
            );
            tokio::time::sleep(backoff).await;
            attempt += 1;
        }
    }

    async fn push_batch(&self, batch: &[CatalogEntry]) -> Result<()> {
        let rows: Vec<serde_json::Value> = batch.iter().map(flat_row).collect();

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&json!({ "tools": rows }))
            .send()
            .await
            .context("Bulk upsert request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Sink returned {}: {}", status, body);
        }
        Ok(())
    }
}

/// Transient statuses worth retrying; anything else fails the batch.
fn should_retry(error: &str) -> bool {
    error.contains("429")
        || error.contains("500")
        || error.contains("502")
        || error.contains("503")
        || error.contains("timed out")
}

/// Flatten an entry to the sink's row shape.
fn flat_row(entry: &CatalogEntry) -> serde_json::Value {
    json!({
        "id": entry.id,
        "name": entry.name,
        "description": entry.description,
        "link": entry.link,
        "category": entry.category,
        "logo_url": entry.logo_url,
        "screenshot_url": entry.screenshot_url,
        "featured": entry.featured,
        "popularity_score": entry.popularity_score,
        "source": entry.source,
    })
}

// ── Tests ──
