//! Ranked candidate population
//!
//! The bulk listing is a JSON object keyed by appid. Each entry carries an
//! `owners` range such as `"20,000 .. 50,000"`; candidates are ranked by the
//! upper bound of that range, descending. Ties keep listing order.

use crate::crawler::fetcher::{JsonTransport, TransportError};
use crate::record::{owners_upper_bound, CandidateId};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failure to build the candidate population
///
/// Always fatal to the run: a partial ranking is never used.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("listing request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("listing is not a JSON object keyed by appid (got {found})")]
    NotAMapping { found: &'static str },
}

/// One listing entry with its popularity metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedCandidate {
    pub appid: CandidateId,
    pub owners: u64,
}

/// Produces the top-N candidate ids from the bulk listing
pub struct RankedPopulationSource {
    transport: Arc<dyn JsonTransport>,
    listing_url: String,
    timeout: Duration,
}

impl RankedPopulationSource {
    pub fn new(transport: Arc<dyn JsonTransport>, listing_url: String, timeout: Duration) -> Self {
        Self {
            transport,
            listing_url,
            timeout,
        }
    }

    /// Fetches the listing and returns at most `n` ids, most owned first
    pub async fn list_top_n(&self, n: usize) -> Result<Vec<CandidateId>, SourceError> {
        tracing::info!("Fetching population listing from {}", self.listing_url);
        let listing = self
            .transport
            .get_json(&self.listing_url, self.timeout)
            .await?;

        let ranked = rank_listing(&listing)?;
        tracing::info!(
            "Listing holds {} candidates; keeping the top {}",
            ranked.len(),
            n.min(ranked.len())
        );

        Ok(ranked.into_iter().take(n).map(|c| c.appid).collect())
    }
}

/// Ranks every entry of a listing by owners, descending
///
/// The sort is stable, so entries with equal owners keep listing order. Keys
/// that are not positive integers are skipped; a malformed or missing
/// `owners` value ranks as 0.
pub fn rank_listing(listing: &Value) -> Result<Vec<RankedCandidate>, SourceError> {
    let entries = as_mapping(listing)?;

    let mut ranked: Vec<RankedCandidate> = entries
        .iter()
        .filter_map(|(key, entry)| {
            let appid = match key.trim().parse::<CandidateId>() {
                Ok(id) if id > 0 => id,
                _ => {
                    tracing::debug!("Skipping listing key '{}': not an appid", key);
                    return None;
                }
            };
            Some(RankedCandidate {
                appid,
                owners: owners_metric(entry),
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.owners.cmp(&a.owners));
    Ok(ranked)
}

fn as_mapping(listing: &Value) -> Result<&Map<String, Value>, SourceError> {
    listing.as_object().ok_or(SourceError::NotAMapping {
        found: json_kind(listing),
    })
}

/// Reads the popularity metric of one entry
fn owners_metric(entry: &Value) -> u64 {
    match entry.get("owners") {
        Some(Value::String(range)) => owners_upper_bound(range),
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        _ => 0,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
