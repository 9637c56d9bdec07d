//! Per-app detail fetching
//!
//! A record is composed from two independent calls:
//!
//! 1. Metadata (`appdetails`): must report `success: true`, otherwise the
//!    whole app is `NotFound`. Identity and price come only from here, so a
//!    record is either complete or not emitted at all.
//! 2. Review summary (`appreviews`): best effort. A failure downgrades the
//!    review fields to unknown and the record is still returned.

use crate::config::EndpointConfig;
use crate::crawler::fetcher::JsonTransport;
use crate::crawler::retry::FetchOutcome;
use crate::record::{parse_release_year, price_from_minor, CandidateId, ItemRecord, ReviewCounts};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Category description that marks multiplayer support
const MULTIPLAYER_CATEGORY: &str = "Multi-player";

/// Result of the review summary sub-fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Known(ReviewCounts),
    Unknown(String),
}

impl SummaryOutcome {
    pub fn counts(&self) -> Option<ReviewCounts> {
        match self {
            Self::Known(counts) => Some(*counts),
            Self::Unknown(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AppDetailsEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct AppData {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    release_date: Option<ReleaseDate>,
    #[serde(default)]
    price_overview: Option<PriceOverview>,
    #[serde(default)]
    genres: Vec<Description>,
    #[serde(default)]
    categories: Vec<Description>,
}

#[derive(Debug, Deserialize)]
struct ReleaseDate {
    #[serde(default)]
    date: String,
}

#[derive(Debug, Deserialize)]
struct PriceOverview {
    #[serde(default)]
    initial: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Description {
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ReviewEnvelope {
    #[serde(default)]
    query_summary: QuerySummary,
}

#[derive(Debug, Default, Deserialize)]
struct QuerySummary {
    #[serde(default)]
    total_reviews: u64,
    #[serde(default)]
    total_positive: u64,
}

/// Fetches and assembles [`ItemRecord`]s
pub struct DetailFetcher {
    transport: Arc<dyn JsonTransport>,
    endpoints: EndpointConfig,
    timeout: Duration,
}

impl DetailFetcher {
    pub fn new(transport: Arc<dyn JsonTransport>, endpoints: EndpointConfig, timeout: Duration) -> Self {
        Self {
            transport,
            endpoints,
            timeout,
        }
    }

    /// Fetches one app's full record
    ///
    /// The summary is only requested once the metadata call succeeded.
    pub async fn fetch_detail(&self, appid: CandidateId) -> FetchOutcome<ItemRecord> {
        let record = match self.fetch_metadata(appid).await {
            FetchOutcome::Success(record) => record,
            FetchOutcome::NotFound => return FetchOutcome::NotFound,
            FetchOutcome::Transient(error) => return FetchOutcome::Transient(error),
        };

        let summary = self.fetch_summary(appid).await;
        if let SummaryOutcome::Unknown(reason) = &summary {
            tracing::warn!("Review summary for {} unavailable: {}", appid, reason);
        }

        FetchOutcome::Success(record.with_reviews(summary.counts()))
    }

    /// Fetches the metadata block and maps it onto a record without reviews
    pub async fn fetch_metadata(&self, appid: CandidateId) -> FetchOutcome<ItemRecord> {
        let url = self.endpoints.details_url_for(appid);
        match self.transport.get_json(&url, self.timeout).await {
            Ok(body) => parse_metadata(appid, &body),
            Err(e) if e.is_definitive_absence() => FetchOutcome::NotFound,
            Err(e) => FetchOutcome::Transient(e.to_string()),
        }
    }

    /// Fetches the review aggregates
    pub async fn fetch_summary(&self, appid: CandidateId) -> SummaryOutcome {
        let url = self.endpoints.reviews_url_for(appid);
        match self.transport.get_json(&url, self.timeout).await {
            Ok(body) => parse_summary(&body),
            Err(e) => SummaryOutcome::Unknown(e.to_string()),
        }
    }
}

/// Maps an `appdetails` response onto a record
///
/// The response is keyed by the appid as a string. A missing key or a false
/// `success` flag means the app is absent (delisted, region-locked, unknown).
fn parse_metadata(appid: CandidateId, body: &Value) -> FetchOutcome<ItemRecord> {
    let Some(entries) = body.as_object() else {
        return FetchOutcome::Transient(format!("metadata for {} is not a JSON object", appid));
    };

    let Some(entry) = entries.get(&appid.to_string()) else {
        tracing::debug!("Metadata response has no entry for {}", appid);
        return FetchOutcome::NotFound;
    };

    let envelope: AppDetailsEnvelope = match serde_json::from_value(entry.clone()) {
        Ok(envelope) => envelope,
        Err(e) => return FetchOutcome::Transient(format!("bad envelope for {}: {}", appid, e)),
    };

    if !envelope.success {
        return FetchOutcome::NotFound;
    }

    let Some(data) = envelope.data else {
        return FetchOutcome::Transient(format!("metadata for {} has no data block", appid));
    };

    let data: AppData = match serde_json::from_value(data) {
        Ok(data) => data,
        Err(e) => return FetchOutcome::Transient(format!("bad data block for {}: {}", appid, e)),
    };

    let is_multiplayer = data
        .categories
        .iter()
        .any(|c| c.description.as_deref() == Some(MULTIPLAYER_CATEGORY));

    FetchOutcome::Success(ItemRecord {
        appid,
        name: data.name.filter(|n| !n.trim().is_empty()),
        release_year: data
            .release_date
            .as_ref()
            .and_then(|r| parse_release_year(&r.date)),
        price_usd: price_from_minor(data.price_overview.and_then(|p| p.initial)),
        total_reviews: None,
        total_positive: None,
        positive_ratio: None,
        genres: data
            .genres
            .into_iter()
            .filter_map(|g| g.description)
            .filter(|g| !g.is_empty())
            .collect(),
        is_multiplayer,
    })
}

/// Maps an `appreviews` summary response onto review counts
///
/// A missing `query_summary` (or missing counts inside it) reads as zero.
fn parse_summary(body: &Value) -> SummaryOutcome {
    if !body.is_object() {
        return SummaryOutcome::Unknown("review summary is not a JSON object".to_string());
    }

    let envelope: ReviewEnvelope = match serde_json::from_value(body.clone()) {
        Ok(envelope) => envelope,
        Err(e) => return SummaryOutcome::Unknown(format!("bad review summary: {}", e)),
    };

    let summary = envelope.query_summary;
    if summary.total_positive > summary.total_reviews {
        tracing::debug!(
            "Clamping total_positive {} to total_reviews {}",
            summary.total_positive,
            summary.total_reviews
        );
    }

    SummaryOutcome::Known(ReviewCounts {
        total: summary.total_reviews,
        positive: summary.total_positive.min(summary.total_reviews),
    })
}
