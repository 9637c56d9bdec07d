//! Persisted item record
//!
//! One [`ItemRecord`] is produced per successfully fetched app and becomes a
//! row of the CSV checkpoint. `appid` is the only dedup key.

mod derive;

pub use derive::{owners_upper_bound, parse_release_year, positive_ratio, price_from_minor};

use serde::{Deserialize, Serialize};

/// Identifier of one app in the upstream universe
pub type CandidateId = u64;

/// Column order of the checkpoint file
pub const CHECKPOINT_HEADER: [&str; 9] = [
    "appid",
    "name",
    "release_year",
    "price_usd",
    "total_reviews",
    "total_positive",
    "positive_ratio",
    "genres",
    "is_multiplayer",
];

/// Review aggregates from the summary endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewCounts {
    pub total: u64,
    pub positive: u64,
}

/// A single harvested app
///
/// Field order matches [`CHECKPOINT_HEADER`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub appid: CandidateId,
    pub name: Option<String>,
    pub release_year: Option<i32>,
    pub price_usd: f64,
    pub total_reviews: Option<u64>,
    pub total_positive: Option<u64>,
    pub positive_ratio: Option<f64>,
    #[serde(with = "pipe_list")]
    pub genres: Vec<String>,
    #[serde(with = "int_flag")]
    pub is_multiplayer: bool,
}

impl ItemRecord {
    /// Fills the review-derived fields
    ///
    /// `None` marks the enrichment as unknown and leaves all three fields
    /// absent.
    pub fn with_reviews(mut self, reviews: Option<ReviewCounts>) -> Self {
        match reviews {
            Some(counts) => {
                self.total_reviews = Some(counts.total);
                self.total_positive = Some(counts.positive);
                self.positive_ratio = positive_ratio(counts.total, counts.positive);
            }
            None => {
                self.total_reviews = None;
                self.total_positive = None;
                self.positive_ratio = None;
            }
        }
        self
    }

    /// Returns true if review aggregates are known for this record
    pub fn has_reviews(&self) -> bool {
        self.total_reviews.is_some()
    }
}

/// Genres are written pipe-joined in a single column
mod pipe_list {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&values.join("|"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(raw
            .split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Booleans are written as `0`/`1`; `true`/`false` is accepted on read
mod int_flag {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim() {
            "1" | "true" | "True" => Ok(true),
            "0" | "false" | "False" | "" => Ok(false),
            other => Err(D::Error::custom(format!("invalid flag value '{}'", other))),
        }
    }
}
