//! Numeric and text derivations applied when building an [`ItemRecord`]
//!
//! [`ItemRecord`]: crate::record::ItemRecord

/// Extracts the first four-digit token from a free-text release date
///
/// Tokens are separated by whitespace or commas, so "21 Mar, 2015" and
/// "Mar 21,2015" both yield 2015. Returns `None` when no token qualifies.
pub fn parse_release_year(raw: &str) -> Option<i32> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .find(|token| token.len() == 4 && token.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|token| token.parse().ok())
}

/// Converts a minor-unit price into major units
///
/// A missing price block is treated as 0. Negative inputs clamp to 0.
pub fn price_from_minor(minor: Option<i64>) -> f64 {
    minor.map(|cents| cents.max(0) as f64 / 100.0).unwrap_or(0.0)
}

/// Share of positive reviews, rounded to four decimal places
///
/// `None` when `total` is zero: no reviews is not the same as no positive
/// reviews.
pub fn positive_ratio(total: u64, positive: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }

    let ratio = positive.min(total) as f64 / total as f64;
    Some((ratio * 10_000.0).round() / 10_000.0)
}

/// Parses the upper bound of a SteamSpy owners range
///
/// "20,000 .. 50,000" yields 50000. Anything unparsable ranks as 0 so a bad
/// entry sinks to the bottom instead of failing the whole listing.
pub fn owners_upper_bound(raw: &str) -> u64 {
    let upper = raw.rsplit("..").next().unwrap_or("").trim();
    let digits: String = upper.chars().filter(|c| *c != ',').collect();

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }

    digits.parse().unwrap_or(0)
}
