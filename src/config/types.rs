use serde::Deserialize;
use std::time::Duration;

/// Public SteamSpy bulk listing
pub const DEFAULT_LISTING_URL: &str = "https://steamspy.com/api.php?request=all";

/// Public Steam Store metadata endpoint; `{appid}` is substituted per item
pub const DEFAULT_DETAILS_URL: &str =
    "https://store.steampowered.com/api/appdetails?appids={appid}&cc=us&l=en";

/// Public Steam review summary endpoint; `{appid}` is substituted per item
pub const DEFAULT_REVIEWS_URL: &str =
    "https://store.steampowered.com/appreviews/{appid}?json=1&filter=summary";

/// Main configuration structure for Steam-Harvest
///
/// Every table is optional in the TOML file; missing tables take defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoints: EndpointConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Upstream endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Bulk listing returning a mapping of appid -> metadata
    #[serde(rename = "listing-url")]
    pub listing_url: String,

    /// Metadata endpoint template containing `{appid}`
    #[serde(rename = "details-url")]
    pub details_url: String,

    /// Review summary endpoint template containing `{appid}`
    #[serde(rename = "reviews-url")]
    pub reviews_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            details_url: DEFAULT_DETAILS_URL.to_string(),
            reviews_url: DEFAULT_REVIEWS_URL.to_string(),
        }
    }
}

impl EndpointConfig {
    /// Expands the metadata template for one app
    pub fn details_url_for(&self, appid: u64) -> String {
        self.details_url.replace("{appid}", &appid.to_string())
    }

    /// Expands the review summary template for one app
    pub fn reviews_url_for(&self, appid: u64) -> String {
        self.reviews_url.replace("{appid}", &appid.to_string())
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of top-ranked candidates to consider
    #[serde(rename = "top-n")]
    pub top_n: usize,

    /// Base interval between item fetches (seconds, fractional)
    #[serde(rename = "sleep-secs")]
    pub sleep_secs: f64,

    /// Total attempts per item, including the first
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Timeout for the bulk listing request (seconds)
    #[serde(rename = "listing-timeout-secs")]
    pub listing_timeout_secs: u64,

    /// Timeout for each detail or summary request (seconds)
    #[serde(rename = "detail-timeout-secs")]
    pub detail_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            top_n: 1000,
            sleep_secs: 0.3,
            max_attempts: 3,
            listing_timeout_secs: 30,
            detail_timeout_secs: 20,
        }
    }
}

impl CrawlerConfig {
    /// Base interval as a duration
    pub fn sleep_interval(&self) -> Duration {
        Duration::from_secs_f64(self.sleep_secs.max(0.0))
    }

    pub fn listing_timeout(&self) -> Duration {
        Duration::from_secs(self.listing_timeout_secs)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_secs)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "steam-harvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/steam-harvest".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the header value as `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the CSV checkpoint
    #[serde(rename = "csv-path")]
    pub csv_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: "data/steam_games.csv".to_string(),
        }
    }
}
