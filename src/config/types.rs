use serde::Deserialize;

/// Browser-identifying string sent on every outbound request
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Main configuration structure for Jar-Harvest
///
/// Every section is optional in the TOML file; missing keys fall back to the
/// values the catalog is known to need.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub http: HttpConfig,
    pub scheduler: SchedulerConfig,
    pub output: OutputConfig,
}

/// Where the catalog lives and how its pages are read
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Scheme and host of the catalog site
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Token identifying device-specific content on a catalog page
    #[serde(rename = "device-tag")]
    pub device_tag: String,

    /// Path fragment every download link contains
    #[serde(rename = "download-path")]
    pub download_path: String,

    /// Class of the container elements listing alternative downloads
    #[serde(rename = "marker-class")]
    pub marker_class: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://dedomil.net".to_string(),
            device_tag: "K800i".to_string(),
            download_path: "/download-jar/".to_string(),
            marker_class: "LOAD".to_string(),
        }
    }
}

/// Outbound request settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Timeout for catalog page fetches (seconds)
    #[serde(rename = "page-timeout-secs")]
    pub page_timeout_secs: u64,

    /// Timeout for archive fetches (seconds)
    #[serde(rename = "download-timeout-secs")]
    pub download_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_timeout_secs: 60,
            download_timeout_secs: 10,
        }
    }
}

/// Worker pool settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Maximum number of identifiers processed concurrently
    #[serde(rename = "max-workers")]
    pub max_workers: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { max_workers: 20 }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory downloaded archives are written into
    #[serde(rename = "content-dir")]
    pub content_dir: String,

    /// Extension appended to every downloaded archive
    #[serde(rename = "archive-extension")]
    pub archive_extension: String,

    /// Directory run logs are written into
    #[serde(rename = "log-dir")]
    pub log_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            content_dir: "jar".to_string(),
            archive_extension: "jar".to_string(),
            log_dir: ".".to_string(),
        }
    }
}
