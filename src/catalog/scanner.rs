//! Catalog scanner - processes a single catalog identifier
//!
//! One scan fetches the catalog page, runs the content selector, downloads
//! the chosen archive and reports exactly one `OutcomeRecord`. Every failure
//! along the way is folded into that record; nothing propagates to the caller.

use crate::catalog::downloader::Downloader;
use crate::catalog::fetcher::{fetch_url, FetchResult};
use crate::catalog::selector::{CandidateLink, ContentSelector, Selection};
use crate::config::Config;
use crate::state::OutcomeRecord;
use crate::{CatalogId, HarvestError};
use reqwest::Client;
use std::time::Duration;

/// Scans catalog pages and downloads the selected archives
#[derive(Debug)]
pub struct CatalogScanner {
    client: Client,
    base_url: String,
    device_tag: String,
    page_timeout: Duration,
    selector: ContentSelector,
    downloader: Downloader,
}

impl CatalogScanner {
    /// Creates a scanner that shares `client` between page and archive fetches
    pub fn new(config: &Config, client: Client) -> Result<Self, HarvestError> {
        let selector = ContentSelector::new(&config.catalog)?;
        let downloader = Downloader::new(client.clone(), &config.output, &config.http);

        Ok(Self {
            client,
            base_url: config.catalog.base_url.trim_end_matches('/').to_string(),
            device_tag: config.catalog.device_tag.clone(),
            page_timeout: Duration::from_secs(config.http.page_timeout_secs),
            selector,
            downloader,
        })
    }

    /// Catalog page URL for an identifier
    pub fn page_url(&self, id: CatalogId) -> String {
        format!("{}/games/{}/screen/8", self.base_url, id)
    }

    /// Processes one identifier to completion
    ///
    /// # Outcome Mapping
    ///
    /// | Step result | Outcome |
    /// |-------------|---------|
    /// | Page fetch non-2xx | FailureHttpError |
    /// | Page fetch transport failure | FailureTransport (error text) |
    /// | ExactMatch, archive stored | Success |
    /// | FallbackMatch, archive stored | SuccessFallback |
    /// | Either match, archive transfer failed | FailureDownload |
    /// | TagPresentNoLink | FailureNoDownloadLink |
    /// | NoTagNoFallback | FailureNoMatch |
    pub async fn scan(&self, id: CatalogId) -> OutcomeRecord {
        tracing::info!("Scraping game ID: {}", id);
        let url = self.page_url(id);

        let body = match fetch_url(&self.client, &url, self.page_timeout).await {
            FetchResult::Success { body } => body,
            FetchResult::HttpError { status_code } => {
                tracing::warn!(
                    "Scraping failed for game ID {} (status {})",
                    id,
                    status_code
                );
                return OutcomeRecord::http_error(id, status_code);
            }
            FetchResult::NetworkError { error } => {
                tracing::warn!("Error scraping game ID {}: {}", id, error);
                return OutcomeRecord::transport(id, error);
            }
        };

        match self.selector.select(&body) {
            Selection::ExactMatch(link) => {
                tracing::info!("Exact {} reference found for {}", self.device_tag, id);
                self.fetch_archive(id, &link, OutcomeRecord::success(id))
                    .await
            }
            Selection::FallbackMatch(link) => {
                tracing::info!(
                    "No valid {} reference for {}, using largest available version ({:.0} KiB)",
                    self.device_tag,
                    id,
                    link.size_hint.unwrap_or_default()
                );
                self.fetch_archive(id, &link, OutcomeRecord::fallback(id))
                    .await
            }
            Selection::TagPresentNoLink => {
                tracing::info!("No download link found for {}", id);
                OutcomeRecord::no_download_link(id)
            }
            Selection::NoTagNoFallback => {
                tracing::info!("No working archive for {}", id);
                OutcomeRecord::no_match(id)
            }
        }
    }

    /// Downloads `link`, returning `on_success` or a download failure record
    async fn fetch_archive(
        &self,
        id: CatalogId,
        link: &CandidateLink,
        on_success: OutcomeRecord,
    ) -> OutcomeRecord {
        match self.downloader.download(link).await {
            Ok(_) => on_success,
            Err(e) => {
                tracing::warn!("Error downloading archive for {}: {}", id, e);
                OutcomeRecord::download_failed(id, e.to_string())
            }
        }
    }
}
