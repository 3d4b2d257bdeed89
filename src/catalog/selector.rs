//! Content selector for catalog pages
//!
//! Decides which download link on a catalog page to pursue:
//!
//! 1. **Exact tier**: the device tag appears as a standalone token in the raw
//!    page text. The first download link on the page is the only candidate. A
//!    page with the tag but no download link is a dead end; the fallback tier is
//!    not consulted.
//! 2. **Fallback tier**: the tag is absent. Every marker-class container that
//!    holds both a download link and a size annotation is a candidate, and the
//!    largest one wins (first in document order on ties).

use crate::config::CatalogConfig;
use crate::HarvestError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A download link considered during selection
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateLink {
    /// Absolute URL of the archive
    pub url: String,

    /// Advertised size in kibibytes, when the page states one
    pub size_hint: Option<f64>,
}

/// Result of running the selector over one catalog page
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Device tag found and a download link exists
    ExactMatch(CandidateLink),

    /// Device tag absent; largest sized download chosen
    FallbackMatch(CandidateLink),

    /// Device tag found but the page has no download link
    TagPresentNoLink,

    /// Device tag absent and no container yields a sized download
    NoTagNoFallback,
}

/// Selects download links from catalog pages
#[derive(Debug)]
pub struct ContentSelector {
    device_tag: String,
    download_path: String,
    base_url: Url,
    link_selector: Selector,
    container_selector: Selector,
    size_pattern: Regex,
}

impl ContentSelector {
    /// Creates a selector from the catalog configuration
    pub fn new(config: &CatalogConfig) -> Result<Self, HarvestError> {
        let base_url = Url::parse(&config.base_url)?;

        let link_selector = Selector::parse("a[href]")
            .map_err(|e| HarvestError::Selector(format!("{:?}", e)))?;

        let container_css = format!("div.{}", config.marker_class);
        let container_selector = Selector::parse(&container_css)
            .map_err(|e| HarvestError::Selector(format!("{}: {:?}", container_css, e)))?;

        let size_pattern = Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(kB|MB)")
            .map_err(|e| HarvestError::Selector(e.to_string()))?;

        Ok(Self {
            device_tag: config.device_tag.clone(),
            download_path: config.download_path.clone(),
            base_url,
            link_selector,
            container_selector,
            size_pattern,
        })
    }

    /// Runs both selection tiers over a page body
    ///
    /// The parsed document never outlives this call, so callers on async
    /// tasks can hold the returned `Selection` across await points.
    ///
    /// # Example
    ///
    /// ```
    /// use jar_harvest::catalog::{ContentSelector, Selection};
    /// use jar_harvest::config::CatalogConfig;
    ///
    /// let selector = ContentSelector::new(&CatalogConfig::default()).unwrap();
    /// let html = r#"<p>Sony Ericsson K800i</p><a href="/download-jar/77">get</a>"#;
    /// match selector.select(html) {
    ///     Selection::ExactMatch(link) => {
    ///         assert_eq!(link.url, "http://dedomil.net/download-jar/77")
    ///     }
    ///     other => panic!("unexpected {:?}", other),
    /// }
    /// ```
    pub fn select(&self, html: &str) -> Selection {
        let document = Html::parse_document(html);

        if has_exact_tag(html, &self.device_tag) {
            return match self.first_download_link(document.root_element()) {
                Some(url) => Selection::ExactMatch(CandidateLink {
                    url,
                    size_hint: None,
                }),
                None => Selection::TagPresentNoLink,
            };
        }

        match self.largest_available(&document) {
            Some(link) => Selection::FallbackMatch(link),
            None => Selection::NoTagNoFallback,
        }
    }

    /// Finds the largest sized download among the marker containers
    fn largest_available(&self, document: &Html) -> Option<CandidateLink> {
        let mut best: Option<CandidateLink> = None;

        for container in document.select(&self.container_selector) {
            let Some(url) = self.first_download_link(container) else {
                continue;
            };

            let text = container_text(container);
            let Some(size) = self.parse_size(&text) else {
                tracing::debug!("No size annotation in container for {}", url);
                continue;
            };

            // Strictly greater keeps the first container on ties
            let is_larger = best
                .as_ref()
                .and_then(|b| b.size_hint)
                .map_or(true, |current| size > current);

            if is_larger {
                best = Some(CandidateLink {
                    url,
                    size_hint: Some(size),
                });
            }
        }

        best
    }

    /// Returns the first download link below `scope`, resolved against the catalog host
    fn first_download_link(&self, scope: ElementRef<'_>) -> Option<String> {
        scope
            .select(&self.link_selector)
            .filter_map(|element| element.value().attr("href"))
            .find(|href| href.contains(self.download_path.as_str()))
            .and_then(|href| self.base_url.join(href.trim()).ok())
            .map(|url| url.to_string())
    }

    /// Extracts a size annotation and normalizes it to kibibytes
    pub fn parse_size(&self, text: &str) -> Option<f64> {
        let captures = self.size_pattern.captures(text)?;
        let value: f64 = captures.get(1)?.as_str().parse().ok()?;
        let unit = captures.get(2)?.as_str();

        if unit.eq_ignore_ascii_case("mb") {
            Some(value * 1024.0)
        } else {
            Some(value)
        }
    }
}

/// Checks whether `tag` occurs as a standalone token in `text`
///
/// A standalone occurrence is neither preceded nor followed by an ASCII
/// alphanumeric character or `/`, so `CZ/K800i`, `xK800i` and `K800i2` do
/// not count.
pub fn has_exact_tag(text: &str, tag: &str) -> bool {
    if tag.is_empty() {
        return false;
    }

    text.match_indices(tag).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + tag.len()..].chars().next();
        !before.is_some_and(joins_token) && !after.is_some_and(joins_token)
    })
}

fn joins_token(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '/'
}

/// Collects an element's text nodes, trimmed and space separated
///
/// Adjacent nodes are kept apart so that a version number right before the
/// size markup (`v2<b>512 kB</b>`) is not read as part of the size.
fn container_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
