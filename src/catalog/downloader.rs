//! Archive downloader
//!
//! Fetches a selected archive and stores it in the content directory under a
//! name derived from the last segment of its URL. Bytes reach their final name
//! only after the whole body arrived with a success status; they are staged in
//! a uniquely named `.part` file per attempt and renamed into place, so
//! identifiers sharing one archive never clobber each other's staging file.

use crate::catalog::selector::CandidateLink;
use crate::config::{HttpConfig, OutputConfig};
use reqwest::Client;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur while downloading an archive
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP {status_code} from {url}")]
    HttpStatus { url: String, status_code: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Transfer failed for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Cannot derive a file name from {0}")]
    NoFileName(String),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl DownloadError {
    fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                source: e,
            }
        }
    }

    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Derives the stored file name for an archive URL
///
/// The name is the last non-empty path segment plus `extension`, so the same
/// URL always maps to the same file.
///
/// # Example
///
/// ```
/// use jar_harvest::catalog::archive_file_name;
///
/// let name = archive_file_name("http://dedomil.net/download-jar/12345", "jar");
/// assert_eq!(name.as_deref(), Some("12345.jar"));
/// ```
pub fn archive_file_name(url: &str, extension: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let tail = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    Some(format!("{}.{}", tail, extension))
}

/// Downloads archives into the content directory
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
    content_dir: PathBuf,
    extension: String,
    timeout: Duration,
}

impl Downloader {
    /// Creates a downloader sharing the run's HTTP client
    pub fn new(client: Client, output: &OutputConfig, http: &HttpConfig) -> Self {
        Self {
            client,
            content_dir: PathBuf::from(&output.content_dir),
            extension: output.archive_extension.clone(),
            timeout: Duration::from_secs(http.download_timeout_secs),
        }
    }

    /// Directory archives are written into
    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// Full path an archive URL is stored at
    pub fn target_path(&self, url: &str) -> Result<PathBuf, DownloadError> {
        let name = archive_file_name(url, &self.extension)
            .ok_or_else(|| DownloadError::NoFileName(url.to_string()))?;
        Ok(self.content_dir.join(name))
    }

    /// Downloads one archive and returns the path it was stored at
    ///
    /// On any error no file is left under the final name by this call.
    pub async fn download(&self, link: &CandidateLink) -> Result<PathBuf, DownloadError> {
        let target = self.target_path(&link.url)?;

        tokio::fs::create_dir_all(&self.content_dir)
            .await
            .map_err(|e| DownloadError::io(&self.content_dir, e))?;

        let response = self
            .client
            .get(&link.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| DownloadError::from_reqwest(&link.url, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                "Failed to download {} (status {})",
                target.display(),
                status.as_u16()
            );
            return Err(DownloadError::HttpStatus {
                url: link.url.clone(),
                status_code: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DownloadError::from_reqwest(&link.url, e))?;

        let size = bytes.len();
        write_staged(&target, bytes).await?;

        tracing::info!("Downloaded: {} ({} bytes)", target.display(), size);
        Ok(target)
    }
}

/// Writes `bytes` next to `target` and renames the staged file into place
///
/// The staging file is unique per call and is removed if it never reaches
/// `target`.
async fn write_staged<B>(target: &Path, bytes: B) -> Result<(), DownloadError>
where
    B: AsRef<[u8]> + Send + 'static,
{
    let target = target.to_path_buf();
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let prefix = match target.file_name() {
        Some(name) => format!("{}.", name.to_string_lossy()),
        None => String::from("archive."),
    };

    let task_target = target.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut staged = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".part")
            .tempfile_in(&dir)
            .map_err(|e| DownloadError::io(&dir, e))?;

        staged
            .write_all(bytes.as_ref())
            .map_err(|e| DownloadError::io(staged.path(), e))?;

        staged
            .persist(&task_target)
            .map_err(|e| DownloadError::io(&task_target, e.error))?;

        Ok::<(), DownloadError>(())
    })
    .await;

    match result {
        Ok(outcome) => outcome,
        Err(e) => Err(DownloadError::io(
            &target,
            std::io::Error::new(std::io::ErrorKind::Other, e),
        )),
    }
}
