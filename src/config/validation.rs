use crate::config::types::{CatalogConfig, Config, HttpConfig, OutputConfig, SchedulerConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_catalog_config(&config.catalog)?;
    validate_http_config(&config.http)?;
    validate_scheduler_config(&config.scheduler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates catalog configuration
fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            config.base_url
        )));
    }

    if config.device_tag.is_empty() {
        return Err(ConfigError::Validation(
            "device_tag cannot be empty".to_string(),
        ));
    }

    if !config.device_tag.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "device_tag must be alphanumeric, got '{}'",
            config.device_tag
        )));
    }

    if !config.download_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "download_path must start with '/', got '{}'",
            config.download_path
        )));
    }

    validate_class_name(&config.marker_class)?;

    Ok(())
}

/// Validates HTTP configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.page_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "page_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.download_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "download_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates scheduler configuration
fn validate_scheduler_config(config: &SchedulerConfig) -> Result<(), ConfigError> {
    if config.max_workers < 1 || config.max_workers > 100 {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and 100, got {}",
            config.max_workers
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.content_dir.is_empty() {
        return Err(ConfigError::Validation(
            "content_dir cannot be empty".to_string(),
        ));
    }

    if config.log_dir.is_empty() {
        return Err(ConfigError::Validation(
            "log_dir cannot be empty".to_string(),
        ));
    }

    if config.archive_extension.is_empty()
        || !config
            .archive_extension
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ConfigError::Validation(format!(
            "archive_extension must be a non-empty alphanumeric string, got '{}'",
            config.archive_extension
        )));
    }

    Ok(())
}

/// The marker class is spliced into a CSS selector, so it must be a plain identifier
fn validate_class_name(class: &str) -> Result<(), ConfigError> {
    let mut chars = class.chars();

    let valid_start = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);

    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ConfigError::Validation(format!(
            "marker_class must be a valid CSS class name, got '{}'",
            class
        )));
    }

    Ok(())
}
