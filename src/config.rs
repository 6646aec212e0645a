//! Configuration for the legal-document tools.
//!
//! Every knob lives in [`ToolConfig`], built via [`ToolConfigBuilder`]. The
//! same config is shared by all three tools; each session reads what it needs.

use crate::error::LegalDocError;
use crate::pipeline::transport::GenerationService;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Default API root of the generation service.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variable the CLI reads the credential from.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration shared by the extraction, comparison and generation tools.
///
/// # Example
/// ```rust
/// use edgequake_legaldoc::ToolConfig;
///
/// let config = ToolConfig::builder()
///     .api_key("my-key")
///     .model("gemini-2.0-flash")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ToolConfig {
    /// Credential sent as the `key` query parameter. Default: None.
    ///
    /// A missing key is not rejected locally: the service answers with an
    /// error status, which surfaces as a transport error.
    pub api_key: Option<String>,

    /// Model identifier in the endpoint path. Default: `gemini-2.0-flash`.
    pub model: String,

    /// API root; the request goes to `{base_url}/models/{model}:generateContent`.
    pub base_url: String,

    /// Per-request timeout in seconds. Default: None (wait indefinitely).
    pub request_timeout_secs: Option<u64>,

    /// Path to libpdfium. Default: None (system library search path).
    pub pdfium_lib_path: Option<PathBuf>,

    /// Pre-constructed generation service. Takes precedence over the HTTP client.
    pub service: Option<Arc<dyn GenerationService>>,

    /// Optional per-stage progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
            pdfium_lib_path: None,
            service: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ToolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("service", &self.service.as_ref().map(|_| "<dyn GenerationService>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl ToolConfig {
    pub fn builder() -> ToolConfigBuilder {
        ToolConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ToolConfig`].
#[derive(Debug)]
pub struct ToolConfigBuilder {
    config: ToolConfig,
}

impl ToolConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn service(mut self, service: Arc<dyn GenerationService>) -> Self {
        self.config.service = Some(service);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(mut self) -> Result<ToolConfig, LegalDocError> {
        let c = &mut self.config;
        c.model = c.model.trim().to_string();
        if c.model.is_empty() {
            return Err(LegalDocError::InvalidConfig("model must not be empty".into()));
        }

        c.base_url = c.base_url.trim().trim_end_matches('/').to_string();
        let url = reqwest::Url::parse(&c.base_url).map_err(|e| {
            LegalDocError::InvalidConfig(format!("base URL '{}' is invalid: {e}", c.base_url))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(LegalDocError::InvalidConfig(format!(
                "base URL must be http or https, got '{}'",
                url.scheme()
            )));
        }

        if c.request_timeout_secs == Some(0) {
            return Err(LegalDocError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }

        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ToolConfig::default();
        assert_eq!(c.model, "gemini-2.0-flash");
        assert_eq!(c.base_url, DEFAULT_BASE_URL);
        assert!(c.api_key.is_none());
        assert!(c.request_timeout_secs.is_none());
    }

    #[test]
    fn builder_trims_trailing_slash() {
        let c = ToolConfig::builder()
            .base_url("http://localhost:8080/v1beta/")
            .build()
            .unwrap();
        assert_eq!(c.base_url, "http://localhost:8080/v1beta");
    }

    #[test]
    fn builder_rejects_bad_values() {
        assert!(ToolConfig::builder().model("  ").build().is_err());
        assert!(ToolConfig::builder().base_url("not a url").build().is_err());
        assert!(ToolConfig::builder().base_url("ftp://host/x").build().is_err());
        assert!(ToolConfig::builder().request_timeout_secs(0).build().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let c = ToolConfig::builder().api_key("super-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
