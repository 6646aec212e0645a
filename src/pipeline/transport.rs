//! Transport: one HTTP exchange with the generation service.
//!
//! [`GeminiClient`] POSTs a [`ModelRequest`] to
//! `{base_url}/models/{model}:generateContent?key=…` and returns the text of
//! the first candidate's first part. Nothing is retried; every failure is
//! terminal for the run and surfaces as a [`LegalDocError`]:
//!
//! * non-2xx status → [`LegalDocError::TransportError`] carrying the status
//!   and the service's own error message when it sent one,
//! * connection failure, unreadable envelope, or no candidate text →
//!   [`LegalDocError::NetworkError`].
//!
//! The [`GenerationService`] trait is the seam tests and embedders use to
//! substitute the HTTP client.

use crate::config::ToolConfig;
use crate::error::LegalDocError;
use crate::pipeline::request::ModelRequest;
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Anything that can turn a [`ModelRequest`] into raw model output.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn invoke(&self, request: &ModelRequest) -> Result<String, LegalDocError>;
}

// ── Wire format ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: [Content<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

impl<'a> GenerateContentBody<'a> {
    fn from_request(request: &'a ModelRequest) -> Self {
        Self {
            contents: [Content {
                role: "user",
                parts: [Part {
                    text: &request.instruction,
                }],
            }],
            generation_config: request.response_shape.as_ref().map(|shape| GenerationConfig {
                response_mime_type: "application/json",
                response_schema: shape.as_json(),
            }),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

// ── Client ───────────────────────────────────────────────────────────────────

/// HTTP client for the `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: Url,
    has_key: bool,
    model: String,
}

impl GeminiClient {
    /// Build a client from `config`. Fails only on an unusable base URL.
    pub fn new(config: &ToolConfig) -> Result<Self, LegalDocError> {
        let raw = format!(
            "{}/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );
        let mut endpoint = Url::parse(&raw)
            .map_err(|e| LegalDocError::InvalidConfig(format!("endpoint '{raw}' is invalid: {e}")))?;

        let key = config.api_key.as_deref().filter(|k| !k.trim().is_empty());
        if let Some(key) = key {
            endpoint.query_pairs_mut().append_pair("key", key);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| LegalDocError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            has_key: key.is_some(),
            model: config.model.clone(),
        })
    }

    /// Endpoint URL without the query string, safe to log.
    pub fn redacted_endpoint(&self) -> String {
        let mut url = self.endpoint.clone();
        url.set_query(None);
        url.to_string()
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.redacted_endpoint())
            .field("model", &self.model)
            .field("has_key", &self.has_key)
            .finish()
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn invoke(&self, request: &ModelRequest) -> Result<String, LegalDocError> {
        if !self.has_key {
            warn!("No API key configured; the service will likely reject the request");
        }

        let body = GenerateContentBody::from_request(request);
        let start = Instant::now();
        debug!(
            "POST {} (structured={})",
            self.redacted_endpoint(),
            request.response_shape.is_some()
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| LegalDocError::NetworkError(describe_send_error(e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = service_message(&text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            warn!("Generation service returned HTTP {}: {}", status.as_u16(), message);
            return Err(LegalDocError::TransportError {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| {
                LegalDocError::NetworkError(format!(
                    "unreadable response envelope: {}",
                    e.without_url()
                ))
            })?;

        let text = envelope
            .first_text()
            .ok_or_else(|| LegalDocError::NetworkError("response contained no candidate text".into()))?;

        info!(
            "Model {} answered in {}ms ({} chars)",
            self.model,
            start.elapsed().as_millis(),
            text.chars().count()
        );
        Ok(text)
    }
}

/// Pull `error.message` out of an error body, if it has one.
fn service_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|e| e.error.message)
        .filter(|m| !m.trim().is_empty())
}

// reqwest's Display for send errors includes the full URL, and with it the key.
fn describe_send_error(e: reqwest::Error) -> String {
    let e = e.without_url();
    if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("could not connect to the generation service: {e}")
    } else {
        e.to_string()
    }
}
