//! HTTP client for the Gemini `generateContent` REST endpoint.
//!
//! Wraps `reqwest` with API key handling, quota classification, and typed
//! response deserialization. Implements [`BusinessSource`] so the crawl
//! controller can drive it directly.

use std::time::Duration;

use mapcrawl_core::{BusinessSource, LatLng, QueryTuple, Record, SourceError};
use reqwest::{Client, Url};

use crate::error::{classify_api_error, GeminiError};
use crate::parse::records_from_response;
use crate::prompt::build_prompt;
use crate::types::{
    Content, ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, GoogleMaps,
    LatLngBody, Part, RetrievalConfig, Tool, ToolConfig,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

/// Client for the Gemini API with Google Maps grounding.
///
/// Use [`GeminiClient::new`] for production or [`GeminiClient::with_base_url`]
/// to point at a mock server in tests.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
}

impl GeminiClient {
    /// Creates a new client pointed at the production Gemini API.
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, GeminiError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeminiError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeminiError::InvalidBaseUrl`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GeminiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("mapcrawl/0.1")
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeminiError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
        })
    }

    /// Queries the model for the businesses of one tuple and parses the
    /// grounded answer into records.
    ///
    /// # Errors
    ///
    /// - [`GeminiError::QuotaExceeded`] when the API reports an exhausted quota.
    /// - [`GeminiError::Api`] for any other non-2xx response.
    /// - [`GeminiError::Http`] on network failure.
    /// - [`GeminiError::Deserialize`] if the body is not the expected shape.
    pub async fn fetch_businesses(
        &self,
        tuple: &QueryTuple,
        location: Option<LatLng>,
    ) -> Result<Vec<Record>, GeminiError> {
        let prompt = build_prompt(tuple);
        let response = self.generate(&prompt, location).await?;
        let records = records_from_response(&response, tuple);
        tracing::debug!(
            city = %tuple.city,
            zone = %tuple.zone,
            category = %tuple.category,
            found = records.len(),
            "gemini query parsed"
        );
        Ok(records)
    }

    /// Sends one `generateContent` request with the maps tool enabled.
    ///
    /// # Errors
    ///
    /// See [`GeminiClient::fetch_businesses`].
    pub async fn generate(
        &self,
        prompt: &str,
        location: Option<LatLng>,
    ) -> Result<GenerateContentResponse, GeminiError> {
        let url = self.endpoint()?;
        let body = build_request(prompt, location);

        let response = self
            .client
            .post(url.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let (api_status, message) = match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(envelope) => (envelope.error.status, envelope.error.message),
                Err(_) => (None, format!("HTTP {}: {text}", status.as_u16())),
            };
            let err = classify_api_error(status.as_u16(), api_status.as_deref(), message);
            if err.is_quota() {
                tracing::warn!(status = status.as_u16(), error = %err, "gemini quota exhausted");
            }
            return Err(err);
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| GeminiError::Deserialize {
            context: format!("generateContent({})", self.model),
            source: e,
        })
    }

    /// `{base}/v1beta/models/{model}:generateContent`
    fn endpoint(&self) -> Result<Url, GeminiError> {
        let path = format!("v1beta/models/{}:generateContent", self.model);
        self.base_url
            .join(&path)
            .map_err(|e| GeminiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}

impl BusinessSource for GeminiClient {
    async fn fetch(
        &self,
        tuple: &QueryTuple,
        location: Option<LatLng>,
    ) -> Result<Vec<Record>, SourceError> {
        self.fetch_businesses(tuple, location)
            .await
            .map_err(SourceError::from)
    }
}

fn build_request(prompt: &str, location: Option<LatLng>) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_owned(),
            parts: vec![Part {
                text: prompt.to_owned(),
            }],
        }],
        tools: vec![Tool {
            google_maps: GoogleMaps {},
        }],
        tool_config: location.map(|loc| ToolConfig {
            retrieval_config: RetrievalConfig {
                lat_lng: LatLngBody {
                    latitude: loc.lat,
                    longitude: loc.lng,
                },
            },
        }),
    }
}
