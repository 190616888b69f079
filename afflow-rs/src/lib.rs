//! # afflow-rs
//!
//! A Rust client library for the afflow affiliate-content API.
//!
//! This crate owns the wire request/response types of the afflow HTTP
//! surface and provides a small client for the operations an external
//! integrator needs: creating tracked affiliate links, generating content,
//! and reporting conversions. Conversion reporting requires an API key
//! issued by the afflow operator.
//!
//! ## Example
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), afflow_rs::AfflowApiError> {
//! use afflow_rs::AfflowApi;
//!
//! let api = AfflowApi::new("your-api-key-here".to_string());
//!
//! let link = api
//!     .create_link("spring sale", "https://merchant.example/deal?aff=123")
//!     .await?;
//! println!("Tracked link id: {}", link.id);
//! # Ok(())
//! # }
//! ```
//!

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

fn default_topic() -> String {
    String::from("AI tool")
}

fn default_offer() -> String {
    String::from("Example Offer")
}

fn default_save() -> bool {
    true
}

/// Request payload for creating a tracked affiliate link.
///
/// Both fields are required; the server rejects the request with a 400
/// when either is missing or empty.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateLinkRequest {
    /// Human-readable label for the link.
    #[serde(default)]
    pub name: String,
    /// The affiliate destination the redirect endpoint will send
    /// visitors to.
    #[serde(default)]
    pub affiliate_url: String,
}

/// A tracked link as returned by the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkInfo {
    /// Server-assigned link id; the redirect path is `/api/r/{id}`.
    pub id: Uuid,
    pub name: String,
    pub affiliate_url: String,
    /// Number of redirect traversals recorded so far.
    pub click_count: i32,
}

/// Response envelope of the link-creation endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedLinkResponse {
    pub link: LinkInfo,
}

/// Request payload for the content-generation endpoint.
///
/// `topic` and `offer` fall back to the documented defaults when omitted.
/// With `save` (the default) the generated script is persisted as a trend
/// plus asset row; `auto_publish` additionally schedules a post one hour
/// out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default = "default_offer")]
    pub offer: String,
    #[serde(default)]
    pub platform: Option<String>,
    /// Reuse an existing trend row instead of creating one from `topic`.
    #[serde(default)]
    pub trend_id: Option<Uuid>,
    /// Associate the generated asset with an offer row.
    #[serde(default)]
    pub offer_id: Option<Uuid>,
    #[serde(default = "default_save")]
    pub save: bool,
    #[serde(default)]
    pub auto_publish: bool,
}

impl Default for GenerateRequest {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            offer: default_offer(),
            platform: None,
            trend_id: None,
            offer_id: None,
            save: default_save(),
            auto_publish: false,
        }
    }
}

/// Response of the content-generation endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The interpolated promotional script.
    pub script: String,
    /// The interpolated caption, hashtags included.
    pub caption: String,
    /// Whether the result was persisted.
    pub saved: bool,
    /// Id of the trend row the persisted asset references; `None` when
    /// nothing was saved.
    pub trend_id: Option<Uuid>,
}

/// Request payload for scheduling or publishing a post.
///
/// A present `scheduled_at` yields status `"scheduled"`; an absent one
/// yields `"published"` with the publish time stamped server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRequest {
    #[serde(default)]
    pub asset_id: Option<Uuid>,
    pub platform: String,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub asset_url: Option<String>,
}

/// Conversion event reported by an affiliate network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub network: String,
    #[serde(default)]
    pub click_ref: Option<String>,
    pub amount: f64,
    pub commission: f64,
}

/// A client for the afflow HTTP API.
#[derive(Clone)]
pub struct AfflowApi {
    url: String,
    key: String,
    client: reqwest::Client,
}

/// Errors that can occur when interacting with the afflow API.
#[derive(Debug, Error)]
pub enum AfflowApiError {
    /// An error occurred during API configuration (e.g., invalid URL parsing).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    /// An error occurred while sending the HTTP request or receiving the response.
    #[error("Request error: {0}")]
    RequestError(String),
    /// An error occurred while deserializing the API response.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

impl AfflowApi {
    /// Creates a new `AfflowApi` client against a local default endpoint.
    ///
    /// # Arguments
    ///
    /// * `key` - API key used for the authenticated conversion endpoint
    pub fn new(key: String) -> Self {
        Self {
            url: String::from("http://localhost:8080"),
            key,
            client: reqwest::Client::new(),
        }
    }

    /// Sets a custom API endpoint URL.
    ///
    /// # Example
    ///
    /// ```rust
    /// use afflow_rs::AfflowApi;
    ///
    /// let api = AfflowApi::new("your-api-key".to_string())
    ///     .with_url("https://afflow.example.com");
    /// ```
    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.into();
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, AfflowApiError> {
        Url::parse(&format!("{}{}", self.url, path))
            .map_err(|e| AfflowApiError::ConfigurationError(e.to_string()))
    }

    /// Creates a tracked affiliate link.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` for an invalid endpoint URL,
    /// `RequestError` when the HTTP request fails, and
    /// `DeserializationError` when the response body is not the expected
    /// shape.
    pub async fn create_link(
        &self,
        name: &str,
        affiliate_url: &str,
    ) -> Result<LinkInfo, AfflowApiError> {
        let url = self.endpoint("/api/links/new")?;

        let resp = self
            .client
            .post(url)
            .json(&CreateLinkRequest {
                name: name.to_string(),
                affiliate_url: affiliate_url.to_string(),
            })
            .send()
            .await
            .map_err(|e| AfflowApiError::RequestError(e.to_string()))?
            .json::<CreatedLinkResponse>()
            .await
            .map_err(|e| AfflowApiError::DeserializationError(e.to_string()))?;

        Ok(resp.link)
    }

    /// Generates a promotional script and caption for a topic/offer pair.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::create_link`].
    pub async fn generate_content(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, AfflowApiError> {
        let url = self.endpoint("/api/content/generate")?;

        self.client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| AfflowApiError::RequestError(e.to_string()))?
            .json::<GenerateResponse>()
            .await
            .map_err(|e| AfflowApiError::DeserializationError(e.to_string()))
    }

    /// Reports a conversion event. Requires the API key passed to
    /// [`Self::new`] to be known to the server.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::create_link`]; an unknown key surfaces as
    /// a `RequestError` carrying the 401 status.
    pub async fn report_conversion(
        &self,
        conversion: &ConversionRequest,
    ) -> Result<(), AfflowApiError> {
        let url = self.endpoint("/api/webhooks/conversion")?;

        let resp = self
            .client
            .post(url)
            .header("Authorization", self.key.clone())
            .json(conversion)
            .send()
            .await
            .map_err(|e| AfflowApiError::RequestError(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AfflowApiError::RequestError(format!(
                "conversion rejected: {}",
                resp.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_defaults() {
        let req: GenerateRequest = serde_json::from_str("{}").unwrap();

        assert_eq!(req.topic, "AI tool");
        assert_eq!(req.offer, "Example Offer");
        assert!(req.save);
        assert!(!req.auto_publish);
    }

    #[test]
    fn test_publish_request_optional_fields() {
        let req: PublishRequest = serde_json::from_str(r#"{"platform":"tiktok"}"#).unwrap();

        assert_eq!(req.platform, "tiktok");
        assert!(req.scheduled_at.is_none());
        assert!(req.asset_id.is_none());
    }
}
