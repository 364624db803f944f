use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;

use crate::config::ClientConfig;
use crate::models::{LookUp, VenueAddRequest};

pub const VENUE_TYPES: &str = "VenueTypes";

/// Lookup categories keyed by their camel-cased name, e.g. `venueTypes`.
pub type LookupTable = HashMap<String, Vec<LookUp>>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("http error: {0}")]
    Http(String),
    /// Rejected by the service; `message` is shown to the user as-is.
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("parse error: {0}")]
    Parse(String),
}

impl BackendError {
    /// Text surfaced to the user when a call fails.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
pub trait VenueBackend: Send + Sync {
    async fn lookup(&self, categories: &[&str]) -> Result<LookupTable, BackendError>;

    /// Creates a venue and returns the id the service assigned.
    async fn add_venue(&self, request: &VenueAddRequest) -> Result<i64, BackendError>;
}

/// `VenueTypes` -> `venueTypes`, the key the lookup service answers with.
pub fn lookup_key(category: &str) -> String {
    let mut chars = category.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn venue_types(table: &LookupTable) -> Vec<LookUp> {
    table
        .get(&lookup_key(VENUE_TYPES))
        .cloned()
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct ItemResponse<T> {
    item: T,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<String>,
}

pub fn decode_item<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, BackendError> {
    if !status.is_success() {
        return Err(BackendError::Api {
            status: status.as_u16(),
            message: error_message(status, body),
        });
    }
    let payload: ItemResponse<T> =
        serde_json::from_str(body).map_err(|err| BackendError::Parse(err.to_string()))?;
    Ok(payload.item)
}

fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        if !parsed.errors.is_empty() {
            return parsed.errors.join(", ");
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("status {}", status.as_u16()))
    } else {
        trimmed.to_string()
    }
}

pub struct HttpVenueBackend {
    client: Client,
    lookups_url: String,
    venues_url: String,
}

impl HttpVenueBackend {
    pub fn from_config(config: &ClientConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .user_agent(concat!("venue-form/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| BackendError::Http(err.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            lookups_url: config.lookups_url(),
            venues_url: config.venues_url(),
        }
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, BackendError>
    where
        B: serde::Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| BackendError::Http(err.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| BackendError::Http(err.to_string()))?;
        decode_item(status, &text)
    }
}

#[async_trait]
impl VenueBackend for HttpVenueBackend {
    async fn lookup(&self, categories: &[&str]) -> Result<LookupTable, BackendError> {
        tracing::debug!(url = %self.lookups_url, ?categories, "requesting lookups");
        self.post_json(&self.lookups_url, categories).await
    }

    async fn add_venue(&self, request: &VenueAddRequest) -> Result<i64, BackendError> {
        tracing::debug!(url = %self.venues_url, name = %request.name, "creating venue");
        self.post_json(&self.venues_url, request).await
    }
}
