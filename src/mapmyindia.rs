//! MapmyIndia nearby-search adapter for EV charging stations.
//!
//! Authenticates with the OAuth client-credentials flow. The access token is
//! fetched on the first lookup and reused until the API rejects it with 401,
//! at which point it is dropped and fetched again once.

use std::sync::Mutex;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::http::{self, DEFAULT_USER_AGENT};
use crate::model::{ChargerCandidate, Coordinate};
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::traits::ChargerDirectory;

pub const DEFAULT_TOKEN_URL: &str = "https://outpost.mapmyindia.com/api/security/oauth/token";
pub const DEFAULT_BASE_URL: &str = "https://atlas.mapmyindia.com";

const SEARCH_KEYWORDS: &str = "ev charging station";
const UNNAMED_CHARGER: &str = "Charger";

#[derive(Debug, Clone)]
pub struct MapmyIndiaConfig {
    pub token_url: String,
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl MapmyIndiaConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            timeout_secs: 10,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug)]
pub struct MapmyIndiaClient {
    config: MapmyIndiaConfig,
    client: Client,
    token: Mutex<Option<String>>,
}

impl MapmyIndiaClient {
    pub fn new(config: MapmyIndiaConfig) -> Result<Self, ProviderError> {
        let client = http::build_client(config.timeout_secs, DEFAULT_USER_AGENT)?;
        Ok(Self {
            config,
            client,
            token: Mutex::new(None),
        })
    }

    fn access_token(&self) -> Result<String, ProviderError> {
        let mut cached = match self.token.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }

        let token = retry_with_backoff(&self.config.retry, "mapmyindia token", || self.request_token())?;
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Drops the cached token if it is still `stale`.
    fn forget_token(&self, stale: &str) {
        let mut cached = match self.token.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if cached.as_deref() == Some(stale) {
            *cached = None;
        }
    }

    fn request_token(&self) -> Result<String, ProviderError> {
        tracing::debug!(url = %self.config.token_url, "requesting mapmyindia access token");
        let response = self
            .client
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()?;
        let body = http::read_body(response)?;
        let token: TokenResponse = http::parse_json(&body, "mapmyindia token")?;
        token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProviderError::Auth("token response carried no access_token".to_string()))
    }

    fn nearby(&self, at: Coordinate, token: &str) -> Result<Vec<ChargerCandidate>, ProviderError> {
        let url = http::endpoint(&self.config.base_url, "api/places/nearby/json");
        let ref_location = format!("{},{}", at.lat, at.lon);
        tracing::debug!(%url, ref_location, "mapmyindia nearby search");
        let response = self
            .client
            .get(&url)
            .query(&[("keywords", SEARCH_KEYWORDS), ("refLocation", ref_location.as_str())])
            .bearer_auth(token)
            .send()?;
        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        let body = http::read_body(response)?;
        parse_nearby(&body)
    }
}

impl ChargerDirectory for MapmyIndiaClient {
    fn chargers_near(&self, at: Coordinate) -> Result<Vec<ChargerCandidate>, ProviderError> {
        let token = self.access_token()?;
        match retry_with_backoff(&self.config.retry, "mapmyindia nearby", || self.nearby(at, &token)) {
            Err(err) if is_unauthorized(&err) => {
                tracing::warn!("mapmyindia rejected the access token, requesting a new one");
                self.forget_token(&token);
                let token = self.access_token()?;
                retry_with_backoff(&self.config.retry, "mapmyindia nearby", || self.nearby(at, &token))
            }
            result => result,
        }
    }
}

fn is_unauthorized(err: &ProviderError) -> bool {
    matches!(err, ProviderError::Http(e) if e.status() == Some(reqwest::StatusCode::UNAUTHORIZED))
}

fn parse_nearby(body: &str) -> Result<Vec<ChargerCandidate>, ProviderError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let response: NearbyResponse = http::parse_json(body, "mapmyindia nearby")?;
    Ok(response
        .suggested_locations
        .into_iter()
        .map(NearbyPlace::into_candidate)
        .collect())
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NearbyResponse {
    #[serde(default)]
    suggested_locations: Vec<NearbyPlace>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NearbyPlace {
    place_name: Option<String>,
    place_address: Option<String>,
    /// Meters; some responses send it as a string.
    #[serde(default)]
    distance: Option<serde_json::Value>,
}

impl NearbyPlace {
    fn into_candidate(self) -> ChargerCandidate {
        let distance_m = self.distance.as_ref().and_then(|value| match value {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });
        ChargerCandidate {
            name: self
                .place_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| UNNAMED_CHARGER.to_string()),
            address: self.place_address.filter(|addr| !addr.trim().is_empty()),
            distance_m,
        }
    }
}
