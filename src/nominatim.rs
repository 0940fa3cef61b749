//! Nominatim (OpenStreetMap) geocoding adapter.

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::http::{self, DEFAULT_USER_AGENT};
use crate::model::Coordinate;
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::traits::Geocoder;

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    /// Nominatim's usage policy rejects requests without one.
    pub user_agent: String,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 10,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    config: NominatimConfig,
    client: Client,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Result<Self, ProviderError> {
        let client = http::build_client(config.timeout_secs, &config.user_agent)?;
        Ok(Self { config, client })
    }

    fn search(&self, place: &str) -> Result<Vec<SearchHit>, ProviderError> {
        let url = http::endpoint(&self.config.base_url, "search");
        tracing::debug!(place, %url, "nominatim search");
        let response = self
            .client
            .get(&url)
            .query(&[("q", place), ("format", "json"), ("limit", "1")])
            .send()?;
        let body = http::read_body(response)?;
        http::parse_json(&body, "nominatim search")
    }
}

impl Geocoder for NominatimClient {
    fn geocode(&self, place: &str) -> Result<Option<Coordinate>, ProviderError> {
        let hits = retry_with_backoff(&self.config.retry, "nominatim search", || self.search(place))?;
        hits.first().map(SearchHit::coordinate).transpose()
    }
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

impl SearchHit {
    fn coordinate(&self) -> Result<Coordinate, ProviderError> {
        let parse = |field: &str, raw: &str| -> Result<f64, ProviderError> {
            raw.trim()
                .parse::<f64>()
                .map_err(|e| ProviderError::malformed("nominatim search", format!("{field} '{raw}': {e}")))
        };
        Ok(Coordinate::new(parse("lat", &self.lat)?, parse("lon", &self.lon)?))
    }
}
