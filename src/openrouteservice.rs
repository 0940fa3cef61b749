//! OpenRouteService directions adapter.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::http::{self, DEFAULT_USER_AGENT};
use crate::model::Coordinate;
use crate::polyline::{Polyline, DEFAULT_PRECISION};
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::traits::Router;

pub const DEFAULT_BASE_URL: &str = "https://api.openrouteservice.org";

#[derive(Debug, Clone)]
pub struct OrsConfig {
    pub base_url: String,
    pub api_key: String,
    pub profile: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl OrsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            profile: "driving-car".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 10,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrsClient {
    config: OrsConfig,
    client: Client,
}

impl OrsClient {
    pub fn new(config: OrsConfig) -> Result<Self, ProviderError> {
        let client = http::build_client(config.timeout_secs, &config.user_agent)?;
        Ok(Self { config, client })
    }

    fn directions(&self, request: &DirectionsRequest) -> Result<DirectionsResponse, ProviderError> {
        let url = http::endpoint(
            &self.config.base_url,
            &format!("v2/directions/{}", self.config.profile),
        );
        tracing::debug!(%url, "openrouteservice directions");
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, &self.config.api_key)
            .json(request)
            .send()?;
        let body = http::read_body(response)?;
        http::parse_json(&body, "openrouteservice directions")
    }
}

impl Router for OrsClient {
    fn route(&self, origin: Coordinate, destination: Coordinate) -> Result<Polyline, ProviderError> {
        let request = DirectionsRequest {
            coordinates: [[origin.lon, origin.lat], [destination.lon, destination.lat]],
            instructions: false,
        };
        let response = retry_with_backoff(&self.config.retry, "openrouteservice directions", || {
            self.directions(&request)
        })?;

        match response.routes.first() {
            Some(route) => Ok(Polyline::decode(&route.geometry, DEFAULT_PRECISION)?),
            None => Ok(Polyline::new(Vec::new())),
        }
    }
}

/// ORS expects `[lon, lat]` pairs.
#[derive(Debug, Serialize)]
struct DirectionsRequest {
    coordinates: [[f64; 2]; 2],
    instructions: bool,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    geometry: String,
}
