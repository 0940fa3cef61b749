//! OSRM HTTP adapter for driving routes.

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::http::{self, DEFAULT_USER_AGENT};
use crate::model::Coordinate;
use crate::polyline::{Polyline, DEFAULT_PRECISION};
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::traits::Router;

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, ProviderError> {
        let client = http::build_client(config.timeout_secs, DEFAULT_USER_AGENT)?;
        Ok(Self { config, client })
    }

    fn route_url(&self, origin: Coordinate, destination: Coordinate) -> String {
        http::endpoint(
            &self.config.base_url,
            &format!(
                "route/v1/{}/{:.6},{:.6};{:.6},{:.6}",
                self.config.profile, origin.lon, origin.lat, destination.lon, destination.lat
            ),
        )
    }

    fn fetch(&self, url: &str) -> Result<OsrmRouteResponse, ProviderError> {
        tracing::debug!(%url, "osrm route");
        let response = self
            .client
            .get(url)
            .query(&[("overview", "full"), ("geometries", "polyline")])
            .send()?;
        // OSRM answers NoRoute with a 400 and a JSON body; read it before
        // treating the status as an error.
        if response.status() == reqwest::StatusCode::BAD_REQUEST {
            let body = response.text()?;
            return http::parse_json(&body, "osrm route");
        }
        let body = http::read_body(response)?;
        http::parse_json(&body, "osrm route")
    }
}

impl Router for OsrmClient {
    fn route(&self, origin: Coordinate, destination: Coordinate) -> Result<Polyline, ProviderError> {
        let url = self.route_url(origin, destination);
        let body = retry_with_backoff(&self.config.retry, "osrm route", || self.fetch(&url))?;

        if body.code != "Ok" {
            tracing::warn!(code = %body.code, message = ?body.message, "osrm returned no route");
            return Ok(Polyline::new(Vec::new()));
        }
        match body.routes.first() {
            Some(route) => Ok(Polyline::decode(&route.geometry, DEFAULT_PRECISION)?),
            None => Ok(Polyline::new(Vec::new())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_url_is_lon_lat() {
        let client = OsrmClient::new(OsrmConfig::default()).unwrap();
        let url = client.route_url(Coordinate::new(21.1458, 79.0882), Coordinate::new(18.5204, 73.8567));
        assert_eq!(
            url,
            "http://localhost:5000/route/v1/car/79.088200,21.145800;73.856700,18.520400"
        );
    }

    #[test]
    fn test_no_route_body_parses() {
        let body: OsrmRouteResponse =
            serde_json::from_str(r#"{"code":"NoRoute","message":"Impossible route between points"}"#).unwrap();
        assert_eq!(body.code, "NoRoute");
        assert!(body.routes.is_empty());
    }
}
