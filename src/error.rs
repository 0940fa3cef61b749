//! Error types for providers, segmentation and the planning pipeline.

use thiserror::Error;

use crate::polyline::PolylineError;

/// Errors returned by the HTTP-backed collaborators.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network, TLS, timeout or non-2xx status from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The body parsed but a field held an unusable value.
    #[error("malformed response for {context}: {reason}")]
    Malformed { context: String, reason: String },

    #[error("route geometry could not be decoded: {0}")]
    Polyline(#[from] PolylineError),

    /// Credentials were rejected or no token came back.
    #[error("authentication failed: {0}")]
    Auth(String),
}

impl ProviderError {
    /// Returns `true` for errors worth retrying after a back-off delay.
    ///
    /// Timeouts, connection failures, HTTP 429 and 5xx are transient. Anything
    /// about the payload itself is not.
    pub fn is_retriable(&self) -> bool {
        match self {
            ProviderError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| {
                        s.is_server_error() || s == reqwest::StatusCode::TOO_MANY_REQUESTS
                    })
            }
            ProviderError::Deserialize { .. }
            | ProviderError::Malformed { .. }
            | ProviderError::Polyline(_)
            | ProviderError::Auth(_) => false,
        }
    }

    pub(crate) fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        ProviderError::Malformed {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

/// Rejected segmenter inputs.
#[derive(Debug, Error, PartialEq)]
pub enum SegmentError {
    #[error("route has no waypoints")]
    EmptyRoute,

    #[error("safe range must be a positive distance, got {0} km")]
    InvalidSafeRange(f64),
}

/// Hard failures of the planning pipeline. Each one stops the run before
/// anything is rendered.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("city not found: {0}")]
    CityNotFound(String),

    #[error("geocoding '{city}' failed: {source}")]
    Geocoding {
        city: String,
        #[source]
        source: ProviderError,
    },

    #[error("route not found from {origin} to {destination}")]
    RouteNotFound { origin: String, destination: String },

    #[error("routing from {origin} to {destination} failed: {source}")]
    Routing {
        origin: String,
        destination: String,
        #[source]
        source: ProviderError,
    },

    #[error(transparent)]
    Segment(#[from] SegmentError),
}

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deserialize_err() -> ProviderError {
        let source = serde_json::from_str::<()>("invalid").unwrap_err();
        ProviderError::Deserialize {
            context: "test".to_owned(),
            source,
        }
    }

    #[test]
    fn test_deserialize_error_is_not_retriable() {
        assert!(!deserialize_err().is_retriable());
    }

    #[test]
    fn test_malformed_and_auth_are_not_retriable() {
        assert!(!ProviderError::malformed("geocode", "bad lat").is_retriable());
        assert!(!ProviderError::Auth("no token".to_owned()).is_retriable());
    }

    #[test]
    fn test_connect_error_is_retriable() {
        let err = reqwest::blocking::get("http://127.0.0.1:1").unwrap_err();
        assert!(ProviderError::Http(err).is_retriable());
    }

    #[test]
    fn test_plan_error_messages_name_the_failure() {
        let err = PlanError::CityNotFound("Atlantis".to_owned());
        assert_eq!(err.to_string(), "city not found: Atlantis");

        let err = PlanError::RouteNotFound {
            origin: "Nagpur".to_owned(),
            destination: "Pune".to_owned(),
        };
        assert_eq!(err.to_string(), "route not found from Nagpur to Pune");
    }
}
