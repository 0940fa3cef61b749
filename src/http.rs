//! Shared plumbing for the blocking HTTP adapters.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;

use crate::error::ProviderError;

pub(crate) const DEFAULT_USER_AGENT: &str = "ev-trip-planner/0.1";

pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, ProviderError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Joins `base` and `path` with exactly one slash between them.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Checks the status and reads the body as text.
pub(crate) fn read_body(response: Response) -> Result<String, ProviderError> {
    let response = response.error_for_status()?;
    Ok(response.text()?)
}

pub(crate) fn parse_json<T: DeserializeOwned>(body: &str, context: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|source| ProviderError::Deserialize {
        context: context.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_normalises_slashes() {
        assert_eq!(endpoint("http://x/", "/search"), "http://x/search");
        assert_eq!(endpoint("http://x", "search"), "http://x/search");
        assert_eq!(endpoint("http://x//", "v2/directions"), "http://x/v2/directions");
    }

    #[test]
    fn test_parse_json_reports_context() {
        let err = parse_json::<Vec<u8>>("{", "nominatim search").unwrap_err();
        assert!(err.to_string().contains("nominatim search"));
    }
}
