//! Configuration from environment variables.
//!
//! Credentials and endpoints never live in code. [`load_config`] reads a
//! `.env` file first when one is present.

use std::time::Duration;

use crate::error::ConfigError;
use crate::http::DEFAULT_USER_AGENT;
use crate::mapmyindia::{self, MapmyIndiaConfig};
use crate::nominatim::{self, NominatimConfig};
use crate::openrouteservice::{self, OrsConfig};
use crate::osrm::OsrmConfig;
use crate::retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq)]
pub struct TripConfig {
    pub nominatim_base_url: String,
    pub ors_base_url: String,
    pub ors_api_key: Option<String>,
    pub osrm_base_url: String,
    pub osrm_profile: String,
    pub mapmyindia_token_url: String,
    pub mapmyindia_base_url: String,
    pub mapmyindia_client_id: String,
    pub mapmyindia_client_secret: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub lookup_interval_ms: u64,
    /// Ceiling on one planning run in seconds; 0 disables it.
    pub max_run_secs: u64,
    /// Fraction of the rated range considered safe, in (0, 1].
    pub safety_margin: f64,
    pub log_level: String,
}

impl TripConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff_base_ms: self.retry_backoff_ms,
        }
    }

    pub fn lookup_interval(&self) -> Duration {
        Duration::from_millis(self.lookup_interval_ms)
    }

    pub fn max_run(&self) -> Option<Duration> {
        (self.max_run_secs > 0).then(|| Duration::from_secs(self.max_run_secs))
    }

    pub fn nominatim(&self) -> NominatimConfig {
        NominatimConfig {
            base_url: self.nominatim_base_url.clone(),
            user_agent: self.user_agent.clone(),
            timeout_secs: self.timeout_secs,
            retry: self.retry_policy(),
        }
    }

    /// Returns `MissingEnvVar("ORS_API_KEY")` when no key was configured.
    pub fn openrouteservice(&self) -> Result<OrsConfig, ConfigError> {
        let api_key = self
            .ors_api_key
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("ORS_API_KEY".to_string()))?;
        Ok(OrsConfig {
            base_url: self.ors_base_url.clone(),
            user_agent: self.user_agent.clone(),
            timeout_secs: self.timeout_secs,
            retry: self.retry_policy(),
            ..OrsConfig::new(api_key)
        })
    }

    pub fn osrm(&self) -> OsrmConfig {
        OsrmConfig {
            base_url: self.osrm_base_url.clone(),
            profile: self.osrm_profile.clone(),
            timeout_secs: self.timeout_secs,
            retry: self.retry_policy(),
        }
    }

    pub fn mapmyindia(&self) -> MapmyIndiaConfig {
        MapmyIndiaConfig {
            token_url: self.mapmyindia_token_url.clone(),
            base_url: self.mapmyindia_base_url.clone(),
            timeout_secs: self.timeout_secs,
            retry: self.retry_policy(),
            ..MapmyIndiaConfig::new(
                self.mapmyindia_client_id.clone(),
                self.mapmyindia_client_secret.clone(),
            )
        }
    }
}

/// Load configuration from the environment, after loading `.env` if present.
pub fn load_config() -> Result<TripConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_config_from_env()
}

/// Load configuration from variables already in the process environment.
pub fn load_config_from_env() -> Result<TripConfig, ConfigError> {
    build_config(|key| std::env::var(key))
}

/// Parsing and validation, decoupled from the real environment so tests can
/// feed a `HashMap`.
pub fn build_config<F>(lookup: F) -> Result<TripConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let mapmyindia_client_id = require("MAPMYINDIA_CLIENT_ID")?;
    let mapmyindia_client_secret = require("MAPMYINDIA_CLIENT_SECRET")?;
    let ors_api_key = lookup("ORS_API_KEY").ok().filter(|v| !v.trim().is_empty());

    let timeout_secs = parse_u64("EV_PLANNER_TIMEOUT_SECS", "10")?;
    if timeout_secs == 0 {
        return Err(invalid("EV_PLANNER_TIMEOUT_SECS", "must be at least 1".to_string()));
    }
    let max_retries = parse_u32("EV_PLANNER_MAX_RETRIES", "1")?;
    let retry_backoff_ms = parse_u64("EV_PLANNER_RETRY_BACKOFF_MS", "500")?;
    let lookup_interval_ms = parse_u64("EV_PLANNER_LOOKUP_INTERVAL_MS", "1000")?;
    let max_run_secs = parse_u64("EV_PLANNER_MAX_RUN_SECS", "600")?;

    let safety_margin = or_default("EV_PLANNER_SAFETY_MARGIN", "0.8")
        .trim()
        .parse::<f64>()
        .map_err(|e| invalid("EV_PLANNER_SAFETY_MARGIN", e.to_string()))?;
    if !(safety_margin > 0.0 && safety_margin <= 1.0) {
        return Err(invalid(
            "EV_PLANNER_SAFETY_MARGIN",
            format!("{safety_margin} is outside (0, 1]"),
        ));
    }

    Ok(TripConfig {
        nominatim_base_url: or_default("NOMINATIM_BASE_URL", nominatim::DEFAULT_BASE_URL),
        ors_base_url: or_default("ORS_BASE_URL", openrouteservice::DEFAULT_BASE_URL),
        ors_api_key,
        osrm_base_url: or_default("OSRM_BASE_URL", "http://localhost:5000"),
        osrm_profile: or_default("OSRM_PROFILE", "car"),
        mapmyindia_token_url: or_default("MAPMYINDIA_TOKEN_URL", mapmyindia::DEFAULT_TOKEN_URL),
        mapmyindia_base_url: or_default("MAPMYINDIA_BASE_URL", mapmyindia::DEFAULT_BASE_URL),
        mapmyindia_client_id,
        mapmyindia_client_secret,
        user_agent: or_default("EV_PLANNER_USER_AGENT", DEFAULT_USER_AGENT),
        timeout_secs,
        max_retries,
        retry_backoff_ms,
        lookup_interval_ms,
        max_run_secs,
        safety_margin,
        log_level: or_default("EV_PLANNER_LOG_LEVEL", "info"),
    })
}
