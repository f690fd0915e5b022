//! Configuration management.
//!
//! Settings are loaded from the embedded `client-fingerprint.toml` and merged
//! with environment variables prefixed with `CLIENT_FINGERPRINT__`. For
//! example, `CLIENT_FINGERPRINT__USER_AGENT__MAX_LENGTH` overrides
//! `user_agent.max_length`.

use std::str;

use config::{Config, Environment, File, FileFormat};
use error_stack::{Report, ResultExt};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::constants::ENV_PREFIX;
use crate::error::FingerprintError;

/// How the process is being driven.
///
/// Offline invocations (command line, batch jobs) have no network peer and no
/// real client, so the accessor substitutes configured values instead of
/// reading the request context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// A real network request; values come from the request context.
    Http,
    /// No network peer; the configured substitutions apply.
    Offline,
}

/// User-agent handling options.
#[derive(Debug, Deserialize, Validate)]
pub struct UserAgent {
    /// Characters kept from the header before validation.
    #[validate(range(min = 1))]
    pub max_length: usize,
}

/// Values substituted when running in [`ExecutionMode::Offline`].
#[derive(Debug, Deserialize, Validate)]
pub struct Offline {
    /// Stand-in peer address, normally loopback.
    #[validate(custom(function = validate_ip_literal))]
    pub ip_address: String,
    /// Stand-in user agent.
    #[validate(length(min = 1))]
    pub user_agent: String,
}

/// Top-level settings for the fingerprint helper.
#[derive(Debug, Deserialize, Validate)]
pub struct Settings {
    pub mode: ExecutionMode,
    #[validate(nested)]
    pub user_agent: UserAgent,
    #[validate(nested)]
    pub offline: Offline,
}

fn validate_ip_literal(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<std::net::IpAddr>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("not a valid IP address"))
}

impl Settings {
    /// Loads the embedded default configuration, merged with environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError::Configuration`] if the merged
    /// configuration fails to parse or validate.
    pub fn new() -> Result<Self, Report<FingerprintError>> {
        let toml_bytes = include_bytes!("../../../client-fingerprint.toml");
        let toml_str = str::from_utf8(toml_bytes).change_context(FingerprintError::Configuration {
            message: "embedded settings are not valid UTF-8".to_string(),
        })?;

        Self::from_toml(toml_str)
    }

    /// Parses settings from a TOML string, merged with environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError::Configuration`] on parse or validation
    /// failure.
    pub fn from_toml(toml_str: &str) -> Result<Self, Report<FingerprintError>> {
        let environment = Environment::default().prefix(ENV_PREFIX).separator("__");

        let toml = File::from_str(toml_str, FileFormat::Toml);
        let config = Config::builder()
            .add_source(toml)
            .add_source(environment)
            .build()
            .change_context(FingerprintError::Configuration {
                message: "failed to read configuration".to_string(),
            })?;

        let settings: Settings =
            config
                .try_deserialize()
                .change_context(FingerprintError::Configuration {
                    message: "configuration does not match the settings schema".to_string(),
                })?;

        settings
            .validate()
            .map_err(|e| {
                Report::new(FingerprintError::Configuration {
                    message: e.to_string(),
                })
            })?;

        Ok(settings)
    }
}
