//! 客户端配置：端点、API 密钥与证书校验设置。
//!
//! Client configuration.
//!
//! Connection parameters come from one of three places:
//!
//! - explicit arguments ([`ClientConfig::new`]),
//! - an INI file with a `[Service Info]` section ([`ClientConfig::from_file`]),
//! - environment variables ([`ClientConfig::from_env`]).
//!
//! ```ini
//! [Service Info]
//! endpoint = https://myservice.mycompany.com
//! api key = api-key-string
//! verify certificate = False
//! ```

use crate::error::{Error, ErrorContext};
use crate::Result;
use ini::{EscapePolicy, Ini, ParseOption};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use url::Url;

pub const SERVICE_INFO_SECTION: &str = "Service Info";
pub const ENDPOINT_KEY: &str = "endpoint";
pub const API_KEY_KEY: &str = "api key";
pub const VERIFY_CERTIFICATE_KEY: &str = "verify certificate";

/// Timeout applied to feedback calls, the ping, and queries until changed.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const ENV_CONFIG_FILE: &str = "PREDICTIVE_SERVICE_CONFIG";
pub const ENV_ENDPOINT: &str = "PREDICTIVE_SERVICE_ENDPOINT";
pub const ENV_API_KEY: &str = "PREDICTIVE_SERVICE_API_KEY";
pub const ENV_VERIFY_CERTIFICATE: &str = "PREDICTIVE_SERVICE_VERIFY_CERTIFICATE";

/// Resolved connection parameters for one client.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    endpoint: String,
    api_key: String,
    verify_certificate: bool,
    query_timeout: Duration,
}

impl ClientConfig {
    /// Build a config from explicit values. Certificate verification is off
    /// unless enabled with [`ClientConfig::with_verify_certificate`].
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        let api_key = api_key.into();
        if endpoint.trim().is_empty() || api_key.trim().is_empty() {
            return Err(Error::configuration(
                "Either 'config_file' or ('endpoint' and 'api_key') pair need to be provided to initialize the client",
            ));
        }
        Ok(Self {
            endpoint: normalize_endpoint(&endpoint)?,
            api_key,
            verify_certificate: false,
            query_timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_verify_certificate(mut self, verify: bool) -> Self {
        self.verify_certificate = verify;
        self
    }

    /// Load the `[Service Info]` section of an INI file.
    ///
    /// A leading `~` expands to the user's home directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = expand_home(path.as_ref());
        let file_ctx = || {
            ErrorContext::new()
                .with_source("config_file")
                .with_details(path.display().to_string())
        };

        if !path.is_file() {
            return Err(Error::configuration_with_context(
                format!("Path '{}' is not a file", path.display()),
                file_ctx(),
            ));
        }

        let ini = Ini::load_from_file_opt(&path, literal_parse_option()).map_err(|e| {
            Error::configuration_with_context(
                format!("Cannot parse config file: {}", e),
                file_ctx(),
            )
        })?;

        let section = ini.section(Some(SERVICE_INFO_SECTION)).ok_or_else(|| {
            Error::configuration_with_context(
                format!(
                    "Cannot find {} section in config file {}",
                    SERVICE_INFO_SECTION,
                    path.display()
                ),
                file_ctx(),
            )
        })?;

        let required = |key: &str| {
            section
                .get(key)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    Error::configuration_with_context(
                        format!("Missing '{}' in {} section", key, SERVICE_INFO_SECTION),
                        file_ctx().with_field_path(format!("{}.{}", SERVICE_INFO_SECTION, key)),
                    )
                })
        };

        let endpoint = required(ENDPOINT_KEY)?;
        let api_key = required(API_KEY_KEY)?;
        let verify_certificate = match section.get(VERIFY_CERTIFICATE_KEY) {
            Some(raw) => parse_bool(raw).ok_or_else(|| {
                Error::configuration_with_context(
                    format!("Not a boolean: '{}'", raw),
                    file_ctx().with_field_path(format!(
                        "{}.{}",
                        SERVICE_INFO_SECTION, VERIFY_CERTIFICATE_KEY
                    )),
                )
            })?,
            None => false,
        };

        let config = Self::new(endpoint, api_key)?.with_verify_certificate(verify_certificate);
        info!(endpoint = %config.endpoint, "Read configuration");
        Ok(config)
    }

    /// Resolve from the environment.
    ///
    /// `PREDICTIVE_SERVICE_CONFIG` (a config file path) wins; otherwise
    /// `PREDICTIVE_SERVICE_ENDPOINT` and `PREDICTIVE_SERVICE_API_KEY` are
    /// required and `PREDICTIVE_SERVICE_VERIFY_CERTIFICATE` is optional.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = env::var(ENV_CONFIG_FILE) {
            return Self::from_file(path);
        }

        let endpoint = env::var(ENV_ENDPOINT).unwrap_or_default();
        let api_key = env::var(ENV_API_KEY).unwrap_or_default();
        let verify_certificate = match env::var(ENV_VERIFY_CERTIFICATE) {
            Ok(raw) => parse_bool(&raw).ok_or_else(|| {
                Error::configuration_with_context(
                    format!("Not a boolean: '{}'", raw),
                    ErrorContext::new()
                        .with_field_path(ENV_VERIFY_CERTIFICATE)
                        .with_source("env"),
                )
            })?,
            Err(_) => false,
        };

        Self::new(endpoint, api_key)
            .map(|c| c.with_verify_certificate(verify_certificate))
            .map_err(|e| match e {
                Error::Configuration { message, .. } => Error::configuration_with_context(
                    message,
                    ErrorContext::new()
                        .with_source("env")
                        .with_details(format!("set {} or {} and {}", ENV_CONFIG_FILE, ENV_ENDPOINT, ENV_API_KEY)),
                ),
                other => other,
            })
    }

    /// Write this config in the format [`ClientConfig::from_file`] reads.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = expand_home(path.as_ref());
        let mut ini = Ini::new();
        ini.with_section(Some(SERVICE_INFO_SECTION))
            .set(ENDPOINT_KEY, self.endpoint.as_str())
            .set(API_KEY_KEY, self.api_key.as_str())
            .set(
                VERIFY_CERTIFICATE_KEY,
                if self.verify_certificate { "True" } else { "False" },
            );
        ini.write_to_file_policy(&path, EscapePolicy::Nothing)?;
        info!(path = %path.display(), "Wrote client configuration");
        Ok(())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn verify_certificate(&self) -> bool {
        self.verify_certificate
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Change the timeout for subsequent queries. Must be a positive number of seconds.
    pub fn set_query_timeout(&mut self, seconds: i64) -> Result<()> {
        if seconds <= 0 {
            return Err(Error::invalid_argument_with_context(
                "\"timeout\" value has to be a positive integer in seconds",
                ErrorContext::new()
                    .with_field_path("timeout")
                    .with_details(format!("got {}", seconds)),
            ));
        }
        self.query_timeout = Duration::from_secs(seconds as u64);
        Ok(())
    }

    /// Absolute URL of `path` under the endpoint.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("verify_certificate", &self.verify_certificate)
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}

fn normalize_endpoint(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|e| {
        Error::configuration_with_context(
            format!("invalid endpoint URL: {}", e),
            ErrorContext::new()
                .with_field_path("endpoint")
                .with_details(trimmed),
        )
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::configuration_with_context(
            format!("unsupported endpoint scheme '{}'", url.scheme()),
            ErrorContext::new()
                .with_field_path("endpoint")
                .with_details("expected http or https"),
        ));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Boolean spellings accepted in config files.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

/// Values are taken literally: no quote stripping and no backslash escapes.
fn literal_parse_option() -> ParseOption {
    ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..Default::default()
    }
}

fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = env::var_os("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}
