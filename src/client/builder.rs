use crate::client::core::ServiceClient;
use crate::config::ClientConfig;
use crate::Result;
use std::path::PathBuf;

/// Builder for creating clients with custom configuration.
///
/// A config file, when set, takes precedence over endpoint/API key values.
#[derive(Default)]
pub struct ServiceClientBuilder {
    endpoint: Option<String>,
    api_key: Option<String>,
    verify_certificate: Option<bool>,
    config_file: Option<PathBuf>,
    query_timeout: Option<i64>,
}

impl ServiceClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn verify_certificate(mut self, verify: bool) -> Self {
        self.verify_certificate = Some(verify);
        self
    }

    /// Read connection parameters from an INI config file instead.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Initial query timeout in seconds, validated at build time.
    pub fn query_timeout(mut self, seconds: i64) -> Self {
        self.query_timeout = Some(seconds);
        self
    }

    /// Resolve the configuration without touching the network.
    pub fn resolve(self) -> Result<ClientConfig> {
        let mut config = match self.config_file {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::new(
                self.endpoint.unwrap_or_default(),
                self.api_key.unwrap_or_default(),
            )?
            .with_verify_certificate(self.verify_certificate.unwrap_or(false)),
        };
        if let Some(seconds) = self.query_timeout {
            config.set_query_timeout(seconds)?;
        }
        Ok(config)
    }

    /// Build the client, pinging the service once.
    pub fn build(self) -> Result<ServiceClient> {
        ServiceClient::connect(self.resolve()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_builder_requires_endpoint_and_key() {
        let err = ServiceClientBuilder::new().resolve().unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));

        let err = ServiceClientBuilder::new()
            .endpoint("http://svc")
            .resolve()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_builder_direct() {
        let config = ServiceClientBuilder::new()
            .endpoint("https://svc.example.com")
            .api_key("abc")
            .verify_certificate(true)
            .query_timeout(25)
            .resolve()
            .unwrap();
        assert_eq!(config.endpoint(), "https://svc.example.com");
        assert!(config.verify_certificate());
        assert_eq!(config.query_timeout(), Duration::from_secs(25));
    }

    #[test]
    fn test_builder_rejects_bad_timeout() {
        let err = ServiceClientBuilder::new()
            .endpoint("http://svc")
            .api_key("abc")
            .query_timeout(0)
            .resolve()
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_config_file_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[Service Info]\nendpoint = http://from-file\napi key = file-key").unwrap();

        let config = ServiceClientBuilder::new()
            .endpoint("http://from-args")
            .api_key("arg-key")
            .config_file(file.path())
            .resolve()
            .unwrap();
        assert_eq!(config.endpoint(), "http://from-file");
        assert_eq!(config.api_key(), "file-key");
        assert!(!config.verify_certificate());
    }
}
