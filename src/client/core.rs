use crate::config::{ClientConfig, DEFAULT_TIMEOUT};
use crate::transport::{HttpReply, HttpTransport};
use crate::types::{FeedbackRequest, QueryRequest, SchemaVersion, ServiceResponse};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, info_span, warn, Span};

/// Blocking client for a Predictive Service deployment.
///
/// Construction resolves the configuration, opens an HTTP session and pings
/// the endpoint once to learn the service schema version. A failed ping is
/// not an error: the version stays [`SchemaVersion::UNKNOWN`] and requests
/// fall back to the oldest body shape.
///
/// ```rust,no_run
/// use predictive_client::ServiceClient;
/// use serde_json::json;
///
/// # fn main() -> predictive_client::Result<()> {
/// let client = ServiceClient::from_config_file("~/.predictive/client.conf")?;
/// let result = client.query(
///     "recommender",
///     &json!({"method": "predict", "data": {"dataset": {"user_id": 175343, "product_id": 1011}}}),
/// )?;
/// println!("{:?}", result.response());
/// # Ok(())
/// # }
/// ```
pub struct ServiceClient {
    config: ClientConfig,
    transport: HttpTransport,
    schema_version: SchemaVersion,
    span: Span,
}

impl ServiceClient {
    /// Connect with explicit parameters.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        verify_certificate: bool,
    ) -> Result<Self> {
        let config = ClientConfig::new(endpoint, api_key)?.with_verify_certificate(verify_certificate);
        Self::connect(config)
    }

    /// Connect using the `[Service Info]` section of a config file.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::connect(ClientConfig::from_file(path)?)
    }

    /// Connect using [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::connect(ClientConfig::from_env()?)
    }

    pub fn builder() -> crate::client::builder::ServiceClientBuilder {
        crate::client::builder::ServiceClientBuilder::new()
    }

    /// Open the session for an already resolved config and ping the service.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let span = info_span!("predictive_client", endpoint = %config.endpoint());
        let transport = HttpTransport::new(config.verify_certificate(), config.api_key())?;

        let mut client = Self {
            config,
            transport,
            schema_version: SchemaVersion::UNKNOWN,
            span,
        };
        client.schema_version = client.discover_schema_version();
        Ok(client)
    }

    fn discover_schema_version(&self) -> SchemaVersion {
        let _enter = self.span.enter();
        match self.ping() {
            Ok(version) => {
                info!(schema_version = %version, "Successfully connected");
                version
            }
            Err(e) => {
                warn!(error = %e, "Ping failed, assuming legacy schema");
                SchemaVersion::UNKNOWN
            }
        }
    }

    fn ping(&self) -> Result<SchemaVersion> {
        info!("Connecting to Predictive Service");
        let reply = self.transport.get(self.config.endpoint(), DEFAULT_TIMEOUT)?;
        if !reply.is_ok() {
            return Err(Error::Request {
                status: reply.status,
                body: reply.body,
            });
        }
        Ok(SchemaVersion::from_ping_body(&reply.body))
    }

    /// Set the timeout, in seconds, for subsequent [`ServiceClient::query`] calls.
    pub fn set_query_timeout(&mut self, seconds: i64) -> Result<()> {
        self.config.set_query_timeout(seconds)?;
        let _enter = self.span.enter();
        debug!(seconds, "Query timeout updated");
        Ok(())
    }

    /// Query a deployed predictive object.
    ///
    /// `params` must serialize to a JSON object; it is sent as the `data`
    /// field of the request body. On success the prediction is in
    /// [`ServiceResponse::response`].
    pub fn query<P: Serialize + ?Sized>(&self, uri: &str, params: &P) -> Result<ServiceResponse> {
        let request = QueryRequest::new(uri, params)?;
        let _enter = self.span.enter();

        let encoded = request.encoded_uri();
        let url = self.config.url_for(&request.path());
        let body = request.into_body(self.schema_version, self.config.api_key());

        let reply = self
            .transport
            .post_json(&url, &Value::Object(body), self.config.query_timeout())?;
        debug!(uri = %encoded, status = reply.status, "Query completed");

        match reply.status {
            200 => ServiceResponse::parse(&reply.body),
            404 => Err(Error::NotFound { uri: encoded }),
            _ => Err(request_error(reply)),
        }
    }

    /// Submit free-form feedback about an earlier query result.
    ///
    /// Always uses the default 10s timeout regardless of
    /// [`ServiceClient::set_query_timeout`].
    pub fn feedback<D: Serialize + ?Sized>(&self, key: &str, data: &D) -> Result<ServiceResponse> {
        let request = FeedbackRequest::new(key, data)?;
        let _enter = self.span.enter();

        let url = self.config.url_for(FeedbackRequest::PATH);
        let body = request.into_body(self.schema_version, self.config.api_key());

        let reply = self
            .transport
            .post_json(&url, &Value::Object(body), DEFAULT_TIMEOUT)?;
        debug!(key, status = reply.status, "Feedback submitted");

        if reply.is_ok() {
            ServiceResponse::parse(&reply.body)
        } else {
            Err(request_error(reply))
        }
    }

    pub fn endpoint(&self) -> &str {
        self.config.endpoint()
    }

    pub fn schema_version(&self) -> SchemaVersion {
        self.schema_version
    }

    pub fn verify_certificate(&self) -> bool {
        self.config.verify_certificate()
    }

    pub fn query_timeout(&self) -> std::time::Duration {
        self.config.query_timeout()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Release the HTTP session. Dropping the client has the same effect.
    pub fn close(self) {
        let _enter = self.span.enter();
        debug!("Closing session");
        self.transport.close();
    }
}

fn request_error(reply: HttpReply) -> Error {
    Error::Request {
        status: reply.status,
        body: reply.body,
    }
}

impl fmt::Display for ServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Predictive Service Client:")?;
        writeln!(f, "\tendpoint: {}", self.config.endpoint())
    }
}

impl fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceClient")
            .field("config", &self.config)
            .field("schema_version", &self.schema_version)
            .finish_non_exhaustive()
    }
}
