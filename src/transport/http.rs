use crate::Result;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Proxy;
use serde_json::Value;
use std::env;
use std::time::Duration;
use tracing::debug;

/// Username sent with every basic-auth header; the password is the API key.
pub const BASIC_AUTH_USER: &str = "api_key";

/// Blocking HTTP session bound to one client.
///
/// Owns the connection pool for its whole lifetime; dropping the transport
/// (or calling [`HttpTransport::close`]) releases every pooled connection.
pub struct HttpTransport {
    client: Client,
    api_key: String,
}

/// Status and raw body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

impl HttpTransport {
    pub fn new(verify_certificate: bool, api_key: impl Into<String>) -> Result<Self> {
        // HTTP(S)_PROXY / NO_PROXY are honoured; PREDICTIVE_PROXY_URL adds an explicit proxy.
        let mut builder = Client::builder().danger_accept_invalid_certs(!verify_certificate);

        if let Ok(proxy_url) = env::var("PREDICTIVE_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder
            .build()
            .map_err(|e| crate::Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }

    /// Unauthenticated GET, used by the liveness probe.
    pub fn get(&self, url: &str, timeout: Duration) -> Result<HttpReply> {
        debug!(%url, "GET");
        Self::execute(self.client.get(url).timeout(timeout))
    }

    /// POST a JSON body with basic-auth credentials.
    pub fn post_json(&self, url: &str, body: &Value, timeout: Duration) -> Result<HttpReply> {
        debug!(%url, timeout_secs = timeout.as_secs(), "POST");
        let request = self
            .client
            .post(url)
            .basic_auth(BASIC_AUTH_USER, Some(&self.api_key))
            .json(body)
            .timeout(timeout);
        Self::execute(request)
    }

    fn execute(request: RequestBuilder) -> Result<HttpReply> {
        let response = request.send().map_err(TransportError::Http)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(TransportError::Http)?;
        Ok(HttpReply { status, body })
    }

    /// Release the session and its pooled connections.
    pub fn close(self) {
        drop(self);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Http(e) if e.is_timeout())
    }
}
