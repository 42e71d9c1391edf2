//! # predictive-client
//!
//! 这是 Predictive Service 的 Rust 客户端：查询已部署的模型并提交反馈。
//!
//! Blocking HTTP client for Predictive Service deployments.
//!
//! ## Overview
//!
//! A [`ServiceClient`] resolves its connection parameters (endpoint, API key,
//! certificate verification) from explicit arguments, an INI config file, or
//! the environment, pings the endpoint once to learn the service schema
//! version, and then exposes two operations:
//!
//! - [`ServiceClient::query`]: `POST <endpoint>/query/<uri>` with `{"data": ...}`
//! - [`ServiceClient::feedback`]: `POST <endpoint>/feedback` with `{"data": ..., "id": ...}`
//!
//! Both authenticate with HTTP basic auth (user `api_key`). Services older
//! than schema version 7 also receive the key inside the JSON body.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use predictive_client::ServiceClient;
//! use serde_json::json;
//!
//! fn main() -> predictive_client::Result<()> {
//!     let mut client = ServiceClient::new("https://myservice.mycompany.com", "api-key", true)?;
//!     client.set_query_timeout(30)?;
//!
//!     let result = client.query("recommender", &json!({"method": "predict"}))?;
//!     println!("{:?}", result.response());
//!
//!     client.feedback("90f1101c-d025-44b0-a7b5-b0c208c3e095", &json!({"user_clicked": 3}))?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`ServiceClient`] and its builder |
//! | [`config`] | Connection parameters, config file and environment loading |
//! | [`transport`] | Blocking HTTP session |
//! | [`types`] | Request, response and schema version types |
//! | [`error`] | Error taxonomy |

pub mod client;
pub mod config;
pub mod error;
pub mod transport;
pub mod types;

pub use client::{ServiceClient, ServiceClientBuilder};
pub use config::ClientConfig;
pub use error::{Error, ErrorContext};
pub use types::{FeedbackRequest, QueryRequest, SchemaVersion, ServiceResponse};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;
