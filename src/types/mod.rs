//! 类型模块：Predictive Service 请求与响应的数据类型。
//!
//! # Types Module
//!
//! Strongly-typed representations of what travels over the wire.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SchemaVersion`] | Version advertised by the service on ping; decides body shaping |
//! | [`QueryRequest`] | Query against a deployed predictive object |
//! | [`FeedbackRequest`] | Free-form feedback keyed by a request id |
//! | [`ServiceResponse`] | Parsed JSON object returned by the service |

pub mod request;
pub mod response;
pub mod schema;

pub use request::{encode_uri, FeedbackRequest, QueryRequest};
pub use response::ServiceResponse;
pub use schema::SchemaVersion;
