//! HTTP session plumbing shared by every client call.

pub mod http;

pub use http::{HttpReply, HttpTransport, TransportError};
