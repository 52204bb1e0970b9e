//! Typed request/response client for the solar-data processing service.
//!
//! # Overview
//! Converts application-side values (camelCase JSON) into the service's
//! snake_case wire form, issues GET/POST exchanges through an injected
//! transport, and decodes replies back into the caller's types. Every failure
//! lands in one `ApiError` taxonomy.
//!
//! # Design
//! - `case` is a pure key-renaming pass over `serde_json::Value` trees.
//! - `ApiClient` is stateless: it holds `base_url` and a `Transport`.
//! - Requests are built and responses parsed as plain data (`build_*` /
//!   `parse`), so the I/O boundary stays explicit and testable.
//! - `ReqwestTransport` is the production transport; tests inject fixtures.

pub mod api;
pub mod case;
pub mod client;
pub mod error;
pub mod http;
pub mod query;
pub mod transport;
pub mod types;

pub use case::Case;
pub use client::ApiClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use transport::ReqwestTransport;
