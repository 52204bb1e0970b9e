//! Stateless typed client for the processing service.
//!
//! # Design
//! `ApiClient` holds only a `base_url` and the transport it was given; no
//! state survives a call. Each exchange is split into a `build_*` method that
//! produces an `HttpRequest` and `parse`, which consumes an `HttpResponse`.
//! `get` and `post` chain the two around one `Transport::send`, so callers
//! that run their own I/O can still use the build/parse halves directly.
//!
//! Keys are snake_case on the wire and camelCase on the application side.
//! Outgoing params and bodies go through `case::encode`; incoming bodies
//! through `case::decode` before being deserialized into the caller's type.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::case;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::query;

/// Environment variable read by [`ApiClient::from_env`].
pub const BASE_URL_ENV: &str = "SUNSPOT_API_URL";

/// Base URL used when [`BASE_URL_ENV`] is unset.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Typed client over an injected [`Transport`].
#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    base_url: String,
    transport: T,
}

impl<T> ApiClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    /// Build a client whose base URL comes from `SUNSPOT_API_URL`.
    pub fn from_env(transport: T) -> Self {
        Self::from_env_value(std::env::var(BASE_URL_ENV).ok(), transport)
    }

    /// Build a client from an optional base URL, falling back to
    /// [`DEFAULT_BASE_URL`].
    pub fn from_env_value(base_url: Option<String>, transport: T) -> Self {
        Self::new(base_url.as_deref().unwrap_or(DEFAULT_BASE_URL), transport)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build a GET request, with `params` encoded into the query string.
    ///
    /// Parameters that serialize to `null` are left out entirely; arrays are
    /// written as repeated keys.
    pub fn build_get<P>(&self, path: &str, params: &P) -> Result<HttpRequest, ApiError>
    where
        P: Serialize + ?Sized,
    {
        let params = to_wire(params)?;
        let url = query::append_query(&self.url(path), &params)?;
        debug!(method = HttpMethod::Get.as_str(), %url, "built request");
        Ok(HttpRequest {
            method: HttpMethod::Get,
            path: url,
            headers: Vec::new(),
            body: None,
        })
    }

    /// Build a POST request carrying `body` as snake_case JSON.
    pub fn build_post<B>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let body = match to_wire(body)? {
            Value::Null => None,
            wire => Some(serde_json::to_string(&wire).map_err(|e| ApiError::Serialization(e.to_string()))?),
        };
        let url = self.url(path);
        debug!(method = HttpMethod::Post.as_str(), %url, "built request");
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: url,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body,
        })
    }

    /// Classify `response` and decode a success body into `R`.
    pub fn parse<R: DeserializeOwned>(&self, response: HttpResponse) -> Result<R, ApiError> {
        debug!(status = response.status, "received response");
        check_status(&response)?;

        let raw: Value = if response.body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))?
        };
        serde_json::from_value(case::decode(&raw)).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

impl<T: Transport> ApiClient<T> {
    /// GET `path` with `params` in the query string and decode the reply.
    ///
    /// Pass `&()` when the endpoint takes no parameters.
    pub async fn get<R, P>(&self, path: &str, params: &P) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let request = self.build_get(path, params)?;
        self.exchange(request).await
    }

    /// POST `body` as JSON to `path` and decode the reply.
    pub async fn post<R, B>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.build_post(path, body)?;
        self.exchange(request).await
    }

    async fn exchange<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, ApiError> {
        let response = self.transport.send(request).await.map_err(ApiError::Transport)?;
        self.parse(response)
    }
}

/// Serialize an application-side value and rename its keys for the wire.
fn to_wire<V: Serialize + ?Sized>(value: &V) -> Result<Value, ApiError> {
    let value = serde_json::to_value(value).map_err(|e| ApiError::Serialization(e.to_string()))?;
    Ok(case::encode(&value))
}

/// Map a non-2xx response to `Http`, or `MalformedErrorBody` when its
/// `detail` cannot be read.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let status = response.status;

    let body: Value = serde_json::from_str(&response.body).map_err(|e| {
        warn!(status, error = %e, "error response is not JSON");
        ApiError::MalformedErrorBody {
            status,
            reason: e.to_string(),
        }
    })?;

    let detail = match body.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        // Validation failures carry a list of issues; keep them readable.
        Some(detail) if !detail.is_null() => detail.to_string(),
        _ => {
            warn!(status, "error response has no detail");
            return Err(ApiError::MalformedErrorBody {
                status,
                reason: "missing `detail` field".to_string(),
            });
        }
    };

    warn!(status, %detail, "request failed");
    Err(ApiError::Http { status, detail })
}
