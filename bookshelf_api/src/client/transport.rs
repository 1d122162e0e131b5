use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// The only error surfaced by the client. Carries a message meant for the user,
/// whatever went wrong underneath (status, network or decoding)
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RequestError {
    message: String,
}

impl RequestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Builds the error and logs it, every failing request goes through here
fn fail(message: impl Into<String>) -> RequestError {
    let error = RequestError::new(message);
    tracing::error!("API Error: {}", error.message());
    error
}

#[derive(Debug, Clone)]
/// Per request options. Headers are applied over the JSON defaults
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    /// Already serialized payload
    pub body: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn with_method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn post() -> Self {
        Self::with_method(Method::POST)
    }

    pub fn put() -> Self {
        Self::with_method(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::with_method(Method::DELETE)
    }

    pub fn body(self, body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..self
        }
    }

    /// Serializes `payload` into the request body
    pub fn json<T: Serialize + ?Sized>(self, payload: &T) -> Result<Self, RequestError> {
        let body = serde_json::to_string(payload)
            .map_err(|err| fail(format!("Failed to serialize request body: {err}")))?;
        Ok(self.body(body))
    }

    pub fn header(mut self, name: &str, value: &str) -> Result<Self, RequestError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| fail(format!("Invalid header name {name}: {err}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|err| fail(format!("Invalid header value for {name}: {err}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// Caller entries replace defaults of the same name, all other defaults stay
pub(crate) fn merge_headers(overrides: &HeaderMap) -> HeaderMap {
    let mut merged = default_headers();
    for name in overrides.keys() {
        merged.remove(name);
    }
    for (name, value) in overrides.iter() {
        merged.append(name.clone(), value.clone());
    }
    merged
}

/// Message of a failed response: the `detail` field of a JSON body,
/// or the status code when there is nothing better
pub(crate) fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("detail").cloned())
        .and_then(|detail| match detail {
            serde_json::Value::Null => None,
            serde_json::Value::String(detail) if detail.is_empty() => None,
            serde_json::Value::String(detail) => Some(detail),
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

/// Single chokepoint for every call made against the catalogue service
pub struct Transport {
    base_url: String,
    client: ClientWithMiddleware,
}

impl Transport {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Calls `base_url + path` and decodes the JSON body of a successful response.
    /// Fails exactly once, no retries
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, RequestError> {
        let url = self.url(path);
        let method = options.method.clone();
        let mut request = self
            .client
            .request(options.method, &url)
            .headers(merge_headers(&options.headers));
        if let Some(body) = options.body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|err| fail(format!("{method} {url} failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(fail(error_message(status, &body)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| fail(format!("Failed to read response of {method} {url}: {err}")))?;
        serde_json::from_slice(&body)
            .map_err(|err| fail(format!("Failed to parse response of {method} {url}: {err}")))
    }
}
