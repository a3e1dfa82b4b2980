use crate::authentication::Session;
use crate::configuration::{Endpoint, EndpointError, Settings};
use crate::domain::ResourceId;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use reqwest::{Client, Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;

#[derive(thiserror::Error)]
pub enum RequestError {
    #[error("Timeout when calling {url}: {source}")]
    Timeout {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Connection error when calling {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Unexpected error when calling {url}: {source}")]
    Unexpected {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl RequestError {
    fn classify(url: &str, source: reqwest::Error) -> Self {
        let url = url.to_owned();
        if source.is_timeout() {
            RequestError::Timeout { url, source }
        } else if source.is_connect() {
            RequestError::Connection { url, source }
        } else {
            RequestError::Unexpected { url, source }
        }
    }

    pub fn url(&self) -> &str {
        match self {
            RequestError::Timeout { url, .. }
            | RequestError::Connection { url, .. }
            | RequestError::Unexpected { url, .. } => url,
        }
    }
}

impl std::fmt::Debug for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        crate::utils::error_chain_fmt(self, f)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CallError {
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
    #[error(transparent)]
    Request(#[from] RequestError),
}

/// A response body: parsed JSON when possible, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return ResponseBody::Text(String::new());
        }
        match serde_json::from_slice(bytes) {
            Ok(json) => ResponseBody::Json(json),
            Err(_) => ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(json) => Some(json),
            ResponseBody::Text(_) => None,
        }
    }

    /// Whether the body is a JSON mapping with `key` at its top level.
    pub fn has_key(&self, key: &str) -> bool {
        self.as_json()
            .and_then(|json| json.as_object())
            .is_some_and(|object| object.contains_key(key))
    }
}

impl std::fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseBody::Json(json) => write!(f, "{}", json),
            ResponseBody::Text(text) => write!(f, "{}", text),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: ResponseBody,
}

impl ApiResponse {
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }
}

#[derive(Debug, Clone)]
enum RequestBody {
    Json(serde_json::Value),
    Raw(String),
}

/// Per-call knobs of [`ApiClient::safe_request`].
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    headers: HeaderMap,
    body: Option<RequestBody>,
    timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Authenticate the call with the session's default headers.
    pub fn session(mut self, session: &Session) -> Self {
        self.headers.extend(session.headers());
        self
    }

    /// Drop the `Authorization` header, keeping any other session header.
    pub fn without_auth(mut self) -> Self {
        self.headers.remove(AUTHORIZATION);
        self
    }

    pub fn json(mut self, payload: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(payload));
        self
    }

    /// Send `body` verbatim, without a content type.
    pub fn raw_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Raw(body.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http_client: Client,
    settings: Arc<Settings>,
}

impl ApiClient {
    pub fn new(settings: Settings) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self {
            http_client,
            settings: Arc::new(settings),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn url_for(
        &self,
        endpoint: Endpoint,
        id: Option<&ResourceId>,
    ) -> Result<String, EndpointError> {
        self.settings
            .url_for(endpoint, id.map(|id| id.as_ref()))
    }

    /// Perform a call with a bounded timeout.
    ///
    /// Transport failures come back as a [`RequestError`] naming the URL;
    /// a body that is not JSON comes back as [`ResponseBody::Text`].
    #[tracing::instrument(
        name = "Sending API request",
        skip(self, options),
        fields(status = tracing::field::Empty)
    )]
    pub async fn safe_request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, RequestError> {
        let mut builder = self
            .http_client
            .request(method, url)
            .headers(options.headers)
            .timeout(options.timeout.unwrap_or_else(|| self.settings.request_timeout()));
        builder = match options.body {
            Some(RequestBody::Json(json)) => builder.json(&json),
            Some(RequestBody::Raw(raw)) => builder.body(raw),
            None => builder,
        };

        let response = builder.send().await.map_err(|e| {
            let error = RequestError::classify(url, e);
            tracing::error!(error.cause_chain = ?error, error.message = %error, "Request failed");
            error
        })?;
        let status = response.status();
        tracing::Span::current().record("status", status.as_u16());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RequestError::classify(url, e))?;
        Ok(ApiResponse {
            status,
            body: ResponseBody::from_bytes(&bytes),
        })
    }

    /// [`Self::safe_request`] against a configured endpoint.
    pub async fn call(
        &self,
        method: Method,
        endpoint: Endpoint,
        id: Option<&ResourceId>,
        options: RequestOptions,
    ) -> Result<ApiResponse, CallError> {
        let url = self.url_for(endpoint, id)?;
        Ok(self.safe_request(method, &url, options).await?)
    }
}
