use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::normalize::extract_message;

pub const DEFAULT_PROXY_PREFIX: &str = "https://corsproxy.io/?";
pub const DEFAULT_USER_AGENT: &str = concat!("f2p-cli/", env!("CARGO_PKG_VERSION"));

const OFFLINE_MESSAGE: &str = "You appear offline. Check your internet connection.";

/// Substrings that mark a transport failure as a reachability or
/// cross-origin problem rather than a definitive rejection.
const RETRYABLE_SIGNATURES: [&str; 4] = ["failed to fetch", "networkerror", "cors", "blocked"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Precondition,
    NonRetryable,
    HttpError,
    ProxyHttpError,
    Parse,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FetchError {
    pub kind: ErrorKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

pub type FetchResult = Result<Value, FetchError>;

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub proxy_prefix: String,
    pub proxy_fallback: bool,
    pub offline: bool,
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            proxy_prefix: DEFAULT_PROXY_PREFIX.to_string(),
            proxy_fallback: true,
            offline: false,
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// No connection could be established: refused, DNS failure, or no route.
    Unreachable,
    Timeout,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        if self.kind == TransportErrorKind::Unreachable {
            return true;
        }
        let lowered = self.message.to_lowercase();
        RETRYABLE_SIGNATURES
            .iter()
            .any(|signature| lowered.contains(signature))
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: &FetchSettings) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().user_agent(settings.user_agent.clone());
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(TransportResponse {
            status,
            content_type,
            body,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    let message = error_chain(&err);
    if err.is_timeout() {
        return TransportError::new(TransportErrorKind::Timeout, message);
    }
    // A host that accepted the connection and answered badly is not retried.
    if err.is_connect() {
        return TransportError::new(TransportErrorKind::Unreachable, message);
    }
    TransportError::new(TransportErrorKind::Other, message)
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Direct,
    Proxied,
}

/// GET with one escalation step: a direct request, then a single retry
/// through the proxy when the direct attempt fails with a retryable error.
pub struct Fetcher<T = ReqwestTransport> {
    transport: T,
    settings: FetchSettings,
}

impl Fetcher<ReqwestTransport> {
    pub fn from_settings(settings: FetchSettings) -> Result<Self, reqwest::Error> {
        let transport = ReqwestTransport::new(&settings)?;
        Ok(Self::new(transport, settings))
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, settings: FetchSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub async fn fetch(&self, url: &str) -> FetchResult {
        self.check_preconditions(url)?;

        debug!(url, "direct request");
        let err = match self.transport.get(url).await {
            Ok(response) => return settle(Attempt::Direct, response),
            Err(err) => err,
        };

        if !err.is_retryable() || !self.settings.proxy_fallback {
            debug!(url, error = %err, "direct request failed, not retrying");
            return Err(FetchError::new(ErrorKind::NonRetryable, err.message));
        }

        let proxied = proxied_url(&self.settings.proxy_prefix, url);
        warn!(url, error = %err, "direct request failed, retrying through proxy");
        match self.transport.get(&proxied).await {
            Ok(response) => settle(Attempt::Proxied, response),
            Err(err) => Err(FetchError::new(ErrorKind::NonRetryable, err.message)),
        }
    }

    fn check_preconditions(&self, url: &str) -> Result<(), FetchError> {
        let parsed = Url::parse(url).map_err(|e| {
            FetchError::new(ErrorKind::Precondition, format!("invalid url '{url}': {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::new(
                ErrorKind::Precondition,
                format!(
                    "{}:// urls cannot be fetched; use an http(s) endpoint.",
                    parsed.scheme()
                ),
            ));
        }
        if self.settings.offline {
            return Err(FetchError::new(ErrorKind::Precondition, OFFLINE_MESSAGE));
        }
        Ok(())
    }
}

fn settle(attempt: Attempt, response: TransportResponse) -> FetchResult {
    if response.is_success() {
        return parse_payload(response.content_type.as_deref(), &response.body);
    }

    // An error body that claims JSON but does not parse carries no message.
    let body =
        parse_payload(response.content_type.as_deref(), &response.body).unwrap_or(Value::Null);
    let extracted = extract_message(&body);
    let (kind, message) = match attempt {
        Attempt::Direct => (ErrorKind::HttpError, "API request failed"),
        Attempt::Proxied => (ErrorKind::ProxyHttpError, "Proxy request failed"),
    };
    let message = if extracted.is_empty() {
        format!("{message} ({})", response.status)
    } else {
        extracted
    };
    debug!(status = response.status, ?attempt, %message, "request rejected");
    Err(FetchError::new(kind, message))
}

/// Declared JSON must parse; anything else is parsed best-effort and falls
/// back to the raw text.
pub fn parse_payload(content_type: Option<&str>, body: &str) -> FetchResult {
    let declared_json = content_type
        .map(|ct| ct.to_lowercase().contains("application/json"))
        .unwrap_or(false);

    if declared_json {
        return serde_json::from_str(body).map_err(|e| {
            FetchError::new(ErrorKind::Parse, format!("invalid JSON response: {e}"))
        });
    }

    Ok(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
}

pub fn proxied_url(prefix: &str, url: &str) -> String {
    format!("{prefix}{}", urlencoding::encode(url))
}
