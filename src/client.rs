use std::sync::Mutex;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::logger::{MessageLogMode, MessageLogger};
use crate::{Error, Result};

/// Single-shot HTTP access to the thermostat's JSON endpoints.
///
/// No retries happen here; one call is one request.
pub struct DeviceClient {
    http: reqwest::Client,
    base_url: String,
    logger: Option<Mutex<MessageLogger>>,
}

impl DeviceClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_options(base_url, None, None)
    }

    pub(crate) fn with_options(
        base_url: &str,
        timeout: Option<Duration>,
        log: Option<(MessageLogMode, String)>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        let logger = match log {
            Some((mode, path)) => Some(Mutex::new(MessageLogger::new(mode, &path).map_err(
                |e| Error::Config(format!("failed to open message log {path}: {e}")),
            )?)),
            None => None,
        };

        Ok(Self {
            http,
            base_url: normalize_base_url(base_url),
            logger,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue `method` against `base_url + path` and decode the JSON reply.
    pub async fn request(&self, method: Method, path: &str, body: Option<String>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, url = %url, "device request");

        self.with_logger(|logger| {
            let parsed = body.as_deref().and_then(|b| serde_json::from_str(b).ok());
            logger.log_request(method.as_str(), path, parsed.as_ref());
        });

        let mut req = self.http.request(method, &url);
        if let Some(body) = body {
            req = req.header(CONTENT_TYPE, "application/json").body(body);
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => return Err(self.failure(path, &url, None, e)),
        };

        let status = resp.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("unexpected status");
            return Err(self.failure(path, &url, Some(status.as_u16()), reason));
        }

        let text = match resp.text().await {
            Ok(text) => text,
            Err(e) => return Err(self.failure(path, &url, Some(status.as_u16()), e)),
        };
        trace!(url = %url, body = %text, "device response");

        let value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) => return Err(self.failure(path, &url, Some(status.as_u16()), e)),
        };

        self.with_logger(|logger| logger.log_response(path, status.as_u16(), &value));
        Ok(value)
    }

    /// GET `path` and decode it into a typed record.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.request(Method::GET, path, None).await?;
        serde_json::from_value(value).map_err(|e| {
            let url = format!("{}{}", self.base_url, path);
            self.failure(path, &url, Some(200), e)
        })
    }

    /// POST a JSON object literal to `path`.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, Some(body.to_string())).await
    }

    fn failure(
        &self,
        path: &str,
        url: &str,
        status: Option<u16>,
        reason: impl std::fmt::Display,
    ) -> Error {
        let reason = reason.to_string();
        warn!(url = %url, status = ?status, reason = %reason, "device communication failed");
        self.with_logger(|logger| logger.log_failure(path, status, &reason));
        Error::communication(url, status, reason)
    }

    fn with_logger(&self, f: impl FnOnce(&mut MessageLogger)) {
        if let Some(logger) = &self.logger
            && let Ok(mut guard) = logger.lock()
        {
            f(&mut *guard);
        }
    }
}

fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}
