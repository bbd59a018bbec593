use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;

use crate::error::{ConsoleError, Result};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_MEDIA_TYPE: &str = "application/json";

/// Idempotent reads carry their parameters in the URL, writes in the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Read,
    Write,
}

/// Ordered request parameters. Setting an existing key replaces its value
/// in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key.to_string(), value)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Percent-encoded `key=value` pairs joined by `&`.
    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Login token handed to the client explicitly at construction.
#[derive(Clone, Default)]
pub struct Credential(Option<String>);

impl Credential {
    pub fn new(token: Option<String>) -> Self {
        Self(token)
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    fn attach(&self, params: &mut Params) {
        if let Some(token) = &self.0 {
            params.set("token", token);
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(_) => write!(f, "Credential(<redacted>)"),
            None => write!(f, "Credential(None)"),
        }
    }
}

/// One asynchronous JSON request per call. Resolves with the parsed JSON
/// value whatever its `success` field says; only transport and format
/// problems are errors.
#[async_trait]
pub trait JsonRequest: Send + Sync {
    async fn request(&self, endpoint: &str, params: Params, mode: RequestMode) -> Result<Value>;
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    credential: Credential,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(base_url: &str, credential: Credential) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            credential,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

#[async_trait]
impl JsonRequest for ApiClient {
    async fn request(
        &self,
        endpoint: &str,
        mut params: Params,
        mode: RequestMode,
    ) -> Result<Value> {
        self.credential.attach(&mut params);
        let url = self.endpoint_url(endpoint);
        tracing::debug!(endpoint, ?mode, "sending request");

        let builder = match mode {
            RequestMode::Read if params.is_empty() => self.client.get(url),
            RequestMode::Read => self.client.get(format!("{}?{}", url, params.encode())),
            RequestMode::Write => self
                .client
                .post(url)
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(params.encode()),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ConsoleError::Transport(e.to_string()))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response
            .text()
            .await
            .map_err(|e| ConsoleError::Transport(e.to_string()))?;

        parse_json_body(endpoint, &content_type, body)
    }
}

fn is_json_media_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|media| media.trim().eq_ignore_ascii_case(JSON_MEDIA_TYPE))
        .unwrap_or(false)
}

fn parse_json_body(endpoint: &str, content_type: &str, body: String) -> Result<Value> {
    if !is_json_media_type(content_type) {
        tracing::error!(
            endpoint,
            content_type,
            body = %body,
            "expected a JSON result"
        );
        return Err(ConsoleError::ProtocolMismatch {
            content_type: content_type.to_string(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|e| ConsoleError::Decode(e.to_string()))
}
