use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use serde_json::Value;

use crate::error::{LangCacheError, RemoteError};

pub const SYSTEM: &str = "system_api";
pub const SUBSYSTEM: &str = "language_api";
pub const LANGUAGE_FILES: &str = "LanguageFiles";
pub const STATUS_OK: &str = "OK";

/// One remote call: the (system, subsystem) endpoint plus get and post parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiRequest {
    pub system: String,
    pub subsystem: String,
    pub get: BTreeMap<String, String>,
    pub post: BTreeMap<String, String>,
}

impl ApiRequest {
    /// A `LanguageFiles` call against the language API.
    pub fn language_files(action: &str) -> Self {
        let mut get = BTreeMap::new();
        get.insert("system".to_string(), LANGUAGE_FILES.to_string());
        get.insert("action".to_string(), action.to_string());
        Self {
            system: SYSTEM.to_string(),
            subsystem: SUBSYSTEM.to_string(),
            get,
            post: BTreeMap::new(),
        }
    }

    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.post.insert(key.to_string(), value.to_string());
        self
    }

    pub fn action(&self) -> &str {
        self.get.get("action").map(String::as_str).unwrap_or_default()
    }
}

/// Carries a request to the remote side and hands back whatever it decoded.
///
/// `Ok(Value::Bool(false))` stands for "the call returned nothing usable";
/// envelope validation decides what that means.
pub trait ApiTransport: Send + Sync {
    fn call(&self, request: &ApiRequest) -> Result<Value, RemoteError>;
}

/// Decoded response envelope of a successful-looking call.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteEnvelope {
    pub status: String,
    pub data: Value,
    pub error_type: Option<String>,
    pub error_code: Option<String>,
}

impl RemoteEnvelope {
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let status = object.get("status").filter(|status| !status.is_null())?;
        Some(Self {
            status: scalar_to_string(status),
            data: object.get("data").cloned().unwrap_or(Value::Null),
            error_type: object.get("error_type").and_then(non_empty),
            error_code: object.get("error_code").and_then(non_empty),
        })
    }
}

/// Validates a raw call result and returns its payload untouched.
pub fn validate_envelope(value: &Value) -> Result<Value, RemoteError> {
    let envelope = match value {
        Value::Bool(false) => None,
        other => RemoteEnvelope::from_value(other),
    }
    .ok_or_else(|| RemoteError::transport("Error during the api call"))?;

    if envelope.status != STATUS_OK {
        let mut message = String::from("Wrong response: ");
        if let Some(error_type) = &envelope.error_type {
            message.push_str(&format!("Type({error_type}) "));
        }
        if let Some(error_code) = &envelope.error_code {
            message.push_str(&format!("Code({error_code}) "));
        }
        message.push_str(&scalar_to_string(&envelope.data));
        return Err(RemoteError::status(
            envelope.error_type,
            envelope.error_code,
            message,
        ));
    }

    if envelope.data == Value::Bool(false) {
        return Err(RemoteError::empty_content());
    }

    Ok(envelope.data)
}

fn non_empty(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        other => {
            let text = scalar_to_string(other);
            (!text.is_empty() && text != "0").then_some(text)
        }
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "1".to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}

/// Sends calls as `POST {base_url}/{system}/{subsystem}?{get}` with the post
/// parameters as a JSON object body, and decodes the JSON response.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LangCacheError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("lang-cache/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| LangCacheError::ClientSetup(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| LangCacheError::ClientSetup(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self, request: &ApiRequest) -> String {
        format!(
            "{}/{}/{}",
            self.base_url, request.system, request.subsystem
        )
    }
}

impl ApiTransport for HttpTransport {
    fn call(&self, request: &ApiRequest) -> Result<Value, RemoteError> {
        let response = self
            .client
            .post(self.endpoint(request))
            .query(&request.get)
            .json(&request.post)
            .send()
            .map_err(|err| {
                if err.is_timeout() {
                    RemoteError::transport(format!("request timed out: {err}"))
                } else {
                    RemoteError::transport(err.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "language API request failed".to_string());
            return Err(RemoteError::transport(format!(
                "language API returned status {status}: {message}"
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|err| RemoteError::transport(err.to_string()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Bool(false));
        }
        serde_json::from_slice(&bytes)
            .map_err(|err| RemoteError::transport(format!("undecodable response: {err}")))
    }
}
