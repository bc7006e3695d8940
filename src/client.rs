use serde_json::Value;

use crate::api::{ApiRequest, ApiTransport, validate_envelope};
use crate::domain::{Domain, Language};
use crate::error::RemoteError;

pub trait ResourceClient: Send + Sync {
    /// Languages the remote side offers for an applet, in the order it lists them.
    fn applet_languages(&self, applet_id: &str) -> Result<Vec<String>, RemoteError>;

    /// Raw content of one language file.
    fn fetch_content(
        &self,
        domain: Domain,
        subject_id: &str,
        language: &Language,
    ) -> Result<Vec<u8>, RemoteError>;
}

/// [`ResourceClient`] backed by the `LanguageFiles` calls of the language API.
#[derive(Clone)]
pub struct LanguageApiClient<T: ApiTransport> {
    transport: T,
}

impl<T: ApiTransport> LanguageApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn call(&self, request: ApiRequest) -> Result<Value, RemoteError> {
        let raw = self.transport.call(&request)?;
        validate_envelope(&raw)
    }
}

impl<T: ApiTransport> ResourceClient for LanguageApiClient<T> {
    fn applet_languages(&self, applet_id: &str) -> Result<Vec<String>, RemoteError> {
        let request = ApiRequest::language_files("getAppletLanguages").param("applet", applet_id);
        let data = self.call(request).map_err(|err| {
            err.context(format_args!(
                "Getting languages for applet ({applet_id}) was unsuccessful"
            ))
        })?;
        Ok(language_list(&data))
    }

    fn fetch_content(
        &self,
        domain: Domain,
        subject_id: &str,
        language: &Language,
    ) -> Result<Vec<u8>, RemoteError> {
        let request = ApiRequest::language_files(domain.file_action())
            .param(domain.subject_param(), subject_id)
            .param("language", language.as_str());
        let data = self.call(request).map_err(|err| {
            err.context(format_args!(
                "Error during getting {domain} language file ({subject_id}/{language})"
            ))
        })?;
        Ok(payload_bytes(data))
    }
}

/// Turns the `data` of a language-list call into codes. Arrays and objects
/// contribute their string values; duplicates keep their first position.
fn language_list(data: &Value) -> Vec<String> {
    let values: Vec<&Value> = match data {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map.values().collect(),
        Value::String(text) if !text.is_empty() => vec![data],
        _ => Vec::new(),
    };
    let mut languages: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let code = match value {
            Value::String(text) => text.trim().to_string(),
            Value::Number(number) => number.to_string(),
            _ => continue,
        };
        if !code.is_empty() && !languages.contains(&code) {
            languages.push(code);
        }
    }
    languages
}

fn payload_bytes(data: Value) -> Vec<u8> {
    match data {
        Value::String(text) => text.into_bytes(),
        Value::Null => Vec::new(),
        other => other.to_string().into_bytes(),
    }
}
