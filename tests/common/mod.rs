#![allow(dead_code)]

use std::sync::Mutex;

use camino::Utf8PathBuf;
use serde_json::{Value, json};

use lang_cache::api::{ApiRequest, ApiTransport};
use lang_cache::error::RemoteError;

/// Answers language API calls from a closure and records every request.
pub struct MockTransport<F: Fn(&ApiRequest) -> Value + Send + Sync> {
    respond: F,
    pub requests: Mutex<Vec<ApiRequest>>,
}

impl<F: Fn(&ApiRequest) -> Value + Send + Sync> MockTransport<F> {
    pub fn new(respond: F) -> Self {
        Self {
            respond,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn actions(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.action().to_string())
            .collect()
    }
}

impl<F: Fn(&ApiRequest) -> Value + Send + Sync> ApiTransport for MockTransport<F> {
    fn call(&self, request: &ApiRequest) -> Result<Value, RemoteError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok((self.respond)(request))
    }
}

pub fn ok(data: Value) -> Value {
    json!({"status": "OK", "data": data})
}

pub fn param<'a>(request: &'a ApiRequest, key: &str) -> &'a str {
    request.post.get(key).map(String::as_str).unwrap_or_default()
}

/// Content the mocks serve for one (subject, language) pair.
pub fn content_for(subject: &str, language: &str) -> String {
    format!("<?php // {subject} {language}\nreturn ['hello' => '{language}'];\n")
}

/// A language API that knows every application and offers `languages` for applets.
pub fn happy_api(languages: &'static [&'static str]) -> impl Fn(&ApiRequest) -> Value + Send + Sync {
    move |request: &ApiRequest| match request.action() {
        "getAppletLanguages" => ok(json!(languages)),
        "getLanguageFile" => ok(json!(content_for(
            param(request, "application"),
            param(request, "language")
        ))),
        "getAppletLanguageFile" => ok(json!(content_for(
            param(request, "applet"),
            param(request, "language")
        ))),
        _ => Value::Bool(false),
    }
}

pub fn temp_root() -> (tempfile::TempDir, Utf8PathBuf) {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    (temp, root)
}
