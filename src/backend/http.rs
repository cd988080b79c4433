//! REST backend talking to the to-do server over HTTP.

use async_trait::async_trait;
use log::debug;
use reqwest::header::HeaderValue;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{Backend, BackendError, CreateTaskArgs};
use crate::session::Session;
use crate::task::Task;

/// Header the server reads the session token from.
const TOKEN_HEADER: &str = "token";

/// HTTP backend implementation.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    token: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct IdBody<'a> {
    id: &'a str,
}

/// Body shape of a server-side failure: `{ "error": "..." }`.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpBackend {
    /// Create a backend for `base_url` authenticated with the session's token.
    pub fn new(base_url: impl Into<String>, session: &Session, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: session.token.clone(),
            timeout,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn token_header(&self) -> Result<HeaderValue, BackendError> {
        HeaderValue::from_str(&self.token).map_err(|e| BackendError::InvalidData(format!("session token: {e}")))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        debug!("GET {}", path);
        let request = self
            .client
            .get(self.url(path))
            .header(TOKEN_HEADER, self.token_header()?)
            .timeout(self.timeout);
        self.execute(request).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, BackendError> {
        debug!("POST {}", path);
        let request = self
            .client
            .post(self.url(path))
            .header(TOKEN_HEADER, self.token_header()?)
            .json(body)
            .timeout(self.timeout);
        self.execute(request).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, BackendError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Network(format!("request timed out after {}s", self.timeout.as_secs()))
            } else if e.is_connect() {
                BackendError::Network(format!("connection failed: {e}"))
            } else {
                BackendError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if !status.is_success() {
            // Prefer the server's own message when it sent one
            return Err(match serde_json::from_str::<ErrorBody>(&body) {
                Ok(payload) => BackendError::Authority(payload.error),
                Err(_) => BackendError::Network(format!("HTTP {status}")),
            });
        }

        parse_body(&body)
    }
}

/// Decode a 2xx body, turning `{ "error": ... }` payloads into authority errors.
///
/// The server answers most failures with status 200, so the payload has to be
/// checked before the expected shape.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, BackendError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| BackendError::InvalidData(format!("malformed JSON: {e}")))?;

    if let Some(message) = value.get("error").and_then(|v| v.as_str()) {
        return Err(BackendError::Authority(message.to_string()));
    }

    serde_json::from_value(value).map_err(|e| BackendError::InvalidData(e.to_string()))
}

#[async_trait]
impl Backend for HttpBackend {
    fn backend_type(&self) -> &str {
        "http"
    }

    async fn fetch_tasks(&self) -> Result<Vec<Task>, BackendError> {
        self.get("/todo").await
    }

    async fn create_task(&self, args: CreateTaskArgs) -> Result<Task, BackendError> {
        self.post("/todo/add", &args).await
    }

    async fn toggle_task(&self, remote_id: &str) -> Result<Task, BackendError> {
        self.post("/todo/toggle", &IdBody { id: remote_id }).await
    }

    async fn delete_task(&self, remote_id: &str) -> Result<(), BackendError> {
        let _confirmation: serde_json::Value = self.post("/todo/delete", &IdBody { id: remote_id }).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    #[test]
    fn error_payload_is_authority_error() {
        let result: Result<Task, _> = parse_body(r#"{"error":"Todo not found"}"#);
        match result {
            Err(BackendError::Authority(message)) => assert_eq!(message, "Todo not found"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn task_list_decodes() {
        let body = r#"[
            {"_id":"a1","text":"Call mom","done":false,"priority":"low"},
            {"_id":"b2","text":"Buy milk","done":false,"priority":"high"}
        ]"#;
        let tasks: Vec<Task> = parse_body(body).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].priority, Priority::High);
    }

    #[test]
    fn garbage_body_is_invalid_data() {
        let result: Result<Vec<Task>, _> = parse_body("<html>502</html>");
        assert!(matches!(result, Err(BackendError::InvalidData(_))));
    }

    #[test]
    fn delete_confirmation_decodes() {
        let confirmation: serde_json::Value = parse_body(r#"{"message":"Deleted"}"#).unwrap();
        assert_eq!(confirmation["message"], "Deleted");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let session = Session::new("t0ken");
        let backend = HttpBackend::new("http://localhost:5000/", &session, Duration::from_secs(5));
        assert_eq!(backend.url("/todo"), "http://localhost:5000/todo");
    }
}
