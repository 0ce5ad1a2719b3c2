//! HTTP data source for the remote expenses API
//!
//! `RemoteExpenseApi` implements `ExpenseSource` over `reqwest`. It knows
//! nothing about modes or fallbacks; it reports every failure as a
//! `SourceError` and leaves the decision to the session.

use async_trait::async_trait;
use expenseweb_config::ApiConfig;
use expenseweb_core::{expense_path, ExpenseDraft, ExpenseSource, SourceError, COLLECTION_PATH};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde_json::Value;

const LOG_TARGET: &str = "expenseweb::client";

/// Strip trailing slashes and check the base is an http(s) URL
pub fn normalize_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    let parsed = Url::parse(trimmed).ok()?;
    match parsed.scheme() {
        "http" | "https" if parsed.has_host() => Some(trimmed.to_string()),
        _ => None,
    }
}

/// Remote expenses collection at `{base}/expenses`
#[derive(Debug, Clone)]
pub struct RemoteExpenseApi {
    base_url: Option<String>,
    client: Client,
}

impl RemoteExpenseApi {
    pub fn new(config: &ApiConfig) -> Self {
        Self::with_base_url(&config.base_url)
    }

    pub fn with_base_url(raw: &str) -> Self {
        let base_url = normalize_base_url(raw);
        if base_url.is_none() && !raw.trim().is_empty() {
            log::warn!(target: LOG_TARGET, "Ignoring unusable API base URL: {}", raw);
        }
        let client = Client::builder()
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { base_url, client }
    }

    fn endpoint(&self, path: &str) -> Result<String, SourceError> {
        match &self.base_url {
            Some(base) => Ok(format!("{}{}", base, path)),
            None => Err(SourceError::InvalidBaseUrl),
        }
    }

    /// Send a request and turn non-2xx answers into `SourceError::Status`
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&ExpenseDraft>,
    ) -> Result<Response, SourceError> {
        let url = self.endpoint(path)?;
        log::debug!(target: LOG_TARGET, "{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(draft) = body {
            request = request.json(draft);
        }

        let response = request.send().await.map_err(|e| {
            log::warn!(target: LOG_TARGET, "{} {} failed: {}", method, url, e);
            SourceError::Network {
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        log::warn!(target: LOG_TARGET, "{} {} returned {}", method, url, status);
        Err(SourceError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }

    /// Decode a successful body; 204 and empty bodies are `null`
    async fn read_json(response: Response) -> Result<Value, SourceError> {
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        let text = response.text().await.map_err(|e| SourceError::Network {
            message: e.to_string(),
        })?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| SourceError::Decode {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl ExpenseSource for RemoteExpenseApi {
    fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    async fn probe(&self) -> Result<(), SourceError> {
        self.send(Method::GET, COLLECTION_PATH, None).await.map(|_| ())
    }

    async fn list(&self) -> Result<Value, SourceError> {
        let response = self.send(Method::GET, COLLECTION_PATH, None).await?;
        Self::read_json(response).await
    }

    async fn create(&self, draft: &ExpenseDraft) -> Result<Value, SourceError> {
        let response = self.send(Method::POST, COLLECTION_PATH, Some(draft)).await?;
        Self::read_json(response).await
    }

    async fn update(&self, id: &str, draft: &ExpenseDraft) -> Result<Value, SourceError> {
        let response = self.send(Method::PUT, &expense_path(id), Some(draft)).await?;
        Self::read_json(response).await
    }

    async fn delete(&self, id: &str) -> Result<(), SourceError> {
        let response = self.send(Method::DELETE, &expense_path(id), None).await?;
        Self::read_json(response).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("https://api.example.com/prod/"),
            Some("https://api.example.com/prod".to_string())
        );
        assert_eq!(
            normalize_base_url("  http://localhost:3000///  "),
            Some("http://localhost:3000".to_string())
        );
        assert_eq!(normalize_base_url(""), None);
        assert_eq!(normalize_base_url("   "), None);
        assert_eq!(normalize_base_url("not a url"), None);
        assert_eq!(normalize_base_url("ftp://files.example.com"), None);
        assert_eq!(normalize_base_url("<API_BASE_URL>"), None);
    }

    #[tokio::test]
    async fn test_invalid_base_fails_every_call() {
        let api = RemoteExpenseApi::with_base_url("");
        assert!(api.base_url().is_none());
        assert_eq!(api.probe().await, Err(SourceError::InvalidBaseUrl));
        assert_eq!(api.delete("x").await, Err(SourceError::InvalidBaseUrl));
    }

    #[test]
    fn test_url_for_uses_normalized_base() {
        let api = RemoteExpenseApi::with_base_url("https://api.example.com/prod/");
        assert_eq!(
            api.url_for(&expense_path("a b")),
            "https://api.example.com/prod/expenses/a%20b"
        );
    }
}
