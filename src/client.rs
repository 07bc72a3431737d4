//! Thin HTTP client for the API.
//!
//! Attaches the stored access token to every request. On a 401 it performs
//! exactly one refresh-and-retry cycle; if the refresh itself fails the
//! stored tokens are cleared and the caller is told to authenticate again.
//! There is no loop: a second 401 after the retry is returned as-is.

use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use std::fmt;
use std::sync::Mutex;

use crate::auth::{AuthResponse, TokenPair};

#[derive(Debug)]
pub enum ClientError {
    /// No stored credentials, or the refresh was rejected. The caller must
    /// log in again.
    AuthRequired,
    /// Transport-level failure.
    Http(reqwest::Error),
    /// The server answered with a non-success status.
    Api { status: StatusCode, message: String },
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClientError::AuthRequired => write!(f, "authentication required"),
            ClientError::Http(e) => write!(f, "http error: {}", e),
            ClientError::Api { status, message } => write!(f, "api error {}: {}", status, message),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        ClientError::Http(error)
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Mutex<Option<TokenPair>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens: Mutex::new(None),
        }
    }

    pub fn set_tokens(&self, pair: TokenPair) {
        *self.tokens.lock().unwrap() = Some(pair);
    }

    pub fn tokens(&self) -> Option<TokenPair> {
        self.tokens.lock().unwrap().clone()
    }

    pub fn clear_tokens(&self) {
        *self.tokens.lock().unwrap() = None;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Logs in and stores the returned token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let auth: AuthResponse = response.json().await?;
        self.set_tokens(TokenPair {
            access_token: auth.access_token.clone(),
            refresh_token: auth.refresh_token.clone(),
            token_type: auth.token_type.clone(),
        });
        Ok(auth)
    }

    /// Sends one authenticated request, refreshing and retrying at most
    /// once on a 401.
    pub async fn send<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
    ) -> Result<Response, ClientError> {
        let pair = self.tokens().ok_or(ClientError::AuthRequired)?;

        let response = self
            .execute(method.clone(), path, body, &pair.access_token)
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        // The refresh must complete before the retried call goes out; on
        // refresh failure we clear state rather than trying again.
        let refreshed = match self.refresh(&pair.refresh_token).await {
            Ok(pair) => pair,
            Err(_) => {
                self.clear_tokens();
                return Err(ClientError::AuthRequired);
            }
        };

        let retried = self
            .execute(method, path, body, &refreshed.access_token)
            .await?;
        Ok(retried)
    }

    pub async fn get(&self, path: &str) -> Result<Response, ClientError> {
        self.send::<()>(Method::GET, path, None).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, ClientError> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Response, ClientError> {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Response, ClientError> {
        self.send::<()>(Method::DELETE, path, None).await
    }

    async fn execute<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
        access_token: &str,
    ) -> Result<Response, reqwest::Error> {
        let mut request = self
            .http
            .request(method, self.url(path))
            .bearer_auth(access_token);
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ClientError> {
        let response = self
            .http
            .post(self.url("/api/auth/refresh"))
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        let pair: TokenPair = response.json().await?;
        self.set_tokens(pair.clone());
        Ok(pair)
    }

    /// Turns a non-success response into an `Api` error carrying the
    /// server's `error` detail when present.
    pub async fn check_status(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body.get("error").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or_else(|| status.to_string());

        Err(ClientError::Api { status, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(tag: &str) -> TokenPair {
        TokenPair {
            access_token: format!("access-{}", tag),
            refresh_token: format!("refresh-{}", tag),
            token_type: "bearer".to_string(),
        }
    }

    #[test]
    fn test_token_store() {
        let client = ApiClient::new("http://localhost:8080/");
        assert!(client.tokens().is_none());

        client.set_tokens(pair("a"));
        assert_eq!(client.tokens().unwrap().access_token, "access-a");

        client.set_tokens(pair("b"));
        assert_eq!(client.tokens().unwrap().refresh_token, "refresh-b");

        client.clear_tokens();
        assert!(client.tokens().is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8080/");
        assert_eq!(client.url("/api/tasks"), "http://localhost:8080/api/tasks");
    }

    #[actix_rt::test]
    async fn test_send_without_tokens_requires_auth() {
        let client = ApiClient::new("http://localhost:1");
        match client.get("/api/tasks").await {
            Err(ClientError::AuthRequired) => {}
            other => panic!("expected AuthRequired, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_error_display() {
        let err = ClientError::Api {
            status: StatusCode::NOT_FOUND,
            message: "Task not found".to_string(),
        };
        assert_eq!(err.to_string(), "api error 404 Not Found: Task not found");
        assert_eq!(ClientError::AuthRequired.to_string(), "authentication required");
    }
}
