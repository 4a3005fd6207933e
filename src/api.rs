/// Client for the classification backend
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::ExtensionConfig;
use crate::error::{ExtensionError, Result};
use crate::models::{
    ClassificationResult, Credentials, ErrorBody, HistoryEntry, HistoryResponse, LoginResponse,
    ProcessTabsRequest, ProcessTabsResponse, ProcessUrlRequest, ProcessUrlResponse, Session,
    TabPayload,
};

/// The remote service's five endpoints
#[async_trait(?Send)]
pub trait Backend {
    async fn login(&self, credentials: &Credentials) -> Result<Session>;
    async fn register(&self, credentials: &Credentials) -> Result<()>;
    async fn process_url(&self, token: &str, url: &str) -> Result<ClassificationResult>;
    async fn process_tabs(&self, token: &str, tabs: Vec<TabPayload>) -> Result<ProcessTabsResponse>;
    async fn url_history(&self, token: &str) -> Result<Vec<HistoryEntry>>;
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: ExtensionConfig,
}

impl HttpBackend {
    pub fn new(config: ExtensionConfig) -> Self {
        HttpBackend {
            client: Client::new(),
            config,
        }
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.config.endpoint(path))
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.config.endpoint(path))
    }
}

#[async_trait(?Send)]
impl Backend for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> Result<Session> {
        let response = self.post("login").json(credentials).send().await?;
        let body: LoginResponse = decode(response, Auth::Anonymous).await?;
        Ok(Session {
            token: body.token,
            username: body.username,
        })
    }

    async fn register(&self, credentials: &Credentials) -> Result<()> {
        let response = self.post("register").json(credentials).send().await?;
        check(response, Auth::Anonymous).await.map(|_| ())
    }

    async fn process_url(&self, token: &str, url: &str) -> Result<ClassificationResult> {
        let response = self
            .post("process-url")
            .bearer_auth(token)
            .json(&ProcessUrlRequest { url })
            .send()
            .await?;
        log::debug!("process-url status: {}", response.status());

        let body: ProcessUrlResponse = decode(response, Auth::Bearer).await?;
        Ok(body.into())
    }

    async fn process_tabs(&self, token: &str, tabs: Vec<TabPayload>) -> Result<ProcessTabsResponse> {
        let response = self
            .post("process-tabs")
            .bearer_auth(token)
            .json(&ProcessTabsRequest { tabs })
            .send()
            .await?;
        decode(response, Auth::Bearer).await
    }

    async fn url_history(&self, token: &str) -> Result<Vec<HistoryEntry>> {
        let response = self.get("url-history").bearer_auth(token).send().await?;
        let body: HistoryResponse = decode(response, Auth::Bearer).await?;
        Ok(body.history)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Auth {
    /// login/register: a 401 means bad credentials, not a revoked token
    Anonymous,
    Bearer,
}

async fn decode<T: DeserializeOwned>(response: Response, auth: Auth) -> Result<T> {
    let response = check(response, auth).await?;
    Ok(response.json::<T>().await?)
}

async fn check(response: Response, auth: Auth) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if auth == Auth::Bearer && matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Err(ExtensionError::Unauthorized);
    }

    let body = response.json::<ErrorBody>().await.unwrap_or_default();
    Err(status_error(status.as_u16(), &body))
}

fn status_error(status: u16, body: &ErrorBody) -> ExtensionError {
    match body.reason() {
        Some(reason) => ExtensionError::Rejected(reason.to_string()),
        None => ExtensionError::Http(status),
    }
}
