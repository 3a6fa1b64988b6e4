use crate::auth::types::{AuthResponse, LoginRequest, SignupRequest};
use crate::config::Settings;
use crate::error::ClientError;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

/// The `error` member of a non-OK response: a field map for validation
/// failures, a plain string otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ErrorPayload {
    Fields(BTreeMap<String, Vec<String>>),
    Message(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorPayload,
}

#[derive(Debug, Clone)]
pub enum ApiReply {
    Accepted(AuthResponse),
    Rejected {
        status: StatusCode,
        error: Option<ErrorPayload>,
    },
}

pub struct AuthClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AuthClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;
        // join() drops the last path segment unless it ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        Self::new(&settings.client.base_url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn signup(&self, req: &SignupRequest) -> Result<ApiReply, ClientError> {
        self.post("api/auth/signup", req).await
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<ApiReply, ClientError> {
        self.post("api/auth/login", req).await
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<ApiReply, ClientError> {
        let url = self.base_url.join(path)?;
        let res = self.http.post(url.clone()).json(body).send().await?;
        let status = res.status();
        debug!(%url, %status, "auth request completed");

        if status.is_success() {
            return Ok(ApiReply::Accepted(res.json().await?));
        }

        let bytes = res.bytes().await?;
        let error = serde_json::from_slice::<ErrorBody>(&bytes).ok().map(|b| b.error);
        Ok(ApiReply::Rejected { status, error })
    }
}
