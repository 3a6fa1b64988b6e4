use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::error;

pub const DUPLICATE_EMAIL_MESSAGE: &str = "このメールアドレスは既に登録されています";
pub const BAD_CREDENTIALS_MESSAGE: &str = "メールアドレスまたはパスワードが正しくありません";
pub const MALFORMED_BODY_MESSAGE: &str = "リクエストの形式が正しくありません";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(FieldErrors),

    #[error("Authentication error: {0}")]
    AuthError(#[from] AuthError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Password hashing error: {0}")]
    PasswordError(#[from] bcrypt::BcryptError),

    #[error("Token error: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Malformed request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.into())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationError(errors.into())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("blocking task failed: {}", err))
    }
}

impl AppError {
    /// True when the client did nothing wrong and the cause must stay
    /// server-side.
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn client_body(&self, internal_message: &str) -> serde_json::Value {
        match self {
            AppError::ValidationError(fields) => json!({ "error": fields }),
            AppError::AuthError(e) => json!({ "error": e.client_message() }),
            AppError::BadRequest(_) => json!({ "error": MALFORMED_BODY_MESSAGE }),
            _ => json!({ "error": internal_message }),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("User not found")]
    NotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,
}

impl AuthError {
    /// Unknown-user and wrong-password share one message so responses do
    /// not reveal which accounts exist.
    pub fn client_message(&self) -> &'static str {
        match self {
            AuthError::DuplicateEmail => DUPLICATE_EMAIL_MESSAGE,
            AuthError::NotFound | AuthError::InvalidCredentials => BAD_CREDENTIALS_MESSAGE,
        }
    }
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Duplicate record")]
    Duplicate,
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => DatabaseError::Duplicate,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::ConnectionError(err.to_string())
            }
            _ => DatabaseError::QueryError(err.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid base URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Per-field validation messages, serialized as `{"field": ["msg", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                fields.add(field.to_string(), message);
            }
        }
        fields
    }
}

/// Which handler produced an error; selects the generic 500 message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Signup,
    Login,
}

impl Endpoint {
    pub fn failure_message(self) -> &'static str {
        match self {
            Endpoint::Signup => "サインアップ中にエラーが発生しました",
            Endpoint::Login => "サインイン中にエラーが発生しました",
        }
    }
}

/// An [`AppError`] tagged with the endpoint it surfaced from.
#[derive(Debug, Error)]
#[error("{endpoint:?} failed: {source}")]
pub struct HandlerError {
    pub endpoint: Endpoint,
    #[source]
    pub source: AppError,
}

impl HandlerError {
    pub fn new(endpoint: Endpoint, source: AppError) -> Self {
        Self { endpoint, source }
    }
}

impl ResponseError for HandlerError {
    fn error_response(&self) -> HttpResponse {
        if self.source.is_internal() {
            error!(endpoint = ?self.endpoint, cause = %self.source, "request failed");
        }
        HttpResponse::build(self.status_code())
            .json(self.source.client_body(self.endpoint.failure_message()))
    }

    fn status_code(&self) -> StatusCode {
        self.source.status_code()
    }
}
