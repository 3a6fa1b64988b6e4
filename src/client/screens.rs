use crate::auth::types::{LoginRequest, SignupRequest};
use crate::client::api::{ApiReply, AuthClient, ErrorPayload};
use tracing::warn;
use uuid::Uuid;

pub const SIGNUP_COMPLETE_ALERT: &str = "アカウント登録に成功しました。ログインしてください。";
const UNKNOWN_ERROR: &str = "不明なエラーが発生しました";
const SIGNUP_FAILED: &str = "サインアップ中にエラーが発生しました";
const LOGIN_FAILED: &str = "サインイン中にエラーが発生しました";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    ToLogin { alert: String },
    ToHome { user_id: Uuid },
}

/// Error text shown under each input, plus one general line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub message: Option<String>,
}

impl FormErrors {
    fn apply(&mut self, error: Option<ErrorPayload>) {
        match error {
            Some(ErrorPayload::Fields(fields)) => {
                let first = |field: &str| fields.get(field).and_then(|m| m.first()).cloned();
                self.name = first("name");
                self.email = first("email");
                self.password = first("password");
            }
            Some(ErrorPayload::Message(message)) => {
                self.message = Some(format!("エラー: {}", message));
            }
            None => {
                self.message = Some(format!("エラー: {}", UNKNOWN_ERROR));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignupScreen {
    pub name: String,
    pub email: String,
    pub password: String,
    pub errors: FormErrors,
}

impl SignupScreen {
    /// Clears previous errors, posts the form, and either records the
    /// returned errors or asks to move to the login screen.
    pub async fn submit(&mut self, client: &AuthClient) -> Option<Transition> {
        self.errors = FormErrors::default();
        let req = SignupRequest {
            email: self.email.clone(),
            password: self.password.clone(),
            name: self.name.clone(),
        };

        match client.signup(&req).await {
            Ok(ApiReply::Accepted(_)) => Some(Transition::ToLogin {
                alert: SIGNUP_COMPLETE_ALERT.to_string(),
            }),
            Ok(ApiReply::Rejected { error, .. }) => {
                self.errors.apply(error);
                None
            }
            Err(e) => {
                warn!("Signup request failed: {}", e);
                self.errors.message = Some(SIGNUP_FAILED.to_string());
                None
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginScreen {
    pub email: String,
    pub password: String,
    pub errors: FormErrors,
}

impl LoginScreen {
    pub async fn submit(&mut self, client: &AuthClient) -> Option<Transition> {
        self.errors = FormErrors::default();
        let req = LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        };

        match client.login(&req).await {
            Ok(ApiReply::Accepted(body)) => Some(Transition::ToHome {
                user_id: body.user_id,
            }),
            Ok(ApiReply::Rejected { error, .. }) => {
                self.errors.apply(error);
                None
            }
            Err(e) => {
                warn!("Login request failed: {}", e);
                self.errors.message = Some(LOGIN_FAILED.to_string());
                None
            }
        }
    }
}
