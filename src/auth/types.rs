use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError};

// Absent fields deserialize as empty strings so they surface as field
// errors instead of a body parse failure.

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct SignupRequest {
    #[validate(custom(function = "dotted_email", message = "メールアドレスの形式が正しくありません"))]
    pub email: String,
    #[validate(length(min = 6, message = "パスワードは6文字以上必要です"))]
    pub password: String,
    #[validate(length(min = 1, message = "名前は必須です"))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(custom(function = "dotted_email", message = "メールアドレスの形式が正しくありません"))]
    pub email: String,
    #[validate(length(min = 1, message = "パスワードは必須です"))]
    pub password: String,
}

/// HTML5 address syntax plus a dot inside the domain, so `x@y` is refused.
fn dotted_email(value: &str) -> Result<(), ValidationError> {
    let domain = value.rsplit_once('@').map(|(_, d)| d).unwrap_or_default();
    let dotted = domain
        .find('.')
        .map_or(false, |i| i > 0 && !domain.ends_with('.'));
    if value.validate_email() && dotted {
        Ok(())
    } else {
        Err(ValidationError::new("email"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub message: String,
    pub user_id: Uuid,
}
