use crate::auth::cookie::CookiePolicy;
use crate::auth::service::Session;
use crate::auth::types::{AuthResponse, LoginRequest, SignupRequest};
use crate::error::{AppError, Endpoint, HandlerError};
use crate::AppState;
use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::{info, warn};

const SIGNUP_SUCCESS: &str = "サインアップに成功しました";
const LOGIN_SUCCESS: &str = "サインインに成功しました";

pub async fn signup(
    req: web::Json<SignupRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, HandlerError> {
    info!("Received signup request for email: {}", req.email);
    let session = state
        .auth_service
        .signup(req.into_inner())
        .await
        .map_err(|e| HandlerError::new(Endpoint::Signup, e))?;

    Ok(session_response(&state, session, SIGNUP_SUCCESS))
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, HandlerError> {
    info!("Received login request for email: {}", req.email);
    let session = state
        .auth_service
        .login(req.into_inner())
        .await
        .map_err(|e| HandlerError::new(Endpoint::Login, e))?;

    Ok(session_response(&state, session, LOGIN_SUCCESS))
}

fn session_response(state: &AppState, session: Session, message: &str) -> HttpResponse {
    let cookie = CookiePolicy::from_settings(&state.config).session_cookie(session.token.token);
    HttpResponse::Ok().cookie(cookie).json(AuthResponse {
        message: message.to_string(),
        user_id: session.user_id,
    })
}

pub async fn method_not_allowed(req: HttpRequest) -> HttpResponse {
    warn!("Rejected {} {}", req.method(), req.path());
    HttpResponse::MethodNotAllowed().json(json!({ "error": "Method Not Allowed" }))
}

/// Maps undecodable bodies onto the JSON error shape used everywhere else.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    warn!("Malformed body on {}: {}", req.path(), err);
    let endpoint = if req.path().ends_with("/login") {
        Endpoint::Login
    } else {
        Endpoint::Signup
    };
    HandlerError::new(endpoint, AppError::BadRequest(err.to_string())).into()
}
