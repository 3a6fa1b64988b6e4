use actix_web::{http::header, test, web, App};
use async_trait::async_trait;
use authgate::{
    configure,
    db::{NewUser, User},
    error::DatabaseError,
    AppState, InMemoryUserStore, Settings, UserStore,
};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

const DUPLICATE: &str = "このメールアドレスは既に登録されています";
const BAD_CREDENTIALS: &str = "メールアドレスまたはパスワードが正しくありません";

fn test_state() -> (AppState, Arc<InMemoryUserStore>) {
    let store = Arc::new(InMemoryUserStore::new());
    let config = Settings::new_for_test().expect("Failed to load test config");
    (AppState::with_store(config, store.clone()), store)
}

fn set_cookie<B>(resp: &actix_web::dev::ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::SET_COOKIE)
        .expect("missing Set-Cookie")
        .to_str()
        .unwrap()
        .to_string()
}

fn token_from(cookie: &str) -> &str {
    cookie
        .strip_prefix("token=")
        .and_then(|rest| rest.split(';').next())
        .expect("cookie is not the session token")
}

#[actix_web::test]
async fn test_signup_scenario() {
    let (state, store) = test_state();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure),
    )
    .await;

    let resp = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({"email": "a@b.com", "password": "secret1", "name": "A"}))
        .send_request(&app)
        .await;

    assert_eq!(resp.status(), 200);
    let cookie = set_cookie(&resp);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "サインアップに成功しました");
    let user_id: Uuid = body["userId"].as_str().unwrap().parse().unwrap();

    let claims = state.auth_service.issuer().verify(token_from(&cookie)).unwrap();
    assert_eq!(claims.email, "a@b.com");
    assert_eq!(claims.id, user_id);
    assert_eq!(claims.exp - claims.iat, 40 * 60 * 60);

    assert_eq!(store.len().await, 1);
    let stored = store.find_by_email("a@b.com").await.unwrap().unwrap();
    assert_eq!(stored.id, user_id);
    assert!(stored.password_hash.starts_with("$2"));
    assert_ne!(stored.password_hash, "secret1");

    let resp = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({"email": "a@b.com", "password": "another1", "name": "B"}))
        .send_request(&app)
        .await;

    assert_eq!(resp.status(), 400);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": DUPLICATE }));
    assert_eq!(store.len().await, 1);
}

#[actix_web::test]
async fn test_cookie_attributes_are_shared() {
    let (state, _store) = test_state();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure),
    )
    .await;

    let signup = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({"email": "a@b.com", "password": "secret1", "name": "A"}))
        .send_request(&app)
        .await;
    let login = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "a@b.com", "password": "secret1"}))
        .send_request(&app)
        .await;

    for cookie in [set_cookie(&signup), set_cookie(&login)] {
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=144000"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(!cookie.contains("Secure"));
    }
}

#[actix_web::test]
async fn test_secure_cookie_in_production() {
    let store = Arc::new(InMemoryUserStore::new());
    let mut config = Settings::new_for_test().unwrap();
    config.environment = "production".into();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(AppState::with_store(config, store)))
            .configure(configure),
    )
    .await;

    let resp = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({"email": "a@b.com", "password": "secret1", "name": "A"}))
        .send_request(&app)
        .await;

    assert_eq!(resp.status(), 200);
    assert!(set_cookie(&resp).contains("Secure"));
}

#[actix_web::test]
async fn test_signup_validation_errors() {
    let (state, store) = test_state();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure),
    )
    .await;

    let resp = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({"email": "not-an-email", "password": "12345"}))
        .send_request(&app)
        .await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({
            "error": {
                "email": ["メールアドレスの形式が正しくありません"],
                "password": ["パスワードは6文字以上必要です"],
                "name": ["名前は必須です"],
            }
        })
    );
    assert!(store.is_empty().await);
}

#[actix_web::test]
async fn test_signup_rejects_domain_without_dot() {
    let (state, store) = test_state();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure),
    )
    .await;

    let resp = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({"email": "x@y", "password": "secret1", "name": "A"}))
        .send_request(&app)
        .await;

    assert_eq!(resp.status(), 400);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({ "error": { "email": ["メールアドレスの形式が正しくありません"] } })
    );
    assert!(store.is_empty().await);
}

#[actix_web::test]
async fn test_login_scenario() {
    let (state, _store) = test_state();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure),
    )
    .await;

    let resp = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({"email": "a@b.com", "password": "secret1", "name": "A"}))
        .send_request(&app)
        .await;
    let signup_body: Value = test::read_body_json(resp).await;

    let resp = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "a@b.com", "password": "wrong"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": BAD_CREDENTIALS }));

    let resp = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "a@b.com", "password": "secret1"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let cookie = set_cookie(&resp);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "サインインに成功しました");
    assert_eq!(body["userId"], signup_body["userId"]);

    let claims = state.auth_service.issuer().verify(token_from(&cookie)).unwrap();
    assert_eq!(claims.email, "a@b.com");
}

#[actix_web::test]
async fn test_unknown_email_matches_wrong_password() {
    let (state, _store) = test_state();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure),
    )
    .await;

    let resp = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "nobody@b.com", "password": "secret1"}))
        .send_request(&app)
        .await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": BAD_CREDENTIALS }));
}

#[actix_web::test]
async fn test_login_validation_errors() {
    let (state, _store) = test_state();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure),
    )
    .await;

    let resp = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "a@b.com"}))
        .send_request(&app)
        .await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": { "password": ["パスワードは必須です"] } }));
}

#[actix_web::test]
async fn test_non_post_methods_rejected() {
    let (state, store) = test_state();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure),
    )
    .await;

    for uri in ["/api/auth/signup", "/api/auth/login"] {
        for req in [
            test::TestRequest::get(),
            test::TestRequest::put(),
            test::TestRequest::delete(),
        ] {
            let resp = req
                .uri(uri)
                .set_json(json!({"email": "a@b.com", "password": "secret1", "name": "A"}))
                .send_request(&app)
                .await;

            assert_eq!(resp.status(), 405);
            assert!(resp.headers().get(header::SET_COOKIE).is_none());
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body, json!({ "error": "Method Not Allowed" }));
        }
    }
    assert!(store.is_empty().await);
}

#[actix_web::test]
async fn test_malformed_body() {
    let (state, _store) = test_state();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure),
    )
    .await;

    let resp = test::TestRequest::post()
        .uri("/api/auth/signup")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .send_request(&app)
        .await;

    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "リクエストの形式が正しくありません" }));
}

struct UnavailableStore;

#[async_trait]
impl UserStore for UnavailableStore {
    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, DatabaseError> {
        Err(DatabaseError::ConnectionError("db.internal:5432 refused".into()))
    }

    async fn create(&self, _new_user: NewUser) -> Result<User, DatabaseError> {
        Err(DatabaseError::ConnectionError("db.internal:5432 refused".into()))
    }
}

#[test_log::test(actix_web::test)]
async fn test_store_failure_is_generic_500() {
    let config = Settings::new_for_test().unwrap();
    let state = AppState::with_store(config, Arc::new(UnavailableStore));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure),
    )
    .await;

    let resp = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({"email": "a@b.com", "password": "secret1", "name": "A"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 500);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "サインアップ中にエラーが発生しました" }));

    let resp = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({"email": "a@b.com", "password": "secret1"}))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 500);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "サインイン中にエラーが発生しました" }));
    assert!(!body.to_string().contains("db.internal"));
}
