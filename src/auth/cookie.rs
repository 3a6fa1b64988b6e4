use crate::config::{CookieSameSite, Settings};
use actix_web::cookie::{time, Cookie, SameSite};

pub const TOKEN_COOKIE_NAME: &str = "token";

/// The one cookie policy shared by signup and login.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    pub max_age_seconds: i64,
    pub same_site: SameSite,
    pub secure: bool,
}

impl CookiePolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        let same_site = match settings.auth.cookie_same_site {
            CookieSameSite::Strict => SameSite::Strict,
            CookieSameSite::Lax => SameSite::Lax,
        };
        Self {
            max_age_seconds: settings.auth.token_ttl_hours * 60 * 60,
            same_site,
            secure: settings.is_production(),
        }
    }

    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build(TOKEN_COOKIE_NAME, token)
            .http_only(true)
            .path("/")
            .max_age(time::Duration::seconds(self.max_age_seconds))
            .same_site(self.same_site)
            .secure(self.secure)
            .finish()
    }
}
