//! Authentication module for authgate
//!
//! Signup and login handlers, the service that orchestrates them, and the
//! building blocks they share: bcrypt hashing, HS256 token issuance and the
//! session cookie policy.

pub mod cookie;
pub mod handlers;
pub mod password;
mod service;
pub mod token;
pub mod types;

pub use cookie::{CookiePolicy, TOKEN_COOKIE_NAME};
pub use password::PasswordHasher;
pub use service::{AuthService, Session};
pub use token::{Claims, IssuedToken, TokenIssuer};
pub use types::{AuthResponse, LoginRequest, SignupRequest};
