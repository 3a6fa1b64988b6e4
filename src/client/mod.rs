//! Client side of the auth flow
//!
//! [`AuthClient`] talks to the signup/login endpoints; the screen types hold
//! form input and error state the way the mobile screens present them.

pub mod api;
pub mod screens;

pub use api::{ApiReply, AuthClient, ErrorPayload};
pub use screens::{FormErrors, LoginScreen, SignupScreen, Transition};
