//! Client-side authentication session lifecycle.
//!
//! [`SessionController`] mediates between user actions, the remote
//! [`AuthApi`] and the persisted [`SessionStore`], and derives the visible
//! [`Screen`] from the session.

pub mod api;
pub mod controller;
pub mod error;
pub mod session_store;
pub mod validation;

pub use api::{AuthApi, HttpAuthApi, DEFAULT_API_BASE_URL};
pub use controller::{
    BusyFlags, ControllerOptions, ErrorContext, LoginForm, LogoutReason, ProfileSnapshot,
    RegisterForm, Screen, SessionController, SessionEvent, UiSnapshot, ViewState,
};
pub use error::{AuthError, AuthErrorKind};
pub use session_store::{origin_key, SessionStore};
