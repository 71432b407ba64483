use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use shared::{
    domain::UserProfile,
    protocol::{AuthResponse, LoginRequest, RegisterRequest},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::{
    api::AuthApi,
    error::AuthError,
    session_store::SessionStore,
    validation::{check_login_form, check_register_form},
};

pub const DEFAULT_ERROR_DISPLAY: Duration = Duration::from_secs(5);
pub const DEFAULT_REFRESH_FEEDBACK: Duration = Duration::from_secs(2);
pub const PROFILE_UPDATED_MESSAGE: &str = "Profile Updated!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    LoggedOut,
    LoggedIn,
}

/// The visible view. Only `Dashboard` corresponds to a logged-in session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    Dashboard,
}

impl Screen {
    pub fn view_state(self) -> ViewState {
        match self {
            Screen::Dashboard => ViewState::LoggedIn,
            Screen::Login | Screen::Register => ViewState::LoggedOut,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorContext {
    Login,
    Register,
    Refresh,
    Startup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    UserRequested,
    TokenRejected,
    StartupValidationFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSnapshot {
    pub profile: UserProfile,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    ScreenChanged(Screen),
    ProfileUpdated(ProfileSnapshot),
    LoggedOut(LogoutReason),
    Error {
        context: ErrorContext,
        message: String,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    pub error_display: Duration,
    pub refresh_feedback: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            error_display: DEFAULT_ERROR_DISPLAY,
            refresh_feedback: DEFAULT_REFRESH_FEEDBACK,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Inline message that hides itself once `visible_for` has elapsed.
#[derive(Debug, Clone)]
struct Notice {
    message: String,
    shown_at: Instant,
    visible_for: Duration,
}

impl Notice {
    fn new(message: impl Into<String>, visible_for: Duration) -> Self {
        Self {
            message: message.into(),
            shown_at: Instant::now(),
            visible_for,
        }
    }

    fn visible_at(&self, now: Instant) -> Option<String> {
        (now.saturating_duration_since(self.shown_at) < self.visible_for)
            .then(|| self.message.clone())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusyFlags {
    pub login: bool,
    pub register: bool,
    pub refresh: bool,
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Login,
    Register,
    Refresh,
}

/// Point-in-time copy of everything a front end needs to draw.
#[derive(Debug, Clone)]
pub struct UiSnapshot {
    pub screen: Screen,
    pub login_form: LoginForm,
    pub register_form: RegisterForm,
    pub profile: Option<ProfileSnapshot>,
    pub login_error: Option<String>,
    pub register_error: Option<String>,
    pub refresh_feedback: Option<String>,
    pub busy: BusyFlags,
}

impl UiSnapshot {
    pub fn view_state(&self) -> ViewState {
        self.screen.view_state()
    }
}

struct UiState {
    screen: Screen,
    login_form: LoginForm,
    register_form: RegisterForm,
    profile: Option<ProfileSnapshot>,
    login_error: Option<Notice>,
    register_error: Option<Notice>,
    refresh_feedback: Option<Notice>,
    busy: BusyFlags,
}

impl UiState {
    fn new() -> Self {
        Self {
            screen: Screen::Login,
            login_form: LoginForm::default(),
            register_form: RegisterForm::default(),
            profile: None,
            login_error: None,
            register_error: None,
            refresh_feedback: None,
            busy: BusyFlags::default(),
        }
    }

    fn show(&mut self, screen: Screen) {
        self.screen = screen;
        self.login_error = None;
        self.register_error = None;
    }

    fn busy_mut(&mut self, action: Action) -> &mut bool {
        match action {
            Action::Login => &mut self.busy.login,
            Action::Register => &mut self.busy.register,
            Action::Refresh => &mut self.busy.refresh,
        }
    }
}

/// Drives the session lifecycle: login, registration, profile refresh,
/// logout and startup validation of a persisted token.
///
/// All methods take `&self`; overlapping calls are not coordinated and the
/// one that resolves last determines the screen and profile.
pub struct SessionController {
    api: Arc<dyn AuthApi>,
    store: SessionStore,
    options: ControllerOptions,
    state: Mutex<UiState>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    pub fn new(api: Arc<dyn AuthApi>, store: SessionStore) -> Self {
        Self::with_options(api, store, ControllerOptions::default())
    }

    pub fn with_options(
        api: Arc<dyn AuthApi>,
        store: SessionStore,
        options: ControllerOptions,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            api,
            store,
            options,
            state: Mutex::new(UiState::new()),
            events,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn view_state(&self) -> ViewState {
        self.state.lock().await.screen.view_state()
    }

    pub async fn snapshot(&self) -> UiSnapshot {
        self.snapshot_at(Instant::now()).await
    }

    pub async fn snapshot_at(&self, now: Instant) -> UiSnapshot {
        let guard = self.state.lock().await;
        UiSnapshot {
            screen: guard.screen,
            login_form: guard.login_form.clone(),
            register_form: guard.register_form.clone(),
            profile: guard.profile.clone(),
            login_error: guard.login_error.as_ref().and_then(|n| n.visible_at(now)),
            register_error: guard
                .register_error
                .as_ref()
                .and_then(|n| n.visible_at(now)),
            refresh_feedback: guard
                .refresh_feedback
                .as_ref()
                .and_then(|n| n.visible_at(now)),
            busy: guard.busy,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        {
            let mut guard = self.state.lock().await;
            guard.login_form = LoginForm {
                email: email.to_string(),
                password: password.to_string(),
            };
            guard.login_error = None;
        }

        if let Some(problem) = check_login_form(email, password) {
            let err = AuthError::validation(problem);
            self.report_error(ErrorContext::Login, &err).await;
            return Err(err);
        }

        self.set_busy(Action::Login, true).await;
        let outcome = self
            .api
            .login(LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await;
        self.set_busy(Action::Login, false).await;

        match outcome {
            Ok(response) => {
                let profile = self.establish_session(response).await;
                info!(user_id = %profile.id, "logged in");
                Ok(profile)
            }
            Err(err) => {
                warn!(error = %err, kind = ?err.kind, "login failed");
                self.report_error(ErrorContext::Login, &err).await;
                Err(err)
            }
        }
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, AuthError> {
        {
            let mut guard = self.state.lock().await;
            guard.register_form = RegisterForm {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            };
            guard.register_error = None;
        }

        if let Some(problem) = check_register_form(name, email, password) {
            let err = AuthError::validation(problem);
            self.report_error(ErrorContext::Register, &err).await;
            return Err(err);
        }

        self.set_busy(Action::Register, true).await;
        let outcome = self
            .api
            .register(RegisterRequest {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await;
        self.set_busy(Action::Register, false).await;

        match outcome {
            Ok(response) => {
                let profile = self.establish_session(response).await;
                info!(user_id = %profile.id, "registered and logged in");
                Ok(profile)
            }
            Err(err) => {
                warn!(error = %err, kind = ?err.kind, "registration failed");
                self.report_error(ErrorContext::Register, &err).await;
                Err(err)
            }
        }
    }

    /// Clears the session unconditionally. Safe to call with no session.
    pub async fn logout(&self) {
        self.end_session(LogoutReason::UserRequested).await;
        info!("logged out");
    }

    pub async fn refresh_profile(&self) -> Result<UserProfile, AuthError> {
        let Some(token) = self.store.get().await else {
            let err = AuthError::invalid_or_expired_token("No session token stored");
            warn!("profile refresh without a stored token; logging out");
            self.report_error(ErrorContext::Refresh, &err).await;
            self.end_session(LogoutReason::TokenRejected).await;
            return Err(err);
        };

        self.set_busy(Action::Refresh, true).await;
        let outcome = self.api.profile(&token).await;
        self.set_busy(Action::Refresh, false).await;

        match outcome {
            Ok(profile) => {
                let snapshot = ProfileSnapshot {
                    profile: profile.clone(),
                    fetched_at: Utc::now(),
                };
                {
                    let mut guard = self.state.lock().await;
                    guard.profile = Some(snapshot.clone());
                    guard.refresh_feedback = Some(Notice::new(
                        PROFILE_UPDATED_MESSAGE,
                        self.options.refresh_feedback,
                    ));
                }
                self.emit(SessionEvent::ProfileUpdated(snapshot));
                Ok(profile)
            }
            Err(err) if err.is_invalid_or_expired_token() => {
                warn!(error = %err, "session token rejected; logging out");
                self.report_error(ErrorContext::Refresh, &err).await;
                self.end_session(LogoutReason::TokenRejected).await;
                Err(err)
            }
            Err(err) => {
                warn!(error = %err, kind = ?err.kind, "profile refresh failed");
                self.report_error(ErrorContext::Refresh, &err).await;
                Err(err)
            }
        }
    }

    /// Validates a persisted token, if any, by fetching the profile with it.
    /// Any failure discards the token.
    pub async fn check_session_on_start(&self) -> ViewState {
        let Some(token) = self.store.get().await else {
            self.show_screen(Screen::Login).await;
            return ViewState::LoggedOut;
        };

        match self.api.profile(&token).await {
            Ok(profile) => {
                info!(user_id = %profile.id, "restored session");
                let snapshot = ProfileSnapshot {
                    profile,
                    fetched_at: Utc::now(),
                };
                self.state.lock().await.profile = Some(snapshot.clone());
                self.emit(SessionEvent::ProfileUpdated(snapshot));
                self.show_screen(Screen::Dashboard).await;
                ViewState::LoggedIn
            }
            Err(err) => {
                warn!(error = %err, kind = ?err.kind, "stored session token failed validation");
                self.emit(SessionEvent::Error {
                    context: ErrorContext::Startup,
                    message: err.message,
                });
                self.end_session(LogoutReason::StartupValidationFailed)
                    .await;
                ViewState::LoggedOut
            }
        }
    }

    /// Switches to the login view. Ignored while logged in.
    pub async fn show_login(&self) -> bool {
        self.switch_logged_out_screen(Screen::Login).await
    }

    /// Switches to the registration view. Ignored while logged in.
    pub async fn show_register(&self) -> bool {
        self.switch_logged_out_screen(Screen::Register).await
    }

    pub async fn dismiss_errors(&self) {
        let mut guard = self.state.lock().await;
        guard.login_error = None;
        guard.register_error = None;
    }

    async fn switch_logged_out_screen(&self, screen: Screen) -> bool {
        {
            let mut guard = self.state.lock().await;
            if guard.screen == Screen::Dashboard {
                return false;
            }
            guard.show(screen);
        }
        self.emit(SessionEvent::ScreenChanged(screen));
        true
    }

    async fn establish_session(&self, response: AuthResponse) -> UserProfile {
        self.store.set(&response.token).await;
        let snapshot = ProfileSnapshot {
            profile: response.user.clone(),
            fetched_at: Utc::now(),
        };
        self.state.lock().await.profile = Some(snapshot.clone());
        self.emit(SessionEvent::ProfileUpdated(snapshot));
        self.show_screen(Screen::Dashboard).await;
        response.user
    }

    async fn end_session(&self, reason: LogoutReason) {
        self.store.clear().await;
        {
            let mut guard = self.state.lock().await;
            guard.login_form = LoginForm::default();
            guard.register_form = RegisterForm::default();
            guard.profile = None;
            guard.refresh_feedback = None;
            guard.show(Screen::Login);
        }
        self.emit(SessionEvent::LoggedOut(reason));
        self.emit(SessionEvent::ScreenChanged(Screen::Login));
    }

    async fn show_screen(&self, screen: Screen) {
        self.state.lock().await.show(screen);
        self.emit(SessionEvent::ScreenChanged(screen));
    }

    async fn set_busy(&self, action: Action, busy: bool) {
        *self.state.lock().await.busy_mut(action) = busy;
    }

    async fn report_error(&self, context: ErrorContext, err: &AuthError) {
        let notice = Notice::new(err.message.clone(), self.options.error_display);
        {
            let mut guard = self.state.lock().await;
            match context {
                ErrorContext::Login => guard.login_error = Some(notice),
                ErrorContext::Register => guard.register_error = Some(notice),
                ErrorContext::Refresh | ErrorContext::Startup => {}
            }
        }
        self.emit(SessionEvent::Error {
            context,
            message: err.message.clone(),
        });
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
