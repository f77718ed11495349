//! In-memory login session.

use std::sync::Arc;

use parking_lot::RwLock;

use super::model::{AuthResponse, AuthUser};
use super::service::AuthService;
use crate::control::Either;
use crate::error::ServiceError;
use crate::event_bus::EventBus;
use crate::events::{ErrorOccurred, UserLoggedIn, UserLoggedOut, UserSessionEvent};

/// Session progress as a renderer sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    /// `true` while a login is in flight.
    pub loading: bool,
    /// Message of the last failed login.
    pub error: Option<String>,
    /// The logged-in user.
    pub user: Option<AuthUser>,
}

struct SessionInner {
    service: AuthService,
    bus: EventBus,
    state: RwLock<AuthState>,
}

/// Holds at most one authenticated user and announces session changes.
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<SessionInner>,
}

impl AuthSession {
    /// Creates a logged-out session.
    pub fn new(service: AuthService, bus: EventBus) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                service,
                bus,
                state: RwLock::new(AuthState::default()),
            }),
        }
    }

    /// Current state.
    pub fn state(&self) -> AuthState {
        self.inner.state.read().clone()
    }

    /// The logged-in user, if any.
    pub fn current_user(&self) -> Option<AuthUser> {
        self.inner.state.read().user.clone()
    }

    /// Authenticates `email` and, on success, makes it the session user.
    ///
    /// Emits [`UserLoggedIn`] on success and [`ErrorOccurred`] on failure.
    /// A failed attempt keeps the current user. A successful login as a
    /// different user first emits [`UserLoggedOut`] for the one it replaces.
    pub async fn login(&self, email: &str) -> Either<ServiceError, AuthResponse> {
        {
            let mut state = self.inner.state.write();
            state.loading = true;
            state.error = None;
        }

        let outcome = self.inner.service.authenticate_user(email).run().await;

        match &outcome {
            Either::Right(response) => {
                let user = response.user.clone();
                let displaced = {
                    let mut state = self.inner.state.write();
                    let previous = std::mem::replace(&mut state.user, user.clone());
                    state.loading = false;
                    state.error = None;
                    previous.filter(|previous| Some(previous) != user.as_ref())
                };
                if let Some(previous) = displaced {
                    tracing::info!(user_id = previous.id, "session replaced");
                    self.inner
                        .bus
                        .emit::<UserLoggedOut>(UserSessionEvent { user_id: previous.id });
                }
                if let Some(user) = user {
                    tracing::info!(user_id = user.id, "user logged in");
                    self.inner
                        .bus
                        .emit::<UserLoggedIn>(UserSessionEvent { user_id: user.id });
                }
            }
            Either::Left(error) => {
                {
                    let mut state = self.inner.state.write();
                    state.loading = false;
                    state.error = Some(error.to_string());
                }
                self.inner.bus.emit::<ErrorOccurred>(error.clone());
            }
        }

        outcome
    }

    /// Ends the session, returning the user that was logged in.
    ///
    /// Emits [`UserLoggedOut`] only when a user was logged in.
    pub fn logout(&self) -> Option<AuthUser> {
        let previous = {
            let mut state = self.inner.state.write();
            let previous = state.user.take();
            *state = AuthState::default();
            previous
        };

        if let Some(user) = &previous {
            tracing::info!(user_id = user.id, "user logged out");
            self.inner
                .bus
                .emit::<UserLoggedOut>(UserSessionEvent { user_id: user.id });
        }
        previous
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("service", &self.inner.service)
            .field("state", &*self.inner.state.read())
            .finish_non_exhaustive()
    }
}
