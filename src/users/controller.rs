//! Owner of the user list: loads it, tracks progress, announces results.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tokio::runtime::{Handle, TryCurrentError};

use super::model::User;
use super::service::UserService;
use crate::control::Either;
use crate::error::ServiceError;
use crate::event_bus::{EventBus, Listener, listener};
use crate::events::{ErrorOccurred, RefreshUsers, UsersLoaded};

/// Snapshot of the list as a renderer sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsersState {
    /// The last successfully loaded list; empty after a failed load.
    pub users: Vec<User>,
    /// `true` while a load is in flight.
    pub loading: bool,
    /// Message of the last failed load.
    pub error: Option<String>,
}

struct ControllerInner {
    service: UserService,
    bus: EventBus,
    state: RwLock<UsersState>,
    refresh_pending: AtomicBool,
}

/// Loads users through a [`UserService`] and publishes the outcome on an
/// [`EventBus`].
///
/// Clones share state.
#[derive(Clone)]
pub struct UsersController {
    inner: Arc<ControllerInner>,
}

impl UsersController {
    /// Creates an idle controller.
    pub fn new(service: UserService, bus: EventBus) -> Self {
        Self {
            inner: Arc::new(ControllerInner {
                service,
                bus,
                state: RwLock::new(UsersState::default()),
                refresh_pending: AtomicBool::new(false),
            }),
        }
    }

    /// Current state.
    pub fn state(&self) -> UsersState {
        self.inner.state.read().clone()
    }

    /// The bus results are published on.
    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    /// Loads the list.
    ///
    /// On success the list replaces the previous one and [`UsersLoaded`] is
    /// emitted. On failure the list is cleared, the message is kept in
    /// [`UsersState::error`] and [`ErrorOccurred`] is emitted.
    pub async fn refresh(&self) -> Either<ServiceError, Vec<User>> {
        Self::refresh_inner(&self.inner).await
    }

    async fn refresh_inner(inner: &ControllerInner) -> Either<ServiceError, Vec<User>> {
        {
            let mut state = inner.state.write();
            state.loading = true;
            state.error = None;
        }

        let outcome = inner.service.get_users().run().await;

        match &outcome {
            Either::Right(users) => {
                tracing::info!(count = users.len(), "users loaded");
                *inner.state.write() = UsersState {
                    users: users.clone(),
                    loading: false,
                    error: None,
                };
                inner.bus.emit::<UsersLoaded>(users.clone());
            }
            Either::Left(error) => {
                tracing::warn!(%error, "loading users failed");
                *inner.state.write() = UsersState {
                    users: Vec::new(),
                    loading: false,
                    error: Some(error.to_string()),
                };
                inner.bus.emit::<ErrorOccurred>(error.clone());
            }
        }

        outcome
    }

    /// Reloads the list whenever [`RefreshUsers`] is emitted on the
    /// controller's bus, including refresh requests already buffered.
    ///
    /// Refreshes are spawned on the runtime current at the time of the call;
    /// fails outside a tokio runtime. At most one spawned refresh runs at a
    /// time: requests arriving while one is in flight are dropped. The returned listener can be passed to
    /// [`EventBus::off`] to detach. The listener does not keep the controller
    /// alive.
    pub fn attach(&self) -> Result<Listener<()>, TryCurrentError> {
        let handle = Handle::try_current()?;
        let weak: Weak<ControllerInner> = Arc::downgrade(&self.inner);

        let on_refresh = listener(move |_: &()| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner
                .refresh_pending
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                tracing::debug!("refresh already in flight, request dropped");
                return;
            }
            handle.spawn(async move {
                let _ = UsersController::refresh_inner(&inner).await;
                inner.refresh_pending.store(false, Ordering::Release);
            });
        });

        self.inner.bus.on::<RefreshUsers>(Arc::clone(&on_refresh));
        Ok(on_refresh)
    }
}

impl std::fmt::Debug for UsersController {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("UsersController")
            .field("service", &self.inner.service)
            .field("bus", &self.inner.bus)
            .field("state", &*self.inner.state.read())
            .finish()
    }
}
