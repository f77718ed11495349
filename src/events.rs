//! Event keys shared by the directory's collaborators.

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::event_bus::EventKey;
use crate::users::User;

/// A service failure surfaced to whoever renders errors.
#[derive(Debug, Clone, Copy)]
pub struct ErrorOccurred;

impl EventKey for ErrorOccurred {
    type Payload = ServiceError;
    const NAME: &'static str = "error";
}

/// A request to reload the user list.
#[derive(Debug, Clone, Copy)]
pub struct RefreshUsers;

impl EventKey for RefreshUsers {
    type Payload = ();
    const NAME: &'static str = "refreshUsers";
}

/// A freshly loaded and validated user list.
#[derive(Debug, Clone, Copy)]
pub struct UsersLoaded;

impl EventKey for UsersLoaded {
    type Payload = Vec<User>;
    const NAME: &'static str = "getUsers";
}

/// Payload of the session events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserSessionEvent {
    /// The user whose session changed.
    pub user_id: u64,
}

/// A user authenticated.
#[derive(Debug, Clone, Copy)]
pub struct UserLoggedIn;

impl EventKey for UserLoggedIn {
    type Payload = UserSessionEvent;
    const NAME: &'static str = "userLoggedIn";
}

/// A user ended their session.
#[derive(Debug, Clone, Copy)]
pub struct UserLoggedOut;

impl EventKey for UserLoggedOut {
    type Payload = UserSessionEvent;
    const NAME: &'static str = "userLoggedOut";
}
