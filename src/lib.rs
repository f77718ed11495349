//! # roster
//!
//! Core of a user directory: fetch a remote user collection, enrich every
//! record with a reverse-geocoded country, validate the result and publish
//! it to interested collaborators through a scoped event bus.
//!
//! ## Overview
//!
//! - **Control**: [`Either`](control::Either), the success-or-failure value
//!   every fallible step returns.
//! - **Effect**: [`TaskEither`](effect::TaskEither), a deferred, repeatable
//!   async computation resolving to an `Either`.
//! - **Fetch**: [`fetch_data`](fetch::fetch_data), request -> decode ->
//!   adapt -> validate, over a pluggable [`HttpTransport`](fetch::HttpTransport).
//! - **Domain**: [`users`], [`geo`] and [`auth`] services built on the
//!   pipeline.
//! - **Events**: [`EventBus`](event_bus::EventBus), scoped publish/subscribe
//!   with replay, and the application keys in [`events`].
//!
//! ## Feature Flags
//!
//! - `http` (default): the `reqwest` backed transport and the `roster`
//!   binary.
//!
//! ## Example
//!
//! ```rust
//! use roster::prelude::*;
//!
//! let bus = EventBus::new("users-scope");
//! bus.emit::<RefreshUsers>(());
//! assert_eq!(bus.buffered_count(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// ```rust
/// use roster::prelude::*;
/// ```
pub mod prelude {
    pub use crate::auth::{AuthResponse, AuthService, AuthSession, AuthUser};
    pub use crate::config::RosterConfig;
    pub use crate::control::Either;
    pub use crate::effect::{TaskEither, TaskPanic};
    pub use crate::error::{ErrorCode, ServiceError, ValidationError, ValidationIssue};
    pub use crate::event_bus::{EventBus, EventKey, Listener, ReplayPolicy, listener};
    pub use crate::events::{
        ErrorOccurred, RefreshUsers, UserLoggedIn, UserLoggedOut, UserSessionEvent, UsersLoaded,
    };
    #[cfg(feature = "http")]
    pub use crate::fetch::ReqwestTransport;
    pub use crate::fetch::{FetchMethod, FetchRequest, HttpResponse, HttpTransport, fetch_data};
    pub use crate::geo::{CountryLookup, GeoService};
    pub use crate::users::{User, UserService, UsersController, UsersState};
}

pub mod auth;
pub mod config;
pub mod control;
pub mod effect;
pub mod error;
pub mod event_bus;
pub mod events;
pub mod fetch;
pub mod geo;
pub mod telemetry;
pub mod users;
