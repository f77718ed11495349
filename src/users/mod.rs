//! The user directory: raw records, adaptation with geocoding, validation,
//! the fetching service and the controller that owns the loaded list.

mod adapter;
mod controller;
mod model;
mod service;
mod validator;

pub use adapter::{ensure_scheme, user_adapter};
pub use controller::{UsersController, UsersState};
pub use model::{Address, RawAddress, RawGeo, RawUser, User};
pub use service::{ADAPT_USERS_PREFIX, UserService, adapt_users};
pub use validator::{is_valid_email, is_valid_url, user_issues, user_validator, validate_users};
