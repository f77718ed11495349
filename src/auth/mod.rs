//! Email authentication against the user directory and the session that
//! keeps its result.

mod model;
mod service;
mod session;

pub use model::{AuthResponse, AuthUser, auth_validator};
pub use service::{AuthService, authenticate_adapter};
pub use session::{AuthSession, AuthState};
