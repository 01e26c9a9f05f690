//! Auth Handlers

pub mod auth;
pub mod auth_me;

pub use auth::{change_password, login, register};
pub use auth_me::{me, update_me};
