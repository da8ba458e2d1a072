//! HTTP middleware
//!
//! The authentication pipeline and its axum wiring.

pub mod authenticate;

pub use authenticate::{authenticate_middleware, AttachedToken, AuthGateState};
