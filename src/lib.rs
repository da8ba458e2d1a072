//! JWT Gate - Authentication middleware for axum
//!
//! This crate decides, per request, whether a bearer token is required,
//! locates it in headers or cookies, verifies it through `jsonwebtoken`,
//! and either forwards the request with the decoded token attached or
//! short-circuits with a 401 response.

pub mod config;
pub mod error;
pub mod hooks;
pub mod jwt;
pub mod locate;
pub mod middleware;
pub mod options;
pub mod rules;
pub mod transport;

// Re-export commonly used types
pub use error::{GateError, Result};
pub use jwt::{AuthFailure, DecodedToken, TokenVerifier};
pub use middleware::{authenticate_middleware, AttachedToken, AuthGateState};
pub use options::GateOptions;
pub use rules::{AuthRule, MethodRule, PathRule, RuleDecision, RuleSet};
