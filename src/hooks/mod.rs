//! Extension hooks around the authentication decision
//!
//! Three capability traits, one per extension point. Each has a blanket
//! impl for matching closures, so any plain `Fn` qualifies without a
//! wrapper type. All hooks are optional; an unset hook means identity or
//! default behavior.

use axum::{extract::Request, response::Response};

use crate::jwt::{AuthFailure, DecodedToken};

/// Runs once on successful verification, before the downstream handler.
///
/// The returned request replaces the one dispatched downstream.
pub trait BeforeHook: Send + Sync {
    fn call(&self, request: Request, token: &DecodedToken) -> Request;
}

impl<F> BeforeHook for F
where
    F: Fn(Request, &DecodedToken) -> Request + Send + Sync,
{
    fn call(&self, request: Request, token: &DecodedToken) -> Request {
        self(request, token)
    }
}

/// Runs once after the downstream handler returns, success path only.
///
/// The returned response is what the caller observes. If the hook sets an
/// error status, that decision is final; the gate does not override it.
pub trait AfterHook: Send + Sync {
    fn call(&self, response: Response, token: &DecodedToken) -> Response;
}

impl<F> AfterHook for F
where
    F: Fn(Response, &DecodedToken) -> Response + Send + Sync,
{
    fn call(&self, response: Response, token: &DecodedToken) -> Response {
        self(response, token)
    }
}

/// Runs exactly once whenever required authentication fails.
///
/// Receives the original request, the default 401 response and the failure
/// reason; returns the final unauthorized response.
pub trait ErrorHook: Send + Sync {
    fn call(&self, request: &Request, response: Response, failure: &AuthFailure) -> Response;
}

impl<F> ErrorHook for F
where
    F: Fn(&Request, Response, &AuthFailure) -> Response + Send + Sync,
{
    fn call(&self, request: &Request, response: Response, failure: &AuthFailure) -> Response {
        self(request, response, failure)
    }
}
