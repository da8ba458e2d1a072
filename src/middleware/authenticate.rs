//! Authentication pipeline middleware
//!
//! Orchestrates the end-to-end decision: rule-based skip check, transport
//! guard, credential discovery, verification, hook chain and downstream
//! dispatch. The downstream handler runs at most once per request and
//! never on the unauthenticated path.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::HOST, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::GateError;
use crate::jwt::{AuthFailure, DecodedToken};
use crate::locate::{locate_token, SourceKind};
use crate::options::GateOptions;
use crate::transport::check_transport;

/// Shared state for the authentication middleware.
///
/// Holds the immutable [`GateOptions`] behind an `Arc`; cloning per
/// request is cheap and safe across worker tasks.
#[derive(Clone)]
pub struct AuthGateState {
    options: Arc<GateOptions>,
}

impl AuthGateState {
    pub fn new(options: GateOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &GateOptions {
        &self.options
    }
}

/// Decoded credential attached to request extensions on success.
///
/// `name` carries the configured attribute name so downstream consumers
/// can discriminate when several gates run in one stack.
#[derive(Debug, Clone)]
pub struct AttachedToken {
    pub name: String,
    pub token: DecodedToken,
}

/// Authentication gate middleware.
///
/// Wire it with `axum::middleware::from_fn_with_state`:
///
/// ```ignore
/// let state = AuthGateState::new(GateOptions::new(verifier));
/// let app = Router::new()
///     .route("/api/users", get(handler))
///     .layer(middleware::from_fn_with_state(state, authenticate_middleware));
/// ```
pub async fn authenticate_middleware(
    State(state): State<AuthGateState>,
    request: Request,
    next: Next,
) -> Result<Response, GateError> {
    let options = state.options();

    // CORS preflight and rule-exempted requests bypass the gate entirely:
    // no transport check, no hooks, no attribute attached.
    if request.method() == Method::OPTIONS
        || !options
            .rules()
            .should_authenticate(request.uri().path(), request.method())
    {
        return Ok(next.run(request).await);
    }

    if options.secure() {
        // A relative-form URI carries no scheme; treat it as plain HTTP
        // so the guard fails closed until the deployment relaxes it.
        let scheme = request.uri().scheme_str().unwrap_or("http");
        let host = request_host(&request);
        check_transport(scheme, host, options.relaxed())?;
    }

    let outcome = match locate_token(options.sources(), request.headers()) {
        None => {
            tracing::debug!("Token not found");
            Err(AuthFailure::NotFound)
        }
        Some(located) => {
            match located.kind {
                SourceKind::Header => tracing::debug!("Using token from request header"),
                SourceKind::Cookie => tracing::debug!("Using token from cookie"),
            }
            options.verifier().verify(&located.token)
        }
    };

    match outcome {
        Ok(token) => {
            let mut request = match options.before_hook() {
                Some(hook) => hook.call(request, &token),
                None => request,
            };
            request.extensions_mut().insert(AttachedToken {
                name: options.attribute().to_string(),
                token: token.clone(),
            });

            let response = next.run(request).await;

            Ok(match options.after_hook() {
                Some(hook) => hook.call(response, &token),
                None => response,
            })
        }
        Err(failure) => {
            match &failure {
                AuthFailure::NotFound => {}
                AuthFailure::Expired(raw) => tracing::warn!(token = %raw, "Token expired"),
                AuthFailure::Unverified(raw) => tracing::warn!(token = %raw, "Token not signed"),
                AuthFailure::Malformed(raw) => tracing::warn!(token = %raw, "Token malformed"),
            }

            let response = unauthorized_response();
            Ok(match options.error_hook() {
                Some(hook) => hook.call(&request, response, &failure),
                None => response,
            })
        }
    }
}

/// Host for the transport check: URI authority first, `Host` header as
/// fallback, port stripped.
fn request_host(request: &Request) -> &str {
    if let Some(host) = request.uri().host() {
        return host;
    }
    request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .and_then(|host| host.split(':').next())
        .unwrap_or("")
}

/// Default unauthorized response: 401 with an empty body.
fn unauthorized_response() -> Response {
    StatusCode::UNAUTHORIZED.into_response()
}
