//! Environment configuration for the authentication gate
//!
//! The host application loads [`GateConfig`] once at startup and turns it
//! into [`GateOptions`]. Only the ambient knobs live here; token sources,
//! rules and hooks are code-level configuration.

use anyhow::{Context, Result};
use std::env;

use crate::jwt::TokenVerifier;
use crate::options::{GateOptions, DEFAULT_ATTRIBUTE};

/// Gate configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// HMAC signing secret (`JWT_GATE_SECRET`, required).
    pub secret: String,
    /// Require an encrypted transport (`JWT_GATE_SECURE`, default `true`).
    pub secure: bool,
    /// Hosts allowed to authenticate over plain HTTP
    /// (`JWT_GATE_RELAXED`, comma-separated).
    pub relaxed: Vec<String>,
    /// Request attribute name for the decoded token
    /// (`JWT_GATE_ATTRIBUTE`, default `token`).
    pub attribute: String,
}

impl GateConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            secret: env::var("JWT_GATE_SECRET").context("JWT_GATE_SECRET is required")?,
            secure: env::var("JWT_GATE_SECURE")
                .map(|value| parse_bool(&value))
                .unwrap_or(true),
            relaxed: env::var("JWT_GATE_RELAXED")
                .map(|value| parse_list(&value))
                .unwrap_or_default(),
            attribute: env::var("JWT_GATE_ATTRIBUTE")
                .unwrap_or_else(|_| DEFAULT_ATTRIBUTE.to_string()),
        })
    }

    /// Build immutable gate options from this configuration.
    pub fn into_options(self) -> GateOptions {
        GateOptions::new(TokenVerifier::from_secret(self.secret.as_bytes()))
            .with_secure(self.secure)
            .with_relaxed(self.relaxed)
            .with_attribute(self.attribute)
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|entry| entry.trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect()
}
