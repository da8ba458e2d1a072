//! Gate configuration
//!
//! [`GateOptions`] is an immutable value object built once at startup and
//! shared read-only across requests. Every `with_*` method consumes the
//! options and returns a new value; configuration visible to in-flight
//! requests never mutates.

use std::sync::Arc;

use axum::http::HeaderName;
use regex::Regex;

use crate::hooks::{AfterHook, BeforeHook, ErrorHook};
use crate::jwt::TokenVerifier;
use crate::locate::{default_sources, TokenSource};
use crate::rules::{AuthRule, RuleSet};

/// Default request attribute under which the decoded token is attached.
pub const DEFAULT_ATTRIBUTE: &str = "token";

/// Immutable configuration for the authentication gate.
#[derive(Clone)]
pub struct GateOptions {
    verifier: TokenVerifier,
    sources: Vec<TokenSource>,
    attribute: String,
    secure: bool,
    relaxed: Vec<String>,
    rules: RuleSet,
    before: Option<Arc<dyn BeforeHook>>,
    after: Option<Arc<dyn AfterHook>>,
    error: Option<Arc<dyn ErrorHook>>,
}

impl GateOptions {
    /// Options with the default policy: `Authorization` header then
    /// `token` cookie, attribute `token`, encrypted transport required,
    /// authentication required for every path.
    pub fn new(verifier: TokenVerifier) -> Self {
        Self {
            verifier,
            sources: default_sources(),
            attribute: DEFAULT_ATTRIBUTE.to_string(),
            secure: true,
            relaxed: Vec::new(),
            rules: RuleSet::new(),
            before: None,
            after: None,
            error: None,
        }
    }

    /// Rename the header the locator reads, keeping source order.
    pub fn with_header(mut self, name: HeaderName) -> Self {
        for source in &mut self.sources {
            if let TokenSource::Header { name: n, .. } = source {
                *n = name.clone();
            }
        }
        self
    }

    /// Rename the cookie the locator reads, keeping source order.
    pub fn with_cookie(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        for source in &mut self.sources {
            if let TokenSource::Cookie { name: n } = source {
                n.clone_from(&name);
            }
        }
        self
    }

    /// Set the extraction pattern applied to header sources. Capture
    /// group 1 is the token.
    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        for source in &mut self.sources {
            if let TokenSource::Header { pattern: p, .. } = source {
                *p = Some(pattern.clone());
            }
        }
        self
    }

    /// Replace the full ordered source list.
    pub fn with_sources(mut self, sources: Vec<TokenSource>) -> Self {
        self.sources = sources;
        self
    }

    /// Change the attribute name the decoded token is attached under.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = attribute.into();
        self
    }

    /// Require (default) or relax the encrypted-transport check.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Hosts allowed to authenticate over plain HTTP, in addition to the
    /// built-in loopback hosts.
    pub fn with_relaxed<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relaxed = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Append a rule to the rule set.
    pub fn with_rule(mut self, rule: impl AuthRule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Replace the rule set.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_before(mut self, hook: impl BeforeHook + 'static) -> Self {
        self.before = Some(Arc::new(hook));
        self
    }

    pub fn with_after(mut self, hook: impl AfterHook + 'static) -> Self {
        self.after = Some(Arc::new(hook));
        self
    }

    pub fn with_error(mut self, hook: impl ErrorHook + 'static) -> Self {
        self.error = Some(Arc::new(hook));
        self
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    pub fn sources(&self) -> &[TokenSource] {
        &self.sources
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    pub fn relaxed(&self) -> &[String] {
        &self.relaxed
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub(crate) fn before_hook(&self) -> Option<&dyn BeforeHook> {
        self.before.as_deref()
    }

    pub(crate) fn after_hook(&self) -> Option<&dyn AfterHook> {
        self.after.as_deref()
    }

    pub(crate) fn error_hook(&self) -> Option<&dyn ErrorHook> {
        self.error.as_deref()
    }
}

impl std::fmt::Debug for GateOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateOptions")
            .field("verifier", &self.verifier)
            .field("sources", &self.sources)
            .field("attribute", &self.attribute)
            .field("secure", &self.secure)
            .field("relaxed", &self.relaxed)
            .field("rules", &self.rules)
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}
