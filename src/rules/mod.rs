//! Request rules deciding which requests must authenticate
//!
//! A [`RuleSet`] is an ordered list of [`AuthRule`]s. Every rule is
//! evaluated for every request: if any rule exempts the request,
//! authentication is skipped regardless of what other rules say; otherwise
//! authentication is required when at least one rule claims the request.
//! An empty rule set requires authentication everywhere.

use std::sync::Arc;

use axum::http::Method;

/// Outcome of evaluating one rule against a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleDecision {
    /// The rule claims this request for authentication.
    pub requires: bool,
    /// The rule exempts this request from authentication.
    pub exempts: bool,
}

/// A predicate over request path and method.
///
/// Implement this to plug custom rules into a [`RuleSet`]; the built-ins
/// are [`PathRule`] and [`MethodRule`].
pub trait AuthRule: Send + Sync {
    fn evaluate(&self, path: &str, method: &Method) -> RuleDecision;
}

/// Method filter for [`PathRule`].
#[derive(Debug, Clone, Default)]
pub enum MethodFilter {
    /// The rule applies to every method.
    #[default]
    Any,
    /// The rule applies only to the listed methods (exact match).
    Only(Vec<Method>),
}

impl MethodFilter {
    fn allows(&self, method: &Method) -> bool {
        match self {
            MethodFilter::Any => true,
            MethodFilter::Only(methods) => methods.contains(method),
        }
    }
}

/// `true` when `path` falls under `prefix`. The root prefix matches
/// everything.
fn prefix_matches(prefix: &str, path: &str) -> bool {
    prefix == "/" || path.starts_with(prefix)
}

/// Prefix-based path rule.
///
/// Paths under a `required` prefix are claimed for authentication, paths
/// under an `exempt` prefix are released; exemption beats requirement
/// within the rule. An empty `required` list defaults to `/`, so the rule
/// claims every path.
#[derive(Debug, Clone)]
pub struct PathRule {
    required: Vec<String>,
    exempt: Vec<String>,
    methods: MethodFilter,
}

impl PathRule {
    pub fn new(required: &[&str], exempt: &[&str]) -> Self {
        let required = if required.is_empty() {
            vec!["/".to_string()]
        } else {
            required.iter().map(|p| p.to_string()).collect()
        };
        Self {
            required,
            exempt: exempt.iter().map(|p| p.to_string()).collect(),
            methods: MethodFilter::Any,
        }
    }

    /// Restrict the rule to the given methods.
    pub fn with_methods(mut self, methods: Vec<Method>) -> Self {
        self.methods = MethodFilter::Only(methods);
        self
    }
}

impl AuthRule for PathRule {
    fn evaluate(&self, path: &str, method: &Method) -> RuleDecision {
        RuleDecision {
            requires: self.methods.allows(method)
                && self.required.iter().any(|p| prefix_matches(p, path)),
            exempts: self.exempt.iter().any(|p| prefix_matches(p, path)),
        }
    }
}

/// Exempts requests by method, regardless of path.
///
/// Composes with [`PathRule`] in a rule set: the path rule claims a scope,
/// the method rule releases e.g. preflight methods from it.
#[derive(Debug, Clone)]
pub struct MethodRule {
    passthrough: Vec<Method>,
}

impl MethodRule {
    pub fn new(passthrough: Vec<Method>) -> Self {
        Self { passthrough }
    }
}

impl AuthRule for MethodRule {
    fn evaluate(&self, _path: &str, method: &Method) -> RuleDecision {
        RuleDecision {
            requires: false,
            exempts: self.passthrough.contains(method),
        }
    }
}

/// Ordered collection of rules.
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: Vec<Arc<dyn AuthRule>>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: Arc<dyn AuthRule>) {
        self.rules.push(rule);
    }

    /// Builder-style convenience for composing rule sets in place.
    pub fn with(mut self, rule: impl AuthRule + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether a request for `path` with `method` must authenticate.
    ///
    /// All rules are evaluated; there is no first-match precedence. Any
    /// exemption wins over any requirement.
    pub fn should_authenticate(&self, path: &str, method: &Method) -> bool {
        if self.rules.is_empty() {
            return true;
        }

        let mut required = false;
        for rule in &self.rules {
            let decision = rule.evaluate(path, method);
            if decision.exempts {
                return false;
            }
            required = required || decision.requires;
        }
        required
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules", &self.rules.len())
            .finish()
    }
}
