//! Credential discovery
//!
//! Searches the configured request locations in order and returns the
//! first non-empty bearer token candidate. Locations are tried strictly in
//! order; there is no fallback merging between them.

use axum::http::{
    header::{AUTHORIZATION, COOKIE},
    HeaderMap, HeaderName,
};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Default extraction pattern: captures what follows a `Bearer ` prefix.
    static ref BEARER_PATTERN: Regex = Regex::new(r"Bearer\s+(.*)").expect("bearer pattern");
}

/// A location where a token may be found.
#[derive(Debug, Clone)]
pub enum TokenSource {
    /// A request header. Only the first header value is read; it is run
    /// through the extraction pattern and capture group 1 is the token.
    Header {
        name: HeaderName,
        /// Extraction pattern override; `None` means the default
        /// `Bearer`-stripping pattern.
        pattern: Option<Regex>,
    },
    /// A cookie from the `Cookie` header. An optional `Bearer ` prefix is
    /// stripped; an empty value never counts as a token.
    Cookie { name: String },
}

impl TokenSource {
    pub fn header(name: HeaderName) -> Self {
        Self::Header {
            name,
            pattern: None,
        }
    }

    pub fn header_with_pattern(name: HeaderName, pattern: Regex) -> Self {
        Self::Header {
            name,
            pattern: Some(pattern),
        }
    }

    pub fn cookie(name: impl Into<String>) -> Self {
        Self::Cookie { name: name.into() }
    }
}

/// Which kind of source produced a token. Drives the debug log wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Header,
    Cookie,
}

/// A located token candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedToken {
    pub token: String,
    pub kind: SourceKind,
}

/// Default sources: the `Authorization` header, then the `token` cookie.
pub fn default_sources() -> Vec<TokenSource> {
    vec![
        TokenSource::header(AUTHORIZATION),
        TokenSource::cookie("token"),
    ]
}

/// Try each source in order; the first non-empty match wins.
pub fn locate_token(sources: &[TokenSource], headers: &HeaderMap) -> Option<LocatedToken> {
    for source in sources {
        match source {
            TokenSource::Header { name, pattern } => {
                let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) else {
                    continue;
                };
                let pattern = pattern.as_ref().unwrap_or(&BEARER_PATTERN);
                let token = pattern
                    .captures(value)
                    .and_then(|captures| captures.get(1))
                    .map(|m| m.as_str().trim())
                    .filter(|t| !t.is_empty());
                if let Some(token) = token {
                    return Some(LocatedToken {
                        token: token.to_string(),
                        kind: SourceKind::Header,
                    });
                }
            }
            TokenSource::Cookie { name } => {
                let token = cookie_value(headers, name)
                    .map(|v| v.strip_prefix("Bearer ").unwrap_or(v).trim())
                    .filter(|v| !v.is_empty());
                if let Some(token) = token {
                    return Some(LocatedToken {
                        token: token.to_string(),
                        kind: SourceKind::Cookie,
                    });
                }
            }
        }
    }
    None
}

/// Value of a named cookie, searched across all `Cookie` headers.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                HeaderName::from_static(name),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_default_header_strips_bearer_prefix() {
        let headers = headers(&[("authorization", "Bearer abc.def.ghi")]);
        let located = locate_token(&default_sources(), &headers).unwrap();
        assert_eq!(located.token, "abc.def.ghi");
        assert_eq!(located.kind, SourceKind::Header);
    }

    #[test]
    fn test_header_without_bearer_prefix_is_not_found() {
        let headers = headers(&[("authorization", "abc.def.ghi")]);
        assert_eq!(locate_token(&default_sources(), &headers), None);
    }

    #[test]
    fn test_custom_pattern_takes_the_whole_value() {
        let sources = vec![TokenSource::header_with_pattern(
            HeaderName::from_static("x-token"),
            Regex::new("(.*)").unwrap(),
        )];
        let headers = headers(&[("x-token", "abc.def.ghi")]);
        let located = locate_token(&sources, &headers).unwrap();
        assert_eq!(located.token, "abc.def.ghi");
    }

    #[test]
    fn test_sources_are_tried_in_order() {
        // Header configured before cookie: the header value wins even
        // though the cookie also carries a token.
        let headers = headers(&[
            ("authorization", "Bearer from-header"),
            ("cookie", "token=from-cookie"),
        ]);
        let located = locate_token(&default_sources(), &headers).unwrap();
        assert_eq!(located.token, "from-header");
        assert_eq!(located.kind, SourceKind::Header);
    }

    #[test]
    fn test_cookie_fallback_when_header_missing() {
        let headers = headers(&[("cookie", "other=1; token=abc.def.ghi")]);
        let located = locate_token(&default_sources(), &headers).unwrap();
        assert_eq!(located.token, "abc.def.ghi");
        assert_eq!(located.kind, SourceKind::Cookie);
    }

    #[test]
    fn test_cookie_bearer_prefix_is_stripped() {
        let headers = headers(&[("cookie", "token=Bearer abc.def.ghi")]);
        let located = locate_token(&default_sources(), &headers).unwrap();
        assert_eq!(located.token, "abc.def.ghi");
    }

    #[test]
    fn test_empty_cookie_value_is_never_a_token() {
        let headers = headers(&[("cookie", "token=")]);
        assert_eq!(locate_token(&default_sources(), &headers), None);
    }

    #[test]
    fn test_no_source_yields_nothing() {
        assert_eq!(locate_token(&default_sources(), &HeaderMap::new()), None);
    }

    #[test]
    fn test_cookie_across_multiple_cookie_headers() {
        let headers = headers(&[("cookie", "a=1"), ("cookie", "token=abc")]);
        let located = locate_token(&[TokenSource::cookie("token")], &headers).unwrap();
        assert_eq!(located.token, "abc");
    }
}
