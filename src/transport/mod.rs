//! Secure-transport guard
//!
//! Authenticating over plain HTTP leaks credentials, so unless explicitly
//! relaxed the gate refuses to even attempt it. The failure is a fatal
//! configuration error rather than a 401: it signals a broken deployment,
//! not a bad credential.

use crate::error::GateError;

/// Hosts that may always authenticate over plain HTTP.
const LOOPBACK_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "::1"];

/// Checks that the transport is encrypted, or that the host is relaxed.
///
/// `https` passes unconditionally. Anything else passes only for loopback
/// hosts or hosts in the configured relaxed set (case-insensitive).
pub fn check_transport(scheme: &str, host: &str, relaxed: &[String]) -> Result<(), GateError> {
    if scheme.eq_ignore_ascii_case("https") {
        return Ok(());
    }
    if is_relaxed(host, relaxed) {
        return Ok(());
    }
    Err(GateError::InsecureTransport {
        scheme: scheme.to_string(),
        host: host.to_string(),
    })
}

fn is_relaxed(host: &str, relaxed: &[String]) -> bool {
    LOOPBACK_HOSTS.iter().any(|h| host.eq_ignore_ascii_case(h))
        || relaxed.iter().any(|h| host.eq_ignore_ascii_case(h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https", "example.com", true)]
    #[case("HTTPS", "example.com", true)]
    #[case("http", "example.com", false)]
    #[case("http", "localhost", true)]
    #[case("http", "127.0.0.1", true)]
    #[case("http", "::1", true)]
    #[case("http", "LOCALHOST", true)]
    #[case("http", "", false)]
    fn test_default_policy(#[case] scheme: &str, #[case] host: &str, #[case] passes: bool) {
        assert_eq!(check_transport(scheme, host, &[]).is_ok(), passes);
    }

    #[test]
    fn test_relaxed_host_passes_over_http() {
        let relaxed = vec!["example.com".to_string()];
        assert!(check_transport("http", "example.com", &relaxed).is_ok());
        assert!(check_transport("http", "EXAMPLE.com", &relaxed).is_ok());
        assert!(check_transport("http", "other.com", &relaxed).is_err());
    }

    #[test]
    fn test_rejection_carries_scheme_and_host() {
        let err = check_transport("http", "prod.example.com", &[]).unwrap_err();
        match err {
            GateError::InsecureTransport { scheme, host } => {
                assert_eq!(scheme, "http");
                assert_eq!(host, "prod.example.com");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
