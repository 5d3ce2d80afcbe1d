//! Client identification utilities
//!
//! Resolves the identity used as the rate-limiting key.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For header first (for reverse proxy setups),
/// then falls back to direct connection IP.
///
/// Only call this when the service sits behind a proxy that overwrites
/// the header; otherwise any client can pick its own rate-limit key.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    // First address in the list is the original client
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first_ip) = xff.split(',').next() {
            if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                return Some(ip);
            }
        }
    }
    direct_ip
}

/// Resolve the rate-limit identity for a request.
///
/// Returns `None` when no address can be determined; callers treat that
/// as an internal error for the request.
pub fn resolve_identity(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    trust_forwarded_for: bool,
) -> Option<String> {
    let ip = if trust_forwarded_for {
        extract_client_ip(headers, direct_ip)
    } else {
        direct_ip
    };
    ip.map(|ip| ip.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_client_ip_xff() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("192.168.1.1, 10.0.0.1"),
        );

        let ip = extract_client_ip(&headers, None);
        assert_eq!(ip, Some("192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_invalid_xff_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("garbage"));
        let direct: IpAddr = "10.1.2.3".parse().unwrap();

        assert_eq!(extract_client_ip(&headers, Some(direct)), Some(direct));
    }

    #[test]
    fn test_resolve_identity_ignores_xff_by_default() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("192.168.1.1"));
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        assert_eq!(
            resolve_identity(&headers, Some(direct), false),
            Some("127.0.0.1".to_string())
        );
        assert_eq!(
            resolve_identity(&headers, Some(direct), true),
            Some("192.168.1.1".to_string())
        );
    }

    #[test]
    fn test_resolve_identity_unknown_peer() {
        let headers = HeaderMap::new();
        assert_eq!(resolve_identity(&headers, None, false), None);
        assert_eq!(resolve_identity(&headers, None, true), None);
    }
}
