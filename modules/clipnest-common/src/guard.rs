//! SSRF guard for candidate URLs.
//!
//! Pure validation, no DNS, no network. Every URL entering the pipeline
//! passes through here, and every redirect target must be re-validated
//! before it is fetched. The deny-list and range table below are the
//! security configuration surface; pipeline code never hardcodes hosts.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use url::{Host, Url};

/// Longest URL the pipeline accepts.
pub const MAX_URL_LEN: usize = 2048;

/// Hostnames that must never be fetched, regardless of what they resolve to.
const BLOCKED_HOSTS: &[&str] = &[
    "localhost",
    "localhost.localdomain",
    "metadata.google.internal",
    "metadata.goog",
    "instance-data",
    "169.254.169.254",
    "0.0.0.0",
];

/// Private/reserved IPv4 space as (network, prefix-length) pairs.
const PRIVATE_V4_RANGES: &[(Ipv4Addr, u8)] = &[
    (Ipv4Addr::new(10, 0, 0, 0), 8),
    (Ipv4Addr::new(172, 16, 0, 0), 12),
    (Ipv4Addr::new(192, 168, 0, 0), 16),
    (Ipv4Addr::new(127, 0, 0, 0), 8),
    (Ipv4Addr::new(169, 254, 0, 0), 16),
    (Ipv4Addr::new(0, 0, 0, 0), 8),
    (Ipv4Addr::new(100, 64, 0, 0), 10), // CGNAT
];

/// Dotted prefixes that place a hostname inside private space even when it
/// is not a parseable IP (`10.0.0.5.attacker.example` and friends).
static PRIVATE_HOST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:10\.|127\.|0\.|192\.168\.|169\.254\.|172\.(?:1[6-9]|2\d|3[01])\.|100\.(?:6[4-9]|[7-9]\d|1[01]\d|12[0-7])\.)",
    )
    .expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("too long")]
    TooLong,
    #[error("malformed URL")]
    Malformed,
    #[error("scheme must be http or https")]
    BadScheme,
    #[error("blocked hostname")]
    BlockedHost,
    #[error("private or reserved address")]
    PrivateAddress,
}

/// A URL that passed validation. Created per request, discarded after.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateUrl {
    pub raw: String,
    pub parsed: Url,
    /// Normalized hostname (lowercased, trailing dot stripped).
    pub host: String,
    /// Populated when the host is a literal IP. No DNS resolution happens
    /// here; see DESIGN.md on the rebinding gap.
    pub resolved_ip: Option<IpAddr>,
}

/// Validate a candidate URL against the SSRF policy. Pure function; callers
/// must re-invoke it on every redirect target before fetching that target.
pub fn validate(url_str: &str) -> Result<CandidateUrl, RejectReason> {
    if url_str.len() > MAX_URL_LEN {
        return Err(RejectReason::TooLong);
    }

    let parsed = Url::parse(url_str).map_err(|_| RejectReason::Malformed)?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(RejectReason::BadScheme);
    }

    let host = match parsed.host() {
        Some(h) => h.to_owned(),
        None => return Err(RejectReason::Malformed),
    };

    match host {
        Host::Domain(name) => {
            let name = name.trim_end_matches('.').to_ascii_lowercase();
            if BLOCKED_HOSTS.contains(&name.as_str()) {
                return Err(RejectReason::BlockedHost);
            }
            if PRIVATE_HOST_RE.is_match(&name) {
                return Err(RejectReason::PrivateAddress);
            }
            Ok(CandidateUrl {
                raw: url_str.to_string(),
                parsed,
                host: name,
                resolved_ip: None,
            })
        }
        Host::Ipv4(ip) => {
            let literal = ip.to_string();
            if BLOCKED_HOSTS.contains(&literal.as_str()) {
                return Err(RejectReason::BlockedHost);
            }
            if is_private_v4(ip) {
                return Err(RejectReason::PrivateAddress);
            }
            Ok(CandidateUrl {
                raw: url_str.to_string(),
                parsed,
                host: literal,
                resolved_ip: Some(IpAddr::V4(ip)),
            })
        }
        Host::Ipv6(ip) => {
            if is_private_v6(&ip) {
                return Err(RejectReason::PrivateAddress);
            }
            Ok(CandidateUrl {
                raw: url_str.to_string(),
                parsed,
                host: ip.to_string(),
                resolved_ip: Some(IpAddr::V6(ip)),
            })
        }
    }
}

fn is_private_v4(ip: Ipv4Addr) -> bool {
    PRIVATE_V4_RANGES
        .iter()
        .any(|&(net, prefix)| in_range(ip, net, prefix))
}

fn in_range(ip: Ipv4Addr, net: Ipv4Addr, prefix: u8) -> bool {
    let mask = if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - prefix)
    };
    (u32::from(ip) & mask) == (u32::from(net) & mask)
}

fn is_private_v6(ip: &Ipv6Addr) -> bool {
    if ip.is_loopback() || ip.is_unspecified() {
        return true;
    }
    let seg = ip.segments();
    // fe80::/10 link-local, fc00::/7 unique-local
    if (seg[0] & 0xffc0) == 0xfe80 || (seg[0] & 0xfe00) == 0xfc00 {
        return true;
    }
    // IPv4-mapped addresses inherit the IPv4 verdict
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_private_v4(v4);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_public_https_url() {
        let candidate = validate("https://example.com/a").unwrap();
        assert_eq!(candidate.host, "example.com");
        assert_eq!(candidate.parsed.scheme(), "https");
        assert!(candidate.resolved_ip.is_none());
    }

    #[test]
    fn rejects_overlong_url() {
        let url = format!("https://example.com/{}", "a".repeat(2100));
        assert_eq!(validate(&url), Err(RejectReason::TooLong));
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert_eq!(
            validate("ftp://example.com/file"),
            Err(RejectReason::BadScheme)
        );
        assert_eq!(
            validate("file:///etc/passwd"),
            Err(RejectReason::BadScheme)
        );
    }

    #[test]
    fn rejects_blocked_hostnames() {
        assert_eq!(
            validate("https://metadata.google.internal/x"),
            Err(RejectReason::BlockedHost)
        );
        assert_eq!(
            validate("http://localhost:8080/admin"),
            Err(RejectReason::BlockedHost)
        );
        assert_eq!(
            validate("http://LOCALHOST./admin"),
            Err(RejectReason::BlockedHost)
        );
        assert_eq!(
            validate("http://169.254.169.254/latest/meta-data/"),
            Err(RejectReason::BlockedHost)
        );
    }

    #[test]
    fn rejects_private_ipv4_literals() {
        for url in [
            "http://10.0.0.1/",
            "http://172.16.5.5/",
            "http://172.31.255.1/",
            "http://192.168.1.1/router",
            "http://127.0.0.1:9200/",
            "http://169.254.1.1/",
            "http://0.1.2.3/",
            "http://100.64.0.1/",
            "http://100.127.255.254/",
        ] {
            assert_eq!(validate(url), Err(RejectReason::PrivateAddress), "{url}");
        }
    }

    #[test]
    fn accepts_public_ipv4_literals() {
        for url in [
            "http://8.8.8.8/",
            "http://172.32.0.1/",
            "http://100.128.0.1/",
            "http://9.255.255.255/",
        ] {
            let candidate = validate(url).unwrap();
            assert!(candidate.resolved_ip.is_some(), "{url}");
        }
    }

    #[test]
    fn rejects_private_looking_hostnames() {
        assert_eq!(
            validate("http://10.0.0.5.attacker.example/"),
            Err(RejectReason::PrivateAddress)
        );
        assert_eq!(
            validate("http://192.168.0.banner.example/"),
            Err(RejectReason::PrivateAddress)
        );
    }

    #[test]
    fn rejects_private_ipv6() {
        assert_eq!(validate("http://[::1]/"), Err(RejectReason::PrivateAddress));
        assert_eq!(
            validate("http://[fe80::1]/"),
            Err(RejectReason::PrivateAddress)
        );
        assert_eq!(
            validate("http://[fd00::1]/"),
            Err(RejectReason::PrivateAddress)
        );
        assert_eq!(
            validate("http://[::ffff:10.0.0.1]/"),
            Err(RejectReason::PrivateAddress)
        );
    }

    #[test]
    fn rejects_urls_without_host() {
        assert_eq!(validate("not a url"), Err(RejectReason::Malformed));
    }

    #[test]
    fn reason_strings_are_stable() {
        assert_eq!(RejectReason::TooLong.to_string(), "too long");
        assert_eq!(RejectReason::BlockedHost.to_string(), "blocked hostname");
    }
}
