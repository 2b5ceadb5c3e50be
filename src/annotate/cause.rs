//! Cause classification rules.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use serde::Serialize;
use strum_macros::EnumIter as EnumIterMacro;

use crate::report::{UrlOutcome, UrlRecord};

/// Likely reason a URL failed, in rule priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIterMacro)]
#[serde(rename_all = "kebab-case")]
pub enum Cause {
    /// The server is throttling requests
    RateLimited,
    /// The URL sits behind a login
    AuthGated,
    /// Access denied by region or CDN rules
    GeoBlocked,
    /// Loopback, private network or reserved development domain
    LocalUrl,
    /// The request did not complete in time
    Timeout,
    /// DNS or connection-level failure
    Network,
    /// Anything else
    Generic,
}

impl Cause {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cause::RateLimited => "rate-limited",
            Cause::AuthGated => "auth-gated",
            Cause::GeoBlocked => "geo-blocked",
            Cause::LocalUrl => "local-url",
            Cause::Timeout => "timeout",
            Cause::Network => "network",
            Cause::Generic => "generic",
        }
    }

    /// Short human-readable title used for annotation headers.
    pub fn title(&self) -> &'static str {
        match self {
            Cause::RateLimited => "Rate limited",
            Cause::AuthGated => "Authentication required",
            Cause::GeoBlocked => "Blocked by region or CDN",
            Cause::LocalUrl => "Local URL",
            Cause::Timeout => "Timed out",
            Cause::Network => "Network error",
            Cause::Generic => "Broken URL",
        }
    }

    /// Suggested remediation.
    pub fn hint(&self) -> &'static str {
        match self {
            Cause::RateLimited => {
                "The server is rate limiting requests. Lower the concurrency, set a rate limit, or allowlist the host."
            }
            Cause::AuthGated => {
                "The URL requires authentication. Allowlist it if it is expected to be private."
            }
            Cause::GeoBlocked => {
                "Access was denied from the runner's network. Check the URL in a browser and allowlist it if it works."
            }
            Cause::LocalUrl => {
                "Local and development URLs are unreachable from CI. Exclude them with an exclude pattern."
            }
            Cause::Timeout => {
                "The server did not answer in time. Increase the timeout or retries, or enable allow-timeout."
            }
            Cause::Network => {
                "The host could not be reached. Check the domain for typos or whether the site has moved."
            }
            Cause::Generic => "Fix or remove the URL, or allowlist it if the failure is expected.",
        }
    }
}

impl std::fmt::Display for Cause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const RATE_LIMIT_TEXT: &[&str] = &["rate limit", "ratelimit", "rate-limit", "too many requests"];
const AUTH_TEXT: &[&str] = &[
    "auth",
    "login",
    "log in",
    "sign in",
    "credential",
    "unauthorized",
    "token",
    "permission",
];
const NETWORK_TEXT: &[&str] = &[
    "dns",
    "resolve",
    "lookup",
    "name or service not known",
    "no such host",
    "nodename nor servname",
    "connection refused",
    "connection reset",
    "connection closed",
    "connect error",
    "error trying to connect",
    "unreachable",
    "certificate",
    "tls",
    "ssl",
    "network",
];
const LOCAL_SUFFIXES: &[&str] = &[
    ".local",
    ".localhost",
    ".test",
    ".example",
    ".invalid",
    ".internal",
    ".lan",
];

fn mentions(text: Option<&str>, needles: &[&str]) -> bool {
    text.map(str::to_ascii_lowercase)
        .is_some_and(|lower| needles.iter().any(|needle| lower.contains(needle)))
}

/// Whether `host` is loopback, private, link-local or a reserved dev name.
pub fn is_local_host(host: &str) -> bool {
    let host = host.trim_end_matches('.');
    if let Ok(ip) = host.parse::<IpAddr>() {
        return match ip {
            IpAddr::V4(v4) => is_local_v4(v4),
            IpAddr::V6(v6) => is_local_v6(v6),
        };
    }
    host == "localhost" || LOCAL_SUFFIXES.iter().any(|suffix| host.ends_with(suffix))
}

fn is_local_v4(ip: Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified()
}

fn is_local_v6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_local_v4(v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || (first & 0xfe00) == 0xfc00 // unique local
        || (first & 0xffc0) == 0xfe80 // link local
}

/// First matching cause rule for a failing record.
pub fn classify_cause(record: &UrlRecord) -> Cause {
    let status = record.status_code;
    let error = record.error.as_deref();
    let local = record.host().is_some_and(|host| is_local_host(&host));

    if status == Some(429) || mentions(error, RATE_LIMIT_TEXT) {
        return Cause::RateLimited;
    }
    if matches!(status, Some(401) | Some(407)) || (status == Some(403) && mentions(error, AUTH_TEXT))
    {
        return Cause::AuthGated;
    }
    if status == Some(451) || (status == Some(403) && !local) {
        return Cause::GeoBlocked;
    }
    if local {
        return Cause::LocalUrl;
    }
    if record.outcome == UrlOutcome::TimedOut {
        return Cause::Timeout;
    }
    if status.is_none() && mentions(error, NETWORK_TEXT) {
        return Cause::Network;
    }
    Cause::Generic
}
