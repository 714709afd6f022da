use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::HOST, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::warn;

use crate::AppState;

/// Host names the site answers to.
///
/// `*` accepts any host. An entry starting with `.` matches that domain and
/// every subdomain of it. Matching ignores case and any `:port` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedHosts {
    any: bool,
    entries: Vec<String>,
}

impl Default for AllowedHosts {
    fn default() -> Self {
        Self::any()
    }
}

impl AllowedHosts {
    pub fn any() -> Self {
        Self {
            any: true,
            entries: Vec::new(),
        }
    }

    /// Comma separated list, e.g. `soilcast.example.org,.onrender.com`
    pub fn parse(raw: &str) -> Self {
        let entries: Vec<String> = raw
            .split(',')
            .map(|h| h.trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        Self {
            any: entries.iter().any(|h| h == "*"),
            entries,
        }
    }

    pub fn allows(&self, host_header: &str) -> bool {
        if self.any {
            return true;
        }
        let host = strip_port(host_header.trim()).to_ascii_lowercase();
        if host.is_empty() {
            return false;
        }
        self.entries.iter().any(|entry| match entry.strip_prefix('.') {
            Some(domain) => host == domain || host.ends_with(entry.as_str()),
            None => host == *entry,
        })
    }
}

fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        // [::1]:8000
        return rest.split(']').next().unwrap_or(rest);
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

pub async fn check_host(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| request.uri().host())
        .unwrap_or_default();

    if !state.allowed_hosts.allows(host) {
        warn!("rejected request for disallowed host '{}'", host);
        return (StatusCode::BAD_REQUEST, "Bad Request (400)").into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_allows_everything() {
        let hosts = AllowedHosts::parse("*");
        assert!(hosts.allows("anything.test"));
        assert!(hosts.allows(""));
        assert_eq!(AllowedHosts::default(), AllowedHosts::any());
    }

    #[test]
    fn exact_names_ignore_port_and_case() {
        let hosts = AllowedHosts::parse("soilcast.example.org, localhost");
        assert!(hosts.allows("Soilcast.Example.org"));
        assert!(hosts.allows("localhost:8000"));
        assert!(!hosts.allows("evil.example.org"));
        assert!(!hosts.allows(""));
    }

    #[test]
    fn leading_dot_matches_subdomains() {
        let hosts = AllowedHosts::parse(".onrender.com");
        assert!(hosts.allows("onrender.com"));
        assert!(hosts.allows("soilcast.onrender.com:443"));
        assert!(!hosts.allows("notonrender.com"));
    }

    #[test]
    fn ipv6_literals() {
        let hosts = AllowedHosts::parse("::1");
        assert!(hosts.allows("[::1]:8000"));
        assert!(hosts.allows("[::1]"));
    }
}
