/// Checks if a host matches an accepted hostname pattern
///
/// This function supports two types of patterns:
/// 1. Exact match: "example.org" matches only "example.org"
/// 2. Wildcard match: "*.example.org" matches:
///    - "example.org" (the bare domain)
///    - "www.example.org" (single subdomain)
///    - "static.cdn.example.org" (nested subdomains)
///
/// Hostnames are compared ASCII case-insensitively.
///
/// # Examples
///
/// ```
/// use site_mirror::url::matches_hostname;
///
/// assert!(matches_hostname("example.org", "EXAMPLE.org"));
/// assert!(!matches_hostname("example.org", "www.example.org"));
///
/// assert!(matches_hostname("*.example.org", "example.org"));
/// assert!(matches_hostname("*.example.org", "www.example.org"));
/// assert!(!matches_hostname("*.example.org", "badexample.org"));
/// ```
pub fn matches_hostname(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        if candidate.eq_ignore_ascii_case(base) {
            return true;
        }
        // Subdomain: candidate ends with ".base"
        let suffix_len = base.len() + 1;
        candidate.len() > suffix_len
            && candidate
                .get(candidate.len() - suffix_len..)
                .is_some_and(|suffix| {
                    suffix.starts_with('.') && suffix[1..].eq_ignore_ascii_case(base)
                })
    } else {
        candidate.eq_ignore_ascii_case(pattern)
    }
}

/// Returns true if the host matches any of the accepted hostnames
pub fn is_accepted_host(host: &str, hostnames: &[String]) -> bool {
    hostnames
        .iter()
        .any(|pattern| matches_hostname(pattern, host))
}

/// Returns true if the URL authority (host plus optional port) is accepted
///
/// A URL with an explicit port names a different server than the bare host,
/// so it only matches a pattern that pins the same port: `127.0.0.1:8080`
/// accepts `http://127.0.0.1:8080/x`, while a bare `example.org` does not
/// accept `http://example.org:8080/x`.
pub fn is_accepted_authority(host: &str, port: Option<&str>, hostnames: &[String]) -> bool {
    match port {
        Some(port) => is_accepted_host(&format!("{}:{}", host, port), hostnames),
        None => is_accepted_host(host, hostnames),
    }
}
