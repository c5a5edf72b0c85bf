/// Components of a raw URL string as seen in page markup
///
/// Every component is optional, so any string decomposes into parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UrlParts<'a> {
    /// Scheme without the trailing `:`
    pub protocol: Option<&'a str>,

    /// Host (may be empty for relative URLs)
    pub host: &'a str,

    /// Port digits without the leading `:`
    pub port: Option<&'a str>,

    /// Everything after the authority: path, query and fragment
    pub subpath: &'a str,
}

impl UrlParts<'_> {
    /// Returns true if the URL carries no host and is therefore relative to the page
    pub fn is_relative(&self) -> bool {
        self.host.is_empty()
    }
}

/// Decomposes a raw URL string into protocol, host, port and subpath
///
/// # Grammar
///
/// ```text
/// url      = [ scheme ":" ] [ "//" ] [ authority ] subpath
/// scheme   = 1*( ALPHA / DIGIT )
/// authority = host [ ":" port ]      ; longest run of characters other than "/"
/// port     = 1*DIGIT                 ; only when the authority ends in ":" DIGITS
/// subpath  = *CHAR                   ; the remainder, starting at the first "/"
/// ```
///
/// Parsing never fails. Strings that are not URLs in any useful sense still
/// decompose: `page.html` has host `page.html`, and `mailto:a@b.org` has
/// protocol `mailto` and host `a@b.org`. A scheme is only recognised when the
/// leading run of alphanumerics is directly followed by `:`, so
/// `localhost:8080/x` reads as protocol `localhost` with host `8080`.
///
/// # Examples
///
/// ```
/// use site_mirror::url::parse_url;
///
/// let parts = parse_url("https://example.org:8443/forum/?page_id=5");
/// assert_eq!(parts.protocol, Some("https"));
/// assert_eq!(parts.host, "example.org");
/// assert_eq!(parts.port, Some("8443"));
/// assert_eq!(parts.subpath, "/forum/?page_id=5");
///
/// let relative = parse_url("/x");
/// assert!(relative.is_relative());
/// assert_eq!(relative.subpath, "/x");
/// ```
pub fn parse_url(raw: &str) -> UrlParts<'_> {
    let (protocol, rest) = split_scheme(raw);
    let rest = rest.strip_prefix("//").unwrap_or(rest);

    let authority_end = rest.find('/').unwrap_or(rest.len());
    let (authority, subpath) = rest.split_at(authority_end);
    let (host, port) = split_port(authority);

    UrlParts {
        protocol,
        host,
        port,
        subpath,
    }
}

/// Splits a leading `scheme:` off the input
fn split_scheme(raw: &str) -> (Option<&str>, &str) {
    let scheme_len = raw
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric())
        .count();

    if scheme_len > 0 && raw.as_bytes().get(scheme_len) == Some(&b':') {
        (Some(&raw[..scheme_len]), &raw[scheme_len + 1..])
    } else {
        (None, raw)
    }
}

/// Splits a trailing `:digits` port off an authority
fn split_port(authority: &str) -> (&str, Option<&str>) {
    match authority.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            (host, Some(port))
        }
        _ => (authority, None),
    }
}
