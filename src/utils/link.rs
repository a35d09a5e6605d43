//! Link classification and formatting.
//!
//! Turns loosely typed user input (bare hosts, phone numbers with spaces,
//! e-mail addresses) into hrefs and `<a>` markup.

use percent_encoding::percent_decode_str;

use super::html::{AttrValue, attributes, escape_text};
use super::text::obfuscate;

/// Syntactic classification of links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind<'a> {
    /// External link with URL scheme (https://, mailto:, tel:, etc.)
    External(&'a str),
    /// Pure fragment/anchor link (#section). Value is anchor without `#`.
    Fragment(&'a str),
    /// Site-root-relative path (/about, /posts/hello).
    SiteRoot(&'a str),
    /// File-relative path (./image.png, ../other).
    FileRelative(&'a str),
}

impl<'a> LinkKind<'a> {
    /// Parse a link string into its syntactic kind.
    #[inline]
    pub fn parse(link: &'a str) -> Self {
        if is_external_link(link) {
            Self::External(link)
        } else if let Some(anchor) = link.strip_prefix('#') {
            Self::Fragment(anchor)
        } else if let Some(anchor) = link.strip_prefix("./#") {
            // ./#fragment is semantically equivalent to #fragment
            Self::Fragment(anchor)
        } else if link.starts_with('/') {
            Self::SiteRoot(link)
        } else {
            Self::FileRelative(link)
        }
    }

    /// Check if link is HTTP/HTTPS.
    #[inline]
    pub fn is_http(link: &str) -> bool {
        link.starts_with("http://") || link.starts_with("https://")
    }
}

/// Whether `link` starts with a URL scheme (`https:`, `mailto:`, ...).
#[inline]
pub fn is_external_link(link: &str) -> bool {
    link.find(':').is_some_and(|pos| {
        pos > 0
            && link[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
            // `example.com:8080` is a host with a port, not a scheme
            && !link[pos + 1..].starts_with(|c: char| c.is_ascii_digit())
    })
}

// =============================================================================
// URLs
// =============================================================================

/// Normalize a user-entered web address into an absolute URL.
///
/// - `example.com/page` -> `https://example.com/page`
/// - `//cdn.example.com/x` -> `https://cdn.example.com/x`
/// - anything with a scheme, fragment or path prefix is returned trimmed
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if let Some(rest) = trimmed.strip_prefix("//") {
        return format!("https://{rest}");
    }
    match LinkKind::parse(trimmed) {
        LinkKind::FileRelative(path) if looks_like_host(path) => format!("https://{path}"),
        _ => trimmed.to_string(),
    }
}

/// Heuristic: does a scheme-less string start with a domain name?
fn looks_like_host(s: &str) -> bool {
    if s.starts_with('.') || s.contains(char::is_whitespace) {
        return false;
    }
    let host = s.split(['/', '?', '#']).next().unwrap_or_default();
    let name = host.split(':').next().unwrap_or_default();
    let Some((_, tld)) = name.rsplit_once('.') else {
        return false;
    };
    tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.'))
        && url::Url::parse(&format!("https://{s}")).is_ok_and(|url| url.host_str().is_some())
}

/// Human-readable form of a URL for link text.
///
/// Strips the scheme, a leading `www.` and trailing slashes, and decodes
/// percent-encoding: `https://www.example.com/caf%C3%A9/` -> `example.com/café`.
pub fn display_url(input: &str) -> String {
    let trimmed = input.trim();
    let without_scheme = match trimmed.split_once("://") {
        Some((_, rest)) => rest,
        None => ["mailto:", "tel:"]
            .iter()
            .find_map(|scheme| trimmed.strip_prefix(scheme))
            .unwrap_or(trimmed),
    };
    let without_www = without_scheme
        .strip_prefix("www.")
        .unwrap_or(without_scheme);
    let stripped = without_www.trim_end_matches('/');
    percent_decode_str(stripped)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| stripped.to_string())
}

// =============================================================================
// Anchors
// =============================================================================

/// Render `<a href="...">text</a>` with extra attributes.
///
/// External http(s) links get `rel="noopener"` unless a `rel` is passed.
pub fn link<I, K, V>(href: &str, text: &str, attrs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<AttrValue>,
{
    let href = normalize_url(href);
    let extra: Vec<(String, AttrValue)> = attrs
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_string(), v.into()))
        .collect();

    let mut all: Vec<(String, AttrValue)> = vec![("href".to_string(), AttrValue::Text(href.clone()))];
    if LinkKind::is_http(&href) && !extra.iter().any(|(k, _)| k == "rel") {
        all.push(("rel".to_string(), AttrValue::from("noopener")));
    }
    all.extend(extra);

    format!("<a{}>{}</a>", attributes(all), escape_text(text))
}

/// Build a `tel:` href: digits only, a leading `+` is kept.
///
/// Returns `None` when the input holds no digits.
///
/// # Examples
///
/// - `tel_href("+1 (555) 010-9999")` -> `Some("tel:+15550109999")`
/// - `tel_href("call us")` -> `None`
pub fn tel_href(number: &str) -> Option<String> {
    let trimmed = number.trim();
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    let plus = if trimmed.starts_with('+') { "+" } else { "" };
    Some(format!("tel:{plus}{digits}"))
}

/// Render a telephone link. The visible text defaults to the number as typed.
pub fn format_tel(number: &str, text: Option<&str>) -> Option<String> {
    let href = tel_href(number)?;
    let text = text.unwrap_or_else(|| number.trim());
    Some(format!(
        "<a{}>{}</a>",
        attributes([("href", href)]),
        escape_text(text)
    ))
}

/// Render an obfuscated `mailto:` link.
///
/// Both the href and the visible text are entity-encoded character by
/// character; browsers decode them transparently.
pub fn mailto(address: &str, text: Option<&str>) -> String {
    let address = address.trim();
    let href = obfuscate(&format!("mailto:{address}"));
    let text = obfuscate(text.unwrap_or(address));
    format!("<a href=\"{href}\">{text}</a>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::html::unescape;

    #[test]
    fn test_parse_external() {
        assert!(matches!(
            LinkKind::parse("https://example.com"),
            LinkKind::External("https://example.com")
        ));
        assert!(matches!(
            LinkKind::parse("mailto:user@example.com"),
            LinkKind::External("mailto:user@example.com")
        ));
        assert!(matches!(
            LinkKind::parse("tel:+1234567890"),
            LinkKind::External("tel:+1234567890")
        ));
    }

    #[test]
    fn test_parse_fragment() {
        assert!(matches!(
            LinkKind::parse("#section"),
            LinkKind::Fragment("section")
        ));
        assert!(matches!(LinkKind::parse("#"), LinkKind::Fragment("")));
        assert!(matches!(
            LinkKind::parse("./#section"),
            LinkKind::Fragment("section")
        ));
    }

    #[test]
    fn test_parse_paths() {
        assert!(matches!(
            LinkKind::parse("/about#team"),
            LinkKind::SiteRoot("/about#team")
        ));
        assert!(matches!(
            LinkKind::parse("../other"),
            LinkKind::FileRelative("../other")
        ));
        // host with port is not a scheme
        assert!(matches!(
            LinkKind::parse("example.com:8080/x"),
            LinkKind::FileRelative("example.com:8080/x")
        ));
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(
            normalize_url("  www.example.com/page?q=1 "),
            "https://www.example.com/page?q=1"
        );
        assert_eq!(
            normalize_url("example.com:8080/x"),
            "https://example.com:8080/x"
        );
        assert_eq!(normalize_url("//cdn.example.com/a.js"), "https://cdn.example.com/a.js");
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url("mailto:a@b.com"), "mailto:a@b.com");
        assert_eq!(normalize_url("/about"), "/about");
        assert_eq!(normalize_url("#top"), "#top");
        assert_eq!(normalize_url("./logo.v2"), "./logo.v2");
        assert_eq!(normalize_url("not a url"), "not a url");
    }

    #[test]
    fn test_display_url() {
        assert_eq!(display_url("https://www.example.com/"), "example.com");
        assert_eq!(
            display_url("https://example.com/caf%C3%A9/"),
            "example.com/café"
        );
        assert_eq!(display_url("mailto:me@example.com"), "me@example.com");
        assert_eq!(display_url("example.com/a"), "example.com/a");
    }

    #[test]
    fn test_link() {
        assert_eq!(
            link("example.com", "Example & Co", Vec::<(&str, &str)>::new()),
            r#"<a href="https://example.com" rel="noopener">Example &amp; Co</a>"#
        );
        assert_eq!(
            link("/about", "About", [("class", "nav")]),
            r#"<a href="/about" class="nav">About</a>"#
        );
        assert_eq!(
            link("https://x.test", "X", [("rel", "me")]),
            r#"<a href="https://x.test" rel="me">X</a>"#
        );
    }

    #[test]
    fn test_tel_href() {
        assert_eq!(
            tel_href("+1 (555) 010-9999"),
            Some("tel:+15550109999".to_string())
        );
        assert_eq!(tel_href("030 1234 567"), Some("tel:0301234567".to_string()));
        assert_eq!(tel_href("call us"), None);
        assert_eq!(tel_href(""), None);
    }

    #[test]
    fn test_format_tel() {
        assert_eq!(
            format_tel(" +44 20 7946 0000 ", None).as_deref(),
            Some(r#"<a href="tel:+442079460000">+44 20 7946 0000</a>"#)
        );
        assert_eq!(
            format_tel("555-0100", Some("Call <us>")).as_deref(),
            Some(r#"<a href="tel:5550100">Call &lt;us&gt;</a>"#)
        );
        assert_eq!(format_tel("n/a", None), None);
    }

    #[test]
    fn test_mailto_decodes_back() {
        let html = mailto("someone@example.com", None);
        let decoded = unescape(&html);
        assert_eq!(
            decoded,
            r#"<a href="mailto:someone@example.com">someone@example.com</a>"#
        );
    }
}
