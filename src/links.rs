use crate::message::ContentInput;
use regex::Regex;
use std::collections::HashSet;
use url::{Host, Url};

/// A unique link pulled out of message content.
#[derive(Debug, Clone)]
pub struct ExtractedLink {
    /// Literal string as it appeared in the content.
    pub original: String,
    /// Canonical comparison key, see [`normalize_url`].
    pub normalized: String,
    pub source: LinkSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSource {
    Html,
    Text,
}

pub struct LinkExtractor {
    href_regex: Regex,
    token_regex: Regex,
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkExtractor {
    pub fn new() -> Self {
        Self {
            href_regex: Regex::new(r#"(?i)href\s*=\s*["']([^"'<>]+)["']"#).unwrap(),
            token_regex: Regex::new(
                r#"(?i)\b(?:https?://[^\s<>"']+|[a-z0-9][a-z0-9-]*(?:\.[a-z0-9-]+)*\.[a-z]{2,}(?:/[^\s<>"']*)?)"#,
            )
            .unwrap(),
        }
    }

    /// Extract href references from html and URL-shaped tokens from plain
    /// text, deduplicated by normalized key in first-seen order. Strings
    /// that fail normalization are dropped per-link.
    pub fn extract(&self, input: &ContentInput) -> Vec<ExtractedLink> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        if let Some(html) = input.html {
            for cap in self.href_regex.captures_iter(html) {
                if let Some(url) = cap.get(1) {
                    push_unique(&mut links, &mut seen, url.as_str(), LinkSource::Html);
                }
            }
        }

        if let Some(text) = input.text {
            for m in self.token_regex.find_iter(text) {
                // Skip the domain part of email addresses.
                if text[..m.start()].ends_with('@') {
                    continue;
                }
                let token = m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?', ')']);
                push_unique(&mut links, &mut seen, token, LinkSource::Text);
            }
        }

        links
    }
}

fn push_unique(
    links: &mut Vec<ExtractedLink>,
    seen: &mut HashSet<String>,
    raw: &str,
    source: LinkSource,
) {
    let Some(normalized) = normalize_url(raw) else {
        log::debug!("Dropping link that failed normalization: {}", raw);
        return;
    };
    if seen.insert(normalized.clone()) {
        links.push(ExtractedLink {
            original: raw.to_string(),
            normalized,
            source,
        });
    }
}

/// Canonicalize a URL into its comparison key: lower-cased scheme and host,
/// default port stripped, trailing slashes stripped, percent-escapes in the
/// host decoded, punycode host labels decoded to their display form. Pure
/// and idempotent; returns `None` for strings that cannot be interpreted as
/// an http(s) URL.
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = match Url::parse(trimmed) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => url,
        Ok(url) => {
            // "example.com:8080/x" parses as scheme "example.com"; a
            // digit-leading remainder is really a port. Anything else
            // (mailto:, javascript:, data:) is not a link.
            let rest = &trimmed[url.scheme().len() + 1..];
            if rest.chars().next().map_or(false, |c| c.is_ascii_digit()) {
                Url::parse(&format!("http://{}", trimmed)).ok()?
            } else {
                return None;
            }
        }
        // Scheme-less tokens like "xvideos.com" are relative URLs.
        Err(_) => Url::parse(&format!("http://{}", trimmed)).ok()?,
    };

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }

    let host = match parsed.host()? {
        Host::Domain(domain) => {
            let (unicode, _) = idna::domain_to_unicode(domain);
            unicode
        }
        _ => parsed.host_str()?.to_string(),
    };

    let mut key = format!("{}://{}", parsed.scheme(), host);
    // Url::port() is None when the port matches the scheme default.
    if let Some(port) = parsed.port() {
        key.push(':');
        key.push_str(&port.to_string());
    }
    key.push_str(parsed.path().trim_end_matches('/'));
    if let Some(query) = parsed.query() {
        key.push('?');
        key.push_str(query);
    }
    Some(key)
}

/// Host portion of a normalized key.
pub fn host_of(normalized: &str) -> Option<&str> {
    let rest = normalized.split("://").nth(1)?;
    let end = rest.find(['/', '?']).unwrap_or(rest.len());
    let authority = &rest[..end];
    if authority.starts_with('[') {
        // IPv6 literal, keep the brackets.
        let close = authority.find(']')?;
        return Some(&authority[..=close]);
    }
    match authority.rsplit_once(':') {
        Some((host, port)) if port.bytes().all(|b| b.is_ascii_digit()) => Some(host),
        _ => Some(authority),
    }
}

/// Registered domain approximated as the last two labels, the comparison
/// unit for the same-organization rule.
pub fn registered_domain(host: &str) -> Option<String> {
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() >= 2 {
        Some(format!(
            "{}.{}",
            parts[parts.len() - 2],
            parts[parts.len() - 1]
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_strips_defaults() {
        assert_eq!(
            normalize_url("HTTP://Example.COM:80/Path/"),
            Some("http://example.com/Path".to_string())
        );
        assert_eq!(
            normalize_url("https://example.com:443/"),
            Some("https://example.com".to_string())
        );
        assert_eq!(
            normalize_url("https://example.com:8443/a"),
            Some("https://example.com:8443/a".to_string())
        );
    }

    #[test]
    fn test_normalize_adds_scheme_to_bare_domains() {
        assert_eq!(
            normalize_url("xvideos.com"),
            Some("http://xvideos.com".to_string())
        );
    }

    #[test]
    fn test_normalize_decodes_punycode_labels() {
        let key = normalize_url("http://xn--pple-43d.com/login").unwrap();
        assert_eq!(key, "http://\u{430}pple.com/login");
    }

    #[test]
    fn test_normalize_bare_host_with_port() {
        assert_eq!(
            normalize_url("example.com:8080/x"),
            Some("http://example.com:8080/x".to_string())
        );
    }

    #[test]
    fn test_normalize_rejects_non_http_schemes() {
        assert_eq!(normalize_url("mailto:ann@example.com"), None);
        assert_eq!(normalize_url("javascript:alert(1)"), None);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "HTTP://Example.COM:80/Path/",
            "xvideos.com",
            "http://xn--pple-43d.com/login",
            "https://example.com/a/b?q=1",
            "https://example.com:8443/a//",
        ];
        for sample in samples {
            let once = normalize_url(sample).unwrap();
            let twice = normalize_url(&once).unwrap();
            assert_eq!(once, twice, "normalization not idempotent for {}", sample);
        }
    }

    #[test]
    fn test_host_of_normalized_key() {
        assert_eq!(host_of("http://example.com/a"), Some("example.com"));
        assert_eq!(host_of("http://example.com:8080?q=1"), Some("example.com"));
        assert_eq!(host_of("http://\u{430}pple.com/login"), Some("\u{430}pple.com"));
    }

    #[test]
    fn test_registered_domain() {
        assert_eq!(
            registered_domain("mail.example.com"),
            Some("example.com".to_string())
        );
        assert_eq!(
            registered_domain("example.com"),
            Some("example.com".to_string())
        );
        assert_eq!(registered_domain("localhost"), None);
    }

    #[test]
    fn test_extract_dedupes_across_parts() {
        let extractor = LinkExtractor::new();
        let input = ContentInput {
            html: Some(r#"<a href="xvideos.com">test</a>"#),
            text: Some("xvideos.com"),
        };
        let links = extractor.extract(&input);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].original, "xvideos.com");
        assert_eq!(links[0].normalized, "http://xvideos.com");
        assert_eq!(links[0].source, LinkSource::Html);
    }

    #[test]
    fn test_extract_preserves_first_seen_order() {
        let extractor = LinkExtractor::new();
        let input = ContentInput {
            html: None,
            text: Some("see https://a.example.com/x then http://b.example.com."),
        };
        let links = extractor.extract(&input);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].normalized, "https://a.example.com/x");
        assert_eq!(links[1].normalized, "http://b.example.com");
    }

    #[test]
    fn test_extract_skips_email_addresses_and_bad_links() {
        let extractor = LinkExtractor::new();
        let input = ContentInput {
            html: Some(r#"<a href="mailto:ann@example.com">mail</a>"#),
            text: Some("write to ann@example.com today"),
        };
        assert!(extractor.extract(&input).is_empty());
    }
}
