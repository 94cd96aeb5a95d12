/// Homograph detection: hosts whose confusable-character skeleton collapses
/// onto a high-value brand domain without being that brand's real domain.

struct Brand {
    name: &'static str,
    domains: &'static [&'static str],
}

const BRANDS: &[Brand] = &[
    Brand {
        name: "Apple",
        domains: &["apple.com", "icloud.com"],
    },
    Brand {
        name: "Google",
        domains: &["google.com", "gmail.com", "youtube.com"],
    },
    Brand {
        name: "Microsoft",
        domains: &["microsoft.com", "outlook.com", "office.com", "live.com"],
    },
    Brand {
        name: "Amazon",
        domains: &["amazon.com"],
    },
    Brand {
        name: "PayPal",
        domains: &["paypal.com"],
    },
    Brand {
        name: "Facebook",
        domains: &["facebook.com", "instagram.com"],
    },
    Brand {
        name: "Netflix",
        domains: &["netflix.com"],
    },
    Brand {
        name: "eBay",
        domains: &["ebay.com"],
    },
    Brand {
        name: "Chase",
        domains: &["chase.com"],
    },
    Brand {
        name: "Wells Fargo",
        domains: &["wellsfargo.com"],
    },
    Brand {
        name: "Dropbox",
        domains: &["dropbox.com"],
    },
    Brand {
        name: "Adobe",
        domains: &["adobe.com"],
    },
];

#[derive(Debug, Default)]
pub struct HomographDetector;

impl HomographDetector {
    pub fn new() -> Self {
        Self
    }

    /// Check a punycode-decoded host against the brand table. Returns the
    /// impersonated brand name, or `None` for genuine brand hosts and
    /// unrelated domains.
    pub fn check_host(&self, host: &str) -> Option<&'static str> {
        let host = host.trim_end_matches('.').to_lowercase();
        if host.is_empty() {
            return None;
        }
        let skeleton: String = host.chars().map(fold_confusable).collect();

        for brand in BRANDS {
            for domain in brand.domains {
                if matches_domain(&host, domain) {
                    // The brand's own domain or a subdomain of it.
                    return None;
                }
                if matches_domain(&skeleton, domain) {
                    return Some(brand.name);
                }
            }
        }
        None
    }
}

fn matches_domain(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{}", domain))
}

/// Collapse look-alike glyphs onto their Latin skeleton: Cyrillic and Greek
/// homoglyphs, digit substitutions, and a few Latin-extended letters.
fn fold_confusable(c: char) -> char {
    match c {
        // Cyrillic
        '\u{430}' => 'a', // а
        '\u{435}' => 'e', // е
        '\u{43e}' => 'o', // о
        '\u{440}' => 'p', // р
        '\u{441}' => 'c', // с
        '\u{445}' => 'x', // х
        '\u{443}' => 'y', // у
        '\u{456}' => 'i', // і
        '\u{455}' => 's', // ѕ
        '\u{501}' => 'd', // ԁ
        '\u{458}' => 'j', // ј
        '\u{4bb}' => 'h', // һ
        '\u{51b}' => 'q', // ԛ
        '\u{51d}' => 'w', // ԝ
        // Greek
        '\u{3b1}' => 'a', // α
        '\u{3bf}' => 'o', // ο
        '\u{3bd}' => 'v', // ν
        '\u{3c9}' => 'w', // ω
        '\u{3b9}' => 'i', // ι
        '\u{3ba}' => 'k', // κ
        '\u{3c1}' => 'p', // ρ
        '\u{3c5}' => 'u', // υ
        // Digit substitutions
        '0' => 'o',
        '1' => 'l',
        '3' => 'e',
        '5' => 's',
        // Latin extended
        '\u{261}' => 'g', // ɡ
        '\u{251}' => 'a', // ɑ
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyrillic_homograph_is_flagged() {
        let detector = HomographDetector::new();
        // Cyrillic а in place of Latin a.
        assert_eq!(detector.check_host("\u{430}pple.com"), Some("Apple"));
        assert_eq!(detector.check_host("pay\u{440}al.com"), Some("PayPal"));
    }

    #[test]
    fn test_digit_substitution_is_flagged() {
        let detector = HomographDetector::new();
        assert_eq!(detector.check_host("paypa1.com"), Some("PayPal"));
        assert_eq!(detector.check_host("g00gle.com"), Some("Google"));
    }

    #[test]
    fn test_genuine_brand_hosts_pass() {
        let detector = HomographDetector::new();
        assert_eq!(detector.check_host("apple.com"), None);
        assert_eq!(detector.check_host("www.apple.com"), None);
        assert_eq!(detector.check_host("mail.google.com"), None);
    }

    #[test]
    fn test_unrelated_hosts_pass() {
        let detector = HomographDetector::new();
        assert_eq!(detector.check_host("example.com"), None);
        assert_eq!(detector.check_host("apple.com.evil.example"), None);
        assert_eq!(detector.check_host(""), None);
    }
}
