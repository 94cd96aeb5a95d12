use crate::config::ScannerConfig;
use crate::detection::homograph::HomographDetector;
use crate::feed::FeedSnapshot;
use crate::links::{self, LinkExtractor};
use crate::message::ContentInput;

/// Per-link findings from feed lookups and homograph analysis. The
/// whitelist-request trailer is appended by the caller, not here, so the
/// orchestrator can keep `ScanResult.phishing` empty on clean messages.
#[derive(Debug, Default)]
pub struct PhishingFindings {
    pub messages: Vec<String>,
    /// Every unique normalized link considered, hit or not.
    pub links: Vec<String>,
    /// Number of per-link detections behind `messages`.
    pub hits: usize,
}

pub struct PhishingDetector {
    extractor: LinkExtractor,
    homograph: HomographDetector,
    same_org: Option<SameOrgRule>,
}

impl PhishingDetector {
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            extractor: LinkExtractor::new(),
            homograph: HomographDetector::new(),
            same_org: config.same_org_suppression.then(SameOrgRule::default),
        }
    }

    /// Extract and normalize links, then query the feed snapshot and the
    /// homograph table for each unique link. `sender_domain` enables the
    /// same-organization rule when present.
    pub fn analyze(
        &self,
        input: &ContentInput,
        feeds: &FeedSnapshot,
        sender_domain: Option<&str>,
    ) -> PhishingFindings {
        let mut findings = PhishingFindings::default();

        for link in self.extractor.extract(input) {
            let host = links::host_of(&link.normalized).unwrap_or("");

            let suppressed = match (&self.same_org, sender_domain) {
                (Some(rule), Some(sender)) => rule.suppresses(sender, host),
                _ => false,
            };

            if suppressed {
                log::debug!(
                    "Suppressing findings for same-organization link: {}",
                    link.original
                );
            } else {
                for tag in feeds.query_blocklist(&link.normalized) {
                    findings.messages.push(format!(
                        "Link of \"{}\" was detected by {} to {}.",
                        link.original, tag.provider, tag.phrase
                    ));
                    findings.hits += 1;
                }
                if let Some(brand) = self.homograph.check_host(host) {
                    findings.messages.push(format!(
                        "Link of \"{}\" was detected by homograph analysis to impersonate {}.",
                        link.original, brand
                    ));
                    findings.hits += 1;
                }
            }

            findings.links.push(link.normalized);
        }

        findings
    }
}

/// Same-organization suppression: a link whose registered domain exactly
/// equals the sender's claimed domain is not reported. Kept as its own unit
/// so the matching rule can evolve independently of the detector.
#[derive(Debug, Default)]
pub struct SameOrgRule;

impl SameOrgRule {
    pub fn suppresses(&self, sender_domain: &str, link_host: &str) -> bool {
        match (
            links::registered_domain(&sender_domain.to_lowercase()),
            links::registered_domain(&link_host.to_lowercase()),
        ) {
            (Some(sender), Some(link)) => sender == link,
            _ => false,
        }
    }
}
