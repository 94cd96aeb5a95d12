use crate::config::{FeedCategory, FeedSource, ProviderConfig};
use crate::error::FeedUnavailableError;
use crate::links;
use std::collections::HashMap;
use std::time::Duration;

/// One provider's claim about a normalized key.
#[derive(Debug, Clone)]
pub struct ProviderTag {
    pub provider: String,
    pub category: FeedCategory,
    pub phrase: String,
}

/// Immutable view of every loaded block-list entry. Built once per
/// `load()`, swapped atomically, and only read afterwards.
#[derive(Debug, Default)]
pub struct FeedSnapshot {
    /// Full normalized URL -> contributing providers.
    urls: HashMap<String, Vec<ProviderTag>>,
    /// Bare host -> contributing providers; matches any URL on that host.
    domains: HashMap<String, Vec<ProviderTag>>,
}

impl FeedSnapshot {
    pub fn insert_entry(&mut self, raw: &str, tag: &ProviderTag) {
        let entry = raw.trim();
        if entry.is_empty() || entry.starts_with('#') {
            return;
        }
        // CSV dumps (e.g. PhishTank) carry the URL in one of the leading
        // fields; header rows have no URL field and fall out here.
        let entry = if entry.contains(',') {
            match entry.split(',').find(|field| field.contains("://")) {
                Some(field) => field.trim(),
                None => return,
            }
        } else {
            entry
        };
        let Some(normalized) = links::normalize_url(entry) else {
            log::debug!(
                "Skipping unparseable feed entry from {}: {}",
                tag.provider,
                entry
            );
            return;
        };
        // Entries with no path component are domain patterns.
        let bare_domain = !entry.contains('/');
        if bare_domain {
            if let Some(host) = links::host_of(&normalized) {
                push_tag(self.domains.entry(host.to_string()).or_default(), tag);
                return;
            }
        }
        push_tag(self.urls.entry(normalized).or_default(), tag);
    }

    /// Providers flagging this normalized link, by exact URL or by host.
    /// At most one hit per provider is reported for a given link.
    pub fn query_blocklist(&self, normalized: &str) -> Vec<&ProviderTag> {
        let mut hits: Vec<&ProviderTag> = Vec::new();
        if let Some(tags) = self.urls.get(normalized) {
            hits.extend(tags.iter());
        }
        if let Some(host) = links::host_of(normalized) {
            if let Some(tags) = self.domains.get(host) {
                for tag in tags {
                    if !hits.iter().any(|t| t.provider == tag.provider) {
                        hits.push(tag);
                    }
                }
            }
        }
        hits
    }

    pub fn len(&self) -> usize {
        self.urls.len() + self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty() && self.domains.is_empty()
    }

    /// Read-only view of loaded entries for diagnostics and tests.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &ProviderTag)> {
        self.urls
            .iter()
            .chain(self.domains.iter())
            .flat_map(|(key, tags)| tags.iter().map(move |tag| (key.as_str(), tag)))
    }
}

fn push_tag(tags: &mut Vec<ProviderTag>, tag: &ProviderTag) {
    if !tags.iter().any(|t| t.provider == tag.provider) {
        tags.push(tag.clone());
    }
}

/// Fetch every configured provider concurrently and assemble a snapshot.
/// A provider that times out, fails, or will not parse contributes nothing
/// and is reported in the returned warning list.
pub async fn load_providers(
    providers: &[ProviderConfig],
    timeout: Duration,
) -> (FeedSnapshot, Vec<FeedUnavailableError>) {
    let mut tasks = Vec::with_capacity(providers.len());
    for provider in providers {
        let provider = provider.clone();
        tasks.push(tokio::spawn(fetch_provider(provider, timeout)));
    }

    let mut snapshot = FeedSnapshot::default();
    let mut warnings = Vec::new();
    // Join in configuration order so entry precedence is deterministic
    // regardless of fetch completion order.
    for (provider, task) in providers.iter().zip(tasks) {
        let body = match task.await {
            Ok(Ok(body)) => body,
            Ok(Err(warning)) => {
                log::warn!("{}", warning);
                warnings.push(warning);
                continue;
            }
            Err(join_error) => {
                let warning =
                    FeedUnavailableError::new(&provider.name, join_error.to_string());
                log::warn!("{}", warning);
                warnings.push(warning);
                continue;
            }
        };
        let tag = ProviderTag {
            provider: provider.name.clone(),
            category: provider.category,
            phrase: provider.phrase.clone(),
        };
        let before = snapshot.len();
        for line in body.lines() {
            snapshot.insert_entry(line, &tag);
        }
        log::info!(
            "Loaded {} entries from provider {}",
            snapshot.len() - before,
            provider.name
        );
    }

    (snapshot, warnings)
}

async fn fetch_provider(
    provider: ProviderConfig,
    timeout: Duration,
) -> Result<String, FeedUnavailableError> {
    match &provider.source {
        FeedSource::File(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FeedUnavailableError::new(&provider.name, e.to_string())),
        FeedSource::Url(url) => {
            let fetch = async {
                let response = reqwest::get(url).await?.error_for_status()?;
                response.text().await
            };
            match tokio::time::timeout(timeout, fetch).await {
                Ok(Ok(body)) => Ok(body),
                Ok(Err(e)) => Err(FeedUnavailableError::new(&provider.name, e.to_string())),
                Err(_) => Err(FeedUnavailableError::new(
                    &provider.name,
                    format!("timed out after {:?}", timeout),
                )),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(provider: &str, category: FeedCategory, phrase: &str) -> ProviderTag {
        ProviderTag {
            provider: provider.to_string(),
            category,
            phrase: phrase.to_string(),
        }
    }

    #[test]
    fn test_url_entries_match_exactly() {
        let mut snapshot = FeedSnapshot::default();
        let phishtank = tag("PhishTank", FeedCategory::Phishing, "be phishing-related");
        snapshot.insert_entry("http://bad.example.com/login", &phishtank);

        let hits = snapshot.query_blocklist("http://bad.example.com/login");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].provider, "PhishTank");
        assert!(snapshot
            .query_blocklist("http://bad.example.com/other")
            .is_empty());
    }

    #[test]
    fn test_domain_entries_match_any_path() {
        let mut snapshot = FeedSnapshot::default();
        let cloudflare = tag(
            "Cloudflare",
            FeedCategory::Mixed,
            "contain malware, phishing, and/or adult content",
        );
        snapshot.insert_entry("xvideos.com", &cloudflare);

        assert_eq!(snapshot.query_blocklist("http://xvideos.com").len(), 1);
        assert_eq!(
            snapshot
                .query_blocklist("http://xvideos.com/some/page")
                .len(),
            1
        );
        assert!(snapshot.query_blocklist("http://example.com").is_empty());
    }

    #[test]
    fn test_one_hit_per_provider_and_multi_provider_keys() {
        let mut snapshot = FeedSnapshot::default();
        let a = tag("A", FeedCategory::Phishing, "be phishing-related");
        let b = tag("B", FeedCategory::Malware, "host malware");
        snapshot.insert_entry("http://bad.example.com/x", &a);
        snapshot.insert_entry("bad.example.com", &a);
        snapshot.insert_entry("bad.example.com", &b);

        let hits = snapshot.query_blocklist("http://bad.example.com/x");
        let mut providers: Vec<&str> = hits.iter().map(|t| t.provider.as_str()).collect();
        providers.sort();
        assert_eq!(providers, vec!["A", "B"]);
    }

    #[test]
    fn test_csv_rows_contribute_their_url_field() {
        let mut snapshot = FeedSnapshot::default();
        let phishtank = tag("PhishTank", FeedCategory::Phishing, "be phishing-related");
        snapshot.insert_entry("phish_id,url,phish_detail_url", &phishtank);
        snapshot.insert_entry(
            "8384061,http://bad.example.com/login,http://www.phishtank.com/phish_detail.php?phish_id=8384061",
            &phishtank,
        );

        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.query_blocklist("http://bad.example.com/login").len(),
            1
        );
    }

    #[test]
    fn test_comments_and_junk_lines_skipped() {
        let mut snapshot = FeedSnapshot::default();
        let a = tag("A", FeedCategory::Phishing, "be phishing-related");
        snapshot.insert_entry("# comment", &a);
        snapshot.insert_entry("", &a);
        snapshot.insert_entry("not a url at all %%%", &a);
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_load_from_file_and_missing_provider() {
        let dir = std::env::temp_dir();
        let feed_path = dir.join(format!("mailsweep-feed-{}.txt", std::process::id()));
        std::fs::write(&feed_path, "# test feed\nbad.example.com\nhttp://evil.example.org/login\n")
            .unwrap();

        let providers = vec![
            ProviderConfig {
                name: "Local".to_string(),
                source: FeedSource::File(feed_path.clone()),
                category: FeedCategory::Phishing,
                phrase: "be phishing-related".to_string(),
            },
            ProviderConfig {
                name: "Gone".to_string(),
                source: FeedSource::File(dir.join("mailsweep-no-such-feed.txt")),
                category: FeedCategory::Malware,
                phrase: "host malware".to_string(),
            },
        ];

        let (snapshot, warnings) =
            load_providers(&providers, Duration::from_secs(5)).await;
        std::fs::remove_file(&feed_path).ok();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].provider, "Gone");
        assert_eq!(
            snapshot
                .query_blocklist("http://evil.example.org/login")
                .len(),
            1
        );
    }
}
