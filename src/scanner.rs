use crate::classifier::{self, Category, Classification, ClassifierModel};
use crate::config::ScannerConfig;
use crate::detection::arbitrary::ArbitraryDetector;
use crate::detection::executable::ExecutableDetector;
use crate::detection::phishing::PhishingDetector;
use crate::error::{FeedUnavailableError, ScanError};
use crate::feed::{self, FeedSnapshot};
use crate::links;
use crate::message::{Attachment, ContentInput, Message};
use serde::Serialize;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Aggregated verdict for one scanned message.
#[derive(Debug, Serialize)]
pub struct ScanResult {
    pub is_spam: bool,
    pub classification: Classification,
    pub phishing: Vec<String>,
    pub executables: Vec<String>,
    pub viruses: Vec<String>,
    pub arbitrary: Vec<String>,
    /// Non-fatal per-attachment problems (undecodable payloads skipped).
    pub warnings: Vec<String>,
}

/// Output of the standalone phishing entry point.
#[derive(Debug)]
pub struct PhishingResults {
    pub messages: Vec<String>,
    pub links: Vec<String>,
}

/// Feed snapshot and classifier model for one load generation. Every
/// detector in a single scan call reads the same instance.
struct LoadedState {
    feeds: FeedSnapshot,
    model: ClassifierModel,
}

/// Multi-detector scan orchestrator. `load()` performs all I/O up front;
/// `scan()` and the standalone entry points are pure computations over the
/// current snapshot and may run concurrently.
pub struct Scanner {
    config: ScannerConfig,
    phishing: PhishingDetector,
    executable: ExecutableDetector,
    arbitrary: ArbitraryDetector,
    state: RwLock<Option<Arc<LoadedState>>>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(ScannerConfig::default())
    }
}

impl Scanner {
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            phishing: PhishingDetector::new(&config),
            executable: ExecutableDetector::new(&config),
            arbitrary: ArbitraryDetector::new(&config.arbitrary_rules),
            state: RwLock::new(None),
            config,
        }
    }

    /// Fetch all configured feed providers and load the classifier model.
    /// Idempotent: repeat calls rebuild the snapshot and swap it atomically,
    /// so scans in flight keep a consistent view. Per-provider failures are
    /// returned as warnings, not errors.
    pub async fn load(&self) -> Result<Vec<FeedUnavailableError>, ScanError> {
        let timeout = Duration::from_secs(self.config.provider_timeout_seconds);
        let (feeds, warnings) =
            feed::load_providers(&self.config.providers, timeout).await;

        let model = match &self.config.model_path {
            Some(path) => ClassifierModel::from_file(path)
                .map_err(|e| ScanError::Model(e.to_string()))?,
            None => ClassifierModel::seed(),
        };

        log::info!(
            "Scanner loaded: {} feed entries, {} providers unavailable",
            feeds.len(),
            warnings.len()
        );

        let state = Arc::new(LoadedState { feeds, model });
        let mut guard = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(state);

        Ok(warnings)
    }

    pub fn is_loaded(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    /// Read-only view of loaded feed entries as (key, provider) pairs, for
    /// diagnostics and tests.
    pub fn feed_entries(&self) -> Vec<(String, String)> {
        match self.snapshot() {
            Ok(state) => state
                .feeds
                .entries()
                .map(|(key, tag)| (key.to_string(), tag.provider.clone()))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    fn snapshot(&self) -> Result<Arc<LoadedState>, ScanError> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .ok_or(ScanError::NotLoaded)
    }

    /// Run every detector over the message against one immutable snapshot
    /// and aggregate the verdict.
    pub fn scan(&self, message: &Message) -> Result<ScanResult, ScanError> {
        let state = self.snapshot()?;
        if message.is_empty() {
            return Err(ScanError::Parse(
                "message has no headers, bodies, or attachments".to_string(),
            ));
        }

        let content = ContentInput::from_message(message);
        let sender_domain = message.sender_domain();

        let phishing_findings =
            self.phishing
                .analyze(&content, &state.feeds, sender_domain.as_deref());
        let attachment_findings = self.executable.analyze(&message.attachments);
        let arbitrary = self.arbitrary.analyze(&content);

        let mut classifier_text = String::new();
        if let Some(subject) = &message.subject {
            classifier_text.push_str(subject);
            classifier_text.push(' ');
        }
        if let Some(text) = &message.text {
            classifier_text.push_str(text);
        } else if let Some(html) = &message.html {
            classifier_text.push_str(html);
        }
        let tokens = classifier::tokenize(&classifier_text);
        let classification = classifier::classify(&state.model, &tokens);

        let phishing = if phishing_findings.hits > 0 {
            let mut messages = phishing_findings.messages;
            messages.push(self.whitelist_notice());
            messages
        } else {
            Vec::new()
        };

        let is_spam = classification.category == Category::Spam
            || !phishing.is_empty()
            || !attachment_findings.executables.is_empty()
            || !attachment_findings.viruses.is_empty()
            || !arbitrary.is_empty();

        Ok(ScanResult {
            is_spam,
            classification,
            phishing,
            executables: attachment_findings.executables,
            viruses: attachment_findings.viruses,
            arbitrary,
            warnings: attachment_findings.warnings,
        })
    }

    /// Standalone phishing detection over partial content. The whitelist
    /// notice is always appended, hits or not.
    pub fn phishing_results(
        &self,
        input: &ContentInput,
    ) -> Result<PhishingResults, ScanError> {
        let state = self.snapshot()?;
        let findings = self.phishing.analyze(input, &state.feeds, None);
        let mut messages = findings.messages;
        messages.push(self.whitelist_notice());
        Ok(PhishingResults {
            messages,
            links: findings.links,
        })
    }

    /// Standalone malware matching over attachments; one message per
    /// infected attachment. Signature tables are static, so no loaded
    /// state is required.
    pub fn virus_results(&self, attachments: &[Attachment]) -> Vec<String> {
        self.executable.analyze(attachments).viruses
    }

    /// Standalone literal-rule matching over partial content.
    pub fn arbitrary_results(&self, input: &ContentInput) -> Vec<String> {
        self.arbitrary.analyze(input)
    }

    /// Canonical comparison key for a URL; `None` when it cannot be
    /// interpreted as http(s).
    pub fn normalized_url(&self, url: &str) -> Option<String> {
        links::normalize_url(url)
    }

    fn whitelist_notice(&self) -> String {
        format!(
            "Phishing whitelist requests can be filed at {}.",
            self.config.issues
        )
    }
}
