use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level scanner configuration. Loaded from YAML or built from
/// `Default`, which carries a working provider set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Issue-tracker URL referenced in phishing whitelist-request messages.
    pub issues: String,
    pub providers: Vec<ProviderConfig>,
    pub provider_timeout_seconds: u64,
    /// Detected file types (see `signatures::FILE_SIGNATURES`) that count as
    /// risky executables regardless of the declared filename.
    pub risky_executable_types: Vec<String>,
    /// Upper bound on bytes inspected per attachment.
    pub max_attachment_scan_bytes: usize,
    /// Path to a trained classifier model (JSON). The built-in seed model is
    /// used when absent.
    pub model_path: Option<PathBuf>,
    /// Operator-defined literal rules, added to the built-in set.
    #[serde(default)]
    pub arbitrary_rules: Vec<ArbitraryRule>,
    /// Suppress phishing hits when the link's registered domain exactly
    /// equals the sender's claimed domain.
    pub same_org_suppression: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub source: FeedSource,
    pub category: FeedCategory,
    /// Verbatim phrase used in per-link messages for this provider.
    pub phrase: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    Url(String),
    File(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedCategory {
    Phishing,
    Malware,
    Adult,
    /// Providers that flag malware, phishing, and adult content in one list.
    Mixed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitraryRule {
    pub pattern: String,
    pub message: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            issues: "https://github.com/mailsweep/mailsweep/issues".to_string(),
            providers: vec![
                ProviderConfig {
                    name: "PhishTank".to_string(),
                    source: FeedSource::Url(
                        "http://data.phishtank.com/data/online-valid.csv".to_string(),
                    ),
                    category: FeedCategory::Phishing,
                    phrase: "be phishing-related".to_string(),
                },
                ProviderConfig {
                    name: "Cloudflare".to_string(),
                    source: FeedSource::Url(
                        "https://family.cloudflare-dns.com/blocklist".to_string(),
                    ),
                    category: FeedCategory::Mixed,
                    phrase: "contain malware, phishing, and/or adult content".to_string(),
                },
            ],
            provider_timeout_seconds: 30,
            risky_executable_types: vec![
                "exe".to_string(),
                "elf".to_string(),
                "macho".to_string(),
                "class".to_string(),
                "msi".to_string(),
                "script".to_string(),
            ],
            max_attachment_scan_bytes: 10 * 1024 * 1024,
            model_path: None,
            arbitrary_rules: Vec::new(),
            same_org_suppression: true,
        }
    }
}

impl ScannerConfig {
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: ScannerConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn write_default(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(&ScannerConfig::default())?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_provider_phrases() {
        let config = ScannerConfig::default();
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers[0].name, "PhishTank");
        assert_eq!(config.providers[0].phrase, "be phishing-related");
        assert_eq!(
            config.providers[1].phrase,
            "contain malware, phishing, and/or adult content"
        );
    }

    #[test]
    fn test_config_yaml_round_trip() {
        let config = ScannerConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: ScannerConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.issues, config.issues);
        assert_eq!(parsed.providers.len(), config.providers.len());
        assert_eq!(
            parsed.max_attachment_scan_bytes,
            config.max_attachment_scan_bytes
        );
    }

    #[test]
    fn test_arbitrary_rules_default_empty() {
        let yaml = r#"
issues: "https://example.com/issues"
providers: []
provider_timeout_seconds: 5
risky_executable_types: ["exe"]
max_attachment_scan_bytes: 1024
model_path: null
same_org_suppression: false
"#;
        let parsed: ScannerConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(parsed.arbitrary_rules.is_empty());
        assert!(!parsed.same_org_suppression);
    }
}
