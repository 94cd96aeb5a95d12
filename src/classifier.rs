use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Pretrained naive-Bayes model. Produced by an external training process,
/// loaded once, and never mutated during scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierModel {
    pub spam: CategoryStats,
    pub ham: CategoryStats,
    pub vocabulary_size: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryStats {
    pub documents: u64,
    pub tokens: HashMap<String, u64>,
    pub token_total: u64,
}

impl CategoryStats {
    fn from_documents(documents: &[&str]) -> Self {
        let mut stats = CategoryStats {
            documents: documents.len() as u64,
            ..Default::default()
        };
        for document in documents {
            for token in tokenize(document) {
                *stats.tokens.entry(token).or_insert(0) += 1;
                stats.token_total += 1;
            }
        }
        stats
    }
}

impl ClassifierModel {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    /// Compact built-in model for deployments without a trained one.
    pub fn seed() -> Self {
        let spam = CategoryStats::from_documents(SPAM_SEED);
        let ham = CategoryStats::from_documents(HAM_SEED);
        let vocabulary: HashSet<&str> = spam
            .tokens
            .keys()
            .chain(ham.tokens.keys())
            .map(String::as_str)
            .collect();
        let vocabulary_size = vocabulary.len() as u64;
        Self {
            spam,
            ham,
            vocabulary_size,
        }
    }
}

const SPAM_SEED: &[&str] = &[
    "congratulations you are a winner claim your prize now",
    "free money risk free no obligation act now",
    "limited time offer click here to claim",
    "you have won the lottery send your bank details",
    "cheap viagra cialis enlargement pills online casino",
    "urgent action required verify your account immediately",
    "make money fast work from home guaranteed income",
    "exclusive deal order now satisfaction guaranteed",
    "unclaimed inheritance million dollars wire transfer",
    "hot singles in your area click to meet",
    "final notice your account will be suspended act now",
    "bitcoin investment doubles guaranteed returns",
];

const HAM_SEED: &[&str] = &[
    "the meeting is scheduled for tomorrow at ten",
    "please review the attached quarterly report",
    "following up on our project discussion from monday",
    "the deadline for the invoice is next week",
    "thanks for the update see you at the team review",
    "minutes from the board meeting are attached",
    "can you send the agenda before the call",
    "the build passed and the release is ready",
    "let me know if the schedule works for you",
    "best regards and thanks for the feedback",
    "lunch on thursday works for the whole team",
    "the contract draft needs one more review pass",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Ham,
    Spam,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Ham => write!(f, "ham"),
            Category::Spam => write!(f, "spam"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub category: Category,
    /// Confidence of the winning category, in [0.5, 1.0].
    pub score: f64,
}

/// Case-folded, punctuation-stripped word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.len() >= 2 && token.len() <= 40)
        .map(str::to_string)
        .collect()
}

/// Score tokens against the model. Pure and deterministic: identical
/// (model, tokens) always yields the identical classification.
pub fn classify(model: &ClassifierModel, tokens: &[String]) -> Classification {
    let spam_docs = model.spam.documents.max(1) as f64;
    let ham_docs = model.ham.documents.max(1) as f64;
    let total_docs = spam_docs + ham_docs;
    let vocabulary = model.vocabulary_size.max(1) as f64;

    let mut log_spam = (spam_docs / total_docs).ln();
    let mut log_ham = (ham_docs / total_docs).ln();
    let spam_denominator = model.spam.token_total as f64 + vocabulary;
    let ham_denominator = model.ham.token_total as f64 + vocabulary;

    for token in tokens {
        let spam_count = model.spam.tokens.get(token).copied().unwrap_or(0) as f64;
        let ham_count = model.ham.tokens.get(token).copied().unwrap_or(0) as f64;
        log_spam += ((spam_count + 1.0) / spam_denominator).ln();
        log_ham += ((ham_count + 1.0) / ham_denominator).ln();
    }

    // Shift by the max before exponentiating to stay in floating range.
    let max_log = log_spam.max(log_ham);
    let spam_weight = (log_spam - max_log).exp();
    let ham_weight = (log_ham - max_log).exp();
    let spam_probability = spam_weight / (spam_weight + ham_weight);

    if spam_probability > 0.5 {
        Classification {
            category: Category::Spam,
            score: spam_probability,
        }
    } else {
        Classification {
            category: Category::Ham,
            score: 1.0 - spam_probability,
        }
    }
}
