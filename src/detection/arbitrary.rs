use crate::config::ArbitraryRule;
use crate::message::ContentInput;

/// GTUBE, the standard self-test marker for spam filtering. Carried as a
/// built-in rule so operators (and upstream providers probing the server)
/// can verify the scanner end to end.
/// <https://spamassassin.apache.org/gtube/>
pub const GTUBE_PATTERN: &str =
    "XJS*C4JDBQADN1.NSBN3*2IDNEN*GTUBE-STANDARD-ANTI-UBE-TEST-EMAIL*C.34X";

const GTUBE_MESSAGE: &str =
    "Message detected to contain the GTUBE test from <https://spamassassin.apache.org/gtube/>";

/// Case-sensitive literal substring rules over the combined text/html
/// content, independent of every other detector.
pub struct ArbitraryDetector {
    rules: Vec<ArbitraryRule>,
}

impl ArbitraryDetector {
    pub fn new(operator_rules: &[ArbitraryRule]) -> Self {
        let mut rules = vec![ArbitraryRule {
            pattern: GTUBE_PATTERN.to_string(),
            message: GTUBE_MESSAGE.to_string(),
        }];
        rules.extend_from_slice(operator_rules);
        Self { rules }
    }

    /// One message per matching rule, even when the pattern occurs in both
    /// the text and html parts.
    pub fn analyze(&self, input: &ContentInput) -> Vec<String> {
        self.rules
            .iter()
            .filter(|rule| {
                input
                    .text
                    .map(|text| text.contains(&rule.pattern))
                    .unwrap_or(false)
                    || input
                        .html
                        .map(|html| html.contains(&rule.pattern))
                        .unwrap_or(false)
            })
            .map(|rule| rule.message.clone())
            .collect()
    }
}
