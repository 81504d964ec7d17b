use crate::config::MatchingConfig;

/// Keyword hints about what an incoming payment is for.
#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier {
    fee_keywords: Vec<String>,
    donation_keywords: Vec<String>,
}

impl KeywordClassifier {
    pub fn new(config: &MatchingConfig) -> Self {
        let lowered = |words: &[String]| -> Vec<String> {
            words
                .iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        };

        Self {
            fee_keywords: lowered(&config.fee_keywords),
            donation_keywords: lowered(&config.donation_keywords),
        }
    }

    pub fn is_likely_fee_payment(&self, text: &str) -> bool {
        contains_any(text, &self.fee_keywords)
    }

    pub fn is_likely_donation(&self, text: &str) -> bool {
        contains_any(text, &self.donation_keywords)
    }
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    let text = text.to_lowercase();
    keywords.iter().any(|keyword| text.contains(keyword.as_str()))
}
