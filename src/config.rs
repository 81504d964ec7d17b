//! Configuration passed into the parsers and the matcher at construction time.
//!
//! Every section has defaults matching the association's bank (Polish column
//! headers, MT940 tag prefixes, member-number patterns), and any of them can be
//! overridden from TOML:
//!
//! ```toml
//! [confidence]
//! auto_match_threshold = 0.9
//!
//! [parsing.csv.columns]
//! amount = ["Kwota", "Amount"]
//! ```

use std::path::Path;

use regex::{Regex, RegexBuilder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::matching::ConfidencePolicy;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    pub parsing: ParsingConfig,
    pub matching: MatchingConfig,
    pub confidence: ConfidencePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Encoding labels tried in order; the first clean decode wins.
    pub encodings: Vec<String>,
    /// File name suffixes (without the dot) treated as MT940.
    pub structured_suffixes: Vec<String>,
    /// File name suffixes treated as delimited text.
    pub delimited_suffixes: Vec<String>,
    pub csv: CsvConfig,
    pub normalizer: NormalizerConfig,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            encodings: strings(&["utf-8", "windows-1250", "iso-8859-2"]),
            structured_suffixes: strings(&["sta", "mt940"]),
            delimited_suffixes: strings(&["csv"]),
            csv: CsvConfig::default(),
            normalizer: NormalizerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    pub delimiters: Vec<char>,
    pub columns: ColumnAliases,
    /// chrono format strings, tried in order
    pub date_formats: Vec<String>,
    /// Currency markers stripped from amounts before parsing (case-insensitive)
    pub currency_tokens: Vec<String>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiters: vec![';', ',', '\t'],
            columns: ColumnAliases::default(),
            date_formats: strings(&["%Y-%m-%d", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%Y", "%Y.%m.%d"]),
            currency_tokens: strings(&["PLN", "zł"]),
        }
    }
}

/// Known header spellings per logical column, in order of preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnAliases {
    pub date: Vec<String>,
    pub amount: Vec<String>,
    pub description: Vec<String>,
    pub counterparty: Vec<String>,
    pub reference: Vec<String>,
}

impl ColumnAliases {
    pub fn is_known(&self, header: &str) -> bool {
        [
            &self.date,
            &self.amount,
            &self.description,
            &self.counterparty,
            &self.reference,
        ]
        .into_iter()
        .flatten()
        .any(|alias| alias == header)
    }
}

impl Default for ColumnAliases {
    fn default() -> Self {
        Self {
            date: strings(&["Data operacji", "Data księgowania", "Data", "Data waluty"]),
            amount: strings(&["Kwota", "Kwota operacji", "Wartość"]),
            description: strings(&["Opis operacji", "Tytuł", "Szczegóły", "Opis"]),
            counterparty: strings(&["Nadawca/Odbiorca", "Kontrahent", "Nazwa kontrahenta"]),
            reference: strings(&["Numer referencyjny", "Referencja", "Nr referencyjny"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// In-line MT940 tags removed from descriptions
    pub tag_prefixes: Vec<String>,
    /// Patterns with one capture group holding the counterparty name, tried in order
    pub counterparty_patterns: Vec<String>,
    pub field_separator: char,
    /// A fallback segment must be strictly longer than this to count as a name
    pub min_segment_len: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            tag_prefixes: strings(&["/ROC/", "/RFB/", "/ID/", "/BNF/", "/ORD/"]),
            counterparty_patterns: strings(&[
                r"/ORD/(.+?)(?:/|$)",
                r"/BNF/(.+?)(?:/|$)",
                r"OD:\s*(.+?)(?:\s|$)",
                r"NA RZECZ:\s*(.+?)(?:\s|$)",
            ]),
            field_separator: '/',
            min_segment_len: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Patterns whose first capture group is a membership number, tried in order
    pub member_number_patterns: Vec<String>,
    /// Last names shorter than this (in characters) are never searched for
    pub min_last_name_len: usize,
    /// Two amounts match when their difference is strictly below this
    pub amount_tolerance: Decimal,
    pub fee_keywords: Vec<String>,
    pub donation_keywords: Vec<String>,
    pub max_suggestions: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            member_number_patterns: strings(&[
                r"(?:nr|numer|czlonek|czł|m)[:\s]*(\d+)",
                r"(?:członek|członka)[:\s]*(\d+)",
                r"(\d+)/20\d{2}",
                r"STW[:\s]*(\d+)",
            ]),
            min_last_name_len: 3,
            amount_tolerance: Decimal::new(1, 2),
            fee_keywords: strings(&[
                "składka",
                "skladka",
                "czlonkowska",
                "członkowska",
                "roczna",
                "wpisowe",
                "opłata",
                "oplata",
                "stw",
                "bałtyk",
                "baltyk",
                "członek",
                "czlonek",
            ]),
            donation_keywords: strings(&["darowizna", "dar", "wsparcie", "dotacja", "sponsor"]),
            max_suggestions: 5,
        }
    }
}

impl ReconciliationConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ReconciliationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsing = &self.parsing;
        if parsing.encodings.is_empty() {
            return Err(ConfigError::Invalid("at least one encoding is required".into()));
        }
        if let Some(label) = parsing
            .encodings
            .iter()
            .find(|label| encoding_rs::Encoding::for_label(label.as_bytes()).is_none())
        {
            return Err(ConfigError::Invalid(format!("unknown encoding label {label:?}")));
        }
        if parsing.csv.delimiters.is_empty() {
            return Err(ConfigError::Invalid("at least one delimiter is required".into()));
        }
        if parsing.csv.date_formats.is_empty() {
            return Err(ConfigError::Invalid("at least one date format is required".into()));
        }

        compile_patterns(&parsing.normalizer.counterparty_patterns)?;
        compile_patterns(&self.matching.member_number_patterns)?;

        if self.matching.amount_tolerance.is_sign_negative() {
            return Err(ConfigError::Invalid("amount_tolerance must not be negative".into()));
        }

        self.confidence.validate()
    }
}

/// Compiles configured patterns case-insensitively, naming the first bad one.
pub(crate) fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
        })
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
