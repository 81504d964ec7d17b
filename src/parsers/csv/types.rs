use crate::errors::StatementParseError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A date cell from a delimited export.
///
/// Polish bank exports mix layouts between products and years:
/// - YYYY-MM-DD
/// - DD-MM-YYYY
/// - DD.MM.YYYY
/// - DD/MM/YYYY
/// - YYYY.MM.DD
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvDate(String);

impl CsvDate {
    /// Tries each chrono format in order; the first that parses wins.
    pub fn parse_with(&self, formats: &[String]) -> Result<NaiveDate, StatementParseError> {
        let s = self.0.trim();

        formats
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
            .ok_or_else(|| StatementParseError::DateInvalidFormat(s.to_string()))
    }
}

impl From<String> for CsvDate {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CsvDate {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl TryFrom<CsvDate> for NaiveDate {
    type Error = StatementParseError;

    fn try_from(date: CsvDate) -> Result<Self, Self::Error> {
        date.parse_with(&crate::config::CsvConfig::default().date_formats)
    }
}

/// An amount cell, possibly localized: `1 234,56`, `-150,00 PLN`, `1.234,56 zł`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvAmount(String);

impl CsvAmount {
    /// Strips currency markers and grouping, then reads whichever of `,`/`.`
    /// comes last as the decimal mark.
    pub fn parse_with(&self, currency_tokens: &[String]) -> Result<Decimal, StatementParseError> {
        let invalid = || StatementParseError::AmountInvalidFormat(self.0.trim().to_string());

        let mut s = self.0.to_lowercase();
        for token in currency_tokens {
            s = s.replace(&token.to_lowercase(), "");
        }
        let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();

        let normalized = match (s.rfind(','), s.rfind('.')) {
            (Some(comma), Some(dot)) if comma > dot => s.replace('.', "").replace(',', "."),
            (Some(_), Some(_)) => s.replace(',', ""),
            (Some(_), None) => s.replace(',', "."),
            _ => s,
        };
        let normalized = normalized.strip_prefix('+').unwrap_or(&normalized);

        if normalized.is_empty() {
            return Err(invalid());
        }
        Decimal::from_str(normalized).map_err(|_| invalid())
    }
}

impl From<String> for CsvAmount {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CsvAmount {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl TryFrom<CsvAmount> for Decimal {
    type Error = StatementParseError;

    fn try_from(amount: CsvAmount) -> Result<Self, Self::Error> {
        amount.parse_with(&crate::config::CsvConfig::default().currency_tokens)
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
