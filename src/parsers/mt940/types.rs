use crate::errors::StatementParseError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A `YYMMDD` date from a `:61:` statement line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mt940Date(String);

impl From<String> for Mt940Date {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Mt940Date {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl TryFrom<Mt940Date> for NaiveDate {
    type Error = StatementParseError;

    fn try_from(date: Mt940Date) -> Result<Self, Self::Error> {
        let invalid = || StatementParseError::DateInvalidFormat(date.0.clone());
        let s = date.0.trim();

        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let yy: i32 = s[0..2].parse().map_err(|_| invalid())?;
        let month = s[2..4].parse().map_err(|_| invalid())?;
        let day = s[4..6].parse().map_err(|_| invalid())?;
        let year = if yy >= 80 { 1900 + yy } else { 2000 + yy };

        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
    }
}

/// Debit/credit mark of a statement line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebitCreditMark {
    #[serde(rename = "C")]
    Credit,
    #[serde(rename = "D")]
    Debit,
    #[serde(rename = "RC")]
    ReversalOfCredit,
    #[serde(rename = "RD")]
    ReversalOfDebit,
}

impl DebitCreditMark {
    /// Money in for credits and reversed debits, money out otherwise.
    pub fn apply(&self, amount: Decimal) -> Decimal {
        match self {
            DebitCreditMark::Credit | DebitCreditMark::ReversalOfDebit => amount,
            DebitCreditMark::Debit | DebitCreditMark::ReversalOfCredit => -amount,
        }
    }

    /// Reads a mark at the start of `s`, returning it and its length.
    pub fn split_prefix(s: &str) -> Option<(Self, usize)> {
        // Two-letter marks first so "RC" is not read as "R" + "C"
        [
            ("RC", DebitCreditMark::ReversalOfCredit),
            ("RD", DebitCreditMark::ReversalOfDebit),
            ("C", DebitCreditMark::Credit),
            ("D", DebitCreditMark::Debit),
        ]
        .into_iter()
        .find(|(code, _)| s.starts_with(code))
        .map(|(code, mark)| (mark, code.len()))
    }
}

/// An unsigned MT940 amount: digits with a comma decimal mark (`150,00`, `150,`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mt940Amount(String);

impl From<&str> for Mt940Amount {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl TryFrom<Mt940Amount> for Decimal {
    type Error = StatementParseError;

    fn try_from(amount: Mt940Amount) -> Result<Self, Self::Error> {
        let invalid = || StatementParseError::AmountInvalidFormat(amount.0.clone());
        let s = amount.0.trim();

        if s.is_empty() || s.starts_with(',') || s.matches(',').count() > 1 {
            return Err(invalid());
        }

        let normalized = s.replace(',', ".");
        let normalized = normalized.trim_end_matches('.');
        Decimal::from_str(normalized).map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("250315", NaiveDate::from_ymd_opt(2025, 3, 15).unwrap())]
    #[case("240229", NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())]
    #[case("991231", NaiveDate::from_ymd_opt(1999, 12, 31).unwrap())]
    #[case(" 250101 ", NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())]
    fn test_parse_mt940_date(#[case] input: &str, #[case] expected: NaiveDate) {
        let parsed: NaiveDate = Mt940Date::from(input).try_into().unwrap();
        assert_eq!(parsed, expected);
    }

    #[rstest]
    #[case("")]
    #[case("2503")]
    #[case("20250315")]
    #[case("251301")] // invalid month
    #[case("250229")] // 2025 is not a leap year
    #[case("25031a")]
    fn test_parse_mt940_date_invalid(#[case] input: &str) {
        let result: Result<NaiveDate, _> = Mt940Date::from(input).try_into();
        assert!(matches!(
            result.unwrap_err(),
            StatementParseError::DateInvalidFormat(_)
        ));
    }

    #[rstest]
    #[case("C150,00", DebitCreditMark::Credit, 1)]
    #[case("D45,00", DebitCreditMark::Debit, 1)]
    #[case("RC10,00", DebitCreditMark::ReversalOfCredit, 2)]
    #[case("RD10,00", DebitCreditMark::ReversalOfDebit, 2)]
    fn test_mark_split_prefix(
        #[case] input: &str,
        #[case] mark: DebitCreditMark,
        #[case] len: usize,
    ) {
        assert_eq!(DebitCreditMark::split_prefix(input), Some((mark, len)));
    }

    #[test]
    fn test_mark_split_prefix_none() {
        assert_eq!(DebitCreditMark::split_prefix("X150,00"), None);
        assert_eq!(DebitCreditMark::split_prefix(""), None);
    }

    #[rstest]
    #[case(DebitCreditMark::Credit, "150.00")]
    #[case(DebitCreditMark::ReversalOfDebit, "150.00")]
    #[case(DebitCreditMark::Debit, "-150.00")]
    #[case(DebitCreditMark::ReversalOfCredit, "-150.00")]
    fn test_mark_apply(#[case] mark: DebitCreditMark, #[case] expected: &str) {
        let amount = Decimal::from_str("150.00").unwrap();
        assert_eq!(mark.apply(amount), Decimal::from_str(expected).unwrap());
    }

    #[rstest]
    #[case("150,00", "150.00")]
    #[case("150,", "150")]
    #[case("0,5", "0.5")]
    #[case("1234567,89", "1234567.89")]
    fn test_parse_mt940_amount(#[case] input: &str, #[case] expected: &str) {
        let parsed: Decimal = Mt940Amount::from(input).try_into().unwrap();
        assert_eq!(parsed, Decimal::from_str(expected).unwrap());
    }

    #[rstest]
    #[case("")]
    #[case(",50")]
    #[case("1,2,3")]
    #[case("abc")]
    fn test_parse_mt940_amount_invalid(#[case] input: &str) {
        let result: Result<Decimal, _> = Mt940Amount::from(input).try_into();
        assert!(matches!(
            result.unwrap_err(),
            StatementParseError::AmountInvalidFormat(_)
        ));
    }
}
