use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{CsvAmount, CsvDate};
use crate::config::{ColumnAliases, CsvConfig};
use crate::errors::StatementParseError;
use crate::normalizer::TextNormalizer;

/// Header positions per logical column, in alias preference order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct ColumnIndex {
    date: Vec<usize>,
    amount: Vec<usize>,
    description: Vec<usize>,
    counterparty: Vec<usize>,
    reference: Vec<usize>,
}

impl ColumnIndex {
    pub(super) fn resolve(headers: &[String], aliases: &ColumnAliases) -> Self {
        let positions = |names: &[String]| -> Vec<usize> {
            names
                .iter()
                .filter_map(|name| headers.iter().position(|h| h == name))
                .collect()
        };

        Self {
            date: positions(&aliases.date),
            amount: positions(&aliases.amount),
            description: positions(&aliases.description),
            counterparty: positions(&aliases.counterparty),
            reference: positions(&aliases.reference),
        }
    }

    pub(super) fn extract(&self, record: &StringRecord) -> CsvTransactionRaw {
        // First alias present with a non-empty value in this row
        let value = |positions: &[usize]| -> Option<String> {
            positions
                .iter()
                .filter_map(|&i| record.get(i))
                .map(str::trim)
                .find(|v| !v.is_empty())
                .map(str::to_string)
        };

        CsvTransactionRaw {
            date: value(&self.date),
            amount: value(&self.amount),
            description: value(&self.description).unwrap_or_default(),
            counterparty: value(&self.counterparty).unwrap_or_default(),
            reference: value(&self.reference).unwrap_or_default(),
        }
    }
}

/// One data row with its cells resolved to logical columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTransactionRaw {
    pub date: Option<String>,
    pub amount: Option<String>,
    pub description: String,
    pub counterparty: String,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvTransaction {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
    pub counterparty: String,
    pub reference: String,
}

impl CsvTransactionRaw {
    pub fn into_transaction(
        self,
        config: &CsvConfig,
        normalizer: &TextNormalizer,
    ) -> Result<CsvTransaction, StatementParseError> {
        let date = self
            .date
            .map(CsvDate::from)
            .ok_or_else(|| StatementParseError::DateInvalidFormat(String::new()))?
            .parse_with(&config.date_formats)?;

        let amount = self
            .amount
            .map(CsvAmount::from)
            .ok_or_else(|| StatementParseError::AmountInvalidFormat(String::new()))?
            .parse_with(&config.currency_tokens)?;

        Ok(CsvTransaction {
            date,
            amount,
            description: normalizer.clean(&self.description),
            counterparty: self.counterparty,
            reference: self.reference,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new(&crate::config::NormalizerConfig::default()).unwrap()
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn create_test_raw(date: Option<&str>, amount: Option<&str>) -> CsvTransactionRaw {
        CsvTransactionRaw {
            date: date.map(str::to_string),
            amount: amount.map(str::to_string),
            description: "/ORD/Jan  Kowalski skladka".to_string(),
            counterparty: "Jan Kowalski".to_string(),
            reference: "REF-1".to_string(),
        }
    }

    #[test]
    fn test_resolve_keeps_alias_order() {
        let index = ColumnIndex::resolve(
            &headers(&["Data", "Kwota", "Data operacji", "Tytuł"]),
            &ColumnAliases::default(),
        );
        // "Data operacji" is preferred over "Data"
        assert_eq!(index.date, vec![2, 0]);
        assert_eq!(index.amount, vec![1]);
        assert_eq!(index.description, vec![3]);
        assert!(index.counterparty.is_empty());
    }

    #[test]
    fn test_extract_falls_back_to_next_non_empty_alias() {
        let index = ColumnIndex::resolve(
            &headers(&["Data operacji", "Data księgowania", "Kwota"]),
            &ColumnAliases::default(),
        );
        let record = StringRecord::from(vec!["", " 15.03.2025 ", "100,00"]);
        let raw = index.extract(&record);

        assert_eq!(raw.date.as_deref(), Some("15.03.2025"));
        assert_eq!(raw.amount.as_deref(), Some("100,00"));
        assert_eq!(raw.description, "");
    }

    #[test]
    fn test_extract_short_record() {
        let index = ColumnIndex::resolve(
            &headers(&["Data", "Kwota", "Opis"]),
            &ColumnAliases::default(),
        );
        let raw = index.extract(&StringRecord::from(vec!["2025-03-15"]));
        assert_eq!(raw.date.as_deref(), Some("2025-03-15"));
        assert_eq!(raw.amount, None);
    }

    #[test]
    fn test_into_transaction_valid() {
        let raw = create_test_raw(Some("15.03.2025"), Some("1 234,56"));
        let txn = raw
            .into_transaction(&CsvConfig::default(), &normalizer())
            .unwrap();

        assert_eq!(txn.date, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        assert_eq!(txn.amount, Decimal::from_str("1234.56").unwrap());
        assert_eq!(txn.description, "Jan Kowalski skladka");
        assert_eq!(txn.counterparty, "Jan Kowalski");
        assert_eq!(txn.reference, "REF-1");
    }

    #[rstest]
    #[case(None, Some("100,00"))]
    #[case(Some("15.03.2025"), None)]
    #[case(Some("yesterday"), Some("100,00"))]
    #[case(Some("15.03.2025"), Some("sto"))]
    fn test_into_transaction_invalid(#[case] date: Option<&str>, #[case] amount: Option<&str>) {
        let result = create_test_raw(date, amount)
            .into_transaction(&CsvConfig::default(), &normalizer());
        assert!(result.is_err());
    }
}
