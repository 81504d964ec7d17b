use std::fmt;

use crate::{builder::ParsedTransaction, errors::StatementParseError, parsers::prelude::*};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which parser produced a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionSource {
    #[serde(rename = "mt940")]
    Mt940,
    #[serde(rename = "csv")]
    Csv,
}

impl TransactionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionSource::Mt940 => "mt940",
            TransactionSource::Csv => "csv",
        }
    }
}

impl fmt::Display for TransactionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized bank transaction, as read from a statement.
///
/// `counterparty` and `bank_reference` are empty strings when the statement
/// carries nothing for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
    pub counterparty: String,
    pub bank_reference: String,
    pub source: TransactionSource,
}

impl RawTransaction {
    pub fn is_income(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

impl TryFrom<ParsedTransaction> for RawTransaction {
    type Error = StatementParseError;

    fn try_from(parsed: ParsedTransaction) -> Result<Self, Self::Error> {
        match parsed {
            ParsedTransaction::Mt940(entry) => Ok(entry.into()),
            ParsedTransaction::Csv(row) => Ok(row.into()),
        }
    }
}

impl From<CsvTransaction> for RawTransaction {
    fn from(row: CsvTransaction) -> Self {
        RawTransaction {
            date: row.date,
            amount: row.amount,
            description: row.description,
            counterparty: row.counterparty,
            bank_reference: row.reference,
            source: TransactionSource::Csv,
        }
    }
}

impl From<Mt940Transaction> for RawTransaction {
    fn from(entry: Mt940Transaction) -> Self {
        RawTransaction {
            date: entry.value_date,
            amount: entry.amount,
            description: entry.description,
            counterparty: entry.counterparty,
            bank_reference: entry.bank_reference,
            source: TransactionSource::Mt940,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    fn create_test_mt940_transaction() -> Mt940Transaction {
        Mt940Transaction {
            value_date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            entry_date: None,
            amount: Decimal::from_str("150.00").unwrap(),
            type_code: "NTRF".to_string(),
            customer_reference: "NONREF".to_string(),
            bank_reference: "BR123".to_string(),
            description: "Jan Kowalski/ skladka nr 5".to_string(),
            counterparty: "Jan Kowalski".to_string(),
        }
    }

    #[test]
    fn test_raw_transaction_from_mt940() {
        let raw: RawTransaction = create_test_mt940_transaction().into();

        assert_eq!(raw.date, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
        assert_eq!(raw.amount, Decimal::from_str("150.00").unwrap());
        assert_eq!(raw.counterparty, "Jan Kowalski");
        assert_eq!(raw.bank_reference, "BR123");
        assert_eq!(raw.source, TransactionSource::Mt940);
    }

    #[test]
    fn test_raw_transaction_from_parsed_csv() {
        let row = CsvTransaction {
            date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            amount: Decimal::from_str("-20.50").unwrap(),
            description: "Opłata".to_string(),
            counterparty: String::new(),
            reference: "REF-1".to_string(),
        };

        let raw = RawTransaction::try_from(ParsedTransaction::Csv(row)).unwrap();
        assert_eq!(raw.source, TransactionSource::Csv);
        assert_eq!(raw.bank_reference, "REF-1");
        assert!(!raw.is_income());
    }

    #[rstest]
    #[case("150.00", true)]
    #[case("0.01", true)]
    #[case("0", false)]
    #[case("-10", false)]
    fn test_is_income(#[case] amount: &str, #[case] expected: bool) {
        let mut raw: RawTransaction = create_test_mt940_transaction().into();
        raw.amount = Decimal::from_str(amount).unwrap();
        assert_eq!(raw.is_income(), expected);
    }

    #[test]
    fn test_transaction_source_serialization() {
        assert_eq!(serde_json::to_string(&TransactionSource::Mt940).unwrap(), "\"mt940\"");
        assert_eq!(TransactionSource::Csv.to_string(), "csv");

        let raw: RawTransaction = create_test_mt940_transaction().into();
        let json = serde_json::to_string(&raw).unwrap();
        let back: RawTransaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, raw);
    }
}
