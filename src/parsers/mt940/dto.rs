use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{DebitCreditMark, Mt940Amount, Mt940Date};
use crate::errors::StatementParseError;
use crate::normalizer::TextNormalizer;

/// One statement block (`:20:` … `-`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mt940Statement {
    /// `:20:` transaction reference number
    pub reference: String,
    /// `:25:` account identification
    pub account: String,
    pub transactions: Vec<Mt940Transaction>,
}

/// Raw text of one `:61:` statement line and the `:86:` block that follows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct Mt940TransactionRaw {
    pub(super) line: String,
    /// Second line of `:61:`
    pub(super) supplementary: String,
    pub(super) details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mt940Transaction {
    pub value_date: NaiveDate,
    pub entry_date: Option<NaiveDate>,
    /// Signed: positive is money in
    pub amount: Decimal,
    pub type_code: String,
    pub customer_reference: String,
    pub bank_reference: String,
    pub description: String,
    pub counterparty: String,
}

/// Fields of a `:61:` line, before dates and amounts are validated.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StatementLine<'a> {
    value_date: &'a str,
    entry_date: Option<&'a str>,
    mark: DebitCreditMark,
    amount: &'a str,
    type_code: &'a str,
    customer_reference: &'a str,
    bank_reference: &'a str,
}

impl<'a> StatementLine<'a> {
    /// `YYMMDD[MMDD](C|D|RC|RD)[funds code]amount(N|F|S)xxx customer[//bank]`
    fn split(line: &'a str) -> Result<Self, StatementParseError> {
        let malformed = || StatementParseError::ParseFailed(format!("malformed :61: line {line:?}"));

        let value_date = line.get(..6).ok_or_else(malformed)?;
        let mut rest = &line[6..];

        let entry_date = rest
            .get(..4)
            .filter(|s| s.bytes().all(|b| b.is_ascii_digit()));
        if let Some(entry) = entry_date {
            rest = &rest[entry.len()..];
        }

        let (mark, mark_len) = DebitCreditMark::split_prefix(rest).ok_or_else(malformed)?;
        rest = &rest[mark_len..];

        // Optional funds code: third letter of the currency code
        if rest.starts_with(|c: char| c.is_ascii_uppercase()) {
            rest = &rest[1..];
        }

        let amount_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == ','))
            .unwrap_or(rest.len());
        let amount = &rest[..amount_len];
        rest = &rest[amount_len..];

        let type_code = rest.get(..4).ok_or_else(malformed)?;
        rest = &rest[4..];

        let (customer_reference, bank_reference) = rest.split_once("//").unwrap_or((rest, ""));

        Ok(Self {
            value_date,
            entry_date,
            mark,
            amount,
            type_code,
            customer_reference: customer_reference.trim(),
            bank_reference: bank_reference.trim(),
        })
    }
}

impl Mt940TransactionRaw {
    pub(super) fn into_transaction(
        self,
        normalizer: &TextNormalizer,
    ) -> Result<Mt940Transaction, StatementParseError> {
        let line = StatementLine::split(self.line.trim())?;

        let value_date: NaiveDate = Mt940Date::from(line.value_date).try_into()?;
        let amount: Decimal = Mt940Amount::from(line.amount).try_into()?;
        let entry_date = line
            .entry_date
            .and_then(|mmdd| entry_date(value_date, mmdd));

        // Transaction details are richer; the supplementary line is the fallback
        let text = if self.details.trim().is_empty() {
            self.supplementary.as_str()
        } else {
            self.details.as_str()
        };

        let bank_reference = if !line.bank_reference.is_empty() {
            line.bank_reference
        } else if line.customer_reference.eq_ignore_ascii_case("NONREF") {
            ""
        } else {
            line.customer_reference
        };

        Ok(Mt940Transaction {
            value_date,
            entry_date,
            amount: line.mark.apply(amount),
            type_code: line.type_code.to_string(),
            customer_reference: line.customer_reference.to_string(),
            bank_reference: bank_reference.to_string(),
            description: normalizer.clean(text),
            counterparty: normalizer.extract_counterparty(text),
        })
    }
}

/// Entry date carries no year; take the one closest to the value date.
fn entry_date(value_date: NaiveDate, mmdd: &str) -> Option<NaiveDate> {
    let month = mmdd.get(..2)?.parse().ok()?;
    let day = mmdd.get(2..4)?.parse().ok()?;
    let year = chrono::Datelike::year(&value_date);

    [year - 1, year, year + 1]
        .into_iter()
        .filter_map(|y| NaiveDate::from_ymd_opt(y, month, day))
        .min_by_key(|candidate| (*candidate - value_date).num_days().abs())
}
