use super::dto::{Mt940Statement, Mt940Transaction, Mt940TransactionRaw};
use crate::config::ParsingConfig;
use crate::errors::{ConfigError, StatementParseError, StatementResult};
use crate::normalizer::TextNormalizer;
use crate::parsers::traits::{Parsed, Parser, has_suffix};
use tracing::{debug, info};

/// SWIFT MT940 customer statements.
#[derive(Debug, Clone)]
pub struct Mt940Parser {
    suffixes: Vec<String>,
    normalizer: TextNormalizer,
}

/// Which field continuation lines belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenField {
    None,
    StatementLine,
    Details,
    Other,
}

#[derive(Debug, Default)]
struct StatementBlock {
    reference: String,
    account: String,
    entries: Vec<Mt940TransactionRaw>,
}

impl Mt940Parser {
    pub fn new(config: &ParsingConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            suffixes: config.structured_suffixes.clone(),
            normalizer: TextNormalizer::new(&config.normalizer)?,
        })
    }

    /// Parses every statement block, keeping block boundaries.
    pub fn parse_statements(&self, content: &str) -> StatementResult<Parsed<Mt940Statement>> {
        let blocks = split_blocks(content)?;
        let mut skipped = 0;

        let statements = blocks
            .into_iter()
            .map(|block| {
                let mut transactions = Vec::with_capacity(block.entries.len());
                for (index, raw) in block.entries.into_iter().enumerate() {
                    match raw.into_transaction(&self.normalizer) {
                        Ok(txn) => transactions.push(txn),
                        Err(e) => {
                            debug!(
                                statement = %block.reference,
                                entry = index + 1,
                                error = %e,
                                "skipping statement line"
                            );
                            skipped += 1;
                        }
                    }
                }
                Mt940Statement {
                    reference: block.reference,
                    account: block.account,
                    transactions,
                }
            })
            .collect::<Vec<_>>();

        Ok(Parsed {
            transactions: statements,
            skipped,
        })
    }
}

impl Parser for Mt940Parser {
    type Output = Mt940Transaction;

    fn is_supported(&self, filename: &str) -> bool {
        has_suffix(filename, &self.suffixes)
    }

    fn parse(&self, content: &str) -> StatementResult<Parsed<Self::Output>> {
        let parsed = self.parse_statements(content)?;
        let statements = parsed.transactions.len();
        let transactions: Vec<_> = parsed
            .transactions
            .into_iter()
            .flat_map(|statement| statement.transactions)
            .collect();

        info!(
            statements,
            parsed = transactions.len(),
            skipped = parsed.skipped,
            "parsed MT940 statement"
        );

        Ok(Parsed {
            transactions,
            skipped: parsed.skipped,
        })
    }
}

/// Groups tagged lines into statement blocks.
fn split_blocks(content: &str) -> StatementResult<Vec<StatementBlock>> {
    let mut blocks = Vec::new();
    let mut current: Option<StatementBlock> = None;
    let mut open = OpenField::None;
    let mut seen_tag = false;

    for line in content.lines() {
        let mut line = line.trim_end_matches('\r');

        // SWIFT envelope: "{1:...}{2:...}{4:" opens the text block, "-}" closes it
        if line.starts_with('{') {
            match line.find("{4:") {
                Some(pos) => line = &line[pos + 3..],
                None => continue,
            }
            if line.trim().is_empty() {
                continue;
            }
        }

        if matches!(line.trim(), "-" | "-}") {
            blocks.extend(current.take());
            open = OpenField::None;
            continue;
        }

        let Some((tag, value)) = split_tag(line) else {
            append_continuation(current.as_mut(), open, line);
            continue;
        };

        match tag {
            "20" => {
                seen_tag = true;
                blocks.extend(current.take());
                current = Some(StatementBlock {
                    reference: value.trim().to_string(),
                    ..Default::default()
                });
                open = OpenField::Other;
            }
            "25" => {
                if let Some(block) = current.as_mut() {
                    block.account = value.trim().to_string();
                }
                open = OpenField::Other;
            }
            "61" => {
                seen_tag = true;
                current
                    .get_or_insert_with(StatementBlock::default)
                    .entries
                    .push(Mt940TransactionRaw {
                        line: value.to_string(),
                        ..Default::default()
                    });
                open = OpenField::StatementLine;
            }
            "86" => {
                // Only details directly after a statement line belong to it
                let entry = current
                    .as_mut()
                    .and_then(|block| block.entries.last_mut())
                    .filter(|_| open == OpenField::StatementLine);
                open = match entry {
                    Some(entry) => {
                        entry.details = value.to_string();
                        OpenField::Details
                    }
                    None => OpenField::Other,
                };
            }
            _ => open = OpenField::Other,
        }
    }
    blocks.extend(current.take());

    if !seen_tag {
        return Err(StatementParseError::ParseFailed(
            "no MT940 statement blocks found".to_string(),
        ));
    }
    Ok(blocks)
}

/// `:61:value` → ("61", "value"); tags are two digits plus an optional letter.
fn split_tag(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix(':')?;
    let (tag, value) = rest.split_once(':')?;
    let valid = (2..=3).contains(&tag.len())
        && tag.bytes().take(2).all(|b| b.is_ascii_digit())
        && tag.bytes().skip(2).all(|b| b.is_ascii_uppercase());
    if !valid {
        return None;
    }
    // ":60F:" and ":60M:" share handling with their two-digit base
    Some((&tag[..2], value))
}

fn append_continuation(block: Option<&mut StatementBlock>, open: OpenField, line: &str) {
    let Some(entry) = block.and_then(|b| b.entries.last_mut()) else {
        return;
    };
    match open {
        OpenField::StatementLine => entry.supplementary.push_str(line.trim()),
        // Details wrap at a fixed width, so lines are joined without a separator
        OpenField::Details => entry.details.push_str(line),
        OpenField::None | OpenField::Other => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const SAMPLE_MT940: &str = ":20:STMT250315
:25:/PL61109010140000071219812874
:28C:00042/001
:60F:C250301PLN1000,00
:61:2503150315CN150,00NTRFNONREF//SANT0001
:86:/ORD/Jan Kowalski/ skladka nr 5
:61:250316D45,00NTRFREF2//SANT0002
PRZELEW WYCHODZACY
:86:/BNF/Marina Gdynia/ oplata za
 przystan
:62F:C250316PLN1105,00
-
:20:STMT250317
:25:/PL61109010140000071219812874
:60F:C250316PLN1105,00
:61:250317C20,00NTRFNONREF
:86:Darowizna od Anny
:62F:C250317PLN1125,00
-
";

    #[rstest]
    #[case("wyciag.sta", true)]
    #[case("WYCIAG.STA", true)]
    #[case("export.mt940", true)]
    #[case("export.csv", false)]
    fn test_is_supported(#[case] filename: &str, #[case] expected: bool) {
        assert_eq!(Mt940Parser::new(&ParsingConfig::default()).unwrap().is_supported(filename), expected);
    }

    #[test]
    fn test_parse_statements_keeps_blocks() {
        let parsed = Mt940Parser::new(&ParsingConfig::default()).unwrap().parse_statements(SAMPLE_MT940).unwrap();
        assert_eq!(parsed.skipped, 0);

        let statements = parsed.transactions;
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].reference, "STMT250315");
        assert_eq!(statements[0].account, "/PL61109010140000071219812874");
        assert_eq!(statements[0].transactions.len(), 2);
        assert_eq!(statements[1].transactions.len(), 1);
    }

    #[test]
    fn test_parse_flattens_transactions() {
        let txns = Mt940Parser::new(&ParsingConfig::default()).unwrap().parse(SAMPLE_MT940).unwrap().transactions;
        assert_eq!(txns.len(), 3);

        assert_eq!(txns[0].amount, Decimal::from_str("150.00").unwrap());
        assert_eq!(txns[0].counterparty, "Jan Kowalski");
        assert_eq!(txns[0].description, "Jan Kowalski/ skladka nr 5");
        assert_eq!(txns[0].bank_reference, "SANT0001");

        assert_eq!(txns[1].amount, Decimal::from_str("-45.00").unwrap());
        assert_eq!(txns[1].description, "Marina Gdynia/ oplata za przystan");
        assert_eq!(txns[1].counterparty, "Marina Gdynia");

        assert_eq!(txns[2].value_date, NaiveDate::from_ymd_opt(2025, 3, 17).unwrap());
        assert_eq!(txns[2].description, "Darowizna od Anny");
        assert_eq!(txns[2].bank_reference, "");
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let content = ":20:X
:61:250399C10,00NTRF
:86:bad date
:61:250315C,NTRF
:61:250315C10,00NTRF
:86:ok
-
";
        let parsed = Mt940Parser::new(&ParsingConfig::default()).unwrap().parse(content).unwrap();
        assert_eq!(parsed.transactions.len(), 1);
        assert_eq!(parsed.skipped, 2);
        assert_eq!(parsed.transactions[0].description, "ok");
    }

    #[test]
    fn test_swift_envelope() {
        let content = "{1:F01BANKPLPWAXXX0000000000}{2:O9400000000000BANKPLPWAXXX00000000000000000000N}{4:
:20:ENV1
:61:250315C99,00NTRFNONREF
:86:/ORD/Piotr Zieliński/ wpisowe
-}";
        let txns = Mt940Parser::new(&ParsingConfig::default()).unwrap().parse(content).unwrap().transactions;
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].counterparty, "Piotr Zieliński");
    }

    #[test]
    fn test_statement_level_86_is_ignored() {
        let content = ":20:X
:61:250315C10,00NTRF
:86:first
:62F:C250315PLN10,00
:86:statement info
-";
        let txns = Mt940Parser::new(&ParsingConfig::default()).unwrap().parse(content).unwrap().transactions;
        assert_eq!(txns[0].description, "first");
    }

    #[test]
    fn test_empty_statement_is_not_an_error() {
        let content = ":20:EMPTY\n:60F:C250301PLN0,00\n:62F:C250301PLN0,00\n-\n";
        let parsed = Mt940Parser::new(&ParsingConfig::default()).unwrap().parse(content).unwrap();
        assert!(parsed.transactions.is_empty());
    }

    #[rstest]
    #[case("")]
    #[case("Data;Kwota\n2025-03-15;10,00\n")]
    #[case("random content")]
    fn test_no_blocks_is_an_error(#[case] content: &str) {
        let result = Mt940Parser::new(&ParsingConfig::default()).unwrap().parse(content);
        assert!(matches!(result, Err(StatementParseError::ParseFailed(_))));
    }

    #[rstest]
    #[case(":61:250315C10,00NTRF", Some(("61", "250315C10,00NTRF")))]
    #[case(":28C:00042/001", Some(("28", "00042/001")))]
    #[case(":60F:C250301PLN1000,00", Some(("60", "C250301PLN1000,00")))]
    #[case(":ORD:text", None)]
    #[case("no tag", None)]
    #[case(":1:x", None)]
    fn test_split_tag(#[case] line: &str, #[case] expected: Option<(&str, &str)>) {
        assert_eq!(split_tag(line), expected);
    }
}
