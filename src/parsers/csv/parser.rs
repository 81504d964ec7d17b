use super::dto::{ColumnIndex, CsvTransaction};
use crate::config::{CsvConfig, ParsingConfig};
use crate::errors::{ConfigError, StatementParseError, StatementResult};
use crate::normalizer::TextNormalizer;
use crate::parsers::traits::{Parsed, Parser, has_suffix};
use csv::{Reader, ReaderBuilder};
use tracing::{debug, info};

/// Delimited-text exports (Santander iBiznes24 and similar).
#[derive(Debug, Clone)]
pub struct CsvParser {
    config: CsvConfig,
    suffixes: Vec<String>,
    normalizer: TextNormalizer,
}

impl CsvParser {
    pub fn new(config: &ParsingConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            config: config.csv.clone(),
            suffixes: config.delimited_suffixes.clone(),
            normalizer: TextNormalizer::new(&config.normalizer)?,
        })
    }

    fn reader<'a>(&self, delimiter: u8, content: &'a str) -> Reader<&'a [u8]> {
        ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes())
    }

    /// First delimiter whose header row has more than one known column.
    fn detect_layout(&self, content: &str) -> StatementResult<(u8, Vec<String>)> {
        for &delimiter in &self.config.delimiters {
            if !delimiter.is_ascii() {
                debug!(?delimiter, "skipping non-ASCII delimiter");
                continue;
            }
            let delimiter = delimiter as u8;

            let mut reader = self.reader(delimiter, content);
            let Ok(headers) = reader.headers() else {
                continue;
            };
            let headers: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

            let known = headers
                .iter()
                .filter(|h| self.config.columns.is_known(h))
                .count();
            if known > 1 {
                return Ok((delimiter, headers));
            }
        }

        Err(StatementParseError::NoUsableHeader)
    }
}

impl Parser for CsvParser {
    type Output = CsvTransaction;

    fn is_supported(&self, filename: &str) -> bool {
        has_suffix(filename, &self.suffixes)
    }

    fn parse(&self, content: &str) -> StatementResult<Parsed<Self::Output>> {
        let (delimiter, headers) = self.detect_layout(content)?;
        let columns = ColumnIndex::resolve(&headers, &self.config.columns);

        let mut reader = self.reader(delimiter, content);
        let mut transactions = Vec::new();
        let mut skipped = 0;

        for (index, result) in reader.records().enumerate() {
            // +2: one for the header, one for 1-based line numbers
            let row = index + 2;
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    debug!(row, error = %e, "skipping unreadable row");
                    skipped += 1;
                    continue;
                }
            };
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            match columns
                .extract(&record)
                .into_transaction(&self.config, &self.normalizer)
            {
                Ok(txn) => transactions.push(txn),
                Err(e) => {
                    debug!(row, error = %e, "skipping row");
                    skipped += 1;
                }
            }
        }

        info!(
            delimiter = %(delimiter as char).escape_default(),
            parsed = transactions.len(),
            skipped,
            "parsed delimited statement"
        );

        Ok(Parsed {
            transactions,
            skipped,
        })
    }
}
