use std::{fmt, fs, str::FromStr};

use crate::{
    config::ParsingConfig,
    encoding,
    errors::{StatementParseError, StatementResult},
    parsers::prelude::*,
    types::RawTransaction,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ParsedTransaction {
    Mt940(Mt940Transaction),
    Csv(CsvTransaction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    #[serde(rename = "mt940")]
    Mt940,
    #[serde(rename = "csv")]
    Csv,
}

/// Caller's declaration of the statement format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatHint {
    /// Decide from the file name suffix
    #[default]
    Auto,
    Structured,
    Delimited,
}

impl FromStr for FormatHint {
    type Err = StatementParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(FormatHint::Auto),
            "structured" | "mt940" => Ok(FormatHint::Structured),
            "delimited" | "csv" => Ok(FormatHint::Delimited),
            _ => Err(StatementParseError::UnknownFormatHint(s.to_string())),
        }
    }
}

impl FormatHint {
    pub fn resolve(
        self,
        filename: Option<&str>,
        config: &ParsingConfig,
    ) -> StatementResult<FileFormat> {
        match self {
            FormatHint::Structured => Ok(FileFormat::Mt940),
            FormatHint::Delimited => Ok(FileFormat::Csv),
            FormatHint::Auto => FileFormat::detect(filename, config),
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Mt940 => f.write_str("mt940"),
            FileFormat::Csv => f.write_str("csv"),
        }
    }
}

impl FileFormat {
    fn parse_raw(
        &self,
        content: &str,
        config: &ParsingConfig,
    ) -> StatementResult<Parsed<ParsedTransaction>> {
        match self {
            FileFormat::Mt940 => Ok(Mt940Parser::new(config)?
                .parse(content)?
                .map(ParsedTransaction::Mt940)),
            FileFormat::Csv => Ok(CsvParser::new(config)?
                .parse(content)?
                .map(ParsedTransaction::Csv)),
        }
    }

    fn parse<T>(&self, content: &str, config: &ParsingConfig) -> StatementResult<Parsed<T>>
    where
        T: TryFrom<ParsedTransaction>,
        StatementParseError: From<T::Error>,
    {
        let parsed = self.parse_raw(content, config)?;
        let transactions = parsed
            .transactions
            .into_iter()
            .map(T::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Parsed {
            transactions,
            skipped: parsed.skipped,
        })
    }

    /// Suffix-based detection. A missing or unknown suffix is an error.
    fn detect(filename: Option<&str>, config: &ParsingConfig) -> StatementResult<Self> {
        let Some(filename) = filename else {
            return Err(StatementParseError::UnsupportedFormat(
                "no file name to detect the format from".to_string(),
            ));
        };

        if Mt940Parser::new(config)?.is_supported(filename) {
            return Ok(FileFormat::Mt940);
        }
        if CsvParser::new(config)?.is_supported(filename) {
            return Ok(FileFormat::Csv);
        }

        Err(StatementParseError::UnsupportedFormat(filename.to_string()))
    }
}

/// Transactions from one uploaded statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStatement<T = RawTransaction> {
    pub format: FileFormat,
    /// Encoding that decoded the file
    pub encoding: &'static str,
    pub transactions: Vec<T>,
    /// Rows or records dropped for a missing or unreadable date/amount
    pub skipped: usize,
}

#[derive(Default)]
pub struct ParserBuilder {
    content: Option<Vec<u8>>,
    filepath: Option<String>,
    format: FormatHint,
    config: ParsingConfig,
}

impl ParserBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: &[u8]) -> Self {
        self.content = Some(content.to_vec());
        self
    }

    pub fn filename(mut self, filename: &str) -> Self {
        self.filepath = Some(filename.to_string());
        self
    }

    pub fn format(mut self, format: FormatHint) -> Self {
        self.format = format;
        self
    }

    pub fn config(mut self, config: ParsingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn parse(self) -> StatementResult<ParsedStatement> {
        self.parse_into::<RawTransaction>()
    }

    pub fn parse_into<T>(self) -> StatementResult<ParsedStatement<T>>
    where
        T: TryFrom<ParsedTransaction>,
        StatementParseError: From<T::Error>,
    {
        let format = self.format.resolve(self.filepath.as_deref(), &self.config)?;

        let content = match self.content {
            Some(content) => content,
            None => {
                let path = self
                    .filepath
                    .as_deref()
                    .ok_or(StatementParseError::MissingContentAndFilepath)?;
                fs::read(path)?
            }
        };

        let decoded = encoding::decode(&content, &self.config.encodings)?;
        let parsed = format.parse::<T>(&decoded.text, &self.config)?;

        Ok(ParsedStatement {
            format,
            encoding: decoded.encoding,
            transactions: parsed.transactions,
            skipped: parsed.skipped,
        })
    }
}
