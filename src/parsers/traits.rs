use crate::errors::StatementResult;

/// Transactions read from one statement plus the number of rows dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub transactions: Vec<T>,
    pub skipped: usize,
}

impl<T> Parsed<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Parsed<U> {
        Parsed {
            transactions: self.transactions.into_iter().map(f).collect(),
            skipped: self.skipped,
        }
    }
}

pub trait Parser {
    type Output;

    /// Parses decoded statement text. Rows that cannot be read are skipped
    /// and counted; only a structurally unusable file is an error.
    fn parse(&self, content: &str) -> StatementResult<Parsed<Self::Output>>;

    /// Whether a file name carries one of the parser's suffixes.
    fn is_supported(&self, filename: &str) -> bool;
}

pub(crate) fn has_suffix(filename: &str, suffixes: &[String]) -> bool {
    let Some((_, ext)) = filename.rsplit_once('.') else {
        return false;
    };
    suffixes.iter().any(|suffix| suffix.eq_ignore_ascii_case(ext))
}
