use thiserror::Error;

/// Errors that reject a whole uploaded statement.
///
/// Row-level problems never surface here as failures: a bad row is skipped
/// and counted, the rest of the file still goes to matching.
#[derive(Error, Debug)]
pub enum StatementParseError {
    /// None of the configured encodings could decode the file
    #[error("undecodable encoding")]
    UndecodableEncoding,

    /// Delimited file where no delimiter produced more than one known column
    #[error("no usable delimiter/header")]
    NoUsableHeader,

    /// Structural failure of the file (detail in the message)
    #[error("Parse failed: {0}")]
    ParseFailed(String),

    /// File name suffix does not map to a known statement format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Format hint string other than auto/structured/delimited
    #[error("Unknown format hint: {0}")]
    UnknownFormatHint(String),

    #[error("Failed to read file content: {0}")]
    ReadContentFailed(#[from] std::io::Error),

    /// Parser construction failed on the supplied configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The builder was called without content or a file path
    #[error("Content or filepath is required")]
    MissingContentAndFilepath,

    /// File parsed but contained no transactions
    #[error("No transactions found in statement")]
    NoTransactions,

    // ── Field-level errors, used for row skipping ───────────────────────────────

    #[error("Invalid date format: {0:?}")]
    DateInvalidFormat(String),

    #[error("Invalid amount format: {0:?}")]
    AmountInvalidFormat(String),
}

impl From<std::convert::Infallible> for StatementParseError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

/// Errors raised while loading or validating [`crate::config::ReconciliationConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result alias for statement parsing
pub type StatementResult<T> = Result<T, StatementParseError>;
