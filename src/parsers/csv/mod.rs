mod dto;
mod parser;
mod types;

pub mod prelude {
    pub use super::dto::{CsvTransaction, CsvTransactionRaw};
    pub use super::parser::CsvParser;
    pub use super::types::{CsvAmount, CsvDate};
}
