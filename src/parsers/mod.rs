pub mod csv;
pub mod mt940;
pub mod traits;

pub mod prelude {
    pub use super::csv::prelude::*;
    pub use super::mt940::prelude::*;
    pub use super::traits::{Parsed, Parser};
}
