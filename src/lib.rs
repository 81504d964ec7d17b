//! Reconcile bank statements with a membership ledger.
//!
//! Statements (MT940 or delimited CSV exports) are decoded, parsed into
//! [`RawTransaction`]s and matched against a snapshot of members and their open
//! fees. The result is a list of proposals for a human to confirm; nothing is
//! persisted here.
//!
//! ```rust,ignore
//! use statement_reconcile::{FormatHint, ReconciliationConfig, StatementImporter};
//!
//! let importer = StatementImporter::new(ReconciliationConfig::default())?;
//! let report = importer.import(&bytes, Some("wyciag.sta"), FormatHint::Auto, &members, &fees)?;
//! for item in &report.proposals {
//!     println!("{} {:?}", item.proposal.transaction.amount, item.proposal.suggested_member_id());
//! }
//! ```

mod builder;
mod types;

pub mod config;
pub mod confirm;
pub mod encoding;
pub mod errors;
pub mod import;
pub mod matching;
pub mod normalizer;
pub mod parsers;

pub use builder::{FileFormat, FormatHint, ParsedStatement, ParsedTransaction, ParserBuilder};
pub use config::ReconciliationConfig;
pub use confirm::{ConfirmationPlan, ConfirmedProposal, LedgerEntry, plan_confirmation};
pub use import::{ImportReport, ReviewItem, StatementImporter};
pub use matching::{ConfidencePolicy, ConfidenceTier, MatchProposal, Matcher, Member, OpenFee};
pub use parsers::prelude::*;
pub use types::{RawTransaction, TransactionSource};
