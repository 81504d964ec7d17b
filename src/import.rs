use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    builder::{FileFormat, FormatHint, ParserBuilder},
    config::ReconciliationConfig,
    errors::{StatementParseError, StatementResult},
    matching::{
        ConfidencePolicy, KeywordClassifier, MatchProposal, Matcher, Member, MemberSuggestion,
        OpenFee, suggest_members,
    },
    types::RawTransaction,
};

/// A proposal as shown for review, with its numeric score and whether the
/// review screen should pre-select it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    #[serde(flatten)]
    pub proposal: MatchProposal,
    pub confidence_score: f64,
    pub auto_match: bool,
}

/// Result of importing one statement: proposals in statement order plus counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub format: FileFormat,
    pub encoding: String,
    pub proposals: Vec<ReviewItem>,
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub skipped_rows: usize,
}

/// Decode, parse and match one uploaded statement against a member snapshot.
///
/// Nothing is persisted here; storing confirmed proposals is up to the caller
/// (see [`crate::confirm::plan_confirmation`]).
#[derive(Debug, Clone)]
pub struct StatementImporter {
    config: ReconciliationConfig,
    matcher: Matcher,
    classifier: KeywordClassifier,
}

impl StatementImporter {
    pub fn new(config: ReconciliationConfig) -> StatementResult<Self> {
        config.validate()?;
        let matcher = Matcher::new(&config.matching)?;
        let classifier = KeywordClassifier::new(&config.matching);
        Ok(Self {
            config,
            matcher,
            classifier,
        })
    }

    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    pub fn policy(&self) -> &ConfidencePolicy {
        &self.config.confidence
    }

    pub fn classifier(&self) -> &KeywordClassifier {
        &self.classifier
    }

    pub fn import(
        &self,
        content: &[u8],
        filename: Option<&str>,
        hint: FormatHint,
        members: &[Member],
        open_fees: &[OpenFee],
    ) -> StatementResult<ImportReport> {
        let mut builder = ParserBuilder::new()
            .content(content)
            .format(hint)
            .config(self.config.parsing.clone());
        if let Some(filename) = filename {
            builder = builder.filename(filename);
        }

        let statement = builder.parse()?;
        if statement.transactions.is_empty() {
            return Err(StatementParseError::NoTransactions);
        }

        let proposals = self
            .matcher
            .match_transactions(&statement.transactions, members, open_fees);
        let report = self.report(statement.format, statement.encoding, proposals, statement.skipped);

        info!(
            format = %report.format,
            encoding = %report.encoding,
            total = report.total,
            matched = report.matched,
            unmatched = report.unmatched,
            skipped = report.skipped_rows,
            "statement imported"
        );
        Ok(report)
    }

    /// Ranked candidates for a transaction the reviewer wants to match by hand.
    pub fn suggest_members(
        &self,
        transaction: &RawTransaction,
        members: &[Member],
    ) -> Vec<MemberSuggestion> {
        suggest_members(transaction, members, self.config.matching.max_suggestions)
    }

    fn report(
        &self,
        format: FileFormat,
        encoding: &str,
        proposals: Vec<MatchProposal>,
        skipped_rows: usize,
    ) -> ImportReport {
        let policy = self.policy();
        let proposals: Vec<ReviewItem> = proposals
            .into_iter()
            .map(|proposal| {
                let tier = proposal.confidence_tier();
                ReviewItem {
                    confidence_score: policy.score(tier),
                    auto_match: policy.should_auto_match(tier),
                    proposal,
                }
            })
            .collect();

        let total = proposals.len();
        let matched = proposals.iter().filter(|p| p.proposal.is_matched()).count();

        ImportReport {
            format,
            encoding: encoding.to_string(),
            proposals,
            total,
            matched,
            unmatched: total - matched,
            skipped_rows,
        }
    }
}
