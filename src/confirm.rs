use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    matching::{ConfidenceTier, FeeId, KeywordClassifier, MatchProposal, MemberId},
    types::{RawTransaction, TransactionSource},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionCategory {
    Fees,
    Donations,
    OtherExpense,
}

/// How the member link of a stored transaction was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordedConfidence {
    High,
    Medium,
    Low,
    Manual,
}

/// A proposal as the reviewer left it: the member and fee they accepted,
/// which may differ from what the matcher suggested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmedProposal {
    #[serde(flatten)]
    pub proposal: MatchProposal,
    #[serde(default)]
    pub member_id: Option<MemberId>,
    #[serde(default)]
    pub fee_id: Option<FeeId>,
}

impl ConfirmedProposal {
    /// Takes the matcher's suggestion unchanged.
    pub fn accept(proposal: MatchProposal) -> Self {
        Self {
            member_id: proposal.suggested_member_id(),
            fee_id: proposal.suggested_fee_id(),
            proposal,
        }
    }

    pub fn with_member(mut self, member_id: Option<MemberId>, fee_id: Option<FeeId>) -> Self {
        self.member_id = member_id;
        self.fee_id = fee_id;
        self
    }

    fn recorded_confidence(&self) -> Option<RecordedConfidence> {
        let member_id = self.member_id?;
        if self.proposal.suggested_member_id() != Some(member_id) {
            return Some(RecordedConfidence::Manual);
        }
        match self.proposal.confidence_tier() {
            ConfidenceTier::High => Some(RecordedConfidence::High),
            ConfidenceTier::Medium => Some(RecordedConfidence::Medium),
            ConfidenceTier::Low => Some(RecordedConfidence::Low),
            ConfidenceTier::None => Some(RecordedConfidence::Manual),
        }
    }
}

/// Marks a fee paid by the transaction it is stored with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePayment {
    pub fee_id: FeeId,
    pub paid_date: NaiveDate,
}

/// A transaction record ready to be stored by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub category: TransactionCategory,
    /// Always non-negative; the sign lives in `kind`
    pub amount: Decimal,
    pub description: String,
    pub counterparty: Option<String>,
    pub bank_reference: Option<String>,
    pub import_source: TransactionSource,
    pub member_id: Option<MemberId>,
    pub confidence: Option<RecordedConfidence>,
    pub fee_payment: Option<FeePayment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationPlan {
    pub entries: Vec<LedgerEntry>,
    pub created: usize,
    pub skipped: usize,
}

/// Decides what to store for a batch of confirmed proposals.
///
/// Proposals whose bank reference is already stored, or repeats one earlier
/// in the batch, are skipped.
pub fn plan_confirmation(
    accepted: &[ConfirmedProposal],
    existing_references: &HashSet<String>,
    classifier: &KeywordClassifier,
) -> ConfirmationPlan {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut plan = ConfirmationPlan::default();

    for confirmed in accepted {
        let reference = confirmed.proposal.transaction.bank_reference.trim();
        if !reference.is_empty()
            && (existing_references.contains(reference) || !seen.insert(reference))
        {
            debug!(reference, "skipping already imported transaction");
            plan.skipped += 1;
            continue;
        }

        plan.entries.push(ledger_entry(confirmed, classifier));
        plan.created += 1;
    }

    info!(
        created = plan.created,
        skipped = plan.skipped,
        "confirmation planned"
    );
    plan
}

fn ledger_entry(confirmed: &ConfirmedProposal, classifier: &KeywordClassifier) -> LedgerEntry {
    let transaction = &confirmed.proposal.transaction;
    let kind = if transaction.is_income() {
        TransactionKind::Income
    } else {
        TransactionKind::Expense
    };

    let fee_payment = confirmed
        .member_id
        .and(confirmed.fee_id)
        .map(|fee_id| FeePayment {
            fee_id,
            paid_date: transaction.date,
        });

    LedgerEntry {
        date: transaction.date,
        kind,
        category: category(kind, transaction, classifier),
        amount: transaction.amount.abs(),
        description: transaction.description.clone(),
        counterparty: non_empty(&transaction.counterparty),
        bank_reference: non_empty(&transaction.bank_reference),
        import_source: transaction.source,
        member_id: confirmed.member_id,
        confidence: confirmed.recorded_confidence(),
        fee_payment,
    }
}

fn category(
    kind: TransactionKind,
    transaction: &RawTransaction,
    classifier: &KeywordClassifier,
) -> TransactionCategory {
    if kind == TransactionKind::Expense {
        return TransactionCategory::OtherExpense;
    }
    let text = format!("{} {}", transaction.description, transaction.counterparty);
    if classifier.is_likely_donation(&text) && !classifier.is_likely_fee_payment(&text) {
        TransactionCategory::Donations
    } else {
        TransactionCategory::Fees
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
