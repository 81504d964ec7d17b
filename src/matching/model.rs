use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::RawTransaction;

pub type MemberId = i64;
pub type FeeId = i64;

/// Read-only snapshot of an active member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    #[serde(default)]
    pub member_number: Option<String>,
    pub last_name: String,
    pub first_name: String,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Read-only snapshot of a pending or overdue fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenFee {
    pub id: FeeId,
    pub member_id: MemberId,
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
    #[default]
    None,
}

impl ConfidenceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::Low => "low",
            ConfidenceTier::None => "none",
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfidenceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(ConfidenceTier::High),
            "medium" => Ok(ConfidenceTier::Medium),
            "low" => Ok(ConfidenceTier::Low),
            "none" | "" => Ok(ConfidenceTier::None),
            other => Err(format!("unknown confidence tier {other:?}")),
        }
    }
}

/// Which evidence selected the member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    MemberNumber,
    LastName,
    Amount,
}

/// A proposed member, and possibly one of their fees, for a transaction.
///
/// Only the matcher builds these, so `confidence_tier` is never
/// [`ConfidenceTier::None`] and `fee_id` always belongs to `member_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(rename = "suggested_member_id")]
    pub member_id: MemberId,
    #[serde(rename = "suggested_member_name")]
    pub member_name: String,
    #[serde(rename = "suggested_fee_id", default)]
    pub fee_id: Option<FeeId>,
    pub confidence_tier: ConfidenceTier,
    pub strategy: MatchStrategy,
}

/// A parsed transaction annotated for human confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchProposal {
    #[serde(flatten)]
    pub transaction: RawTransaction,
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
}

impl MatchProposal {
    pub fn unmatched(transaction: RawTransaction) -> Self {
        Self {
            transaction,
            suggestion: None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.suggestion.is_some()
    }

    pub fn confidence_tier(&self) -> ConfidenceTier {
        self.suggestion
            .as_ref()
            .map_or(ConfidenceTier::None, |s| s.confidence_tier)
    }

    pub fn suggested_member_id(&self) -> Option<MemberId> {
        self.suggestion.as_ref().map(|s| s.member_id)
    }

    pub fn suggested_fee_id(&self) -> Option<FeeId> {
        self.suggestion.as_ref().and_then(|s| s.fee_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionSource;
    use rstest::rstest;

    fn transaction() -> RawTransaction {
        RawTransaction {
            date: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            amount: Decimal::new(15000, 2),
            description: "skladka nr 5".to_string(),
            counterparty: "Jan Kowalski".to_string(),
            bank_reference: "SANT0001".to_string(),
            source: TransactionSource::Mt940,
        }
    }

    #[rstest]
    #[case("Jan", "Kowalski", "Jan Kowalski")]
    #[case(" Anna ", "Nowak ", "Anna Nowak")]
    #[case("", "Nowak", "Nowak")]
    fn test_full_name(#[case] first: &str, #[case] last: &str, #[case] expected: &str) {
        let member = Member {
            id: 1,
            member_number: None,
            last_name: last.to_string(),
            first_name: first.to_string(),
        };
        assert_eq!(member.full_name(), expected);
    }

    #[rstest]
    #[case(ConfidenceTier::High, "high")]
    #[case(ConfidenceTier::Medium, "medium")]
    #[case(ConfidenceTier::Low, "low")]
    #[case(ConfidenceTier::None, "none")]
    fn test_confidence_tier_strings(#[case] tier: ConfidenceTier, #[case] s: &str) {
        assert_eq!(tier.to_string(), s);
        assert_eq!(s.parse::<ConfidenceTier>().unwrap(), tier);
        assert_eq!(serde_json::to_string(&tier).unwrap(), format!("\"{s}\""));
    }

    #[test]
    fn test_confidence_tier_unknown() {
        assert!("certain".parse::<ConfidenceTier>().is_err());
    }

    #[test]
    fn test_unmatched_proposal() {
        let proposal = MatchProposal::unmatched(transaction());
        assert!(!proposal.is_matched());
        assert_eq!(proposal.confidence_tier(), ConfidenceTier::None);
        assert_eq!(proposal.suggested_member_id(), None);
        assert_eq!(proposal.suggested_fee_id(), None);

        let json = serde_json::to_value(&proposal).unwrap();
        assert!(json.get("suggested_member_id").is_none());
        assert_eq!(json["description"], "skladka nr 5");
    }

    #[test]
    fn test_matched_proposal_serializes_flat() {
        let proposal = MatchProposal {
            transaction: transaction(),
            suggestion: Some(Suggestion {
                member_id: 5,
                member_name: "Jan Kowalski".to_string(),
                fee_id: Some(42),
                confidence_tier: ConfidenceTier::High,
                strategy: MatchStrategy::MemberNumber,
            }),
        };

        let json = serde_json::to_value(&proposal).unwrap();
        assert_eq!(json["suggested_member_id"], 5);
        assert_eq!(json["suggested_member_name"], "Jan Kowalski");
        assert_eq!(json["suggested_fee_id"], 42);
        assert_eq!(json["confidence_tier"], "high");
        assert_eq!(json["strategy"], "member_number");
        assert_eq!(json["source"], "mt940");

        let back: MatchProposal = serde_json::from_value(json).unwrap();
        assert_eq!(back, proposal);
    }
}
