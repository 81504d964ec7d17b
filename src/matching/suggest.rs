use serde::{Deserialize, Serialize};

use super::model::{Member, MemberId};
use crate::types::RawTransaction;

const MEMBER_NUMBER_SCORE: u32 = 100;
const LAST_NAME_SCORE: u32 = 50;
const FIRST_NAME_SCORE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    MemberNumber,
    LastName,
    FirstName,
}

/// A ranked candidate for manually matching a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSuggestion {
    pub member_id: MemberId,
    pub member_name: String,
    pub score: u32,
    pub reasons: Vec<MatchReason>,
}

/// Ranks members whose number or names appear in the transaction text, for
/// the manual-match picker. Ties keep member order.
pub fn suggest_members(
    transaction: &RawTransaction,
    members: &[Member],
    limit: usize,
) -> Vec<MemberSuggestion> {
    let text = format!("{} {}", transaction.description, transaction.counterparty).to_lowercase();
    let found = |needle: &str| {
        let needle = needle.trim().to_lowercase();
        !needle.is_empty() && text.contains(&needle)
    };

    let mut suggestions: Vec<MemberSuggestion> = members
        .iter()
        .filter_map(|member| {
            let mut reasons = Vec::new();
            if member.member_number.as_deref().is_some_and(found) {
                reasons.push(MatchReason::MemberNumber);
            }
            if found(&member.last_name) {
                reasons.push(MatchReason::LastName);
            }
            if found(&member.first_name) {
                reasons.push(MatchReason::FirstName);
            }

            let score = reasons
                .iter()
                .map(|reason| match reason {
                    MatchReason::MemberNumber => MEMBER_NUMBER_SCORE,
                    MatchReason::LastName => LAST_NAME_SCORE,
                    MatchReason::FirstName => FIRST_NAME_SCORE,
                })
                .sum();

            (score > 0).then(|| MemberSuggestion {
                member_id: member.id,
                member_name: member.full_name(),
                score,
                reasons,
            })
        })
        .collect();

    suggestions.sort_by(|a, b| b.score.cmp(&a.score));
    suggestions.truncate(limit);
    suggestions
}
