use std::collections::{BTreeMap, HashMap};

use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::model::{
    ConfidenceTier, FeeId, MatchProposal, MatchStrategy, Member, MemberId, OpenFee, Suggestion,
};
use crate::{
    config::{MatchingConfig, compile_patterns},
    errors::ConfigError,
    types::RawTransaction,
};

/// Proposes a member, and possibly an open fee, for each incoming transaction.
///
/// Matching never fails: a transaction without evidence comes back with no
/// suggestion. Output order mirrors input order.
#[derive(Debug, Clone)]
pub struct Matcher {
    member_number_patterns: Vec<Regex>,
    min_last_name_len: usize,
    amount_tolerance: Decimal,
}

/// Lookups over one member/fee snapshot, built once per batch.
struct MemberIndex<'a> {
    members: HashMap<MemberId, &'a Member>,
    by_number: HashMap<&'a str, &'a Member>,
    by_last_name: BTreeMap<String, Vec<&'a Member>>,
    fees_by_member: HashMap<MemberId, Vec<&'a OpenFee>>,
    fees: &'a [OpenFee],
}

impl<'a> MemberIndex<'a> {
    fn build(members: &'a [Member], fees: &'a [OpenFee], min_last_name_len: usize) -> Self {
        let mut by_number = HashMap::new();
        let mut by_last_name: BTreeMap<String, Vec<&Member>> = BTreeMap::new();

        for member in members {
            if let Some(number) = member
                .member_number
                .as_deref()
                .map(str::trim)
                .filter(|number| !number.is_empty())
            {
                by_number.entry(number).or_insert(member);
            }

            let last_name = member.last_name.trim().to_lowercase();
            if last_name.chars().count() >= min_last_name_len {
                by_last_name.entry(last_name).or_default().push(member);
            }
        }

        let mut fees_by_member: HashMap<MemberId, Vec<&OpenFee>> = HashMap::new();
        for fee in fees {
            fees_by_member.entry(fee.member_id).or_default().push(fee);
        }
        for member_fees in fees_by_member.values_mut() {
            member_fees.sort_by_key(|fee| fee.due_date);
        }

        Self {
            members: members.iter().map(|m| (m.id, m)).collect(),
            by_number,
            by_last_name,
            fees_by_member,
            fees,
        }
    }

    fn fees_of(&self, member_id: MemberId) -> &[&'a OpenFee] {
        self.fees_by_member
            .get(&member_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl Matcher {
    pub fn new(config: &MatchingConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            member_number_patterns: compile_patterns(&config.member_number_patterns)?,
            min_last_name_len: config.min_last_name_len,
            amount_tolerance: config.amount_tolerance,
        })
    }

    pub fn match_transactions(
        &self,
        transactions: &[RawTransaction],
        members: &[Member],
        open_fees: &[OpenFee],
    ) -> Vec<MatchProposal> {
        let index = MemberIndex::build(members, open_fees, self.min_last_name_len);
        debug!(
            transactions = transactions.len(),
            members = members.len(),
            fees = open_fees.len(),
            "matching transactions"
        );

        transactions
            .iter()
            .map(|transaction| MatchProposal {
                suggestion: self.suggest(transaction, &index),
                transaction: transaction.clone(),
            })
            .collect()
    }

    fn suggest(&self, transaction: &RawTransaction, index: &MemberIndex<'_>) -> Option<Suggestion> {
        if !transaction.is_income() {
            return None;
        }

        let text = format!("{} {}", transaction.description, transaction.counterparty).to_lowercase();
        let amount = transaction.amount;

        let (member, tier, strategy) = self
            .by_member_number(&text, index)
            .map(|member| (member, ConfidenceTier::High, MatchStrategy::MemberNumber))
            .or_else(|| {
                self.by_last_name(&text, amount, index)
                    .map(|(member, tier)| (member, tier, MatchStrategy::LastName))
            })
            .or_else(|| {
                self.by_amount(amount, index)
                    .map(|member| (member, ConfidenceTier::Low, MatchStrategy::Amount))
            })?;

        trace!(
            member_id = member.id,
            tier = %tier,
            ?strategy,
            amount = %amount,
            "transaction matched"
        );

        Some(Suggestion {
            member_id: member.id,
            member_name: member.full_name(),
            fee_id: self.fee_for(member.id, amount, index),
            confidence_tier: tier,
            strategy,
        })
    }

    /// Patterns are tried in order and every capture of a pattern is tried left
    /// to right, so "nr 99 oraz nr 5" still finds member 5 when 99 is unknown.
    fn by_member_number<'a>(&self, text: &str, index: &MemberIndex<'a>) -> Option<&'a Member> {
        self.member_number_patterns.iter().find_map(|pattern| {
            pattern
                .captures_iter(text)
                .filter_map(|caps| caps.get(1))
                .find_map(|number| index.by_number.get(number.as_str()).copied())
        })
    }

    /// First last name (in lexicographic order) found in the text decides the
    /// group. A group member owing a fee of this amount wins at High, otherwise
    /// a sole member is Medium and a shared name falls back to first names.
    fn by_last_name<'a>(
        &self,
        text: &str,
        amount: Decimal,
        index: &MemberIndex<'a>,
    ) -> Option<(&'a Member, ConfidenceTier)> {
        let (_, group) = index
            .by_last_name
            .iter()
            .find(|(last_name, _)| text.contains(last_name.as_str()))?;

        let with_fee = group.iter().find(|member| {
            index
                .fees_of(member.id)
                .iter()
                .any(|fee| self.amounts_match(fee.amount, amount))
        });
        if let Some(member) = with_fee {
            return Some((*member, ConfidenceTier::High));
        }

        match group.as_slice() {
            [member] => Some((*member, ConfidenceTier::Medium)),
            [first, ..] => {
                let mut by_first_name = group.iter().filter(|member| {
                    let first_name = member.first_name.trim().to_lowercase();
                    !first_name.is_empty() && text.contains(&first_name)
                });
                match (by_first_name.next(), by_first_name.next()) {
                    (Some(member), None) => Some((*member, ConfidenceTier::Medium)),
                    _ => Some((*first, ConfidenceTier::Low)),
                }
            }
            [] => None,
        }
    }

    fn by_amount<'a>(&self, amount: Decimal, index: &MemberIndex<'a>) -> Option<&'a Member> {
        let mut candidates = index
            .fees
            .iter()
            .filter(|fee| self.amounts_match(fee.amount, amount));
        match (candidates.next(), candidates.next()) {
            (Some(fee), None) => index.members.get(&fee.member_id).copied(),
            _ => None,
        }
    }

    /// Earliest-due fee of the member whose amount matches; no near-miss is ever suggested.
    fn fee_for(&self, member_id: MemberId, amount: Decimal, index: &MemberIndex<'_>) -> Option<FeeId> {
        index
            .fees_of(member_id)
            .iter()
            .find(|fee| self.amounts_match(fee.amount, amount))
            .map(|fee| fee.id)
    }

    fn amounts_match(&self, a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < self.amount_tolerance
    }
}
