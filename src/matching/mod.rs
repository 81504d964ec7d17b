mod confidence;
mod keywords;
mod matcher;
mod model;
mod suggest;

pub use confidence::ConfidencePolicy;
pub use keywords::KeywordClassifier;
pub use matcher::Matcher;
pub use model::{
    ConfidenceTier, FeeId, MatchProposal, MatchStrategy, Member, MemberId, OpenFee, Suggestion,
};
pub use suggest::{MatchReason, MemberSuggestion, suggest_members};
