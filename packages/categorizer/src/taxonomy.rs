//! Normalized taxonomy of legislative action types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CategorizerError;

/// A normalized classification for a bill action.
///
/// The wire form is the kebab-case name returned by [`ActionType::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum ActionType {
    Introduction,
    Filing,
    Reading1,
    Reading2,
    Reading3,
    Passage,
    Failure,
    Withdrawal,
    Substitution,
    AmendmentIntroduction,
    AmendmentPassage,
    AmendmentFailure,
    AmendmentAmendment,
    AmendmentWithdrawal,
    AmendmentDeferral,
    Referral,
    ReferralCommittee,
    CommitteePassage,
    CommitteePassageFavorable,
    CommitteePassageUnfavorable,
    CommitteeFailure,
    ExecutiveReceipt,
    ExecutiveSignature,
    ExecutiveVeto,
    ExecutiveVetoLineItem,
    VetoOverridePassage,
    VetoOverrideFailure,
    BecameLaw,
    Deferral,
    Other,
}

impl ActionType {
    /// Every action type, in taxonomy order.
    pub const ALL: [ActionType; 30] = [
        Self::Introduction,
        Self::Filing,
        Self::Reading1,
        Self::Reading2,
        Self::Reading3,
        Self::Passage,
        Self::Failure,
        Self::Withdrawal,
        Self::Substitution,
        Self::AmendmentIntroduction,
        Self::AmendmentPassage,
        Self::AmendmentFailure,
        Self::AmendmentAmendment,
        Self::AmendmentWithdrawal,
        Self::AmendmentDeferral,
        Self::Referral,
        Self::ReferralCommittee,
        Self::CommitteePassage,
        Self::CommitteePassageFavorable,
        Self::CommitteePassageUnfavorable,
        Self::CommitteeFailure,
        Self::ExecutiveReceipt,
        Self::ExecutiveSignature,
        Self::ExecutiveVeto,
        Self::ExecutiveVetoLineItem,
        Self::VetoOverridePassage,
        Self::VetoOverrideFailure,
        Self::BecameLaw,
        Self::Deferral,
        Self::Other,
    ];

    /// Get the wire name of this action type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Introduction => "introduction",
            Self::Filing => "filing",
            Self::Reading1 => "reading-1",
            Self::Reading2 => "reading-2",
            Self::Reading3 => "reading-3",
            Self::Passage => "passage",
            Self::Failure => "failure",
            Self::Withdrawal => "withdrawal",
            Self::Substitution => "substitution",
            Self::AmendmentIntroduction => "amendment-introduction",
            Self::AmendmentPassage => "amendment-passage",
            Self::AmendmentFailure => "amendment-failure",
            Self::AmendmentAmendment => "amendment-amendment",
            Self::AmendmentWithdrawal => "amendment-withdrawal",
            Self::AmendmentDeferral => "amendment-deferral",
            Self::Referral => "referral",
            Self::ReferralCommittee => "referral-committee",
            Self::CommitteePassage => "committee-passage",
            Self::CommitteePassageFavorable => "committee-passage-favorable",
            Self::CommitteePassageUnfavorable => "committee-passage-unfavorable",
            Self::CommitteeFailure => "committee-failure",
            Self::ExecutiveReceipt => "executive-receipt",
            Self::ExecutiveSignature => "executive-signature",
            Self::ExecutiveVeto => "executive-veto",
            Self::ExecutiveVetoLineItem => "executive-veto-line-item",
            Self::VetoOverridePassage => "veto-override-passage",
            Self::VetoOverrideFailure => "veto-override-failure",
            Self::BecameLaw => "became-law",
            Self::Deferral => "deferral",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = CategorizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|t| t.as_str() == s)
            .copied()
            .ok_or_else(|| CategorizerError::UnknownActionType(s.to_string()))
    }
}

impl TryFrom<String> for ActionType {
    type Error = CategorizerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ActionType> for &'static str {
    fn from(value: ActionType) -> Self {
        value.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_types() {
        assert_eq!("reading-1".parse::<ActionType>().unwrap(), ActionType::Reading1);
        assert_eq!(
            "executive-veto-line-item".parse::<ActionType>().unwrap(),
            ActionType::ExecutiveVetoLineItem
        );
    }

    #[test]
    fn test_parse_unknown_type() {
        let err = "bill:introduced".parse::<ActionType>().unwrap_err();
        assert!(err.to_string().contains("bill:introduced"));
    }

    #[test]
    fn test_wire_names_are_unique() {
        let mut names: Vec<&str> = ActionType::ALL.iter().map(ActionType::as_str).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ActionType::ALL.len());
    }

    #[test]
    fn test_serde_uses_wire_name() {
        let json = serde_json::to_string(&ActionType::CommitteePassageFavorable).unwrap();
        assert_eq!(json, "\"committee-passage-favorable\"");

        let parsed: ActionType = serde_json::from_str("\"became-law\"").unwrap();
        assert_eq!(parsed, ActionType::BecameLaw);
    }
}
