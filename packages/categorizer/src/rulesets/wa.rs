use super::{compile, Row};
use crate::categorizer::Categorizer;
use crate::error::Result;
use crate::hooks::{KnownNames, SplitNames};

// http://www.leg.wa.gov/legislature/pages/committeelisting.aspx
const COMMITTEES: &[&str] = &[
    "Agriculture & Natural Resources",
    "Agriculture, Water & Rural Economic Development",
    "Business & Financial Services",
    "Capital Budget",
    "Community & Economic Development & Housing",
    "Early Learning & Human Services",
    "Economic Development, Trade & Innovation",
    "Education",
    "Energy, Natural Resources & Marine Waters",
    "Environment",
    "Financial Institutions, Housing & Insurance",
    "Government Operations, Tribal Relations & Elections",
    "Health & Human Services Appropriations & Oversight",
    "Health Care & Wellness",
    "Higher Education",
    "Higher Education & Workforce Development",
    "Human Services & Corrections",
    "Judiciary",
    "Labor & Workforce Development",
    "Labor, Commerce & Consumer Protection",
    "Local Government",
    "Public Safety & Emergency Preparedness",
    "State Government & Tribal Affairs",
    "Technology, Energy & Communications",
    "Transportation",
    "Ways & Means",
];

const ROWS: &[Row] = &[
    (
        r"yeas, (?P<yes_votes>\d+); nays, (?P<no_votes>\d+); absent, (?P<absent_voters>\d+); excused, (?P<excused_voters>\d+)",
        &[],
    ),
    (r"Committee on (?P<committees>.+?) at \d", &[]),
    (r"(?P<committees>.+?) relieved of further", &[]),
    (r"Passed to (?P<committees>.+?) for \S+ reading", &[]),
    (r"by (?P<committees>.+?) Committee", &[]),
    (r"^Adopted", &["passage"]),
    (r"^Introduced", &["introduction"]),
    (r"Third reading, adopted", &["reading-3", "passage"]),
    (r"Prefiled for introduction", &["filing"]),
    (r"amendment adopted", &["amendment-passage"]),
    (r"amendment not adopted", &["amendment-failure"]),
    (r"(?i)third reading, (?P<pass_fail>(passed|failed))", &["reading-3"]),
    (r"Read first time", &["reading-1"]),
    (r"(?i)first reading, referred to (?P<committees>.*)\.", &["reading-1"]),
    (r"(?i)And refer to (?P<committees>.*)", &["referral-committee"]),
    (r"(?i).* substitute bill substituted.*", &["substitution"]),
    (r"(?i)chapter (((\d+),?)+) \d+ laws.( .+)?", &[]),
    (r"(?i)effective date \d{1,2}/\d{1,2}/\d{4}.*", &[]),
    (
        r"(?i)(?P<committees>\w+) - majority; do pass with amendment\(s\) (but without amendments\(s\))?.*\.",
        &["committee-passage-favorable"],
    ),
    (
        r"(?i)Executive action taken in the (House|Senate) committee on (?P<committees>.*) (at)? .*\.",
        &[],
    ),
    (
        r"(?i)(?P<committees>\w+) - Majority; do pass .* \(Majority Report\)",
        &["passage"],
    ),
    (r"(?i)Conference committee appointed.", &[]),
    (r"(?i)Conference committee report;", &[]),
    (
        r"(?i).+ - Majority; \d+.+ substitute bill be substituted, do pass",
        &["passage"],
    ),
    (r"President signed", &["passage"]),
    (r"Speaker signed", &["passage"]),
    (
        r"(?i)Signed by (?P<signed_chamber>(Representatives|Senators)) (?P<legislators>.*)",
        &["passage"],
    ),
    (r"(?i)Referred to (?P<committees>.*)(\.)?", &[]),
    (
        r"(?i)(?P<from_committee>.*) relieved of further consideration. On motion, referred to (?P<committees>.*)",
        &["referral-committee"],
    ),
    (r"(?i)Governor partially vetoed", &["executive-veto-line-item"]),
    (r"(?i)Governor vetoed", &["executive-veto"]),
    (r"(?i)Governor signed", &["executive-signature"]),
    (r"(?i)Passed final passage;", &["passage"]),
    (r"(?i)Failed final passage;", &["failure"]),
    (r"Effective date", &["became-law"]),
    (r"Chapter .* Laws", &["became-law"]),
];

pub(super) fn categorizer() -> Result<Categorizer> {
    Ok(Categorizer::new(compile(ROWS)?)
        .with_hook(SplitNames::new("legislators"))
        .with_hook(KnownNames::new("committees", COMMITTEES.iter().copied())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::ActionType;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_roll_call_tally() {
        let result = categorizer()
            .unwrap()
            .categorize("Third reading, passed; yeas, 48; nays, 0; absent, 0; excused, 1.");
        assert_eq!(result.types, vec![ActionType::Reading3]);
        assert_eq!(result.attr("yes_votes"), vec!["48"]);
        assert_eq!(result.attr("no_votes"), vec!["0"]);
        assert_eq!(result.attr("excused_voters"), vec!["1"]);
        assert_eq!(result.attr("pass_fail"), vec!["passed"]);
    }

    #[test]
    fn test_known_committees_added() {
        let result = categorizer()
            .unwrap()
            .categorize("First reading, referred to Transportation.");
        assert!(result.has_type(ActionType::Reading1));
        assert!(result.attr("committees").contains(&"Transportation"));
    }

    #[test]
    fn test_signers_split() {
        let result = categorizer()
            .unwrap()
            .categorize("Signed by Representatives Chopp, Orwall and Lovick");
        assert_eq!(result.types, vec![ActionType::Passage]);
        assert_eq!(result.attr("signed_chamber"), vec!["Representatives"]);
        assert_eq!(
            result.attr("legislators"),
            vec!["Chopp", "Lovick", "Orwall"]
        );
    }

    #[test]
    fn test_governor_partial_veto() {
        let result = categorizer().unwrap().categorize("Governor partially vetoed.");
        assert_eq!(result.types, vec![ActionType::ExecutiveVetoLineItem]);
    }
}
