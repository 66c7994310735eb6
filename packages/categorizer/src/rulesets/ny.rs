use super::{compile, Row};
use crate::categorizer::Categorizer;
use crate::error::Result;
use crate::hooks::{CollapseWhitespace, ExpandAbbreviations};

const ROWS: &[Row] = &[
    // Floor passage
    (r"(?i)^(RE)?PASSED", &["passage"]),
    (r"(?i)^ADOPTED", &["passage"]),
    // Amendments
    (r"(?i)AMENDED (?P<bill_id>\d+)", &["amendment-passage"]),
    (
        r"(?i)AMEND AND RECOMMIT TO (?P<committees>.+)",
        &["amendment-passage", "referral-committee"],
    ),
    (
        r"(?i)amend .+? and recommit to (?P<committees>.+)",
        &["amendment-passage", "referral-committee"],
    ),
    (
        r"(?i)AMENDED ON THIRD READING (\(T\) )?(?P<bill_id>.+)",
        &["amendment-passage"],
    ),
    (r"(?i)print number (?P<bill_id>\d+)", &["amendment-passage"]),
    (r"(?i)tabled", &["amendment-deferral"]),
    // Committees
    (r"(?i)held .+? in (?P<committees>.+)", &["failure"]),
    (r"(?i)REFERRED TO (?P<committees>.+)", &["referral-committee"]),
    (r"(?i)reference changed to (?P<committees>.+)", &["referral-committee"]),
    (r"(?i) committed to (?P<committees>.+)", &["referral-committee"]),
    (r"(?i)^reported$", &[]),
    // Governor
    (r"(?i)signed chap.(?P<session_laws>\d+)", &["executive-signature"]),
    (r"(?i)vetoed memo.(?P<veto_memo>.+)", &["executive-veto"]),
    (r"(?i)DELIVERED TO GOVERNOR", &["executive-receipt"]),
    // Substitutions
    (r"(?i)substituted by (?P<bill_id>\w\d+)", &[]),
];

/// Committee short names used in the Assembly and Senate journals.
const COMMITTEES: &[(&str, &str)] = &[
    ("CODES", "Codes"),
    ("RULES", "Rules"),
    ("FINANCE", "Finance"),
    ("JUDICIARY", "Judiciary"),
    ("WAYS AND MEANS", "Ways and Means"),
    ("HIGHER EDUCATION", "Higher Education"),
    ("LOCAL GOVERNMENT", "Local Government"),
    ("INVESTIGATIONS AND GOVERNMENT OPERATIONS", "Investigations and Government Operations"),
    ("CORPORATIONS, AUTHORITIES AND COMMISSIONS", "Corporations, Authorities and Commissions"),
];

pub(super) fn categorizer() -> Result<Categorizer> {
    Ok(Categorizer::new(compile(ROWS)?)
        .with_hook(CollapseWhitespace)
        .with_hook(ExpandAbbreviations::new(
            "committees",
            COMMITTEES.iter().copied(),
        )))
}
