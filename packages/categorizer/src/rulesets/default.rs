use super::{compile, Row};
use crate::categorizer::Categorizer;
use crate::error::Result;
use crate::hooks::{CollapseWhitespace, SplitNames};
use crate::rule::Rule;
use crate::taxonomy::ActionType;

const ROWS: &[Row] = &[
    // Filing and introduction
    (r"(?i)^(introduced|introduction)", &["introduction"]),
    (r"(?i)(prefiled|prefile released|filed for introduction)", &["filing"]),
    // Readings
    (r"(?i)(read (the )?first time|first reading)", &["reading-1"]),
    (r"(?i)(read (the )?second time|second reading)", &["reading-2"]),
    (r"(?i)(read (the )?third time|third reading)", &["reading-3"]),
    // Committees
    (
        r"(?i)(re-?)?referred to (the )?(committee on )?(?P<committees>[^.;]+)",
        &["referral-committee"],
    ),
    (r"(?i)do not pass", &["committee-failure"]),
    (r"(?i)\bdo pass", &["committee-passage", "committee-passage-favorable"]),
    (r"(?i)reported (out )?(un)?favorabl", &["committee-passage"]),
    // Amendments
    (r"(?i)amendment.* (offered|introduced)", &["amendment-introduction"]),
    (r"(?i)amendment.* adopted", &["amendment-passage"]),
    (r"(?i)amendment.* (failed|rejected|not adopted)", &["amendment-failure"]),
    (r"(?i)amendment.* withdrawn", &["amendment-withdrawal"]),
    // Floor
    (r"(?i)(^passed|passed (the )?(house|senate|assembly)|final passage,? passed)", &["passage"]),
    (r"(?i)(^failed|failed (the )?(house|senate|assembly)|final passage,? failed)", &["failure"]),
    (r"(?i)^withdrawn", &["withdrawal"]),
    (r"(?i)substitute.* substituted", &["substitution"]),
    (r"(?i)\btabled", &["deferral"]),
    // Executive
    (r"(?i)(transmitted|delivered|presented|sent) to (the )?governor", &["executive-receipt"]),
    (
        r"(?i)((signed|approved) by (the )?governor|governor signed|signed into law)",
        &["executive-signature"],
    ),
    (r"(?i)(vetoed by (the )?governor|governor vetoed)", &["executive-veto"]),
    (r"(?i)veto overridden", &["veto-override-passage"]),
    (r"(?i)veto sustained", &["veto-override-failure"]),
    (
        r"(?i)(became law|law without (the )?(governor's )?signature|chapter (?P<session_laws>\d+))",
        &["became-law"],
    ),
    // Tallies
    (
        r"(?i)(yeas|ayes)[:,]? (?P<yes_votes>\d+)[;,]? (nays|noes)[:,]? (?P<no_votes>\d+)",
        &[],
    ),
];

pub(super) fn categorizer() -> Result<Categorizer> {
    // Partial vetoes must not also count as full vetoes.
    let line_item = Rule::new(r"(?i)(line.item veto|partially vetoed)")?
        .with_types([ActionType::ExecutiveVetoLineItem])
        .stop();

    let mut rules = vec![line_item];
    rules.extend(compile(ROWS)?);

    Ok(Categorizer::new(rules)
        .with_hook(CollapseWhitespace)
        .with_hook(SplitNames::punctuated("committees")))
}
