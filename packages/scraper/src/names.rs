//! Matching the many ways a legislator's name is written.
//!
//! Vote rolls and sponsor lists rarely use full names. A [`NameMatcher`]
//! learns every legislator of a term, generates the forms their names are
//! commonly written in ("Stephens, M", "M J Stephens", ...) and matches a
//! form only while it identifies a single legislator. A [`Roster`] keeps one
//! matcher per term, fed from saved legislator records.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::error::{Result, ScrapeError};
use crate::model::{Chamber, Person};

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static TITLE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Senator|Representative|Assembly(member|man|woman)) ").expect("valid regex")
});

/// Name parts of a legislator as scraped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegislatorName {
    pub full_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    /// Name exactly as listed on the legislature's site.
    pub scraped_name: Option<String>,
    /// Identifier some legislatures use in vote rolls.
    pub code: Option<String>,
}

impl From<&Person> for LegislatorName {
    fn from(person: &Person) -> Self {
        let extra = |key: &str| {
            person
                .extra
                .get(key)
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        };
        Self {
            full_name: person.full_name.clone(),
            first_name: person.first_name.clone(),
            middle_name: person.middle_name.clone(),
            last_name: person.last_name.clone(),
            scraped_name: extra("scraped_name"),
            code: extra("code"),
        }
    }
}

/// Names seen per chamber; `None` holds the cross-chamber view.
type Scoped<V> = BTreeMap<Option<Chamber>, HashMap<String, V>>;

/// Matches name forms to legislator ids for one term.
#[derive(Debug, Clone)]
pub struct NameMatcher<T> {
    term: String,
    /// `None` marks a form shared by more than one legislator.
    names: Scoped<Option<T>>,
    codes: Scoped<T>,
    manual: Scoped<T>,
}

/// Strip a leading title, fold compatibility characters, lowercase and
/// drop dots.
///
/// # Examples
/// ```
/// use billy_scraper::names::normalize;
///
/// assert_eq!(normalize("Senator Michael J. Stephens"), "michael j stephens");
/// assert_eq!(normalize("Assemblywoman Lee"), "lee");
/// ```
#[must_use]
pub fn normalize(name: &str) -> String {
    let stripped = TITLE_PREFIX.replace(name, "");
    stripped
        .nfkc()
        .collect::<String>()
        .trim()
        .to_lowercase()
        .replace('.', "")
}

/// All name forms for a legislator, normalized and deduplicated.
#[must_use]
pub fn name_forms(name: &LegislatorName) -> Vec<String> {
    let mut forms = vec![name.full_name.clone(), name.last_name.clone()];
    if let Some(scraped) = &name.scraped_name {
        forms.push(scraped.clone());
    }

    let (first, middle, last) = (&name.first_name, &name.middle_name, &name.last_name);
    if let Some(fi) = first.chars().next() {
        forms.extend([
            format!("{last}, {first}"),
            format!("{first} {last}"),
            format!("{last}, {fi}"),
            format!("{last} ({first})"),
            format!("{fi} {last}"),
            format!("{last} ({fi})"),
        ]);

        if let Some(mi) = middle.chars().next() {
            forms.extend([
                format!("{last}, {first} {middle}"),
                format!("{last}, {fi} {middle}"),
                format!("{first} {middle} {last}"),
                format!("{last}, {fi} {mi}"),
                format!("{first} {mi} {last}"),
                format!("{last}, {first} {mi}"),
                format!("{last}, {fi}.{mi}."),
            ]);
        }
    }

    let mut forms: Vec<String> = forms
        .iter()
        .map(|f| normalize(f))
        .filter(|f| !f.is_empty())
        .collect();
    forms.sort();
    forms.dedup();
    forms
}

/// Joint and unspecified chambers search across both chambers.
fn scope(chamber: Option<Chamber>) -> Option<Chamber> {
    match chamber {
        Some(Chamber::Joint) | None => None,
        Some(c) => Some(c),
    }
}

impl<T: Clone + PartialEq> NameMatcher<T> {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            names: Scoped::new(),
            codes: Scoped::new(),
            manual: Scoped::new(),
        }
    }

    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Learn a legislator serving in `chamber`.
    ///
    /// Fails if the legislator's code was already taken by someone else.
    /// Learning the same id again changes nothing.
    pub fn learn(&mut self, name: &LegislatorName, chamber: Option<Chamber>, id: T) -> Result<()> {
        let chamber = scope(chamber);

        if let Some(code) = &name.code {
            let taken_by_other = |scope: &Option<Chamber>| {
                self.codes
                    .get(scope)
                    .and_then(|c| c.get(code))
                    .is_some_and(|owner| *owner != id)
            };
            let taken = taken_by_other(&chamber) || taken_by_other(&None);
            if taken {
                return Err(ScrapeError::DuplicateCode(code.clone()));
            }
            self.codes.entry(chamber).or_default().insert(code.clone(), id.clone());
            if chamber.is_some() {
                self.codes.entry(None).or_default().insert(code.clone(), id.clone());
            }
        }

        for form in name_forms(name) {
            add_form(self.names.entry(chamber).or_default(), &form, &id);
            if chamber.is_some() {
                add_form(self.names.entry(None).or_default(), &form, &id);
            }
        }
        Ok(())
    }

    /// Add a manual match; these win over everything learned.
    pub fn add_manual(&mut self, chamber: Option<Chamber>, name: impl Into<String>, id: T) {
        let name = name.into();
        let chamber = scope(chamber);
        if chamber.is_some() {
            self.manual.entry(None).or_default().insert(name.clone(), id.clone());
        }
        self.manual.entry(chamber).or_default().insert(name, id);
    }

    /// Id of the legislator uniquely matching `name`.
    ///
    /// Manual matches and codes are looked up verbatim before the
    /// normalized name forms.
    #[must_use]
    pub fn match_name(&self, name: &str, chamber: Option<Chamber>) -> Option<T> {
        let chamber = scope(chamber);

        if let Some(id) = self.manual.get(&chamber).and_then(|m| m.get(name)) {
            return Some(id.clone());
        }
        if let Some(id) = self.codes.get(&chamber).and_then(|c| c.get(name)) {
            return Some(id.clone());
        }
        self.names
            .get(&chamber)
            .and_then(|n| n.get(&normalize(name)))
            .and_then(Clone::clone)
    }
}

fn add_form<T: Clone + PartialEq>(names: &mut HashMap<String, Option<T>>, form: &str, id: &T) {
    names
        .entry(form.to_string())
        .and_modify(|existing| {
            if existing.as_ref() != Some(id) {
                *existing = None;
            }
        })
        .or_insert_with(|| Some(id.clone()));
}

/// Name matchers for every term, keyed by term name.
///
/// Ids are legislator record file names, e.g.
/// `2011-2012_upper_5_Joe Smith.json`.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    terms: BTreeMap<String, NameMatcher<String>>,
}

impl Roster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from written legislator records.
    ///
    /// Unreadable records and conflicting codes are logged and skipped.
    #[must_use]
    pub fn from_records(paths: &[PathBuf]) -> Self {
        let mut roster = Self::new();
        for path in paths {
            let Some(id) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let person = fs::read(path)
                .map_err(ScrapeError::from)
                .and_then(|bytes| serde_json::from_slice::<Person>(&bytes).map_err(ScrapeError::from));
            let learned = person.and_then(|person| roster.learn(&person, id));
            if let Err(e) = learned {
                tracing::warn!(path = %path.display(), error = %e, "Skipping legislator record");
            }
        }
        tracing::debug!(terms = roster.terms.len(), "Loaded roster");
        roster
    }

    /// Learn a person under every `member` role they hold.
    pub fn learn(&mut self, person: &Person, id: &str) -> Result<()> {
        let name = LegislatorName::from(person);
        for role in person.roles.iter().filter(|r| r.role == "member") {
            self.terms
                .entry(role.term.clone())
                .or_insert_with(|| NameMatcher::new(role.term.clone()))
                .learn(&name, role.chamber, id.to_string())?;
        }
        Ok(())
    }

    #[must_use]
    pub fn matcher(&self, term: &str) -> Option<&NameMatcher<String>> {
        self.terms.get(term)
    }

    /// Id of the legislator serving in `term` who uniquely matches `name`.
    #[must_use]
    pub fn match_name(&self, term: &str, name: &str, chamber: Option<Chamber>) -> Option<String> {
        self.terms.get(term)?.match_name(name, chamber)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl<T: Clone + PartialEq + From<String>> NameMatcher<T> {
    /// Read manual matches from headerless `term,chamber,name,id` CSV.
    ///
    /// Rows for other terms and rows without an id are ignored; a chamber
    /// other than `upper`/`lower` applies to both chambers. Returns the
    /// number of matches added.
    pub fn load_manual<R: Read>(&mut self, reader: R) -> Result<usize> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut added = 0;
        for record in reader.records() {
            let record = record?;
            let (Some(term), Some(chamber), Some(name), Some(id)) =
                (record.get(0), record.get(1), record.get(2), record.get(3))
            else {
                tracing::warn!(row = ?record, "Skipping short manual match row");
                continue;
            };
            if term != self.term || id.trim().is_empty() {
                continue;
            }
            let chamber = chamber.parse::<Chamber>().ok();
            self.add_manual(chamber, name, T::from(id.to_string()));
            added += 1;
        }
        Ok(added)
    }

    /// Read manual matches from a file. A missing file adds nothing.
    pub fn load_manual_file(&mut self, path: &Path) -> Result<usize> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No manual matches");
            return Ok(0);
        }
        let added = self.load_manual(File::open(path)?)?;
        tracing::debug!(path = %path.display(), added, "Loaded manual matches");
        Ok(added)
    }
}
