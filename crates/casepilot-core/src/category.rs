//! Rule-based court-tier classification for cases.
//!
//! Each case lands in one of three cause-list buckets. The decision table is
//! an ordered list of [`Rule`]s evaluated top to bottom; the first rule whose
//! [`Condition`] holds decides the [`Category`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::CaseRecord;

/// Court-tier bucket. Variant order is cause-list print order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// City civil, sessions, small causes, MACT.
    #[serde(rename = "CCC/S/SCCH/MACT")]
    CivilSessions,
    /// Metropolitan and judicial magistrates.
    #[serde(rename = "ACMM/ACJM/MMTC")]
    Magistrate,
    /// Family, Mayo Hall, commercial, consumer, DRT and outstation forums.
    #[serde(rename = "FC/MAYO/COM/CONS/DRT/OUT")]
    SpecialForum,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::CivilSessions,
        Category::Magistrate,
        Category::SpecialForum,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::CivilSessions => "CCC/S/SCCH/MACT",
            Self::Magistrate => "ACMM/ACJM/MMTC",
            Self::SpecialForum => "FC/MAYO/COM/CONS/DRT/OUT",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label.trim())
    }

    /// Label with `/` replaced, safe for file names.
    pub fn file_stem(&self) -> String {
        self.label().replace('/', "_")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Registration-number thresholds above which a case moves to the
/// special-forum bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub criminal_case: i64,
    pub criminal_appeal: i64,
    pub sessions_case: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            criminal_case: 50_000,
            criminal_appeal: 20_000,
            sessions_case: 15_000,
        }
    }
}

const CRIMINAL_CASE_TYPES: &[&str] = &["cc", "c.c", "crime", "criminal case"];
const CRIMINAL_APPEAL_TYPES: &[&str] = &["crl.a", "crl.rp", "crl.r.p"];
const SESSIONS_CASE_TYPES: &[&str] = &["s.c", "sc"];
const MAYO_COURTS: &[&str] = &["mayo", "mayohall"];
const COMMERCIAL_MARKERS: &[&str] = &["commercial", "com os", "com.os", "com ex", "com.ex"];
const MAGISTRATE_COURTS: &[&str] = &["magistrate"];
const CIVIL_SESSIONS_COURTS: &[&str] = &[
    "city civil",
    "sessions",
    "small causes",
    "scch",
    "mact",
    "rural",
];

/// Lower-cased text and parsed registration, computed once per record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facts {
    pub registration: Option<i64>,
    pub case_type: String,
    pub court_text: String,
    pub case_text: String,
}

impl Facts {
    pub fn from_record(r: &CaseRecord) -> Self {
        let t = |v: &Option<String>| v.as_deref().unwrap_or("").to_string();
        Self {
            registration: r.reg_no.as_deref().and_then(|s| s.trim().parse().ok()),
            case_type: t(&r.type_name).to_lowercase(),
            court_text: format!("{} {}", t(&r.establishment_name), t(&r.court_no_desg_name))
                .to_lowercase(),
            case_text: format!("{} {} {}", t(&r.case_no), t(&r.reg_no), t(&r.type_name))
                .to_lowercase(),
        }
    }
}

/// A predicate over [`Facts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Registration parsed, case type contains a keyword, and (if given)
    /// registration strictly above `above`.
    CaseTypeContains { keywords: Vec<String>, above: Option<i64> },
    /// Like `CaseTypeContains` but the case type must equal a keyword.
    CaseTypeIs { keywords: Vec<String>, above: Option<i64> },
    CourtContains(Vec<String>),
    CaseTextContains(Vec<String>),
    CaseTextStartsWith(String),
    Any(Vec<Condition>),
    Always,
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn above(registration: Option<i64>, threshold: Option<i64>) -> bool {
    match (registration, threshold) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(n), Some(t)) => n > t,
    }
}

impl Condition {
    pub fn holds(&self, f: &Facts) -> bool {
        match self {
            Self::CaseTypeContains { keywords, above: t } => {
                above(f.registration, *t) && keywords.iter().any(|k| f.case_type.contains(k))
            }
            Self::CaseTypeIs { keywords, above: t } => {
                above(f.registration, *t) && keywords.iter().any(|k| f.case_type == *k)
            }
            Self::CourtContains(words) => words.iter().any(|w| f.court_text.contains(w)),
            Self::CaseTextContains(words) => words.iter().any(|w| f.case_text.contains(w)),
            Self::CaseTextStartsWith(prefix) => f.case_text.starts_with(prefix.as_str()),
            Self::Any(conds) => conds.iter().any(|c| c.holds(f)),
            Self::Always => true,
        }
    }
}

/// One row of the decision table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub when: Condition,
    pub then: Category,
}

impl Rule {
    pub fn new(name: &str, when: Condition, then: Category) -> Self {
        Self {
            name: name.to_string(),
            when,
            then,
        }
    }
}

/// Which rule decided a record's category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision<'a> {
    pub rule: &'a str,
    pub category: Category,
}

/// Category used when no rule matches.
pub const FALLBACK: Category = Category::SpecialForum;

/// First-match classifier over an ordered rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::with_thresholds(Thresholds::default())
    }
}

impl Classifier {
    /// Build a classifier from an explicit rule list.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The court's decision table with the given registration thresholds.
    pub fn with_thresholds(t: Thresholds) -> Self {
        use Category::*;
        use Condition::*;

        let criminal = owned(CRIMINAL_CASE_TYPES);
        let appeal = owned(CRIMINAL_APPEAL_TYPES);
        let sessions = owned(SESSIONS_CASE_TYPES);

        let rules = vec![
            Rule::new(
                "criminal-case-above-threshold",
                CaseTypeContains { keywords: criminal.clone(), above: Some(t.criminal_case) },
                SpecialForum,
            ),
            Rule::new(
                "criminal-case",
                CaseTypeContains { keywords: criminal, above: None },
                Magistrate,
            ),
            Rule::new(
                "criminal-appeal-above-threshold",
                CaseTypeContains { keywords: appeal.clone(), above: Some(t.criminal_appeal) },
                SpecialForum,
            ),
            Rule::new(
                "criminal-appeal",
                CaseTypeContains { keywords: appeal, above: None },
                CivilSessions,
            ),
            Rule::new(
                "sessions-case-above-threshold",
                CaseTypeIs { keywords: sessions.clone(), above: Some(t.sessions_case) },
                SpecialForum,
            ),
            Rule::new(
                "sessions-case",
                CaseTypeIs { keywords: sessions, above: None },
                CivilSessions,
            ),
            Rule::new("mayo-hall", CourtContains(owned(MAYO_COURTS)), SpecialForum),
            Rule::new(
                "commercial",
                Any(vec![
                    CaseTextContains(owned(COMMERCIAL_MARKERS)),
                    CaseTextStartsWith("com".to_string()),
                ]),
                SpecialForum,
            ),
            Rule::new("magistrate", CourtContains(owned(MAGISTRATE_COURTS)), Magistrate),
            Rule::new(
                "civil-sessions-courts",
                CourtContains(owned(CIVIL_SESSIONS_COURTS)),
                CivilSessions,
            ),
            Rule::new("default", Always, FALLBACK),
        ];
        Self { rules }
    }

    /// Classify a record; see [`explain`](Self::explain) for the matching rule.
    pub fn classify(&self, record: &CaseRecord) -> Category {
        self.explain(record).category
    }

    /// Classify a record and name the rule that decided it.
    pub fn explain(&self, record: &CaseRecord) -> Decision<'_> {
        let facts = Facts::from_record(record);
        self.rules
            .iter()
            .find(|rule| rule.when.holds(&facts))
            .map(|rule| Decision {
                rule: &rule.name,
                category: rule.then,
            })
            .unwrap_or(Decision {
                rule: "fallback",
                category: FALLBACK,
            })
    }

    /// Count records per category. Every category is present, possibly at 0.
    pub fn category_counts<'a>(
        &self,
        records: impl IntoIterator<Item = &'a CaseRecord>,
    ) -> BTreeMap<Category, usize> {
        let mut counts: BTreeMap<Category, usize> =
            Category::ALL.into_iter().map(|c| (c, 0)).collect();
        for r in records {
            *counts.entry(self.classify(r)).or_default() += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(type_name: &str, reg_no: Option<&str>) -> CaseRecord {
        CaseRecord {
            type_name: Some(type_name.into()),
            reg_no: reg_no.map(Into::into),
            ..Default::default()
        }
    }

    fn court(type_name: &str, establishment: &str, court: &str) -> CaseRecord {
        CaseRecord {
            type_name: Some(type_name.into()),
            establishment_name: Some(establishment.into()),
            court_no_desg_name: Some(court.into()),
            ..Default::default()
        }
    }

    #[test]
    fn criminal_case_threshold() {
        let c = Classifier::default();
        for ty in ["CC", "C.C.", "Crime", "Criminal Case"] {
            for reg in [1, 49_999, 50_000] {
                let r = case(ty, Some(&reg.to_string()));
                assert_eq!(c.classify(&r), Category::Magistrate, "{ty} {reg}");
            }
            for reg in [50_001, 98_765] {
                let r = case(ty, Some(&reg.to_string()));
                assert_eq!(c.classify(&r), Category::SpecialForum, "{ty} {reg}");
            }
        }
    }

    #[test]
    fn criminal_appeal_threshold() {
        let c = Classifier::default();
        assert_eq!(c.classify(&case("CRL.A", Some("25000"))), Category::SpecialForum);
        assert_eq!(c.classify(&case("CRL.A", Some("15000"))), Category::CivilSessions);
        assert_eq!(c.classify(&case("Crl.R.P", Some("20000"))), Category::CivilSessions);
        assert_eq!(c.classify(&case("crl.rp", Some("20001"))), Category::SpecialForum);
    }

    #[test]
    fn sessions_case_needs_exact_type() {
        let c = Classifier::default();
        assert_eq!(c.classify(&case("S.C", Some("15001"))), Category::SpecialForum);
        assert_eq!(c.classify(&case("SC", Some("15000"))), Category::CivilSessions);
        // "sc" inside a longer type is not a sessions case.
        let r = case("S.C.SPL", Some("100"));
        assert_eq!(c.explain(&r).rule, "default");
    }

    #[test]
    fn signed_registration_counts_as_present() {
        let r = case("CC", Some(" -5 "));
        assert_eq!(Facts::from_record(&r).registration, Some(-5));
        let c = Classifier::default();
        let d = c.explain(&r);
        assert_eq!(d.rule, "criminal-case");
        assert_eq!(d.category, Category::Magistrate);
        assert_eq!(Facts::from_record(&case("CC", Some("+7"))).registration, Some(7));
    }

    #[test]
    fn explain_names_the_matching_rule() {
        let c = Classifier::default();
        assert_eq!(
            c.explain(&case("CC", Some("60000"))).rule,
            "criminal-case-above-threshold"
        );
        assert_eq!(c.explain(&case("CC", Some("10"))).rule, "criminal-case");
    }

    #[test]
    fn unparseable_registration_falls_through_to_text_rules() {
        let c = Classifier::default();
        let base = CaseRecord {
            type_name: Some("CC".into()),
            reg_no: Some("N/A".into()),
            court_no_desg_name: Some("XXV ACMM Magistrate".into()),
            ..Default::default()
        };
        let first = c.explain(&base);
        assert_eq!(first.rule, "magistrate");
        assert_eq!(first.category, Category::Magistrate);
        // Deterministic.
        assert_eq!(c.classify(&base), c.classify(&base.clone()));

        let missing = CaseRecord {
            reg_no: None,
            ..base
        };
        assert_eq!(c.explain(&missing).rule, "magistrate");
    }

    #[test]
    fn court_text_rules() {
        let c = Classifier::default();
        assert_eq!(
            c.classify(&court("O.S.", "Mayo Hall Unit", "XI Addl Judge")),
            Category::SpecialForum
        );
        assert_eq!(
            c.classify(&court("O.S.", "City Civil Court", "XII Addl Judge")),
            Category::CivilSessions
        );
        assert_eq!(
            c.classify(&court("M.V.C.", "Court of Small Causes", "SCCH 5")),
            Category::CivilSessions
        );
        assert_eq!(
            c.classify(&court("P.C.R.", "Chief Metropolitan Magistrate", "ACMM 3")),
            Category::Magistrate
        );
        // Family court: nothing matches, falls to default.
        let fam = court("M.C.", "Family Court", "Principal Judge");
        assert_eq!(c.explain(&fam).rule, "default");
        assert_eq!(c.classify(&fam), Category::SpecialForum);
    }

    #[test]
    fn mayo_beats_magistrate() {
        let c = Classifier::default();
        let r = court("P.C.R.", "Mayo Hall", "Magistrate Court");
        assert_eq!(c.explain(&r).rule, "mayo-hall");
    }

    #[test]
    fn commercial_case_text() {
        let c = Classifier::default();
        let r = CaseRecord {
            case_no: Some("COM OS 45".into()),
            court_no_desg_name: Some("City Civil".into()),
            ..Default::default()
        };
        assert_eq!(c.explain(&r).rule, "commercial");
        let r = CaseRecord {
            case_no: Some("com.ex 12".into()),
            ..Default::default()
        };
        assert_eq!(c.classify(&r), Category::SpecialForum);
    }

    #[test]
    fn custom_thresholds() {
        let c = Classifier::with_thresholds(Thresholds {
            criminal_case: 100,
            ..Thresholds::default()
        });
        assert_eq!(c.classify(&case("CC", Some("101"))), Category::SpecialForum);
        assert_eq!(c.classify(&case("CC", Some("100"))), Category::Magistrate);
    }

    #[test]
    fn empty_rule_list_uses_fallback() {
        let c = Classifier::new(Vec::new());
        let d = c.explain(&CaseRecord::default());
        assert_eq!(d.rule, "fallback");
        assert_eq!(d.category, FALLBACK);
    }

    #[test]
    fn counts_cover_every_category() {
        let c = Classifier::default();
        let records = vec![
            case("CC", Some("1")),
            case("CC", Some("2")),
            case("CRL.A", Some("1")),
        ];
        let counts = c.category_counts(&records);
        assert_eq!(counts[&Category::Magistrate], 2);
        assert_eq!(counts[&Category::CivilSessions], 1);
        assert_eq!(counts[&Category::SpecialForum], 0);
    }

    #[test]
    fn labels_round_trip() {
        for cat in Category::ALL {
            assert_eq!(Category::from_label(cat.label()), Some(cat));
        }
        assert_eq!(Category::SpecialForum.file_stem(), "FC_MAYO_COM_CONS_DRT_OUT");
        assert_eq!(Category::from_label("unknown"), None);
    }
}
