//! Owned application state and the case-table queries built on it.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Days, NaiveDate};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::billing::{BillingEntry, DEFAULT_SERVICE_TYPES};
use crate::category::{Category, Classifier};
use crate::documents::DocumentRecord;
use crate::error::{CoreError, Result};
use crate::import::parse_cases;
use crate::notes::{DossierEntry, Note, Reminder};
use crate::record::{CaseRecord, DEFAULT_CAUSELIST_COLUMNS, DisplayRow, display_rows};
use crate::settings::Settings;

/// Stage keywords that flag a matter as critical today.
pub const CRITICAL_STAGES: &str = "argument|evidence|order|judgment|hearing";

/// Stage filters of the 30-day dashboard overview, as `(title, pattern)`.
pub const OVERVIEW_FILTERS: &[(&str, Option<&str>)] = &[
    ("All Hearings", None),
    ("Written Statement", Some("written statement")),
    ("Evidence / Cross Examination", Some("evidence|cross")),
    ("Arguments", Some("argument")),
    ("Orders", Some("order")),
    ("Judgments", Some("judgment")),
];

const OVERVIEW_DAYS: u64 = 30;
const TOP_STAGES: usize = 10;

/// Everything one user's session holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppState {
    pub cases: Vec<CaseRecord>,
    pub case_notes: BTreeMap<String, Vec<Note>>,
    pub case_dossiers: BTreeMap<String, Vec<DossierEntry>>,
    pub case_papers: BTreeMap<String, Vec<DocumentRecord>>,
    pub pinned_cases: BTreeSet<String>,
    pub reminders: Vec<Reminder>,
    pub billing_entries: Vec<BillingEntry>,
    pub service_types: Vec<String>,
    pub causelist_columns: Vec<String>,
    pub last_sync_date: Option<NaiveDate>,
    pub settings: Settings,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            cases: Vec::new(),
            case_notes: BTreeMap::new(),
            case_dossiers: BTreeMap::new(),
            case_papers: BTreeMap::new(),
            pinned_cases: BTreeSet::new(),
            reminders: Vec::new(),
            billing_entries: Vec::new(),
            service_types: DEFAULT_SERVICE_TYPES.iter().map(|s| s.to_string()).collect(),
            causelist_columns: default_columns(),
            last_sync_date: None,
            settings: Settings::default(),
        }
    }
}

pub fn default_columns() -> Vec<String> {
    DEFAULT_CAUSELIST_COLUMNS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// One category's block of a cause list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CauseListSection {
    pub category: Category,
    pub rows: Vec<DisplayRow>,
}

/// Direction for [`AppState::move_column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
}

impl AppState {
    pub fn classifier(&self) -> Classifier {
        Classifier::with_thresholds(self.settings.thresholds)
    }

    /// Replace the case table with the contents of an export file.
    ///
    /// On failure the current table is left untouched.
    pub fn load_cases(&mut self, bytes: &[u8]) -> Result<usize> {
        let cases = parse_cases(bytes)?;
        let count = cases.len();
        self.cases = cases;
        info!(count, "loaded cases");
        Ok(count)
    }

    pub fn find_case(&self, cino: &str) -> Option<&CaseRecord> {
        self.cases.iter().find(|c| c.cino.as_deref() == Some(cino))
    }

    pub(crate) fn require_case(&self, cino: &str) -> Result<&CaseRecord> {
        self.find_case(cino)
            .ok_or_else(|| CoreError::UnknownCase(cino.to_string()))
    }

    /// Classify records into display rows using this session's thresholds.
    pub fn display<'a>(&self, records: impl IntoIterator<Item = &'a CaseRecord>) -> Vec<DisplayRow> {
        display_rows(records, &self.classifier())
    }

    pub fn cases_on(&self, date: NaiveDate) -> Vec<&CaseRecord> {
        self.cases
            .iter()
            .filter(|c| c.date_next_list == Some(date))
            .collect()
    }

    /// Cases listed on `date`, grouped by category in print order.
    /// Categories with no cases are left out.
    pub fn cause_list(&self, date: NaiveDate) -> Vec<CauseListSection> {
        let rows = self.display(self.cases_on(date));
        Category::ALL
            .into_iter()
            .filter_map(|category| {
                let rows: Vec<DisplayRow> = rows
                    .iter()
                    .filter(|r| r.category == category)
                    .cloned()
                    .collect();
                (!rows.is_empty()).then_some(CauseListSection { category, rows })
            })
            .collect()
    }

    /// Hearings in the next 30 days, optionally filtered by a stage pattern.
    ///
    /// The pattern is a case-insensitive regular expression over the stage.
    pub fn next_30_days(&self, today: NaiveDate, stage: Option<&str>) -> Result<Vec<DisplayRow>> {
        let end = today
            .checked_add_days(Days::new(OVERVIEW_DAYS))
            .unwrap_or(NaiveDate::MAX);
        let re = stage
            .map(|p| RegexBuilder::new(p).case_insensitive(true).build())
            .transpose()?;
        let hits = self.cases.iter().filter(|c| {
            let in_range = c.date_next_list.is_some_and(|d| d >= today && d <= end);
            let stage_ok = match &re {
                None => true,
                Some(re) => c.purpose_name.as_deref().is_some_and(|p| re.is_match(p)),
            };
            in_range && stage_ok
        });
        Ok(self.display(hits))
    }

    /// Today's matters at a decisive stage.
    pub fn critical_today(&self, today: NaiveDate) -> Vec<DisplayRow> {
        let re = RegexBuilder::new(CRITICAL_STAGES)
            .case_insensitive(true)
            .build();
        let Ok(re) = re else {
            return Vec::new();
        };
        let hits = self.cases_on(today).into_iter().filter(|c| {
            c.purpose_name
                .as_deref()
                .is_some_and(|p| re.is_match(p))
        });
        self.display(hits)
    }

    /// Optional hearing-date filter plus a case-insensitive text match.
    pub fn search(&self, date: Option<NaiveDate>, term: Option<&str>) -> Vec<&CaseRecord> {
        let needle = term
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());
        self.cases
            .iter()
            .filter(|c| date.is_none_or(|d| c.date_next_list == Some(d)))
            .filter(|c| needle.as_deref().is_none_or(|n| c.matches_text(n)))
            .collect()
    }

    /// Cases with a next hearing, earliest first.
    pub fn calendar(&self) -> Vec<&CaseRecord> {
        let mut out: Vec<&CaseRecord> = self
            .cases
            .iter()
            .filter(|c| c.date_next_list.is_some())
            .collect();
        out.sort_by_key(|c| c.date_next_list);
        out
    }

    /// All cases in registration order (year, then number).
    pub fn master_list(&self) -> Vec<&CaseRecord> {
        let mut out: Vec<&CaseRecord> = self.cases.iter().collect();
        out.sort_by_cached_key(|c| c.registration_key());
        out
    }

    // ── Pinning ──

    pub fn pin(&mut self, cino: &str) -> Result<bool> {
        self.require_case(cino)?;
        Ok(self.pinned_cases.insert(cino.to_string()))
    }

    pub fn unpin(&mut self, cino: &str) -> bool {
        self.pinned_cases.remove(cino)
    }

    /// Pinned cases that are still loaded.
    pub fn pinned(&self) -> Vec<&CaseRecord> {
        self.pinned_cases
            .iter()
            .filter_map(|c| self.find_case(c))
            .collect()
    }

    // ── Analytics ──

    pub fn cases_per_court(&self) -> Vec<(String, usize)> {
        value_counts(self.cases.iter().map(|c| c.court_no_desg_name.as_deref()))
    }

    pub fn top_stages(&self) -> Vec<(String, usize)> {
        let mut counts = value_counts(self.cases.iter().map(|c| c.purpose_name.as_deref()));
        counts.truncate(TOP_STAGES);
        counts
    }

    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        self.classifier().category_counts(&self.cases)
    }

    // ── Cause-list column configuration ──

    pub fn set_columns(&mut self, columns: Vec<String>) -> Result<()> {
        let columns: Vec<String> = columns
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if columns.is_empty() {
            return Err(CoreError::invalid("Select at least one column."));
        }
        self.causelist_columns = columns;
        Ok(())
    }

    pub fn move_column(&mut self, index: usize, direction: Move) -> Result<()> {
        let len = self.causelist_columns.len();
        let target = match direction {
            Move::Up if index > 0 && index < len => index - 1,
            Move::Down if index + 1 < len => index + 1,
            _ => {
                return Err(CoreError::invalid(format!(
                    "Column #{index} cannot move {direction:?}"
                )));
            }
        };
        self.causelist_columns.swap(index, target);
        Ok(())
    }

    pub fn reset_columns(&mut self) {
        self.causelist_columns = default_columns();
    }
}

/// Count non-missing values, most frequent first, ties alphabetical.
fn value_counts<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values.flatten() {
        *counts.entry(v).or_default() += 1;
    }
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, n)| (k.to_string(), n))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}
