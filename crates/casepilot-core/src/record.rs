//! Typed case records and their derived display columns.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::category::{Category, Classifier};
use crate::dates::format_date;
use crate::sort_key::registration_key;

/// The fixed column schema of a court-case export.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "cino",
    "type_name",
    "case_no",
    "reg_no",
    "reg_year",
    "petparty_name",
    "resparty_name",
    "date_last_list",
    "date_next_list",
    "purpose_name",
    "disp_name",
    "establishment_name",
    "court_no_desg_name",
];

/// Derived column names understood by [`DisplayRow::cell`].
pub mod columns {
    pub const PREVIOUS_DATE: &str = "Previous Date";
    pub const NEXT_DATE: &str = "Next Date";
    pub const CASE_NUMBER: &str = "Case Number/Year";
    pub const PARTIES: &str = "Parties";
    pub const STAGE: &str = "Stage Today";
    pub const TYPE: &str = "Type";
    pub const CATEGORY: &str = "Category";
    pub const COURT_HALL: &str = "Court Hall";
}

/// Default column selection for cause-list exports.
pub const DEFAULT_CAUSELIST_COLUMNS: &[&str] = &[
    columns::PREVIOUS_DATE,
    "court_no_desg_name",
    columns::TYPE,
    columns::CASE_NUMBER,
    columns::PARTIES,
    columns::STAGE,
    columns::NEXT_DATE,
];

/// Columns shown on a printed cause list, with the court renamed to "Court Hall".
pub const CAUSE_LIST_COLUMNS: &[&str] = &[
    columns::PREVIOUS_DATE,
    columns::COURT_HALL,
    columns::TYPE,
    columns::CASE_NUMBER,
    columns::PARTIES,
    columns::STAGE,
    columns::NEXT_DATE,
];

/// Columns of the 30-day dashboard overview.
pub const OVERVIEW_COLUMNS: &[&str] = &[
    columns::NEXT_DATE,
    columns::CASE_NUMBER,
    columns::PARTIES,
    columns::STAGE,
    columns::CATEGORY,
];

/// One case from a court export.
///
/// Every text field may be missing; `None` is the only "absent" value, empty
/// strings are normalised away on import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseRecord {
    pub cino: Option<String>,
    pub type_name: Option<String>,
    pub case_no: Option<String>,
    pub reg_no: Option<String>,
    pub reg_year: Option<String>,
    pub petparty_name: Option<String>,
    pub resparty_name: Option<String>,
    pub date_last_list: Option<NaiveDate>,
    pub date_next_list: Option<NaiveDate>,
    pub purpose_name: Option<String>,
    pub disp_name: Option<String>,
    pub establishment_name: Option<String>,
    pub court_no_desg_name: Option<String>,
}

fn text(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or("")
}

impl CaseRecord {
    pub fn cino(&self) -> &str {
        text(&self.cino)
    }

    /// `reg_no/reg_year`; missing halves render empty.
    pub fn case_number_year(&self) -> String {
        format!("{}/{}", text(&self.reg_no), text(&self.reg_year))
    }

    /// `petitioner v. respondent`.
    pub fn parties(&self) -> String {
        format!(
            "{} v. {}",
            text(&self.petparty_name),
            text(&self.resparty_name)
        )
    }

    /// Label used when picking a case: `cino - type - reg/year - parties`.
    pub fn label(&self) -> String {
        let case_type = self.type_name.as_deref().unwrap_or("N/A");
        let reg = match (&self.reg_no, &self.reg_year) {
            (Some(n), Some(y)) => format!("{n}/{y}"),
            _ => "N/A".to_string(),
        };
        format!(
            "{} - {} - {} - {}",
            self.cino(),
            case_type,
            reg,
            self.parties().trim()
        )
    }

    pub fn registration_key(&self) -> String {
        registration_key(self.reg_no.as_deref(), self.reg_year.as_deref())
    }

    /// Raw field by schema name. Dates use the display format.
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "cino" => self.cino.clone(),
            "type_name" => self.type_name.clone(),
            "case_no" => self.case_no.clone(),
            "reg_no" => self.reg_no.clone(),
            "reg_year" => self.reg_year.clone(),
            "petparty_name" => self.petparty_name.clone(),
            "resparty_name" => self.resparty_name.clone(),
            "date_last_list" => self.date_last_list.map(|d| format_date(Some(d))),
            "date_next_list" => self.date_next_list.map(|d| format_date(Some(d))),
            "purpose_name" => self.purpose_name.clone(),
            "disp_name" => self.disp_name.clone(),
            "establishment_name" => self.establishment_name.clone(),
            "court_no_desg_name" => self.court_no_desg_name.clone(),
            _ => None,
        }
    }

    /// All schema fields as `(name, value)` pairs, missing values as empty.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        REQUIRED_COLUMNS
            .iter()
            .map(|&name| (name, self.field(name).unwrap_or_default()))
            .collect()
    }

    /// Case-insensitive substring match across every field.
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        self.fields()
            .iter()
            .any(|(_, v)| v.to_lowercase().contains(needle_lower))
    }
}

/// A record paired with its computed category, ready for display or export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub record: CaseRecord,
    pub category: Category,
}

impl DisplayRow {
    pub fn new(record: CaseRecord, classifier: &Classifier) -> Self {
        let category = classifier.classify(&record);
        Self { record, category }
    }

    /// Value of a named column, derived or raw. Unknown columns are empty.
    pub fn cell(&self, column: &str) -> String {
        let r = &self.record;
        match column {
            columns::PREVIOUS_DATE => format_date(r.date_last_list),
            columns::NEXT_DATE => format_date(r.date_next_list),
            columns::CASE_NUMBER => r.case_number_year(),
            columns::PARTIES => r.parties(),
            columns::STAGE => text(&r.purpose_name).to_string(),
            columns::TYPE => text(&r.type_name).to_string(),
            columns::CATEGORY => self.category.label().to_string(),
            columns::COURT_HALL => text(&r.court_no_desg_name).to_string(),
            other => r.field(other).unwrap_or_default(),
        }
    }
}

/// Classify a slice of records into display rows, preserving order.
pub fn display_rows<'a>(
    records: impl IntoIterator<Item = &'a CaseRecord>,
    classifier: &Classifier,
) -> Vec<DisplayRow> {
    records
        .into_iter()
        .map(|r| DisplayRow::new(r.clone(), classifier))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CaseRecord {
        CaseRecord {
            cino: Some("KABC010012342019".into()),
            type_name: Some("O.S.".into()),
            reg_no: Some("1234".into()),
            reg_year: Some("2019".into()),
            petparty_name: Some("Ramesh".into()),
            resparty_name: Some("Suresh".into()),
            date_last_list: NaiveDate::from_ymd_opt(2024, 3, 1),
            date_next_list: NaiveDate::from_ymd_opt(2024, 3, 15),
            purpose_name: Some("Evidence".into()),
            court_no_desg_name: Some("XII Addl City Civil Judge".into()),
            ..Default::default()
        }
    }

    #[test]
    fn derived_columns() {
        let row = DisplayRow::new(sample(), &Classifier::default());
        assert_eq!(row.cell(columns::PREVIOUS_DATE), "01.03.2024");
        assert_eq!(row.cell(columns::NEXT_DATE), "15.03.2024");
        assert_eq!(row.cell(columns::CASE_NUMBER), "1234/2019");
        assert_eq!(row.cell(columns::PARTIES), "Ramesh v. Suresh");
        assert_eq!(row.cell(columns::STAGE), "Evidence");
        assert_eq!(row.cell(columns::COURT_HALL), "XII Addl City Civil Judge");
        assert_eq!(row.cell("court_no_desg_name"), "XII Addl City Civil Judge");
        assert_eq!(row.cell("no such column"), "");
    }

    #[test]
    fn missing_values_render_empty() {
        let row = DisplayRow::new(CaseRecord::default(), &Classifier::default());
        assert_eq!(row.cell(columns::CASE_NUMBER), "/");
        assert_eq!(row.cell(columns::PARTIES), " v. ");
        assert_eq!(row.cell(columns::NEXT_DATE), "");
        assert_eq!(row.cell("cino"), "");
    }

    #[test]
    fn label_uses_na_for_missing_parts() {
        assert_eq!(
            sample().label(),
            "KABC010012342019 - O.S. - 1234/2019 - Ramesh v. Suresh"
        );
        let bare = CaseRecord {
            cino: Some("X1".into()),
            ..Default::default()
        };
        assert_eq!(bare.label(), "X1 - N/A - N/A - v.");
    }

    #[test]
    fn text_match_is_case_insensitive() {
        let r = sample();
        assert!(r.matches_text("ramesh"));
        assert!(r.matches_text("15.03.2024"));
        assert!(!r.matches_text("mahesh"));
    }
}
