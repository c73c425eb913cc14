//! Cell text rules shared by the spreadsheet and PDF writers.

use casepilot_core::{Category, DisplayRow, columns};

/// Column that is always printed blank on cause lists.
pub const REDACTED_COLUMN: &str = columns::NEXT_DATE;

pub const MAX_CELL_CHARS: usize = 50;
const ELLIPSIS: &str = "...";

pub const FOOTNOTE_HEADING: &str = "Additional Category Notes:";
pub const FOOTNOTE: &str = "*Cases advanced/listed but not appearing in cause list; Certified copies, Compliance, Office cases, Client appearances, Follow-ups, etc.";

/// Cut text longer than 50 characters to 47 plus `...`.
pub fn truncate_cell(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_CHARS {
        return text.to_string();
    }
    let keep = MAX_CELL_CHARS - ELLIPSIS.len();
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Cell text as printed, with the redacted column blanked.
pub fn export_cell(row: &DisplayRow, column: &str) -> String {
    if column == REDACTED_COLUMN {
        return String::new();
    }
    row.cell(column)
}

/// `{label}_Cause_List_{category}` with `/` made file-safe.
pub fn cause_list_stem(label: &str, category: Category) -> String {
    format!("{label}_Cause_List_{}", category.file_stem())
}
