//! Spreadsheet exports.
//!
//! Sheets are first laid out as a [`SheetModel`] (rows of plain values plus
//! styling hints), then written with `rust_xlsxwriter`. The model is what the
//! width and redaction rules operate on.

use casepilot_core::{BillingEntry, Branding, DisplayRow, dates};
use rust_xlsxwriter::{Format, FormatAlign, Workbook};
use tracing::info;

use crate::error::{ExportError, Result};
use crate::layout::{FOOTNOTE, FOOTNOTE_HEADING, export_cell, truncate_cell};

const MAX_COLUMN_WIDTH: usize = 50;
const WIDTH_PADDING: usize = 5;
const A4: u8 = 9;
const CAUSE_LIST_FONT_SIZE: u32 = 20;
const FOOTER_FONT_SIZE: u32 = 18;

pub const BILLING_HEADERS: &[&str] = &[
    "Date",
    "Case",
    "Billing Category",
    "Description",
    "Fee Type",
    "Amount (INR)",
    "Time Spent (hours)",
];

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Blank,
}

impl CellValue {
    fn display_len(&self) -> usize {
        match self {
            Self::Text(s) => s.chars().count(),
            Self::Number(n) => n.to_string().len(),
            Self::Blank => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    /// Branded line merged across every column.
    Title,
    Header,
    Data,
    Footnote,
    /// Billing sheet cells: default font, wrapped top-left.
    Plain,
    Blank,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub style: RowStyle,
    pub cells: Vec<CellValue>,
}

impl SheetRow {
    fn blank() -> Self {
        Self {
            style: RowStyle::Blank,
            cells: Vec::new(),
        }
    }

    fn text(style: RowStyle, values: impl IntoIterator<Item = String>) -> Self {
        Self {
            style,
            cells: values.into_iter().map(CellValue::Text).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetModel {
    pub name: String,
    pub column_count: usize,
    pub rows: Vec<SheetRow>,
    pub column_widths: Vec<f64>,
    /// Font size for every cell; `None` keeps the workbook default.
    pub font_size: Option<u32>,
    /// Centred page footer, if any.
    pub footer: Option<String>,
}

impl SheetModel {
    /// Text of a cell, `None` for blanks and missing cells.
    pub fn text(&self, row: usize, col: usize) -> Option<&str> {
        match self.rows.get(row)?.cells.get(col)? {
            CellValue::Text(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

/// Auto width per column: longest non-empty cell, plus padding, capped at 50.
///
/// `floor` gives each column's starting length before cells are measured.
fn column_widths(rows: &[SheetRow], column_count: usize, floor: impl Fn(usize) -> usize) -> Vec<f64> {
    (0..column_count)
        .map(|col| {
            let longest = rows
                .iter()
                .filter_map(|r| r.cells.get(col))
                .map(CellValue::display_len)
                .fold(floor(col), usize::max);
            (longest + WIDTH_PADDING).min(MAX_COLUMN_WIDTH) as f64
        })
        .collect()
}

/// Lay out a cause-list sheet for `rows` and the selected `columns`.
pub fn cause_list_sheet(rows: &[DisplayRow], columns: &[String], branding: &Branding) -> Result<SheetModel> {
    if columns.is_empty() {
        return Err(ExportError::NoColumns);
    }
    let mut out = vec![
        SheetRow::text(RowStyle::Title, [branding.app_name.clone()]),
        SheetRow::text(RowStyle::Title, [branding.subtitle.clone()]),
        SheetRow::blank(),
        SheetRow::text(RowStyle::Header, columns.iter().cloned()),
    ];
    for row in rows {
        out.push(SheetRow {
            style: RowStyle::Data,
            cells: columns
                .iter()
                .map(|c| match export_cell(row, c) {
                    s if s.is_empty() => CellValue::Blank,
                    s => CellValue::Text(truncate_cell(&s)),
                })
                .collect(),
        });
    }
    out.push(SheetRow::blank());
    out.push(SheetRow::text(RowStyle::Footnote, [FOOTNOTE_HEADING.to_string()]));
    out.push(SheetRow::text(RowStyle::Footnote, [FOOTNOTE.to_string()]));

    let column_widths = column_widths(&out, columns.len(), |i| columns[i].chars().count() + 2);
    Ok(SheetModel {
        name: "CauseList".to_string(),
        column_count: columns.len(),
        rows: out,
        column_widths,
        font_size: Some(CAUSE_LIST_FONT_SIZE),
        footer: Some(format!("{} - {}", branding.app_name, branding.subtitle)),
    })
}

/// Lay out the billing sheet, one row per entry.
pub fn billing_sheet<'a>(entries: impl IntoIterator<Item = &'a BillingEntry>) -> SheetModel {
    let mut out = vec![SheetRow::text(
        RowStyle::Plain,
        BILLING_HEADERS.iter().map(|h| h.to_string()),
    )];
    for e in entries {
        out.push(SheetRow {
            style: RowStyle::Plain,
            cells: vec![
                CellValue::Text(dates::format_date(Some(e.date))),
                CellValue::Text(e.case.clone()),
                CellValue::Text(e.service_type.clone()),
                CellValue::Text(e.description.clone()),
                CellValue::Text(e.fee_type.as_str().to_string()),
                CellValue::Number(e.amount),
                CellValue::Number(e.time_spent),
            ],
        });
    }
    let column_widths = column_widths(&out, BILLING_HEADERS.len(), |_| 0);
    SheetModel {
        name: "Billing".to_string(),
        column_count: BILLING_HEADERS.len(),
        rows: out,
        column_widths,
        font_size: None,
        footer: None,
    }
}

/// Escape `&`, the control character of Excel header/footer strings.
fn footer_code(text: &str, font: &str, size: u32) -> String {
    format!("&C&\"{font}\"&{size}{}", text.replace('&', "&&"))
}

/// Serialise a sheet model to `.xlsx` bytes.
pub fn write_xlsx(model: &SheetModel) -> Result<Vec<u8>> {
    let big = |f: Format| match model.font_size {
        Some(size) => f.set_font_size(size),
        None => f,
    };
    let title = big(Format::new())
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap();
    let data = big(Format::new())
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::Top)
        .set_text_wrap();
    let footnote = data.clone().set_italic();

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(&model.name)?;

    let last_col = model.column_count.saturating_sub(1) as u16;
    for (r, row) in model.rows.iter().enumerate() {
        let r = r as u32;
        let fmt = match row.style {
            RowStyle::Title | RowStyle::Header => &title,
            RowStyle::Data | RowStyle::Plain => &data,
            RowStyle::Footnote => &footnote,
            RowStyle::Blank => continue,
        };
        if row.style == RowStyle::Title && last_col > 0 {
            let text = match row.cells.first() {
                Some(CellValue::Text(s)) => s.as_str(),
                _ => "",
            };
            sheet.merge_range(r, 0, r, last_col, text, fmt)?;
            continue;
        }
        for (c, cell) in row.cells.iter().enumerate() {
            let c = c as u16;
            match cell {
                CellValue::Text(s) => {
                    sheet.write_string_with_format(r, c, s.as_str(), fmt)?;
                }
                CellValue::Number(n) => {
                    sheet.write_number_with_format(r, c, *n, fmt)?;
                }
                CellValue::Blank => {
                    sheet.write_blank(r, c, fmt)?;
                }
            }
        }
    }

    for (c, width) in model.column_widths.iter().enumerate() {
        sheet.set_column_width(c as u16, *width)?;
    }

    sheet.set_portrait();
    sheet.set_paper_size(A4);
    sheet.set_print_fit_to_pages(1, 0);
    if let Some(footer) = &model.footer {
        sheet.set_footer(&footer_code(footer, "Arial", FOOTER_FONT_SIZE));
    }

    let bytes = workbook.save_to_buffer()?;
    info!(sheet = %model.name, rows = model.rows.len(), bytes = bytes.len(), "spreadsheet written");
    Ok(bytes)
}

/// Cause-list spreadsheet bytes.
pub fn cause_list_xlsx(rows: &[DisplayRow], columns: &[String], branding: &Branding) -> Result<Vec<u8>> {
    write_xlsx(&cause_list_sheet(rows, columns, branding)?)
}

/// Billing spreadsheet bytes.
pub fn billing_xlsx<'a>(entries: impl IntoIterator<Item = &'a BillingEntry>) -> Result<Vec<u8>> {
    write_xlsx(&billing_sheet(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use casepilot_core::record::DEFAULT_CAUSELIST_COLUMNS;
    use casepilot_core::{CaseRecord, Classifier, FeeType};
    use chrono::NaiveDate;

    fn cols() -> Vec<String> {
        DEFAULT_CAUSELIST_COLUMNS.iter().map(|s| s.to_string()).collect()
    }

    fn row(parties: &str) -> DisplayRow {
        DisplayRow::new(
            CaseRecord {
                cino: Some("C1".into()),
                type_name: Some("O.S.".into()),
                reg_no: Some("12".into()),
                reg_year: Some("2020".into()),
                petparty_name: Some(parties.into()),
                resparty_name: Some("State".into()),
                date_last_list: NaiveDate::from_ymd_opt(2024, 3, 1),
                date_next_list: NaiveDate::from_ymd_opt(2024, 3, 15),
                purpose_name: Some("Evidence".into()),
                court_no_desg_name: Some("CCH-10".into()),
                ..Default::default()
            },
            &Classifier::default(),
        )
    }

    #[test]
    fn layout_rows() {
        let model = cause_list_sheet(&[row("Asha")], &cols(), &Branding::default()).unwrap();
        assert_eq!(model.text(0, 0), Some("Case Pilot"));
        assert_eq!(model.text(1, 0), Some("A Case Management Tool"));
        assert!(model.rows[2].cells.is_empty());
        assert_eq!(model.text(3, 4), Some("Parties"));
        assert_eq!(model.text(4, 0), Some("01.03.2024"));
        assert_eq!(model.text(4, 4), Some("Asha v. State"));
        let n = model.rows.len();
        assert_eq!(model.text(n - 2, 0), Some(FOOTNOTE_HEADING));
        assert_eq!(model.text(n - 1, 0), Some(FOOTNOTE));
    }

    #[test]
    fn next_date_column_is_blank() {
        let columns = cols();
        let next = columns.iter().position(|c| c == "Next Date").unwrap();
        let model = cause_list_sheet(&[row("A"), row("B")], &columns, &Branding::default()).unwrap();
        for r in 4..6 {
            assert_eq!(model.rows[r].cells[next], CellValue::Blank);
            assert_eq!(model.text(r, next), None);
        }
    }

    #[test]
    fn long_cells_truncated_to_fifty() {
        let long = "Karnataka State Road Transport Corporation and Others";
        let model = cause_list_sheet(&[row(long)], &cols(), &Branding::default()).unwrap();
        let cell = model.text(4, 4).unwrap();
        assert_eq!(cell.chars().count(), 50);
        assert!(cell.ends_with("..."));
    }

    #[test]
    fn widths_are_capped_and_padded() {
        let model = cause_list_sheet(&[row("A")], &cols(), &Branding::default()).unwrap();
        // Column A holds the long footnote, so it hits the cap.
        assert_eq!(model.column_widths[0], 50.0);
        // "Type" header: 4 + 2 floor beats the 4-char "O.S.", plus 5 padding.
        assert_eq!(model.column_widths[2], 11.0);
        assert!(model.column_widths.iter().all(|w| *w <= 50.0));
    }

    #[test]
    fn no_columns_is_an_error() {
        assert!(matches!(
            cause_list_sheet(&[], &[], &Branding::default()),
            Err(ExportError::NoColumns)
        ));
    }

    #[test]
    fn billing_layout() {
        let entry = BillingEntry {
            case: "General".into(),
            date: NaiveDate::from_ymd_opt(2024, 2, 2).unwrap(),
            service_type: "Other".into(),
            description: "photocopies".into(),
            fee_type: FeeType::Fixed,
            amount: 120.5,
            time_spent: 0.0,
        };
        let model = billing_sheet([&entry]);
        assert_eq!(model.rows.len(), 2);
        assert_eq!(model.text(0, 5), Some("Amount (INR)"));
        assert_eq!(model.text(1, 0), Some("02.02.2024"));
        assert_eq!(model.rows[1].cells[5], CellValue::Number(120.5));
        // "Time Spent (hours)" is 18 chars.
        assert_eq!(model.column_widths[6], 23.0);
    }

    #[test]
    fn footer_escapes_ampersand() {
        assert_eq!(footer_code("A & B", "Arial", 18), "&C&\"Arial\"&18A && B");
    }

    #[test]
    fn writes_a_zip_container() {
        let bytes = cause_list_xlsx(&[row("A")], &cols(), &Branding::default()).unwrap();
        assert_eq!(&bytes[..2], b"PK");
        let bytes = billing_xlsx(std::iter::empty()).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
