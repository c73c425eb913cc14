//! Paginated A4 cause-list document.
//!
//! Layout is computed into a [`DocumentPlan`] of positioned text runs and
//! cell borders, then rendered with printpdf. Coordinates in the plan are
//! millimetres from the top-left corner of the page; text `y` is the
//! baseline.

use casepilot_core::{Branding, DisplayRow};
use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};
use tracing::info;

use crate::error::{ExportError, Result};
use crate::layout::{FOOTNOTE, export_cell};
use crate::metrics::{FontStyle, pt_to_mm, text_width, wrap};

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN: f32 = 10.0;
const BREAK_MARGIN: f32 = 15.0;
const CELL_PADDING: f32 = 1.0;
const BASE_WIDTHS: [f32; 7] = [25.0, 35.0, 20.0, 35.0, 55.0, 35.0, 25.0];

const HEADER_LINE: f32 = 8.0;
const ROW_LINE: f32 = 5.0;
const FOOTNOTE_LINE: f32 = 6.0;
const FOOTER_RESERVE: f32 = 18.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Text {
        x: f32,
        y: f32,
        size: f32,
        style: FontStyle,
        text: String,
    },
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub elements: Vec<Element>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text { text, .. } => Some(text.as_str()),
            Element::Rect { .. } => None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPlan {
    pub pages: Vec<Page>,
}

/// Column widths scaled to the printable width.
pub fn column_widths(count: usize) -> Vec<f32> {
    let base: Vec<f32> = if count == BASE_WIDTHS.len() {
        BASE_WIDTHS.to_vec()
    } else {
        vec![1.0; count]
    };
    let total: f32 = base.iter().sum();
    let scale = (PAGE_WIDTH - 2.0 * MARGIN) / total;
    base.into_iter().map(|w| w * scale).collect()
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Center,
}

struct Planner<'a> {
    pages: Vec<Page>,
    y: f32,
    columns: &'a [String],
    widths: Vec<f32>,
    category: Option<&'a str>,
}

impl Planner<'_> {
    fn page(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn add_page(&mut self) {
        self.pages.push(Page::default());
        self.y = MARGIN;
    }

    fn would_break(&self, height: f32) -> bool {
        self.y + height > PAGE_HEIGHT - BREAK_MARGIN
    }

    fn ln(&mut self, h: f32) {
        self.y += h;
    }

    /// One line of text inside a box of `width` at `x`, vertically centred on `h`.
    fn text(&mut self, x: f32, width: f32, h: f32, size: f32, style: FontStyle, text: &str, align: Align) {
        if text.is_empty() {
            return;
        }
        let tx = match align {
            Align::Left => x + CELL_PADDING,
            Align::Center => x + (width - text_width(text, size, style)) / 2.0,
        };
        let baseline = self.y + h / 2.0 + 0.3 * pt_to_mm(size);
        self.page().elements.push(Element::Text {
            x: tx,
            y: baseline,
            size,
            style,
            text: text.to_string(),
        });
    }

    /// Full-width centred line, then advance by `h`.
    fn centred_line(&mut self, text: &str, size: f32, style: FontStyle, h: f32) {
        self.text(MARGIN, PAGE_WIDTH - 2.0 * MARGIN, h, size, style, text, Align::Center);
        self.ln(h);
    }

    fn rect(&mut self, x: f32, w: f32, h: f32) {
        let y = self.y;
        self.page().elements.push(Element::Rect { x, y, w, h });
    }

    fn category_heading(&mut self) {
        if let Some(name) = self.category {
            self.centred_line(name, 13.0, FontStyle::Bold, 8.0);
            self.ln(4.0);
        }
    }

    fn table_header(&mut self) {
        let size = 10.0;
        let wrapped: Vec<Vec<String>> = self
            .columns
            .iter()
            .zip(&self.widths)
            .map(|(c, w)| wrap(c, w - 2.0 * CELL_PADDING, size, FontStyle::Bold))
            .collect();
        let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1);
        let h = lines as f32 * HEADER_LINE;
        self.cells(&wrapped, h, HEADER_LINE, size, FontStyle::Bold, Align::Center);
        self.ln(h);
    }

    fn cells(&mut self, wrapped: &[Vec<String>], h: f32, line_h: f32, size: f32, style: FontStyle, align: Align) {
        let top = self.y;
        let mut x = MARGIN;
        for (i, lines) in wrapped.iter().enumerate() {
            let w = self.widths[i];
            self.y = top;
            self.rect(x, w, h);
            for line in lines {
                self.text(x, w, line_h, size, style, line, align);
                self.y += line_h;
            }
            x += w;
        }
        self.y = top;
    }

    fn continue_on_new_page(&mut self) {
        self.add_page();
        self.category_heading();
        self.table_header();
    }

    fn data_row(&mut self, row: &DisplayRow) {
        let size = 9.0;
        let wrapped: Vec<Vec<String>> = self
            .columns
            .iter()
            .zip(&self.widths)
            .map(|(c, w)| wrap(&export_cell(row, c), w - 2.0 * CELL_PADDING, size, FontStyle::Regular))
            .collect();
        let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1);
        let h = lines as f32 * ROW_LINE;
        if self.would_break(h) {
            self.continue_on_new_page();
        }
        self.cells(&wrapped, h, ROW_LINE, size, FontStyle::Regular, Align::Left);
        self.ln(h);
    }

    fn footer(&mut self, branding: &Branding) {
        self.ln(5.0);
        if self.would_break(FOOTER_RESERVE) {
            self.continue_on_new_page();
        }
        let width = PAGE_WIDTH - 2.0 * MARGIN;
        for line in wrap(FOOTNOTE, width - 2.0 * CELL_PADDING, 9.0, FontStyle::Italic) {
            if self.would_break(FOOTNOTE_LINE) {
                self.add_page();
            }
            self.text(MARGIN, width, FOOTNOTE_LINE, 9.0, FontStyle::Italic, &line, Align::Left);
            self.ln(FOOTNOTE_LINE);
        }
        self.ln(6.0);
        for line in [&branding.app_name, &branding.subtitle] {
            if self.would_break(8.0) {
                self.add_page();
            }
            self.centred_line(line, 10.0, FontStyle::Italic, 8.0);
        }
    }
}

/// Lay out a cause list. `category` adds a heading repeated on every page.
pub fn plan_cause_list(
    rows: &[DisplayRow],
    columns: &[String],
    branding: &Branding,
    category: Option<&str>,
) -> Result<DocumentPlan> {
    if columns.is_empty() {
        return Err(ExportError::NoColumns);
    }
    let mut p = Planner {
        pages: Vec::new(),
        y: MARGIN,
        columns,
        widths: column_widths(columns.len()),
        category,
    };
    p.add_page();
    p.centred_line(&branding.app_name, 16.0, FontStyle::Bold, 10.0);
    p.centred_line(&branding.subtitle, 12.0, FontStyle::Regular, 8.0);
    p.ln(6.0);
    p.category_heading();
    p.table_header();
    for row in rows {
        p.data_row(row);
    }
    p.footer(branding);
    Ok(DocumentPlan { pages: p.pages })
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn get(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }
}

// Built-in fonts are WinAnsi encoded; anything outside printable ASCII is replaced.
fn printable(text: &str) -> String {
    text.chars()
        .map(|c| if c == ' ' || c.is_ascii_graphic() { c } else { '?' })
        .collect()
}

fn draw(layer: &PdfLayerReference, page: &Page, fonts: &Fonts) {
    layer.set_outline_thickness(0.57);
    for element in &page.elements {
        match element {
            Element::Text { x, y, size, style, text } => {
                layer.use_text(printable(text), *size, Mm(*x), Mm(PAGE_HEIGHT - *y), fonts.get(*style));
            }
            Element::Rect { x, y, w, h } => {
                let (left, right) = (*x, *x + *w);
                let (top, bottom) = (PAGE_HEIGHT - *y, PAGE_HEIGHT - *y - *h);
                let points = [(left, top), (right, top), (right, bottom), (left, bottom)]
                    .into_iter()
                    .map(|(px, py)| (Point::new(Mm(px), Mm(py)), false))
                    .collect();
                layer.add_line(Line {
                    points,
                    is_closed: true,
                });
            }
        }
    }
}

fn pdf_err(e: impl std::fmt::Debug) -> ExportError {
    ExportError::Pdf(format!("{e:?}"))
}

/// Render a plan to PDF bytes.
pub fn render_pdf(plan: &DocumentPlan, title: &str) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?,
        italic: doc.add_builtin_font(BuiltinFont::HelveticaOblique).map_err(pdf_err)?,
    };
    for (i, page) in plan.pages.iter().enumerate() {
        let (page_idx, layer_idx) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1")
        };
        let layer = doc.get_page(page_idx).get_layer(layer_idx);
        draw(&layer, page, &fonts);
    }
    let bytes = doc.save_to_bytes().map_err(pdf_err)?;
    info!(pages = plan.pages.len(), bytes = bytes.len(), "rendered pdf");
    Ok(bytes)
}

/// Plan and render a cause list in one step.
pub fn cause_list_pdf(
    rows: &[DisplayRow],
    columns: &[String],
    branding: &Branding,
    category: Option<&str>,
) -> Result<Vec<u8>> {
    let plan = plan_cause_list(rows, columns, branding, category)?;
    render_pdf(&plan, &branding.app_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use casepilot_core::state::default_columns;
    use casepilot_core::{CaseRecord, Classifier, columns as col};
    use chrono::NaiveDate;

    fn row(i: usize, parties: &str) -> DisplayRow {
        DisplayRow::new(
            CaseRecord {
                cino: Some(format!("C{i}")),
                type_name: Some("O.S.".into()),
                reg_no: Some(i.to_string()),
                reg_year: Some("2020".into()),
                petparty_name: Some(parties.into()),
                resparty_name: Some("State".into()),
                date_last_list: NaiveDate::from_ymd_opt(2024, 3, 1),
                date_next_list: NaiveDate::from_ymd_opt(2024, 3, 15),
                purpose_name: Some("Evidence".into()),
                establishment_name: Some("City Civil Court".into()),
                ..Default::default()
            },
            &Classifier::default(),
        )
    }

    #[test]
    fn seven_columns_use_base_weights() {
        let w = column_widths(7);
        assert!((w.iter().sum::<f32>() - 190.0).abs() < 1e-3);
        assert!((w[4] - 55.0 * 190.0 / 230.0).abs() < 1e-3);
        let eq = column_widths(3);
        assert!(eq.iter().all(|x| (x - 190.0 / 3.0).abs() < 1e-3));
    }

    #[test]
    fn short_list_fits_one_page() {
        let rows: Vec<_> = (0..3).map(|i| row(i, "Ramesh")).collect();
        let plan = plan_cause_list(&rows, &default_columns(), &Branding::default(), None).unwrap();
        assert_eq!(plan.pages.len(), 1);
        let texts: Vec<_> = plan.pages[0].texts().collect();
        assert_eq!(texts[0], "Case Pilot");
        assert_eq!(texts[1], "A Case Management Tool");
        assert!(texts.contains(&"Ramesh v. State"));
    }

    #[test]
    fn long_list_paginates_and_repeats_headings() {
        let rows: Vec<_> = (0..80).map(|i| row(i, "Ramesh")).collect();
        let plan =
            plan_cause_list(&rows, &default_columns(), &Branding::default(), Some("Civil/Sessions")).unwrap();
        let table_pages: Vec<&Page> = plan
            .pages
            .iter()
            .filter(|p| p.texts().any(|t| t == "Ramesh v. State"))
            .collect();
        assert!(table_pages.len() > 1);
        for page in &table_pages {
            assert!(page.texts().any(|t| t == col::PARTIES));
        }
        assert_eq!(plan.pages[0].texts().next(), Some("Case Pilot"));
        for page in &table_pages[1..] {
            assert_eq!(page.texts().next(), Some("Civil/Sessions"));
        }
    }

    #[test]
    fn content_stays_above_break_line() {
        let rows: Vec<_> = (0..120).map(|i| row(i, &"Long party name ".repeat(i % 4 + 1))).collect();
        let plan = plan_cause_list(&rows, &default_columns(), &Branding::default(), None).unwrap();
        for page in &plan.pages {
            for e in &page.elements {
                if let Element::Rect { y, h, .. } = e {
                    assert!(y + h <= PAGE_HEIGHT - BREAK_MARGIN + 1e-3);
                }
            }
        }
    }

    #[test]
    fn next_date_is_never_printed() {
        let rows: Vec<_> = (0..5).map(|i| row(i, "Ramesh")).collect();
        let plan = plan_cause_list(&rows, &default_columns(), &Branding::default(), None).unwrap();
        assert!(plan.pages.iter().all(|p| p.texts().all(|t| t != "15.03.2024")));
        assert!(plan.pages[0].texts().any(|t| t == "01.03.2024"));
    }

    #[test]
    fn row_height_follows_tallest_cell() {
        let tall = "word ".repeat(40);
        let rows = vec![row(1, &tall)];
        let plan = plan_cause_list(&rows, &default_columns(), &Branding::default(), None).unwrap();
        let rects: Vec<(f32, f32)> = plan.pages[0]
            .elements
            .iter()
            .filter_map(|e| match e {
                Element::Rect { y, h, .. } => Some((*y, *h)),
                _ => None,
            })
            .collect();
        let n = default_columns().len();
        // Header cells, then one data row.
        assert_eq!(rects.len(), 2 * n);
        let data = &rects[n..];
        assert!(data.iter().all(|r| (r.1 - data[0].1).abs() < 1e-3));
        assert!(data[0].1 > ROW_LINE);
        assert_eq!(data[0].1 % ROW_LINE, 0.0);
    }

    #[test]
    fn footnote_is_wrapped_after_table() {
        let plan = plan_cause_list(&[], &default_columns(), &Branding::default(), None).unwrap();
        let texts: Vec<_> = plan.pages[0].texts().collect();
        let start = texts.iter().position(|t| t.starts_with("*Cases advanced")).unwrap();
        assert!(texts[start].len() < FOOTNOTE.len());
        assert_eq!(texts[texts.len() - 2], "Case Pilot");
        assert_eq!(texts[texts.len() - 1], "A Case Management Tool");
    }

    #[test]
    fn no_columns_is_an_error() {
        assert!(matches!(
            plan_cause_list(&[], &[], &Branding::default(), None),
            Err(ExportError::NoColumns)
        ));
    }

    #[test]
    fn non_ascii_is_replaced() {
        assert_eq!(printable("Raméš ok"), "Ram?? ok");
    }

    #[test]
    fn renders_pdf_bytes() {
        let rows: Vec<_> = (0..60).map(|i| row(i, "Ramesh")).collect();
        let bytes = cause_list_pdf(&rows, &default_columns(), &Branding::default(), Some("Magistrate")).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
