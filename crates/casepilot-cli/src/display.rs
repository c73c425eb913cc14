//! Terminal rendering: vertical case cards and fixed-width tables.

use casepilot_core::{BillingEntry, BillingSummary, Category, CaseRecord, DisplayRow, DossierEntry, Note};
use casepilot_core::dates::format_date;
use casepilot_core::documents::DocumentRecord;

const MAX_CELL_WIDTH: usize = 40;

// ── Card section groupings ──

const IDENTITY: &[&str] = &["cino", "type_name", "case_no", "reg_no", "reg_year"];
const PARTIES: &[&str] = &["petparty_name", "resparty_name"];
const COURT: &[&str] = &["establishment_name", "court_no_desg_name"];
const HEARINGS: &[&str] = &["date_last_list", "date_next_list", "purpose_name", "disp_name"];

/// Print one case as a card grouped by section, followed by its notes,
/// dossier timeline and papers.
pub fn print_case_card(
    record: &CaseRecord,
    category: Category,
    notes: &[Note],
    dossier: &[DossierEntry],
    papers: &[DocumentRecord],
) {
    println!("=== {} ===", record.cino());
    println!("{}", record.parties());
    println!();

    print_section(record, "Identity", IDENTITY);
    print_section(record, "Parties", PARTIES);
    print_section(record, "Court", COURT);
    print_section(record, "Hearings", HEARINGS);
    println!("Category");
    println!("  {:<26} {}", "category", category);
    println!();

    println!("Personal Notes");
    if notes.is_empty() {
        println!("  No personal notes for this case.");
    }
    for n in notes {
        println!("  [{}] {}", format_date(Some(n.date)), n.text);
    }
    println!();

    println!("Case Dossier Timeline");
    if dossier.is_empty() {
        println!("  No timeline available.");
    }
    for d in dossier {
        println!("  {}  {}", format_date(Some(d.date)), d.event);
    }

    if !papers.is_empty() {
        println!();
        println!("Case Papers");
        for p in papers {
            println!(
                "  {:<12} {} ({})",
                p.doc_type.as_str(),
                p.custom_doc_name,
                p.path.display()
            );
        }
    }
}

fn print_section(record: &CaseRecord, header: &str, fields: &[&str]) {
    let values: Vec<(&str, String)> = fields
        .iter()
        .filter_map(|&f| record.field(f).map(|v| (f, v)))
        .filter(|(_, v)| !v.is_empty())
        .collect();
    if values.is_empty() {
        return;
    }
    println!("{header}");
    for (name, value) in values {
        println!("  {:<26} {}", name, value);
    }
    println!();
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Render rows under the given columns as aligned text lines.
pub fn table_lines<S: AsRef<str>>(rows: &[DisplayRow], columns: &[S]) -> Vec<String> {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            columns
                .iter()
                .map(|c| clip(&r.cell(c.as_ref()), MAX_CELL_WIDTH))
                .collect()
        })
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(c.as_ref().chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_CELL_WIDTH)
        })
        .collect();

    let line = |values: Vec<String>| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{v:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(columns.iter().map(|c| clip(c.as_ref(), MAX_CELL_WIDTH)).collect()));
    out.push(line(widths.iter().map(|w| "-".repeat(*w)).collect()));
    out.extend(cells.into_iter().map(line));
    out
}

pub fn print_table<S: AsRef<str>>(rows: &[DisplayRow], columns: &[S]) {
    for l in table_lines(rows, columns) {
        println!("{l}");
    }
}

pub fn print_counts(title: &str, counts: &[(String, usize)]) {
    println!("{title}");
    if counts.is_empty() {
        println!("  (none)");
    }
    for (name, n) in counts {
        println!("  {:<40} {n:>5}", clip(name, MAX_CELL_WIDTH));
    }
    println!();
}

/// Entries are numbered by their position in `all`, the index `bill remove` takes.
pub fn print_billing(all: &[BillingEntry], summary: &BillingSummary<'_>) {
    if summary.entries.is_empty() {
        println!("No billing entries.");
        return;
    }
    println!(
        "{:>3}  {:<10}  {:<20}  {:<28}  {:<20}  {:>12}  {:>6}",
        "#", "Date", "Case", "Billing Category", "Fee Type", "Amount (INR)", "Hours"
    );
    for &e in &summary.entries {
        let i = all.iter().position(|x| std::ptr::eq(x, e)).unwrap_or_default();
        println!(
            "{:>3}  {:<10}  {:<20}  {:<28}  {:<20}  {:>12.2}  {:>6.2}",
            i,
            format_date(Some(e.date)),
            clip(&e.case, 20),
            clip(&e.service_type, 28),
            e.fee_type.as_str(),
            e.amount,
            e.time_spent
        );
        if !e.description.is_empty() {
            println!("     {}", e.description);
        }
    }
    println!();
    println!("Total Amount: INR {:.2}", summary.total_amount);
    println!("Total Time Spent: {:.2} hours", summary.total_time);
}
