//! One handler per subcommand. Each returns whether the session changed.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use casepilot_core::billing::{FeeType, NewBillingEntry};
use casepilot_core::record::{CAUSE_LIST_COLUMNS, OVERVIEW_COLUMNS};
use casepilot_core::state::OVERVIEW_FILTERS;
use casepilot_core::{AppState, BillingFilter, DocumentType, Move};
use casepilot_export::{billing_xlsx, cause_list_pdf, cause_list_stem, cause_list_xlsx};
use casepilot_sync::{FETCH_DELAY, StatusClient};
use chrono::{Days, NaiveDate};
use tracing::info;

use crate::cli::{
    BillAction, CategoryAction, ColumnsAction, Commands, Day, Direction, DocTypeArg, DossierAction,
    ExportFormat, FeeArg, GlobalArgs, NoteAction, PapersAction, RemindAction, SettingsArgs,
};
use crate::display::{print_billing, print_case_card, print_counts, print_table};

pub struct Context<'a> {
    pub state: &'a mut AppState,
    pub global: &'a GlobalArgs,
    pub today: NaiveDate,
}

impl Context<'_> {
    fn tomorrow(&self) -> NaiveDate {
        self.today
            .checked_add_days(Days::new(1))
            .unwrap_or(self.today)
    }

    /// Status client from stored settings, with CLI/env values taking precedence.
    pub fn status_client(&self) -> anyhow::Result<StatusClient> {
        let url = self
            .global
            .api_url
            .clone()
            .unwrap_or_else(|| self.state.settings.api_url.clone());
        let key = self
            .global
            .api_key
            .clone()
            .or_else(|| self.state.settings.api_key.clone());
        StatusClient::new(&url, key).context("building case-status client")
    }
}

pub async fn run(command: Commands, ctx: &mut Context<'_>) -> anyhow::Result<bool> {
    match command {
        Commands::Import { file } => import(ctx, &file),
        Commands::List { export } => list(ctx, export),
        Commands::Causelist { day, export } => causelist(ctx, day, export),
        Commands::Dashboard => dashboard(ctx),
        Commands::Show { cino } => show(ctx, &cino),
        Commands::Explain { cino } => explain(ctx, &cino),
        Commands::Note {
            action: NoteAction::Add { cino, text, date },
        } => {
            ctx.state.add_note(&cino, date.unwrap_or(ctx.today), &text)?;
            println!("Note added.");
            Ok(true)
        }
        Commands::Dossier {
            action: DossierAction::Add { cino, event, date },
        } => {
            ctx.state
                .add_dossier_entry(&cino, date.unwrap_or(ctx.today), &event)?;
            println!("Timeline entry added.");
            Ok(true)
        }
        Commands::Pin { cino } => {
            if ctx.state.pin(&cino)? {
                println!("Pinned {cino}.");
            } else {
                println!("{cino} is already pinned.");
            }
            Ok(true)
        }
        Commands::Unpin { cino } => {
            let removed = ctx.state.unpin(&cino);
            println!("{}", if removed { "Unpinned." } else { "Not pinned." });
            Ok(removed)
        }
        Commands::Pinned => {
            let pinned = ctx.state.pinned();
            if pinned.is_empty() {
                println!("No pinned cases.");
            } else {
                print_table(&ctx.state.display(pinned), CAUSE_LIST_COLUMNS);
            }
            Ok(false)
        }
        Commands::Remind { action } => remind(ctx, action),
        Commands::Search { term, date } => {
            let hits = ctx.state.search(date, term.as_deref());
            println!("{} case(s)", hits.len());
            print_table(&ctx.state.display(hits), &ctx.state.causelist_columns);
            Ok(false)
        }
        Commands::Sync { today } => sync(ctx, today).await,
        Commands::Roll => {
            let client = ctx.status_client()?;
            let rolled = casepilot_sync::roll_to_tomorrow(ctx.state, &client, ctx.today).await;
            println!("Rolled {rolled} case(s) to Tomorrow's Cause List.");
            Ok(rolled > 0)
        }
        Commands::Calendar { export } => calendar(ctx, export),
        Commands::Analytics => analytics(ctx),
        Commands::Backup { output } => backup(ctx, output.as_deref()),
        Commands::Restore { file } => {
            let bytes = fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            ctx.state.restore_json(&bytes)?;
            println!("Restored {} case(s) from {}.", ctx.state.cases.len(), file.display());
            Ok(true)
        }
        Commands::Bill { action } => bill(ctx, action),
        Commands::Papers { action } => papers(ctx, action),
        Commands::Columns { action } => columns(ctx, action),
        Commands::Settings(args) => settings(ctx, args),
    }
}

fn write_export(dir: &Path, stem: &str, ext: &str, bytes: &[u8]) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(format!("{stem}.{ext}"));
    fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "export written");
    println!("Wrote {}", path.display());
    Ok(path)
}

fn import(ctx: &mut Context<'_>, file: &Path) -> anyhow::Result<bool> {
    let bytes = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let count = ctx
        .state
        .load_cases(&bytes)
        .with_context(|| format!("importing {}", file.display()))?;
    println!("Loaded {count} cases.");
    Ok(true)
}

fn list(ctx: &mut Context<'_>, export: bool) -> anyhow::Result<bool> {
    if ctx.state.cases.is_empty() {
        println!("No cases loaded.");
        return Ok(false);
    }
    let rows = ctx.state.display(ctx.state.master_list());
    print_table(&rows, &ctx.state.causelist_columns);
    if export {
        let bytes = cause_list_xlsx(&rows, &ctx.state.causelist_columns, &ctx.state.settings.branding)?;
        write_export(&ctx.global.out_dir, "Master_List", "xlsx", &bytes)?;
    }
    Ok(false)
}

fn causelist(ctx: &mut Context<'_>, day: Day, export: Option<ExportFormat>) -> anyhow::Result<bool> {
    if ctx.state.cases.is_empty() {
        println!("No cases loaded.");
        return Ok(false);
    }
    let date = match day {
        Day::Today => ctx.today,
        Day::Tomorrow => ctx.tomorrow(),
    };
    let sections = ctx.state.cause_list(date);
    if sections.is_empty() {
        println!("No cases listed for {}.", day.label());
        return Ok(false);
    }
    let columns: Vec<String> = CAUSE_LIST_COLUMNS.iter().map(|c| c.to_string()).collect();
    let branding = &ctx.state.settings.branding;
    for section in &sections {
        println!("### {}", section.category);
        print_table(&section.rows, &columns);
        println!();

        let stem = cause_list_stem(day.label(), section.category);
        if matches!(export, Some(ExportFormat::Xlsx | ExportFormat::Both)) {
            let bytes = cause_list_xlsx(&section.rows, &columns, branding)?;
            write_export(&ctx.global.out_dir, &stem, "xlsx", &bytes)?;
        }
        if matches!(export, Some(ExportFormat::Pdf | ExportFormat::Both)) {
            let bytes = cause_list_pdf(&section.rows, &columns, branding, Some(section.category.label()))?;
            write_export(&ctx.global.out_dir, &stem, "pdf", &bytes)?;
        }
    }
    Ok(false)
}

fn dashboard(ctx: &mut Context<'_>) -> anyhow::Result<bool> {
    let s = &*ctx.state;
    println!("Total Cases        {}", s.cases.len());
    println!("Today's Cases      {}", s.cases_on(ctx.today).len());
    println!("Tomorrow's Cases   {}", s.cases_on(ctx.tomorrow()).len());
    match s.last_sync_date {
        Some(d) => println!("Last sync          {}", d.format("%d.%m.%Y")),
        None => println!("Last sync          Never"),
    }
    println!();

    println!("Critical Matters Today");
    let critical = s.critical_today(ctx.today);
    if critical.is_empty() {
        println!("  None.");
    } else {
        print_table(&critical, OVERVIEW_COLUMNS);
    }
    println!();

    println!("Next 30 Days Overview");
    for (title, pattern) in OVERVIEW_FILTERS {
        let rows = s.next_30_days(ctx.today, *pattern)?;
        println!("{title} ({})", rows.len());
        if !rows.is_empty() {
            print_table(&rows, OVERVIEW_COLUMNS);
        }
        println!();
    }
    Ok(false)
}

fn show(ctx: &mut Context<'_>, cino: &str) -> anyhow::Result<bool> {
    let s = &*ctx.state;
    let record = s
        .find_case(cino)
        .with_context(|| format!("no loaded case with CINO {cino}"))?;
    let category = s.classifier().classify(record);
    let papers = s.case_papers.get(cino).map(Vec::as_slice).unwrap_or_default();
    print_case_card(record, category, s.notes(cino), s.dossier(cino), papers);
    Ok(false)
}

fn explain(ctx: &mut Context<'_>, cino: &str) -> anyhow::Result<bool> {
    let s = &*ctx.state;
    let record = s
        .find_case(cino)
        .with_context(|| format!("no loaded case with CINO {cino}"))?;
    let classifier = s.classifier();
    let decision = classifier.explain(record);
    println!("{}", record.label());
    println!("  category  {}", decision.category);
    println!("  rule      {}", decision.rule);
    Ok(false)
}

fn remind(ctx: &mut Context<'_>, action: RemindAction) -> anyhow::Result<bool> {
    match action {
        RemindAction::Add { text, due } => {
            ctx.state.add_reminder(&text, due.unwrap_or(ctx.today))?;
            println!("Task added.");
            Ok(true)
        }
        RemindAction::List => {
            let reminders = ctx.state.reminders_by_due();
            if reminders.is_empty() {
                println!("No tasks/reminders.");
            }
            for r in reminders {
                let flag = if r.due < ctx.today { " (overdue)" } else { "" };
                println!("{}  {}{flag}", r.due.format("%d.%m.%Y"), r.text);
            }
            Ok(false)
        }
    }
}

async fn sync(ctx: &mut Context<'_>, only_today: bool) -> anyhow::Result<bool> {
    let client = ctx.status_client()?;
    let report = casepilot_sync::sync_cases(
        ctx.state,
        &client,
        only_today,
        ctx.today,
        FETCH_DELAY,
        |done, total| {
            eprint!("\r  Syncing {done}/{total}");
            let _ = io::stderr().flush();
        },
    )
    .await;
    if report.is_empty() {
        println!("No cases to update.");
        return Ok(false);
    }
    eprintln!();
    println!("Updated {} cases.", report.updated);
    if report.skipped > 0 {
        println!("Skipped {} (no CINO or no response).", report.skipped);
    }
    Ok(true)
}

fn calendar(ctx: &mut Context<'_>, export: bool) -> anyhow::Result<bool> {
    let rows = ctx.state.display(ctx.state.calendar());
    if rows.is_empty() {
        println!("No upcoming hearings.");
        return Ok(false);
    }
    print_table(&rows, &ctx.state.causelist_columns);
    if export {
        let bytes = cause_list_xlsx(&rows, &ctx.state.causelist_columns, &ctx.state.settings.branding)?;
        write_export(&ctx.global.out_dir, "Calendar_View", "xlsx", &bytes)?;
    }
    Ok(false)
}

fn analytics(ctx: &mut Context<'_>) -> anyhow::Result<bool> {
    let s = &*ctx.state;
    if s.cases.is_empty() {
        println!("No data loaded.");
        return Ok(false);
    }
    print_counts("Cases per Court", &s.cases_per_court());
    print_counts("Top 10 Hearing Stages", &s.top_stages());
    let categories: Vec<(String, usize)> = s
        .category_counts()
        .into_iter()
        .map(|(c, n)| (c.label().to_string(), n))
        .collect();
    print_counts("Cases per Category", &categories);
    Ok(false)
}

fn backup(ctx: &mut Context<'_>, output: Option<&Path>) -> anyhow::Result<bool> {
    let json = ctx.state.backup_json()?;
    match output {
        Some(path) => {
            fs::write(path, &json).with_context(|| format!("writing {}", path.display()))?;
            println!("Backup written to {}", path.display());
        }
        None => {
            let mut out = io::stdout().lock();
            out.write_all(&json)?;
            writeln!(out)?;
        }
    }
    Ok(false)
}

fn bill(ctx: &mut Context<'_>, action: BillAction) -> anyhow::Result<bool> {
    match action {
        BillAction::Add {
            case,
            date,
            service,
            description,
            fee_type,
            amount,
            hours,
        } => {
            let fee_type = match fee_type {
                FeeArg::Fixed => FeeType::Fixed,
                FeeArg::Hourly => FeeType::Hourly,
            };
            ctx.state.add_billing_entry(NewBillingEntry {
                case,
                date: date.unwrap_or(ctx.today),
                service_type: service,
                description,
                fee_type,
                amount,
                time_spent: hours,
            })?;
            println!("Billing entry added.");
            Ok(true)
        }
        BillAction::List { case } => {
            let filter = case.map_or(BillingFilter::All, BillingFilter::Case);
            let summary = ctx.state.billing_summary(&filter);
            print_billing(&ctx.state.billing_entries, &summary);
            Ok(false)
        }
        BillAction::Remove { index } => {
            let removed = ctx.state.remove_billing_entry(index)?;
            println!("Removed {} entry for {}.", removed.service_type, removed.case);
            Ok(true)
        }
        BillAction::Export { case } => {
            let filter = case.map_or(BillingFilter::All, BillingFilter::Case);
            let summary = ctx.state.billing_summary(&filter);
            let bytes = billing_xlsx(summary.entries.iter().copied())?;
            write_export(&ctx.global.out_dir, "Billing", "xlsx", &bytes)?;
            Ok(false)
        }
        BillAction::Category { action } => match action {
            CategoryAction::Add { name } => {
                let added = ctx.state.add_service_type(&name)?;
                println!("{}", if added { "Category added." } else { "Category already exists." });
                Ok(added)
            }
            CategoryAction::Remove { name } => {
                let removed = ctx.state.remove_service_type(&name);
                println!("{}", if removed { "Category removed." } else { "No such category." });
                Ok(removed)
            }
            CategoryAction::List => {
                for s in &ctx.state.service_types {
                    println!("{s}");
                }
                Ok(false)
            }
        },
    }
}

fn papers(ctx: &mut Context<'_>, action: PapersAction) -> anyhow::Result<bool> {
    match action {
        PapersAction::Attach {
            cino,
            file,
            doc_type,
            name,
            dir,
        } => {
            let doc_type = match doc_type {
                DocTypeArg::Pleading => DocumentType::Pleading,
                DocTypeArg::Evidence => DocumentType::Evidence,
                DocTypeArg::OrderCopy => DocumentType::OrderCopy,
                DocTypeArg::Other => DocumentType::Other,
            };
            let doc = ctx
                .state
                .attach_document(&cino, doc_type, name.as_deref(), &file, &dir)?;
            println!("Saved {} as {}", doc.custom_doc_name, doc.path.display());
            Ok(true)
        }
        PapersAction::Search { term } => {
            let hits = ctx.state.search_documents(&term);
            if hits.is_empty() {
                println!("No matching documents.");
            }
            for m in hits {
                println!(
                    "{}  {}  {}  [{}] {} ({})",
                    m.cino,
                    m.reg_no_year,
                    m.parties,
                    m.document.doc_type,
                    m.document.custom_doc_name,
                    m.document.path.display()
                );
            }
            Ok(false)
        }
    }
}

fn columns(ctx: &mut Context<'_>, action: ColumnsAction) -> anyhow::Result<bool> {
    let changed = match action {
        ColumnsAction::Show => false,
        ColumnsAction::Set { columns } => {
            ctx.state.set_columns(columns)?;
            true
        }
        ColumnsAction::Move { index, direction } => {
            let dir = match direction {
                Direction::Up => Move::Up,
                Direction::Down => Move::Down,
            };
            ctx.state.move_column(index, dir)?;
            true
        }
        ColumnsAction::Reset => {
            ctx.state.reset_columns();
            true
        }
    };
    for (i, c) in ctx.state.causelist_columns.iter().enumerate() {
        println!("{i:>2}  {c}");
    }
    Ok(changed)
}

fn mask(key: Option<&str>) -> String {
    match key {
        None => "(not set)".to_string(),
        Some(k) if k.chars().count() <= 4 => "****".to_string(),
        Some(k) => {
            let tail: String = k.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
            format!("****{tail}")
        }
    }
}

fn settings(ctx: &mut Context<'_>, args: SettingsArgs) -> anyhow::Result<bool> {
    let changed = !args.is_empty();
    let s = &mut ctx.state.settings;
    if let Some(url) = args.set_api_url {
        s.api_url = url.trim().to_string();
    }
    if let Some(key) = args.set_api_key {
        let key = key.trim().to_string();
        s.api_key = (!key.is_empty()).then_some(key);
    }
    if let Some(t) = args.auto_sync_time {
        s.auto_sync_time = t;
    }
    if let Some(name) = args.app_name {
        s.branding.app_name = name;
    }
    if let Some(sub) = args.subtitle {
        s.branding.subtitle = sub;
    }
    if let Some(n) = args.criminal_case_threshold {
        s.thresholds.criminal_case = n;
    }
    if let Some(n) = args.criminal_appeal_threshold {
        s.thresholds.criminal_appeal = n;
    }
    if let Some(n) = args.sessions_case_threshold {
        s.thresholds.sessions_case = n;
    }

    println!("{:<28} {}", "api_url", s.api_url);
    println!("{:<28} {}", "api_key", mask(s.api_key.as_deref()));
    println!("{:<28} {} (UTC+05:30)", "auto_sync_time", s.auto_sync_time.format("%H:%M"));
    println!("{:<28} {}", "app_name", s.branding.app_name);
    println!("{:<28} {}", "subtitle", s.branding.subtitle);
    println!("{:<28} {}", "criminal_case_threshold", s.thresholds.criminal_case);
    println!("{:<28} {}", "criminal_appeal_threshold", s.thresholds.criminal_appeal);
    println!("{:<28} {}", "sessions_case_threshold", s.thresholds.sessions_case);
    Ok(changed)
}
