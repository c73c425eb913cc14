use std::path::PathBuf;

use casepilot_core::dates::parse_iso_first;
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "casepilot")]
#[command(author, version, about = "Case diary, cause lists and billing for advocates")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Session file holding cases, notes, billing and settings
    #[arg(long, global = true, env = "CASEPILOT_STATE", default_value = "casepilot-session.json")]
    pub state: PathBuf,

    /// Case-status service base URL (overrides the stored setting)
    #[arg(long, global = true, env = "CASEPILOT_API_URL")]
    pub api_url: Option<String>,

    /// Case-status service token (overrides the stored setting)
    #[arg(long, global = true, env = "CASEPILOT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Directory exports are written to
    #[arg(long, global = true, default_value = ".")]
    pub out_dir: PathBuf,

    /// Skip the automatic roll-over to tomorrow's cause list
    #[arg(long, global = true, default_value_t = false)]
    pub no_roll: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a court case export, replacing the case table
    Import {
        /// JSON export (object of objects, array of objects or array of encoded strings)
        file: PathBuf,
    },

    /// Master list in registration order
    List {
        /// Also write Master_List.xlsx
        #[arg(long, default_value_t = false)]
        export: bool,
    },

    /// Cause list for today or tomorrow, grouped by category
    Causelist {
        #[arg(value_enum, default_value_t = Day::Today)]
        day: Day,

        /// Export each category section in this format
        #[arg(long, value_enum)]
        export: Option<ExportFormat>,
    },

    /// Counts, critical matters and the 30-day hearing overview
    Dashboard,

    /// Full case card with notes, dossier and papers
    Show { cino: String },

    /// Which classification rule put a case in its category
    Explain { cino: String },

    /// Personal notes on a case
    Note {
        #[command(subcommand)]
        action: NoteAction,
    },

    /// Per-case timeline entries
    Dossier {
        #[command(subcommand)]
        action: DossierAction,
    },

    /// Pin a case for quick access
    Pin { cino: String },

    /// Remove a pin
    Unpin { cino: String },

    /// List pinned cases
    Pinned,

    /// Tasks and deadlines
    Remind {
        #[command(subcommand)]
        action: RemindAction,
    },

    /// Search cases by hearing date and free text
    Search {
        /// Free text matched against every field
        term: Option<String>,

        /// Only cases next listed on this date
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Refresh hearing dates from the case-status service
    Sync {
        /// Only today's cases
        #[arg(long, default_value_t = false)]
        today: bool,
    },

    /// Move today's cases onto tomorrow's list when the service reports them there
    Roll,

    /// Upcoming hearings, earliest first
    Calendar {
        /// Also write Calendar_View.xlsx
        #[arg(long, default_value_t = false)]
        export: bool,
    },

    /// Cases per court, top stages and category counts
    Analytics,

    /// Write a JSON backup of the session (settings excluded)
    Backup {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the session from a JSON backup
    Restore { file: PathBuf },

    /// Billing entries and service categories
    Bill {
        #[command(subcommand)]
        action: BillAction,
    },

    /// Case papers
    Papers {
        #[command(subcommand)]
        action: PapersAction,
    },

    /// Columns used for master-list and calendar exports
    Columns {
        #[command(subcommand)]
        action: ColumnsAction,
    },

    /// Show or change stored settings
    Settings(SettingsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Day {
    Today,
    Tomorrow,
}

impl Day {
    pub fn label(&self) -> &'static str {
        match self {
            Day::Today => "Today",
            Day::Tomorrow => "Tomorrow",
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Pdf,
    Both,
}

#[derive(Subcommand)]
pub enum NoteAction {
    Add {
        cino: String,
        text: String,
        /// Defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
pub enum DossierAction {
    Add {
        cino: String,
        event: String,
        /// Defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
pub enum RemindAction {
    Add {
        text: String,
        /// Defaults to today
        #[arg(long, value_parser = parse_date)]
        due: Option<NaiveDate>,
    },
    List,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeeArg {
    Fixed,
    Hourly,
}

#[derive(Subcommand)]
pub enum BillAction {
    /// Record a fee
    Add {
        /// CINO, or General for work not tied to a case
        #[arg(long, default_value = "General")]
        case: String,

        /// Defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Billing category
        #[arg(long)]
        service: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, value_enum, default_value_t = FeeArg::Fixed)]
        fee_type: FeeArg,

        /// Amount in INR
        #[arg(long)]
        amount: f64,

        /// Hours spent (hourly fees only)
        #[arg(long, default_value_t = 0.0)]
        hours: f64,
    },

    /// Entries and totals, optionally for one case
    List {
        #[arg(long)]
        case: Option<String>,
    },

    /// Delete the entry at this position in `bill list`
    Remove { index: usize },

    /// Write Billing.xlsx
    Export {
        #[arg(long)]
        case: Option<String>,
    },

    /// Configured billing categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },
}

#[derive(Subcommand)]
pub enum CategoryAction {
    Add { name: String },
    Remove { name: String },
    List,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocTypeArg {
    Pleading,
    Evidence,
    OrderCopy,
    Other,
}

#[derive(Subcommand)]
pub enum PapersAction {
    /// Copy a document into the papers folder and register it against a case
    Attach {
        cino: String,
        file: PathBuf,

        #[arg(long = "type", value_enum, default_value_t = DocTypeArg::Other)]
        doc_type: DocTypeArg,

        /// Display name; defaults to the file name
        #[arg(long)]
        name: Option<String>,

        #[arg(long, default_value = "uploaded_case_docs")]
        dir: PathBuf,
    },

    /// Find documents by case details or document name
    Search { term: String },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Subcommand)]
pub enum ColumnsAction {
    Show,
    /// Replace the selection (comma-separated)
    Set {
        #[arg(value_delimiter = ',', required = true)]
        columns: Vec<String>,
    },
    /// Move the column at `index` (0-based) one place
    Move {
        index: usize,
        #[arg(value_enum)]
        direction: Direction,
    },
    Reset,
}

#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Store a new case-status service URL
    #[arg(long)]
    pub set_api_url: Option<String>,

    /// Store a new case-status token
    #[arg(long)]
    pub set_api_key: Option<String>,

    /// Daily roll-over time, HH:MM court-local time
    #[arg(long, value_parser = parse_time)]
    pub auto_sync_time: Option<NaiveTime>,

    #[arg(long)]
    pub app_name: Option<String>,

    #[arg(long)]
    pub subtitle: Option<String>,

    #[arg(long)]
    pub criminal_case_threshold: Option<i64>,

    #[arg(long)]
    pub criminal_appeal_threshold: Option<i64>,

    #[arg(long)]
    pub sessions_case_threshold: Option<i64>,
}

impl SettingsArgs {
    pub fn is_empty(&self) -> bool {
        self.set_api_url.is_none()
            && self.set_api_key.is_none()
            && self.auto_sync_time.is_none()
            && self.app_name.is_none()
            && self.subtitle.is_none()
            && self.criminal_case_threshold.is_none()
            && self.criminal_appeal_threshold.is_none()
            && self.sessions_case_threshold.is_none()
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    parse_iso_first(s).ok_or_else(|| format!("unrecognised date {s:?}, expected YYYY-MM-DD or DD-MM-YYYY"))
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| format!("unrecognised time {s:?}, expected HH:MM"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["casepilot", "causelist", "tomorrow", "--export", "pdf", "-vv"]).unwrap();
        assert_eq!(cli.global.verbose, 2);
        match cli.command {
            Commands::Causelist { day, export } => {
                assert_eq!(day, Day::Tomorrow);
                assert_eq!(export, Some(ExportFormat::Pdf));
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn dates_accept_both_orders() {
        assert_eq!(parse_date("2024-03-15"), Ok(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()));
        assert_eq!(parse_date("15-03-2024"), Ok(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()));
        assert!(parse_date("soon").is_err());
    }

    #[test]
    fn columns_split_on_commas() {
        let cli = Cli::try_parse_from(["casepilot", "columns", "set", "Type,Parties,Next Date"]).unwrap();
        match cli.command {
            Commands::Columns {
                action: ColumnsAction::Set { columns },
            } => assert_eq!(columns, vec!["Type", "Parties", "Next Date"]),
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn global_overrides_stay_out_of_settings_flags() {
        let cli = Cli::try_parse_from(["casepilot", "--api-url", "http://override", "--api-key", "tok", "settings"])
            .unwrap();
        assert_eq!(cli.global.api_url.as_deref(), Some("http://override"));
        match cli.command {
            Commands::Settings(args) => assert!(args.is_empty()),
            _ => panic!("wrong command"),
        }

        let cli = Cli::try_parse_from(["casepilot", "settings", "--set-api-url", "http://stored"]).unwrap();
        assert_eq!(cli.global.api_url, None);
        match cli.command {
            Commands::Settings(args) => assert_eq!(args.set_api_url.as_deref(), Some("http://stored")),
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn time_parses_hh_mm() {
        assert_eq!(parse_time("17:30"), Ok(NaiveTime::from_hms_opt(17, 30, 0).unwrap()));
        assert!(parse_time("5pm").is_err());
    }
}
