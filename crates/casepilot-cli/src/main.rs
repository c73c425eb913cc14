mod cli;
mod commands;
mod display;
mod session;

use casepilot_core::AppState;
use casepilot_core::settings::court_offset;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::Context;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Commands that replace or configure the session skip the automatic roll-over.
fn wants_auto_roll(command: &Commands) -> bool {
    !matches!(
        command,
        Commands::Import { .. }
            | Commands::Restore { .. }
            | Commands::Backup { .. }
            | Commands::Settings(_)
            | Commands::Roll
            | Commands::Sync { .. }
    )
}

fn should_roll(state: &AppState, now: DateTime<FixedOffset>, today: NaiveDate) -> bool {
    state.settings.in_roll_window(now) && !state.cases_on(today).is_empty()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);
    info!("casepilot v{}", env!("CARGO_PKG_VERSION"));

    let mut state = session::load(&cli.global.state)?;
    let now = Utc::now().with_timezone(&court_offset());
    let today = now.date_naive();

    let mut dirty = false;
    if !cli.global.no_roll && wants_auto_roll(&cli.command) && should_roll(&state, now, today) {
        let client = Context {
            state: &mut state,
            global: &cli.global,
            today,
        }
        .status_client()?;
        let rolled = casepilot_sync::roll_to_tomorrow(&mut state, &client, today).await;
        if rolled > 0 {
            println!("Rolled {rolled} case(s) to Tomorrow's Cause List.");
            dirty = true;
        }
    }

    let mut ctx = Context {
        state: &mut state,
        global: &cli.global,
        today,
    };
    dirty |= commands::run(cli.command, &mut ctx).await?;

    if dirty {
        session::save(&cli.global.state, &state)?;
    } else {
        debug!("session unchanged");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use casepilot_core::CaseRecord;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<FixedOffset> {
        court_offset().with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap()
    }

    #[test]
    fn rolls_only_in_window_with_cases_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut state = AppState::default();
        assert!(!should_roll(&state, at(17, 2), today));
        state.cases.push(CaseRecord {
            date_next_list: Some(today),
            ..Default::default()
        });
        assert!(should_roll(&state, at(17, 2), today));
        assert!(!should_roll(&state, at(17, 5), today));
        assert!(!should_roll(&state, at(16, 59), today));
    }

    #[test]
    fn session_replacing_commands_never_roll() {
        let cli = Cli::try_parse_from(["casepilot", "restore", "b.json"]).unwrap();
        assert!(!wants_auto_roll(&cli.command));
        let cli = Cli::try_parse_from(["casepilot", "dashboard"]).unwrap();
        assert!(wants_auto_roll(&cli.command));
    }
}
