//! Sequential refresh loops over the loaded cases.

use std::time::Duration;

use casepilot_core::AppState;
use chrono::{Days, NaiveDate};
use tracing::{debug, info};

use crate::http::CaseStatusSource;

/// Pause after each status fetch.
pub const FETCH_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub targets: usize,
    pub updated: usize,
    pub skipped: usize,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.targets == 0
    }
}

fn target_cinos(state: &AppState, only_today: Option<NaiveDate>) -> Vec<(usize, String)> {
    state
        .sync_targets(only_today)
        .into_iter()
        .map(|i| {
            let cino = state.cases[i].cino.clone().unwrap_or_default();
            (i, cino.trim().to_string())
        })
        .collect()
}

/// Refresh hearing dates for every case, or only those listed `today`.
///
/// `on_progress(done, total)` is called after each target. With no targets
/// nothing is fetched and `last_sync_date` is left alone.
pub async fn sync_cases<S, F>(
    state: &mut AppState,
    source: &S,
    only_today: bool,
    today: NaiveDate,
    delay: Duration,
    mut on_progress: F,
) -> SyncReport
where
    S: CaseStatusSource + ?Sized,
    F: FnMut(usize, usize),
{
    let targets = target_cinos(state, only_today.then_some(today));
    let mut report = SyncReport {
        targets: targets.len(),
        ..Default::default()
    };
    if targets.is_empty() {
        info!("no cases to update");
        return report;
    }

    for (done, (index, cino)) in targets.iter().enumerate() {
        if cino.is_empty() {
            report.skipped += 1;
            on_progress(done + 1, report.targets);
            continue;
        }
        match source.fetch_status(cino).await {
            Ok(update) => {
                state.apply_status_update(*index, &update);
                report.updated += 1;
            }
            Err(e) => {
                debug!(cino = %cino, error = %e, "status fetch failed, skipping");
                report.skipped += 1;
            }
        }
        on_progress(done + 1, report.targets);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    state.last_sync_date = Some(today);
    info!(updated = report.updated, skipped = report.skipped, "sync complete");
    report
}

/// Move today's cases onto tomorrow's list when the service reports them there.
pub async fn roll_to_tomorrow<S>(state: &mut AppState, source: &S, today: NaiveDate) -> usize
where
    S: CaseStatusSource + ?Sized,
{
    let mut rolled = 0;
    for (index, cino) in target_cinos(state, Some(today)) {
        if cino.is_empty() {
            continue;
        }
        let update = match source.fetch_status(&cino).await {
            Ok(u) => u,
            Err(e) => {
                debug!(cino = %cino, error = %e, "status fetch failed, not rolling");
                continue;
            }
        };
        if state.roll_to_tomorrow(index, today, &update) {
            rolled += 1;
        }
    }
    if rolled > 0 {
        info!(
            rolled,
            tomorrow = ?today.checked_add_days(Days::new(1)),
            "rolled cases to tomorrow's cause list"
        );
    }
    rolled
}
