//! Hearing-date updates reported by the external case-status service.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// The three fields a status lookup reports for one case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub date_last_list: Option<NaiveDate>,
    pub date_next_list: Option<NaiveDate>,
    pub purpose_name: Option<String>,
}

impl AppState {
    /// Apply a fetched update to the case at `index`.
    ///
    /// The previous next-hearing date becomes the last-listed date. Next date
    /// and stage are replaced only when the update carries them.
    pub fn apply_status_update(&mut self, index: usize, update: &StatusUpdate) -> bool {
        let Some(case) = self.cases.get_mut(index) else {
            return false;
        };
        case.date_last_list = case.date_next_list;
        if let Some(next) = update.date_next_list {
            case.date_next_list = Some(next);
        }
        if let Some(stage) = update.purpose_name.as_deref().map(str::trim)
            && !stage.is_empty()
        {
            case.purpose_name = Some(stage.to_string());
        }
        true
    }

    /// Move a case listed `today` onto tomorrow's list if the update says so.
    pub fn roll_to_tomorrow(&mut self, index: usize, today: NaiveDate, update: &StatusUpdate) -> bool {
        let Some(tomorrow) = today.checked_add_days(Days::new(1)) else {
            return false;
        };
        let Some(case) = self.cases.get_mut(index) else {
            return false;
        };
        if case.date_next_list != Some(today) || update.date_next_list != Some(tomorrow) {
            return false;
        }
        case.date_last_list = Some(today);
        case.date_next_list = Some(tomorrow);
        true
    }

    /// Indices of the cases a refresh should visit.
    pub fn sync_targets(&self, only_today: Option<NaiveDate>) -> Vec<usize> {
        self.cases
            .iter()
            .enumerate()
            .filter(|(_, c)| only_today.is_none_or(|d| c.date_next_list == Some(d)))
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CaseRecord;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state_with(next: Option<NaiveDate>) -> AppState {
        AppState {
            cases: vec![CaseRecord {
                cino: Some("C1".into()),
                date_last_list: Some(ymd(2024, 1, 1)),
                date_next_list: next,
                purpose_name: Some("Evidence".into()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn update_shifts_dates_and_stage() {
        let mut s = state_with(Some(ymd(2024, 2, 1)));
        let applied = s.apply_status_update(
            0,
            &StatusUpdate {
                date_next_list: Some(ymd(2024, 3, 1)),
                purpose_name: Some("Arguments".into()),
                ..Default::default()
            },
        );
        assert!(applied);
        let c = &s.cases[0];
        assert_eq!(c.date_last_list, Some(ymd(2024, 2, 1)));
        assert_eq!(c.date_next_list, Some(ymd(2024, 3, 1)));
        assert_eq!(c.purpose_name.as_deref(), Some("Arguments"));
    }

    #[test]
    fn empty_update_still_shifts_last_date() {
        let mut s = state_with(Some(ymd(2024, 2, 1)));
        s.apply_status_update(0, &StatusUpdate {
            purpose_name: Some("  ".into()),
            ..Default::default()
        });
        let c = &s.cases[0];
        assert_eq!(c.date_last_list, Some(ymd(2024, 2, 1)));
        assert_eq!(c.date_next_list, Some(ymd(2024, 2, 1)));
        assert_eq!(c.purpose_name.as_deref(), Some("Evidence"));
    }

    #[test]
    fn out_of_range_index_ignored() {
        let mut s = state_with(None);
        assert!(!s.apply_status_update(5, &StatusUpdate::default()));
    }

    #[test]
    fn roll_only_when_update_reports_tomorrow() {
        let today = ymd(2024, 2, 1);
        let mut s = state_with(Some(today));
        let later = StatusUpdate {
            date_next_list: Some(ymd(2024, 2, 20)),
            ..Default::default()
        };
        assert!(!s.roll_to_tomorrow(0, today, &later));

        let tomorrow = StatusUpdate {
            date_next_list: Some(ymd(2024, 2, 2)),
            ..Default::default()
        };
        assert!(s.roll_to_tomorrow(0, today, &tomorrow));
        assert_eq!(s.cases[0].date_last_list, Some(today));
        assert_eq!(s.cases[0].date_next_list, Some(ymd(2024, 2, 2)));
    }

    #[test]
    fn targets_filter_by_today() {
        let s = state_with(Some(ymd(2024, 2, 1)));
        assert_eq!(s.sync_targets(None), vec![0]);
        assert_eq!(s.sync_targets(Some(ymd(2024, 2, 1))), vec![0]);
        assert!(s.sync_targets(Some(ymd(2024, 2, 2))).is_empty());
    }
}
