//! Persistent per-session settings.

use chrono::{DateTime, FixedOffset, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::category::Thresholds;

pub const DEFAULT_API_URL: &str = "https://eciapi.akshit.me";

/// Asia/Kolkata, UTC+05:30. Court schedules run on this clock.
pub fn court_offset() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("+05:30 is a valid offset")
}

/// How long after the auto-sync time a roll-over is still attempted.
const ROLL_WINDOW_MINUTES: i64 = 5;

/// App name and subtitle printed on every export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branding {
    pub app_name: String,
    pub subtitle: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            app_name: "Case Pilot".to_string(),
            subtitle: "A Case Management Tool".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_url: String,
    pub api_key: Option<String>,
    /// Court-local time after which today's cases are rolled to tomorrow.
    pub auto_sync_time: NaiveTime,
    pub thresholds: Thresholds,
    pub branding: Branding,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            auto_sync_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            thresholds: Thresholds::default(),
            branding: Branding::default(),
        }
    }
}

impl Settings {
    /// Whether `now` falls in the roll-over window after the auto-sync time.
    pub fn in_roll_window(&self, now: DateTime<FixedOffset>) -> bool {
        let local = now.with_timezone(&court_offset()).time();
        let start = self.auto_sync_time;
        let (end, _) = start.overflowing_add_signed(TimeDelta::minutes(ROLL_WINDOW_MINUTES));
        if start <= end {
            local >= start && local < end
        } else {
            local >= start || local < end
        }
    }
}
