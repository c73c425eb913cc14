//! Personal notes, dossier timelines, and reminders.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CoreError, Result};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub date: NaiveDate,
    pub text: String,
}

/// One event on a case's dossier timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DossierEntry {
    pub date: NaiveDate,
    pub event: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub text: String,
    pub due: NaiveDate,
}

fn non_empty(text: &str, msg: &str) -> Result<String> {
    let t = text.trim();
    if t.is_empty() {
        return Err(CoreError::invalid(msg));
    }
    Ok(t.to_string())
}

impl AppState {
    /// Attach a note to a loaded case.
    pub fn add_note(&mut self, cino: &str, date: NaiveDate, text: &str) -> Result<()> {
        let text = non_empty(text, "Note text cannot be empty.")?;
        self.require_case(cino)?;
        self.case_notes
            .entry(cino.to_string())
            .or_default()
            .push(Note { date, text });
        info!(cino, "note added");
        Ok(())
    }

    pub fn notes(&self, cino: &str) -> &[Note] {
        self.case_notes.get(cino).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add_dossier_entry(&mut self, cino: &str, date: NaiveDate, event: &str) -> Result<()> {
        let event = non_empty(event, "Timeline event cannot be empty.")?;
        self.require_case(cino)?;
        let timeline = self.case_dossiers.entry(cino.to_string()).or_default();
        timeline.push(DossierEntry { date, event });
        timeline.sort_by_key(|e| e.date);
        Ok(())
    }

    pub fn dossier(&self, cino: &str) -> &[DossierEntry] {
        self.case_dossiers
            .get(cino)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn add_reminder(&mut self, text: &str, due: NaiveDate) -> Result<()> {
        let text = non_empty(text, "Task description cannot be empty.")?;
        self.reminders.push(Reminder { text, due });
        Ok(())
    }

    /// Reminders ordered by due date; equal dates keep insertion order.
    pub fn reminders_by_due(&self) -> Vec<&Reminder> {
        let mut out: Vec<&Reminder> = self.reminders.iter().collect();
        out.sort_by_key(|r| r.due);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CaseRecord;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state() -> AppState {
        AppState {
            cases: vec![CaseRecord {
                cino: Some("C1".into()),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn note_is_trimmed_and_stored() {
        let mut s = state();
        s.add_note("C1", ymd(2024, 3, 1), "  call client  ").unwrap();
        assert_eq!(s.notes("C1"), &[Note { date: ymd(2024, 3, 1), text: "call client".into() }]);
    }

    #[test]
    fn empty_note_rejected_without_mutation() {
        let mut s = state();
        let err = s.add_note("C1", ymd(2024, 3, 1), "   ").unwrap_err();
        assert_eq!(err.to_string(), "Note text cannot be empty.");
        assert!(s.case_notes.is_empty());
    }

    #[test]
    fn note_for_unknown_case_rejected() {
        let mut s = state();
        assert!(matches!(
            s.add_note("nope", ymd(2024, 3, 1), "x"),
            Err(CoreError::UnknownCase(_))
        ));
    }

    #[test]
    fn dossier_stays_chronological() {
        let mut s = state();
        s.add_dossier_entry("C1", ymd(2024, 5, 1), "Evidence closed").unwrap();
        s.add_dossier_entry("C1", ymd(2024, 1, 1), "Filed").unwrap();
        let events: Vec<&str> = s.dossier("C1").iter().map(|e| e.event.as_str()).collect();
        assert_eq!(events, ["Filed", "Evidence closed"]);
    }

    #[test]
    fn reminders_sorted_by_due() {
        let mut s = state();
        s.add_reminder("file reply", ymd(2024, 4, 2)).unwrap();
        s.add_reminder("pay court fee", ymd(2024, 4, 1)).unwrap();
        assert!(s.add_reminder("", ymd(2024, 4, 1)).is_err());
        let texts: Vec<&str> = s.reminders_by_due().iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["pay court fee", "file reply"]);
    }
}
