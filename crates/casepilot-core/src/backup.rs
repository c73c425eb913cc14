//! JSON backup and restore of the whole session, minus settings.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::billing::{BillingEntry, DEFAULT_SERVICE_TYPES};
use crate::documents::DocumentRecord;
use crate::error::Result;
use crate::notes::{DossierEntry, Note, Reminder};
use crate::record::CaseRecord;
use crate::state::{AppState, default_columns};

/// On-disk backup document. Every key is optional on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Backup {
    pub cases: Vec<CaseRecord>,
    pub case_notes: BTreeMap<String, Vec<Note>>,
    pub case_dossiers: BTreeMap<String, Vec<DossierEntry>>,
    pub case_papers: BTreeMap<String, Vec<DocumentRecord>>,
    pub pinned_cases: BTreeSet<String>,
    pub reminders: Vec<Reminder>,
    pub billing_entries: Vec<BillingEntry>,
    pub service_types: Vec<String>,
    pub causelist_columns: Vec<String>,
    pub last_sync_date: Option<NaiveDate>,
}

impl Default for Backup {
    fn default() -> Self {
        Self {
            cases: Vec::new(),
            case_notes: BTreeMap::new(),
            case_dossiers: BTreeMap::new(),
            case_papers: BTreeMap::new(),
            pinned_cases: BTreeSet::new(),
            reminders: Vec::new(),
            billing_entries: Vec::new(),
            service_types: DEFAULT_SERVICE_TYPES.iter().map(|s| s.to_string()).collect(),
            causelist_columns: default_columns(),
            last_sync_date: None,
        }
    }
}

impl AppState {
    pub fn backup(&self) -> Backup {
        Backup {
            cases: self.cases.clone(),
            case_notes: self.case_notes.clone(),
            case_dossiers: self.case_dossiers.clone(),
            case_papers: self.case_papers.clone(),
            pinned_cases: self.pinned_cases.clone(),
            reminders: self.reminders.clone(),
            billing_entries: self.billing_entries.clone(),
            service_types: self.service_types.clone(),
            causelist_columns: self.causelist_columns.clone(),
            last_sync_date: self.last_sync_date,
        }
    }

    pub fn backup_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(&self.backup())?)
    }

    /// Replace all backed-up state. Settings are kept.
    pub fn restore(&mut self, backup: Backup) {
        let Backup {
            cases,
            case_notes,
            case_dossiers,
            case_papers,
            pinned_cases,
            reminders,
            billing_entries,
            service_types,
            causelist_columns,
            last_sync_date,
        } = backup;
        self.cases = cases;
        self.case_notes = case_notes;
        self.case_dossiers = case_dossiers;
        self.case_papers = case_papers;
        self.pinned_cases = pinned_cases;
        self.reminders = reminders;
        self.billing_entries = billing_entries;
        self.service_types = service_types;
        self.causelist_columns = if causelist_columns.is_empty() {
            default_columns()
        } else {
            causelist_columns
        };
        self.last_sync_date = last_sync_date;
        info!(cases = self.cases.len(), "backup restored");
    }

    /// Parse and restore a backup document. Malformed input changes nothing.
    pub fn restore_json(&mut self, bytes: &[u8]) -> Result<()> {
        let backup: Backup = serde_json::from_slice(bytes)?;
        self.restore(backup);
        Ok(())
    }
}
