//! Case records, classification rules, and session state for Case Pilot.

pub mod backup;
pub mod billing;
pub mod category;
pub mod dates;
pub mod documents;
mod error;
pub mod import;
pub mod notes;
pub mod record;
pub mod settings;
pub mod sort_key;
pub mod state;
pub mod status;

pub use backup::Backup;
pub use billing::{BillingEntry, BillingFilter, BillingSummary, FeeType, NewBillingEntry};
pub use category::{Category, Classifier, Rule, Thresholds};
pub use documents::{DocumentRecord, DocumentType};
pub use error::{CoreError, Result};
pub use notes::{DossierEntry, Note, Reminder};
pub use record::{CaseRecord, DisplayRow, columns};
pub use settings::{Branding, Settings};
pub use state::{AppState, CauseListSection, Move};
pub use status::StatusUpdate;
