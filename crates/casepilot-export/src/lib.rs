//! Cause-list and billing exports.
//!
//! Spreadsheets go through [`xlsx::SheetModel`] and PDFs through
//! [`pdf::DocumentPlan`]; both are plain data so layout is testable without
//! opening the rendered bytes.

mod error;
pub mod layout;
pub mod metrics;
pub mod pdf;
pub mod xlsx;

pub use error::{ExportError, Result};
pub use layout::{cause_list_stem, truncate_cell};
pub use pdf::{DocumentPlan, cause_list_pdf, plan_cause_list};
pub use xlsx::{SheetModel, billing_xlsx, cause_list_xlsx, write_xlsx};
