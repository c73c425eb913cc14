//! Billing and time tracking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{CoreError, Result};
use crate::state::AppState;

/// Case value for entries not tied to a single case.
pub const GENERAL: &str = "General";

pub const DEFAULT_SERVICE_TYPES: &[&str] = &[
    "Hearing/Appearing Charges",
    "Witness Preparation Charges",
    "Drafting Legal Fees",
    "Notice Charges",
    "Legal Opinion Charges",
    "Registration Charges",
    "Filing Legal Fees",
    "Other",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeType {
    #[serde(rename = "Service Fee (Fixed)")]
    Fixed,
    #[serde(rename = "Time Based (Hourly)")]
    Hourly,
}

impl FeeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "Service Fee (Fixed)",
            Self::Hourly => "Time Based (Hourly)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingEntry {
    /// A CINO or [`GENERAL`].
    pub case: String,
    pub date: NaiveDate,
    pub service_type: String,
    pub description: String,
    pub fee_type: FeeType,
    /// INR.
    pub amount: f64,
    /// Hours; always 0 for fixed fees.
    pub time_spent: f64,
}

/// Input for [`AppState::add_billing_entry`].
#[derive(Debug, Clone)]
pub struct NewBillingEntry {
    pub case: String,
    pub date: NaiveDate,
    pub service_type: String,
    pub description: String,
    pub fee_type: FeeType,
    pub amount: f64,
    pub time_spent: f64,
}

/// Which entries a summary covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingFilter {
    All,
    Case(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BillingSummary<'a> {
    pub entries: Vec<&'a BillingEntry>,
    pub total_amount: f64,
    pub total_time: f64,
}

impl AppState {
    pub fn add_billing_entry(&mut self, new: NewBillingEntry) -> Result<()> {
        if !new.amount.is_finite() || new.amount <= 0.0 {
            return Err(CoreError::invalid("Amount must be greater than zero."));
        }
        if !new.time_spent.is_finite() || new.time_spent < 0.0 {
            return Err(CoreError::invalid("Time spent cannot be negative."));
        }
        if !self.service_types.iter().any(|s| s == &new.service_type) {
            return Err(CoreError::invalid(format!(
                "Unknown billing category: {}",
                new.service_type
            )));
        }
        if new.case != GENERAL {
            self.require_case(&new.case)?;
        }
        let time_spent = match new.fee_type {
            FeeType::Hourly => new.time_spent,
            FeeType::Fixed => 0.0,
        };
        self.billing_entries.push(BillingEntry {
            case: new.case,
            date: new.date,
            service_type: new.service_type,
            description: new.description.trim().to_string(),
            fee_type: new.fee_type,
            amount: new.amount,
            time_spent,
        });
        info!(count = self.billing_entries.len(), "billing entry added");
        Ok(())
    }

    pub fn remove_billing_entry(&mut self, index: usize) -> Result<BillingEntry> {
        if index >= self.billing_entries.len() {
            return Err(CoreError::invalid(format!("No billing entry #{index}")));
        }
        Ok(self.billing_entries.remove(index))
    }

    pub fn billing_summary(&self, filter: &BillingFilter) -> BillingSummary<'_> {
        let entries: Vec<&BillingEntry> = self
            .billing_entries
            .iter()
            .filter(|e| match filter {
                BillingFilter::All => true,
                BillingFilter::Case(c) => &e.case == c,
            })
            .collect();
        let total_amount = entries.iter().map(|e| e.amount).sum();
        let total_time = entries.iter().map(|e| e.time_spent).sum();
        BillingSummary {
            entries,
            total_amount,
            total_time,
        }
    }

    /// Add a billing category. Returns `false` if it already exists.
    pub fn add_service_type(&mut self, name: &str) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::invalid("Billing category cannot be empty."));
        }
        if self.service_types.iter().any(|s| s == name) {
            return Ok(false);
        }
        self.service_types.push(name.to_string());
        Ok(true)
    }

    pub fn remove_service_type(&mut self, name: &str) -> bool {
        let before = self.service_types.len();
        self.service_types.retain(|s| s != name);
        self.service_types.len() != before
    }
}
