//! Domain models for Tally

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Spending categories assigned by keyword precedence.
///
/// Closed set; anything that matches no keyword group falls to `Other`.
/// Serialized by variant name, which is also the stored label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Subscription,
    Rent,
    Groceries,
    Fitness,
    Dining,
    Transport,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscription => "Subscription",
            Self::Rent => "Rent",
            Self::Groceries => "Groceries",
            Self::Fitness => "Fitness",
            Self::Dining => "Dining",
            Self::Transport => "Transport",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Billing cadence attached to recurring charges.
///
/// Ingestion assumes monthly cadence for everything it flags; no other
/// frequency is ever inferred from a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
        }
    }
}

/// Subscription lifecycle state at creation time.
///
/// Every detected subscription starts out `Active`; cancellation happens in
/// the management workflow downstream, never during ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
        }
    }
}

/// A normalized transaction produced from one statement row.
///
/// Invariant: `description` is non-empty and `amount` is non-zero; rows
/// that cannot satisfy both are dropped before a record is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Uploading user; opaque to the pipeline.
    pub user_id: String,
    /// Calendar date of the charge, serialized `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub description: String,
    /// Signed, accounting convention: negative = outflow, positive = inflow.
    pub amount: f64,
    pub category: Category,
    pub is_recurring: bool,
    /// `Some(Monthly)` iff `is_recurring`; serialized `"monthly"` or `null`.
    pub recurring_frequency: Option<Frequency>,
    /// Cleaned description, at most 50 characters. Also the key that groups
    /// recurring charges into one subscription.
    pub merchant: String,
}

/// A subscription inferred from the recurring transactions of one upload.
///
/// Seeded from the first occurrence of its merchant within the batch:
/// `amount` and `last_charged` come from that first row and are not updated
/// by later occurrences. That is deliberate, if surprising; see the
/// first-seen-wins policy note in DESIGN.md before changing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedSubscription {
    pub user_id: String,
    /// Merchant key of the first occurrence.
    pub service_name: String,
    /// Absolute value of the first occurrence's amount.
    pub amount: f64,
    pub frequency: Frequency,
    pub last_charged: NaiveDate,
    /// `amount * 12`, assuming monthly cadence.
    pub estimated_annual_cost: f64,
    /// Filled in later by the cancellation-link lookup, never here.
    pub cancellation_url: Option<String>,
    pub status: SubscriptionStatus,
}
