//! Row-to-record mapping and batch orchestration
//!
//! One statement upload is a single pass over its rows: each row either
//! becomes a transaction or is skipped for a named reason, and recurring
//! transactions fold into a first-seen-wins subscription collection. A bad
//! row never fails the batch; an empty batch is the caller's error.

use std::collections::HashSet;

use tracing::debug;

use crate::amount::derive_amount;
use crate::classify::{categorize, extract_merchant, is_recurring};
use crate::dates::parse_date;
use crate::error::{Error, Result};
use crate::fields::{extract_date_value, extract_description};
use crate::models::{DetectedSubscription, Frequency, SubscriptionStatus, Transaction};
use crate::rows::RawRow;

/// Why a row was rejected. Skips are logged, never surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    EmptyDescription,
    UnparseableAmount,
    ZeroAmount,
}

impl Skip {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyDescription => "empty description",
            Self::UnparseableAmount => "unparseable amount",
            Self::ZeroAmount => "zero amount",
        }
    }
}

/// A successfully mapped row: the transaction plus the pieces the batch
/// orchestrator needs for subscription aggregation.
#[derive(Debug, Clone)]
pub struct MappedRow {
    pub transaction: Transaction,
    pub merchant: String,
    pub subscription_amount: f64,
}

/// Everything one upload produces.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    pub transactions: Vec<Transaction>,
    pub subscriptions: Vec<DetectedSubscription>,
}

/// Map one raw row to a transaction record, or name the reason it cannot be.
///
/// Pure and side-effect-free; the whole per-row pipeline is testable through
/// this one function.
pub fn map_row(row: &RawRow, user_id: &str) -> std::result::Result<MappedRow, Skip> {
    let description = extract_description(row);
    if description.is_empty() {
        return Err(Skip::EmptyDescription);
    }

    let amount = derive_amount(row).ok_or(Skip::UnparseableAmount)?;
    if !amount.is_finite() {
        return Err(Skip::UnparseableAmount);
    }
    if amount == 0.0 {
        return Err(Skip::ZeroAmount);
    }

    let date = parse_date(extract_date_value(row));
    let category = categorize(&description);
    let recurring = is_recurring(&description);
    let merchant = extract_merchant(&description);

    let transaction = Transaction {
        user_id: user_id.to_string(),
        date,
        description,
        amount,
        category,
        is_recurring: recurring,
        recurring_frequency: recurring.then_some(Frequency::Monthly),
        merchant: merchant.clone(),
    };

    Ok(MappedRow {
        transaction,
        merchant,
        subscription_amount: amount.abs(),
    })
}

/// Run the full batch: map every row, collect transactions, and fold
/// recurring ones into per-merchant subscriptions.
///
/// First-seen-wins: the first row for a merchant seeds that subscription's
/// amount and `last_charged`; later rows for the same merchant add
/// transactions but never touch the subscription record.
///
/// Returns [`Error::NoTransactions`] both for an empty row sequence and for
/// one where every row was skipped: the user-visible "no valid transactions
/// found" condition, distinct from the silent per-row skips.
pub fn process_rows(rows: &[RawRow], user_id: &str) -> Result<IngestOutcome> {
    if rows.is_empty() {
        return Err(Error::NoTransactions);
    }

    let mut outcome = IngestOutcome::default();
    let mut seen_merchants: HashSet<String> = HashSet::new();

    for (index, row) in rows.iter().enumerate() {
        let mapped = match map_row(row, user_id) {
            Ok(mapped) => mapped,
            Err(skip) => {
                debug!(row = index, reason = skip.as_str(), "skipping statement row");
                continue;
            }
        };

        if mapped.transaction.is_recurring && seen_merchants.insert(mapped.merchant.clone()) {
            outcome.subscriptions.push(DetectedSubscription {
                user_id: user_id.to_string(),
                service_name: mapped.merchant.clone(),
                amount: mapped.subscription_amount,
                frequency: Frequency::Monthly,
                last_charged: mapped.transaction.date,
                estimated_annual_cost: mapped.subscription_amount * 12.0,
                cancellation_url: None,
                status: SubscriptionStatus::Active,
            });
        }

        outcome.transactions.push(mapped.transaction);
    }

    if outcome.transactions.is_empty() {
        return Err(Error::NoTransactions);
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::NaiveDate;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_map_row_full_record() {
        let r = row(&[
            ("Date", "15/01/2025"),
            ("Description", "Netflix"),
            ("Amount", "-9.99"),
        ]);

        let mapped = map_row(&r, "user-1").unwrap();
        let tx = &mapped.transaction;
        assert_eq!(tx.user_id, "user-1");
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(tx.amount, -9.99);
        assert_eq!(tx.category, Category::Subscription);
        assert!(tx.is_recurring);
        assert_eq!(tx.recurring_frequency, Some(Frequency::Monthly));
        assert_eq!(mapped.merchant, "Netflix");
        assert_eq!(mapped.subscription_amount, 9.99);
    }

    #[test]
    fn test_map_row_rejects_empty_description() {
        let r = row(&[("Date", "15/01/2025"), ("Amount", "-9.99")]);
        assert!(matches!(map_row(&r, "user-1"), Err(Skip::EmptyDescription)));

        let r = row(&[("Description", "   "), ("Amount", "-9.99")]);
        assert!(matches!(map_row(&r, "user-1"), Err(Skip::EmptyDescription)));
    }

    #[test]
    fn test_map_row_rejects_missing_or_bad_amount() {
        let r = row(&[("Description", "Netflix")]);
        assert!(matches!(map_row(&r, "user-1"), Err(Skip::UnparseableAmount)));

        let r = row(&[("Description", "Netflix"), ("Amount", "n/a")]);
        assert!(matches!(map_row(&r, "user-1"), Err(Skip::UnparseableAmount)));
    }

    #[test]
    fn test_map_row_rejects_zero_amount() {
        let r = row(&[("Description", "Netflix"), ("Amount", "0.00")]);
        assert!(matches!(map_row(&r, "user-1"), Err(Skip::ZeroAmount)));
    }

    #[test]
    fn test_map_row_debit_column() {
        let r = row(&[
            ("Transaction Date", "02/02/2025"),
            ("Narrative", "PureGym"),
            ("Debit", "35.00"),
        ]);

        let mapped = map_row(&r, "user-1").unwrap();
        assert_eq!(mapped.transaction.amount, -35.0);
        assert_eq!(
            mapped.transaction.date,
            NaiveDate::from_ymd_opt(2025, 2, 2).unwrap()
        );
    }

    #[test]
    fn test_process_rows_empty_input_is_error() {
        assert!(matches!(
            process_rows(&[], "user-1"),
            Err(Error::NoTransactions)
        ));
    }

    #[test]
    fn test_process_rows_all_skipped_is_error() {
        let rows = vec![
            row(&[("Description", ""), ("Amount", "1.00")]),
            row(&[("Description", "Netflix"), ("Amount", "zero")]),
        ];
        assert!(matches!(
            process_rows(&rows, "user-1"),
            Err(Error::NoTransactions)
        ));
    }

    #[test]
    fn test_process_rows_bad_row_does_not_abort_batch() {
        let rows = vec![
            row(&[("Description", "Netflix"), ("Amount", "-9.99")]),
            row(&[("Description", ""), ("Amount", "1.00")]),
            row(&[("Description", "Tesco"), ("Amount", "-20.00")]),
        ];

        let outcome = process_rows(&rows, "user-1").unwrap();
        assert_eq!(outcome.transactions.len(), 2);
    }

    #[test]
    fn test_process_rows_first_seen_wins() {
        let rows = vec![
            row(&[
                ("Date", "15/01/2025"),
                ("Description", "Netflix"),
                ("Amount", "-9.99"),
            ]),
            row(&[
                ("Date", "15/02/2025"),
                ("Description", "Netflix"),
                ("Amount", "-12.99"),
            ]),
        ];

        let outcome = process_rows(&rows, "user-1").unwrap();
        assert_eq!(outcome.transactions.len(), 2);
        assert_eq!(outcome.subscriptions.len(), 1);

        let sub = &outcome.subscriptions[0];
        assert_eq!(sub.service_name, "Netflix");
        // The first occurrence seeds the record; the February price change
        // is ignored within this batch.
        assert_eq!(sub.amount, 9.99);
        assert_eq!(
            sub.last_charged,
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
        );
        assert_eq!(sub.estimated_annual_cost, 9.99 * 12.0);
        assert_eq!(sub.frequency, Frequency::Monthly);
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert!(sub.cancellation_url.is_none());
    }

    #[test]
    fn test_process_rows_end_to_end_scenario() {
        let rows = vec![
            row(&[
                ("Date", "15/01/2025"),
                ("Description", "Netflix"),
                ("Amount", "-9.99"),
            ]),
            row(&[
                ("Date", "2025-01-31"),
                ("Description", "Salary"),
                ("Amount", "2,000.00"),
            ]),
            row(&[
                ("Date", "01/02/2025"),
                ("Description", "Groceries Tesco"),
                ("Amount", "-96,50"),
            ]),
            row(&[
                ("Date", "02/02/2025"),
                ("Description", "Gym Membership"),
                ("Amount", "-35.00"),
            ]),
        ];

        let outcome = process_rows(&rows, "user-1").unwrap();
        assert_eq!(outcome.transactions.len(), 4);

        let amounts: Vec<f64> = outcome.transactions.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![-9.99, 2000.0, -96.50, -35.0]);

        let net: f64 = amounts.iter().sum();
        assert!((net - 1858.51).abs() < 1e-9);

        assert!(outcome.transactions[0].is_recurring);
        assert!(!outcome.transactions[1].is_recurring);
        assert!(!outcome.transactions[2].is_recurring);
        assert!(outcome.transactions[3].is_recurring);

        assert_eq!(outcome.transactions[2].category, Category::Groceries);
        assert_eq!(
            outcome.transactions[2].date,
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
        );

        let names: Vec<&str> = outcome
            .subscriptions
            .iter()
            .map(|s| s.service_name.as_str())
            .collect();
        assert_eq!(names, vec!["Netflix", "Gym Membership"]);
    }
}
