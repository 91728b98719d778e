//! Monthly cash-flow aggregation over payments.

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::models::{CashFlowPoint, Payment, PaymentStatus};

/// Group payments by calendar month, summing settled amounts into `income`
/// and unsettled ones into `pending`. Cancelled payments contribute
/// nothing. Months come back in chronological order.
pub fn cash_flow(payments: &[Payment]) -> Vec<CashFlowPoint> {
    let mut months: BTreeMap<(i32, u32), CashFlowPoint> = BTreeMap::new();
    for payment in payments {
        let point = months
            .entry((payment.date.year(), payment.date.month()))
            .or_insert_with(|| CashFlowPoint {
                month: payment.date.format("%b %Y").to_string(),
                income: 0.0,
                pending: 0.0,
            });
        match payment.status {
            PaymentStatus::Paid => point.income += payment.amount,
            PaymentStatus::Pending => point.pending += payment.amount,
            PaymentStatus::Cancelled => {}
        }
    }
    months.into_values().collect()
}
