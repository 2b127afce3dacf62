use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::purchase_order::PurchaseOrder;

/// Lead-time figures derived from an order's temporal fields, in whole days.
///
/// The backend returns these precomputed alongside the order; this derivation
/// reproduces the same formulas for local recomputation and testing. Each
/// interval figure is `None` whenever either endpoint is missing, and
/// non-negative otherwise because the temporal fields are chronologically
/// ordered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadTimeMetrics {
    /// order_date -> approved_date
    pub approval_days: Option<i64>,
    /// approved_date -> sent_date
    pub send_days: Option<i64>,
    /// sent_date -> delivered_date
    pub delivery_days: Option<i64>,
    /// order_date -> delivered_date
    pub total_days: Option<i64>,
    /// expected_delivery_date -> actual_delivery_date; positive means late,
    /// zero or negative means on time or early.
    pub variance_days: Option<i64>,
}

fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_days()
}

impl LeadTimeMetrics {
    /// Derives every figure from `order`. Pure; no clock is consulted.
    pub fn for_order(order: &PurchaseOrder) -> Self {
        let approval_days = order
            .approved_date
            .map(|approved| days_between(order.order_date, approved));
        let send_days = order
            .approved_date
            .zip(order.sent_date)
            .map(|(approved, sent)| days_between(approved, sent));
        let delivery_days = order
            .sent_date
            .zip(order.delivered_date)
            .map(|(sent, delivered)| days_between(sent, delivered));
        let total_days = order
            .delivered_date
            .map(|delivered| days_between(order.order_date, delivered));
        let variance_days = order
            .expected_delivery_date
            .zip(order.actual_delivery_date)
            .map(|(expected, actual)| (actual - expected).num_days());

        Self {
            approval_days,
            send_days,
            delivery_days,
            total_days,
            variance_days,
        }
    }

    /// True when the order arrived after its expected delivery date.
    pub fn is_late(&self) -> bool {
        self.variance_days.is_some_and(|days| days > 0)
    }
}
