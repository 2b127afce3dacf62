use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;

use crate::models::purchase_order::{PurchaseOrder, PurchaseOrderStatus};

use super::lead_time::LeadTimeMetrics;

/// Display state of one lifecycle checkpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum CheckpointState {
    Completed,
    InProgress,
    Rejected,
    Pending,
}

impl CheckpointState {
    /// Marker glyph used by the terminal renderer.
    pub fn glyph(self) -> char {
        match self {
            Self::Completed => '✓',
            Self::InProgress => '●',
            Self::Rejected => '✗',
            Self::Pending => '○',
        }
    }
}

/// One entry of the five-step lifecycle view.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimelineCheckpoint {
    pub label: &'static str,
    pub state: CheckpointState,
    /// Timestamp of the underlying event, when recorded. An in-progress
    /// checkpoint has no timestamp; the renderer shows "now" for it.
    pub date: Option<DateTime<Utc>>,
    /// Supplementary lead-time figure for this leg, if computable.
    pub days: Option<i64>,
}

/// Builds the five lifecycle checkpoints for `order`, always in the same
/// order: Created, Pending Approval, Approved/Rejected, Sent to Vendor,
/// Delivered. A checkpoint's state depends only on the presence of the
/// corresponding temporal fields (plus the status equality check for
/// in-progress), never on today's date.
pub fn build_timeline(order: &PurchaseOrder) -> [TimelineCheckpoint; 5] {
    let metrics = LeadTimeMetrics::for_order(order);

    let pending_state = if order.approved_date.is_some() {
        CheckpointState::Completed
    } else if order.status == PurchaseOrderStatus::PendingApproval {
        CheckpointState::InProgress
    } else {
        CheckpointState::Pending
    };

    let (decision_label, decision_state, decision_date) = if order.approved_date.is_some() {
        ("Order Approved", CheckpointState::Completed, order.approved_date)
    } else if order.rejected_date.is_some() {
        ("Order Rejected", CheckpointState::Rejected, order.rejected_date)
    } else {
        ("Order Approved", CheckpointState::Pending, None)
    };

    [
        TimelineCheckpoint {
            label: "Order Created",
            state: CheckpointState::Completed,
            date: Some(order.order_date),
            days: None,
        },
        TimelineCheckpoint {
            label: "Pending Approval",
            state: pending_state,
            date: order.approved_date,
            days: metrics.approval_days,
        },
        TimelineCheckpoint {
            label: decision_label,
            state: decision_state,
            date: decision_date,
            days: None,
        },
        TimelineCheckpoint {
            label: "Sent to Vendor",
            state: if order.sent_date.is_some() {
                CheckpointState::Completed
            } else {
                CheckpointState::Pending
            },
            date: order.sent_date,
            days: metrics.send_days,
        },
        TimelineCheckpoint {
            label: "Delivered",
            state: if order.delivered_date.is_some() {
                CheckpointState::Completed
            } else {
                CheckpointState::Pending
            },
            date: order.delivered_date,
            days: metrics.delivery_days,
        },
    ]
}
