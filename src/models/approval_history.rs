use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::purchase_order::PurchaseOrderStatus;

/// Immutable audit record of a single status transition. Created exactly once
/// per successful transition by the backend; never mutated or deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApprovalHistoryEntry {
    pub id: Uuid,
    pub purchase_order_id: Uuid,
    pub user_id: Uuid,
    /// Acting user's name, resolved server-side; absent if the user record
    /// was deleted.
    #[serde(default)]
    pub username: Option<String>,
    pub from_status: PurchaseOrderStatus,
    pub to_status: PurchaseOrderStatus,
    #[serde(default)]
    pub comments: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ApprovalHistoryEntry {
    /// Badge text for display, e.g. "pending approval -> approved".
    pub fn badge(&self) -> String {
        format!("{} -> {}", self.from_status.label(), self.to_status.label())
    }
}
