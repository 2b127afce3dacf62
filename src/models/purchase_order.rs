use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Lifecycle states of a purchase order. The set is closed; the backend never
/// produces any other value.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Draft,
    PendingApproval,
    Approved,
    Rejected,
    SentToVendor,
    Delivered,
}

impl PurchaseOrderStatus {
    /// Terminal states offer no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Delivered)
    }

    /// Human-readable badge text: `pending_approval` renders as
    /// "pending approval".
    pub fn label(self) -> String {
        self.to_string().replace('_', " ")
    }
}

/// One order placed with a supplier, as returned by the backend.
///
/// The temporal fields are each set at most once, in chronological order when
/// present. `approved_date` and `rejected_date` are mutually exclusive:
/// approval and rejection are the two terminal branches out of
/// `pending_approval`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub po_number: String,
    pub supplier_id: Uuid,
    pub warehouse_id: Uuid,
    pub status: PurchaseOrderStatus,
    pub order_date: DateTime<Utc>,
    #[serde(default)]
    pub expected_delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub actual_delivery_date: Option<NaiveDate>,
    pub total_amount: Decimal,
    pub created_by: Uuid,
    #[serde(default)]
    pub approved_by: Option<Uuid>,
    #[serde(default)]
    pub approved_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rejected_by: Option<Uuid>,
    #[serde(default)]
    pub rejected_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sent_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivered_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comments: Option<String>,
}
