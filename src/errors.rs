use serde::Deserialize;
use uuid::Uuid;

use crate::models::purchase_order::PurchaseOrderStatus;
use crate::workflow::transitions::ApprovalAction;

/// Error payload returned by the Stockroom backend, e.g. `{"error": "..."}`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self, fallback: &str) -> String {
        self.error
            .or(self.message)
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    /// The action does not apply to the order's current status. Raised
    /// client-side before sending, or mapped from a server rejection when the
    /// locally known status was stale. Callers should refresh the order list
    /// to reconcile.
    #[error("cannot {action} a purchase order in '{}' status", .from.label())]
    InvalidTransition {
        from: PurchaseOrderStatus,
        action: ApprovalAction,
    },

    /// The caller's role lacks permission for the transition, either by the
    /// client-side gate or by the server (401/403). Local state is untouched.
    #[error("not authorized: {0}")]
    AuthorizationDenied(String),

    /// Malformed input rejected before sending or by the server (422).
    #[error("validation failed: {0}")]
    ValidationFailure(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// A transition for this order is already in flight from this client.
    /// Mirrors the UI rule that the action control is disabled while a
    /// request is pending.
    #[error("a transition for purchase order {0} is already in flight")]
    TransitionInFlight(Uuid),

    /// Transport error or 5xx. Retry is left to the caller; nothing is
    /// retried automatically and local state is unchanged.
    #[error("network or server failure: {0}")]
    NetworkOrServerFailure(String),
}

impl From<reqwest::Error> for ApprovalError {
    fn from(err: reqwest::Error) -> Self {
        ApprovalError::NetworkOrServerFailure(err.to_string())
    }
}
