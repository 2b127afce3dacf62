use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::auth::UserRole;
use crate::errors::ApprovalError;
use crate::models::purchase_order::PurchaseOrderStatus;

/// The five role-gated actions of the approval workflow. Each action applies
/// to exactly one source status and moves the order to exactly one target.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ApprovalAction {
    Submit,
    Approve,
    Reject,
    Send,
    Deliver,
}

impl ApprovalAction {
    /// The only status this action is valid from.
    pub fn valid_from(self) -> PurchaseOrderStatus {
        match self {
            Self::Submit => PurchaseOrderStatus::Draft,
            Self::Approve | Self::Reject => PurchaseOrderStatus::PendingApproval,
            Self::Send => PurchaseOrderStatus::Approved,
            Self::Deliver => PurchaseOrderStatus::SentToVendor,
        }
    }

    /// The status a successful invocation moves the order to.
    pub fn target(self) -> PurchaseOrderStatus {
        match self {
            Self::Submit => PurchaseOrderStatus::PendingApproval,
            Self::Approve => PurchaseOrderStatus::Approved,
            Self::Reject => PurchaseOrderStatus::Rejected,
            Self::Send => PurchaseOrderStatus::SentToVendor,
            Self::Deliver => PurchaseOrderStatus::Delivered,
        }
    }

    /// Roles permitted to invoke the action. Only approval and rejection are
    /// restricted to admins.
    pub fn allowed_roles(self) -> &'static [UserRole] {
        match self {
            Self::Approve | Self::Reject => &[UserRole::Admin],
            Self::Submit | Self::Send | Self::Deliver => &[UserRole::Admin, UserRole::Manager],
        }
    }

    pub fn permits(self, role: UserRole) -> bool {
        self.allowed_roles().contains(&role)
    }

    /// URL path segment of the backend endpoint for this action.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Send => "send",
            Self::Deliver => "deliver",
        }
    }
}

/// Actions a user with `role` may invoke on an order currently in `status`.
///
/// This is the one-row table lookup intersected with the role and depends on
/// nothing else; it drives which controls the UI offers.
pub fn available_actions(status: PurchaseOrderStatus, role: UserRole) -> Vec<ApprovalAction> {
    ApprovalAction::iter()
        .filter(|action| action.valid_from() == status && action.permits(role))
        .collect()
}

/// Checks the preconditions for invoking `action` on an order in `status` and
/// returns the target status.
///
/// The status check takes precedence: an action that does not apply to the
/// current status is an [`ApprovalError::InvalidTransition`] regardless of
/// role. A valid action invoked by an unpermitted role is an
/// [`ApprovalError::AuthorizationDenied`].
pub fn validate_transition(
    status: PurchaseOrderStatus,
    action: ApprovalAction,
    role: UserRole,
) -> Result<PurchaseOrderStatus, ApprovalError> {
    if action.valid_from() != status {
        return Err(ApprovalError::InvalidTransition {
            from: status,
            action,
        });
    }
    if !action.permits(role) {
        return Err(ApprovalError::AuthorizationDenied(format!(
            "role '{}' may not {} purchase orders",
            role, action
        )));
    }
    Ok(action.target())
}
