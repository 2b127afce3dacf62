use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Roles recognized by the Stockroom backend. `viewer` may never invoke a
/// workflow transition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    Admin,
    Manager,
    Viewer,
}

/// Identity and credential for one signed-in user.
///
/// Passed explicitly to every client call instead of living in ambient
/// state, so the workflow engine stays testable without a UI context. The
/// role carried here gates actions for display only; the server re-checks
/// every transition against its own session data.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: Uuid,
    pub username: String,
    pub role: UserRole,
    /// Bearer token attached verbatim to every request.
    pub token: String,
}

impl Session {
    pub fn new(user_id: Uuid, username: impl Into<String>, role: UserRole, token: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
            token: token.into(),
        }
    }
}
