//! Stockroom Approvals Client
//!
//! Client-side engine for the purchase-order approval workflow of the
//! Stockroom inventory API: the order status state machine, the role-gated
//! transition table, derived lead-time metrics, and the timeline and
//! approval-history views. The backend stays the sole authority over order
//! state; this crate validates transitions before sending, never applies them
//! optimistically, and invalidates its cache on every successful write.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod workflow;

pub use auth::{Session, UserRole};
pub use client::ApprovalsClient;
pub use errors::ApprovalError;
pub use models::approval_history::ApprovalHistoryEntry;
pub use models::purchase_order::{PurchaseOrder, PurchaseOrderStatus};
pub use workflow::lead_time::LeadTimeMetrics;
pub use workflow::transitions::{available_actions, validate_transition, ApprovalAction};
