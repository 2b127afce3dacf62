use std::time::Duration;

use dashmap::DashSet;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use url::Url;
use uuid::Uuid;
use validator::Validate;

use crate::auth::Session;
use crate::cache::OrderCache;
use crate::config::AppConfig;
use crate::errors::{ApprovalError, ErrorBody};
use crate::models::approval_history::ApprovalHistoryEntry;
use crate::models::purchase_order::{PurchaseOrder, PurchaseOrderStatus};
use crate::workflow::transitions::{validate_transition, ApprovalAction};

/// Body of every transition request. Comments are free text, empty allowed.
#[derive(Debug, Serialize, Validate)]
struct TransitionRequest {
    #[validate(length(max = 1000))]
    comments: Option<String>,
}

/// Async client for the approval workflow endpoints of the Stockroom API.
///
/// Transitions are non-idempotent, at-most-once user actions: the client
/// validates against the latest known status before sending, keeps at most
/// one transition per order in flight, never retries automatically, and never
/// touches local state until the server confirms. On success the affected
/// cache entries are invalidated, not merged.
pub struct ApprovalsClient {
    http: Client,
    base_url: Url,
    cache: OrderCache,
    in_flight: DashSet<Uuid>,
}

/// Clears the in-flight mark when the transition request settles, success or
/// not.
struct InFlightGuard<'a> {
    set: &'a DashSet<Uuid>,
    order_id: Uuid,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.remove(&self.order_id);
    }
}

impl ApprovalsClient {
    pub fn new(config: &AppConfig) -> Result<Self, ApprovalError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                ApprovalError::NetworkOrServerFailure(format!("failed to build HTTP client: {e}"))
            })?;
        let base_url = Url::parse(&config.api_base_url).map_err(|e| {
            ApprovalError::ValidationFailure(format!("invalid api_base_url: {e}"))
        })?;
        Ok(Self::with_client(http, base_url, config.cache_ttl()))
    }

    /// Build from an existing client, useful for testing against a mock
    /// server.
    pub fn with_client(http: Client, mut base_url: Url, cache_ttl: Option<Duration>) -> Self {
        // Url::join treats the last path segment as a file without this.
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        Self {
            http,
            base_url,
            cache: OrderCache::new(cache_ttl),
            in_flight: DashSet::new(),
        }
    }

    pub fn cache(&self) -> &OrderCache {
        &self.cache
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApprovalError> {
        self.base_url
            .join(path)
            .map_err(|e| ApprovalError::ValidationFailure(format!("invalid endpoint {path}: {e}")))
    }

    /// Fetches all purchase orders, serving from cache when fresh.
    #[instrument(skip(self, session))]
    pub async fn list_purchase_orders(
        &self,
        session: &Session,
    ) -> Result<Vec<PurchaseOrder>, ApprovalError> {
        if let Some(cached) = self.cache.get_list() {
            debug!(count = cached.len(), "serving purchase order list from cache");
            return Ok(cached);
        }

        let url = self.endpoint("orders/purchase")?;
        let response = self
            .http
            .get(url)
            .bearer_auth(&session.token)
            .send()
            .await?;
        let orders: Vec<PurchaseOrder> = Self::read_success(response).await?;

        self.cache.put_list(orders.clone());
        for order in &orders {
            self.cache.put_order(order.clone());
        }
        debug!(count = orders.len(), "fetched purchase order list");
        Ok(orders)
    }

    /// Fetches one purchase order, serving from cache when fresh.
    #[instrument(skip(self, session), fields(order_id = %order_id))]
    pub async fn get_purchase_order(
        &self,
        session: &Session,
        order_id: Uuid,
    ) -> Result<PurchaseOrder, ApprovalError> {
        if let Some(cached) = self.cache.get_order(order_id) {
            return Ok(cached);
        }

        let url = self.endpoint(&format!("orders/purchase/{order_id}"))?;
        let response = self
            .http
            .get(url)
            .bearer_auth(&session.token)
            .send()
            .await?;
        let order: PurchaseOrder = Self::read_success(response).await?;
        self.cache.put_order(order.clone());
        Ok(order)
    }

    /// Fetches the approval history for one order in server order; the
    /// sequence is displayed exactly as returned.
    #[instrument(skip(self, session), fields(order_id = %order_id))]
    pub async fn get_approval_history(
        &self,
        session: &Session,
        order_id: Uuid,
    ) -> Result<Vec<ApprovalHistoryEntry>, ApprovalError> {
        if let Some(cached) = self.cache.get_history(order_id) {
            return Ok(cached);
        }

        let url = self.endpoint(&format!("approvals/purchase-order/{order_id}/history"))?;
        let response = self
            .http
            .get(url)
            .bearer_auth(&session.token)
            .send()
            .await?;
        let entries: Vec<ApprovalHistoryEntry> = Self::read_success(response).await?;
        self.cache.put_history(order_id, entries.clone());
        Ok(entries)
    }

    /// draft -> pending_approval
    pub async fn submit_for_approval(
        &self,
        session: &Session,
        order_id: Uuid,
        comments: Option<&str>,
    ) -> Result<PurchaseOrder, ApprovalError> {
        self.transition(session, order_id, ApprovalAction::Submit, comments)
            .await
    }

    /// pending_approval -> approved
    pub async fn approve_order(
        &self,
        session: &Session,
        order_id: Uuid,
        comments: Option<&str>,
    ) -> Result<PurchaseOrder, ApprovalError> {
        self.transition(session, order_id, ApprovalAction::Approve, comments)
            .await
    }

    /// pending_approval -> rejected
    pub async fn reject_order(
        &self,
        session: &Session,
        order_id: Uuid,
        comments: Option<&str>,
    ) -> Result<PurchaseOrder, ApprovalError> {
        self.transition(session, order_id, ApprovalAction::Reject, comments)
            .await
    }

    /// approved -> sent_to_vendor
    pub async fn send_to_vendor(
        &self,
        session: &Session,
        order_id: Uuid,
        comments: Option<&str>,
    ) -> Result<PurchaseOrder, ApprovalError> {
        self.transition(session, order_id, ApprovalAction::Send, comments)
            .await
    }

    /// sent_to_vendor -> delivered
    pub async fn mark_delivered(
        &self,
        session: &Session,
        order_id: Uuid,
        comments: Option<&str>,
    ) -> Result<PurchaseOrder, ApprovalError> {
        self.transition(session, order_id, ApprovalAction::Deliver, comments)
            .await
    }

    /// Executes one role-gated transition against the backend.
    ///
    /// The client-side precondition check runs against the latest fetched
    /// status; the server remains the authority and its rejection wins when
    /// the local status was stale. Nothing is applied locally until the
    /// server confirms, and a failed request leaves every cache entry
    /// untouched.
    #[instrument(skip(self, session, comments), fields(order_id = %order_id, action = %action))]
    pub async fn transition(
        &self,
        session: &Session,
        order_id: Uuid,
        action: ApprovalAction,
        comments: Option<&str>,
    ) -> Result<PurchaseOrder, ApprovalError> {
        let request = TransitionRequest {
            comments: comments.map(str::to_owned),
        };
        request
            .validate()
            .map_err(|e| ApprovalError::ValidationFailure(e.to_string()))?;

        let current = self.get_purchase_order(session, order_id).await?;
        validate_transition(current.status, action, session.role)?;

        let _guard = self.begin_transition(order_id)?;

        let url = self.endpoint(&format!(
            "approvals/purchase-order/{order_id}/{}",
            action.path_segment()
        ))?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&session.token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self
                .transition_error(response, order_id, current.status, action)
                .await);
        }

        let order: PurchaseOrder = Self::read_body(response).await?;
        // Invalidate, never merge: the next read refetches authoritative
        // state, so stale views cannot survive a write.
        self.cache.invalidate_order(order_id);
        info!(status = %order.status, "purchase order transition applied");
        Ok(order)
    }

    fn begin_transition(&self, order_id: Uuid) -> Result<InFlightGuard<'_>, ApprovalError> {
        if !self.in_flight.insert(order_id) {
            warn!(%order_id, "transition already in flight, refusing duplicate");
            return Err(ApprovalError::TransitionInFlight(order_id));
        }
        Ok(InFlightGuard {
            set: &self.in_flight,
            order_id,
        })
    }

    async fn read_success<T: DeserializeOwned>(response: Response) -> Result<T, ApprovalError> {
        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }
        Self::read_body(response).await
    }

    async fn read_body<T: DeserializeOwned>(response: Response) -> Result<T, ApprovalError> {
        response.json::<T>().await.map_err(|e| {
            ApprovalError::NetworkOrServerFailure(format!("invalid response body: {e}"))
        })
    }

    async fn error_body(response: Response) -> (StatusCode, String) {
        let status = response.status();
        let fallback = format!("request failed with status {status}");
        let message = response
            .json::<ErrorBody>()
            .await
            .unwrap_or_default()
            .into_message(&fallback);
        (status, message)
    }

    /// Maps a non-success read response onto the error taxonomy.
    async fn read_error(response: Response) -> ApprovalError {
        let (status, message) = Self::error_body(response).await;
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ApprovalError::AuthorizationDenied(message)
            }
            StatusCode::NOT_FOUND => ApprovalError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ApprovalError::ValidationFailure(message)
            }
            _ => ApprovalError::NetworkOrServerFailure(message),
        }
    }

    /// Maps a server-rejected transition onto the error taxonomy. A conflict
    /// means the client's status was stale; the cached view is dropped so the
    /// caller's refresh reconciles with the server.
    async fn transition_error(
        &self,
        response: Response,
        order_id: Uuid,
        from: PurchaseOrderStatus,
        action: ApprovalAction,
    ) -> ApprovalError {
        let (status, message) = Self::error_body(response).await;
        match status {
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT => {
                warn!(%order_id, %message, "server rejected transition as invalid");
                self.cache.invalidate_order(order_id);
                ApprovalError::InvalidTransition { from, action }
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ApprovalError::AuthorizationDenied(message)
            }
            StatusCode::NOT_FOUND => ApprovalError::NotFound(message),
            StatusCode::UNPROCESSABLE_ENTITY => ApprovalError::ValidationFailure(message),
            _ => ApprovalError::NetworkOrServerFailure(message),
        }
    }
}
