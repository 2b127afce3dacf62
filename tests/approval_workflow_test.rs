use assert_matches::assert_matches;
use reqwest::Client;
use serde_json::{json, Value};
use url::Url;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stockroom_approvals::auth::{Session, UserRole};
use stockroom_approvals::client::ApprovalsClient;
use stockroom_approvals::errors::ApprovalError;
use stockroom_approvals::models::purchase_order::PurchaseOrderStatus;
use stockroom_approvals::workflow::transitions::ApprovalAction;

fn client_for(server: &MockServer) -> ApprovalsClient {
    let base_url = Url::parse(&server.uri()).expect("mock server uri");
    ApprovalsClient::with_client(Client::new(), base_url, None)
}

fn session(role: UserRole) -> Session {
    Session::new(Uuid::new_v4(), "test-user", role, "test-token")
}

fn order_json(id: Uuid, status: &str) -> Value {
    json!({
        "id": id,
        "po_number": "PO-2026-0001",
        "supplier_id": Uuid::new_v4(),
        "warehouse_id": Uuid::new_v4(),
        "status": status,
        "order_date": "2026-03-01T08:00:00Z",
        "expected_delivery_date": null,
        "actual_delivery_date": null,
        "total_amount": "1250.00",
        "created_by": Uuid::new_v4(),
        "approved_by": null,
        "approved_date": null,
        "rejected_by": null,
        "rejected_date": null,
        "sent_date": null,
        "delivered_date": null,
        "comments": null
    })
}

fn history_json(order_id: Uuid, from: &str, to: &str, comments: Option<&str>, ts: &str) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "purchase_order_id": order_id,
        "user_id": Uuid::new_v4(),
        "username": "amelia",
        "from_status": from,
        "to_status": to,
        "comments": comments,
        "timestamp": ts
    })
}

async fn mount_detail(server: &MockServer, id: Uuid, body: Value, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/orders/purchase/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn approve_moves_order_and_sends_comment() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let id = Uuid::new_v4();

    mount_detail(&server, id, order_json(id, "pending_approval"), 1).await;

    let mut approved = order_json(id, "approved");
    approved["approved_date"] = json!("2026-03-04T10:00:00Z");
    Mock::given(method("POST"))
        .and(path(format!("/approvals/purchase-order/{id}/approve")))
        .and(body_json(json!({ "comments": "ok" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(approved))
        .expect(1)
        .mount(&server)
        .await;

    let order = client
        .approve_order(&session(UserRole::Admin), id, Some("ok"))
        .await
        .expect("approve should succeed");

    assert_eq!(order.status, PurchaseOrderStatus::Approved);
    assert!(order.approved_date.is_some());
}

#[tokio::test]
async fn successful_transition_invalidates_cached_detail() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let id = Uuid::new_v4();

    // First fetch populates the cache; the post-transition fetch must go back
    // to the server.
    mount_detail(&server, id, order_json(id, "draft"), 2).await;
    Mock::given(method("POST"))
        .and(path(format!("/approvals/purchase-order/{id}/submit")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(order_json(id, "pending_approval")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let admin = session(UserRole::Admin);
    client.get_purchase_order(&admin, id).await.unwrap();
    client.submit_for_approval(&admin, id, None).await.unwrap();

    assert!(client.cache().get_order(id).is_none());
    client.get_purchase_order(&admin, id).await.unwrap();
}

#[tokio::test]
async fn send_on_draft_is_rejected_before_sending() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let id = Uuid::new_v4();

    mount_detail(&server, id, order_json(id, "draft"), 1).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client
        .send_to_vendor(&session(UserRole::Admin), id, None)
        .await
        .unwrap_err();

    assert_matches!(
        err,
        ApprovalError::InvalidTransition {
            from: PurchaseOrderStatus::Draft,
            action: ApprovalAction::Send
        }
    );
}

#[tokio::test]
async fn manager_approval_is_denied_client_side() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let id = Uuid::new_v4();

    mount_detail(&server, id, order_json(id, "pending_approval"), 1).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client
        .approve_order(&session(UserRole::Manager), id, None)
        .await
        .unwrap_err();

    assert_matches!(err, ApprovalError::AuthorizationDenied(_));
}

#[tokio::test]
async fn server_authorization_rejection_is_surfaced() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let id = Uuid::new_v4();

    mount_detail(&server, id, order_json(id, "pending_approval"), 1).await;
    Mock::given(method("POST"))
        .and(path(format!("/approvals/purchase-order/{id}/approve")))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"error": "Cannot approve this order"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client
        .approve_order(&session(UserRole::Admin), id, None)
        .await
        .unwrap_err();

    assert_matches!(err, ApprovalError::AuthorizationDenied(msg) => {
        assert_eq!(msg, "Cannot approve this order");
    });
}

#[tokio::test]
async fn server_conflict_maps_to_invalid_transition_and_drops_cache() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let id = Uuid::new_v4();

    // The cached status was stale; after the conflict the next read must
    // refetch to reconcile with the server.
    mount_detail(&server, id, order_json(id, "pending_approval"), 2).await;
    Mock::given(method("POST"))
        .and(path(format!("/approvals/purchase-order/{id}/approve")))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"error": "stale status"})))
        .expect(1)
        .mount(&server)
        .await;

    let admin = session(UserRole::Admin);
    let err = client.approve_order(&admin, id, None).await.unwrap_err();
    assert_matches!(err, ApprovalError::InvalidTransition { .. });

    assert!(client.cache().get_order(id).is_none());
    client.get_purchase_order(&admin, id).await.unwrap();
}

#[tokio::test]
async fn server_failure_leaves_local_state_untouched() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let id = Uuid::new_v4();

    mount_detail(&server, id, order_json(id, "pending_approval"), 1).await;
    Mock::given(method("POST"))
        .and(path(format!("/approvals/purchase-order/{id}/approve")))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = client
        .approve_order(&session(UserRole::Admin), id, None)
        .await
        .unwrap_err();

    assert_matches!(err, ApprovalError::NetworkOrServerFailure(_));
    // No optimistic update, no invalidation: the cached order survives as-is.
    let cached = client.cache().get_order(id).expect("cache entry kept");
    assert_eq!(cached.status, PurchaseOrderStatus::PendingApproval);
}

#[tokio::test]
async fn history_preserves_server_order() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let id = Uuid::new_v4();

    // Backend returns newest first; the client must not re-sort.
    let entries = json!([
        history_json(id, "pending_approval", "approved", Some("ok"), "2026-03-04T10:00:00Z"),
        history_json(id, "draft", "pending_approval", None, "2026-03-01T09:00:00Z"),
    ]);
    Mock::given(method("GET"))
        .and(path(format!("/approvals/purchase-order/{id}/history")))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries))
        .expect(1)
        .mount(&server)
        .await;

    let history = client
        .get_approval_history(&session(UserRole::Viewer), id)
        .await
        .unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].to_status, PurchaseOrderStatus::Approved);
    assert_eq!(history[0].comments.as_deref(), Some("ok"));
    assert_eq!(history[1].to_status, PurchaseOrderStatus::PendingApproval);

    // Second read is served from cache.
    let again = client
        .get_approval_history(&session(UserRole::Viewer), id)
        .await
        .unwrap();
    assert_eq!(again, history);
}

#[tokio::test]
async fn oversized_comment_fails_before_any_request() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let id = Uuid::new_v4();

    // Nothing mounted: validation must reject before the order is even
    // fetched.
    let comment = "x".repeat(1001);
    let err = client
        .approve_order(&session(UserRole::Admin), id, Some(&comment))
        .await
        .unwrap_err();

    assert_matches!(err, ApprovalError::ValidationFailure(_));
}

#[tokio::test]
async fn concurrent_transitions_on_one_order_refuse_the_second() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/orders/purchase/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_json(id, "pending_approval")))
        .mount(&server)
        .await;

    let mut approved = order_json(id, "approved");
    approved["approved_date"] = json!("2026-03-04T10:00:00Z");
    Mock::given(method("POST"))
        .and(path(format!("/approvals/purchase-order/{id}/approve")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(approved)
                .set_delay(std::time::Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let admin = session(UserRole::Admin);
    let (first, second) = tokio::join!(
        client.approve_order(&admin, id, None),
        client.approve_order(&admin, id, None),
    );

    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|r| matches!(r, Err(ApprovalError::TransitionInFlight(oid)) if *oid == id)));
}

#[tokio::test]
async fn list_is_cached_until_a_write_invalidates_it() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/orders/purchase"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([order_json(id, "draft")])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/approvals/purchase-order/{id}/submit")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(order_json(id, "pending_approval")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let admin = session(UserRole::Admin);
    client.list_purchase_orders(&admin).await.unwrap();
    // Cache hit: no second request yet.
    client.list_purchase_orders(&admin).await.unwrap();

    client.submit_for_approval(&admin, id, None).await.unwrap();

    // The write dropped the list; this one refetches.
    client.list_purchase_orders(&admin).await.unwrap();
}
