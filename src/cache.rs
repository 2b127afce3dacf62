use std::sync::RwLock;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use uuid::Uuid;

use crate::models::approval_history::ApprovalHistoryEntry;
use crate::models::purchase_order::PurchaseOrder;

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    expires_at: Option<Instant>,
}

impl<T> Entry<T> {
    fn new(value: T, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|d| Instant::now() + d),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() > at)
    }
}

/// In-memory cache of fetched orders and approval history.
///
/// Writes never merge: a successful transition drops the list view and every
/// entry for the affected order, so the next read fetches the authoritative
/// server state.
#[derive(Debug, Default)]
pub struct OrderCache {
    list: RwLock<Option<Entry<Vec<PurchaseOrder>>>>,
    orders: DashMap<Uuid, Entry<PurchaseOrder>>,
    history: DashMap<Uuid, Entry<Vec<ApprovalHistoryEntry>>>,
    ttl: Option<Duration>,
}

impl OrderCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }

    pub fn get_list(&self) -> Option<Vec<PurchaseOrder>> {
        let guard = self.list.read().unwrap();
        match guard.as_ref() {
            Some(entry) if !entry.is_expired() => Some(entry.value.clone()),
            _ => None,
        }
    }

    pub fn put_list(&self, orders: Vec<PurchaseOrder>) {
        *self.list.write().unwrap() = Some(Entry::new(orders, self.ttl));
    }

    pub fn get_order(&self, id: Uuid) -> Option<PurchaseOrder> {
        let expired = match self.orders.get(&id) {
            Some(entry) if entry.is_expired() => true,
            Some(entry) => return Some(entry.value.clone()),
            None => return None,
        };
        if expired {
            self.orders.remove(&id);
        }
        None
    }

    pub fn put_order(&self, order: PurchaseOrder) {
        self.orders.insert(order.id, Entry::new(order, self.ttl));
    }

    pub fn get_history(&self, order_id: Uuid) -> Option<Vec<ApprovalHistoryEntry>> {
        let expired = match self.history.get(&order_id) {
            Some(entry) if entry.is_expired() => true,
            Some(entry) => return Some(entry.value.clone()),
            None => return None,
        };
        if expired {
            self.history.remove(&order_id);
        }
        None
    }

    pub fn put_history(&self, order_id: Uuid, entries: Vec<ApprovalHistoryEntry>) {
        self.history.insert(order_id, Entry::new(entries, self.ttl));
    }

    /// Drops the list view and everything cached for one order.
    pub fn invalidate_order(&self, id: Uuid) {
        *self.list.write().unwrap() = None;
        self.orders.remove(&id);
        self.history.remove(&id);
    }

    pub fn clear(&self) {
        *self.list.write().unwrap() = None;
        self.orders.clear();
        self.history.clear();
    }
}
