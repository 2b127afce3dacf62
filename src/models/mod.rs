// Domain models mirrored from the Stockroom backend's wire format.

pub mod approval_history;
pub mod purchase_order;
