pub mod charge_executor;
pub mod due_payments;
pub mod payment_events;
pub mod refunds;
