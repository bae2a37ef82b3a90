pub mod charges;
pub mod enums;
pub mod notifications;
pub mod payment_events;
