pub mod notifications;
pub mod postgres;
pub mod yookassa;
