use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Failure,
    Retry,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Failure => "failure",
            NotificationKind::Retry => "retry",
        }
    }
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best-effort user notification. Delivery is fire-and-forget; the billing
/// state written to the store is authoritative whether or not this arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub chat_id: String,
    pub kind: NotificationKind,
    pub payment_method_id: String,
    pub error: String,
    pub amount_minor: i64,
    pub currency: String,
}
