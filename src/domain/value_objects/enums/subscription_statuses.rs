use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Exactly one of these holds for a subscription at any time: `Active` iff
/// the method is saved and the last attempt did not fail, `Failed` iff the
/// failure clock is set. There is no terminal state.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Failed,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Failed => "failed",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "failed" => SubscriptionStatus::Failed,
            _ => SubscriptionStatus::Active,
        }
    }
}

impl Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
