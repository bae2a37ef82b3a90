#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub database: Database,
    pub yookassa: Yookassa,
    pub notifications: Notifications,
    pub billing: Billing,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Yookassa {
    pub shop_id: String,
    pub secret_key: String,
    pub api_base_url: String,
    pub return_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct Notifications {
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct Billing {
    /// Seconds between scheduler ticks.
    pub check_interval_seconds: u64,
    /// Seconds a failed subscription waits before the next attempt.
    pub retry_interval_seconds: i64,
}
