use chrono::{DateTime, Utc};
use serde::Serialize;

/// Liveness probe body: static status plus the time the probe was served.
#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}
