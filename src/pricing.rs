use serde::{Deserialize, Serialize};

pub const PRICE_PER_GB_SECOND: f64 = 0.0000166667;
pub const PRICE_PER_MILLION_INVOCATIONS: f64 = 0.20;
pub const PRICE_PER_GB_SECOND_STORAGE: f64 = 0.000009;

/// Ephemeral storage included with every function at no charge.
pub const FREE_EPHEMERAL_STORAGE_MB: i64 = 512;

/// Flat rate card for a single region and currency (USD).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pricing {
    pub per_gb_second: f64,
    pub per_million_invocations: f64,
    pub per_gb_second_storage: f64,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            per_gb_second: PRICE_PER_GB_SECOND,
            per_million_invocations: PRICE_PER_MILLION_INVOCATIONS,
            per_gb_second_storage: PRICE_PER_GB_SECOND_STORAGE,
        }
    }
}

impl Pricing {
    pub fn is_valid(&self) -> bool {
        [
            self.per_gb_second,
            self.per_million_invocations,
            self.per_gb_second_storage,
        ]
        .iter()
        .all(|rate| rate.is_finite() && *rate >= 0.0)
    }
}
