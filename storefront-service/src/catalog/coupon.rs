use serde::{Deserialize, Serialize};

use super::catalog_resource;

/// Discount code; only visible through the admin API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coupon {
    pub id: String,
    pub name: String,
    pub code: String,
    /// Discount in percent
    pub percent: i64,
    /// Validity window as unix seconds
    pub start_time: i64,
    pub end_time: i64,
    pub is_enabled: bool,
}

catalog_resource!(Coupon, collection = "coupons", kind = "Coupon");
