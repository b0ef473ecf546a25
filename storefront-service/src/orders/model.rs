use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::Resource;
use crate::search::{SearchPolicy, Searchable};

/// One purchased product line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    pub name: String,
    pub count: i64,
    /// Unit price
    pub price: i64,
}

/// A stored order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub id: String,
    /// Line items, fixed at creation
    pub products: Vec<LineItem>,
    /// Customer name
    pub name: String,
    /// Customer email
    pub mail: String,
    pub note: String,
    /// Sum of count × price, computed once at creation
    pub total_price: i64,
    pub is_paid: bool,
    pub is_picked: bool,
    pub is_enabled: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub picked_at: Option<DateTime<Utc>>,
    pub disabled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Searchable for Order {
    const POLICY: SearchPolicy = SearchPolicy::NameOrEmailContains;

    fn search_name(&self) -> &str {
        &self.name
    }

    fn search_email(&self) -> Option<&str> {
        Some(&self.mail)
    }
}

impl Resource for Order {
    const COLLECTION: &'static str = "orders";
    const KIND: &'static str = "Order";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn is_enabled(&self) -> bool {
        self.is_enabled
    }
}

/// Order submission from the storefront
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewOrder {
    pub name: String,
    pub mail: String,
    pub note: String,
    pub products: Vec<LineItem>,
}

impl NewOrder {
    /// Check the submission, returning the first problem found
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.mail.is_empty() {
            return Err("mail is required");
        }
        if self.name.is_empty() {
            return Err("name is required");
        }
        if self.products.is_empty() {
            return Err("products are required");
        }
        for item in &self.products {
            if item.name.is_empty() {
                return Err("product name is required");
            }
            if item.count <= 0 {
                return Err("product count must be positive");
            }
            if item.price <= 0 {
                return Err("product price must be positive");
            }
        }
        Ok(())
    }

    /// Sum of count × price, `None` on overflow
    pub fn total_price(&self) -> Option<i64> {
        self.products.iter().try_fold(0i64, |total, item| {
            item.count
                .checked_mul(item.price)
                .and_then(|line| total.checked_add(line))
        })
    }
}
