use chrono::Utc;
use std::sync::Arc;

use super::engine::plan_update;
use super::model::{NewOrder, Order};
use super::patch::OrderPatch;
use crate::pagination::ListQuery;
use crate::repository::{
    CollectionRepository, Page, Repository, RepositoryError, RepositoryOperation,
    RepositoryResult, Resource,
};
use crate::store::DocumentStore;

/// Order operations exposed to the storefront and admin APIs
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn DocumentStore>,
    orders: CollectionRepository<Order>,
}

impl OrderService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            orders: CollectionRepository::new(Arc::clone(&store)),
            store,
        }
    }

    /// Validate and persist a shopper's order
    ///
    /// Nothing is written when validation fails.
    pub async fn create_order(&self, submission: NewOrder) -> RepositoryResult<Order> {
        submission
            .validate()
            .map_err(|reason| RepositoryError::validation_failed(RepositoryOperation::Create, reason))?;
        let total_price = submission.total_price().ok_or_else(|| {
            RepositoryError::validation_failed(RepositoryOperation::Create, "order total is too large")
        })?;

        let order = Order {
            id: String::new(),
            products: submission.products,
            name: submission.name,
            mail: submission.mail,
            note: submission.note,
            total_price,
            is_paid: false,
            is_picked: false,
            is_enabled: true,
            paid_at: None,
            picked_at: None,
            disabled_at: None,
            created_at: Utc::now(),
        };

        self.orders.create(order).await
    }

    /// Apply an admin flag update and return the order as stored afterwards
    ///
    /// All writes of the update land in one single-document merge. The guard for each
    /// timestamp is evaluated against the order as loaded here.
    pub async fn update_order(&self, id: &str, patch: &OrderPatch) -> RepositoryResult<Order> {
        let current = self.orders.get(id).await?;
        let plan = plan_update(&current, patch, Utc::now());

        self.store
            .update(Order::COLLECTION, id, plan.writes)
            .await
            .map_err(|e| RepositoryError::from_store(RepositoryOperation::Update, Order::KIND, e))?;

        tracing::info!(
            order_id = id,
            stamped = ?plan.stamped,
            "Updated order flags"
        );

        self.orders.get(id).await
    }

    /// Public order lookup: every order whose name or email contains `fragment`
    pub async fn search_orders(&self, fragment: Option<&str>) -> RepositoryResult<Vec<Order>> {
        let Some(fragment) = fragment.filter(|f| !f.is_empty()) else {
            return Err(RepositoryError::validation_failed(
                RepositoryOperation::FindAll,
                "search parameter is required",
            ));
        };

        let query = ListQuery::default().with_search(fragment);
        let page = self.orders.list(&query.with_page_size(i64::MAX)).await?;
        Ok(page.items)
    }

    /// Admin listing with optional search
    pub async fn list_orders(&self, query: &ListQuery) -> RepositoryResult<Page<Order>> {
        self.orders.list(query).await
    }

    pub async fn get_order(&self, id: &str) -> RepositoryResult<Order> {
        self.orders.get(id).await
    }
}
