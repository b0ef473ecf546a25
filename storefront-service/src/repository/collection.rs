//! Document-store backed repository shared by the catalog resources

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{marker::PhantomData, sync::Arc};

use super::error::{RepositoryError, RepositoryOperation};
use super::traits::{Page, Repository, RepositoryResult, Resource};
use crate::pagination::{paginate, ListQuery};
use crate::search::{self, Searchable};
use crate::store::{Document, DocumentStore, FilterCondition};

/// Repository for any [`Resource`] stored in a [`DocumentStore`]
pub struct CollectionRepository<E> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for CollectionRepository<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _entity: PhantomData,
        }
    }
}

impl<E: Resource> CollectionRepository<E> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    /// Every enabled entity matching the search fragment
    pub async fn list_enabled(&self, search: Option<&str>) -> RepositoryResult<Vec<E>> {
        self.find(vec![FilterCondition::eq("is_enabled", true)], search)
            .await
    }

    /// One page of enabled entities matching the search fragment
    pub async fn list_enabled_page(&self, query: &ListQuery) -> RepositoryResult<Page<E>> {
        let items = self.list_enabled(query.search()).await?;
        let window = paginate(query.page(), query.page_size(), items.len());
        Ok(Page {
            items: window.apply(items),
            window,
        })
    }

    /// Fetch an entity that is visible to non-admin callers
    ///
    /// A disabled entity is reported as not found.
    pub async fn get_enabled(&self, id: &str) -> RepositoryResult<E> {
        let entity = self.get(id).await?;
        if entity.is_enabled() {
            Ok(entity)
        } else {
            Err(RepositoryError::not_found(E::KIND, id))
        }
    }

    async fn find(
        &self,
        mut filters: Vec<FilterCondition>,
        search: Option<&str>,
    ) -> RepositoryResult<Vec<E>> {
        filters.extend(E::POLICY.store_filter(search));
        tracing::debug!(
            collection = E::COLLECTION,
            filters = filters.len(),
            "Querying collection"
        );

        let documents = self
            .store
            .query(E::COLLECTION, &filters)
            .await
            .map_err(|e| RepositoryError::from_store(RepositoryOperation::FindAll, E::KIND, e))?;

        let entities = documents
            .into_iter()
            .map(|document| decode::<E>(RepositoryOperation::FindAll, E::KIND, document))
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok(search::filter(entities, search))
    }

    async fn fetch(&self, operation: RepositoryOperation, id: &str) -> RepositoryResult<E> {
        let document = self
            .store
            .get(E::COLLECTION, id)
            .await
            .map_err(|e| RepositoryError::from_store(operation, E::KIND, e))?
            .ok_or_else(|| RepositoryError::not_found(E::KIND, id).with_operation(operation))?;

        decode(operation, E::KIND, document)
    }

    async fn store_entity(&self, operation: RepositoryOperation, entity: &E) -> RepositoryResult<()> {
        let document = encode(operation, E::KIND, entity)?;
        self.store
            .set(E::COLLECTION, entity.id(), document)
            .await
            .map_err(|e| RepositoryError::from_store(operation, E::KIND, e))
    }
}

impl<E: Resource> Repository<E> for CollectionRepository<E> {
    async fn create(&self, mut entity: E) -> RepositoryResult<E> {
        entity.set_id(self.store.new_id());
        self.store_entity(RepositoryOperation::Create, &entity).await?;

        tracing::info!(kind = E::KIND, id = entity.id(), "Created resource");
        Ok(entity)
    }

    async fn list(&self, query: &ListQuery) -> RepositoryResult<Page<E>> {
        let items = self.find(Vec::new(), query.search()).await?;
        let window = paginate(query.page(), query.page_size(), items.len());
        Ok(Page {
            items: window.apply(items),
            window,
        })
    }

    async fn get(&self, id: &str) -> RepositoryResult<E> {
        self.fetch(RepositoryOperation::FindById, id).await
    }

    async fn replace(&self, id: &str, mut entity: E) -> RepositoryResult<E> {
        self.fetch(RepositoryOperation::Update, id).await?;

        entity.set_id(id.to_string());
        self.store_entity(RepositoryOperation::Update, &entity).await?;

        tracing::info!(kind = E::KIND, id, "Replaced resource");
        Ok(entity)
    }

    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        let existed = self
            .store
            .delete(E::COLLECTION, id)
            .await
            .map_err(|e| RepositoryError::from_store(RepositoryOperation::Delete, E::KIND, e))?;

        if !existed {
            return Err(
                RepositoryError::not_found(E::KIND, id).with_operation(RepositoryOperation::Delete)
            );
        }

        tracing::info!(kind = E::KIND, id, "Deleted resource");
        Ok(())
    }
}

/// Map a stored document onto an entity, defaulting missing fields
pub(crate) fn decode<T: DeserializeOwned>(
    operation: RepositoryOperation,
    kind: &str,
    document: Document,
) -> RepositoryResult<T> {
    serde_json::from_value(Value::Object(document)).map_err(|e| {
        RepositoryError::serialization_error(operation, format!("invalid {kind} document: {e}"))
    })
}

/// Map an entity onto a document
pub(crate) fn encode<T: Serialize>(
    operation: RepositoryOperation,
    kind: &str,
    entity: &T,
) -> RepositoryResult<Document> {
    match serde_json::to_value(entity) {
        Ok(Value::Object(document)) => Ok(document),
        Ok(_) => Err(RepositoryError::serialization_error(
            operation,
            format!("{kind} did not serialize to an object"),
        )),
        Err(e) => Err(RepositoryError::serialization_error(operation, e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryErrorKind;
    use crate::search::SearchPolicy;
    use crate::store::MemoryDocumentStore;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Widget {
        id: String,
        name: String,
        is_enabled: bool,
    }

    impl Searchable for Widget {
        const POLICY: SearchPolicy = SearchPolicy::NamePrefix;

        fn search_name(&self) -> &str {
            &self.name
        }
    }

    impl Resource for Widget {
        const COLLECTION: &'static str = "widgets";
        const KIND: &'static str = "Widget";

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

    fn widget(name: &str, is_enabled: bool) -> Widget {
        Widget {
            id: String::new(),
            name: name.to_string(),
            is_enabled,
        }
    }

    fn repository() -> CollectionRepository<Widget> {
        CollectionRepository::new(Arc::new(MemoryDocumentStore::new()))
    }

    #[tokio::test]
    async fn test_create_assigns_fresh_id() {
        let repo = repository();
        let mut input = widget("Gear", true);
        input.id = "client-chosen".to_string();

        let created = repo.create(input).await.unwrap();
        assert!(!created.id.is_empty());
        assert_ne!(created.id, "client-chosen");
        assert_eq!(repo.get(&created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let err = repository().get("nope").await.unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::NotFound);
        assert_eq!(err.message, "Widget not found");
    }

    #[tokio::test]
    async fn test_list_searches_before_paginating() {
        let repo = repository();
        for name in ["Cog 1", "Cog 2", "Cog 3", "Spring", "Cogwheel"] {
            repo.create(widget(name, true)).await.unwrap();
        }

        let page = repo
            .list(&ListQuery::default().with_search("Cog").with_page_size(2))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.window.total_count, 4);
        assert_eq!(page.window.total_pages, 2);
        assert!(page.items.iter().all(|w| w.name.starts_with("Cog")));

        let past_end = repo
            .list(&ListQuery::default().with_page(9))
            .await
            .unwrap();
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.window.total_count, 5);
    }

    #[tokio::test]
    async fn test_replace_keeps_id_and_requires_existing() {
        let repo = repository();
        let created = repo.create(widget("Gear", true)).await.unwrap();

        let mut changed = widget("Gear v2", false);
        changed.id = "other".to_string();
        let replaced = repo.replace(&created.id, changed).await.unwrap();
        assert_eq!(replaced.id, created.id);
        assert_eq!(repo.get(&created.id).await.unwrap().name, "Gear v2");

        let err = repo.replace("missing", widget("x", true)).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(repo.get("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_requires_existing() {
        let repo = repository();
        let created = repo.create(widget("Gear", true)).await.unwrap();
        repo.delete(&created.id).await.unwrap();
        assert!(repo.delete(&created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_enabled_views_hide_disabled() {
        let repo = repository();
        let visible = repo.create(widget("Shown", true)).await.unwrap();
        let hidden = repo.create(widget("Hidden", false)).await.unwrap();

        let listed = repo.list_enabled(None).await.unwrap();
        assert_eq!(listed, vec![visible.clone()]);

        assert_eq!(repo.get_enabled(&visible.id).await.unwrap(), visible);
        assert!(repo.get_enabled(&hidden.id).await.unwrap_err().is_not_found());
    }

    #[test]
    fn test_decode_defaults_missing_fields() {
        let document = serde_json::json!({"id": "w1"}).as_object().cloned().unwrap();
        let widget: Widget = decode(RepositoryOperation::FindById, "Widget", document).unwrap();
        assert_eq!(widget.id, "w1");
        assert!(!widget.is_enabled);
    }
}
