//! Catalog handlers: admin CRUD and the public read-only views

use axum::extract::{Path, Query, State};

use super::ApiJson;
use crate::{
    catalog::{Product, ProductView},
    error::Result,
    pagination::ListQuery,
    repository::{ClientView, Repository, Resource},
    responses::{Created, Envelope, SUCCESS_MESSAGE},
    state::AppState,
};

/// `POST /admin/{resource}`
pub async fn create<E: Resource>(
    State(state): State<AppState>,
    ApiJson(entity): ApiJson<E>,
) -> Result<Created<E>> {
    let created = state.collection::<E>().create(entity).await?;
    Ok(Created::new(created))
}

/// `GET /admin/{resource}?page&pageSize&search`
pub async fn list<E: Resource>(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Envelope<Vec<E>>> {
    let page = state.collection::<E>().list(&query).await?;
    Ok(Envelope::paged(page))
}

/// `GET /admin/{resource}/{id}`
pub async fn get<E: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope<E>> {
    let entity = state.collection::<E>().get(&id).await?;
    Ok(Envelope::success(entity))
}

/// `PUT /admin/{resource}/{id}`
pub async fn replace<E: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(entity): ApiJson<E>,
) -> Result<Envelope<E>> {
    let replaced = state.collection::<E>().replace(&id, entity).await?;
    Ok(Envelope::success(replaced))
}

/// `DELETE /admin/{resource}/{id}`
pub async fn delete<E: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope<()>> {
    state.collection::<E>().delete(&id).await?;
    Ok(Envelope::message(SUCCESS_MESSAGE))
}

/// `GET /products`: enabled products, searched then paginated
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Envelope<Vec<ProductView>>> {
    let page = state
        .collection::<Product>()
        .list_enabled_page(&query)
        .await?;
    Ok(Envelope::paged(page.map(ProductView::from)))
}

/// `GET /product/{id}`: a disabled product is not found
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Envelope<ProductView>> {
    let product = state.collection::<Product>().get_enabled(&id).await?;
    Ok(Envelope::success(product.into()))
}

/// `GET /categories`, `/banners`, `/advertises`: every enabled item, unpaginated
pub async fn list_views<E: ClientView>(
    State(state): State<AppState>,
) -> Result<Envelope<Vec<E::View>>> {
    let items = state.collection::<E>().list_enabled(None).await?;
    Ok(Envelope::success(items.into_iter().map(Into::into).collect()))
}
