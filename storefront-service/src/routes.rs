//! Route table for the storefront and admin APIs

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};

use crate::{
    catalog::{Advertise, Banner, Category, Coupon, Product},
    handlers::{catalog, orders, session, upload},
    health,
    middleware::require_identity,
    repository::Resource,
    state::AppState,
};

/// Assemble every route
///
/// Everything under `/admin` requires a verified identity token.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/products", get(catalog::list_products))
        .route("/product/{id}", get(catalog::get_product))
        .route("/categories", get(catalog::list_views::<Category>))
        .route("/banners", get(catalog::list_views::<Banner>))
        .route("/advertises", get(catalog::list_views::<Advertise>))
        .route(
            "/order",
            get(orders::search_orders).post(orders::create_order),
        );

    // Multipart framing needs room beyond the file itself
    let upload_limit = state.uploads().max_bytes() + 1024 * 1024;

    let admin = Router::new()
        .merge(resource_routes::<Product>("product"))
        .merge(resource_routes::<Category>("category"))
        .merge(resource_routes::<Coupon>("coupon"))
        .merge(resource_routes::<Banner>("banner"))
        .merge(resource_routes::<Advertise>("advertise"))
        .route("/order", get(orders::list_orders))
        .route(
            "/order/{id}",
            get(orders::get_order).put(orders::update_order),
        )
        .route(
            "/upload",
            post(upload::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/logout", post(session::logout))
        .route_layer(from_fn_with_state(state.verifier(), require_identity));

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::readiness))
        .merge(public)
        .nest("/admin", admin)
        .with_state(state)
}

/// Admin CRUD routes for one catalog collection
fn resource_routes<E: Resource>(name: &str) -> Router<AppState> {
    Router::new()
        .route(
            &format!("/{name}"),
            get(catalog::list::<E>).post(catalog::create::<E>),
        )
        .route(
            &format!("/{name}/{{id}}"),
            get(catalog::get::<E>)
                .put(catalog::replace::<E>)
                .delete(catalog::delete::<E>),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::middleware::jwt::tests::{claims, mint, verifier, PROJECT};
    use crate::store::MemoryDocumentStore;
    use crate::upload::MemoryObjectStorage;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let mut config = Config::default();
        config.project.project_id = PROJECT.to_string();
        config.upload.max_file_mb = 1;

        let state = AppState::builder()
            .config(config)
            .store(Arc::new(MemoryDocumentStore::new()))
            .object_storage(Arc::new(MemoryObjectStorage::new()))
            .verifier(Arc::new(verifier()))
            .build()
            .unwrap();
        build_router(state)
    }

    fn bearer() -> String {
        format!("Bearer {}", mint(&claims(3600)))
    }

    fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    fn admin(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
        let mut req = request(method, uri, body);
        req.headers_mut()
            .insert("x-auth-token", bearer().parse().unwrap());
        req
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), request(Method::GET, "/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_admin_requires_identity_token() {
        let app = app();

        let (status, body) = send(&app, request(Method::GET, "/admin/product", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "X-Auth-Token header required");
        assert_eq!(body["code"], 401);

        let mut req = request(Method::GET, "/admin/product", None);
        req.headers_mut()
            .insert("x-auth-token", mint(&claims(3600)).parse().unwrap());
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["message"],
            "Could not find bearer token in X-Auth-Token header"
        );

        let mut req = request(Method::GET, "/admin/product", None);
        req.headers_mut().insert(
            "x-auth-token",
            format!("Bearer {}", mint(&claims(-3600))).parse().unwrap(),
        );
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid identity token");
    }

    #[tokio::test]
    async fn test_logout() {
        let (status, body) = send(&app(), admin(Method::POST, "/admin/logout", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Logout successful", "code": 0}));
    }

    #[tokio::test]
    async fn test_product_lifecycle() {
        let app = app();

        let (status, body) = send(
            &app,
            admin(
                Method::POST,
                "/admin/product",
                Some(json!({"id": "chosen", "name": "Latte", "price": 120, "is_enabled": false})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["code"], 0);
        assert_eq!(body["message"], "success");
        let id = body["data"]["id"].as_str().unwrap().to_string();
        assert_ne!(id, "chosen");

        // Disabled products are hidden from shoppers
        let (status, body) = send(&app, request(Method::GET, &format!("/product/{id}"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Product not found");
        let (_, body) = send(&app, request(Method::GET, "/products", None)).await;
        assert_eq!(body["data"], json!([]));
        assert_eq!(body["pagination"]["totalCount"], 0);

        let (status, body) = send(
            &app,
            admin(
                Method::PUT,
                &format!("/admin/product/{id}"),
                Some(json!({"name": "Latte", "price": 150, "is_enabled": true})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], id.as_str());
        assert_eq!(body["data"]["price"], 150);

        let (status, body) = send(&app, request(Method::GET, &format!("/product/{id}"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["price"], 150);
        assert!(body["data"].get("is_enabled").is_none());

        let (status, body) = send(
            &app,
            admin(Method::DELETE, &format!("/admin/product/{id}"), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "success", "code": 0}));

        let (status, _) = send(
            &app,
            admin(Method::DELETE, &format!("/admin/product/{id}"), None),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_replace_missing_is_not_found() {
        let (status, body) = send(
            &app(),
            admin(
                Method::PUT,
                "/admin/banner/missing",
                Some(json!({"name": "Spring"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);
    }

    #[tokio::test]
    async fn test_admin_listing_is_paginated() {
        let app = app();
        for name in ["Cakes", "Coffee", "Tea"] {
            send(
                &app,
                admin(
                    Method::POST,
                    "/admin/category",
                    Some(json!({"name": name, "is_enabled": true})),
                ),
            )
            .await;
        }

        let (status, body) = send(
            &app,
            admin(Method::GET, "/admin/category?page=2&pageSize=1&search=C", None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(
            body["pagination"],
            json!({"totalPages": 2, "totalCount": 2, "currentPage": 2, "pageSize": 1})
        );

        let (_, body) = send(&app, request(Method::GET, "/categories", None)).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
        assert!(body.get("pagination").is_none());
        assert!(body["data"][0].get("is_enabled").is_none());
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let mut req = admin(Method::POST, "/admin/coupon", None);
        *req.body_mut() = Body::from("{not json");
        req.headers_mut()
            .insert(header::CONTENT_TYPE, "application/json".parse().unwrap());

        let (status, body) = send(&app(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid request payload");
        assert_eq!(body["code"], 400);
    }

    #[tokio::test]
    async fn test_order_flow() {
        let app = app();

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/order",
                Some(json!({
                    "name": "Ann",
                    "mail": "ann@example.com",
                    "products": [{"name": "A", "count": 2, "price": 50}]
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["total_price"], 100);
        assert_eq!(body["data"]["is_enabled"], true);
        let id = body["data"]["id"].as_str().unwrap().to_string();
        let order_path = format!("/admin/order/{id}");

        let (status, body) = send(
            &app,
            admin(
                Method::PUT,
                &format!("/admin/order/{id}"),
                Some(json!({"foo": true})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid field in request payload: foo");

        // A rejected payload writes nothing, even alongside valid flags
        let (status, body) = send(
            &app,
            admin(
                Method::PUT,
                &format!("/admin/order/{id}"),
                Some(json!({"is_paid": true, "foo": 1})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid field in request payload: foo");

        let (status, body) = send(&app, admin(Method::GET, &order_path, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], id.as_str());
        assert_eq!(body["data"]["is_paid"], false);
        assert!(body["data"]["paid_at"].is_null());

        let (status, body) = send(
            &app,
            admin(
                Method::PUT,
                &format!("/admin/order/{id}"),
                Some(json!({"is_paid": true})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["is_paid"], true);
        assert!(body["data"]["paid_at"].is_string());
        assert!(body["data"]["picked_at"].is_null());

        let (status, body) = send(&app, admin(Method::GET, &order_path, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["is_paid"], true);
        assert!(body["data"]["paid_at"].is_string());

        let (status, body) = send(&app, admin(Method::GET, "/admin/order/missing", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);

        let (status, body) = send(&app, request(Method::GET, "/order?search=", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "search parameter is required");

        let (status, body) = send(&app, request(Method::GET, "/order?search=ann%40", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["id"], id.as_str());

        let (_, body) = send(&app, admin(Method::GET, "/admin/order", None)).await;
        assert_eq!(body["pagination"]["totalCount"], 1);
    }

    #[tokio::test]
    async fn test_invalid_order_is_rejected() {
        let (status, body) = send(
            &app(),
            request(
                Method::POST,
                "/order",
                Some(json!({"name": "Ann", "products": [{"name": "A", "count": 1, "price": 5}]})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "mail is required");
    }

    fn multipart(upload_type: Option<&str>, content_type: &str, data: &[u8]) -> Request<Body> {
        let boundary = "X-STOREFRONT-BOUNDARY";
        let mut body = Vec::new();
        if let Some(upload_type) = upload_type {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"type\"\r\n\r\n{upload_type}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let mut req = Request::builder()
            .method(Method::POST)
            .uri("/admin/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        req.headers_mut()
            .insert("x-auth-token", bearer().parse().unwrap());
        req
    }

    #[tokio::test]
    async fn test_upload_image() {
        let (status, body) = send(&app(), multipart(Some("product"), "image/png", b"png")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["type"], "product");
        let id = body["data"]["id"].as_str().unwrap();
        assert_eq!(
            body["data"]["url"],
            format!("memory://product/{id}_200x200.png")
        );
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_input() {
        let app = app();

        let (status, body) = send(&app, multipart(Some("product"), "application/pdf", b"%PDF")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            "Invalid file type. Allowed types: jpeg, png, gif, webp, svg"
        );

        let (status, body) = send(&app, multipart(None, "image/png", b"png")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Missing required field: type");
    }
}
