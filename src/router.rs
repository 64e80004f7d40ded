use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Build the application router with all routes
pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::healthcheck))
        // Auth routes
        .route("/api/auth/login", post(handlers::auth::login))
        // Script routes
        .route("/api/scripts/new-branch", post(handlers::scripts::new_branch))
        .route("/api/scripts/deploy-site", post(handlers::scripts::deploy_site))
        .route("/api/scripts/create-vlans", post(handlers::scripts::create_vlans))
        .route("/api/scripts/import-vlans", post(handlers::scripts::import_vlans))
        // Inventory routes
        .route("/api/sites", get(handlers::inventory::list_sites))
        .route("/api/sites/:id", get(handlers::inventory::get_site))
        .route("/api/sites/:id/devices", get(handlers::inventory::list_site_devices))
        .route("/api/sites/:id/vlans", get(handlers::inventory::list_site_vlans))
        .route("/api/sites/:id/prefixes", get(handlers::inventory::list_site_prefixes))
        .route("/api/devices/:id/interfaces", get(handlers::inventory::list_device_interfaces))
        .route("/api/device-roles", get(handlers::inventory::list_device_roles))
        .route("/api/device-types", get(handlers::inventory::list_device_types))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::Store;
    use crate::importer::Fetcher;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;

    async fn app(import_dir: &std::path::Path) -> Router {
        let mut config = Config::from_lookup(|_| None).unwrap();
        config.jwt_secret = "test-secret".to_string();

        let store = Store::in_memory().await.unwrap();
        store.ensure_admin_user("admin", "hunter2").await.unwrap();

        build(Arc::new(AppState {
            inventory: Arc::new(store.clone()),
            store,
            fetcher: Fetcher::new(Duration::from_secs(5), import_dir).unwrap(),
            config,
        }))
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
        let mut req = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        req.body(Body::from(body.to_string())).unwrap()
    }

    fn get_authed(uri: &str, token: &str) -> Request<Body> {
        Request::get(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    async fn login(app: &Router) -> String {
        let (status, body) = send(
            app,
            post_json("/api/auth/login", None, serde_json::json!({"username": "admin", "password": "hunter2"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path()).await;
        let (status, body) = send(&app, Request::get("/api/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_scripts_require_auth() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path()).await;
        let (status, body) = send(
            &app,
            post_json("/api/scripts/new-branch", None, serde_json::json!({"site_name": "x", "switch_count": 1, "switch_model": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Missing authentication token");

        let (status, _) = send(
            &app,
            post_json("/api/auth/login", None, serde_json::json!({"username": "admin", "password": "wrong"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_new_branch_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path()).await;
        let token = login(&app).await;

        let (status, body) = send(
            &app,
            post_json(
                "/api/scripts/new-branch",
                Some(&token),
                serde_json::json!({"site_name": "Harbor Point", "switch_count": 2, "switch_model": 1}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, sites) = send(&app, get_authed("/api/sites", &token)).await;
        assert_eq!(status, StatusCode::OK);
        let site_id = sites[0]["id"].as_i64().unwrap();

        let (_, devices) = send(&app, get_authed(&format!("/api/sites/{}/devices", site_id), &token)).await;
        assert_eq!(devices.as_array().unwrap().len(), 2);

        let device_id = devices[0]["id"].as_i64().unwrap();
        let (status, ifaces) = send(&app, get_authed(&format!("/api/devices/{}/interfaces", device_id), &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ifaces, serde_json::json!([]));

        let (status, _) = send(&app, get_authed("/api/sites/999", &token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_script_input_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path()).await;
        let token = login(&app).await;
        let (status, body) = send(
            &app,
            post_json(
                "/api/scripts/new-branch",
                Some(&token),
                serde_json::json!({"site_name": "Harbor", "switch_count": 1, "switch_model": 999}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("999"));
    }

    #[tokio::test]
    async fn test_import_vlans_schema_error_is_unprocessable() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path()).await;
        let token = login(&app).await;

        send(
            &app,
            post_json(
                "/api/scripts/new-branch",
                Some(&token),
                serde_json::json!({"site_name": "Harbor", "switch_count": 0, "switch_model": 1}),
            ),
        )
        .await;
        let (_, sites) = send(&app, get_authed("/api/sites", &token)).await;
        let site_id = sites[0]["id"].as_i64().unwrap();

        std::fs::write(dir.path().join("labels.csv"), "id,label\n1,a\n").unwrap();

        let (status, body) = send(
            &app,
            post_json(
                "/api/scripts/import-vlans",
                Some(&token),
                serde_json::json!({"site_id": site_id, "source": "labels.csv"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("vlan_id"));
    }

    #[tokio::test]
    async fn test_import_vlans_rejects_paths_outside_import_dir() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path()).await;
        let token = login(&app).await;

        send(
            &app,
            post_json(
                "/api/scripts/new-branch",
                Some(&token),
                serde_json::json!({"site_name": "Harbor", "switch_count": 0, "switch_model": 1}),
            ),
        )
        .await;
        let (_, sites) = send(&app, get_authed("/api/sites", &token)).await;
        let site_id = sites[0]["id"].as_i64().unwrap();

        for source in ["/etc/passwd", "../etc/passwd"] {
            let (status, body) = send(
                &app,
                post_json(
                    "/api/scripts/import-vlans",
                    Some(&token),
                    serde_json::json!({"site_id": site_id, "source": source}),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            let message = body["error"].as_str().unwrap();
            assert!(message.contains("relative to the import directory"), "{}", message);
            assert!(!message.contains("root:"));
        }
    }
}
