use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use tower::ServiceExt;
use vitalsync_server::app::{AppServices, create_router};
use vitalsync_server::configs::{Cors, Simulation, Storage};
use vitalsync_server::services::seed_if_empty;
use vitalsync_server::tests::setup_test_storage;

pub struct MockApp {
    pub storage: Arc<Storage>,
    pub services: AppServices,
    pub router: Router,
}

impl MockApp {
    /// An app over an empty in-memory database. Background loops are not started.
    pub async fn new() -> Self {
        let storage = setup_test_storage().await;
        let services = AppServices::new(storage.clone(), &Simulation::default());
        let router = create_router(&services, &Cors::default());

        Self {
            storage,
            services,
            router,
        }
    }

    pub async fn seeded() -> Self {
        let app = Self::new().await;
        seed_if_empty(&app.storage).await.unwrap();
        app
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .uri(uri)
            .method(Method::GET)
            .body(Body::empty())
            .unwrap();

        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    serde_json::from_slice(&body).unwrap()
}
