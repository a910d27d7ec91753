use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::api::handlers;
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Presentation layouts for the external renderer
        .route("/forms/:form/layout", get(handlers::get_form_layout::<S>))
        // Form submissions
        .route("/forms/property", post(handlers::submit_property_form::<S>))
        .route(
            "/forms/property-basic",
            post(handlers::submit_property_basic_form::<S>),
        )
        .route("/forms/owner", post(handlers::submit_owner_form::<S>))
        .route(
            "/forms/developer-project",
            post(handlers::submit_developer_project_form::<S>),
        )
        .route("/forms/project", post(handlers::submit_project_form::<S>))
        .route(
            "/properties/:id/other-details",
            post(handlers::submit_other_details_form::<S>),
        )
        .route(
            "/projects/:id/permissions",
            get(handlers::list_project_permissions::<S>).post(handlers::submit_permission_form::<S>),
        )
        // Read back
        .route("/properties/:id", get(handlers::get_property::<S>))
        .route("/owners/:id", get(handlers::get_owner::<S>))
        .route("/projects/:id", get(handlers::get_project::<S>))
        .route(
            "/developer-projects/:id",
            get(handlers::get_developer_project::<S>),
        )
        .route("/developers", get(handlers::list_developers::<S>))
        .route("/banks", get(handlers::list_banks::<S>))
        // Permission catalog
        .route(
            "/permissions",
            get(handlers::list_permissions::<S>).post(handlers::define_permission::<S>),
        )
        // The renderer is served from a different origin.
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
}
