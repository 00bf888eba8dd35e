use std::path::PathBuf;

use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::openapi::ApiDoc;

pub mod auth;
pub mod books;

use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health",
    responses((status = 200, description = "Service healthy", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Static file mount for stored cover images.
pub struct ImagesDir {
    pub route: String,
    pub dir: PathBuf,
}

/// Build the full application router: public listing routes, anonymous auth
/// routes, and the authenticated donation/approval surface.
pub fn build_router(cors: CorsLayer, state: ServerState, images: Option<ImagesDir>) -> Router {
    // Public routes: health, catalog reads, register/login
    let public = Router::new()
        .route("/health", get(health))
        .route("/books/freight-options", get(books::freight_options))
        .route("/books/recent", get(books::recent_books))
        .route("/books/search", get(books::search_books))
        .route("/books/:id", get(books::get_book))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    // Routes that require a verified caller; approval additionally requires
    // the admin profile, enforced in the service layer
    let protected = Router::new()
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/:id/approve", put(books::approve_book))
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_auth));

    let mut app = public.merge(protected).with_state(state);

    if let Some(images) = images {
        app = app.nest_service(&images.route, ServeDir::new(images.dir));
    }

    app.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
