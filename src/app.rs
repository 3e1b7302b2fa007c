// app.rs - Application state and the route table

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::TokenVerifier;
use crate::config::SecurityConfig;
use crate::database::Database;
use crate::error::{method_not_allowed, not_found, panic_response};
use crate::handlers::{protected, public};
use crate::middleware::require_scope;

/// Scopes required by the protected drink routes
pub mod scopes {
    pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
    pub const POST_DRINKS: &str = "post:drinks";
    pub const PATCH_DRINKS: &str = "patch:drinks";
    pub const DELETE_DRINKS: &str = "delete:drinks";
}

/// Shared, immutable per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(db: Database, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { db, verifier }
    }
}

/// Build the router once at startup
pub fn router(state: AppState, security: &SecurityConfig) -> Router {
    let verifier = &state.verifier;

    let router = Router::new()
        .route(
            "/health",
            get(public::health_get).fallback(method_not_allowed),
        )
        .route(
            "/drinks",
            get(public::drinks_list)
                .merge(require_scope(
                    verifier,
                    scopes::POST_DRINKS,
                    post(protected::drinks_create),
                ))
                .fallback(method_not_allowed),
        )
        .route(
            "/drinks-detail",
            require_scope(
                verifier,
                scopes::GET_DRINKS_DETAIL,
                get(protected::drinks_list_detail),
            )
            .fallback(method_not_allowed),
        )
        .route(
            "/drinks/:id",
            require_scope(
                verifier,
                scopes::PATCH_DRINKS,
                patch(protected::drinks_update),
            )
            .merge(require_scope(
                verifier,
                scopes::DELETE_DRINKS,
                delete(protected::drinks_delete),
            ))
            .fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(panic_response)),
        );

    let router = if security.enable_cors {
        router.layer(cors_layer(security))
    } else {
        router
    };

    router.with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins = if security.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            security
                .cors_origins
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
}
