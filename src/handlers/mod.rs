mod favicon;
mod recommender;
mod tabix;

pub use favicon::favicon;
pub use recommender::get_recommendations;
pub use tabix::get_tabix;

use crate::lookup::{Recommender, RegionLookup};
use axum::{
    Router,
    http::{HeaderName, HeaderValue, header},
    routing::get,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowMethods, AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<dyn RegionLookup>,
    pub recommender: Arc<dyn Recommender>,
    /// Root under which per-dataset working directories are created
    pub work_dir: PathBuf,
    pub cors: bool,
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    let cors = state.cors;

    let app = Router::new()
        .route("/v1", get(get_recommendations))
        .route("/v2", get(get_tabix))
        .route("/favicon.ico", get(favicon))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store, no-cache, must-revalidate, proxy-revalidate"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::PRAGMA,
                    HeaderValue::from_static("no-cache"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::EXPIRES,
                    HeaderValue::from_static("0"),
                )),
        );

    if cors {
        app.layer(cors_layer())
    } else {
        app
    }
}

/// Browser clients call from other origins with credentials, so the origin
/// and method are mirrored back rather than answered with a wildcard.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers([HeaderName::from_static("x-requested-with"), header::CONTENT_TYPE])
        .allow_credentials(true)
}
