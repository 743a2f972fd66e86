use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};

/// Wide-open CORS: the mobile client and the web build talk to this
/// API from arbitrary origins.
pub fn permissive_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(Any)
}
