use axum::{
    routing::{get, post},
    Router,
};
use gigwork_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let api = Router::new()
        .route("/api/profiles", post(routes::profiles::create_profile))
        .route(
            "/api/profiles/:id",
            get(routes::profiles::get_profile).patch(routes::profiles::update_profile),
        )
        .route("/api/jobs", post(routes::jobs::create_job))
        .route("/api/jobs/mine", get(routes::jobs::list_my_jobs))
        .route("/api/jobs/feed", get(routes::jobs::job_feed))
        .route(
            "/api/jobs/:id",
            get(routes::jobs::get_job)
                .patch(routes::jobs::update_job)
                .delete(routes::jobs::delete_job),
        )
        .route(
            "/api/jobs/:id/applications",
            get(routes::applications::list_job_applications),
        )
        .route("/api/jobs/:id/apply", post(routes::applications::apply_to_job))
        .route(
            "/api/applications/mine",
            get(routes::applications::list_my_applications),
        )
        .route(
            "/api/applications/:id/hire",
            post(routes::applications::hire_applicant),
        )
        .route(
            "/api/applications/:id/withdraw",
            post(routes::applications::withdraw_application),
        )
        .route(
            "/api/messages",
            get(routes::messages::conversation_overview).post(routes::messages::send_message),
        )
        .route(
            "/api/messages/unread",
            get(routes::messages::unread_message_count),
        )
        .route(
            "/api/messages/with/:user_id",
            get(routes::messages::get_conversation),
        )
        .route(
            "/api/notifications/poll",
            get(routes::notifications::poll_notifications),
        )
        .route(
            "/api/notifications/:id/read",
            post(routes::notifications::mark_notification_read),
        )
        .layer(axum::middleware::from_fn(
            gigwork_backend::middleware::auth::require_bearer_auth,
        ))
        .layer(axum::middleware::from_fn_with_state(
            gigwork_backend::middleware::rate_limit::new_rps_state(config.api_rps),
            gigwork_backend::middleware::rate_limit::rps_middleware,
        ));

    let app = base_routes
        .merge(api)
        .with_state(app_state)
        .layer(gigwork_backend::middleware::cors::permissive_cors())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
