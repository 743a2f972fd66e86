use axum::{
    routing::{get, post},
    Router,
};
use gigwork_backend::middleware::auth::Claims;
use gigwork_backend::{routes, AppState};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::env;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test_secret_key";

pub async fn setup() -> sqlx::PgPool {
    dotenvy::dotenv().ok();
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", JWT_SECRET);
    env::set_var("API_RPS", "1000");
    env::set_var("FEED_PAGE_LIMIT", "100000");

    // Several tests share one process; the first init wins.
    let _ = gigwork_backend::config::init_config();

    let pool = gigwork_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");
    pool
}

pub fn bearer_for(user: Uuid) -> String {
    let claims = Claims {
        sub: user.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("sign token");
    format!("Bearer {}", token)
}

pub fn api_router(state: AppState) -> Router {
    Router::new()
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
        .with_state(state)
}

pub async fn seed_profile(state: &AppState, username: &str) -> Uuid {
    let id = Uuid::new_v4();
    state
        .profile_service
        .create(
            id,
            gigwork_backend::dto::profile_dto::CreateProfilePayload {
                username: format!("{}_{}", username, &id.to_string()[..8]),
                full_name: Some(username.to_string()),
                avatar_url: None,
                phone: None,
                bio: None,
            },
        )
        .await
        .expect("seed profile");
    id
}
