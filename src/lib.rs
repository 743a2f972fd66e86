pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    application_service::ApplicationService, job_service::JobService,
    message_service::MessageService, notification_service::NotificationService,
    profile_service::ProfileService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub profile_service: ProfileService,
    pub job_service: JobService,
    pub application_service: ApplicationService,
    pub message_service: MessageService,
    pub notification_service: NotificationService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let profile_service = ProfileService::new(pool.clone());
        let job_service = JobService::new(pool.clone());
        let application_service = ApplicationService::new(pool.clone());
        let message_service = MessageService::new(pool.clone());
        let notification_service = NotificationService::new(pool.clone());

        Self {
            pool,
            profile_service,
            job_service,
            application_service,
            message_service,
            notification_service,
        }
    }
}
