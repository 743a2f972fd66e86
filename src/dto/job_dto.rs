use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateJobPayload {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    pub amount: Decimal,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub job_date: Option<NaiveDate>,
    pub shift_start: Option<String>,
    pub shift_end: Option<String>,
    #[serde(default)]
    pub has_food: bool,
    pub dress_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateJobPayload {
    #[validate(length(min = 1, max = 120))]
    pub title: Option<String>,
    pub amount: Option<Decimal>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub job_date: Option<NaiveDate>,
    pub shift_start: Option<String>,
    pub shift_end: Option<String>,
    pub has_food: Option<bool>,
    pub dress_code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteJobResponse {
    pub deleted: bool,
}
