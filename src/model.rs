use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::schedule::{ServiceStatus, ServiceType};

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Record {
    pub id: i32,
}

#[derive(Debug, Deserialize)]
pub struct PostRegister {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PostLogin {
    pub username: String,
    pub password: String,
}

/// Row used to check a login attempt; never serialized.
#[derive(Debug, sqlx::FromRow)]
pub struct CredentialModel {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginSuccess {
    pub user_id: i32,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, sqlx::FromRow)]
pub struct VehicleModel {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub model_year: String,
    pub reg_number: String,
}

#[derive(Debug, Deserialize)]
pub struct PostVehicle {
    pub user_id: i32,
    pub name: String,
    #[serde(deserialize_with = "text_or_number")]
    pub model_year: String,
    pub reg_number: String,
}

#[derive(Debug, Deserialize)]
pub struct PostService {
    pub vehicle_id: i32,
    pub service_type: ServiceType,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ServiceModel {
    pub id: i32,
    pub vehicle_id: i32,
    pub service_type: String,
    pub last_service_date: NaiveDate,
    pub next_due_date: NaiveDate,
}

/// A service record as returned to clients, with its status derived for
/// the day the request was served.
#[derive(Debug, Deserialize, Serialize)]
pub struct ServiceView {
    pub id: i32,
    pub vehicle_id: i32,
    pub service_type: ServiceType,
    pub last_service_date: NaiveDate,
    pub next_due_date: NaiveDate,
    pub status: ServiceStatus,
}

impl ServiceView {
    pub fn from_model(model: ServiceModel, today: NaiveDate) -> Self {
        Self {
            id: model.id,
            vehicle_id: model.vehicle_id,
            service_type: ServiceType::from_label(&model.service_type),
            last_service_date: model.last_service_date,
            status: ServiceStatus::classify(model.next_due_date, today),
            next_due_date: model.next_due_date,
        }
    }
}

/// Accepts `"2019"` as well as `2019`.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match TextOrNumber::deserialize(deserializer)? {
        TextOrNumber::Text(text) => text,
        TextOrNumber::Number(number) => number.to_string(),
    })
}
