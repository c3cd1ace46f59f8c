use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgPool;
use thiserror::Error;

use crate::model::*;
use crate::schedule::ServiceType;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already exists")]
    DuplicateUsername,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence for users, vehicles and their service history.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i32, StoreError>;

    async fn find_credentials(&self, username: &str)
        -> Result<Option<CredentialModel>, StoreError>;

    async fn insert_vehicle(&self, vehicle: &PostVehicle) -> Result<i32, StoreError>;

    async fn vehicles_for_user(&self, user_id: i32) -> Result<Vec<VehicleModel>, StoreError>;

    async fn insert_service(
        &self,
        vehicle_id: i32,
        service_type: ServiceType,
        last_service_date: NaiveDate,
        next_due_date: NaiveDate,
    ) -> Result<i32, StoreError>;

    async fn services_for_vehicle(&self, vehicle_id: i32)
        -> Result<Vec<ServiceModel>, StoreError>;

    /// Email of the user owning the vehicle, if both exist.
    async fn owner_email(&self, vehicle_id: i32) -> Result<Option<String>, StoreError>;
}

pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        PgStore { db }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i32, StoreError> {
        let result = sqlx::query_as::<_, Record>(
            r#"
            INSERT INTO users
            (username, email, password_hash)
            VALUES($1, $2, $3)
            RETURNING id;
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await;

        match result {
            Ok(record) => Ok(record.id),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::DuplicateUsername)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<CredentialModel>, StoreError> {
        let row = sqlx::query_as::<_, CredentialModel>(
            r#"SELECT id, email, password_hash FROM users WHERE username = $1"#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn insert_vehicle(&self, vehicle: &PostVehicle) -> Result<i32, StoreError> {
        let record = sqlx::query_as::<_, Record>(
            r#"
            INSERT INTO vehicles
            (user_id, "name", model_year, reg_number)
            VALUES($1, $2, $3, $4)
            RETURNING id;
            "#,
        )
        .bind(vehicle.user_id)
        .bind(&vehicle.name)
        .bind(&vehicle.model_year)
        .bind(&vehicle.reg_number)
        .fetch_one(&self.db)
        .await?;
        Ok(record.id)
    }

    async fn vehicles_for_user(&self, user_id: i32) -> Result<Vec<VehicleModel>, StoreError> {
        let rows = sqlx::query_as::<_, VehicleModel>(
            r#"
            SELECT id, user_id, "name", model_year, reg_number
            FROM vehicles
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn insert_service(
        &self,
        vehicle_id: i32,
        service_type: ServiceType,
        last_service_date: NaiveDate,
        next_due_date: NaiveDate,
    ) -> Result<i32, StoreError> {
        let record = sqlx::query_as::<_, Record>(
            r#"
            INSERT INTO services
            (vehicle_id, service_type, last_service_date, next_due_date)
            VALUES($1, $2, $3, $4)
            RETURNING id;
            "#,
        )
        .bind(vehicle_id)
        .bind(service_type.as_str())
        .bind(last_service_date)
        .bind(next_due_date)
        .fetch_one(&self.db)
        .await?;
        Ok(record.id)
    }

    async fn services_for_vehicle(
        &self,
        vehicle_id: i32,
    ) -> Result<Vec<ServiceModel>, StoreError> {
        let rows = sqlx::query_as::<_, ServiceModel>(
            r#"
            SELECT id, vehicle_id, service_type, last_service_date, next_due_date
            FROM services
            WHERE vehicle_id = $1
            ORDER BY id
            "#,
        )
        .bind(vehicle_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn owner_email(&self, vehicle_id: i32) -> Result<Option<String>, StoreError> {
        let email = sqlx::query_scalar::<_, String>(
            r#"
            SELECT u.email
            FROM vehicles v
            INNER JOIN users u ON v.user_id = u.id
            WHERE v.id = $1
            "#,
        )
        .bind(vehicle_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(email)
    }
}
