//! In-memory doubles for handler tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::*;
use crate::notifier::{Notifier, NotifyError};
use crate::schedule::ServiceType;
use crate::store::{Store, StoreError};

#[derive(Default)]
struct Tables {
    users: Vec<(i32, String, String, String)>,
    vehicles: Vec<VehicleModel>,
    services: Vec<ServiceModel>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Inserts a service row directly, bypassing today's date.
    pub fn seed_service(&self, vehicle_id: i32, service_type: ServiceType, last: NaiveDate) {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.services.len() as i32 + 1;
        tables.services.push(ServiceModel {
            id,
            vehicle_id,
            service_type: service_type.as_str().to_owned(),
            last_service_date: last,
            next_due_date: service_type.next_due_date(last),
        });
    }

    pub fn stored_password_hash(&self, username: &str) -> Option<String> {
        let tables = self.tables.lock().unwrap();
        tables
            .users
            .iter()
            .find(|(_, name, _, _)| name == username)
            .map(|(_, _, _, hash)| hash.clone())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<i32, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|(_, name, _, _)| name == username) {
            return Err(StoreError::DuplicateUsername);
        }
        let id = tables.users.len() as i32 + 1;
        tables.users.push((
            id,
            username.to_owned(),
            email.to_owned(),
            password_hash.to_owned(),
        ));
        Ok(id)
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<CredentialModel>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .users
            .iter()
            .find(|(_, name, _, _)| name == username)
            .map(|(id, _, email, hash)| CredentialModel {
                id: *id,
                email: email.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn insert_vehicle(&self, vehicle: &PostVehicle) -> Result<i32, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.vehicles.len() as i32 + 1;
        tables.vehicles.push(VehicleModel {
            id,
            user_id: vehicle.user_id,
            name: vehicle.name.clone(),
            model_year: vehicle.model_year.clone(),
            reg_number: vehicle.reg_number.clone(),
        });
        Ok(id)
    }

    async fn vehicles_for_user(&self, user_id: i32) -> Result<Vec<VehicleModel>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .vehicles
            .iter()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_service(
        &self,
        vehicle_id: i32,
        service_type: ServiceType,
        last_service_date: NaiveDate,
        next_due_date: NaiveDate,
    ) -> Result<i32, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.services.len() as i32 + 1;
        tables.services.push(ServiceModel {
            id,
            vehicle_id,
            service_type: service_type.as_str().to_owned(),
            last_service_date,
            next_due_date,
        });
        Ok(id)
    }

    async fn services_for_vehicle(
        &self,
        vehicle_id: i32,
    ) -> Result<Vec<ServiceModel>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .services
            .iter()
            .filter(|s| s.vehicle_id == vehicle_id)
            .cloned()
            .collect())
    }

    async fn owner_email(&self, vehicle_id: i32) -> Result<Option<String>, StoreError> {
        let tables = self.tables.lock().unwrap();
        let owner = tables
            .vehicles
            .iter()
            .find(|v| v.id == vehicle_id)
            .map(|v| v.user_id);
        Ok(owner.and_then(|user_id| {
            tables
                .users
                .iter()
                .find(|(id, _, _, _)| *id == user_id)
                .map(|(_, _, email, _)| email.clone())
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<SentMail>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_owned(),
            subject: subject.to_owned(),
            body: body.to_owned(),
        });
        Ok(())
    }
}

/// Fails every delivery with an address error.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), NotifyError> {
        let err = "not an address"
            .parse::<lettre::Address>()
            .unwrap_err();
        Err(NotifyError::Address(err))
    }
}
