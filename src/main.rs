mod config;
mod model;
mod notifier;
mod password;
mod schedule;
mod schema;
mod store;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{get, post, HttpResponse, Responder};
use actix_web::{web, App, HttpServer};
use chrono::{Local, NaiveDate};
use dotenv::dotenv;
use log::{error, info, warn};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::model::*;
use crate::notifier::{DisabledNotifier, Notifier, SmtpNotifier};
use crate::schedule::ServiceStatus;
use crate::store::{PgStore, Store, StoreError};

#[post("/register")]
async fn register(data: web::Data<AppState>, request: web::Json<PostRegister>) -> impl Responder {
    let password_hash = match password::hash_password(&request.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to hash password: {}", e);
            return HttpResponse::InternalServerError().body("Failed to register user");
        }
    };

    let result = data
        .store
        .insert_user(&request.username, &request.email, &password_hash)
        .await;

    match result {
        Ok(id) => {
            info!("Registered user {} as {}", request.username, id);
            HttpResponse::Ok().json(json!({ "message": "User registered successfully" }))
        }
        Err(StoreError::DuplicateUsername) => {
            HttpResponse::Ok().json(json!({ "message": "Username already exists" }))
        }
        Err(e) => {
            error!("Failed to insert user: {}", e);
            HttpResponse::InternalServerError().body("Failed to register user")
        }
    }
}

#[post("/login")]
async fn login(data: web::Data<AppState>, request: web::Json<PostLogin>) -> impl Responder {
    match data.store.find_credentials(&request.username).await {
        Ok(Some(user)) if password::verify_password(&request.password, &user.password_hash) => {
            HttpResponse::Ok().json(LoginSuccess {
                user_id: user.id,
                email: user.email,
            })
        }
        Ok(_) => HttpResponse::Ok().json(json!({ "message": "Invalid credentials" })),
        Err(e) => {
            error!("Failed to query credentials: {}", e);
            HttpResponse::InternalServerError().body("Failed to log in")
        }
    }
}

#[post("/add_vehicle")]
async fn add_vehicle(data: web::Data<AppState>, request: web::Json<PostVehicle>) -> impl Responder {
    match data.store.insert_vehicle(&request).await {
        Ok(_) => HttpResponse::Ok().json(json!({ "message": "Vehicle added" })),
        Err(e) => {
            error!("Failed to insert vehicle: {}", e);
            HttpResponse::InternalServerError().body("Failed to create vehicle")
        }
    }
}

#[get("/get_vehicles/{user_id}")]
async fn get_vehicles(data: web::Data<AppState>, path: web::Path<(i32,)>) -> impl Responder {
    let user_id = path.into_inner().0;
    match data.store.vehicles_for_user(user_id).await {
        Ok(vehicles) => HttpResponse::Ok().json(vehicles),
        Err(e) => {
            error!("Failed to query vehicles: {}", e);
            HttpResponse::InternalServerError().body("Failed to query vehicles")
        }
    }
}

#[post("/add_service")]
async fn add_service(data: web::Data<AppState>, request: web::Json<PostService>) -> impl Responder {
    let PostService {
        vehicle_id,
        service_type,
    } = request.into_inner();
    let last_service_date = (data.today)();
    let next_due_date = service_type.next_due_date(last_service_date);

    let result = data
        .store
        .insert_service(vehicle_id, service_type, last_service_date, next_due_date)
        .await;

    match result {
        Ok(_) => HttpResponse::Ok().json(json!({
            "message": "Service added",
            "next_due": next_due_date,
        })),
        Err(e) => {
            error!("Failed to insert service: {}", e);
            HttpResponse::InternalServerError().body("Failed to add service")
        }
    }
}

#[get("/get_services/{vehicle_id}")]
async fn get_services(data: web::Data<AppState>, path: web::Path<(i32,)>) -> impl Responder {
    let vehicle_id = path.into_inner().0;

    let services = match data.store.services_for_vehicle(vehicle_id).await {
        Ok(services) => services,
        Err(e) => {
            error!("Failed to query services: {}", e);
            return HttpResponse::InternalServerError().body("Failed to query services");
        }
    };
    let owner_email = match data.store.owner_email(vehicle_id).await {
        Ok(email) => email,
        Err(e) => {
            error!("Failed to query vehicle owner: {}", e);
            return HttpResponse::InternalServerError().body("Failed to query services");
        }
    };

    let today = (data.today)();
    let views: Vec<ServiceView> = services
        .into_iter()
        .map(|service| ServiceView::from_model(service, today))
        .collect();

    if let Some(email) = owner_email {
        for view in views.iter().filter(|v| v.status == ServiceStatus::Overdue) {
            let subject = format!("Service Overdue: {}", view.service_type);
            let body = format!(
                "Your vehicle (ID: {}) is overdue for {}. Due date was {}.",
                vehicle_id, view.service_type, view.next_due_date
            );
            if let Err(e) = data.notifier.send(&email, &subject, &body).await {
                error!("Email to {} failed: {}", email, e);
            }
        }
    }

    HttpResponse::Ok().json(views)
}

pub struct AppState {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(add_vehicle)
        .service(get_vehicles)
        .service(add_service)
        .service(get_services);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    let pool = match PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            info!("Connection to the database is successful");
            pool
        }
        Err(err) => {
            error!("Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = schema::ensure_schema(&pool).await {
        error!("Failed to create tables: {:?}", err);
        std::process::exit(1);
    }

    let notifier: Arc<dyn Notifier> = match &config.mail {
        Some(mail) => match SmtpNotifier::new(mail) {
            Ok(notifier) => Arc::new(notifier),
            Err(err) => {
                error!("Invalid mail configuration: {}", err);
                std::process::exit(1);
            }
        },
        None => {
            warn!("SMTP_USERNAME not set, overdue alerts will only be logged");
            Arc::new(DisabledNotifier)
        }
    };
    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));

    info!("Server started on {}:{}", config.http_host, config.http_port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(AppState {
                store: store.clone(),
                notifier: notifier.clone(),
                today: local_today,
            }))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_header()
                    .allow_any_method()
                    .supports_credentials(),
            )
            .wrap(Logger::default())
            .configure(routes)
    })
    .bind((config.http_host.as_str(), config.http_port))?
    .run()
    .await
}
