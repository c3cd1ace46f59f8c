use std::env;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be a valid number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_host: String,
    pub http_port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    /// `None` when no SMTP account is configured; alerts are then only logged.
    pub mail: Option<MailConfig>,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));

        let http_port = parse_number("HTTP_PORT", &required("HTTP_PORT")?)?;
        let database_url = required("DATABASE_URL")?;
        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => parse_number("DATABASE_MAX_CONNECTIONS", &value)?,
            None => 10,
        };

        let mail = match lookup("SMTP_USERNAME") {
            Some(username) => {
                let smtp_port = match lookup("SMTP_PORT") {
                    Some(value) => parse_number("SMTP_PORT", &value)?,
                    None => 465,
                };
                Some(MailConfig {
                    smtp_host: lookup("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_owned()),
                    smtp_port,
                    password: required("SMTP_PASSWORD")?,
                    from: lookup("MAIL_FROM").unwrap_or_else(|| username.clone()),
                    username,
                })
            }
            None => None,
        };

        Ok(Config {
            http_host: lookup("HTTP_HOST").unwrap_or_else(|| "127.0.0.1".to_owned()),
            http_port,
            database_url,
            database_max_connections,
            mail,
        })
    }
}

fn parse_number<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: value.to_owned(),
    })
}
