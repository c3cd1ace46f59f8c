use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DUE_SOON_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Wash,
    Oil,
    #[serde(other)]
    Other,
}

impl ServiceType {
    pub fn from_label(label: &str) -> Self {
        match label {
            "wash" => ServiceType::Wash,
            "oil" => ServiceType::Oil,
            _ => ServiceType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Wash => "wash",
            ServiceType::Oil => "oil",
            ServiceType::Other => "other",
        }
    }

    pub fn interval(&self) -> Duration {
        match self {
            ServiceType::Wash => Duration::days(30),
            ServiceType::Oil => Duration::days(90),
            ServiceType::Other => Duration::days(180),
        }
    }

    pub fn next_due_date(&self, last_service_date: NaiveDate) -> NaiveDate {
        last_service_date + self.interval()
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ServiceStatus {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "due soon")]
    DueSoon,
    #[serde(rename = "overdue")]
    Overdue,
}

impl ServiceStatus {
    pub fn classify(next_due_date: NaiveDate, today: NaiveDate) -> Self {
        if today > next_due_date {
            ServiceStatus::Overdue
        } else if (next_due_date - today).num_days() <= DUE_SOON_DAYS {
            ServiceStatus::DueSoon
        } else {
            ServiceStatus::Ok
        }
    }
}
