use serde::{Deserialize, Serialize};
use sqlx::prelude::Type;
use uuid::Uuid;

pub mod handler;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, Serialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "reservation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

pub fn parse_activity_date(raw: &str) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

pub fn parse_reservation_time(raw: &str) -> Option<chrono::NaiveDateTime> {
    chrono::NaiveDateTime::parse_from_str(raw, TIME_FORMAT).ok()
}

#[derive(Debug, Deserialize)]
pub struct ActivityForm {
    pub name: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReservationForm {
    pub activity_id: Option<String>,
    pub user_id: Option<String>,
    pub reservation_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ManageReservationForm {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActivitySummary {
    pub id: Uuid,
    pub name: String,
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct ActivityDetail {
    pub id: Uuid,
    pub name: String,
    pub date: String,
    pub location: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReservationDetail {
    pub id: Uuid,
    pub activity_id: Uuid,
    pub user_id: Uuid,
    pub reservation_time: String,
    pub status: ReservationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_only_known_values() {
        assert_eq!(
            ReservationStatus::parse("pending"),
            Some(ReservationStatus::Pending)
        );
        assert_eq!(
            ReservationStatus::parse("confirmed"),
            Some(ReservationStatus::Confirmed)
        );
        assert_eq!(
            ReservationStatus::parse("cancelled"),
            Some(ReservationStatus::Cancelled)
        );
        assert_eq!(ReservationStatus::parse("Confirmed"), None);
        assert_eq!(ReservationStatus::parse("done"), None);
    }

    #[test]
    fn activity_dates_use_day_precision() {
        let date = parse_activity_date("2024-03-20").unwrap();
        assert_eq!(date.format(DATE_FORMAT).to_string(), "2024-03-20");
        assert!(parse_activity_date("20/03/2024").is_none());
        assert!(parse_activity_date("2024-03-20 10:00:00").is_none());
    }

    #[test]
    fn reservation_times_use_second_precision() {
        let time = parse_reservation_time("2024-03-20 10:00:00").unwrap();
        assert_eq!(time.format(TIME_FORMAT).to_string(), "2024-03-20 10:00:00");
        assert!(parse_reservation_time("2024-03-20").is_none());
        assert!(parse_reservation_time("10:00:00").is_none());
    }
}
