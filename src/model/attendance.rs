use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum AttendanceStatus {
    Present,
    #[serde(rename = "Half Day")]
    #[strum(serialize = "Half Day")]
    HalfDay,
    Absent,
    #[serde(rename = "In Office")]
    #[strum(serialize = "In Office")]
    InOffice,
}

/// Derived attendance of one employee-day, upserted on (employee_id, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = "EMP-001")]
    pub employee_id: String,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[schema(example = 8.25)]
    pub total_hours: f64,
    /// Permission credited towards the status, never above the configured cap.
    #[schema(example = 1.0)]
    pub permission_hours: f64,
    #[schema(example = "09:00")]
    pub log_in: String,
    #[schema(example = "18:00")]
    pub log_out: String,
    #[schema(example = 45)]
    pub lunch_minutes: u32,
    #[schema(example = 0.25)]
    pub overtime_hours: f64,
    pub remarks: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_round_trip_through_strings() {
        assert_eq!(AttendanceStatus::HalfDay.to_string(), "Half Day");
        assert_eq!("In Office".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::InOffice);
        assert!("Late".parse::<AttendanceStatus>().is_err());
    }
}
