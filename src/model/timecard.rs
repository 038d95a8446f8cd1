use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::calc::time::{is_duration, is_wall_clock, to_minutes};
use crate::error::ServiceError;

const PERMISSION_MAX_LEN: usize = 8;
const REASON_MAX_LEN: usize = 255;

/// One employee-day of raw punches. Empty strings mean "not punched".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TimePunch {
    #[schema(example = "EMP-001")]
    pub employee_id: String,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    #[sqlx(rename = "work_date")]
    pub date: NaiveDate,
    #[schema(example = "09:00")]
    #[serde(default)]
    pub log_in: String,
    #[schema(example = "18:00")]
    #[serde(default)]
    pub log_out: String,
    #[schema(example = "13:00")]
    #[serde(default)]
    pub lunch_out: String,
    #[schema(example = "13:45")]
    #[serde(default)]
    pub lunch_in: String,
    /// Approved short leave taken during the day, "HH:MM".
    #[schema(example = "01:00")]
    #[serde(default)]
    pub permission: String,
    #[schema(example = "Doctor appointment")]
    #[serde(default)]
    pub reason: String,
}

impl TimePunch {
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.employee_id.trim().is_empty() {
            return Err(ServiceError::validation("employee_id is required"));
        }

        for (field, value) in [
            ("log_in", &self.log_in),
            ("log_out", &self.log_out),
            ("lunch_out", &self.lunch_out),
            ("lunch_in", &self.lunch_in),
        ] {
            if !value.is_empty() && !is_wall_clock(value) {
                return Err(ServiceError::validation(format!(
                    "{field} must be a 24-hour HH:MM time"
                )));
            }
        }

        if self.log_in.is_empty() && !self.log_out.is_empty() {
            return Err(ServiceError::validation("log_out requires log_in"));
        }

        let permission = self.permission.trim();
        if !permission.is_empty()
            && (!is_duration(permission) || permission.len() > PERMISSION_MAX_LEN)
        {
            return Err(ServiceError::validation(
                "permission must be HH:MM or decimal hours",
            ));
        }

        if self.reason.chars().count() > REASON_MAX_LEN {
            return Err(ServiceError::validation(format!(
                "reason must be at most {REASON_MAX_LEN} characters"
            )));
        }

        Ok(())
    }

    /// Validated copy with wall-clock fields rewritten as zero-padded "HH:MM".
    pub fn normalized(&self) -> Result<TimePunch, ServiceError> {
        self.validate()?;

        let pad = |value: &str| {
            to_minutes(value)
                .map(|m| format!("{:02}:{:02}", m / 60, m % 60))
                .unwrap_or_default()
        };

        Ok(TimePunch {
            employee_id: self.employee_id.trim().to_string(),
            date: self.date,
            log_in: pad(&self.log_in),
            log_out: pad(&self.log_out),
            lunch_out: pad(&self.lunch_out),
            lunch_in: pad(&self.lunch_in),
            permission: self.permission.trim().to_string(),
            reason: self.reason.trim().to_string(),
        })
    }

    pub fn has_logout(&self) -> bool {
        !self.log_out.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn punch() -> TimePunch {
        TimePunch {
            employee_id: "EMP-001".into(),
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            log_in: "09:00".into(),
            log_out: "18:00".into(),
            ..TimePunch::default()
        }
    }

    #[test]
    fn accepts_open_punch() {
        let mut p = punch();
        p.log_out.clear();
        assert!(p.validate().is_ok());
        assert!(!p.has_logout());
    }

    #[test]
    fn rejects_malformed_times() {
        let mut p = punch();
        p.log_in = "25:00".into();
        assert!(p.validate().is_err());

        let mut p = punch();
        p.lunch_in = "1pm".into();
        assert!(p.validate().is_err());

        let mut p = punch();
        p.permission = "soon".into();
        assert!(p.validate().is_err());

        let mut p = punch();
        p.log_in = " +9:00 ".into();
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_values_wider_than_their_columns() {
        let mut p = punch();
        p.permission = "123456789".into();
        assert!(p.validate().is_err());

        p.permission = "12345678".into();
        assert!(p.validate().is_ok());

        let mut p = punch();
        p.reason = "x".repeat(256);
        assert!(p.validate().is_err());
    }

    #[test]
    fn normalizes_to_zero_padded_clock() {
        let mut p = punch();
        p.employee_id = " EMP-001 ".into();
        p.log_in = " 9:05 ".into();
        p.lunch_out = "13:00".into();
        p.permission = " 1.5 ".into();

        let n = p.normalized().unwrap();
        assert_eq!(n.employee_id, "EMP-001");
        assert_eq!(n.log_in, "09:05");
        assert_eq!(n.log_out, "18:00");
        assert_eq!(n.lunch_out, "13:00");
        assert_eq!(n.lunch_in, "");
        assert_eq!(n.permission, "1.5");
        assert!(n.log_in.len() <= 5);
    }

    #[test]
    fn rejects_logout_without_login() {
        let mut p = punch();
        p.log_in.clear();
        assert!(p.validate().is_err());
    }
}
