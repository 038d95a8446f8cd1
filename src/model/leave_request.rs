use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Casual,
    Sick,
    Earned,
    Maternity,
    Paternity,
    Bereavement,
    Unpaid,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    /// Requests in these states block overlapping submissions.
    pub fn blocks_overlap(self) -> bool {
        matches!(self, LeaveStatus::Pending | LeaveStatus::Approved)
    }
}

/// A leave request before it has been stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLeave {
    pub employee_id: String,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: u32,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "EMP-001")]
    pub employee_id: String,
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-10", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-15", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    /// Inclusive number of calendar days.
    #[schema(example = 6)]
    pub days: u32,
    pub reason: String,
    pub status: LeaveStatus,
    #[schema(nullable = true)]
    pub approved_by: Option<u64>,
    #[schema(value_type = Option<String>, format = "date", nullable = true)]
    pub decided_on: Option<NaiveDate>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl LeaveRequest {
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }
}

/// Inclusive day count of `[start, end]`; zero when the range is inverted.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> u32 {
    let span = (end - start).num_days();
    if span < 0 { 0 } else { span as u32 + 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn counts_days_inclusively() {
        assert_eq!(inclusive_days(day(10), day(10)), 1);
        assert_eq!(inclusive_days(day(10), day(15)), 6);
        assert_eq!(inclusive_days(day(15), day(10)), 0);
    }

    #[test]
    fn parses_leave_type_names() {
        assert_eq!("maternity".parse::<LeaveType>().unwrap(), LeaveType::Maternity);
        assert_eq!(LeaveStatus::Approved.to_string(), "approved");
        assert!(!LeaveStatus::Rejected.blocks_overlap());
    }
}
