use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::error::ServiceError;

/// A calendar month, written "YYYY-MM".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PayPeriod {
    first_day: NaiveDate,
}

impl PayPeriod {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        // first day of the next month, minus one day
        self.first_day
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(self.first_day)
    }

    pub fn days(&self) -> u32 {
        self.last_day().day()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day && date <= self.last_day()
    }
}

impl FromStr for PayPeriod {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ServiceError::validation(format!("pay period {s:?} must be YYYY-MM"));

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;

        PayPeriod::new(year, month).ok_or_else(invalid)
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.first_day.year(), self.first_day.month())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
pub enum PayrollStatus {
    Pending,
    Approved,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Earnings {
    pub basic: f64,
    pub hra: f64,
    pub da: f64,
    pub conveyance: f64,
    pub medical: f64,
    pub bonus: f64,
    pub incentive: f64,
    pub overtime_pay: f64,
}

impl Earnings {
    pub fn total(&self) -> f64 {
        self.basic
            + self.hra
            + self.da
            + self.conveyance
            + self.medical
            + self.bonus
            + self.incentive
            + self.overtime_pay
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Deductions {
    pub provident_fund: f64,
    pub esi: f64,
    pub professional_tax: f64,
    pub lop_days: f64,
    pub lop_deduction: f64,
    pub loan_deduction: f64,
    pub other_deductions: f64,
}

impl Deductions {
    /// Sum of the money lines; `lop_days` is a count, not an amount.
    pub fn total(&self) -> f64 {
        self.provident_fund
            + self.esi
            + self.professional_tax
            + self.lop_deduction
            + self.loan_deduction
            + self.other_deductions
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceSummary {
    pub working_days: u32,
    pub present_days: u32,
    pub absent_days: u32,
    pub half_days: u32,
    pub overtime_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayrollRecord {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "EMP-001")]
    pub employee_id: String,
    #[schema(example = "John Doe")]
    pub employee_name: String,
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = "Software Engineer")]
    pub designation: String,
    #[schema(example = "2026-01")]
    pub pay_period: String,
    #[schema(example = 30000.0)]
    pub gross_salary: f64,
    pub earnings: Earnings,
    pub attendance: AttendanceSummary,
    pub deductions: Deductions,
    pub total_earnings: f64,
    pub total_deductions: f64,
    pub net_pay: f64,
    pub status: PayrollStatus,
    pub created_by: u64,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

impl PayrollRecord {
    /// Re-derives the three totals from the individual lines.
    pub fn recompute_totals(&mut self) {
        self.total_earnings = self.earnings.total();
        self.total_deductions = self.deductions.total();
        self.net_pay = self.total_earnings - self.total_deductions;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pay_period() {
        let p: PayPeriod = "2024-02".parse().unwrap();
        assert_eq!(p.days(), 29);
        assert_eq!(p.to_string(), "2024-02");
        assert_eq!(p.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let dec: PayPeriod = "2025-12".parse().unwrap();
        assert_eq!(dec.days(), 31);
    }

    #[test]
    fn rejects_malformed_pay_period() {
        for bad in ["2024-13", "2024-1", "24-01", "2024/01", "", "2024-00"] {
            assert!(bad.parse::<PayPeriod>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn contains_only_dates_of_the_month() {
        let p: PayPeriod = "2026-04".parse().unwrap();
        assert!(p.contains(NaiveDate::from_ymd_opt(2026, 4, 30).unwrap()));
        assert!(!p.contains(NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()));
    }
}
