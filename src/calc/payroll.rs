use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::PayrollRules;
use crate::error::ServiceError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::payroll::{AttendanceSummary, Deductions, Earnings, PayPeriod};

/// Caller-supplied additions and deductions on top of the computed lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Adjustments {
    #[schema(example = 1000.0)]
    pub bonus: f64,
    #[schema(example = 500.0)]
    pub incentive: f64,
    #[schema(example = 0.0)]
    pub loan_deduction: f64,
    #[schema(example = 0.0)]
    pub other_deductions: f64,
}

impl Adjustments {
    pub fn validate(&self) -> Result<(), ServiceError> {
        for (name, value) in [
            ("bonus", self.bonus),
            ("incentive", self.incentive),
            ("loan_deduction", self.loan_deduction),
            ("other_deductions", self.other_deductions),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ServiceError::validation(format!(
                    "{name} must be a non-negative amount"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayrollBreakdown {
    pub earnings: Earnings,
    pub deductions: Deductions,
    pub total_earnings: f64,
    pub total_deductions: f64,
    pub net_pay: f64,
}

/// Month attendance totals. Every calendar day counts as a working day.
///
/// Records outside `period` are ignored; a date seen twice counts once.
pub fn summarize(records: &[AttendanceRecord], period: PayPeriod) -> AttendanceSummary {
    let by_day: BTreeMap<_, _> = records
        .iter()
        .filter(|r| period.contains(r.date))
        .map(|r| (r.date, r))
        .collect();

    let working_days = period.days();
    let mut present_days = 0u32;
    let mut half_days = 0u32;
    let mut overtime_hours = 0.0;

    for record in by_day.values() {
        match record.status {
            AttendanceStatus::Present => present_days += 1,
            AttendanceStatus::HalfDay => half_days += 1,
            AttendanceStatus::Absent | AttendanceStatus::InOffice => {}
        }
        overtime_hours += record.overtime_hours;
    }

    AttendanceSummary {
        working_days,
        present_days,
        absent_days: working_days.saturating_sub(present_days + half_days),
        half_days,
        overtime_hours,
    }
}

/// Gross-to-net breakdown. Each money line is rounded on its own.
pub fn compute(
    gross: f64,
    summary: &AttendanceSummary,
    adjustments: &Adjustments,
    rules: &PayrollRules,
) -> PayrollBreakdown {
    let split = &rules.split;
    let working_days = summary.working_days as f64;

    let overtime_pay = if summary.working_days == 0 {
        0.0
    } else {
        let hourly = gross / (working_days * rules.standard_day_hours);
        (summary.overtime_hours * hourly * rules.overtime_multiplier).round()
    };

    let earnings = Earnings {
        basic: (gross * split.basic).round(),
        hra: (gross * split.hra).round(),
        da: (gross * split.da).round(),
        conveyance: (gross * split.conveyance).round(),
        medical: (gross * split.medical).round(),
        bonus: adjustments.bonus,
        incentive: adjustments.incentive,
        overtime_pay,
    };

    let lop_days = (working_days - summary.present_days as f64 - 0.5 * summary.half_days as f64)
        .max(0.0);
    let lop_deduction = if summary.working_days == 0 {
        0.0
    } else {
        (gross / working_days * lop_days).round()
    };

    let deductions = Deductions {
        provident_fund: (earnings.basic * rules.pf_rate).round(),
        esi: if gross <= rules.esi_gross_ceiling {
            (gross * rules.esi_rate).round()
        } else {
            0.0
        },
        professional_tax: if gross > rules.professional_tax_floor {
            rules.professional_tax
        } else {
            0.0
        },
        lop_days,
        lop_deduction,
        loan_deduction: adjustments.loan_deduction,
        other_deductions: adjustments.other_deductions,
    };

    let total_earnings = earnings.total();
    let total_deductions = deductions.total();

    PayrollBreakdown {
        earnings,
        deductions,
        total_earnings,
        total_deductions,
        net_pay: total_earnings - total_deductions,
    }
}
