use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::calc::payroll::{Adjustments, compute, summarize};
use crate::error::{ServiceError, ServiceResult, StoreError};
use crate::model::payroll::{PayPeriod, PayrollRecord, PayrollStatus};
use crate::services::attendance;
use crate::state::AppState;
use crate::store::{Page, PayrollFilter};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GeneratePayroll {
    #[schema(example = "EMP-001")]
    pub employee_id: String,

    #[schema(example = "2026-01")]
    pub pay_period: String,

    /// Overrides the employee's base gross salary for this run.
    #[schema(example = 30000.0, nullable = true)]
    #[serde(default)]
    pub gross_salary: Option<f64>,

    #[serde(default)]
    pub adjustments: Adjustments,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdatePayroll {
    #[schema(example = 1500.0)]
    pub bonus: Option<f64>,
    #[schema(example = 500.0)]
    pub incentive: Option<f64>,
    #[schema(example = 0.0)]
    pub loan_deduction: Option<f64>,
    #[schema(example = 0.0)]
    pub other_deductions: Option<f64>,
    pub status: Option<PayrollStatus>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PayrollQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,

    #[schema(example = 10)]
    pub per_page: Option<u32>,

    #[schema(example = "EMP-001")]
    pub employee_id: Option<String>,

    #[schema(example = "2026-01")]
    pub pay_period: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedPayrollResponse {
    pub data: Vec<PayrollRecord>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Computes and stores the payroll of one employee for one month.
pub async fn generate(
    state: &AppState,
    actor: &AuthUser,
    request: &GeneratePayroll,
) -> ServiceResult<PayrollRecord> {
    actor.require_hr_or_admin()?;

    let period: PayPeriod = request.pay_period.parse()?;
    let pay_period = period.to_string();
    request.adjustments.validate()?;
    if let Some(gross) = request.gross_salary {
        if !gross.is_finite() || gross < 0.0 {
            return Err(ServiceError::validation("gross_salary must be a non-negative amount"));
        }
    }

    if state
        .stores
        .payroll
        .exists(&request.employee_id, &pay_period)
        .await?
    {
        return Err(ServiceError::conflict(format!(
            "Payroll for {} in {pay_period} already exists",
            request.employee_id
        )));
    }

    let profile = state
        .stores
        .departments
        .resolve(&request.employee_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Employee not found"))?;

    let records = attendance::snapshot(
        state,
        &request.employee_id,
        period.first_day(),
        period.last_day(),
    )
    .await?;
    let summary = summarize(&records, period);

    let gross = request
        .gross_salary
        .unwrap_or(profile.employee.base_gross_salary);
    let breakdown = compute(gross, &summary, &request.adjustments, &state.rules);

    let mut record = PayrollRecord {
        id: 0,
        employee_id: profile.employee.employee_id,
        employee_name: profile.employee.name,
        department: profile.department,
        designation: profile.employee.designation,
        pay_period,
        gross_salary: gross,
        earnings: breakdown.earnings,
        attendance: summary,
        deductions: breakdown.deductions,
        total_earnings: breakdown.total_earnings,
        total_deductions: breakdown.total_deductions,
        net_pay: breakdown.net_pay,
        status: PayrollStatus::Approved,
        created_by: actor.user_id,
        created_at: Utc::now(),
    };

    record.id = match state.stores.payroll.insert(&record).await {
        Ok(id) => id,
        Err(StoreError::Duplicate) => {
            return Err(ServiceError::conflict(format!(
                "Payroll for {} in {} already exists",
                record.employee_id, record.pay_period
            )));
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        employee_id = %record.employee_id,
        pay_period = %record.pay_period,
        net_pay = record.net_pay,
        "Payroll generated"
    );
    Ok(record)
}

pub async fn get(state: &AppState, actor: &AuthUser, id: u64) -> ServiceResult<PayrollRecord> {
    actor.require_hr_or_admin()?;

    state
        .stores
        .payroll
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Payroll record not found"))
}

pub async fn list(
    state: &AppState,
    actor: &AuthUser,
    query: &PayrollQuery,
) -> ServiceResult<PaginatedPayrollResponse> {
    actor.require_hr_or_admin()?;

    let page = Page::new(query.page, query.per_page);
    let filter = PayrollFilter {
        employee_id: query.employee_id.clone(),
        pay_period: query.pay_period.clone(),
    };
    let (data, total) = state.stores.payroll.list(&filter, page).await?;

    Ok(PaginatedPayrollResponse {
        data,
        page: page.page,
        per_page: page.per_page,
        total,
    })
}

/// Applies the given adjustments and re-derives the totals.
pub async fn update(
    state: &AppState,
    actor: &AuthUser,
    id: u64,
    changes: &UpdatePayroll,
) -> ServiceResult<PayrollRecord> {
    actor.require_hr_or_admin()?;

    for (name, value) in [
        ("bonus", changes.bonus),
        ("incentive", changes.incentive),
        ("loan_deduction", changes.loan_deduction),
        ("other_deductions", changes.other_deductions),
    ] {
        if value.is_some_and(|v| !v.is_finite() || v < 0.0) {
            return Err(ServiceError::validation(format!(
                "{name} must be a non-negative amount"
            )));
        }
    }

    let mut record = get(state, actor, id).await?;

    if let Some(v) = changes.bonus {
        record.earnings.bonus = v;
    }
    if let Some(v) = changes.incentive {
        record.earnings.incentive = v;
    }
    if let Some(v) = changes.loan_deduction {
        record.deductions.loan_deduction = v;
    }
    if let Some(v) = changes.other_deductions {
        record.deductions.other_deductions = v;
    }
    if let Some(status) = changes.status {
        record.status = status;
    }
    record.recompute_totals();

    if !state.stores.payroll.update(&record).await? {
        return Err(ServiceError::not_found("Payroll record not found"));
    }

    info!(payroll_id = id, net_pay = record.net_pay, "Payroll updated");
    Ok(record)
}
