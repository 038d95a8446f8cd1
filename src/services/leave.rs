use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::config::WriteGuard;
use crate::error::{ServiceError, ServiceResult};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType, NewLeave, inclusive_days};
use crate::state::AppState;
use crate::store::{LeaveFilter, Page};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateLeave {
    /// Defaults to the caller's own employee record.
    #[schema(example = "EMP-001", nullable = true)]
    #[serde(default)]
    pub employee_id: Option<String>,

    pub leave_type: LeaveType,

    #[schema(example = "2026-01-10", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2026-01-15", value_type = String, format = "date")]
    pub end_date: NaiveDate,

    #[schema(example = "Family trip")]
    pub reason: String,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct LeaveQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 10)]
    pub per_page: Option<u32>,
    #[schema(example = "EMP-001")]
    pub employee_id: Option<String>,
    pub status: Option<LeaveStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// True when a pending or approved request of the employee intersects
/// `[start, end]`.
pub async fn check_overlap(
    state: &AppState,
    employee_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> ServiceResult<bool> {
    let existing = state
        .stores
        .leave
        .overlapping(employee_id, start, end)
        .await?;
    Ok(!existing.is_empty())
}

fn overlap_conflict(employee_id: &str, start: NaiveDate, end: NaiveDate) -> ServiceError {
    warn!(employee_id, %start, %end, "Overlapping leave request rejected");
    ServiceError::conflict("Leave request overlaps an existing pending or approved request")
}

pub async fn create(
    state: &AppState,
    actor: &AuthUser,
    request: &CreateLeave,
) -> ServiceResult<LeaveRequest> {
    let employee_id = match &request.employee_id {
        Some(id) => id.clone(),
        None => actor.own_employee_id()?.to_string(),
    };
    actor.require_self_or_hr(&employee_id)?;

    if request.start_date > request.end_date {
        return Err(ServiceError::validation("start_date must not be after end_date"));
    }
    if request.reason.trim().is_empty() {
        return Err(ServiceError::validation("reason is required"));
    }

    if state.stores.departments.resolve(&employee_id).await?.is_none() {
        return Err(ServiceError::not_found("Employee not found"));
    }

    let leave = NewLeave {
        employee_id,
        leave_type: request.leave_type,
        start_date: request.start_date,
        end_date: request.end_date,
        days: inclusive_days(request.start_date, request.end_date),
        reason: request.reason.trim().to_string(),
    };

    let created = match state.write_guard {
        WriteGuard::Serialized => state
            .stores
            .leave
            .insert_exclusive(&leave)
            .await?
            .ok_or_else(|| overlap_conflict(&leave.employee_id, leave.start_date, leave.end_date))?,
        WriteGuard::CheckThenInsert => {
            if check_overlap(state, &leave.employee_id, leave.start_date, leave.end_date).await? {
                return Err(overlap_conflict(
                    &leave.employee_id,
                    leave.start_date,
                    leave.end_date,
                ));
            }
            state.stores.leave.insert(&leave).await?
        }
    };

    info!(
        leave_id = created.id,
        employee_id = %created.employee_id,
        days = created.days,
        "Leave request created"
    );
    Ok(created)
}

async fn decide(
    state: &AppState,
    actor: &AuthUser,
    id: u64,
    status: LeaveStatus,
) -> ServiceResult<LeaveRequest> {
    actor.require_hr_or_admin()?;

    let today = Utc::now().date_naive();
    let decided = state
        .stores
        .leave
        .decide(id, status, actor.user_id, today)
        .await?
        .ok_or_else(|| ServiceError::not_found("Leave request not found or already processed"))?;

    info!(leave_id = id, status = %status, approver = actor.user_id, "Leave request decided");
    Ok(decided)
}

pub async fn approve(
    state: &AppState,
    actor: &AuthUser,
    id: u64,
) -> ServiceResult<LeaveRequest> {
    decide(state, actor, id, LeaveStatus::Approved).await
}

pub async fn reject(
    state: &AppState,
    actor: &AuthUser,
    id: u64,
) -> ServiceResult<LeaveRequest> {
    decide(state, actor, id, LeaveStatus::Rejected).await
}

pub async fn get(state: &AppState, actor: &AuthUser, id: u64) -> ServiceResult<LeaveRequest> {
    let leave = state
        .stores
        .leave
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Leave request not found"))?;

    actor.require_self_or_hr(&leave.employee_id)?;
    Ok(leave)
}

/// HR/Admin see every request; other callers only their own.
pub async fn list(
    state: &AppState,
    actor: &AuthUser,
    query: &LeaveQuery,
) -> ServiceResult<LeaveListResponse> {
    let employee_id = if actor.role.is_admin_tier() {
        query.employee_id.clone()
    } else {
        let own = actor.own_employee_id()?;
        actor.require_self_or_hr(query.employee_id.as_deref().unwrap_or(own))?;
        Some(own.to_string())
    };

    let page = Page::new(query.page, query.per_page);
    let filter = LeaveFilter {
        employee_id,
        status: query.status,
    };
    let (data, total) = state.stores.leave.list(&filter, page).await?;

    Ok(LeaveListResponse {
        data,
        page: page.page,
        per_page: page.per_page,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::auth::tests::user;
    use crate::model::role::Role;
    use crate::services::test_support::with_employee;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn request(start: u32, end: u32) -> CreateLeave {
        CreateLeave {
            employee_id: None,
            leave_type: LeaveType::Casual,
            start_date: day(start),
            end_date: day(end),
            reason: "Family trip".into(),
        }
    }

    async fn overlap_scenario(guard: WriteGuard, employee_id: &str) {
        let state = with_employee(guard, employee_id, 25000.0).await;
        let me = user(Role::Employee, Some(employee_id));

        let first = create(&state, &me, &request(10, 15)).await.unwrap();
        assert_eq!(first.days, 6);
        assert_eq!(first.status, LeaveStatus::Pending);

        let err = create(&state, &me, &request(14, 20)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let next = create(&state, &me, &request(16, 20)).await.unwrap();
        assert_eq!(next.days, 5);
    }

    #[actix_web::test]
    async fn overlapping_leave_conflicts_when_serialized() {
        overlap_scenario(WriteGuard::Serialized, "LV-001").await;
    }

    #[actix_web::test]
    async fn overlapping_leave_conflicts_with_check_then_insert() {
        overlap_scenario(WriteGuard::CheckThenInsert, "LV-002").await;
    }

    async fn approved_overlap_scenario(guard: WriteGuard, employee_id: &str) {
        let state = with_employee(guard, employee_id, 25000.0).await;
        let me = user(Role::Employee, Some(employee_id));
        let hr = user(Role::Hr, None);

        let first = create(&state, &me, &request(10, 15)).await.unwrap();
        let approved = approve(&state, &hr, first.id).await.unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);

        let err = create(&state, &me, &request(14, 20)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let next = create(&state, &me, &request(16, 20)).await.unwrap();
        assert_eq!(next.status, LeaveStatus::Pending);
        assert_eq!(next.days, 5);
    }

    #[actix_web::test]
    async fn approved_leave_blocks_overlap_when_serialized() {
        approved_overlap_scenario(WriteGuard::Serialized, "LV-008").await;
    }

    #[actix_web::test]
    async fn approved_leave_blocks_overlap_with_check_then_insert() {
        approved_overlap_scenario(WriteGuard::CheckThenInsert, "LV-009").await;
    }

    #[actix_web::test]
    async fn rejected_requests_do_not_block() {
        let state = with_employee(WriteGuard::Serialized, "LV-003", 25000.0).await;
        let me = user(Role::Employee, Some("LV-003"));
        let hr = user(Role::Hr, None);

        let first = create(&state, &me, &request(10, 15)).await.unwrap();
        let rejected = reject(&state, &hr, first.id).await.unwrap();
        assert_eq!(rejected.status, LeaveStatus::Rejected);
        assert_eq!(rejected.approved_by, Some(hr.user_id));
        assert!(rejected.decided_on.is_some());

        assert!(!check_overlap(&state, "LV-003", day(12), day(12)).await.unwrap());
        create(&state, &me, &request(12, 12)).await.unwrap();
        assert!(check_overlap(&state, "LV-003", day(1), day(12)).await.unwrap());
    }

    #[actix_web::test]
    async fn only_pending_requests_can_be_decided() {
        let state = with_employee(WriteGuard::Serialized, "LV-004", 25000.0).await;
        let me = user(Role::Employee, Some("LV-004"));
        let admin = user(Role::Admin, None);
        let leave = create(&state, &me, &request(1, 2)).await.unwrap();

        let err = approve(&state, &me, leave.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        approve(&state, &admin, leave.id).await.unwrap();
        let err = reject(&state, &admin, leave.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = approve(&state, &admin, 4242).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[actix_web::test]
    async fn validates_requests() {
        let state = with_employee(WriteGuard::Serialized, "LV-005", 25000.0).await;
        let me = user(Role::Employee, Some("LV-005"));

        let err = create(&state, &me, &request(15, 10)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let mut blank = request(1, 1);
        blank.reason = "   ".into();
        let err = create(&state, &me, &blank).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let mut other = request(1, 1);
        other.employee_id = Some("LV-SOMEONE-ELSE".into());
        let err = create(&state, &me, &other).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let mut missing = request(1, 1);
        missing.employee_id = Some("LV-NOBODY".into());
        let err = create(&state, &user(Role::Hr, None), &missing).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[actix_web::test]
    async fn employees_list_only_their_own_requests() {
        let state = with_employee(WriteGuard::Serialized, "LV-006", 25000.0).await;
        state
            .stores
            .employees
            .insert(&crate::services::test_support::employee("LV-007", 2, 25000.0))
            .await
            .unwrap();
        create(&state, &user(Role::Employee, Some("LV-006")), &request(1, 2)).await.unwrap();
        create(&state, &user(Role::Employee, Some("LV-007")), &request(1, 2)).await.unwrap();

        let mine = list(&state, &user(Role::Employee, Some("LV-006")), &LeaveQuery::default())
            .await
            .unwrap();
        assert_eq!(mine.total, 1);
        assert_eq!(mine.data[0].employee_id, "LV-006");

        let all = list(&state, &user(Role::Hr, None), &LeaveQuery::default()).await.unwrap();
        assert_eq!(all.total, 2);

        let peek = LeaveQuery {
            employee_id: Some("LV-007".into()),
            ..LeaveQuery::default()
        };
        let err = list(&state, &user(Role::Employee, Some("LV-006")), &peek).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }
}
