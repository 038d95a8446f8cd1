use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::{ServiceError, ServiceResult, StoreError};
use crate::model::timecard::TimePunch;
use crate::state::AppState;

/// Which punch of the day a self-service call records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PunchKind {
    CheckOut,
    LunchOut,
    LunchIn,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct TimecardQuery {
    #[schema(example = "EMP-001")]
    pub employee_id: Option<String>,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub from: NaiveDate,
    #[schema(example = "2026-01-31", value_type = String, format = "date")]
    pub to: NaiveDate,
}

fn clock(now: NaiveDateTime) -> String {
    now.format("%H:%M").to_string()
}

/// Opens today's punch for the caller's employee record.
pub async fn check_in(
    state: &AppState,
    actor: &AuthUser,
    now: NaiveDateTime,
) -> ServiceResult<TimePunch> {
    let employee_id = actor.own_employee_id()?;

    let punch = TimePunch {
        employee_id: employee_id.to_string(),
        date: now.date(),
        log_in: clock(now),
        ..TimePunch::default()
    };

    match state.stores.timecards.insert(&punch).await {
        Ok(()) => {}
        Err(StoreError::Duplicate) => {
            return Err(ServiceError::conflict("Already checked in today"));
        }
        Err(e) => return Err(e.into()),
    }

    info!(employee_id, date = %punch.date, "Checked in");
    Ok(punch)
}

/// Open punch of today, or of yesterday for a shift that crossed midnight.
async fn open_punch(
    state: &AppState,
    employee_id: &str,
    now: NaiveDateTime,
) -> ServiceResult<Option<TimePunch>> {
    let today = now.date();
    if let Some(punch) = state.stores.timecards.get(employee_id, today).await? {
        // a closed punch for today means the shift is over
        return Ok((!punch.has_logout()).then_some(punch));
    }

    let Some(yesterday) = today.pred_opt() else {
        return Ok(None);
    };
    Ok(state
        .stores
        .timecards
        .get(employee_id, yesterday)
        .await?
        .filter(|p| !p.has_logout()))
}

/// Fills one more punch of the caller's open timecard.
pub async fn record(
    state: &AppState,
    actor: &AuthUser,
    kind: PunchKind,
    now: NaiveDateTime,
) -> ServiceResult<TimePunch> {
    let employee_id = actor.own_employee_id()?;

    let mut punch = open_punch(state, employee_id, now)
        .await?
        .ok_or_else(|| ServiceError::validation("No active check-in found for today"))?;

    let at = clock(now);
    match kind {
        PunchKind::CheckOut => {
            if !punch.lunch_out.is_empty() && punch.lunch_in.is_empty() {
                return Err(ServiceError::validation("Still out for lunch"));
            }
            punch.log_out = at;
        }
        PunchKind::LunchOut => {
            if !punch.lunch_out.is_empty() {
                return Err(ServiceError::validation("Lunch already started"));
            }
            punch.lunch_out = at;
        }
        PunchKind::LunchIn => {
            if punch.lunch_out.is_empty() || !punch.lunch_in.is_empty() {
                return Err(ServiceError::validation("No lunch break in progress"));
            }
            punch.lunch_in = at;
        }
    }

    state.stores.timecards.upsert(&punch).await?;
    info!(employee_id, date = %punch.date, ?kind, "Punch recorded");
    Ok(punch)
}

/// Writes a full punch for any employee and date.
pub async fn upsert(
    state: &AppState,
    actor: &AuthUser,
    punch: &TimePunch,
) -> ServiceResult<TimePunch> {
    actor.require_hr_or_admin()?;
    let punch = punch.normalized()?;

    if state.stores.departments.resolve(&punch.employee_id).await?.is_none() {
        return Err(ServiceError::not_found("Employee not found"));
    }

    state.stores.timecards.upsert(&punch).await?;
    info!(employee_id = %punch.employee_id, date = %punch.date, "Timecard saved");
    Ok(punch)
}

pub async fn list(
    state: &AppState,
    actor: &AuthUser,
    query: &TimecardQuery,
) -> ServiceResult<Vec<TimePunch>> {
    let employee_id = match &query.employee_id {
        Some(id) => id.as_str(),
        None => actor.own_employee_id()?,
    };
    actor.require_self_or_hr(employee_id)?;

    if query.from > query.to {
        return Err(ServiceError::validation("from must not be after to"));
    }

    Ok(state
        .stores
        .timecards
        .range(employee_id, query.from, query.to)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::auth::tests::user;
    use crate::config::WriteGuard;
    use crate::model::role::Role;
    use crate::services::test_support::with_employee;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 4)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[actix_web::test]
    async fn self_service_day() {
        let state = with_employee(WriteGuard::Serialized, "TC-001", 30000.0).await;
        let me = user(Role::Employee, Some("TC-001"));

        check_in(&state, &me, at(9, 0)).await.unwrap();
        let err = check_in(&state, &me, at(9, 5)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        record(&state, &me, PunchKind::LunchOut, at(13, 0)).await.unwrap();
        let err = record(&state, &me, PunchKind::CheckOut, at(13, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        record(&state, &me, PunchKind::LunchIn, at(13, 45)).await.unwrap();
        let punch = record(&state, &me, PunchKind::CheckOut, at(18, 0)).await.unwrap();

        assert_eq!(punch.log_in, "09:00");
        assert_eq!(punch.lunch_out, "13:00");
        assert_eq!(punch.lunch_in, "13:45");
        assert_eq!(punch.log_out, "18:00");

        let err = record(&state, &me, PunchKind::CheckOut, at(18, 30))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[actix_web::test]
    async fn punching_needs_linked_employee_and_open_day() {
        let state = with_employee(WriteGuard::Serialized, "TC-002", 30000.0).await;

        let err = check_in(&state, &user(Role::Hr, None), at(9, 0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let me = user(Role::Employee, Some("TC-002"));
        let err = record(&state, &me, PunchKind::CheckOut, at(17, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[actix_web::test]
    async fn hr_upserts_and_lists_punches() {
        let state = with_employee(WriteGuard::Serialized, "TC-003", 30000.0).await;
        let hr = user(Role::Hr, None);
        let punch = TimePunch {
            employee_id: "TC-003".into(),
            date: at(0, 0).date(),
            log_in: "09:00".into(),
            log_out: "17:00".into(),
            permission: "01:00".into(),
            reason: "Bank".into(),
            ..TimePunch::default()
        };
        upsert(&state, &hr, &punch).await.unwrap();

        let bad = TimePunch {
            log_in: "25:00".into(),
            ..punch.clone()
        };
        assert!(matches!(
            upsert(&state, &hr, &bad).await.unwrap_err(),
            ServiceError::Validation(_)
        ));
        assert!(matches!(
            upsert(&state, &user(Role::Employee, Some("TC-003")), &punch)
                .await
                .unwrap_err(),
            ServiceError::Forbidden(_)
        ));

        let query = TimecardQuery {
            employee_id: Some("TC-003".into()),
            from: at(0, 0).date(),
            to: at(0, 0).date(),
        };
        assert_eq!(list(&state, &hr, &query).await.unwrap(), vec![punch]);
    }

    #[actix_web::test]
    async fn overnight_shift_checks_out_next_morning() {
        let state = with_employee(WriteGuard::Serialized, "TC-004", 30000.0).await;
        let me = user(Role::Employee, Some("TC-004"));
        let next_morning = at(6, 0) + chrono::Duration::days(1);

        check_in(&state, &me, at(22, 0)).await.unwrap();
        let punch = record(&state, &me, PunchKind::CheckOut, next_morning)
            .await
            .unwrap();

        assert_eq!(punch.date, at(0, 0).date());
        assert_eq!(punch.log_in, "22:00");
        assert_eq!(punch.log_out, "06:00");
        assert_eq!(crate::calc::time::hours_worked(&punch, 0.0), 8.0);

        // the closed shift does not stay open for a second check-out
        let err = record(&state, &me, PunchKind::CheckOut, next_morning)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        // and the new day can still be opened
        check_in(&state, &me, next_morning).await.unwrap();
    }

    #[actix_web::test]
    async fn hr_upsert_stores_padded_clock_values() {
        let state = with_employee(WriteGuard::Serialized, "TC-005", 30000.0).await;
        let hr = user(Role::Hr, None);
        let punch = TimePunch {
            employee_id: "TC-005".into(),
            date: at(0, 0).date(),
            log_in: "9:00".into(),
            log_out: "17:30".into(),
            ..TimePunch::default()
        };

        let saved = upsert(&state, &hr, &punch).await.unwrap();
        assert_eq!(saved.log_in, "09:00");

        let stored = state
            .stores
            .timecards
            .get("TC-005", punch.date)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.log_in, "09:00");

        let signed = TimePunch {
            log_in: " +9:00 ".into(),
            ..punch.clone()
        };
        assert!(matches!(
            upsert(&state, &hr, &signed).await.unwrap_err(),
            ServiceError::Validation(_)
        ));

        let wide = TimePunch {
            permission: "123456789".into(),
            ..punch
        };
        assert!(matches!(
            upsert(&state, &hr, &wide).await.unwrap_err(),
            ServiceError::Validation(_)
        ));
    }
}
