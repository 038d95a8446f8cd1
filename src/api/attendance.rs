use crate::auth::auth::AuthUser;
use crate::model::attendance::AttendanceRecord;
use crate::services::attendance;
use crate::state::AppState;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceRange {
    /// Defaults to the caller's own employee record.
    #[schema(example = "EMP-001")]
    pub employee_id: Option<String>,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub from: NaiveDate,
    #[schema(example = "2026-01-31", value_type = String, format = "date")]
    pub to: NaiveDate,
}

async fn run_snapshot(
    auth: &AuthUser,
    state: &AppState,
    range: &AttendanceRange,
) -> actix_web::Result<HttpResponse> {
    let employee_id = match &range.employee_id {
        Some(id) => id.as_str(),
        None => auth.own_employee_id()?,
    };
    auth.require_self_or_hr(employee_id)?;

    let records = attendance::snapshot(state, employee_id, range.from, range.to).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Classify punches of a date range and store the attendance records
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceRange),
    responses(
        (status = 200, description = "Attendance of each punched day", body = [AttendanceRecord]),
        (status = 400, description = "from is after to"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_snapshot(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<AttendanceRange>,
) -> actix_web::Result<impl Responder> {
    run_snapshot(&auth, &state, &query).await
}

/// Same as the GET variant, with the range in the request body
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = AttendanceRange,
    responses(
        (status = 200, description = "Attendance of each punched day", body = [AttendanceRecord]),
        (status = 400, description = "from is after to"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_snapshot_body(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<AttendanceRange>,
) -> actix_web::Result<impl Responder> {
    run_snapshot(&auth, &state, &payload).await
}
