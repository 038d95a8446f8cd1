use crate::auth::auth::AuthUser;
use crate::model::timecard::TimePunch;
use crate::services::timecard::{self, PunchKind, TimecardQuery};
use crate::state::AppState;
use actix_web::{HttpResponse, Responder, web};
use chrono::Local;

fn now() -> chrono::NaiveDateTime {
    Local::now().naive_local()
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/timecard/check-in",
    responses(
        (status = 201, description = "Checked in successfully", body = TimePunch),
        (status = 409, description = "Already checked in today", body = Object,
            example = json!({ "message": "Already checked in today" })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Timecard"
)]
pub async fn check_in(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    let punch = timecard::check_in(&state, &auth, now()).await?;
    Ok(HttpResponse::Created().json(punch))
}

async fn punch(
    auth: AuthUser,
    state: web::Data<AppState>,
    kind: PunchKind,
) -> actix_web::Result<HttpResponse> {
    let punch = timecard::record(&state, &auth, kind, now()).await?;
    Ok(HttpResponse::Ok().json(punch))
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/timecard/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = TimePunch),
        (status = 400, description = "No active check-in found for today", body = Object,
            example = json!({ "message": "No active check-in found for today" })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Timecard"
)]
pub async fn check_out(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    punch(auth, state, PunchKind::CheckOut).await
}

#[utoipa::path(
    put,
    path = "/api/timecard/lunch-out",
    responses(
        (status = 200, description = "Lunch break started", body = TimePunch),
        (status = 400, description = "No active check-in, or lunch already started"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Timecard"
)]
pub async fn lunch_out(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    punch(auth, state, PunchKind::LunchOut).await
}

#[utoipa::path(
    put,
    path = "/api/timecard/lunch-in",
    responses(
        (status = 200, description = "Lunch break ended", body = TimePunch),
        (status = 400, description = "No lunch break in progress"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Timecard"
)]
pub async fn lunch_in(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> actix_web::Result<impl Responder> {
    punch(auth, state, PunchKind::LunchIn).await
}

/// Create or replace a full day of punches (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/timecard",
    request_body = TimePunch,
    responses(
        (status = 200, description = "Timecard saved", body = TimePunch),
        (status = 400, description = "Malformed time value"),
        (status = 403, description = "HR/Admin only"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Timecard"
)]
pub async fn upsert_timecard(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<TimePunch>,
) -> actix_web::Result<impl Responder> {
    let saved = timecard::upsert(&state, &auth, &payload).await?;
    Ok(HttpResponse::Ok().json(saved))
}

#[utoipa::path(
    get,
    path = "/api/timecard",
    params(TimecardQuery),
    responses(
        (status = 200, description = "Punches in the range", body = [TimePunch]),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Timecard"
)]
pub async fn list_timecards(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<TimecardQuery>,
) -> actix_web::Result<impl Responder> {
    let punches = timecard::list(&state, &auth, &query).await?;
    Ok(HttpResponse::Ok().json(punches))
}
