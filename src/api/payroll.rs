use actix_web::{HttpResponse, Responder, web};

use crate::auth::auth::AuthUser;
use crate::model::payroll::PayrollRecord;
use crate::services::payroll::{
    self, GeneratePayroll, PaginatedPayrollResponse, PayrollQuery, UpdatePayroll,
};
use crate::state::AppState;

/// Generate the payroll of one employee for one month
#[utoipa::path(
    post,
    path = "/api/payroll",
    request_body = GeneratePayroll,
    responses(
        (status = 201, description = "Payroll generated", body = PayrollRecord),
        (status = 400, description = "Malformed pay period or negative adjustment"),
        (status = 401),
        (status = 403),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Payroll already exists for this period")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn create_payroll(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<GeneratePayroll>,
) -> actix_web::Result<impl Responder> {
    let record = payroll::generate(&state, &auth, &payload).await?;
    Ok(HttpResponse::Created().json(record))
}

#[utoipa::path(
    put,
    path = "/api/payroll/{payroll_id}",
    request_body = UpdatePayroll,
    params(
        ("payroll_id", description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Payroll updated", body = PayrollRecord),
        (status = 404, description = "Payroll not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn update_payroll(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: web::Json<UpdatePayroll>,
) -> actix_web::Result<impl Responder> {
    let record = payroll::update(&state, &auth, path.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(record))
}

#[utoipa::path(
    get,
    path = "/api/payroll/{payroll_id}",
    params(
        ("payroll_id", description = "Payroll ID")
    ),
    responses(
        (status = 200, body = PayrollRecord),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payroll(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let record = payroll::get(&state, &auth, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

#[utoipa::path(
    get,
    path = "/api/payroll",
    params(PayrollQuery),
    responses(
        (status = 200, body = PaginatedPayrollResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<PayrollQuery>,
) -> actix_web::Result<impl Responder> {
    let response = payroll::list(&state, &auth, &query).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::tests::{SECRET, token};
    use crate::config::WriteGuard;
    use crate::model::role::Role;
    use crate::models::TokenType;
    use crate::services::test_support::with_employee;
    use crate::config::Config;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::json;

    #[actix_web::test]
    async fn generate_twice_returns_conflict() {
        let state = with_employee(WriteGuard::Serialized, "API-PAY-1", 30000.0).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(Config::for_tests(SECRET)))
                .route("/api/payroll", web::post().to(create_payroll)),
        )
        .await;
        let bearer = format!("Bearer {}", token(Role::Hr as u8, None, TokenType::Access));
        let body = json!({"employee_id": "API-PAY-1", "pay_period": "2026-02"});

        let req = test::TestRequest::post()
            .uri("/api/payroll")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(&body)
            .to_request();
        let created: PayrollRecord = test::call_and_read_body_json(&app, req).await;
        assert_eq!(created.pay_period, "2026-02");
        assert_eq!(created.attendance.working_days, 28);

        let req = test::TestRequest::post()
            .uri("/api/payroll")
            .insert_header(("Authorization", bearer))
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn employees_cannot_generate_payroll() {
        let state = with_employee(WriteGuard::Serialized, "API-PAY-2", 30000.0).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(Config::for_tests(SECRET)))
                .route("/api/payroll", web::post().to(create_payroll)),
        )
        .await;

        let bearer = format!(
            "Bearer {}",
            token(Role::Employee as u8, Some("API-PAY-2"), TokenType::Access)
        );
        let req = test::TestRequest::post()
            .uri("/api/payroll")
            .insert_header(("Authorization", bearer))
            .set_json(json!({"employee_id": "API-PAY-2", "pay_period": "2026-02"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::post()
            .uri("/api/payroll")
            .set_json(json!({"employee_id": "API-PAY-2", "pay_period": "2026-02"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
