use crate::{
    api::{attendance, employee, leave_request, payroll, timecard},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

// Spreads `requests_per_min` evenly over the minute with a full-minute burst
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .configure(api_routes),
    );
}

/// Every API resource, without authentication or rate limiting.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/employee")
            // /employee
            .service(
                web::resource("")
                    .route(web::post().to(employee::create_employee))
                    .route(web::get().to(employee::list_employees)),
            )
            // /employee/{id}
            .service(
                web::resource("/{id}")
                    .route(web::put().to(employee::update_employee))
                    .route(web::get().to(employee::get_employee))
                    .route(web::delete().to(employee::delete_employee)),
            ),
    )
    .service(web::resource("/departments").route(web::get().to(employee::list_departments)))
    .service(
        web::scope("/leave")
            // /leave
            .service(
                web::resource("")
                    .route(web::get().to(leave_request::leave_list))
                    .route(web::post().to(leave_request::create_leave)),
            )
            // /leave/{id}
            .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
            // /leave/{id}/approve
            .service(
                web::resource("/{id}/approve").route(web::put().to(leave_request::approve_leave)),
            )
            // /leave/{id}/reject
            .service(
                web::resource("/{id}/reject").route(web::put().to(leave_request::reject_leave)),
            ),
    )
    .service(
        web::scope("/timecard")
            // /timecard
            .service(
                web::resource("")
                    .route(web::get().to(timecard::list_timecards))
                    .route(web::put().to(timecard::upsert_timecard)),
            )
            .service(web::resource("/check-in").route(web::post().to(timecard::check_in)))
            .service(web::resource("/check-out").route(web::put().to(timecard::check_out)))
            .service(web::resource("/lunch-out").route(web::put().to(timecard::lunch_out)))
            .service(web::resource("/lunch-in").route(web::put().to(timecard::lunch_in))),
    )
    .service(
        web::resource("/attendance")
            .route(web::get().to(attendance::attendance_snapshot))
            .route(web::post().to(attendance::attendance_snapshot_body)),
    )
    .service(
        web::scope("/payroll")
            // /payroll
            .service(
                web::resource("")
                    .route(web::post().to(payroll::create_payroll))
                    .route(web::get().to(payroll::list_payrolls)),
            )
            // /payroll/{id}
            .service(
                web::resource("/{id}")
                    .route(web::get().to(payroll::get_payroll))
                    .route(web::put().to(payroll::update_payroll)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::tests::{SECRET, token};
    use crate::config::WriteGuard;
    use crate::model::attendance::AttendanceRecord;
    use crate::model::role::Role;
    use crate::models::TokenType;
    use crate::services::test_support::with_employee;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::json;

    #[actix_web::test]
    async fn middleware_guards_api_scope() {
        let state = with_employee(WriteGuard::Serialized, "RT-001", 30000.0).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(Config::for_tests(SECRET)))
                .service(
                    web::scope("/api")
                        .wrap(from_fn(auth_middleware))
                        .configure(api_routes),
                ),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/employee/RT-001").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let refresh = token(Role::Admin as u8, None, TokenType::Refresh);
        let req = test::TestRequest::get()
            .uri("/api/employee/RT-001")
            .insert_header(("Authorization", format!("Bearer {refresh}")))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let access = token(Role::Employee as u8, Some("RT-001"), TokenType::Access);
        let req = test::TestRequest::get()
            .uri("/api/employee/RT-001")
            .insert_header(("Authorization", format!("Bearer {access}")))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn punch_then_snapshot_over_http() {
        let state = with_employee(WriteGuard::Serialized, "RT-002", 30000.0).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(Config::for_tests(SECRET)))
                .service(
                    web::scope("/api")
                        .wrap(from_fn(auth_middleware))
                        .configure(api_routes),
                ),
        )
        .await;
        let hr = format!("Bearer {}", token(Role::Hr as u8, None, TokenType::Access));

        let req = test::TestRequest::put()
            .uri("/api/timecard")
            .insert_header(("Authorization", hr.clone()))
            .set_json(json!({
                "employee_id": "RT-002",
                "date": "2026-01-05",
                "log_in": "09:00",
                "log_out": "13:30"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/attendance?employee_id=RT-002&from=2026-01-01&to=2026-01-31")
            .insert_header(("Authorization", hr))
            .to_request();
        let records: Vec<AttendanceRecord> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].total_hours, 4.5);
        assert_eq!(records[0].status.to_string(), "Half Day");

        let other = format!(
            "Bearer {}",
            token(Role::Employee as u8, Some("RT-999"), TokenType::Access)
        );
        let req = test::TestRequest::post()
            .uri("/api/attendance")
            .insert_header(("Authorization", other))
            .set_json(json!({"employee_id": "RT-002", "from": "2026-01-01", "to": "2026-01-31"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn rejected_token_response_carries_no_decoder_detail() {
        let state = with_employee(WriteGuard::Serialized, "RT-003", 30000.0).await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .app_data(web::Data::new(Config::for_tests(SECRET)))
                .service(
                    web::scope("/api")
                        .wrap(from_fn(auth_middleware))
                        .configure(api_routes),
                ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/employee/RT-003")
            .insert_header(("Authorization", "Bearer not.a.jwt"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"error": "Invalid or expired token"}));
    }
}
