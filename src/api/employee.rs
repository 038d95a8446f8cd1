use crate::{
    auth::auth::AuthUser,
    model::{department::Department, employee::Employee},
    services::employee::{self, EmployeeListResponse, EmployeeQuery, EmployeeResponse},
    state::AppState,
    store::EmployeeChanges,
};
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employee",
    request_body = Employee,
    responses(
        (status = 201, description = "Employee created successfully", body = Employee),
        (status = 400, description = "Invalid employee or unknown department"),
        (status = 409, description = "Employee id already taken", body = Object, example = json!({
            "message": "Employee EMP-001 already exists"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<Employee>,
) -> actix_web::Result<impl Responder> {
    let created = employee::create(&state, &auth, &payload).await?;
    Ok(HttpResponse::Created().json(created))
}

/// List Employees
#[utoipa::path(
    get,
    path = "/api/employee",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employees", body = EmployeeListResponse),
        (status = 403, description = "HR/Admin only")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    auth: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    let response = employee::list(&state, &auth, &query).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employee/{id}",
    request_body = EmployeeChanges,
    params(
        ("id" = String, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee updated", body = EmployeeResponse),
        (status = 400, description = "Nothing to update or invalid value"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<EmployeeChanges>,
) -> actix_web::Result<impl Responder> {
    let updated = employee::update(&state, &auth, &path, &payload).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/api/employee/{id}",
    params(
        ("id" = String, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee deleted", body = Object, example = json!({
            "message": "Employee deleted successfully"
        })),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    employee::delete(&state, &auth, &path).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deleted successfully"
    })))
}

/// Get Employee
#[utoipa::path(
    get,
    path = "/api/employee/{id}",
    params(
        ("id" = String, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee with department name", body = EmployeeResponse),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let found = employee::get(&state, &auth, &path).await?;
    Ok(HttpResponse::Ok().json(found))
}

/// Departments known to the registry
#[utoipa::path(
    get,
    path = "/api/departments",
    responses(
        (status = 200, description = "Departments in lookup order", body = [Department])
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_departments(_auth: AuthUser, state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.stores.departments.departments())
}
