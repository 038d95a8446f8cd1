use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::{ServiceError, ServiceResult, StoreError};
use crate::model::employee::Employee;
use crate::state::AppState;
use crate::store::{EmployeeChanges, EmployeeFilter, Page};
use crate::utils::department_cache;

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub department_id: Option<u64>,
    pub status: Option<String>,
    /// Matches name or email.
    pub search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeResponse {
    pub employee: Employee,
    #[schema(example = "Engineering")]
    pub department: String,
}

fn known_department(state: &AppState, department_id: u64) -> ServiceResult<()> {
    if state.stores.departments.contains(department_id) {
        Ok(())
    } else {
        Err(ServiceError::validation(format!(
            "department {department_id} does not exist"
        )))
    }
}

pub async fn create(
    state: &AppState,
    actor: &AuthUser,
    employee: &Employee,
) -> ServiceResult<Employee> {
    actor.require_hr_or_admin()?;
    employee.validate()?;
    known_department(state, employee.department_id)?;

    match state.stores.employees.insert(employee).await {
        Ok(()) => {}
        Err(StoreError::Duplicate) => {
            return Err(ServiceError::conflict(format!(
                "Employee {} already exists",
                employee.employee_id
            )));
        }
        Err(e) => return Err(e.into()),
    }

    department_cache::remember(&employee.employee_id, employee.department_id).await;
    info!(employee_id = %employee.employee_id, "Employee created");
    Ok(employee.clone())
}

pub async fn get(
    state: &AppState,
    actor: &AuthUser,
    employee_id: &str,
) -> ServiceResult<EmployeeResponse> {
    actor.require_self_or_hr(employee_id)?;

    let profile = state
        .stores
        .departments
        .resolve(employee_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Employee not found"))?;

    Ok(EmployeeResponse {
        employee: profile.employee,
        department: profile.department,
    })
}

pub async fn list(
    state: &AppState,
    actor: &AuthUser,
    query: &EmployeeQuery,
) -> ServiceResult<EmployeeListResponse> {
    actor.require_hr_or_admin()?;

    let page = Page::new(query.page, query.per_page);
    let filter = EmployeeFilter {
        department_id: query.department_id,
        status: query.status.clone(),
        search: query.search.clone().filter(|s| !s.trim().is_empty()),
    };
    let (data, total) = state.stores.employees.list(&filter, page).await?;

    Ok(EmployeeListResponse {
        data,
        page: page.page,
        per_page: page.per_page,
        total,
    })
}

pub async fn update(
    state: &AppState,
    actor: &AuthUser,
    employee_id: &str,
    changes: &EmployeeChanges,
) -> ServiceResult<EmployeeResponse> {
    actor.require_hr_or_admin()?;

    if changes.is_empty() {
        return Err(ServiceError::validation("No fields provided for update"));
    }
    if let Some(department_id) = changes.department_id {
        known_department(state, department_id)?;
    }

    let current = state
        .stores
        .departments
        .resolve(employee_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Employee not found"))?;
    let mut updated = current.employee;
    changes.apply_to(&mut updated);
    updated.validate()?;

    if !state.stores.employees.update(employee_id, changes).await? {
        return Err(ServiceError::not_found("Employee not found"));
    }
    department_cache::forget(employee_id).await;

    info!(employee_id, "Employee updated");
    get(state, actor, employee_id).await
}

pub async fn delete(state: &AppState, actor: &AuthUser, employee_id: &str) -> ServiceResult<()> {
    actor.require_admin()?;

    if !state.stores.employees.delete(employee_id).await? {
        return Err(ServiceError::not_found("Employee not found"));
    }
    department_cache::forget(employee_id).await;

    info!(employee_id, "Employee deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::auth::tests::user;
    use crate::config::WriteGuard;
    use crate::model::role::Role;
    use crate::services::test_support::{employee, state};

    #[actix_web::test]
    async fn create_then_get_with_department_name() {
        let state = state(WriteGuard::Serialized);
        let hr = user(Role::Hr, None);

        create(&state, &hr, &employee("EM-001", 2, 40000.0)).await.unwrap();
        let found = get(&state, &hr, "EM-001").await.unwrap();
        assert_eq!(found.department, "Finance");

        let err = create(&state, &hr, &employee("EM-001", 2, 40000.0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let err = create(&state, &hr, &employee("EM-002", 99, 40000.0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[actix_web::test]
    async fn moving_department_is_seen_by_resolve() {
        let state = state(WriteGuard::Serialized);
        let hr = user(Role::Hr, None);
        create(&state, &hr, &employee("EM-010", 1, 40000.0)).await.unwrap();

        let changes = EmployeeChanges {
            department_id: Some(2),
            ..EmployeeChanges::default()
        };
        let moved = update(&state, &hr, "EM-010", &changes).await.unwrap();
        assert_eq!(moved.department, "Finance");
        assert_eq!(moved.employee.department_id, 2);

        let err = update(&state, &hr, "EM-NOBODY", &changes).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = update(&state, &hr, "EM-010", &EmployeeChanges::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[actix_web::test]
    async fn delete_requires_admin() {
        let state = state(WriteGuard::Serialized);
        create(&state, &user(Role::Hr, None), &employee("EM-020", 1, 1.0)).await.unwrap();

        let err = delete(&state, &user(Role::Hr, None), "EM-020").await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let admin = user(Role::Admin, None);
        delete(&state, &admin, "EM-020").await.unwrap();
        let err = get(&state, &admin, "EM-020").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[actix_web::test]
    async fn employees_see_only_themselves() {
        let state = state(WriteGuard::Serialized);
        create(&state, &user(Role::Hr, None), &employee("EM-030", 1, 1.0)).await.unwrap();

        let me = user(Role::Employee, Some("EM-030"));
        assert!(get(&state, &me, "EM-030").await.is_ok());
        assert!(matches!(
            get(&state, &me, "EM-031").await.unwrap_err(),
            ServiceError::Forbidden(_)
        ));
        assert!(matches!(
            list(&state, &me, &EmployeeQuery::default()).await.unwrap_err(),
            ServiceError::Forbidden(_)
        ));
    }
}
