//! Repository seams. Services only talk to these traits; `mysql` and
//! `memory` provide the two backends.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::StoreError;
use crate::model::attendance::AttendanceRecord;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, NewLeave};
use crate::model::payroll::PayrollRecord;
use crate::model::timecard::TimePunch;
use crate::utils::department_cache;

pub mod memory;
pub mod mysql;

pub type StoreResult<T> = Result<T, StoreError>;

/// 1-based pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(10).clamp(1, 100),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub department_id: Option<u64>,
    pub status: Option<String>,
    /// Case-insensitive substring of name or email.
    pub search: Option<String>,
}

/// Partial employee update; `None` leaves a column unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmployeeChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_gross_salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl EmployeeChanges {
    pub fn is_empty(&self) -> bool {
        *self == EmployeeChanges::default()
    }

    pub fn apply_to(&self, employee: &mut Employee) {
        if let Some(v) = &self.name {
            employee.name = v.clone();
        }
        if let Some(v) = &self.email {
            employee.email = v.clone();
        }
        if let Some(v) = &self.phone {
            employee.phone = Some(v.clone());
        }
        if let Some(v) = self.department_id {
            employee.department_id = v;
        }
        if let Some(v) = &self.designation {
            employee.designation = v.clone();
        }
        if let Some(v) = self.base_gross_salary {
            employee.base_gross_salary = v;
        }
        if let Some(v) = &self.status {
            employee.status = v.clone();
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PayrollFilter {
    pub employee_id: Option<String>,
    pub pay_period: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LeaveFilter {
    pub employee_id: Option<String>,
    pub status: Option<LeaveStatus>,
}

/// Employees of exactly one department.
#[async_trait]
pub trait DepartmentShard: Send + Sync {
    fn department(&self) -> &Department;

    async fn find(&self, employee_id: &str) -> StoreResult<Option<Employee>>;
}

/// Employee together with the name of the department that holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeProfile {
    pub employee: Employee,
    pub department: String,
}

/// Department shards known at startup, asked in order.
pub struct DepartmentRegistry {
    shards: Vec<Arc<dyn DepartmentShard>>,
}

impl DepartmentRegistry {
    pub fn new(shards: Vec<Arc<dyn DepartmentShard>>) -> Self {
        Self { shards }
    }

    pub fn departments(&self) -> Vec<Department> {
        self.shards.iter().map(|s| s.department().clone()).collect()
    }

    pub fn contains(&self, department_id: u64) -> bool {
        self.shard(department_id).is_some()
    }

    fn shard(&self, department_id: u64) -> Option<&Arc<dyn DepartmentShard>> {
        self.shards.iter().find(|s| s.department().id == department_id)
    }

    /// First shard holding `employee_id`, trying the cached department first.
    pub async fn resolve(&self, employee_id: &str) -> StoreResult<Option<EmployeeProfile>> {
        if let Some(department_id) = department_cache::lookup(employee_id).await {
            if let Some(shard) = self.shard(department_id) {
                if let Some(employee) = shard.find(employee_id).await? {
                    return Ok(Some(EmployeeProfile {
                        employee,
                        department: shard.department().name.clone(),
                    }));
                }
            }
            department_cache::forget(employee_id).await;
        }

        for shard in &self.shards {
            if let Some(employee) = shard.find(employee_id).await? {
                department_cache::remember(employee_id, shard.department().id).await;
                return Ok(Some(EmployeeProfile {
                    employee,
                    department: shard.department().name.clone(),
                }));
            }
        }

        Ok(None)
    }
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Fails with `StoreError::Duplicate` when the employee id is taken.
    async fn insert(&self, employee: &Employee) -> StoreResult<()>;
    async fn list(&self, filter: &EmployeeFilter, page: Page) -> StoreResult<(Vec<Employee>, i64)>;
    async fn update(&self, employee_id: &str, changes: &EmployeeChanges) -> StoreResult<bool>;
    async fn delete(&self, employee_id: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait TimecardStore: Send + Sync {
    /// Punches with `from <= date <= to`, oldest first.
    async fn range(&self, employee_id: &str, from: NaiveDate, to: NaiveDate)
    -> StoreResult<Vec<TimePunch>>;
    async fn get(&self, employee_id: &str, date: NaiveDate) -> StoreResult<Option<TimePunch>>;
    /// Fails with `StoreError::Duplicate` when the day already has a punch.
    async fn insert(&self, punch: &TimePunch) -> StoreResult<()>;
    async fn upsert(&self, punch: &TimePunch) -> StoreResult<()>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Writes each record keyed by (employee_id, date), replacing what was there.
    async fn upsert(&self, records: &[AttendanceRecord]) -> StoreResult<()>;
    async fn range(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>>;
}

#[async_trait]
pub trait PayrollStore: Send + Sync {
    async fn exists(&self, employee_id: &str, pay_period: &str) -> StoreResult<bool>;
    /// Returns the new id; `StoreError::Duplicate` if the period is taken.
    async fn insert(&self, record: &PayrollRecord) -> StoreResult<u64>;
    async fn get(&self, id: u64) -> StoreResult<Option<PayrollRecord>>;
    async fn list(
        &self,
        filter: &PayrollFilter,
        page: Page,
    ) -> StoreResult<(Vec<PayrollRecord>, i64)>;
    async fn update(&self, record: &PayrollRecord) -> StoreResult<bool>;
}

#[async_trait]
pub trait LeaveStore: Send + Sync {
    /// Pending or approved requests of the employee intersecting `[start, end]`.
    async fn overlapping(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<LeaveRequest>>;
    async fn insert(&self, leave: &NewLeave) -> StoreResult<LeaveRequest>;
    /// Overlap check and insert as one step; `None` when an overlap exists.
    async fn insert_exclusive(&self, leave: &NewLeave) -> StoreResult<Option<LeaveRequest>>;
    async fn get(&self, id: u64) -> StoreResult<Option<LeaveRequest>>;
    async fn list(&self, filter: &LeaveFilter, page: Page) -> StoreResult<(Vec<LeaveRequest>, i64)>;
    /// Moves a pending request to `status`; `None` if missing or not pending.
    async fn decide(
        &self,
        id: u64,
        status: LeaveStatus,
        approver: u64,
        on: NaiveDate,
    ) -> StoreResult<Option<LeaveRequest>>;
}

#[derive(Clone)]
pub struct Stores {
    pub departments: Arc<DepartmentRegistry>,
    pub employees: Arc<dyn EmployeeStore>,
    pub timecards: Arc<dyn TimecardStore>,
    pub attendance: Arc<dyn AttendanceStore>,
    pub payroll: Arc<dyn PayrollStore>,
    pub leave: Arc<dyn LeaveStore>,
}
