//! Process-local backend. Used with `STORE_BACKEND=memory` and by tests.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::error::StoreError;
use crate::model::attendance::AttendanceRecord;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, NewLeave};
use crate::model::payroll::PayrollRecord;
use crate::model::timecard::TimePunch;

use super::{
    AttendanceStore, DepartmentRegistry, DepartmentShard, EmployeeChanges, EmployeeFilter,
    EmployeeStore, LeaveFilter, LeaveStore, Page, PayrollFilter, PayrollStore, StoreResult, Stores,
    TimecardStore,
};

#[derive(Default)]
struct Tables {
    employees: BTreeMap<String, Employee>,
    timecards: BTreeMap<(String, NaiveDate), TimePunch>,
    attendance: BTreeMap<(String, NaiveDate), AttendanceRecord>,
    payroll: BTreeMap<u64, PayrollRecord>,
    leave: BTreeMap<u64, LeaveRequest>,
    next_payroll_id: u64,
    next_leave_id: u64,
}

pub struct MemoryStore {
    departments: Vec<Department>,
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn with_departments(departments: Vec<Department>) -> Arc<Self> {
        Arc::new(Self {
            departments,
            tables: RwLock::new(Tables::default()),
        })
    }

    /// Every repository view over this one store.
    pub fn stores(self: &Arc<Self>) -> Stores {
        let shards = self
            .departments
            .iter()
            .map(|department| {
                Arc::new(MemoryDepartmentShard {
                    department: department.clone(),
                    store: self.clone(),
                }) as Arc<dyn DepartmentShard>
            })
            .collect();

        Stores {
            departments: Arc::new(DepartmentRegistry::new(shards)),
            employees: self.clone(),
            timecards: self.clone(),
            attendance: self.clone(),
            payroll: self.clone(),
            leave: self.clone(),
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Corrupt("memory store lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Corrupt("memory store lock poisoned".into()))
    }
}

fn paginate<T: Clone>(items: Vec<T>, page: Page) -> (Vec<T>, i64) {
    let total = items.len() as i64;
    let data = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.per_page as usize)
        .collect();
    (data, total)
}

struct MemoryDepartmentShard {
    department: Department,
    store: Arc<MemoryStore>,
}

#[async_trait]
impl DepartmentShard for MemoryDepartmentShard {
    fn department(&self) -> &Department {
        &self.department
    }

    async fn find(&self, employee_id: &str) -> StoreResult<Option<Employee>> {
        let tables = self.store.read()?;
        Ok(tables
            .employees
            .get(employee_id)
            .filter(|e| e.department_id == self.department.id)
            .cloned())
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn insert(&self, employee: &Employee) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.employees.contains_key(&employee.employee_id) {
            return Err(StoreError::Duplicate);
        }
        tables
            .employees
            .insert(employee.employee_id.clone(), employee.clone());
        Ok(())
    }

    async fn list(&self, filter: &EmployeeFilter, page: Page) -> StoreResult<(Vec<Employee>, i64)> {
        let tables = self.read()?;
        let search = filter.search.as_ref().map(|s| s.to_lowercase());

        let matching = tables
            .employees
            .values()
            .filter(|e| filter.department_id.is_none_or(|d| e.department_id == d))
            .filter(|e| filter.status.as_ref().is_none_or(|s| &e.status == s))
            .filter(|e| {
                search.as_ref().is_none_or(|s| {
                    e.name.to_lowercase().contains(s) || e.email.to_lowercase().contains(s)
                })
            })
            .cloned()
            .collect();

        Ok(paginate(matching, page))
    }

    async fn update(&self, employee_id: &str, changes: &EmployeeChanges) -> StoreResult<bool> {
        let mut tables = self.write()?;
        match tables.employees.get_mut(employee_id) {
            Some(employee) => {
                changes.apply_to(employee);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, employee_id: &str) -> StoreResult<bool> {
        Ok(self.write()?.employees.remove(employee_id).is_some())
    }
}

#[async_trait]
impl TimecardStore for MemoryStore {
    async fn range(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<TimePunch>> {
        if from > to {
            return Ok(Vec::new());
        }
        let tables = self.read()?;
        Ok(tables
            .timecards
            .range((employee_id.to_string(), from)..=(employee_id.to_string(), to))
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn get(&self, employee_id: &str, date: NaiveDate) -> StoreResult<Option<TimePunch>> {
        let tables = self.read()?;
        Ok(tables.timecards.get(&(employee_id.to_string(), date)).cloned())
    }

    async fn insert(&self, punch: &TimePunch) -> StoreResult<()> {
        let mut tables = self.write()?;
        let key = (punch.employee_id.clone(), punch.date);
        if tables.timecards.contains_key(&key) {
            return Err(StoreError::Duplicate);
        }
        tables.timecards.insert(key, punch.clone());
        Ok(())
    }

    async fn upsert(&self, punch: &TimePunch) -> StoreResult<()> {
        self.write()?
            .timecards
            .insert((punch.employee_id.clone(), punch.date), punch.clone());
        Ok(())
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn upsert(&self, records: &[AttendanceRecord]) -> StoreResult<()> {
        let mut tables = self.write()?;
        for record in records {
            tables
                .attendance
                .insert((record.employee_id.clone(), record.date), record.clone());
        }
        Ok(())
    }

    async fn range(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        if from > to {
            return Ok(Vec::new());
        }
        let tables = self.read()?;
        Ok(tables
            .attendance
            .range((employee_id.to_string(), from)..=(employee_id.to_string(), to))
            .map(|(_, r)| r.clone())
            .collect())
    }
}

#[async_trait]
impl PayrollStore for MemoryStore {
    async fn exists(&self, employee_id: &str, pay_period: &str) -> StoreResult<bool> {
        let tables = self.read()?;
        Ok(tables
            .payroll
            .values()
            .any(|p| p.employee_id == employee_id && p.pay_period == pay_period))
    }

    async fn insert(&self, record: &PayrollRecord) -> StoreResult<u64> {
        let mut tables = self.write()?;
        // same guarantee as the unique (employee_id, pay_period) key in MySQL
        if tables
            .payroll
            .values()
            .any(|p| p.employee_id == record.employee_id && p.pay_period == record.pay_period)
        {
            return Err(StoreError::Duplicate);
        }

        tables.next_payroll_id += 1;
        let id = tables.next_payroll_id;
        tables.payroll.insert(id, PayrollRecord { id, ..record.clone() });
        Ok(id)
    }

    async fn get(&self, id: u64) -> StoreResult<Option<PayrollRecord>> {
        Ok(self.read()?.payroll.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &PayrollFilter,
        page: Page,
    ) -> StoreResult<(Vec<PayrollRecord>, i64)> {
        let tables = self.read()?;
        let mut matching: Vec<_> = tables
            .payroll
            .values()
            .filter(|p| filter.employee_id.as_ref().is_none_or(|e| &p.employee_id == e))
            .filter(|p| filter.pay_period.as_ref().is_none_or(|pp| &p.pay_period == pp))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.pay_period.cmp(&a.pay_period).then(a.id.cmp(&b.id)));

        Ok(paginate(matching, page))
    }

    async fn update(&self, record: &PayrollRecord) -> StoreResult<bool> {
        let mut tables = self.write()?;
        match tables.payroll.get_mut(&record.id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl Tables {
    fn overlapping(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<LeaveRequest> {
        self.leave
            .values()
            .filter(|l| l.employee_id == employee_id)
            .filter(|l| l.status.blocks_overlap())
            .filter(|l| l.overlaps(start, end))
            .cloned()
            .collect()
    }

    fn insert_leave(&mut self, leave: &NewLeave) -> LeaveRequest {
        self.next_leave_id += 1;
        let request = LeaveRequest {
            id: self.next_leave_id,
            employee_id: leave.employee_id.clone(),
            leave_type: leave.leave_type,
            start_date: leave.start_date,
            end_date: leave.end_date,
            days: leave.days,
            reason: leave.reason.clone(),
            status: LeaveStatus::Pending,
            approved_by: None,
            decided_on: None,
            created_at: Utc::now(),
        };
        self.leave.insert(request.id, request.clone());
        request
    }
}

#[async_trait]
impl LeaveStore for MemoryStore {
    async fn overlapping(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<LeaveRequest>> {
        Ok(self.read()?.overlapping(employee_id, start, end))
    }

    async fn insert(&self, leave: &NewLeave) -> StoreResult<LeaveRequest> {
        Ok(self.write()?.insert_leave(leave))
    }

    async fn insert_exclusive(&self, leave: &NewLeave) -> StoreResult<Option<LeaveRequest>> {
        let mut tables = self.write()?;
        if !tables
            .overlapping(&leave.employee_id, leave.start_date, leave.end_date)
            .is_empty()
        {
            return Ok(None);
        }
        Ok(Some(tables.insert_leave(leave)))
    }

    async fn get(&self, id: u64) -> StoreResult<Option<LeaveRequest>> {
        Ok(self.read()?.leave.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &LeaveFilter,
        page: Page,
    ) -> StoreResult<(Vec<LeaveRequest>, i64)> {
        let tables = self.read()?;
        let mut matching: Vec<_> = tables
            .leave
            .values()
            .filter(|l| filter.employee_id.as_ref().is_none_or(|e| &l.employee_id == e))
            .filter(|l| filter.status.is_none_or(|s| l.status == s))
            .cloned()
            .collect();
        // newest first
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(paginate(matching, page))
    }

    async fn decide(
        &self,
        id: u64,
        status: LeaveStatus,
        approver: u64,
        on: NaiveDate,
    ) -> StoreResult<Option<LeaveRequest>> {
        let mut tables = self.write()?;
        match tables.leave.get_mut(&id) {
            Some(leave) if leave.status == LeaveStatus::Pending => {
                leave.status = status;
                leave.approved_by = Some(approver);
                leave.decided_on = Some(on);
                Ok(Some(leave.clone()))
            }
            _ => Ok(None),
        }
    }
}
