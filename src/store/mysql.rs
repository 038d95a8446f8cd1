use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, MySqlPool};

use crate::error::StoreError;
use crate::model::attendance::AttendanceRecord;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, NewLeave};
use crate::model::payroll::{AttendanceSummary, Deductions, Earnings, PayrollRecord};
use crate::model::timecard::TimePunch;
use crate::utils::db_utils::{SqlValue, build_update_sql, execute_update};

use super::{
    AttendanceStore, DepartmentRegistry, DepartmentShard, EmployeeChanges, EmployeeFilter,
    EmployeeStore, LeaveFilter, LeaveStore, Page, PayrollFilter, PayrollStore, StoreResult, Stores,
    TimecardStore,
};

const EMPLOYEE_COLUMNS: &str =
    "employee_id, name, email, phone, department_id, designation, base_gross_salary, status";

const UPDATABLE_EMPLOYEE_COLUMNS: &[&str] = &[
    "name",
    "email",
    "phone",
    "department_id",
    "designation",
    "base_gross_salary",
    "status",
];

const PAYROLL_COLUMNS: &str = r#"
    id, employee_id, employee_name, department, designation, pay_period, gross_salary,
    basic, hra, da, conveyance, medical, bonus, incentive, overtime_pay,
    working_days, present_days, absent_days, half_days, overtime_hours,
    provident_fund, esi, professional_tax, lop_days, lop_deduction, loan_deduction, other_deductions,
    total_earnings, total_deductions, net_pay, status, created_by, created_at
"#;

const LEAVE_COLUMNS: &str = r#"
    id, employee_id, leave_type, start_date, end_date, days, reason,
    status, approved_by, decided_on, created_at
"#;

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Str(String),
}

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Builds every repository, loading the department registry once.
    pub async fn stores(pool: MySqlPool) -> StoreResult<Stores> {
        let departments =
            sqlx::query_as::<_, Department>("SELECT id, name FROM departments ORDER BY id")
                .fetch_all(&pool)
                .await?;

        tracing::info!(count = departments.len(), "Loaded department registry");

        let shards = departments
            .into_iter()
            .map(|department| {
                Arc::new(MySqlDepartmentShard {
                    department,
                    pool: pool.clone(),
                }) as Arc<dyn DepartmentShard>
            })
            .collect();

        let store = Arc::new(MySqlStore::new(pool));

        Ok(Stores {
            departments: Arc::new(DepartmentRegistry::new(shards)),
            employees: store.clone(),
            timecards: store.clone(),
            attendance: store.clone(),
            payroll: store.clone(),
            leave: store,
        })
    }
}

struct MySqlDepartmentShard {
    department: Department,
    pool: MySqlPool,
}

#[async_trait]
impl DepartmentShard for MySqlDepartmentShard {
    fn department(&self) -> &Department {
        &self.department
    }

    async fn find(&self, employee_id: &str) -> StoreResult<Option<Employee>> {
        let sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE department_id = ? AND employee_id = ?"
        );
        Ok(sqlx::query_as::<_, Employee>(&sql)
            .bind(self.department.id)
            .bind(employee_id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[async_trait]
impl EmployeeStore for MySqlStore {
    async fn insert(&self, employee: &Employee) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO employees
            (employee_id, name, email, phone, department_id, designation, base_gross_salary, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&employee.employee_id)
        .bind(&employee.name)
        .bind(&employee.email)
        .bind(&employee.phone)
        .bind(employee.department_id)
        .bind(&employee.designation)
        .bind(employee.base_gross_salary)
        .bind(&employee.status)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self, filter: &EmployeeFilter, page: Page) -> StoreResult<(Vec<Employee>, i64)> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(department_id) = filter.department_id {
            where_sql.push_str(" AND department_id = ?");
            args.push(FilterValue::U64(department_id));
        }
        if let Some(status) = &filter.status {
            where_sql.push_str(" AND status = ?");
            args.push(FilterValue::Str(status.clone()));
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search.to_lowercase());
            where_sql.push_str(" AND (LOWER(name) LIKE ? OR LOWER(email) LIKE ?)");
            args.push(FilterValue::Str(pattern.clone()));
            args.push(FilterValue::Str(pattern));
        }

        let count_sql = format!("SELECT COUNT(*) FROM employees{where_sql}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = match arg {
                FilterValue::U64(v) => count_q.bind(*v),
                FilterValue::Str(s) => count_q.bind(s.as_str()),
            };
        }
        let total = count_q.fetch_one(&self.pool).await?;

        let data_sql = format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees{where_sql} ORDER BY employee_id LIMIT ? OFFSET ?"
        );
        let mut data_q = sqlx::query_as::<_, Employee>(&data_sql);
        for arg in &args {
            data_q = match arg {
                FilterValue::U64(v) => data_q.bind(*v),
                FilterValue::Str(s) => data_q.bind(s.as_str()),
            };
        }
        let data = data_q
            .bind(page.per_page as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok((data, total))
    }

    async fn update(&self, employee_id: &str, changes: &EmployeeChanges) -> StoreResult<bool> {
        let payload = serde_json::to_value(changes)
            .map_err(|e| StoreError::Corrupt(format!("employee changes: {e}")))?;
        if payload.as_object().is_none_or(|o| o.is_empty()) {
            return Ok(true);
        }

        let update = build_update_sql(
            "employees",
            &payload,
            UPDATABLE_EMPLOYEE_COLUMNS,
            "employee_id",
            SqlValue::String(employee_id.to_string()),
        )
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        // MySQL reports 0 affected rows when nothing actually changed
        let affected = execute_update(&self.pool, update).await?;
        if affected > 0 {
            return Ok(true);
        }
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE employee_id = ? LIMIT 1)",
        )
        .bind(employee_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists > 0)
    }

    async fn delete(&self, employee_id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM employees WHERE employee_id = ?")
            .bind(employee_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

const TIMECARD_COLUMNS: &str =
    "employee_id, work_date, log_in, log_out, lunch_out, lunch_in, permission, reason";

#[async_trait]
impl TimecardStore for MySqlStore {
    async fn range(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<TimePunch>> {
        let sql = format!(
            "SELECT {TIMECARD_COLUMNS} FROM timecards
             WHERE employee_id = ? AND work_date BETWEEN ? AND ?
             ORDER BY work_date"
        );
        Ok(sqlx::query_as::<_, TimePunch>(&sql)
            .bind(employee_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get(&self, employee_id: &str, date: NaiveDate) -> StoreResult<Option<TimePunch>> {
        let sql =
            format!("SELECT {TIMECARD_COLUMNS} FROM timecards WHERE employee_id = ? AND work_date = ?");
        Ok(sqlx::query_as::<_, TimePunch>(&sql)
            .bind(employee_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert(&self, punch: &TimePunch) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO timecards
            (employee_id, work_date, log_in, log_out, lunch_out, lunch_in, permission, reason)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&punch.employee_id)
        .bind(punch.date)
        .bind(&punch.log_in)
        .bind(&punch.log_out)
        .bind(&punch.lunch_out)
        .bind(&punch.lunch_in)
        .bind(&punch.permission)
        .bind(&punch.reason)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert(&self, punch: &TimePunch) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO timecards
            (employee_id, work_date, log_in, log_out, lunch_out, lunch_in, permission, reason)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                log_in = VALUES(log_in),
                log_out = VALUES(log_out),
                lunch_out = VALUES(lunch_out),
                lunch_in = VALUES(lunch_in),
                permission = VALUES(permission),
                reason = VALUES(reason)
            "#,
        )
        .bind(&punch.employee_id)
        .bind(punch.date)
        .bind(&punch.log_in)
        .bind(&punch.log_out)
        .bind(&punch.lunch_out)
        .bind(&punch.lunch_in)
        .bind(&punch.permission)
        .bind(&punch.reason)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(FromRow)]
struct AttendanceRow {
    employee_id: String,
    work_date: NaiveDate,
    status: String,
    total_hours: f64,
    permission_hours: f64,
    log_in: String,
    log_out: String,
    lunch_minutes: u32,
    overtime_hours: f64,
    remarks: String,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        Ok(AttendanceRecord {
            status: row
                .status
                .parse()
                .map_err(|_| StoreError::Corrupt(format!("attendance status {:?}", row.status)))?,
            employee_id: row.employee_id,
            date: row.work_date,
            total_hours: row.total_hours,
            permission_hours: row.permission_hours,
            log_in: row.log_in,
            log_out: row.log_out,
            lunch_minutes: row.lunch_minutes,
            overtime_hours: row.overtime_hours,
            remarks: row.remarks,
        })
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn upsert(&self, records: &[AttendanceRecord]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO attendance_records
                (employee_id, work_date, status, total_hours, permission_hours,
                 log_in, log_out, lunch_minutes, overtime_hours, remarks)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON DUPLICATE KEY UPDATE
                    status = VALUES(status),
                    total_hours = VALUES(total_hours),
                    permission_hours = VALUES(permission_hours),
                    log_in = VALUES(log_in),
                    log_out = VALUES(log_out),
                    lunch_minutes = VALUES(lunch_minutes),
                    overtime_hours = VALUES(overtime_hours),
                    remarks = VALUES(remarks)
                "#,
            )
            .bind(&record.employee_id)
            .bind(record.date)
            .bind(record.status.to_string())
            .bind(record.total_hours)
            .bind(record.permission_hours)
            .bind(&record.log_in)
            .bind(&record.log_out)
            .bind(record.lunch_minutes)
            .bind(record.overtime_hours)
            .bind(&record.remarks)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn range(
        &self,
        employee_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT employee_id, work_date, status, total_hours, permission_hours,
                   log_in, log_out, lunch_minutes, overtime_hours, remarks
            FROM attendance_records
            WHERE employee_id = ? AND work_date BETWEEN ? AND ?
            ORDER BY work_date
            "#,
        )
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AttendanceRecord::try_from).collect()
    }
}

#[derive(FromRow)]
struct PayrollRow {
    id: u64,
    employee_id: String,
    employee_name: String,
    department: String,
    designation: String,
    pay_period: String,
    gross_salary: f64,
    basic: f64,
    hra: f64,
    da: f64,
    conveyance: f64,
    medical: f64,
    bonus: f64,
    incentive: f64,
    overtime_pay: f64,
    working_days: u32,
    present_days: u32,
    absent_days: u32,
    half_days: u32,
    overtime_hours: f64,
    provident_fund: f64,
    esi: f64,
    professional_tax: f64,
    lop_days: f64,
    lop_deduction: f64,
    loan_deduction: f64,
    other_deductions: f64,
    total_earnings: f64,
    total_deductions: f64,
    net_pay: f64,
    status: String,
    created_by: u64,
    created_at: DateTime<Utc>,
}

impl TryFrom<PayrollRow> for PayrollRecord {
    type Error = StoreError;

    fn try_from(row: PayrollRow) -> Result<Self, Self::Error> {
        Ok(PayrollRecord {
            status: row
                .status
                .parse()
                .map_err(|_| StoreError::Corrupt(format!("payroll status {:?}", row.status)))?,
            id: row.id,
            employee_id: row.employee_id,
            employee_name: row.employee_name,
            department: row.department,
            designation: row.designation,
            pay_period: row.pay_period,
            gross_salary: row.gross_salary,
            earnings: Earnings {
                basic: row.basic,
                hra: row.hra,
                da: row.da,
                conveyance: row.conveyance,
                medical: row.medical,
                bonus: row.bonus,
                incentive: row.incentive,
                overtime_pay: row.overtime_pay,
            },
            attendance: AttendanceSummary {
                working_days: row.working_days,
                present_days: row.present_days,
                absent_days: row.absent_days,
                half_days: row.half_days,
                overtime_hours: row.overtime_hours,
            },
            deductions: Deductions {
                provident_fund: row.provident_fund,
                esi: row.esi,
                professional_tax: row.professional_tax,
                lop_days: row.lop_days,
                lop_deduction: row.lop_deduction,
                loan_deduction: row.loan_deduction,
                other_deductions: row.other_deductions,
            },
            total_earnings: row.total_earnings,
            total_deductions: row.total_deductions,
            net_pay: row.net_pay,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl PayrollStore for MySqlStore {
    async fn exists(&self, employee_id: &str, pay_period: &str) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM payroll_records WHERE employee_id = ? AND pay_period = ? LIMIT 1
            )
            "#,
        )
        .bind(employee_id)
        .bind(pay_period)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists > 0)
    }

    async fn insert(&self, record: &PayrollRecord) -> StoreResult<u64> {
        let e = &record.earnings;
        let a = &record.attendance;
        let d = &record.deductions;

        let result = sqlx::query(
            r#"
            INSERT INTO payroll_records
            (employee_id, employee_name, department, designation, pay_period, gross_salary,
             basic, hra, da, conveyance, medical, bonus, incentive, overtime_pay,
             working_days, present_days, absent_days, half_days, overtime_hours,
             provident_fund, esi, professional_tax, lop_days, lop_deduction,
             loan_deduction, other_deductions,
             total_earnings, total_deductions, net_pay, status, created_by, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.employee_id)
        .bind(&record.employee_name)
        .bind(&record.department)
        .bind(&record.designation)
        .bind(&record.pay_period)
        .bind(record.gross_salary)
        .bind(e.basic)
        .bind(e.hra)
        .bind(e.da)
        .bind(e.conveyance)
        .bind(e.medical)
        .bind(e.bonus)
        .bind(e.incentive)
        .bind(e.overtime_pay)
        .bind(a.working_days)
        .bind(a.present_days)
        .bind(a.absent_days)
        .bind(a.half_days)
        .bind(a.overtime_hours)
        .bind(d.provident_fund)
        .bind(d.esi)
        .bind(d.professional_tax)
        .bind(d.lop_days)
        .bind(d.lop_deduction)
        .bind(d.loan_deduction)
        .bind(d.other_deductions)
        .bind(record.total_earnings)
        .bind(record.total_deductions)
        .bind(record.net_pay)
        .bind(record.status.to_string())
        .bind(record.created_by)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id())
    }

    async fn get(&self, id: u64) -> StoreResult<Option<PayrollRecord>> {
        let sql = format!("SELECT {PAYROLL_COLUMNS} FROM payroll_records WHERE id = ?");
        sqlx::query_as::<_, PayrollRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(PayrollRecord::try_from)
            .transpose()
    }

    async fn list(
        &self,
        filter: &PayrollFilter,
        page: Page,
    ) -> StoreResult<(Vec<PayrollRecord>, i64)> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<&str> = Vec::new();

        if let Some(employee_id) = filter.employee_id.as_deref() {
            where_sql.push_str(" AND employee_id = ?");
            args.push(employee_id);
        }
        if let Some(pay_period) = filter.pay_period.as_deref() {
            where_sql.push_str(" AND pay_period = ?");
            args.push(pay_period);
        }

        let count_sql = format!("SELECT COUNT(*) FROM payroll_records{where_sql}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = count_q.bind(*arg);
        }
        let total = count_q.fetch_one(&self.pool).await?;

        let data_sql = format!(
            "SELECT {PAYROLL_COLUMNS} FROM payroll_records{where_sql}
             ORDER BY pay_period DESC, id ASC LIMIT ? OFFSET ?"
        );
        let mut data_q = sqlx::query_as::<_, PayrollRow>(&data_sql);
        for arg in &args {
            data_q = data_q.bind(*arg);
        }
        let rows = data_q
            .bind(page.per_page as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let data = rows
            .into_iter()
            .map(PayrollRecord::try_from)
            .collect::<StoreResult<Vec<_>>>()?;
        Ok((data, total))
    }

    async fn update(&self, record: &PayrollRecord) -> StoreResult<bool> {
        let e = &record.earnings;
        let d = &record.deductions;

        let result = sqlx::query(
            r#"
            UPDATE payroll_records
            SET bonus = ?, incentive = ?, loan_deduction = ?, other_deductions = ?,
                total_earnings = ?, total_deductions = ?, net_pay = ?, status = ?
            WHERE id = ?
            "#,
        )
        .bind(e.bonus)
        .bind(e.incentive)
        .bind(d.loan_deduction)
        .bind(d.other_deductions)
        .bind(record.total_earnings)
        .bind(record.total_deductions)
        .bind(record.net_pay)
        .bind(record.status.to_string())
        .bind(record.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0 || PayrollStore::get(self, record.id).await?.is_some())
    }
}

#[derive(FromRow)]
struct LeaveRow {
    id: u64,
    employee_id: String,
    leave_type: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    days: u32,
    reason: String,
    status: String,
    approved_by: Option<u64>,
    decided_on: Option<NaiveDate>,
    created_at: DateTime<Utc>,
}

impl TryFrom<LeaveRow> for LeaveRequest {
    type Error = StoreError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        Ok(LeaveRequest {
            leave_type: row
                .leave_type
                .parse()
                .map_err(|_| StoreError::Corrupt(format!("leave type {:?}", row.leave_type)))?,
            status: row
                .status
                .parse()
                .map_err(|_| StoreError::Corrupt(format!("leave status {:?}", row.status)))?,
            id: row.id,
            employee_id: row.employee_id,
            start_date: row.start_date,
            end_date: row.end_date,
            days: row.days,
            reason: row.reason,
            approved_by: row.approved_by,
            decided_on: row.decided_on,
            created_at: row.created_at,
        })
    }
}

const OVERLAP_SQL: &str = r#"
    WHERE employee_id = ?
    AND status IN ('pending', 'approved')
    AND start_date <= ?
    AND end_date >= ?
"#;

const INSERT_LEAVE_SQL: &str = r#"
    INSERT INTO leave_requests
        (employee_id, leave_type, start_date, end_date, days, reason, status)
    VALUES (?, ?, ?, ?, ?, ?, 'pending')
"#;

impl MySqlStore {
    async fn fetch_leave(&self, id: u64) -> StoreResult<LeaveRequest> {
        LeaveStore::get(self, id)
            .await?
            .ok_or_else(|| StoreError::Corrupt(format!("leave request {id} vanished after write")))
    }
}

#[async_trait]
impl LeaveStore for MySqlStore {
    async fn overlapping(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<LeaveRequest>> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests {OVERLAP_SQL}");
        let rows = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(employee_id)
            .bind(end)
            .bind(start)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(LeaveRequest::try_from).collect()
    }

    async fn insert(&self, leave: &NewLeave) -> StoreResult<LeaveRequest> {
        let result = sqlx::query(INSERT_LEAVE_SQL)
            .bind(&leave.employee_id)
            .bind(leave.leave_type.to_string())
            .bind(leave.start_date)
            .bind(leave.end_date)
            .bind(leave.days)
            .bind(&leave.reason)
            .execute(&self.pool)
            .await?;

        self.fetch_leave(result.last_insert_id()).await
    }

    async fn insert_exclusive(&self, leave: &NewLeave) -> StoreResult<Option<LeaveRequest>> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the employee serializes concurrent submissions for them
        sqlx::query("SELECT employee_id FROM employees WHERE employee_id = ? FOR UPDATE")
            .bind(&leave.employee_id)
            .fetch_optional(&mut *tx)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM leave_requests {OVERLAP_SQL}");
        let overlaps = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(&leave.employee_id)
            .bind(leave.end_date)
            .bind(leave.start_date)
            .fetch_one(&mut *tx)
            .await?;

        if overlaps > 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let result = sqlx::query(INSERT_LEAVE_SQL)
            .bind(&leave.employee_id)
            .bind(leave.leave_type.to_string())
            .bind(leave.start_date)
            .bind(leave.end_date)
            .bind(leave.days)
            .bind(&leave.reason)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.fetch_leave(result.last_insert_id()).await.map(Some)
    }

    async fn get(&self, id: u64) -> StoreResult<Option<LeaveRequest>> {
        let sql = format!("SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?");
        sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(LeaveRequest::try_from)
            .transpose()
    }

    async fn list(
        &self,
        filter: &LeaveFilter,
        page: Page,
    ) -> StoreResult<(Vec<LeaveRequest>, i64)> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<String> = Vec::new();

        if let Some(employee_id) = &filter.employee_id {
            where_sql.push_str(" AND employee_id = ?");
            args.push(employee_id.clone());
        }
        if let Some(status) = filter.status {
            where_sql.push_str(" AND status = ?");
            args.push(status.to_string());
        }

        let count_sql = format!("SELECT COUNT(*) FROM leave_requests{where_sql}");
        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = count_q.bind(arg.as_str());
        }
        let total = count_q.fetch_one(&self.pool).await?;

        let data_sql = format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests{where_sql}
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        );
        let mut data_q = sqlx::query_as::<_, LeaveRow>(&data_sql);
        for arg in &args {
            data_q = data_q.bind(arg.as_str());
        }
        let rows = data_q
            .bind(page.per_page as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let data = rows
            .into_iter()
            .map(LeaveRequest::try_from)
            .collect::<StoreResult<Vec<_>>>()?;
        Ok((data, total))
    }

    async fn decide(
        &self,
        id: u64,
        status: LeaveStatus,
        approver: u64,
        on: NaiveDate,
    ) -> StoreResult<Option<LeaveRequest>> {
        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = ?, approved_by = ?, decided_on = ?
            WHERE id = ?
            AND status = 'pending'
            "#,
        )
        .bind(status.to_string())
        .bind(approver)
        .bind(on)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.fetch_leave(id).await.map(Some)
    }
}
