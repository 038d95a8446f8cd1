use crate::api::attendance::AttendanceRange;
use crate::calc::payroll::Adjustments;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use crate::model::payroll::{AttendanceSummary, Deductions, Earnings, PayrollRecord, PayrollStatus};
use crate::model::timecard::TimePunch;
use crate::services::employee::{EmployeeListResponse, EmployeeQuery, EmployeeResponse};
use crate::services::leave::{CreateLeave, LeaveListResponse, LeaveQuery};
use crate::services::payroll::{
    GeneratePayroll, PaginatedPayrollResponse, PayrollQuery, UpdatePayroll,
};
use crate::services::timecard::TimecardQuery;
use crate::store::EmployeeChanges;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Payroll API",
        version = "1.0.0",
        description = r#"
## HR payroll & attendance service

Turns raw daily punches into attendance, attendance into monthly payroll,
and guards leave requests against overlapping dates.

### Key Features
- **Timecards**: check-in, lunch, check-out and HR corrections
- **Attendance**: per-day classification (Present, Half Day, Absent, In Office)
- **Payroll**: salary split, PF/ESI/professional tax, loss of pay, overtime
- **Leave**: requests with overlap protection, approve/reject by HR
- **Employees**: profiles resolved across department shards

### Security
Every endpoint expects a **JWT Bearer** access token. Payroll, leave decisions
and employee management require the **Admin** or **HR** role.

### Response Format
- JSON bodies; errors carry `{"message": ...}`
- Pagination supported for list endpoints
"#,
    ),
    paths(
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::timecard::check_in,
        crate::api::timecard::check_out,
        crate::api::timecard::lunch_out,
        crate::api::timecard::lunch_in,
        crate::api::timecard::upsert_timecard,
        crate::api::timecard::list_timecards,

        crate::api::attendance::attendance_snapshot,
        crate::api::attendance::attendance_snapshot_body,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,
        crate::api::employee::list_departments,

        crate::api::payroll::create_payroll,
        crate::api::payroll::update_payroll,
        crate::api::payroll::get_payroll,
        crate::api::payroll::list_payrolls
    ),
    components(
        schemas(
            LeaveType,
            LeaveStatus,
            LeaveRequest,
            CreateLeave,
            LeaveQuery,
            LeaveListResponse,
            TimePunch,
            TimecardQuery,
            AttendanceStatus,
            AttendanceRecord,
            AttendanceRange,
            Department,
            Employee,
            EmployeeChanges,
            EmployeeQuery,
            EmployeeResponse,
            EmployeeListResponse,
            Earnings,
            Deductions,
            AttendanceSummary,
            PayrollStatus,
            PayrollRecord,
            Adjustments,
            GeneratePayroll,
            UpdatePayroll,
            PayrollQuery,
            PaginatedPayrollResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave management APIs"),
        (name = "Timecard", description = "Daily punch APIs"),
        (name = "Attendance", description = "Attendance classification APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Payroll", description = "Payroll management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/payroll",
            "/api/payroll/{payroll_id}",
            "/api/leave/{leave_id}/approve",
            "/api/timecard/check-in",
            "/api/attendance",
            "/api/employee/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
        assert!(
            doc.components
                .as_ref()
                .is_some_and(|c| c.security_schemes.contains_key("bearer_auth"))
        );
    }
}
