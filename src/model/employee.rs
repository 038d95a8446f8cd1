use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "employee_id": "EMP-001",
        "name": "John Doe",
        "email": "john.doe@company.com",
        "phone": "+8801712345678",
        "department_id": 10,
        "designation": "Software Engineer",
        "base_gross_salary": 30000.0,
        "status": "active"
    })
)]
pub struct Employee {
    #[schema(example = "EMP-001")]
    pub employee_id: String,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "+8801712345678", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = 10)]
    pub department_id: u64,

    #[schema(example = "Software Engineer")]
    pub designation: String,

    #[schema(example = 30000.0)]
    pub base_gross_salary: f64,

    #[schema(example = "active")]
    pub status: String,
}

impl Employee {
    /// Checks the fields every stored employee must carry.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.employee_id.trim().is_empty() {
            return Err(ServiceError::validation("employee_id is required"));
        }
        if self.name.trim().is_empty() {
            return Err(ServiceError::validation("name is required"));
        }
        if !self.email.contains('@') {
            return Err(ServiceError::validation("email is invalid"));
        }
        if self.designation.trim().is_empty() {
            return Err(ServiceError::validation("designation is required"));
        }
        if !self.base_gross_salary.is_finite() || self.base_gross_salary < 0.0 {
            return Err(ServiceError::validation(
                "base_gross_salary must be a non-negative number",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee() -> Employee {
        Employee {
            employee_id: "EMP-001".into(),
            name: "John Doe".into(),
            email: "john@company.com".into(),
            phone: None,
            department_id: 1,
            designation: "Engineer".into(),
            base_gross_salary: 30000.0,
            status: "active".into(),
        }
    }

    #[test]
    fn accepts_complete_employee() {
        assert!(employee().validate().is_ok());
    }

    #[test]
    fn rejects_missing_fields() {
        let mut e = employee();
        e.name = " ".into();
        assert!(e.validate().is_err());

        let mut e = employee();
        e.base_gross_salary = -1.0;
        assert!(e.validate().is_err());

        let mut e = employee();
        e.email = "nope".into();
        assert!(e.validate().is_err());
    }
}
