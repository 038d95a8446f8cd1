use crate::auth::jwt::verify_access_token;
use crate::config::Config;
use crate::error::ServiceError;
use crate::model::role::Role;
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data,
};
use futures::future::{Ready, ready};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<String>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // Already verified by auth_middleware
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(
                    actix_web::error::ErrorInternalServerError("Config missing"),
                ))
            }
        };

        let claims = match verify_access_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        let role = match Role::from_id(claims.role) {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Invalid role"))),
        };

        ready(Ok(AuthUser {
            user_id: claims.user_id,
            username: claims.sub,
            role,
            employee_id: claims.employee_id,
        }))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("Admin only".into()))
        }
    }

    pub fn require_hr_or_admin(&self) -> Result<(), ServiceError> {
        if self.role.is_admin_tier() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("HR/Admin only".into()))
        }
    }

    /// The employee record linked to this user.
    pub fn own_employee_id(&self) -> Result<&str, ServiceError> {
        self.employee_id
            .as_deref()
            .ok_or_else(|| ServiceError::Forbidden("No employee profile".into()))
    }

    /// HR/Admin may act on anyone; everybody else only on themselves.
    pub fn require_self_or_hr(&self, employee_id: &str) -> Result<(), ServiceError> {
        if self.role.is_admin_tier() || self.employee_id.as_deref() == Some(employee_id) {
            Ok(())
        } else {
            Err(ServiceError::Forbidden(
                "Not allowed to access another employee's records".into(),
            ))
        }
    }
}
