//! Authentication request and response models.

use hostelbyte_auth::Role;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Admin login with email and password.
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct AdminLoginRequest {
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Student login with roll number and password.
#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct StudentLoginRequest {
    #[validate(length(min = 1, message = "Roll number is required"))]
    pub roll_no: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub role: Role,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

impl LoginResponse {
    pub fn bearer(access_token: String, role: Role, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            role,
            expires_in,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_login_validation() {
        let request = AdminLoginRequest {
            email: "not-an-email".to_string(),
            password: "x".to_string(),
        };
        assert!(request.validate().is_err());

        let request = AdminLoginRequest {
            email: "warden@hostel.test".to_string(),
            password: "x".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_student_login_requires_roll_no() {
        let request = StudentLoginRequest {
            roll_no: String::new(),
            password: "secret".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_bearer_response() {
        let response = LoginResponse::bearer("tok".to_string(), Role::Admin, 3600);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["token_type"], "Bearer");
        assert_eq!(json["role"], "admin");
    }
}
