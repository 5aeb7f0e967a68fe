use hostelbyte_auth::{Role, create_access_token};
use hostelbyte_config::JwtConfig;
use hostelbyte_core::{AppError, CredentialHasher};
use tracing::{instrument, warn};

use crate::error::HostelError;
use crate::metrics::{track_jwt_issued, track_login};
use crate::store::{Credentials, HostelStore};

use super::model::{AdminLoginRequest, LoginResponse, StudentLoginRequest};

pub struct AuthService;

impl AuthService {
    #[instrument(skip(store, hasher, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login_admin<S: HostelStore>(
        store: &S,
        hasher: &CredentialHasher,
        dto: AdminLoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let credentials = store
            .admin_credentials(&dto.email)
            .await
            .map_err(HostelError::from)?;

        Self::issue_token(
            hasher,
            credentials,
            &dto.password,
            Role::Admin,
            jwt_config,
            "Invalid email or password",
        )
    }

    #[instrument(skip(store, hasher, dto, jwt_config), fields(roll_no = %dto.roll_no))]
    pub async fn login_student<S: HostelStore>(
        store: &S,
        hasher: &CredentialHasher,
        dto: StudentLoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let credentials = store
            .student_credentials_by_roll(&dto.roll_no)
            .await
            .map_err(HostelError::from)?;

        Self::issue_token(
            hasher,
            credentials,
            &dto.password,
            Role::Student,
            jwt_config,
            "Invalid roll number or password",
        )
    }

    fn issue_token(
        hasher: &CredentialHasher,
        credentials: Option<Credentials>,
        password: &str,
        role: Role,
        jwt_config: &JwtConfig,
        rejection: &str,
    ) -> Result<LoginResponse, AppError> {
        let Some(credentials) = credentials else {
            hasher.verify_absent(password);
            track_login(role, false);
            return Err(AppError::unauthorized(rejection));
        };

        if !hasher.verify(password, &credentials.password_hash)? {
            track_login(role, false);
            warn!(role = role.as_str(), "Rejected login with wrong password");
            return Err(AppError::unauthorized(rejection));
        }

        let access_token = create_access_token(credentials.id, role, jwt_config)?;
        track_login(role, true);
        track_jwt_issued(role);

        Ok(LoginResponse::bearer(
            access_token,
            role,
            jwt_config.access_token_expiry,
        ))
    }
}
