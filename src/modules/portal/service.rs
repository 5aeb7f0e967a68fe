use hostelbyte_core::{AppError, CredentialHasher};
use hostelbyte_models::{ChangePasswordDto, Student};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::HostelError;
use crate::modules::students::service::StudentService;
use crate::store::HostelStore;

pub struct PortalService;

impl PortalService {
    #[instrument(skip(store))]
    pub async fn profile<S: HostelStore>(store: &S, student_id: Uuid) -> Result<Student, AppError> {
        StudentService::get(store, student_id).await.map_err(|e| match e {
            HostelError::StudentNotFound => {
                AppError::not_found(anyhow::anyhow!("Student profile not found"))
            }
            other => other.into(),
        })
    }

    /// Replaces the student's password after checking the current one.
    #[instrument(skip(store, hasher, dto))]
    pub async fn change_password<S: HostelStore>(
        store: &S,
        hasher: &CredentialHasher,
        student_id: Uuid,
        dto: ChangePasswordDto,
    ) -> Result<(), AppError> {
        let credentials = store
            .student_credentials_by_id(student_id)
            .await
            .map_err(HostelError::from)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Student profile not found")))?;

        if !hasher.verify(&dto.current_password, &credentials.password_hash)? {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Current password is incorrect"
            )));
        }

        let new_hash = hasher.hash(&dto.new_password)?;
        if !store
            .set_student_password(student_id, &new_hash)
            .await
            .map_err(HostelError::from)?
        {
            return Err(AppError::not_found(anyhow::anyhow!("Student profile not found")));
        }

        info!(%student_id, "Student password changed");
        Ok(())
    }
}
