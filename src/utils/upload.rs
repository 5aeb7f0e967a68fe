use axum::extract::Multipart;
use hostelbyte_core::AppError;

const FILE_FIELD: &str = "file";

/// Reads the `file` part of a multipart upload.
pub async fn read_csv_field(mut multipart: Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(anyhow::anyhow!("Failed to read upload: {}", e)))?;
        return Ok(bytes.to_vec());
    }

    Err(AppError::bad_request(anyhow::anyhow!("No file uploaded.")))
}
