use axum::extract::{Multipart, State};

use crate::{
    error::Result,
    responses::Created,
    state::AppState,
    upload::{UploadError, UploadResult},
};

/// `POST /admin/upload`: multipart form with `type` and `file` fields
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Created<UploadResult>> {
    let mut upload_type = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("type") => upload_type = Some(field.text().await?),
            Some("file") => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                file = Some((field.bytes().await?, content_type));
            }
            _ => {}
        }
    }

    let upload_type = upload_type
        .filter(|t| !t.is_empty())
        .ok_or(UploadError::MissingType)?;
    let (data, content_type) = file.ok_or(UploadError::MissingFile)?;

    let result = state
        .uploads()
        .upload_image(data, &content_type, &upload_type)
        .await?;
    Ok(Created::new(result))
}
