//! Standalone image upload handlers

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde_json::{json, Value};

use crate::core::config::AppState;
use crate::core::error::{Error, Result};
use crate::core::uploads::read_files;

/// POST /upload/single
pub async fn upload_single(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    let files = read_files(&mut multipart, "file").await?;
    let file = match files.as_slice() {
        [file] => file,
        [] => return Err(Error::BadRequest("missing file field".to_string())),
        _ => return Err(Error::BadRequest("send exactly one file".to_string())),
    };

    let url = state.uploads.save(file).await?;
    Ok(Json(json!({ "url": url })))
}

/// POST /upload/multiple
pub async fn upload_multiple(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    let files = read_files(&mut multipart, "files").await?;
    if files.is_empty() {
        return Err(Error::BadRequest("missing files field".to_string()));
    }

    let urls = state.uploads.save_all(&files).await?;
    Ok(Json(json!({ "urls": urls })))
}
