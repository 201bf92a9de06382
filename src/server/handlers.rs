//! HTTP handlers

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Multipart, State},
    Json,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use super::error::ApiError;
use super::models::{ProcessRequest, UploadResponse};
use super::AppState;
use crate::convert::remove_if_present;
use crate::pdf::splitter::{self, SplitReport};
use crate::pdf::PdfDocument;
use crate::session::allowed_file;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Pull the `file` field out of the form, rejecting missing or disallowed files before
/// anything touches the disk.
async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Bytes), ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(ApiError::invalid("No file selected"));
        }
        if !allowed_file(&filename) {
            return Err(ApiError::invalid(
                "Invalid file type. Please upload a .docx or .doc file",
            ));
        }

        let data = field.bytes().await?;
        return Ok((filename, data));
    }

    Err(ApiError::invalid("No file provided"))
}

/// Save an uploaded document, convert it and report its page count
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let (filename, data) = read_file_field(&mut multipart).await?;
    if data.is_empty() {
        return Err(ApiError::invalid("Uploaded file is empty"));
    }

    let pending = state.sessions.begin(&filename);

    if let Err(e) = tokio::fs::write(&pending.upload_path, &data).await {
        remove_if_present(&pending.upload_path).await;
        return Err(ApiError::Internal(anyhow::Error::new(e).context(format!(
            "Failed to save upload to {}",
            pending.upload_path.display()
        ))));
    }

    if let Err(e) = state
        .converter
        .convert(&pending.upload_path, &pending.converted_path)
        .await
    {
        warn!(%filename, "{}", e);
        remove_if_present(&pending.upload_path).await;
        return Err(ApiError::ConversionFailed);
    }

    let converted = pending.converted_path.clone();
    let counted =
        tokio::task::spawn_blocking(move || PdfDocument::open(&converted).map(|d| d.page_count()))
            .await;
    let page_count = match counted {
        Ok(Ok(count)) => count,
        Ok(Err(e)) => {
            state.sessions.discard(&pending.token).await;
            return Err(ApiError::PdfRead(format!("{:#}", e)));
        }
        Err(e) => {
            state.sessions.discard(&pending.token).await;
            return Err(ApiError::Internal(
                anyhow::Error::new(e).context("Page count task failed"),
            ));
        }
    };

    let session = pending.into_session(page_count);
    info!(
        token = %session.token,
        original = %session.original_filename,
        page_count,
        "upload converted"
    );

    Ok(Json(UploadResponse {
        success: true,
        page_count: session.page_count,
        message: format!(
            "File uploaded successfully. Document has {} pages.",
            session.page_count
        ),
        session_id: session.token,
    }))
}

/// Split a converted upload into the requested files, then drop the session's temp files
pub async fn process(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<SplitReport>, ApiError> {
    let Json(req) = payload
        .map_err(|e| ApiError::invalid(format!("Invalid request body: {}", e.body_text())))?;

    let token = req
        .session_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::invalid("Invalid session"))?;

    let splits = req.splits.unwrap_or_default();
    if splits.is_empty() {
        return Err(ApiError::invalid("No split configurations provided"));
    }

    let output_dir = req
        .output_folder
        .filter(|folder| !folder.trim().is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| ApiError::invalid("Output folder not specified"))?;
    if !output_dir.exists() {
        return Err(ApiError::invalid("Output folder does not exist"));
    }
    if !output_dir.is_dir() {
        return Err(ApiError::invalid("Output path is not a directory"));
    }

    let source = state
        .sessions
        .locate(&token)
        .ok_or(ApiError::SourceNotFound)?;

    let requested = splits.len();
    let results =
        tokio::task::spawn_blocking(move || splitter::split(&source, &splits, &output_dir)).await;

    state.sessions.discard(&token).await;

    let results = results.context("Split task failed")?;
    let report = SplitReport::new(results, requested);
    info!(%token, "{}", report.message);

    Ok(Json(report))
}
