//! Axum route handlers for the PDF API.

use anyhow::Context;
use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};

use crate::errors::AppError;
use crate::models::cover_letter::CoverLetterData;
use crate::models::resume::ResumeData;
use crate::pdf::export::RenderedDocument;
use crate::pdf::templates::DocumentKind;
use crate::state::AppState;

/// POST /api/pdf/generate
///
/// Renders a resume and returns it as a PDF download.
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    Json(mut resume): Json<ResumeData>,
) -> Result<Response, AppError> {
    resume.normalize();
    resume.validate()?;

    let pdf = state
        .pdf
        .generate(DocumentKind::Resume, resume.template_name(), &resume)
        .await
        .map_err(AppError::pdf("Failed to generate PDF"))?;

    pdf_attachment(pdf, &resume.download_file_name())
}

/// POST /api/pdf/generate-cover-letter
///
/// Renders a cover letter and returns it as a PDF download.
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    Json(mut letter): Json<CoverLetterData>,
) -> Result<Response, AppError> {
    letter.normalize();
    letter.validate()?;

    let pdf = state
        .pdf
        .generate(DocumentKind::CoverLetter, letter.template_name(), &letter)
        .await
        .map_err(AppError::pdf("Failed to generate cover letter PDF"))?;

    pdf_attachment(pdf, &letter.download_file_name())
}

fn pdf_attachment(pdf: RenderedDocument, file_name: &str) -> Result<Response, AppError> {
    // Resume names are not sanitized; validation has rejected control
    // characters and non-ASCII bytes are valid obs-text.
    let disposition = HeaderValue::from_bytes(
        format!("attachment; filename=\"{}\"", file_name.replace('"', "'")).as_bytes(),
    )
    .with_context(|| format!("filename {file_name:?} is not a valid header value"))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf.bytes,
    )
        .into_response())
}
