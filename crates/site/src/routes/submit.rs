//! Product submission form.
//!
//! Collects a candidate product for moderation. The row always enters the
//! table as `pending`; approval happens in the admin dashboard. An image can
//! be attached either as a direct upload or as a URL, with the upload winning
//! when both are present.
//!
//! Outcomes are reported through redirect query parameters rendered as
//! transient banners, so a refresh never resubmits the form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::db::ProductRequestRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::NewProductRequest;
use crate::models::request::SubmissionError;
use crate::state::AppState;

/// Query parameters for the form page (banner state).
#[derive(Debug, Default, Deserialize)]
pub struct FormQuery {
    #[serde(default)]
    pub submitted: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Submission form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/submit.html")]
pub struct SubmitFormTemplate {
    /// Show the transient success banner (auto-dismissed client-side).
    pub submitted: bool,
    pub error: Option<String>,
}

/// GET /products/submit
#[instrument(skip_all)]
pub async fn form(Query(params): Query<FormQuery>) -> SubmitFormTemplate {
    SubmitFormTemplate {
        submitted: params.submitted,
        error: params.error.as_deref().map(error_message),
    }
}

/// Map an error code from the redirect back to a user-facing message.
fn error_message(code: &str) -> String {
    match code {
        "name" => "Please enter the product name.".to_string(),
        "submitter" => "Please enter your name.".to_string(),
        "image" => "The uploaded image could not be stored. Please try again.".to_string(),
        _ => "Something went wrong. Please try again.".to_string(),
    }
}

/// Raw multipart fields before validation.
#[derive(Debug, Default)]
struct RawSubmission {
    name: String,
    submitted_by: String,
    barcode: Option<String>,
    category: Option<String>,
    comment: Option<String>,
    evidence_url: Option<String>,
    alternatives: Option<String>,
    /// Direct image URL typed into the form.
    image_url: Option<String>,
    /// Uploaded file, if any: (content type, bytes).
    upload: Option<(String, Vec<u8>)>,
}

async fn read_multipart(mut multipart: Multipart) -> Result<RawSubmission> {
    let mut raw = RawSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let Some(name) = field.name().map(String::from) else {
            continue;
        };

        if name == "image" {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("invalid upload: {e}")))?;
            if !bytes.is_empty() {
                raw.upload = Some((content_type, bytes.to_vec()));
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("invalid form field {name}: {e}")))?;

        match name.as_str() {
            "name" => raw.name = value,
            "submitted_by" => raw.submitted_by = value,
            "barcode" => raw.barcode = Some(value),
            "category" => raw.category = Some(value),
            "comment" => raw.comment = Some(value),
            "evidence_url" => raw.evidence_url = Some(value),
            "alternatives" => raw.alternatives = Some(value),
            "image_url" => raw.image_url = Some(value),
            _ => {}
        }
    }

    Ok(raw)
}

/// POST /products/submit
///
/// # Errors
///
/// Returns `AppError::Database` if the insert fails and `AppError::BadRequest`
/// for a malformed multipart body; validation and image problems redirect
/// back to the form with an error banner instead.
#[instrument(skip_all)]
pub async fn submit(State(state): State<AppState>, multipart: Multipart) -> Result<Redirect> {
    let raw = read_multipart(multipart).await?;

    let mut request = match NewProductRequest::from_form(
        &raw.name,
        &raw.submitted_by,
        raw.barcode.as_deref(),
        raw.category.as_deref(),
        raw.comment.as_deref(),
        raw.evidence_url.as_deref(),
        raw.alternatives.as_deref(),
    ) {
        Ok(request) => request,
        Err(SubmissionError::MissingName) => {
            return Ok(Redirect::to("/products/submit?error=name"));
        }
        Err(SubmissionError::MissingSubmitter) => {
            return Ok(Redirect::to("/products/submit?error=submitter"));
        }
    };

    // Uploaded file wins over a typed-in URL
    if let Some((content_type, bytes)) = raw.upload {
        match store_upload(&state, &content_type, &bytes).await {
            Ok(url) => request.image_url = Some(url),
            Err(e) => {
                warn!(error = %e, "image upload failed, aborting submission");
                return Ok(Redirect::to("/products/submit?error=image"));
            }
        }
    } else {
        request.image_url = raw.image_url.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    }

    let stored = ProductRequestRepository::new(state.pool())
        .insert(&request)
        .await?;
    tracing::info!(id = %stored.id, name = %stored.name, "product submission received");

    Ok(Redirect::to("/products/submit?submitted=true"))
}

/// Store an uploaded image and verify it is retrievable at its public URL.
async fn store_upload(state: &AppState, content_type: &str, bytes: &[u8]) -> Result<String> {
    let file_name = state.media().store(content_type, bytes).await?;
    let url = state.config().upload_url(&file_name);
    state.media().probe(&url).await?;
    Ok(url)
}
