use actix_multipart::Multipart;
use actix_web::{http::header, web, HttpResponse};
use serde::Serialize;
use uuid::Uuid;

use super::error::ApiResult;
use super::form::UploadForm;
use super::state::ApiState;

/// Builds an appendix from the uploaded images and returns it as an attachment.
pub async fn upload(
    mut payload: Multipart,
    state: web::Data<ApiState>,
) -> ApiResult<HttpResponse> {
    let request_id = Uuid::new_v4();

    let form = UploadForm::read(&mut payload, state.config.max_upload_size_bytes).await?;
    let request = form.into_request(&state.config)?;

    tracing::info!(
        %request_id,
        images = request.images.len(),
        format = %request.output_format,
        "Generating appendix"
    );

    let artifact = state.generator.generate_blocking(request).await??;
    let media_type = artifact.media_type();
    let filename = artifact.filename();

    let body = tokio::fs::read(artifact.path()).await?;
    // removes the temporary file
    drop(artifact);

    Ok(HttpResponse::Ok()
        .content_type(media_type)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", filename),
        ))
        .body(body))
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthStatus {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn metrics_endpoint() -> HttpResponse {
    use prometheus::{Encoder, TextEncoder};

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
