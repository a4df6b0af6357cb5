use actix_multipart::Multipart;
use futures::TryStreamExt;

use super::error::{ApiError, ApiResult};
use super::state::AppConfig;
use crate::core::{AppendixRequest, CaptionPosition, ImageItem, OutputFormat, PaperSize};

pub const FILES_FIELD: &str = "files";

/// Raw values of the upload form, before validation.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub files: Vec<ImageItem>,
    pub image_width: Option<String>,
    pub paper_size: Option<String>,
    pub output_format: Option<String>,
    pub caption_position: Option<String>,
}

impl UploadForm {
    /// Drains the multipart stream, rejecting uploads larger than `max_bytes` in total.
    pub async fn read(payload: &mut Multipart, max_bytes: usize) -> ApiResult<Self> {
        let mut form = UploadForm::default();
        let mut total = 0usize;

        while let Some(mut field) = payload.try_next().await? {
            let disposition = field.content_disposition();
            let name = disposition.get_name().unwrap_or_default().to_string();
            let filename = disposition.get_filename().map(str::to_string);

            let mut data = Vec::new();
            while let Some(chunk) = field.try_next().await? {
                total += chunk.len();
                if total > max_bytes {
                    return Err(ApiError::payload_too_large(format!(
                        "Upload exceeds {} MB",
                        max_bytes / 1_048_576
                    )));
                }
                data.extend_from_slice(&chunk);
            }

            match name.as_str() {
                FILES_FIELD => {
                    let filename = filename.unwrap_or_else(|| format!("image{}", form.files.len() + 1));
                    form.files.push(ImageItem::new(data, filename));
                }
                "image_width" => form.image_width = Some(text(&name, data)?),
                "paper_size" => form.paper_size = Some(text(&name, data)?),
                "output_format" => form.output_format = Some(text(&name, data)?),
                "caption_position" => form.caption_position = Some(text(&name, data)?),
                other => tracing::debug!("Ignoring unknown form field '{}'", other),
            }
        }

        Ok(form)
    }

    /// Applies defaults and validates the form against `config`.
    pub fn into_request(self, config: &AppConfig) -> ApiResult<AppendixRequest> {
        if self.files.is_empty() {
            return Err(ApiError::bad_request("At least one image file is required"));
        }

        let image_width = match self.image_width.as_deref().map(str::trim) {
            None | Some("") => AppendixRequest::DEFAULT_IMAGE_WIDTH_CM,
            Some(raw) => raw
                .parse::<f64>()
                .map_err(|_| ApiError::bad_request(format!("Invalid image_width: {}", raw)))?,
        };
        if !image_width.is_finite()
            || image_width < config.min_image_width_cm
            || image_width > config.max_image_width_cm
        {
            return Err(ApiError::bad_request(format!(
                "image_width must be between {} and {} cm",
                config.min_image_width_cm, config.max_image_width_cm
            )));
        }

        let paper_size = PaperSize::from_form(self.paper_size.as_deref().unwrap_or("A4"));

        let output_format = self
            .output_format
            .as_deref()
            .unwrap_or("docx")
            .parse::<OutputFormat>()
            .map_err(ApiError::bad_request)?;

        let caption_position = self
            .caption_position
            .as_deref()
            .unwrap_or("bottom")
            .parse::<CaptionPosition>()
            .map_err(ApiError::bad_request)?;

        Ok(AppendixRequest::new(self.files)
            .with_image_width(image_width)
            .with_paper_size(paper_size)
            .with_output_format(output_format)
            .with_caption_position(caption_position))
    }
}

fn text(name: &str, data: Vec<u8>) -> ApiResult<String> {
    String::from_utf8(data)
        .map(|s| s.trim().to_string())
        .map_err(|_| ApiError::bad_request(format!("Field '{}' is not valid UTF-8", name)))
}
