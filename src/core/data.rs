use std::path::Path;

use super::config::{CaptionPosition, OutputFormat, PaperSize};

/// An uploaded image together with the name it was uploaded under.
#[derive(Debug, Clone)]
pub struct ImageItem {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl ImageItem {
    pub fn new(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        ImageItem {
            bytes,
            filename: filename.into(),
        }
    }

    /// Filename without directory components or its final extension.
    pub fn stem(&self) -> &str {
        Path::new(&self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.filename)
    }

    pub fn caption(&self, idx: usize) -> String {
        format!("Figure {}: {}", idx, self.stem())
    }
}

#[derive(Debug, Clone)]
pub struct AppendixRequest {
    pub images: Vec<ImageItem>,
    pub image_width_cm: f64,
    /// `None` keeps the document library's default page size.
    pub paper_size: Option<PaperSize>,
    pub output_format: OutputFormat,
    pub caption_position: CaptionPosition,
}

impl AppendixRequest {
    pub const DEFAULT_IMAGE_WIDTH_CM: f64 = 15.0;

    pub fn new(images: Vec<ImageItem>) -> Self {
        AppendixRequest {
            images,
            image_width_cm: Self::DEFAULT_IMAGE_WIDTH_CM,
            paper_size: Some(PaperSize::A4),
            output_format: OutputFormat::Docx,
            caption_position: CaptionPosition::Bottom,
        }
    }

    pub fn with_image_width(mut self, width_cm: f64) -> Self {
        self.image_width_cm = width_cm;
        self
    }

    pub fn with_paper_size(mut self, paper_size: Option<PaperSize>) -> Self {
        self.paper_size = paper_size;
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_caption_position(mut self, position: CaptionPosition) -> Self {
        self.caption_position = position;
        self
    }
}
