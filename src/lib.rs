pub mod api;
pub mod core;
pub mod docx;
pub mod generators;
pub mod metrics;

// Re-export commonly used types
pub use crate::core::{
    AppendixRequest, CaptionPosition, DocumentError, DocumentResult, ImageItem, OutputFormat,
    PaperDimensions, PaperSize,
};

pub use docx::{AssembledDocument, LayoutBuilder};
pub use generators::{
    AppendixGenerator, ConversionArtifact, FormatConverter, LibreOfficeRenderer, PdfRenderer,
    RenderFailure,
};
