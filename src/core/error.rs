use std::path::PathBuf;
use thiserror::Error;

const CONVERSION_ADVICE: &str =
    "LibreOffice is required for PDF export. Please install it or use DOCX format.";

#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document library could not embed an uploaded image.
    #[error("Failed to embed image '{filename}': {detail}")]
    Rendering { filename: String, detail: String },

    #[error("PDF conversion failed: {tool} could not be started ({cause}). {advice}", advice = CONVERSION_ADVICE)]
    ConversionToolMissing { tool: String, cause: String },

    #[error("PDF conversion failed: renderer timed out after {secs}s. {advice}", advice = CONVERSION_ADVICE)]
    ConversionTimeout { secs: u64 },

    #[error("PDF conversion failed: {cause}. {advice}", advice = CONVERSION_ADVICE)]
    ConversionFailed { cause: String },

    #[error("PDF conversion failed. Output file not found: {}", expected.display())]
    ConversionOutputMissing { expected: PathBuf },

    #[error("Failed to write document: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DocumentError {
    /// True for every failure raised at the format-conversion boundary.
    pub fn is_conversion(&self) -> bool {
        matches!(
            self,
            DocumentError::ConversionToolMissing { .. }
                | DocumentError::ConversionTimeout { .. }
                | DocumentError::ConversionFailed { .. }
                | DocumentError::ConversionOutputMissing { .. }
        )
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentError::Rendering { .. } => "rendering",
            DocumentError::ConversionToolMissing { .. } => "tool_missing",
            DocumentError::ConversionTimeout { .. } => "timeout",
            DocumentError::ConversionFailed { .. } => "tool_failed",
            DocumentError::ConversionOutputMissing { .. } => "output_missing",
            DocumentError::Serialization(_) => "serialization",
            DocumentError::Io(_) => "io",
        }
    }
}

pub type DocumentResult<T> = Result<T, DocumentError>;
