pub mod appendix;
pub mod converter;
pub mod pdf;

pub use appendix::AppendixGenerator;
pub use converter::{ConversionArtifact, FormatConverter};
pub use pdf::{LibreOfficeRenderer, PdfRenderer, RenderFailure};
