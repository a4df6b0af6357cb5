use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tempfile::{Builder, NamedTempFile, TempDir, TempPath};

use crate::core::{DocumentError, DocumentResult, OutputFormat};
use crate::docx::AssembledDocument;

use super::pdf::{PdfRenderer, RenderFailure};

const TEMP_PREFIX: &str = "appendix-";

/// Archivo final que se entrega al llamador.
///
/// El archivo se borra al soltar el artefacto; usar [`keep`](Self::keep)
/// para quedarse con la ruta.
#[derive(Debug)]
pub struct ConversionArtifact {
    path: TempPath,
    format: OutputFormat,
}

impl ConversionArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn media_type(&self) -> &'static str {
        self.format.media_type()
    }

    pub fn filename(&self) -> &'static str {
        self.format.download_name()
    }

    /// Lee el artefacto y lo borra del disco.
    pub fn into_bytes(self) -> std::io::Result<Vec<u8>> {
        let bytes = fs::read(&self.path)?;
        self.path.close()?;
        Ok(bytes)
    }

    /// Separa el archivo del artefacto; el llamador debe borrarlo.
    pub fn keep(self) -> std::io::Result<PathBuf> {
        self.path.keep().map_err(|e| e.error)
    }
}

/// Serializa el documento y, si se pide PDF, ejecuta el renderizador.
pub struct FormatConverter {
    renderer: Arc<dyn PdfRenderer>,
    temp_dir: Option<PathBuf>,
}

impl FormatConverter {
    pub fn new(renderer: Arc<dyn PdfRenderer>) -> Self {
        FormatConverter {
            renderer,
            temp_dir: None,
        }
    }

    /// Crea los temporales dentro de `dir` en lugar del directorio del sistema.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn convert(
        &self,
        doc: AssembledDocument,
        format: OutputFormat,
    ) -> DocumentResult<ConversionArtifact> {
        let docx_path = self.serialize(&doc)?;
        drop(doc);

        match format {
            OutputFormat::Docx => Ok(ConversionArtifact {
                path: docx_path,
                format,
            }),
            OutputFormat::Pdf => self.convert_to_pdf(docx_path),
        }
    }

    fn serialize(&self, doc: &AssembledDocument) -> DocumentResult<TempPath> {
        let mut buf = Cursor::new(Vec::new());
        doc.write_docx(&mut buf)?;

        let mut file = self.temp_file(".docx")?;
        file.write_all(&buf.into_inner())?;
        file.flush()?;
        Ok(file.into_temp_path())
    }

    // `docx_path` y el directorio de trabajo se borran en cualquier salida
    // al soltarse sus guardas.
    fn convert_to_pdf(&self, docx_path: TempPath) -> DocumentResult<ConversionArtifact> {
        let started = Instant::now();
        let work_dir = self.temp_workdir()?;

        if let Err(failure) = self.renderer.render_to_pdf(&docx_path, work_dir.path()) {
            tracing::error!(
                "PDF conversion with {} failed: {}",
                self.renderer.tool_name(),
                failure
            );
            return Err(self.conversion_error(failure));
        }

        let produced = expected_output(&docx_path, work_dir.path());
        if !produced.exists() {
            tracing::error!("Renderer reported success but {:?} is missing", produced);
            return Err(DocumentError::ConversionOutputMissing { expected: produced });
        }

        let pdf_path = self.temp_file(".pdf")?.into_temp_path();
        fs::rename(&produced, &pdf_path)?;

        if let Err(e) = docx_path.close() {
            tracing::warn!("Failed to remove intermediate DOCX: {}", e);
        }
        if let Err(e) = work_dir.close() {
            tracing::warn!("Failed to remove conversion directory: {}", e);
        }

        tracing::info!(
            "Converted appendix to PDF in {}ms",
            started.elapsed().as_millis()
        );
        Ok(ConversionArtifact {
            path: pdf_path,
            format: OutputFormat::Pdf,
        })
    }

    fn conversion_error(&self, failure: RenderFailure) -> DocumentError {
        match failure {
            RenderFailure::ToolMissing { tool, cause } => {
                DocumentError::ConversionToolMissing { tool, cause }
            }
            RenderFailure::Timeout { .. } => DocumentError::ConversionTimeout {
                secs: self.renderer.timeout().as_secs(),
            },
            other => DocumentError::ConversionFailed {
                cause: other.to_string(),
            },
        }
    }

    fn temp_file(&self, suffix: &str) -> std::io::Result<NamedTempFile> {
        let mut builder = Builder::new();
        builder.prefix(TEMP_PREFIX).suffix(suffix);
        match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
    }

    fn temp_workdir(&self) -> std::io::Result<TempDir> {
        let mut builder = Builder::new();
        builder.prefix(TEMP_PREFIX);
        match &self.temp_dir {
            Some(dir) => builder.tempdir_in(dir),
            None => builder.tempdir(),
        }
    }
}

/// Donde el renderizador deja su salida: `<out_dir>/<nombre base>.pdf`.
pub fn expected_output(input: &Path, out_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    out_dir.join(format!("{}.pdf", stem))
}
