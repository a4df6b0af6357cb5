use std::sync::Arc;
use std::time::Instant;

use crate::core::{AppendixRequest, DocumentResult};
use crate::docx::LayoutBuilder;
use crate::metrics;

use super::converter::{ConversionArtifact, FormatConverter};

/// Genera un anexo por solicitud: maquetación y luego conversión de formato.
#[derive(Clone)]
pub struct AppendixGenerator {
    converter: Arc<FormatConverter>,
}

impl AppendixGenerator {
    pub fn new(converter: FormatConverter) -> Self {
        AppendixGenerator {
            converter: Arc::new(converter),
        }
    }

    pub fn generate(&self, request: AppendixRequest) -> DocumentResult<ConversionArtifact> {
        let started = Instant::now();
        let format = request.output_format;
        let image_count = request.images.len();

        let result = LayoutBuilder::build(
            request.images,
            request.image_width_cm,
            request.paper_size,
            request.caption_position,
        )
        .and_then(|doc| self.converter.convert(doc, format));

        let elapsed = started.elapsed();
        match &result {
            Ok(_) => {
                metrics::record_generated(format, elapsed);
                tracing::info!(
                    "Generated {} appendix with {} images in {}ms",
                    format,
                    image_count,
                    elapsed.as_millis()
                );
            }
            Err(e) => {
                metrics::record_failure(e);
                tracing::error!("Failed to generate {} appendix: {}", format, e);
            }
        }
        result
    }

    /// Ejecuta [`generate`](Self::generate) en el pool bloqueante.
    pub async fn generate_blocking(
        &self,
        request: AppendixRequest,
    ) -> anyhow::Result<DocumentResult<ConversionArtifact>> {
        let generator = self.clone();
        let result = tokio::task::spawn_blocking(move || generator.generate(request)).await?;
        Ok(result)
    }
}
