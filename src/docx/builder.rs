use docx_rs::{AlignmentType, BreakType, Docx, Paragraph, Pic, Run, Style, StyleType};
use image::{GenericImageView, ImageFormat};
use std::io::{Cursor, Seek, Write};

use crate::core::{
    cm_to_emu, CaptionPosition, DocumentError, DocumentResult, ImageItem, PaperDimensions,
    PaperSize,
};

pub const TITLE_TEXT: &str = "Appendix";
pub const TITLE_STYLE: &str = "Title";
pub const CAPTION_STYLE: &str = "Caption";

/// Elemento a nivel de párrafo del anexo, en orden de documento.
#[derive(Debug, Clone)]
pub enum Block {
    Title(String),
    Caption(String),
    Figure(Figure),
    PageBreak,
}

#[derive(Debug, Clone)]
pub struct Figure {
    pub filename: String,
    /// Imagen ya normalizada a PNG.
    pub png: Vec<u8>,
    pub width_cm: f64,
    pub width_px: u32,
    pub height_px: u32,
}

impl Figure {
    /// Tamaño final en EMU; el alto conserva la proporción de la imagen.
    pub fn extent_emu(&self) -> (u32, u32) {
        let width = cm_to_emu(self.width_cm);
        let height = (width as f64 * self.height_px as f64 / self.width_px as f64).round() as u32;
        (width, height)
    }
}

/// Anexo paginado, en memoria hasta que se serializa.
#[derive(Debug, Clone, Default)]
pub struct AssembledDocument {
    page_dimensions: Option<PaperDimensions>,
    blocks: Vec<Block>,
}

impl AssembledDocument {
    pub fn page_dimensions(&self) -> Option<PaperDimensions> {
        self.page_dimensions
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn page_breaks(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::PageBreak))
            .count()
    }

    /// Páginas con contenido. Un salto al final del documento no abre página nueva.
    pub fn page_count(&self) -> usize {
        let trailing = matches!(self.blocks.last(), Some(Block::PageBreak));
        self.page_breaks() + 1 - usize::from(trailing)
    }

    pub fn figure_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, Block::Figure(_)))
            .count()
    }

    pub fn captions(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Caption(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn to_docx(&self) -> Docx {
        let mut docx = Docx::new()
            .add_style(
                Style::new(TITLE_STYLE, StyleType::Paragraph)
                    .name("Title")
                    .size(56),
            )
            .add_style(
                Style::new(CAPTION_STYLE, StyleType::Paragraph)
                    .name("Caption")
                    .size(18)
                    .italic(),
            );

        if let Some(dims) = self.page_dimensions {
            let (width, height) = dims.to_twips();
            docx = docx.page_size(width, height);
        }

        for block in &self.blocks {
            let paragraph = match block {
                Block::Title(text) => Paragraph::new()
                    .add_run(Run::new().add_text(text.as_str()))
                    .style(TITLE_STYLE),
                Block::Caption(text) => Paragraph::new()
                    .add_run(Run::new().add_text(text.as_str()))
                    .style(CAPTION_STYLE),
                Block::Figure(figure) => {
                    let (width, height) = figure.extent_emu();
                    let pic = Pic::new_with_dimensions(
                        figure.png.clone(),
                        figure.width_px,
                        figure.height_px,
                    )
                    .size(width, height);
                    Paragraph::new()
                        .align(AlignmentType::Center)
                        .add_run(Run::new().add_image(pic))
                }
                Block::PageBreak => {
                    Paragraph::new().add_run(Run::new().add_break(BreakType::Page))
                }
            };
            docx = docx.add_paragraph(paragraph);
        }

        docx
    }

    /// Empaqueta el documento como DOCX en `writer`.
    pub fn write_docx<W: Write + Seek>(&self, writer: W) -> DocumentResult<()> {
        self.to_docx()
            .build()
            .pack(writer)
            .map_err(|e| DocumentError::Serialization(e.to_string()))
    }
}

pub struct LayoutBuilder {
    document: AssembledDocument,
    caption_position: CaptionPosition,
    image_width_cm: f64,
}

impl LayoutBuilder {
    pub fn new(image_width_cm: f64, caption_position: CaptionPosition) -> Self {
        LayoutBuilder {
            document: AssembledDocument::default(),
            caption_position,
            image_width_cm,
        }
    }

    pub fn paper_size(&mut self, paper_size: Option<PaperSize>) -> &mut Self {
        self.document.page_dimensions = paper_size.map(|size| size.dimensions());
        self
    }

    pub fn add_title(&mut self, text: &str) -> &mut Self {
        self.document.blocks.push(Block::Title(text.to_string()));
        self
    }

    pub fn add_caption(&mut self, text: String) -> &mut Self {
        self.document.blocks.push(Block::Caption(text));
        self
    }

    pub fn add_page_break(&mut self) -> &mut Self {
        self.document.blocks.push(Block::PageBreak);
        self
    }

    /// Agrega una figura centrada. Falla si los bytes no son una imagen decodificable.
    pub fn add_image(&mut self, item: ImageItem) -> DocumentResult<&mut Self> {
        let rendering = |detail: String| DocumentError::Rendering {
            filename: item.filename.clone(),
            detail,
        };

        let decoded = image::load_from_memory(&item.bytes).map_err(|e| rendering(e.to_string()))?;
        let (width_px, height_px) = decoded.dimensions();
        if width_px == 0 || height_px == 0 {
            return Err(rendering("image has zero width or height".to_string()));
        }

        // Se re-codifica aquí para que docx-rs nunca tenga que decodificar
        let mut png = Cursor::new(Vec::new());
        decoded
            .write_to(&mut png, ImageFormat::Png)
            .map_err(|e| rendering(e.to_string()))?;

        self.document.blocks.push(Block::Figure(Figure {
            filename: item.filename,
            png: png.into_inner(),
            width_cm: self.image_width_cm,
            width_px,
            height_px,
        }));
        Ok(self)
    }

    /// Agrega una página con figura y leyenda. `idx` empieza en 1.
    pub fn add_figure_page(&mut self, idx: usize, item: ImageItem) -> DocumentResult<&mut Self> {
        let caption = item.caption(idx);
        if self.caption_position == CaptionPosition::Top {
            self.add_caption(caption.clone());
        }
        self.add_image(item)?;
        if self.caption_position == CaptionPosition::Bottom {
            self.add_caption(caption);
        }
        Ok(self)
    }

    pub fn finish(self) -> AssembledDocument {
        self.document
    }

    /// Página de título seguida de una página por imagen.
    pub fn build(
        images: Vec<ImageItem>,
        image_width_cm: f64,
        paper_size: Option<PaperSize>,
        caption_position: CaptionPosition,
    ) -> DocumentResult<AssembledDocument> {
        let mut builder = LayoutBuilder::new(image_width_cm, caption_position);
        builder.paper_size(paper_size);
        builder.add_title(TITLE_TEXT).add_page_break();

        let total = images.len();
        for (idx, item) in (1..).zip(images) {
            builder.add_figure_page(idx, item)?;
            if idx < total {
                builder.add_page_break();
            }
        }

        tracing::debug!(
            "Laid out appendix with {} figures on {} pages",
            total,
            builder.document.page_count()
        );
        Ok(builder.finish())
    }
}
