use std::fmt;
use std::str::FromStr;

pub const TWIPS_PER_INCH: f64 = 1440.0;
pub const CM_PER_INCH: f64 = 2.54;
pub const EMU_PER_CM: f64 = 360_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaperSize {
    A4,
    Letter,
    Legal,
}

/// Page width and height in centimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperDimensions {
    pub width_cm: f64,
    pub height_cm: f64,
}

impl PaperDimensions {
    pub const fn new(width_cm: f64, height_cm: f64) -> Self {
        PaperDimensions { width_cm, height_cm }
    }

    /// (width, height) in twentieths of a point, as DOCX section properties expect.
    pub fn to_twips(&self) -> (u32, u32) {
        (cm_to_twips(self.width_cm), cm_to_twips(self.height_cm))
    }
}

pub const PAPER_SIZES: [(PaperSize, PaperDimensions); 3] = [
    (PaperSize::A4, PaperSize::A4.dimensions()),
    (PaperSize::Letter, PaperSize::Letter.dimensions()),
    (PaperSize::Legal, PaperSize::Legal.dimensions()),
];

impl PaperSize {
    pub const fn dimensions(&self) -> PaperDimensions {
        match self {
            PaperSize::A4 => PaperDimensions::new(21.0, 29.7),
            PaperSize::Letter => PaperDimensions::new(21.6, 27.9),
            PaperSize::Legal => PaperDimensions::new(21.6, 35.6),
        }
    }

    /// Parses a form value. Unrecognized names yield `None` so the document
    /// keeps the library's default page size.
    pub fn from_form(value: &str) -> Option<PaperSize> {
        match value.parse() {
            Ok(size) => Some(size),
            Err(_) => {
                tracing::warn!("Unknown paper size '{}', using document default", value);
                None
            }
        }
    }
}

impl FromStr for PaperSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A4" => Ok(PaperSize::A4),
            "Letter" => Ok(PaperSize::Letter),
            "Legal" => Ok(PaperSize::Legal),
            other => Err(format!("unknown paper size: {}", other)),
        }
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaperSize::A4 => write!(f, "A4"),
            PaperSize::Letter => write!(f, "Letter"),
            PaperSize::Legal => write!(f, "Legal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Docx,
    Pdf,
}

pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PDF_MIME_TYPE: &str = "application/pdf";

impl OutputFormat {
    pub fn media_type(&self) -> &'static str {
        match self {
            OutputFormat::Docx => DOCX_MIME_TYPE,
            OutputFormat::Pdf => PDF_MIME_TYPE,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Docx => "docx",
            OutputFormat::Pdf => "pdf",
        }
    }

    pub fn download_name(&self) -> &'static str {
        match self {
            OutputFormat::Docx => "appendix.docx",
            OutputFormat::Pdf => "appendix.pdf",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "docx" => Ok(OutputFormat::Docx),
            "pdf" => Ok(OutputFormat::Pdf),
            other => Err(format!("unsupported output format: {}", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionPosition {
    Top,
    Bottom,
}

impl FromStr for CaptionPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(CaptionPosition::Top),
            "bottom" => Ok(CaptionPosition::Bottom),
            other => Err(format!("unsupported caption position: {}", other)),
        }
    }
}

impl fmt::Display for CaptionPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptionPosition::Top => write!(f, "top"),
            CaptionPosition::Bottom => write!(f, "bottom"),
        }
    }
}

pub fn cm_to_twips(cm: f64) -> u32 {
    (cm * TWIPS_PER_INCH / CM_PER_INCH).round() as u32
}

pub fn cm_to_emu(cm: f64) -> u32 {
    (cm * EMU_PER_CM).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paper_table_matches_fixed_dimensions() {
        assert_eq!(PaperSize::A4.dimensions(), PaperDimensions::new(21.0, 29.7));
        assert_eq!(PaperSize::Letter.dimensions(), PaperDimensions::new(21.6, 27.9));
        assert_eq!(PaperSize::Legal.dimensions(), PaperDimensions::new(21.6, 35.6));

        for (size, dims) in PAPER_SIZES {
            assert_eq!(size.dimensions(), dims);
            assert_eq!(size.to_string().parse::<PaperSize>(), Ok(size));
        }
    }

    #[test]
    fn unknown_paper_size_is_not_an_error() {
        assert_eq!(PaperSize::from_form("A4"), Some(PaperSize::A4));
        assert_eq!(PaperSize::from_form("Tabloid"), None);
        assert_eq!(PaperSize::from_form("a4"), None);
    }

    #[test]
    fn a4_in_twips() {
        assert_eq!(PaperSize::A4.dimensions().to_twips(), (11906, 16838));
    }

    #[test]
    fn emu_conversion() {
        assert_eq!(cm_to_emu(15.0), 5_400_000);
        assert_eq!(cm_to_emu(0.5), 180_000);
    }

    #[test]
    fn output_format_mime_and_filename() {
        assert_eq!(OutputFormat::Pdf.media_type(), "application/pdf");
        assert_eq!(OutputFormat::Pdf.download_name(), "appendix.pdf");
        assert_eq!(OutputFormat::Docx.media_type(), DOCX_MIME_TYPE);
        assert_eq!(OutputFormat::Docx.download_name(), "appendix.docx");
        assert!("odt".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn caption_position_parsing() {
        assert_eq!("top".parse::<CaptionPosition>(), Ok(CaptionPosition::Top));
        assert_eq!("bottom".parse::<CaptionPosition>(), Ok(CaptionPosition::Bottom));
        assert!("left".parse::<CaptionPosition>().is_err());
    }
}
