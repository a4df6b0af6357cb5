#![allow(dead_code)]

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use appendix_generator::generators::converter::expected_output;
use appendix_generator::{ImageItem, PdfRenderer, RenderFailure};

pub const BOUNDARY: &str = "appendix-test-boundary";

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(width, height, Rgb([20, 90, 160]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .expect("encode png");
    buf.into_inner()
}

pub fn images(n: usize) -> Vec<ImageItem> {
    (1..=n)
        .map(|i| ImageItem::new(png(8, 6), format!("figure_{i}.png")))
        .collect()
}

pub fn dir_entries(dir: &Path) -> usize {
    fs::read_dir(dir).expect("read temp dir").count()
}

/// Renderer double that writes a minimal PDF where LibreOffice would.
pub struct StubRenderer;

impl PdfRenderer for StubRenderer {
    fn render_to_pdf(&self, input: &Path, out_dir: &Path) -> Result<(), RenderFailure> {
        fs::write(expected_output(input, out_dir), b"%PDF-1.7\n%%EOF\n")?;
        Ok(())
    }

    fn tool_name(&self) -> &str {
        "stub"
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(30)
    }
}

/// Builds a `multipart/form-data` body from files and text fields.
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        MultipartBody { body: Vec::new() }
    }

    pub fn file(mut self, name: &str, filename: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }

    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }
}
