use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::imaging::domain::image_reader::ImageReader;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::imaging::infrastructure::image_file_reader::ImageFileReader;
use crate::imaging::infrastructure::image_file_writer::ImageFileWriter;
use crate::redaction::domain::mask_color::{MaskColor, FACE_OUTLINE, TEXT_OUTLINE};
use crate::redaction::domain::region_painter::RegionPainter;
use crate::redaction::infrastructure::imageproc_painter::ImageprocPainter;
use crate::shared::constants::PREVIEW_STROKE_WIDTH;
use crate::shared::error::PrivacyError;
use crate::shared::rectangle::Rectangle;

/// Draws previews of, and irreversibly masks, rectangles on one source image.
///
/// Every operation reloads the source, so no pixel data is held between
/// calls. An output path must be set first; without one, operations fail
/// before reading or writing anything.
pub struct RedactionEngine {
    source_path: PathBuf,
    output_path: Option<PathBuf>,
    mask_color: MaskColor,
    rectangles: Vec<Rectangle>,
    reader: Box<dyn ImageReader>,
    writer: Box<dyn ImageWriter>,
    painter: Box<dyn RegionPainter>,
}

impl RedactionEngine {
    pub fn new(
        source_path: impl Into<PathBuf>,
        reader: Box<dyn ImageReader>,
        writer: Box<dyn ImageWriter>,
        painter: Box<dyn RegionPainter>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            output_path: None,
            mask_color: MaskColor::default(),
            rectangles: Vec::new(),
            reader,
            writer,
            painter,
        }
    }

    /// Engine over image files on disk, drawing with `imageproc`.
    pub fn for_file(source_path: impl Into<PathBuf>) -> Self {
        Self::new(
            source_path,
            Box::new(ImageFileReader::new()),
            Box::new(ImageFileWriter::new()),
            Box::new(ImageprocPainter),
        )
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub fn set_output_path(&mut self, path: impl Into<PathBuf>) {
        self.output_path = Some(path.into());
    }

    pub fn mask_color(&self) -> MaskColor {
        self.mask_color
    }

    pub fn set_mask_color(&mut self, color: MaskColor) {
        self.mask_color = color;
    }

    /// Replace the worklist used by [`cover`](Self::cover).
    pub fn set_rectangles(&mut self, rectangles: Vec<Rectangle>) {
        self.rectangles = rectangles;
    }

    pub fn rectangles(&self) -> &[Rectangle] {
        &self.rectangles
    }

    /// Outline face rectangles in green and text rectangles in blue, then
    /// write the result to the output path.
    ///
    /// Only the border strokes are drawn; pixels elsewhere keep their value.
    pub fn preview(
        &self,
        face_rects: &[Rectangle],
        text_rects: &[Rectangle],
    ) -> Result<RgbImage, PrivacyError> {
        let output_path = self.require_output_path()?;
        let mut image = self.reader.read(&self.source_path)?;

        for rect in face_rects {
            self.painter
                .outline(&mut image, rect, FACE_OUTLINE, PREVIEW_STROKE_WIDTH);
        }
        for rect in text_rects {
            self.painter
                .outline(&mut image, rect, TEXT_OUTLINE, PREVIEW_STROKE_WIDTH);
        }

        self.writer.write(output_path, &image)?;
        log::info!(
            "Preview saved to {} ({} face(s), {} text region(s))",
            output_path.display(),
            face_rects.len(),
            text_rects.len()
        );
        Ok(image)
    }

    /// Fill every rectangle in the worklist with the mask colour and write
    /// the result to the output path.
    ///
    /// Each fill includes the rectangle's end column and row. Fills replace
    /// pixels outright, so covering twice with the same worklist gives the
    /// same image. Parts of rectangles outside the image are clipped by the
    /// painter.
    pub fn cover(&self) -> Result<RgbImage, PrivacyError> {
        let output_path = self.require_output_path()?;
        let mut image = self.reader.read(&self.source_path)?;

        let color = self.mask_color.rgb();
        for rect in &self.rectangles {
            self.painter.fill(&mut image, rect, color);
        }

        self.writer.write(output_path, &image)?;
        log::info!(
            "Redacted {} region(s), saved to {}",
            self.rectangles.len(),
            output_path.display()
        );
        Ok(image)
    }

    fn require_output_path(&self) -> Result<&Path, PrivacyError> {
        self.output_path.as_deref().ok_or_else(|| {
            PrivacyError::Configuration("output path must be set before preview or cover".into())
        })
    }
}
