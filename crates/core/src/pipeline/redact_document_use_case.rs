use std::path::Path;

use image::RgbImage;

use crate::detection::domain::face_locator::FaceLocator;
use crate::detection::domain::text_grouper::TextGrouping;
use crate::detection::domain::text_locator::TextLocator;
use crate::imaging::domain::image_reader::ImageReader;
use crate::pipeline::region_aggregator::aggregate;
use crate::redaction::redaction_engine::RedactionEngine;
use crate::shared::detected_region::DetectedRegion;
use crate::shared::error::PrivacyError;
use crate::shared::rectangle::Rectangle;

/// Regions found in one document image, by locator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocumentRegions {
    pub faces: Vec<DetectedRegion>,
    pub texts: Vec<DetectedRegion>,
}

impl DocumentRegions {
    pub fn face_rects(&self) -> Vec<Rectangle> {
        DetectedRegion::rectangles(&self.faces)
    }

    pub fn text_rects(&self) -> Vec<Rectangle> {
        DetectedRegion::rectangles(&self.texts)
    }

    /// Faces first, then text.
    pub fn worklist(&self) -> Vec<Rectangle> {
        aggregate(&self.face_rects(), &self.text_rects())
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty() && self.texts.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextOptions {
    pub grouping: TextGrouping,
    pub only_sensitive: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            grouping: TextGrouping::default(),
            only_sensitive: true,
        }
    }
}

/// Document redaction pipeline: locate faces and text → preview → cover.
///
/// Either locator may be absent, in which case that kind of region is
/// simply not searched for. A locator error aborts the run before any
/// output is written.
pub struct RedactDocumentUseCase {
    reader: Box<dyn ImageReader>,
    face_locator: Option<Box<dyn FaceLocator>>,
    text_locator: Option<TextLocator>,
    text_options: TextOptions,
}

impl RedactDocumentUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        face_locator: Option<Box<dyn FaceLocator>>,
        text_locator: Option<TextLocator>,
        text_options: TextOptions,
    ) -> Self {
        Self {
            reader,
            face_locator,
            text_locator,
            text_options,
        }
    }

    /// Runs every configured locator on the image.
    pub fn locate(&self, image_path: &Path) -> Result<DocumentRegions, PrivacyError> {
        let mut regions = DocumentRegions::default();

        if let Some(locator) = &self.face_locator {
            let image = self.reader.read(image_path)?;
            regions.faces = locator
                .detect(&image)
                .map_err(|e| abort("face detection", e))?
                .into_iter()
                .map(DetectedRegion::face)
                .collect();
        }

        if let Some(locator) = &self.text_locator {
            regions.texts = locator
                .detect(
                    image_path,
                    self.text_options.grouping,
                    self.text_options.only_sensitive,
                )
                .map_err(|e| abort("text detection", e))?;
        }

        Ok(regions)
    }

    /// Outlines the regions into `preview_path`. The engine's output path
    /// is left pointing at the preview.
    pub fn preview(
        &self,
        engine: &mut RedactionEngine,
        regions: &DocumentRegions,
        preview_path: &Path,
    ) -> Result<RgbImage, PrivacyError> {
        engine.set_output_path(preview_path);
        engine.preview(&regions.face_rects(), &regions.text_rects())
    }

    /// Covers every region and writes the redacted image to `output_path`.
    pub fn redact(
        &self,
        engine: &mut RedactionEngine,
        regions: &DocumentRegions,
        output_path: &Path,
    ) -> Result<RgbImage, PrivacyError> {
        engine.set_output_path(output_path);
        engine.set_rectangles(regions.worklist());
        engine.cover()
    }

    /// Locate, optionally preview, then redact the engine's source image.
    pub fn execute(
        &self,
        engine: &mut RedactionEngine,
        preview_path: Option<&Path>,
        output_path: &Path,
    ) -> Result<DocumentRegions, PrivacyError> {
        let regions = self.locate(engine.source_path())?;
        if regions.is_empty() {
            log::info!("No faces or sensitive text found; output is a copy of the source");
        }
        if let Some(path) = preview_path {
            self.preview(engine, &regions, path)?;
        }
        self.redact(engine, &regions, output_path)?;
        Ok(regions)
    }
}

fn abort(stage: &str, e: PrivacyError) -> PrivacyError {
    log::warn!("Aborting: {stage} failed: {e}");
    e
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::text_recognizer::{LineId, RecognitionService, RecognizedWord};
    use crate::imaging::domain::image_writer::ImageWriter;
    use crate::redaction::infrastructure::imageproc_painter::ImageprocPainter;
    use image::Rgb;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    // ── Stubs ────────────────────────────────────────────────────────

    struct StubReader;

    impl ImageReader for StubReader {
        fn read(&self, _path: &Path) -> Result<RgbImage, PrivacyError> {
            Ok(RgbImage::from_pixel(100, 80, Rgb([200, 200, 200])))
        }
    }

    #[derive(Clone, Default)]
    struct CapturingWriter {
        written: Arc<Mutex<Vec<(PathBuf, RgbImage)>>>,
    }

    impl ImageWriter for CapturingWriter {
        fn write(&self, path: &Path, image: &RgbImage) -> Result<(), PrivacyError> {
            self.written
                .lock()
                .unwrap()
                .push((path.to_path_buf(), image.clone()));
            Ok(())
        }
    }

    struct StubFaces(Vec<Rectangle>);

    impl FaceLocator for StubFaces {
        fn detect(&self, _image: &RgbImage) -> Result<Vec<Rectangle>, PrivacyError> {
            Ok(self.0.clone())
        }
    }

    struct UnavailableFaces;

    impl FaceLocator for UnavailableFaces {
        fn detect(&self, _image: &RgbImage) -> Result<Vec<Rectangle>, PrivacyError> {
            Err(PrivacyError::EngineUnavailable {
                engine: "face detector",
                reason: "model missing".into(),
            })
        }
    }

    struct StubOcr(Vec<RecognizedWord>);

    impl RecognitionService for StubOcr {
        fn recognize(&self, _image_path: &Path) -> Result<Vec<RecognizedWord>, PrivacyError> {
            Ok(self.0.clone())
        }
    }

    struct UnavailableOcr;

    impl RecognitionService for UnavailableOcr {
        fn recognize(&self, _image_path: &Path) -> Result<Vec<RecognizedWord>, PrivacyError> {
            Err(PrivacyError::EngineUnavailable {
                engine: "tesseract",
                reason: "not installed".into(),
            })
        }
    }

    fn word(text: &str, x: f32, y: f32, line: u32) -> RecognizedWord {
        RecognizedWord {
            polygon: vec![(x, y), (x + 30.0, y), (x + 30.0, y + 10.0), (x, y + 10.0)],
            text: text.into(),
            confidence: Some(0.9),
            line: LineId::new(1, line, 1),
        }
    }

    fn ocr_words() -> Vec<RecognizedWord> {
        vec![word("Name", 40.0, 10.0, 1), word("bob@mail.org", 40.0, 40.0, 2)]
    }

    fn text_locator(service: impl RecognitionService + 'static) -> TextLocator {
        TextLocator::new(Arc::new(service))
    }

    fn engine(writer: &CapturingWriter) -> RedactionEngine {
        RedactionEngine::new(
            "doc.png",
            Box::new(StubReader),
            Box::new(writer.clone()),
            Box::new(ImageprocPainter),
        )
    }

    const FACE: Rectangle = Rectangle::new(5, 5, 20, 20);

    // ── Locate ───────────────────────────────────────────────────────

    #[test]
    fn test_locate_collects_faces_and_sensitive_text() {
        let use_case = RedactDocumentUseCase::new(
            Box::new(StubReader),
            Some(Box::new(StubFaces(vec![FACE]))),
            Some(text_locator(StubOcr(ocr_words()))),
            TextOptions::default(),
        );
        let regions = use_case.locate(Path::new("doc.png")).unwrap();
        assert_eq!(regions.face_rects(), vec![FACE]);
        assert_eq!(regions.texts.len(), 1);
        assert_eq!(regions.texts[0].label.as_deref(), Some("bob@mail.org"));
        assert_eq!(
            regions.worklist(),
            vec![FACE, Rectangle::new(40, 40, 30, 10)]
        );
    }

    #[test]
    fn test_all_text_when_not_only_sensitive() {
        let use_case = RedactDocumentUseCase::new(
            Box::new(StubReader),
            None,
            Some(text_locator(StubOcr(ocr_words()))),
            TextOptions {
                grouping: TextGrouping::lines(),
                only_sensitive: false,
            },
        );
        let regions = use_case.locate(Path::new("doc.png")).unwrap();
        assert!(regions.faces.is_empty());
        assert_eq!(regions.texts.len(), 2);
    }

    #[test]
    fn test_no_locators_finds_nothing() {
        let use_case =
            RedactDocumentUseCase::new(Box::new(StubReader), None, None, TextOptions::default());
        assert!(use_case.locate(Path::new("doc.png")).unwrap().is_empty());
    }

    // ── Fail closed ──────────────────────────────────────────────────

    #[test]
    fn test_face_backend_failure_aborts_without_writing() {
        let writer = CapturingWriter::default();
        let mut engine = engine(&writer);
        let use_case = RedactDocumentUseCase::new(
            Box::new(StubReader),
            Some(Box::new(UnavailableFaces)),
            Some(text_locator(StubOcr(ocr_words()))),
            TextOptions::default(),
        );

        let result = use_case.execute(&mut engine, Some(Path::new("p.png")), Path::new("o.png"));
        assert!(matches!(
            result,
            Err(PrivacyError::EngineUnavailable { .. })
        ));
        assert!(writer.written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_text_backend_failure_aborts_without_writing() {
        let writer = CapturingWriter::default();
        let mut engine = engine(&writer);
        let use_case = RedactDocumentUseCase::new(
            Box::new(StubReader),
            Some(Box::new(StubFaces(vec![FACE]))),
            Some(text_locator(UnavailableOcr)),
            TextOptions::default(),
        );

        assert!(use_case
            .execute(&mut engine, None, Path::new("o.png"))
            .is_err());
        assert!(writer.written.lock().unwrap().is_empty());
    }

    // ── End to end ───────────────────────────────────────────────────

    #[test]
    fn test_execute_writes_preview_then_redacted_output() {
        let writer = CapturingWriter::default();
        let mut engine = engine(&writer);
        let use_case = RedactDocumentUseCase::new(
            Box::new(StubReader),
            Some(Box::new(StubFaces(vec![FACE]))),
            Some(text_locator(StubOcr(ocr_words()))),
            TextOptions::default(),
        );

        let regions = use_case
            .execute(&mut engine, Some(Path::new("preview.png")), Path::new("out.png"))
            .unwrap();
        assert_eq!(regions.faces.len(), 1);

        let written = writer.written.lock().unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].0, PathBuf::from("preview.png"));
        assert_eq!(written[1].0, PathBuf::from("out.png"));

        let redacted = &written[1].1;
        assert_eq!(*redacted.get_pixel(10, 10), Rgb([0, 0, 0]));
        assert_eq!(*redacted.get_pixel(50, 45), Rgb([0, 0, 0]));
        assert_eq!(*redacted.get_pixel(50, 15), Rgb([200, 200, 200]));
    }

    #[test]
    fn test_execute_with_nothing_found_copies_source() {
        let writer = CapturingWriter::default();
        let mut engine = engine(&writer);
        let use_case = RedactDocumentUseCase::new(
            Box::new(StubReader),
            Some(Box::new(StubFaces(vec![]))),
            None,
            TextOptions::default(),
        );

        let regions = use_case
            .execute(&mut engine, None, Path::new("out.png"))
            .unwrap();
        assert!(regions.is_empty());
        let written = writer.written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].1.pixels().all(|p| *p == Rgb([200, 200, 200])));
    }
}
