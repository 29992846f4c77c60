use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use docprivacy_core::detection::domain::face_locator::{FaceLocator, FaceLocatorConfig};
use docprivacy_core::detection::domain::text_grouper::TextGrouping;
use docprivacy_core::detection::domain::text_locator::TextLocator;
use docprivacy_core::detection::domain::text_recognizer::RecognitionService;
use docprivacy_core::detection::infrastructure::rustface_face_locator::RustfaceFaceLocator;
use docprivacy_core::detection::infrastructure::shared_recognizer::SharedRecognizer;
use docprivacy_core::detection::infrastructure::tesseract_recognizer::{
    TesseractConfig, TesseractRecognizer, DEFAULT_OEM, DEFAULT_PSM,
};
use docprivacy_core::imaging::infrastructure::image_file_reader::ImageFileReader;
use docprivacy_core::pipeline::redact_document_use_case::{RedactDocumentUseCase, TextOptions};
use docprivacy_core::redaction::domain::mask_color::MaskColor;
use docprivacy_core::redaction::redaction_engine::RedactionEngine;
use docprivacy_core::shared::constants::{
    DEFAULT_MIN_NEIGHBORS, DEFAULT_OCR_LANGUAGES, DEFAULT_SCALE_FACTOR, DEFAULT_WIDTH_THRESHOLD,
    FACE_MODEL_NAME, IMAGE_EXTENSIONS,
};
use docprivacy_core::shared::model_resolver::{ModelSource, ProgressFn};
use docprivacy_core::upload::ocr_upload::{OcrUploadService, UploadedImage};

/// Find and redact faces and sensitive text in document images.
#[derive(Parser)]
#[command(name = "docprivacy")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Outline detected faces (green) and text (blue) without hiding anything.
    Preview {
        /// Input image file.
        input: PathBuf,
        /// Where to write the outlined image.
        output: PathBuf,
        #[command(flatten)]
        detection: DetectionArgs,
    },
    /// Cover detected faces and text with an opaque mask.
    Redact {
        /// Input image file.
        input: PathBuf,
        /// Where to write the redacted image.
        output: PathBuf,
        /// Also write an outlined preview here.
        #[arg(long)]
        preview: Option<PathBuf>,
        /// Mask color as `r,g,b` or `#rrggbb`.
        #[arg(long, default_value = "0,0,0")]
        mask_color: String,
        #[command(flatten)]
        detection: DetectionArgs,
    },
    /// Print the text recognized in an image as JSON.
    Ocr {
        /// Input image file.
        input: PathBuf,
        /// Report one box per line instead of plain text.
        #[arg(long)]
        detail: bool,
        #[command(flatten)]
        ocr: OcrArgs,
    },
}

#[derive(Args)]
struct DetectionArgs {
    /// Face detection pyramid step (> 1.0).
    #[arg(long, default_value_t = DEFAULT_SCALE_FACTOR)]
    scale_factor: f64,

    /// Face detection strictness (>= 1); higher rejects more candidates.
    #[arg(long, default_value_t = DEFAULT_MIN_NEIGHBORS)]
    min_neighbors: u32,

    /// Word merging threshold (0.0-1.0); lower merges more text.
    #[arg(long, default_value_t = DEFAULT_WIDTH_THRESHOLD)]
    width_threshold: f32,

    /// Report each line separately instead of whole paragraphs.
    #[arg(long)]
    no_paragraph: bool,

    /// Keep only text that looks like an email, IBAN, phone number or date.
    #[arg(long)]
    only_sensitive: bool,

    /// Skip face detection.
    #[arg(long)]
    no_faces: bool,

    /// Skip text detection.
    #[arg(long)]
    no_text: bool,

    /// Face model file (downloaded to the cache when omitted).
    #[arg(long)]
    face_model: Option<PathBuf>,

    #[command(flatten)]
    ocr: OcrArgs,
}

#[derive(Args)]
struct OcrArgs {
    /// OCR languages, `+`-separated (e.g. deu+eng).
    #[arg(long, default_value = DEFAULT_OCR_LANGUAGES)]
    lang: String,

    /// Tesseract executable.
    #[arg(long)]
    tesseract: Option<PathBuf>,

    /// Directory holding `.traineddata` files.
    #[arg(long)]
    tessdata: Option<PathBuf>,

    /// Tesseract page segmentation mode.
    #[arg(long, default_value_t = DEFAULT_PSM)]
    psm: u32,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    match cli.command {
        Command::Preview {
            input,
            output,
            detection,
        } => run_preview(&input, &output, &detection),
        Command::Redact {
            input,
            output,
            preview,
            mask_color,
            detection,
        } => run_redact(&input, &output, preview.as_deref(), &mask_color, &detection),
        Command::Ocr { input, detail, ocr } => run_ocr(&input, detail, &ocr),
    }
}

fn run_preview(
    input: &Path,
    output: &Path,
    detection: &DetectionArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let use_case = build_use_case(detection)?;
    let regions = use_case.locate(input)?;

    let mut engine = RedactionEngine::for_file(input);
    use_case.preview(&mut engine, &regions, output)?;
    log::info!(
        "Outlined {} face(s) and {} text region(s)",
        regions.faces.len(),
        regions.texts.len()
    );
    Ok(())
}

fn run_redact(
    input: &Path,
    output: &Path,
    preview: Option<&Path>,
    mask_color: &str,
    detection: &DetectionArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let color: MaskColor = mask_color.parse()?;
    let use_case = build_use_case(detection)?;

    let mut engine = RedactionEngine::for_file(input);
    engine.set_mask_color(color);
    let regions = use_case.execute(&mut engine, preview, output)?;
    log::info!(
        "Covered {} region(s), output written to {}",
        regions.worklist().len(),
        output.display()
    );
    Ok(())
}

fn run_ocr(input: &Path, detail: bool, ocr: &OcrArgs) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(input)?;
    let filename = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let service = OcrUploadService::new(build_recognizer(ocr));
    let response = service.read_text(Some(UploadedImage::new(filename, bytes)), detail);
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.ok {
        return Err(format!("OCR failed with status {}", response.status).into());
    }
    Ok(())
}

fn build_use_case(
    detection: &DetectionArgs,
) -> Result<RedactDocumentUseCase, Box<dyn std::error::Error>> {
    let face_locator: Option<Box<dyn FaceLocator>> = if detection.no_faces {
        None
    } else {
        Some(Box::new(build_face_locator(detection)?))
    };
    let text_locator = if detection.no_text {
        None
    } else {
        Some(TextLocator::new(build_recognizer(&detection.ocr)))
    };
    let text_options = TextOptions {
        grouping: TextGrouping::new(detection.width_threshold, !detection.no_paragraph),
        only_sensitive: detection.only_sensitive,
    };

    Ok(RedactDocumentUseCase::new(
        Box::new(ImageFileReader::new()),
        face_locator,
        text_locator,
        text_options,
    ))
}

fn build_face_locator(
    detection: &DetectionArgs,
) -> Result<RustfaceFaceLocator, Box<dyn std::error::Error>> {
    let config = FaceLocatorConfig::default()
        .with_scale_factor(detection.scale_factor)
        .with_min_neighbors(detection.min_neighbors);
    let source = ModelSource {
        explicit: detection.face_model.clone(),
        bundled_dir: bundled_model_dir(),
    };

    log::info!("Resolving model: {FACE_MODEL_NAME}");
    let progress = DownloadProgress::default();
    let locator =
        RustfaceFaceLocator::from_model_source(&source, config, Some(progress.callback()));
    progress.finish();
    Ok(locator?)
}

fn build_recognizer(ocr: &OcrArgs) -> Arc<dyn RecognitionService> {
    let config = TesseractConfig {
        binary_path: ocr.tesseract.clone(),
        tessdata_path: ocr.tessdata.clone(),
        languages: ocr.lang.clone(),
        psm: ocr.psm,
        oem: DEFAULT_OEM,
    };
    Arc::new(SharedRecognizer::new(TesseractRecognizer::factory(config)))
}

/// `models/` next to the executable, if present.
fn bundled_model_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let dir = exe.parent()?.join("models");
    dir.is_dir().then_some(dir)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match &cli.command {
        Command::Preview {
            input, detection, ..
        } => {
            validate_input(input)?;
            validate_detection(detection)
        }
        Command::Redact {
            input,
            mask_color,
            detection,
            ..
        } => {
            validate_input(input)?;
            mask_color.parse::<MaskColor>()?;
            validate_detection(detection)
        }
        Command::Ocr { input, ocr, .. } => {
            validate_input(input)?;
            validate_ocr(ocr)
        }
    }
}

fn validate_input(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !input.exists() {
        return Err(format!("Input file not found: {}", input.display()).into());
    }
    if !is_image(input) {
        return Err(format!(
            "Unsupported input '{}', expected one of: {}",
            input.display(),
            IMAGE_EXTENSIONS.join(", ")
        )
        .into());
    }
    Ok(())
}

fn validate_detection(detection: &DetectionArgs) -> Result<(), Box<dyn std::error::Error>> {
    if detection.no_faces && detection.no_text {
        return Err("--no-faces and --no-text together leave nothing to detect".into());
    }
    if detection.scale_factor.is_nan() || detection.scale_factor <= 1.0 {
        return Err(format!(
            "Scale factor must be greater than 1.0, got {}",
            detection.scale_factor
        )
        .into());
    }
    if detection.min_neighbors == 0 {
        return Err("Min neighbors must be at least 1".into());
    }
    if !(0.0..=1.0).contains(&detection.width_threshold) {
        return Err(format!(
            "Width threshold must be between 0.0 and 1.0, got {}",
            detection.width_threshold
        )
        .into());
    }
    if let Some(model) = &detection.face_model {
        if !model.is_file() {
            return Err(format!("Face model not found: {}", model.display()).into());
        }
    }
    validate_ocr(&detection.ocr)
}

fn validate_ocr(ocr: &OcrArgs) -> Result<(), Box<dyn std::error::Error>> {
    if ocr.lang.trim().is_empty() {
        return Err("At least one OCR language is required".into());
    }
    if ocr.psm > 13 {
        return Err(format!(
            "Page segmentation mode must be between 0 and 13, got {}",
            ocr.psm
        )
        .into());
    }
    if let Some(dir) = &ocr.tessdata {
        if !dir.is_dir() {
            return Err(format!("Tessdata directory not found: {}", dir.display()).into());
        }
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Progress line for the model download; only ended if it was drawn.
#[derive(Clone, Default)]
struct DownloadProgress {
    drawn: Arc<AtomicBool>,
}

impl DownloadProgress {
    fn callback(&self) -> ProgressFn {
        let drawn = self.drawn.clone();
        Box::new(move |downloaded, total| {
            drawn.store(true, Ordering::Relaxed);
            eprint!("\r{}", progress_line(downloaded, total));
        })
    }

    fn was_drawn(&self) -> bool {
        self.drawn.load(Ordering::Relaxed)
    }

    fn finish(&self) {
        if self.was_drawn() {
            eprintln!();
        }
    }
}

fn progress_line(downloaded: u64, total: u64) -> String {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        format!("Downloading face detection model... {pct}%")
    } else {
        format!("Downloading face detection model... {downloaded} bytes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_redact_defaults() {
        let cli = parse(&["docprivacy", "redact", "in.png", "out.png"]);
        let Command::Redact {
            mask_color,
            preview,
            detection,
            ..
        } = cli.command
        else {
            panic!("expected redact");
        };
        assert_eq!(mask_color, "0,0,0");
        assert!(preview.is_none());
        assert_eq!(detection.min_neighbors, 5);
        assert!(!detection.only_sensitive);
        assert!(!detection.no_paragraph);
        assert_eq!(detection.ocr.lang, "eng");
    }

    #[test]
    fn test_detection_flags() {
        let cli = parse(&[
            "docprivacy",
            "preview",
            "in.png",
            "out.png",
            "--width-threshold",
            "0.3",
            "--only-sensitive",
            "--no-faces",
            "--lang",
            "deu+eng",
        ]);
        let Command::Preview { detection, .. } = cli.command else {
            panic!("expected preview");
        };
        assert!(detection.only_sensitive);
        assert!(detection.no_faces);
        assert_eq!(detection.ocr.lang, "deu+eng");
        assert!((detection.width_threshold - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_input_rejected() {
        let cli = parse(&["docprivacy", "ocr", "/nonexistent/scan.png"]);
        assert!(validate(&cli).is_err());
    }

    #[test]
    fn test_invalid_detection_values_rejected() {
        let base = || DetectionArgs {
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
            width_threshold: DEFAULT_WIDTH_THRESHOLD,
            no_paragraph: false,
            only_sensitive: false,
            no_faces: false,
            no_text: false,
            face_model: None,
            ocr: OcrArgs {
                lang: "eng".into(),
                tesseract: None,
                tessdata: None,
                psm: DEFAULT_PSM,
            },
        };
        assert!(validate_detection(&base()).is_ok());
        assert!(validate_detection(&DetectionArgs { scale_factor: 1.0, ..base() }).is_err());
        assert!(validate_detection(&DetectionArgs { min_neighbors: 0, ..base() }).is_err());
        assert!(validate_detection(&DetectionArgs { width_threshold: 1.5, ..base() }).is_err());
        assert!(validate_detection(&DetectionArgs {
            no_faces: true,
            no_text: true,
            ..base()
        })
        .is_err());
    }

    #[test]
    fn test_is_image() {
        assert!(is_image(Path::new("scan.PNG")));
        assert!(is_image(Path::new("id.jpeg")));
        assert!(!is_image(Path::new("clip.mp4")));
        assert!(!is_image(Path::new("noext")));
    }

    // ── Download progress ────────────────────────────────────────────

    #[test]
    fn test_progress_is_not_drawn_until_called() {
        let progress = DownloadProgress::default();
        let _callback = progress.callback();
        assert!(!progress.was_drawn());
    }

    #[test]
    fn test_progress_is_drawn_after_first_callback() {
        let progress = DownloadProgress::default();
        let callback = progress.callback();
        callback(512, 1024);
        assert!(progress.was_drawn());
    }

    #[test]
    fn test_progress_line() {
        assert_eq!(
            progress_line(512, 1024),
            "Downloading face detection model... 50%"
        );
        assert_eq!(
            progress_line(2048, 0),
            "Downloading face detection model... 2048 bytes"
        );
    }
}
