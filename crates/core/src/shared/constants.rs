pub const FACE_MODEL_NAME: &str = "seeta_fd_frontal_v1.0.bin";
pub const FACE_MODEL_URL: &str =
    "https://github.com/atomashpolskiy/rustface/raw/master/model/seeta_fd_frontal_v1.0.bin";

/// Image pyramid step for face detection; must be greater than 1.0.
pub const DEFAULT_SCALE_FACTOR: f64 = 1.1;
/// Face detection strictness; higher values reject more candidates.
pub const DEFAULT_MIN_NEIGHBORS: u32 = 5;
pub const DEFAULT_MIN_FACE_SIZE: u32 = 20;

/// Text grouping: lower values merge neighbouring words more aggressively.
pub const DEFAULT_WIDTH_THRESHOLD: f32 = 0.5;
pub const DEFAULT_PARAGRAPH: bool = true;

pub const DEFAULT_OCR_LANGUAGES: &str = "eng";

/// Preview border thickness in pixels.
pub const PREVIEW_STROKE_WIDTH: u32 = 3;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
