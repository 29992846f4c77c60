use std::path::Path;
use std::sync::Mutex;

use crate::detection::domain::text_recognizer::{RecognitionService, RecognizedWord, TextRecognizer};
use crate::shared::error::PrivacyError;

/// Builds the OCR engine on first use.
pub type RecognizerFactory =
    Box<dyn Fn() -> Result<Box<dyn TextRecognizer>, PrivacyError> + Send + Sync>;

/// A single OCR engine shared by every caller in the process.
///
/// The engine is constructed at most once, under the lock, the first time
/// it is needed. A failed construction leaves the slot empty and is
/// retried on the next call. Recognition holds the same lock, so calls are
/// serialized.
pub struct SharedRecognizer {
    factory: RecognizerFactory,
    engine: Mutex<Option<Box<dyn TextRecognizer>>>,
}

impl SharedRecognizer {
    pub fn new(factory: RecognizerFactory) -> Self {
        Self {
            factory,
            engine: Mutex::new(None),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }
}

impl RecognitionService for SharedRecognizer {
    fn recognize(&self, image_path: &Path) -> Result<Vec<RecognizedWord>, PrivacyError> {
        let mut slot = self.engine.lock().map_err(|_| PrivacyError::EngineFailed {
            engine: "ocr",
            reason: "engine lock poisoned by an earlier panic".into(),
        })?;

        if slot.is_none() {
            log::info!("Initializing OCR engine");
            *slot = Some((self.factory)()?);
        }
        match slot.as_mut() {
            Some(engine) => engine.recognize(image_path),
            None => Err(PrivacyError::EngineInit {
                engine: "ocr",
                reason: "engine slot empty after construction".into(),
            }),
        }
    }
}
