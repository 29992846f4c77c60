pub mod rustface_face_locator;
pub mod shared_recognizer;
pub mod tesseract_recognizer;
