pub mod face_locator;
pub mod sensitive_text;
pub mod text_grouper;
pub mod text_locator;
pub mod text_recognizer;
