pub mod ocr_upload;
