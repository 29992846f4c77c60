pub mod constants;
pub mod detected_region;
pub mod error;
pub mod model_resolver;
pub mod rectangle;
