pub mod domain;
pub mod infrastructure;
pub mod redaction_engine;
