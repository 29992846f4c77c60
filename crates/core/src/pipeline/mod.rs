pub mod redact_document_use_case;
pub mod region_aggregator;
