pub mod header_resolver;
pub mod id_generator;
pub mod import_orchestrator;
pub mod import_queue;
pub mod record_exporter;
pub mod value_coercer;
