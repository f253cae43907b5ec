pub mod use_cases;

pub use use_cases::header_resolver::{resolve_headers, ColumnTarget, HeaderResolution};
pub use use_cases::id_generator::{IdGenerator, SequentialIds, UuidIds};
pub use use_cases::import_orchestrator::{import, parse, ImportOrchestrator};
pub use use_cases::import_queue::ImportQueue;
pub use use_cases::record_exporter::serialize;
pub use use_cases::value_coercer::{
    clean_numeric, clean_numeric_with, Coerced, CoercionError, ValueCoercer,
};
