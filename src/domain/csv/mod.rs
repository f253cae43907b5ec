// ============================================================
// CSV DOMAIN LAYER
// ============================================================
// Core types and value objects for tabular data exchange
// No I/O, no async

mod export_spec;
mod field_mapping;
mod parse_result;
mod record;

pub use export_spec::{Delimiter, ExportSpec};
pub use field_mapping::{FieldMapping, FieldSpec, FieldType, NumberLocale};
pub use parse_result::{HeaderSet, ImportReport, ImportSummary, ParseResult, RowError, RowStatus};
pub use record::{ExtraField, Field, FieldValue, Record, RecordSet};
