// ============================================================
// TABEX
// ============================================================
// Tabular data exchange: delimited text <-> structured records
//
//   domain          record, mapping and result types
//   infrastructure  decoding, tokenizing, writing, mapping profiles
//   application     import / export use cases, import queue

pub mod app;
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{
    clean_numeric, clean_numeric_with, import, parse, serialize, CoercionError, IdGenerator,
    ImportQueue, SequentialIds, UuidIds,
};
pub use domain::{
    Delimiter, ExchangeError, ExportSpec, ExtraField, Field, FieldMapping, FieldSpec, FieldType,
    FieldValue, ImportReport, ImportSummary, NumberLocale, ParseResult, Record, RecordSet,
    Result, RowError, RowStatus,
};
pub use infrastructure::config::{ConfigService, MappingProfile};
pub use infrastructure::csv::{detect_delimiter, escape_field, tokenize, TokenizeError};
