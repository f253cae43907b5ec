// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// Decoding, line splitting, tokenizing and writing delimited text

mod delimiter;
mod normalizer;
mod serializer;
mod tokenizer;

pub use delimiter::detect_delimiter;
pub use normalizer::{decode, first_physical_line, logical_lines, DecodedText, LogicalLine};
pub use serializer::{escape_field, DelimitedWriter, UTF8_BOM};
pub use tokenizer::{tokenize, TokenizeError};
