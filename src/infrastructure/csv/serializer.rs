// ============================================================
// DELIMITED WRITER
// ============================================================
// Spreadsheet-friendly output: UTF-8 BOM, `\n` rows, minimal quoting

use csv::{QuoteStyle, Terminator, Writer, WriterBuilder};

use crate::domain::csv::Delimiter;
use crate::domain::error::{ExchangeError, Result};

/// Byte-order mark prepended to every export so spreadsheet tools pick UTF-8
pub const UTF8_BOM: &str = "\u{FEFF}";

/// Row writer over an in-memory buffer.
///
/// A field is quoted only when it contains the delimiter, a `"`, `\n` or
/// `\r`; embedded quotes are doubled.
pub struct DelimitedWriter {
    writer: Writer<Vec<u8>>,
}

impl DelimitedWriter {
    /// Create a writer whose output starts with the UTF-8 BOM
    pub fn new(delimiter: Delimiter) -> Self {
        Self::with_buffer(delimiter, UTF8_BOM.as_bytes().to_vec())
    }

    fn with_buffer(delimiter: Delimiter, buffer: Vec<u8>) -> Self {
        let writer = WriterBuilder::new()
            .delimiter(delimiter.as_byte())
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(buffer);

        Self { writer }
    }

    pub fn write_row<I, T>(&mut self, cells: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer.write_record(cells).map_err(|e| {
            ExchangeError::SerializationError(format!("Failed to write CSV row: {}", e))
        })
    }

    /// Flush and hand back the encoded bytes
    pub fn finish(self) -> Result<Vec<u8>> {
        self.writer.into_inner().map_err(|e| {
            ExchangeError::IoError(format!("Failed to flush CSV output: {}", e.error()))
        })
    }
}

/// Render a single value the way the writer would place it in a row
pub fn escape_field(value: &str, delimiter: Delimiter) -> Result<String> {
    if value.is_empty() {
        return Ok(String::new());
    }

    let mut writer = DelimitedWriter::with_buffer(delimiter, Vec::new());
    writer.write_row([value])?;
    let bytes = writer.finish()?;

    let mut text = String::from_utf8(bytes).map_err(|e| {
        ExchangeError::Internal(format!("CSV writer produced invalid UTF-8: {}", e))
    })?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}
