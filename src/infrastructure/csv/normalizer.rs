// ============================================================
// TEXT NORMALIZER
// ============================================================
// Decode raw bytes, strip the BOM, split into logical lines

use encoding_rs::{Encoding, UTF_8};

use crate::domain::csv::Delimiter;
use crate::domain::error::{ExchangeError, Result};

/// One CSV row as it appeared in the source, possibly spanning several
/// physical lines when a quoted field contains newlines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalLine<'a> {
    /// 1-based physical line on which this row starts
    pub line_number: usize,
    pub text: &'a str,
}

impl LogicalLine<'_> {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Decoded document
#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static Encoding,
    pub had_bom: bool,
}

/// Decode input bytes.
///
/// A BOM selects the encoding (UTF-8 or UTF-16) and is removed; without one
/// the input must be UTF-8. Malformed sequences are fatal, never replaced.
pub fn decode(bytes: &[u8]) -> Result<DecodedText> {
    let (encoding, body, had_bom) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..], true),
        None => (UTF_8, bytes, false),
    };

    let text = encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .ok_or_else(|| {
            ExchangeError::MalformedInput(format!(
                "input contains bytes that are not valid {}",
                encoding.name()
            ))
        })?;

    Ok(DecodedText {
        text: text.into_owned(),
        encoding,
        had_bom,
    })
}

/// First non-blank physical line, used to sniff the delimiter before the
/// text is split into logical lines
pub fn first_physical_line(text: &str) -> &str {
    text.split(|c: char| c == '\r' || c == '\n')
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
}

/// Split text into logical lines.
///
/// `\n`, `\r\n` and a lone `\r` end a line only outside a quoted field.
/// A `"` opens a quoted field only at the start of a field (leading
/// whitespace allowed), the same rule the tokenizer applies; elsewhere in an
/// unquoted cell it is a literal character. An escaped `""` inside a quoted
/// field keeps it open.
pub fn logical_lines(text: &str, delimiter: Delimiter) -> Result<Vec<LogicalLine<'_>>> {
    let delim = delimiter.as_char();
    let mut lines = Vec::new();
    let mut chars = text.char_indices().peekable();

    let mut in_quotes = false;
    let mut just_closed = false;
    let mut at_field_start = true;
    let mut quote_opened_on = 0usize;
    let mut physical_line = 1usize;
    let mut start = 0usize;
    let mut start_line = 1usize;

    while let Some((idx, c)) = chars.next() {
        if c == '\r' || c == '\n' {
            let mut end_of_break = idx + 1;
            if c == '\r' {
                if let Some(&(next_idx, '\n')) = chars.peek() {
                    chars.next();
                    end_of_break = next_idx + 1;
                }
            }

            if !in_quotes {
                lines.push(LogicalLine {
                    line_number: start_line,
                    text: &text[start..idx],
                });
                start = end_of_break;
                start_line = physical_line + 1;
                at_field_start = true;
                just_closed = false;
            }
            physical_line += 1;
            continue;
        }

        if in_quotes {
            if c == '"' {
                in_quotes = false;
                just_closed = true;
            }
            continue;
        }

        if c == '"' && (just_closed || at_field_start) {
            // a quote right after a closing quote is an escaped `""`
            if !just_closed {
                quote_opened_on = physical_line;
            }
            in_quotes = true;
            at_field_start = false;
        } else if c == delim {
            at_field_start = true;
        } else if !c.is_whitespace() {
            at_field_start = false;
        }
        just_closed = false;
    }

    if in_quotes {
        return Err(ExchangeError::MalformedInput(format!(
            "quoted field opened on line {} is never closed",
            quote_opened_on
        )));
    }

    if start < text.len() {
        lines.push(LogicalLine {
            line_number: start_line,
            text: &text[start..],
        });
    }

    Ok(lines)
}
