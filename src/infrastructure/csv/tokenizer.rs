// ============================================================
// ROW TOKENIZER
// ============================================================
// Split one logical line into fields with a small state machine

use std::fmt;

use crate::domain::csv::Delimiter;

/// Why a logical line could not be split into fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    /// A quoted field reaches the end of the line without its closing quote
    UnterminatedQuote { column: usize },

    /// Something other than a delimiter follows a closing quote
    TextAfterQuote { column: usize, found: char },
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizeError::UnterminatedQuote { column } => {
                write!(f, "column {}: quoted field is not closed", column)
            }
            TokenizeError::TextAfterQuote { column, found } => write!(
                f,
                "column {}: unexpected '{}' after closing quote",
                column, found
            ),
        }
    }
}

impl std::error::Error for TokenizeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    FieldStart,
    Unquoted,
    Quoted,
    /// Saw `"` inside a quoted field: either an escape or the closing quote
    QuoteInQuoted,
    AfterQuoted,
}

/// Split `line` into raw field values.
///
/// Quoted fields keep their content verbatim with `""` unescaped; unquoted
/// fields are trimmed.
pub fn tokenize(line: &str, delimiter: Delimiter) -> Result<Vec<String>, TokenizeError> {
    let delim = delimiter.as_char();
    let mut fields = Vec::new();
    let mut buf = String::new();
    let mut state = State::FieldStart;

    for c in line.chars() {
        state = match state {
            State::FieldStart => {
                if c == delim {
                    fields.push(String::new());
                    State::FieldStart
                } else if c == '"' {
                    State::Quoted
                } else if c.is_whitespace() {
                    State::FieldStart
                } else {
                    buf.push(c);
                    State::Unquoted
                }
            }
            State::Unquoted => {
                if c == delim {
                    fields.push(take_trimmed(&mut buf));
                    State::FieldStart
                } else {
                    buf.push(c);
                    State::Unquoted
                }
            }
            State::Quoted => {
                if c == '"' {
                    State::QuoteInQuoted
                } else {
                    buf.push(c);
                    State::Quoted
                }
            }
            State::QuoteInQuoted => {
                if c == '"' {
                    buf.push('"');
                    State::Quoted
                } else if c == delim {
                    fields.push(std::mem::take(&mut buf));
                    State::FieldStart
                } else if c.is_whitespace() {
                    State::AfterQuoted
                } else {
                    return Err(TokenizeError::TextAfterQuote {
                        column: fields.len() + 1,
                        found: c,
                    });
                }
            }
            State::AfterQuoted => {
                if c == delim {
                    fields.push(std::mem::take(&mut buf));
                    State::FieldStart
                } else if c.is_whitespace() {
                    State::AfterQuoted
                } else {
                    return Err(TokenizeError::TextAfterQuote {
                        column: fields.len() + 1,
                        found: c,
                    });
                }
            }
        };
    }

    match state {
        State::Quoted => {
            return Err(TokenizeError::UnterminatedQuote {
                column: fields.len() + 1,
            })
        }
        State::Unquoted => fields.push(take_trimmed(&mut buf)),
        State::FieldStart => fields.push(String::new()),
        State::QuoteInQuoted | State::AfterQuoted => fields.push(buf),
    }

    Ok(fields)
}

fn take_trimmed(buf: &mut String) -> String {
    let value = buf.trim_end().to_string();
    buf.clear();
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::csv::escape_field;

    #[test]
    fn test_plain_fields_are_trimmed() {
        let fields = tokenize("  Son ,  150000 ,x", Delimiter::Comma).unwrap();
        assert_eq!(fields, vec!["Son", "150000", "x"]);
    }

    #[test]
    fn test_quoted_delimiter_kept() {
        let fields = tokenize("\"Son, đỏ\",150000", Delimiter::Comma).unwrap();
        assert_eq!(fields, vec!["Son, đỏ", "150000"]);
    }

    #[test]
    fn test_doubled_quote_unescaped() {
        let fields = tokenize("\"Kem \"\"dưỡng\"\" da\",1", Delimiter::Comma).unwrap();
        assert_eq!(fields, vec!["Kem \"dưỡng\" da", "1"]);
    }

    #[test]
    fn test_quoted_whitespace_preserved() {
        let fields = tokenize("\"  padded  \" , next", Delimiter::Comma).unwrap();
        assert_eq!(fields, vec!["  padded  ", "next"]);
    }

    #[test]
    fn test_embedded_newline_in_quotes() {
        let fields = tokenize("a,\"line 1\nline 2\"", Delimiter::Comma).unwrap();
        assert_eq!(fields, vec!["a", "line 1\nline 2"]);
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(tokenize(",,", Delimiter::Comma).unwrap(), vec!["", "", ""]);
        assert_eq!(tokenize("", Delimiter::Comma).unwrap(), vec![""]);
        assert_eq!(tokenize("\"\",x", Delimiter::Comma).unwrap(), vec!["", "x"]);
    }

    #[test]
    fn test_semicolon_ignores_commas() {
        let fields = tokenize("Son, đỏ;150.000;ok", Delimiter::Semicolon).unwrap();
        assert_eq!(fields, vec!["Son, đỏ", "150.000", "ok"]);
    }

    #[test]
    fn test_tab_delimiter_is_not_skipped_as_whitespace() {
        let fields = tokenize("\ta\t\tb", Delimiter::Tab).unwrap();
        assert_eq!(fields, vec!["", "a", "", "b"]);
    }

    #[test]
    fn test_quote_inside_unquoted_field_is_literal() {
        let fields = tokenize("5\" screen,2", Delimiter::Comma).unwrap();
        assert_eq!(fields, vec!["5\" screen", "2"]);
    }

    #[test]
    fn test_text_after_closing_quote() {
        let err = tokenize("a,\"b\"c", Delimiter::Comma).unwrap_err();
        assert_eq!(err, TokenizeError::TextAfterQuote { column: 2, found: 'c' });
    }

    #[test]
    fn test_unterminated_quote() {
        let err = tokenize("a,\"open", Delimiter::Comma).unwrap_err();
        assert_eq!(err, TokenizeError::UnterminatedQuote { column: 2 });
    }

    #[test]
    fn test_escape_then_tokenize_is_identity() {
        let samples = [
            "Son, đỏ",
            "say \"hi\"",
            "multi\nline",
            "crlf\r\ninside",
            "\"",
            ",",
            "plain",
            "tab\tinside",
        ];
        for delimiter in [Delimiter::Comma, Delimiter::Semicolon, Delimiter::Tab] {
            for sample in samples {
                let escaped = escape_field(sample, delimiter).unwrap();
                let fields = tokenize(&escaped, delimiter).unwrap();
                assert_eq!(fields, vec![sample.to_string()], "delimiter {}", delimiter);
            }
        }
    }
}
