//! Tabular import: delimited text in, set log out.
//!
//! The header row defines field names; every data row becomes one record.
//! Fields are quote-aware (RFC 4180 style: `""` escapes a quote, delimiters
//! and newlines are literal inside quotes).

use thiserror::Error;

use crate::core::{Kind, Record, SetLog};

/// Import failures. All fatal; the reader never repairs a malformed row.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("row {row} has {got} fields, header defines {expected}")]
    ColumnCount {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("row {row} has an unterminated quoted field")]
    UnterminatedQuote { row: usize },
}

/// Read delimited text into a log of the given kind.
///
/// Header cells are trimmed; an empty header cell discards that column
/// (alignment of the remaining columns is preserved). Data cells are trimmed
/// of surrounding whitespace. A row whose field count differs from the
/// header's is a fatal error. Empty input yields an empty log.
pub fn read_csv(input: &str, kind: Kind) -> Result<SetLog, ImportError> {
    let mut log = SetLog::new(kind);
    log.comment = "imported from csv".to_string();

    let rows = parse_rows(input)?;
    let Some((header, data)) = rows.split_first() else {
        return Ok(log);
    };

    let width = header.len();
    let columns: Vec<(usize, String)> = header
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| {
            let key = cell.trim();
            (!key.is_empty()).then(|| (i, key.to_string()))
        })
        .collect();

    for (n, raw) in data.iter().enumerate() {
        if raw.len() != width {
            return Err(ImportError::ColumnCount {
                row: n + 2,
                expected: width,
                got: raw.len(),
            });
        }
        let mut record = Record::new();
        for (i, key) in &columns {
            record.set(key.clone(), raw[*i].trim());
        }
        log.append_records([record]);
    }

    Ok(log)
}

/// Split input into rows of raw (untrimmed) fields.
fn parse_rows(input: &str) -> Result<Vec<Vec<String>>, ImportError> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    // `quoted` marks that the current field was opened with a quote, so an
    // empty `""` field at end of row is still emitted.
    let mut quoted = false;
    let mut in_quotes = false;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !quoted => {
                quoted = true;
                in_quotes = true;
            }
            ',' => {
                row.push(std::mem::take(&mut field));
                quoted = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
                quoted = false;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(ImportError::UnterminatedQuote { row: rows.len() + 1 });
    }
    if !field.is_empty() || !row.is_empty() || quoted {
        row.push(field);
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ID;

    #[test]
    fn header_and_rows_are_trimmed() {
        let log = read_csv("@id , name \n 1 , Alice \n2,Bob\n", Kind::Base).unwrap();
        assert_eq!(log.kind, Kind::Base);
        assert_eq!(log.comment, "imported from csv");
        assert_eq!(log.records.len(), 2);
        assert_eq!(log.records[0].id(), "1");
        assert_eq!(log.records[0].value("name"), "Alice");
        assert_eq!(log.records[1].value("name"), "Bob");
        assert!(log.check());
    }

    #[test]
    fn empty_header_cell_discards_the_column() {
        let log = read_csv("@id,,name\n1,junk,Alice\n", Kind::Base).unwrap();
        assert_eq!(log.records.len(), 1);
        assert_eq!(log.records[0].len(), 2);
        assert_eq!(log.records[0].value("name"), "Alice");
    }

    #[test]
    fn quoted_fields_keep_delimiters_and_newlines() {
        let input = "@id,note\n1,\"a, b\"\n2,\"line one\nline two\"\n3,\"he said \"\"hi\"\"\"\n";
        let log = read_csv(input, Kind::Base).unwrap();
        assert_eq!(log.records[0].value("note"), "a, b");
        assert_eq!(log.records[1].value("note"), "line one\nline two");
        assert_eq!(log.records[2].value("note"), "he said \"hi\"");
    }

    #[test]
    fn wrong_column_count_is_fatal() {
        let err = read_csv("@id,name\n1\n", Kind::Base).unwrap_err();
        assert_eq!(
            err,
            ImportError::ColumnCount {
                row: 2,
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn unterminated_quote_is_fatal() {
        let err = read_csv("@id,note\n1,\"oops\n", Kind::Base).unwrap_err();
        assert!(matches!(err, ImportError::UnterminatedQuote { .. }));
    }

    #[test]
    fn empty_input_yields_empty_log() {
        let log = read_csv("", Kind::Mutate).unwrap();
        assert_eq!(log.kind, Kind::Mutate);
        assert!(log.records.is_empty());
    }

    #[test]
    fn crlf_and_missing_trailing_newline() {
        let log = read_csv("@id,name\r\n1,Alice\r\n2,Bob", Kind::Base).unwrap();
        assert_eq!(log.records.len(), 2);
        assert_eq!(log.records[1].value("name"), "Bob");
    }

    #[test]
    fn empty_quoted_field_at_end_of_row() {
        let log = read_csv("@id,name\n1,\"\"\n", Kind::Base).unwrap();
        assert_eq!(log.records.len(), 1);
        assert_eq!(log.records[0].value("name"), "");
    }

    #[test]
    fn reserved_id_header_is_just_a_column() {
        let log = read_csv("name,@id\nAlice,1\n", Kind::Base).unwrap();
        assert_eq!(log.records[0].id(), "1");
        assert_eq!(log.records[0].value(ID), "1");
    }
}
