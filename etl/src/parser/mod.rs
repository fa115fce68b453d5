//! Reference CSV parser with encoding auto-detection.
//!
//! Reads CSV bytes into a [`Table`]. Every cell keeps its exact text; empty
//! cells become null. No country-specific logic here.

use serde_json::Value;
use std::collections::HashMap;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::transform::table::Table;

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed rows
    pub table: Table,
    /// Detected encoding
    pub encoding: String,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding.
///
/// A leading byte order mark is stripped. Unknown labels fall back to UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let codec = encoding_rs::Encoding::for_label(encoding.as_bytes()).unwrap_or(encoding_rs::UTF_8);
    let (decoded, used, had_errors) = codec.decode(bytes);
    if had_errors {
        return Err(CsvError::Encoding(format!(
            "content is not valid {}",
            used.name()
        )));
    }
    Ok(decoded.into_owned())
}

/// Parse CSV text into a table.
///
/// ```ignore
/// use country_etl::parser::parse_csv_str;
///
/// let table = parse_csv_str("iso2,area\nUS,9833517\n")?;
/// assert_eq!(table.get(0, "area").unwrap(), "9833517");
/// ```
pub fn parse_csv_str(content: &str) -> CsvResult<Table> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }
    check_quotes(content)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let header = reader.headers().map_err(|e| malformed(1, &e))?.clone();
    if header.is_empty() || header.iter().all(|h| h.trim().is_empty()) {
        return Err(CsvError::NoHeaders);
    }
    let columns = dedupe_headers(header.iter());
    let width = columns.len();

    let mut table = Table::new(columns);
    for result in reader.records() {
        let record = result.map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or(0);
            malformed(line, &e)
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        if record.len() > width {
            return Err(CsvError::Malformed {
                line,
                message: format!("expected {} fields, saw {}", width, record.len()),
            });
        }

        let row = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    Value::Null
                } else {
                    Value::String(field.to_string())
                }
            })
            .collect();
        table.push_row(row);
    }

    Ok(table)
}

/// Reject a quoted field that is still open at end of input.
///
/// The `csv` reader reads such a field up to EOF and swallows every row
/// after it.
fn check_quotes(content: &str) -> CsvResult<()> {
    let mut line: u64 = 1;
    let mut opened_at: Option<u64> = None;
    let mut field_start = true;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match opened_at {
            Some(_) => {
                if c == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                    } else {
                        opened_at = None;
                    }
                } else if c == '\n' {
                    line += 1;
                }
            }
            None => match c {
                '"' if field_start => {
                    opened_at = Some(line);
                    field_start = false;
                }
                ',' => field_start = true,
                '\n' => {
                    line += 1;
                    field_start = true;
                }
                '\r' => field_start = true,
                _ => field_start = false,
            },
        }
    }

    match opened_at {
        Some(line) => Err(CsvError::Malformed {
            line,
            message: "quoted field is never closed".to_string(),
        }),
        None => Ok(()),
    }
}

fn malformed(line: u64, err: &csv::Error) -> CsvError {
    CsvError::Malformed { line, message: err.to_string() }
}

/// Make header names unique: repeats become `name.1`, `name.2`, ...
fn dedupe_headers<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let base = name.to_string();
        let count = seen.entry(base.clone()).or_insert(0);
        if *count == 0 {
            out.push(base);
        } else {
            let mut candidate = format!("{}.{}", base, count);
            while out.contains(&candidate) {
                *count += 1;
                candidate = format!("{}.{}", base, count);
            }
            out.push(candidate);
        }
        *count += 1;
    }
    out
}

/// Parse CSV bytes with auto-detection of encoding.
///
/// Valid UTF-8 is taken as is; detection only runs for other content.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    let encoding = match std::str::from_utf8(bytes) {
        Ok(_) => "utf-8".to_string(),
        Err(_) => detect_encoding(bytes),
    };
    let content = decode_content(bytes, &encoding)?;
    let table = parse_csv_str(&content)?;
    Ok(ParseResult { table, encoding })
}

/// Parse a CSV file with auto-detection of encoding.
///
/// A missing file is reported as [`CsvError::NotFound`].
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == IoErrorKind::NotFound {
            CsvError::NotFound(path.to_path_buf())
        } else {
            CsvError::Io { path: path.to_path_buf(), source }
        }
    })?;
    parse_bytes_auto(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_csv() {
        let table = parse_csv_str("iso2,continents,area\nUS,North America,9833517\nFR,Europe,551695").unwrap();

        assert_eq!(table.columns(), &["iso2", "continents", "area"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "continents"), Some(&json!("North America")));
        assert_eq!(table.get(1, "area"), Some(&json!("551695")));
    }

    #[test]
    fn test_values_kept_verbatim() {
        let table = parse_csv_str("iso2,longitude,name\nUS,-77.0369, United States \n").unwrap();
        assert_eq!(table.get(0, "longitude"), Some(&json!("-77.0369")));
        assert_eq!(table.get(0, "name"), Some(&json!(" United States ")));
    }

    #[test]
    fn test_quoted_values() {
        let csv = "iso2,country\nKR,\"Korea, Republic of\"\n";
        let table = parse_csv_str(csv).unwrap();
        assert_eq!(table.get(0, "country"), Some(&json!("Korea, Republic of")));
    }

    #[test]
    fn test_missing_values_are_null() {
        let table = parse_csv_str("a,b,c\n1,,3\n4").unwrap();
        assert_eq!(table.get(0, "b"), Some(&Value::Null));
        assert_eq!(table.get(1, "c"), Some(&Value::Null));
    }

    #[test]
    fn test_empty_lines_skipped() {
        let table = parse_csv_str("a,b\n1,2\n\n3,4\n").unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_too_many_fields_rejected() {
        let err = parse_csv_str("a,b\n1,2\n1,2,3\n").unwrap_err();
        match err {
            CsvError::Malformed { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("expected 2 fields"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unclosed_quote_rejected() {
        let err = parse_csv_str("iso2,area\nUS,\"123\nFR,5\n").unwrap_err();
        match err {
            CsvError::Malformed { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("never closed"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_multiline_and_escaped_quotes_accepted() {
        let csv = "iso2,note\nUS,\"line one\nline \"\"two\"\"\"\nFR,ok\n";
        let table = parse_csv_str(csv).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "note"), Some(&json!("line one\nline \"two\"")));
        assert_eq!(table.get(1, "iso2"), Some(&json!("FR")));
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_csv_str(""), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_csv_str("  \n"), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_duplicate_headers_renamed() {
        let table = parse_csv_str("name,name,name\nA,B,C\n").unwrap();
        assert_eq!(table.columns(), &["name", "name.1", "name.2"]);
    }

    #[test]
    fn test_bom_stripped() {
        let bytes = b"\xEF\xBB\xBFiso2,area\nUS,1\n";
        let result = parse_bytes_auto(bytes).unwrap();
        assert_eq!(result.table.columns()[0], "iso2");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let err = decode_content(&[0x66, 0xFF, 0xFE, 0x6F], "utf-8").unwrap_err();
        assert!(matches!(err, CsvError::Encoding(_)));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = parse_csv_file_auto("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, CsvError::NotFound(_)));
    }
}
