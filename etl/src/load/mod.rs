//! Load stage: write the output table as CSV.
//!
//! Header row first, no index column, `,` delimiter, `\n` line endings and
//! quoting only where a field needs it. Writing the same table twice yields
//! identical bytes.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{LoadError, LoadResult};
use crate::logs::{log_info, log_success};
use crate::transform::table::{cell_text, Table};

/// Outcome of [`load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub path: PathBuf,
    pub rows: usize,
    /// A file already existed at `path` and was overwritten
    pub replaced: bool,
}

/// Serialize `table` as CSV into `writer`.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = WriterBuilder::new()
        .delimiter(b',')
        .terminator(Terminator::Any(b'\n'))
        .quote_style(QuoteStyle::Necessary)
        .from_writer(writer);

    csv_writer.write_record(table.columns())?;
    for row in table.rows() {
        csv_writer.write_record(row.iter().map(|cell| cell_text(cell).into_owned()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write `table` to `save_path`, replacing any existing file.
pub fn load(table: &Table, save_path: &Path) -> LoadResult<LoadReport> {
    let replaced = save_path.exists();
    if replaced {
        log_info(format!("'{}' already exists. Replacing the file...", save_path.display()));
    }

    let file = File::create(save_path).map_err(|source| LoadError::Io {
        path: save_path.to_path_buf(),
        source,
    })?;
    write_csv(table, BufWriter::new(file)).map_err(|source| LoadError::Csv {
        path: save_path.to_path_buf(),
        source,
    })?;

    log_success(format!("File saved successfully as '{}'.", save_path.display()));
    Ok(LoadReport {
        path: save_path.to_path_buf(),
        rows: table.len(),
        replaced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::capture;
    use serde_json::{json, Value};

    fn output_table() -> Table {
        Table::from_rows(
            vec!["id".into(), "iso2".into(), "country".into(), "area".into()],
            vec![
                vec![Value::Null, json!("US"), json!("United States"), json!("9833517")],
                vec![json!("KOR"), json!("KR"), json!("Korea, Rep."), json!(100210)],
            ],
        )
    }

    #[test]
    fn test_write_csv_format() {
        let mut buf = Vec::new();
        write_csv(&output_table(), &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "id,iso2,country,area\n,US,United States,9833517\nKOR,KR,\"Korea, Rep.\",100210\n"
        );
    }

    #[test]
    fn test_header_only_when_empty() {
        let mut buf = Vec::new();
        write_csv(&Table::new(vec!["iso2".into(), "area".into()]), &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "iso2,area\n");
    }

    #[test]
    fn test_load_twice_is_identical_and_reports_replace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged_countries_data.csv");

        let first = load(&output_table(), &path).unwrap();
        let first_bytes = std::fs::read(&path).unwrap();
        assert!(!first.replaced);
        assert_eq!(first.rows, 2);

        let second = load(&output_table(), &path).unwrap();
        let second_bytes = std::fs::read(&path).unwrap();
        assert!(second.replaced);
        assert_eq!(first_bytes, second_bytes);
    }

    #[test]
    fn test_replace_notice_only_on_second_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged_countries_data.csv");
        let notice = format!("'{}' already exists. Replacing the file...", path.display());
        let saved = format!("File saved successfully as '{}'.", path.display());

        let (first, first_log) = capture(|| load(&output_table(), &path).unwrap());
        assert!(!first.replaced);
        assert!(!first_log.contains(&notice));
        assert!(first_log.contains(&saved));

        let (second, second_log) = capture(|| load(&output_table(), &path).unwrap());
        assert!(second.replaced);
        assert!(second_log.contains(&notice));
        assert!(second_log.contains(&saved));
        assert!(second_log.find(&notice) < second_log.find(&saved));
    }

    #[test]
    fn test_load_truncates_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "x\n".repeat(1000)).unwrap();

        load(&output_table(), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("id,iso2,country,area\n"));
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_missing_parent_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");
        let err = load(&output_table(), &path).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
