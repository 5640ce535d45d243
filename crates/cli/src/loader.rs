//! Delimited-file loader.
//!
//! Every input becomes one [`Table`]; several inputs are appended in the
//! order given and must share one header.

use csv::{ReaderBuilder, Trim};
use datasift_core::{Error, Result, Row, Table, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct TableLoader {
    delimiter: u8,
}

impl Default for TableLoader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl TableLoader {
    /// Comma for most files, tab for `.tsv`.
    pub fn for_path(path: &Path) -> Self {
        let tsv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
        if tsv {
            Self { delimiter: b'\t' }
        } else {
            Self::default()
        }
    }

    /// Parse delimited text; `origin` only labels error messages.
    pub fn parse_content(&self, content: &str, origin: &str) -> Result<Table> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(Trim::All)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| Error::invalid_input(format!("{origin}: failed to read header: {e}")))?
            .iter()
            .map(str::to_string)
            .collect();
        if headers.iter().all(String::is_empty) {
            return Err(Error::invalid_input(format!("{origin}: missing header row")));
        }

        let mut rows: Vec<Row> = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                Error::invalid_input(format!("{origin}: failed to parse row {}: {e}", index + 1))
            })?;
            rows.push(record.iter().map(Value::parse_cell).collect());
        }
        Table::new(headers, rows)
    }

    pub fn load_file(&self, path: &Path) -> Result<Table> {
        let bytes = std::fs::read(path).map_err(|e| {
            Error::invalid_input(format!("failed to read {}: {e}", path.display()))
        })?;
        let content = String::from_utf8_lossy(&bytes);
        let table = self.parse_content(&content, &path.display().to_string())?;
        debug!(
            rows = table.num_rows(),
            columns = table.num_columns(),
            "Loaded {}",
            path.display()
        );
        Ok(table)
    }
}

/// Load and append every input file.
pub fn load_tables(paths: &[PathBuf]) -> Result<Table> {
    let mut paths = paths.iter();
    let first = paths
        .next()
        .ok_or_else(|| Error::invalid_input("no input files given"))?;
    let mut table = TableLoader::for_path(first).load_file(first)?;
    for path in paths {
        let next = TableLoader::for_path(path).load_file(path)?;
        table = table.concat(next).map_err(|e| match e {
            Error::InvalidInput(msg) => Error::invalid_input(format!("{}: {msg}", path.display())),
            other => other,
        })?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn cells_parse_to_typed_values() {
        let table = TableLoader::default()
            .parse_content(
                "store_id,week_start,sales,open,notes\nS1, 2024-03-04 ,12.5,true,\n",
                "inline",
            )
            .unwrap();
        let row = &table.rows()[0];
        assert_eq!(row[0], Value::Text("S1".into()));
        assert_eq!(
            row[1],
            Value::Date(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap())
        );
        assert_eq!(row[2], Value::Float(12.5));
        assert_eq!(row[3], Value::Bool(true));
        assert_eq!(row[4], Value::Null);
    }

    #[test]
    fn ragged_rows_are_invalid_input() {
        let err = TableLoader::default()
            .parse_content("a,b\n1,2\n3\n", "inline")
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn empty_input_has_no_header() {
        let err = TableLoader::default().parse_content("", "inline").unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn multiple_files_are_appended() {
        let a = write_temp(".csv", "region,sales\nnorth,1\n");
        let b = write_temp(".tsv", "region\tsales\nsouth\t2\n");
        let table = load_tables(&[a.path().to_path_buf(), b.path().to_path_buf()]).unwrap();
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.rows()[1][0], Value::Text("south".into()));
    }

    #[test]
    fn header_mismatch_names_the_file() {
        let a = write_temp(".csv", "region,sales\nnorth,1\n");
        let b = write_temp(".csv", "region,units\nsouth,2\n");
        let err = load_tables(&[a.path().to_path_buf(), b.path().to_path_buf()]).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains(&b.path().display().to_string()));
    }

    #[test]
    fn missing_file_is_invalid_input() {
        let err = load_tables(&[PathBuf::from("/nonexistent/data.csv")]).unwrap_err();
        assert!(err.is_invalid_input());
    }
}
