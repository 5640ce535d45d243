//! In-memory tables.

use crate::error::{Error, Result};
use crate::value::Value;
use serde::Serialize;
use std::collections::HashSet;

/// One record; holds exactly one value per declared column.
pub type Row = Vec<Value>;

/// An ordered sequence of rows sharing one column list.
///
/// Construction validates the shape, so every row always has a value
/// (possibly [`Value::Null`]) for every column. Narrowing operations return
/// a new table and keep the relative order of rows and columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table, rejecting duplicate column names and ragged rows.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(Error::invalid_input(format!(
                    "duplicate column name '{name}'"
                )));
            }
        }
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != columns.len())
        {
            return Err(Error::invalid_input(format!(
                "row {idx} has {} values, expected {}",
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Convenience constructor from string slices.
    pub fn from_parts(columns: &[&str], rows: Vec<Row>) -> Result<Self> {
        Self::new(columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Like [`column_index`](Self::column_index) but fails with a
    /// configuration error naming the missing column.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| Error::config(format!("column '{name}' not present in table")))
    }

    /// Iterate over the values of one column.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Fail with [`Error::InvalidInput`] when the table has no columns.
    pub fn ensure_has_columns(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(Error::invalid_input("table has no columns"));
        }
        Ok(())
    }

    /// New table holding the given rows, in the order given.
    pub fn with_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// New table holding only the rows for which `keep` returns true.
    pub fn filter_rows(&self, mut keep: impl FnMut(&Row) -> bool) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// New table without the named columns. Unknown names are ignored.
    pub fn without_columns(&self, drop: &[String]) -> Self {
        let keep: Vec<usize> = (0..self.columns.len())
            .filter(|&i| !drop.contains(&self.columns[i]))
            .collect();
        Self {
            columns: keep.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// Append the rows of another table with an identical header.
    pub fn concat(mut self, other: Table) -> Result<Self> {
        if self.columns != other.columns {
            return Err(Error::invalid_input(format!(
                "cannot combine tables with different headers: [{}] vs [{}]",
                self.columns.join(", "),
                other.columns.join(", ")
            )));
        }
        self.rows.extend(other.rows);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_parts(
            &["store", "sales", "region"],
            vec![
                vec!["s1".into(), Value::Int(10), "north".into()],
                vec!["s2".into(), Value::Int(20), "south".into()],
                vec!["s3".into(), Value::Null, "north".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = Table::from_parts(&["a", "b"], vec![vec![Value::Int(1)]]).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn rejects_duplicate_columns() {
        assert!(Table::from_parts(&["a", "a"], vec![]).is_err());
    }

    #[test]
    fn with_rows_keeps_requested_order() {
        let t = sample().with_rows(&[2, 0]);
        assert_eq!(t.rows()[0][0], Value::Text("s3".into()));
        assert_eq!(t.rows()[1][0], Value::Text("s1".into()));
    }

    #[test]
    fn without_columns_preserves_order() {
        let t = sample().without_columns(&["sales".to_string()]);
        assert_eq!(t.columns(), &["store".to_string(), "region".to_string()]);
        assert_eq!(t.rows()[1], vec![Value::from("s2"), Value::from("south")]);
    }

    #[test]
    fn concat_requires_same_header() {
        let a = sample();
        let b = Table::from_parts(&["x"], vec![]).unwrap();
        assert!(a.clone().concat(b).is_err());
        assert_eq!(a.clone().concat(sample()).unwrap().num_rows(), 6);
    }

    #[test]
    fn require_column_is_config_error() {
        assert!(sample().require_column("missing").unwrap_err().is_config());
        assert_eq!(sample().require_column("region").unwrap(), 2);
    }
}
