//! Token estimation for tables.
//!
//! Uses a character-based heuristic: ~4 characters per token by default.
//! A table is measured as if serialized compactly:
//!
//! ```text
//! store,region,sales\n
//! s1,north,120\n
//! ```
//!
//! Adding a row or a column can only add characters, so the estimate is
//! monotonic. [`Footprint`] caches per-row and per-column widths so the
//! reduction engine can size candidate subsets without re-rendering.

use datasift_core::{Error, Result, Table};

/// Default characters per token.
pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;

/// Round-up division of characters into tokens.
fn chars_to_tokens(chars: usize, chars_per_token: usize) -> usize {
    chars.div_ceil(chars_per_token)
}

/// Estimates the serialized size of a table in model tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenEstimator {
    chars_per_token: usize,
}

impl TokenEstimator {
    pub fn new(chars_per_token: usize) -> Result<Self> {
        if chars_per_token == 0 {
            return Err(Error::config("chars_per_token must be positive"));
        }
        Ok(Self { chars_per_token })
    }

    pub fn chars_per_token(&self) -> usize {
        self.chars_per_token
    }

    /// Estimate tokens for a whole table.
    ///
    /// Zero columns is [`Error::InvalidInput`]; zero rows is 0 tokens.
    pub fn estimate(&self, table: &Table) -> Result<usize> {
        Ok(self.footprint(table)?.tokens(self.chars_per_token))
    }

    /// Estimate tokens for a subset of rows, given by index.
    pub fn estimate_rows(&self, table: &Table, rows: &[usize]) -> Result<usize> {
        let footprint = self.footprint(table)?;
        Ok(chars_to_tokens(
            footprint.rows_chars(rows.iter().copied()),
            self.chars_per_token,
        ))
    }

    /// Measure a table once for repeated subset estimates.
    pub fn footprint(&self, table: &Table) -> Result<Footprint> {
        Footprint::measure(table)
    }

    pub fn tokens(&self, chars: usize) -> usize {
        chars_to_tokens(chars, self.chars_per_token)
    }
}

impl Default for TokenEstimator {
    fn default() -> Self {
        Self {
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
        }
    }
}

/// Cached character widths of one table.
#[derive(Debug, Clone)]
pub struct Footprint {
    /// Header line length including separators and newline.
    header_chars: usize,
    /// Rendered length of every row including separators and newline.
    row_chars: Vec<usize>,
    /// Name length of every column.
    column_name_chars: Vec<usize>,
    /// Total rendered length of every column's cells.
    column_cell_chars: Vec<usize>,
}

impl Footprint {
    pub fn measure(table: &Table) -> Result<Self> {
        table.ensure_has_columns()?;
        let ncols = table.num_columns();
        // separators between cells plus the trailing newline
        let line_overhead = ncols;

        let column_name_chars: Vec<usize> = table.columns().iter().map(|c| c.len()).collect();
        let header_chars = column_name_chars.iter().sum::<usize>() + line_overhead;

        let mut column_cell_chars = vec![0usize; ncols];
        let row_chars = table
            .rows()
            .iter()
            .map(|row| {
                let mut width = line_overhead;
                for (c, value) in row.iter().enumerate() {
                    let len = value.rendered_len();
                    column_cell_chars[c] += len;
                    width += len;
                }
                width
            })
            .collect();

        Ok(Self {
            header_chars,
            row_chars,
            column_name_chars,
            column_cell_chars,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.row_chars.len()
    }

    /// Characters of the header plus the given rows; 0 when no rows are given.
    pub fn rows_chars(&self, rows: impl IntoIterator<Item = usize>) -> usize {
        let mut total = 0;
        let mut any = false;
        for r in rows {
            total += self.row_chars[r];
            any = true;
        }
        if any { self.header_chars + total } else { 0 }
    }

    /// Characters of the whole table.
    pub fn total_chars(&self) -> usize {
        self.rows_chars(0..self.num_rows())
    }

    /// Characters of the whole table restricted to the given columns.
    pub fn columns_chars(&self, columns: &[usize]) -> usize {
        let nrows = self.num_rows();
        if nrows == 0 || columns.is_empty() {
            return 0;
        }
        let names: usize = columns.iter().map(|&c| self.column_name_chars[c]).sum();
        let cells: usize = columns.iter().map(|&c| self.column_cell_chars[c]).sum();
        let overhead = columns.len();
        (names + overhead) + cells + nrows * overhead
    }

    pub fn tokens(&self, chars_per_token: usize) -> usize {
        chars_to_tokens(self.total_chars(), chars_per_token)
    }
}
