//! Column-oriented table with named numeric and text columns.

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::IoError;

/// Values of one column.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ColumnData {
    /// Floating point values.
    Numeric(Vec<f64>),
    /// Categorical or free-form text values.
    Text(Vec<String>),
}

impl ColumnData {
    fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    /// Create a numeric column.
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    /// Create a text column.
    pub fn text(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Text(values),
        }
    }

    /// Return the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the column values.
    #[must_use]
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Return the values if this is a numeric column.
    #[must_use]
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Text(_) => None,
        }
    }

    /// Return the values if this is a text column.
    #[must_use]
    pub fn as_text(&self) -> Option<&[String]> {
        match &self.data {
            ColumnData::Text(v) => Some(v),
            ColumnData::Numeric(_) => None,
        }
    }

    /// Return the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Return `true` if the column holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the value at `row` as a [`Cell`].
    #[must_use]
    pub fn cell(&self, row: usize) -> Option<Cell<'_>> {
        match &self.data {
            ColumnData::Numeric(v) => v.get(row).copied().map(Cell::Number),
            ColumnData::Text(v) => v.get(row).map(|s| Cell::Text(s.as_str())),
        }
    }
}

/// A single table value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    /// Numeric value.
    Number(f64),
    /// Text value.
    Text(&'a str),
}

impl std::fmt::Display for Cell<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// An ordered collection of equal-length named columns.
///
/// Column order is fixed at construction; rows are addressed by position.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Build a table from columns.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::DuplicateColumn`] | two columns share a name |
    /// | [`IoError::ColumnLengthMismatch`] | columns differ in length |
    pub fn new(columns: Vec<Column>) -> Result<Self, IoError> {
        let n_rows = columns.first().map_or(0, Column::len);
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(IoError::DuplicateColumn {
                    name: column.name.clone(),
                });
            }
            if column.len() != n_rows {
                return Err(IoError::ColumnLengthMismatch {
                    column: column.name.clone(),
                    expected: n_rows,
                    got: column.len(),
                });
            }
        }
        Ok(Self { columns, n_rows })
    }

    /// Build a one-row table of numeric values.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::DuplicateColumn`] if `names` repeats a name, or
    /// [`IoError::ColumnLengthMismatch`] if `names` and `values` differ in length.
    pub fn from_numeric_row(names: &[&str], values: &[f64]) -> Result<Self, IoError> {
        if names.len() != values.len() {
            return Err(IoError::ColumnLengthMismatch {
                column: names.last().map_or_else(String::new, |s| (*s).to_string()),
                expected: names.len(),
                got: values.len(),
            });
        }
        let columns = names
            .iter()
            .zip(values)
            .map(|(name, &v)| Column::numeric(*name, vec![v]))
            .collect();
        Self::new(columns)
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Return the number of columns.
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Return `true` if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Return the columns in order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Return the column names in order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Look up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Look up a column by name, failing with [`IoError::MissingColumn`].
    ///
    /// # Errors
    ///
    /// Returns [`IoError::MissingColumn`] if no column has that name.
    pub fn require(&self, name: &str) -> Result<&Column, IoError> {
        self.column(name).ok_or_else(|| IoError::MissingColumn {
            name: name.to_string(),
            available: self.column_names().into_iter().map(String::from).collect(),
        })
    }

    /// Project the table onto `names`, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::MissingColumn`] for the first name not present.
    pub fn select(&self, names: &[&str]) -> Result<Table, IoError> {
        let columns = names
            .iter()
            .map(|name| self.require(name).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        Table::new(columns)
    }

    /// Return the cells of one row, in column order.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<Vec<Cell<'_>>> {
        if index >= self.n_rows {
            return None;
        }
        self.columns.iter().map(|c| c.cell(index)).collect()
    }

    /// Render the table as an HTML `<table>` with a leading row-index column.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table border=\"1\" class=\"dataframe\">\n  <thead>\n    <tr style=\"text-align: right;\">\n      <th></th>\n");
        for column in &self.columns {
            let _ = writeln!(html, "      <th>{}</th>", escape_html(column.name()));
        }
        html.push_str("    </tr>\n  </thead>\n  <tbody>\n");
        for i in 0..self.n_rows {
            let _ = writeln!(html, "    <tr>\n      <th>{i}</th>");
            for column in &self.columns {
                let value = column.cell(i).map(|c| c.to_string()).unwrap_or_default();
                let _ = writeln!(html, "      <td>{}</td>", escape_html(&value));
            }
            html.push_str("    </tr>\n");
        }
        html.push_str("  </tbody>\n</table>");
        html
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
