//! Pulling features and labels out of a [`Table`].

use std::collections::BTreeSet;

use rarity_io::Table;

use crate::error::{MachineError, SchemaProblem};

/// Feature columns, in the order the classifier sees them.
pub const FEATURE_COLUMNS: [&str; 4] = ["Level", "Health", "Energy", "Sanity"];

/// The label column.
pub const TARGET_COLUMN: &str = "Rarity";

fn mismatch(column: &str, problem: SchemaProblem) -> MachineError {
    MachineError::SchemaMismatch {
        column: column.to_string(),
        problem,
    }
}

/// Read `names` as numeric columns and transpose them into rows.
///
/// Other columns of `table` are ignored.
pub(crate) fn feature_rows(table: &Table, names: &[String]) -> Result<Vec<Vec<f64>>, MachineError> {
    let columns = names
        .iter()
        .map(|name| {
            table
                .column(name)
                .ok_or_else(|| mismatch(name, SchemaProblem::Missing))?
                .as_numeric()
                .ok_or_else(|| mismatch(name, SchemaProblem::NotNumeric))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((0..table.n_rows())
        .map(|i| columns.iter().map(|col| col[i]).collect())
        .collect())
}

/// Read the label column and encode it against the sorted distinct names.
pub(crate) fn encode_labels(table: &Table) -> Result<(Vec<String>, Vec<usize>), MachineError> {
    let raw = table
        .column(TARGET_COLUMN)
        .ok_or_else(|| mismatch(TARGET_COLUMN, SchemaProblem::Missing))?
        .as_text()
        .ok_or_else(|| mismatch(TARGET_COLUMN, SchemaProblem::NotText))?;

    let classes: Vec<String> = raw
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let labels = raw
        .iter()
        .map(|name| classes.binary_search(name).unwrap_or_default())
        .collect();
    Ok((classes, labels))
}

/// Require that `table` holds exactly `names`, in order.
pub(crate) fn check_prediction_columns(table: &Table, names: &[String]) -> Result<(), MachineError> {
    let found = table.column_names();
    for (position, expected) in names.iter().enumerate() {
        match found.get(position) {
            Some(name) if *name == expected.as_str() => {}
            _ if found.contains(&expected.as_str()) => {
                return Err(mismatch(expected, SchemaProblem::OutOfOrder));
            }
            _ => return Err(mismatch(expected, SchemaProblem::Missing)),
        }
    }
    if let Some(extra) = found.get(names.len()) {
        return Err(mismatch(extra, SchemaProblem::Unexpected));
    }
    Ok(())
}
