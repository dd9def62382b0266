//! Plain text storage of a `ParamSet`.
//!
//! Every tensor is a table: one row per line, values separated by whitespace, no header. The
//! shapes are not stored, they come from the configured `Dims` when loading.

use std::{fs, path::Path};

use log::info;
use ndarray::{Array2, ArrayView2};

use crate::{
    MlErr, Result,
    arch::{Dims, ParamSet, TENSOR_NAMES},
};

/// Formats a matrix as a table. `{:.17e}` keeps enough digits to read back the exact `f64`.
pub fn write_table(tensor: ArrayView2<f64>) -> String {
    let mut table = String::with_capacity(tensor.len() * 25);

    for row in tensor.rows() {
        let values: Vec<_> = row.iter().map(|value| format!("{value:.17e}")).collect();
        table.push_str(&values.join(" "));
        table.push('\n');
    }

    table
}

/// Parses a table of any shape into its rows. Blank lines are ignored.
///
/// # Arguments
/// * `name` - How to refer to the table in errors.
/// * `text` - The table contents.
///
/// # Errors
/// `MlErr::MalformedTable` if a value is not a number or the rows have different lengths.
pub fn parse_rows(name: &str, text: &str) -> Result<Vec<Vec<f64>>> {
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let malformed = |reason: String| MlErr::MalformedTable {
            table: name.to_string(),
            line: i + 1,
            reason,
        };

        let row = line
            .split_whitespace()
            .map(|v| v.parse::<f64>().map_err(|e| malformed(format!("{v:?}: {e}"))))
            .collect::<Result<Vec<_>>>()?;

        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(malformed(format!(
                    "expected {} values, found {}",
                    first.len(),
                    row.len()
                )));
            }
        }

        rows.push(row);
    }

    Ok(rows)
}

/// Parses a table that must have exactly `shape` rows and columns.
///
/// # Errors
/// `MlErr::MalformedTable` if the text is not a table, `MlErr::SizeMismatch` if its shape
/// differs from `shape`.
pub fn read_table(name: &'static str, text: &str, shape: (usize, usize)) -> Result<Array2<f64>> {
    let rows = parse_rows(name, text)?;

    if rows.len() != shape.0 {
        return Err(MlErr::SizeMismatch {
            what: name,
            got: rows.len(),
            expected: shape.0,
        });
    }

    let cols = rows.first().map_or(0, Vec::len);
    if cols != shape.1 {
        return Err(MlErr::SizeMismatch {
            what: name,
            got: cols,
            expected: shape.1,
        });
    }

    let values = rows.into_iter().flatten().collect();
    Array2::from_shape_vec(shape, values).map_err(|_| MlErr::SizeMismatch {
        what: name,
        got: cols,
        expected: shape.1,
    })
}

/// Returns the four tables of `params`, in `W1`, `b1`, `W2`, `b2` order.
pub fn serialize(params: &ParamSet) -> [String; 4] {
    params.tensors().map(write_table)
}

/// Rebuilds a `ParamSet` from the tables written by `serialize`.
///
/// # Errors
/// If any table is malformed or doesn't have the shape `dims` expects.
pub fn deserialize(tables: [&str; 4], dims: Dims) -> Result<ParamSet> {
    let [w1, b1, w2, b2] = dims.shapes();

    ParamSet::from_tensors(
        read_table(TENSOR_NAMES[0], tables[0], w1)?,
        read_table(TENSOR_NAMES[1], tables[1], b1)?,
        read_table(TENSOR_NAMES[2], tables[2], w2)?,
        read_table(TENSOR_NAMES[3], tables[3], b2)?,
    )
}

/// Writes `W1.txt`, `b1.txt`, `W2.txt` and `b2.txt` into `dir`, creating it if needed.
pub fn save(params: &ParamSet, dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    for (name, table) in TENSOR_NAMES.into_iter().zip(serialize(params)) {
        fs::write(dir.join(format!("{name}.txt")), table)?;
    }

    info!("parameters saved to {}", dir.display());
    Ok(())
}

/// Reads the tables written by `save` back from `dir`.
pub fn load(dir: impl AsRef<Path>, dims: Dims) -> Result<ParamSet> {
    let dir = dir.as_ref();
    let [w1, b1, w2, b2] =
        TENSOR_NAMES.map(|name| fs::read_to_string(dir.join(format!("{name}.txt"))));
    let (w1, b1, w2, b2) = (w1?, b1?, w2?, b2?);

    let params = deserialize([w1.as_str(), b1.as_str(), w2.as_str(), b2.as_str()], dims)?;
    info!("parameters loaded from {}", dir.display());
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn table_layout() {
        let table = write_table(array![[1., -0.5], [0.25, 2e-8]].view());
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].split_whitespace().count(), 2);
        assert!(table.ends_with('\n'));
    }

    #[test]
    fn single_space_between_values() {
        let table = write_table(array![[1., -0.5], [0., 2.]].view());
        assert_eq!(
            table,
            "1.00000000000000000e0 -5.00000000000000000e-1\n\
             0.00000000000000000e0 2.00000000000000000e0\n"
        );
    }

    #[test]
    fn values_survive_exactly() {
        let tensor = array![[0.1, 1. / 3.], [-7.123456789012345e-12, f64::MAX]];
        let table = write_table(tensor.view());

        assert_eq!(read_table("t", &table, (2, 2)).unwrap(), tensor);
    }

    #[test]
    fn reads_numpy_savetxt_output() {
        let text = "1.000000000000000000e+00 -2.500000000000000000e-01\n";
        assert_eq!(read_table("b1", text, (1, 2)).unwrap(), array![[1., -0.25]]);
    }

    #[test]
    fn ragged_rows_fail() {
        let err = parse_rows("W1", "1 2\n3\n").unwrap_err();
        assert!(matches!(err, MlErr::MalformedTable { line: 2, .. }));
    }

    #[test]
    fn garbage_fails() {
        assert!(matches!(
            parse_rows("W1", "1 abc\n"),
            Err(MlErr::MalformedTable { line: 1, .. })
        ));
    }

    #[test]
    fn wrong_shape_fails() {
        assert!(matches!(
            read_table("W2", "1 2\n3 4\n", (3, 2)),
            Err(MlErr::SizeMismatch {
                what: "W2",
                got: 2,
                expected: 3
            })
        ));
        assert!(read_table("W2", "1 2\n3 4\n", (2, 3)).is_err());
    }
}
