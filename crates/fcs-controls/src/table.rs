//! Breakpoint tables with linear interpolation.

use fcs_props::PropertyStore;

use crate::error::{ControlError, ControlResult};
use crate::parameter::Parameter;

/// Lookup table indexed by one or two parameters.
///
/// Outside the breakpoint range the end values hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Table {
    OneD {
        row: Parameter,
        breakpoints: Vec<f64>,
        values: Vec<f64>,
    },
    TwoD {
        row: Parameter,
        column: Parameter,
        row_breakpoints: Vec<f64>,
        column_breakpoints: Vec<f64>,
        /// `values[row][column]`
        values: Vec<Vec<f64>>,
    },
}

impl Table {
    /// Build a 1-D table from `(breakpoint, value)` rows.
    pub fn one_d(row: Parameter, data: Vec<(f64, f64)>, component: &str) -> ControlResult<Self> {
        if data.is_empty() {
            return Err(ControlError::missing(component, "table data"));
        }
        let (breakpoints, values): (Vec<f64>, Vec<f64>) = data.into_iter().unzip();
        check_ascending(&breakpoints, component)?;
        Ok(Table::OneD {
            row,
            breakpoints,
            values,
        })
    }

    /// Build a 2-D table from a column header and `(breakpoint, row values)` rows.
    pub fn two_d(
        row: Parameter,
        column: Parameter,
        column_breakpoints: Vec<f64>,
        data: Vec<(f64, Vec<f64>)>,
        component: &str,
    ) -> ControlResult<Self> {
        if data.is_empty() || column_breakpoints.is_empty() {
            return Err(ControlError::missing(component, "table data"));
        }
        check_ascending(&column_breakpoints, component)?;
        let (row_breakpoints, values): (Vec<f64>, Vec<Vec<f64>>) = data.into_iter().unzip();
        check_ascending(&row_breakpoints, component)?;
        if let Some(bad) = values.iter().find(|r| r.len() != column_breakpoints.len()) {
            return Err(ControlError::invalid(
                component,
                "table",
                format!(
                    "row has {} values, expected {}",
                    bad.len(),
                    column_breakpoints.len()
                ),
            ));
        }
        Ok(Table::TwoD {
            row,
            column,
            row_breakpoints,
            column_breakpoints,
            values,
        })
    }

    /// Interpolated value at the current lookup parameters.
    pub fn value(&self, store: &PropertyStore) -> f64 {
        match self {
            Table::OneD {
                row,
                breakpoints,
                values,
            } => {
                let (i, f) = locate(breakpoints, row.value(store));
                lerp(values, i, f)
            }
            Table::TwoD {
                row,
                column,
                row_breakpoints,
                column_breakpoints,
                values,
            } => {
                let (ri, rf) = locate(row_breakpoints, row.value(store));
                let (ci, cf) = locate(column_breakpoints, column.value(store));
                let lower = lerp(&values[ri], ci, cf);
                if rf == 0.0 {
                    return lower;
                }
                let upper = lerp(&values[ri + 1], ci, cf);
                lower + rf * (upper - lower)
            }
        }
    }
}

fn check_ascending(breakpoints: &[f64], component: &str) -> ControlResult<()> {
    if breakpoints.iter().any(|b| !b.is_finite()) {
        return Err(ControlError::invalid(
            component,
            "table",
            "breakpoints must be finite",
        ));
    }
    if breakpoints.windows(2).any(|w| w[1] <= w[0]) {
        return Err(ControlError::invalid(
            component,
            "table",
            "breakpoints must be strictly ascending",
        ));
    }
    Ok(())
}

/// Segment index and fraction for `x`. The fraction is zero at or beyond the ends.
///
/// A NaN key gives a NaN fraction so the lookup yields NaN.
fn locate(breakpoints: &[f64], x: f64) -> (usize, f64) {
    let n = breakpoints.len();
    if n < 2 || x <= breakpoints[0] {
        return (0, 0.0);
    }
    if x.is_nan() {
        return (0, f64::NAN);
    }
    if x >= breakpoints[n - 1] {
        return (n - 1, 0.0);
    }
    let i = breakpoints.partition_point(|&b| b <= x) - 1;
    let f = (x - breakpoints[i]) / (breakpoints[i + 1] - breakpoints[i]);
    (i, f)
}

fn lerp(values: &[f64], i: usize, f: f64) -> f64 {
    if f == 0.0 {
        values[i]
    } else {
        values[i] + f * (values[i + 1] - values[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_d_interpolates_and_clamps() {
        let mut store = PropertyStore::new();
        let q = store.create("aero/qbar-psf");
        let table = Table::one_d(
            Parameter::property(q),
            vec![(0.0, 1.0), (10.0, 0.5), (20.0, 0.25)],
            "test",
        )
        .unwrap();

        store.set(q, 5.0);
        assert!((table.value(&store) - 0.75).abs() < 1e-12);
        store.set(q, -3.0);
        assert_eq!(table.value(&store), 1.0);
        store.set(q, 99.0);
        assert_eq!(table.value(&store), 0.25);
        store.set(q, 10.0);
        assert_eq!(table.value(&store), 0.5);
    }

    #[test]
    fn nan_key_yields_nan() {
        let mut store = PropertyStore::new();
        let q = store.create("aero/qbar-psf");
        let table = Table::one_d(
            Parameter::property(q),
            vec![(0.0, 1.0), (10.0, 0.5), (20.0, 0.25)],
            "test",
        )
        .unwrap();
        store.set(q, f64::NAN);
        assert!(table.value(&store).is_nan());
        store.set(q, f64::INFINITY);
        assert_eq!(table.value(&store), 0.25);
        store.set(q, f64::NEG_INFINITY);
        assert_eq!(table.value(&store), 1.0);
    }

    #[test]
    fn two_d_bilinear() {
        let mut store = PropertyStore::new();
        let r = store.create("r");
        let c = store.create("c");
        let table = Table::two_d(
            Parameter::property(r),
            Parameter::property(c),
            vec![0.0, 1.0],
            vec![(0.0, vec![0.0, 1.0]), (1.0, vec![2.0, 3.0])],
            "test",
        )
        .unwrap();
        store.set(r, 0.5);
        store.set(c, 0.5);
        assert!((table.value(&store) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_tables() {
        assert!(Table::one_d(Parameter::Constant(0.0), vec![], "t").is_err());
        assert!(
            Table::one_d(Parameter::Constant(0.0), vec![(1.0, 0.0), (1.0, 2.0)], "t").is_err()
        );
        assert!(
            Table::two_d(
                Parameter::Constant(0.0),
                Parameter::Constant(0.0),
                vec![0.0, 1.0],
                vec![(0.0, vec![1.0])],
                "t"
            )
            .is_err()
        );
    }
}
