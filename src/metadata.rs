//! Diagnostic query over written datasets
//!
//! Reads a variable back from a NetCDF file and reduces it to one
//! `(mean, std)` pair per vertical level, averaging over time and both
//! horizontal axes. Levels are reduced in parallel on Rayon's pool.

use crate::errors::{Result, SyntheticError};
use crate::netcdf_io::{read_variable, FLOAT_FILL_VALUE};
use ndarray::{ArrayD, ArrayViewD, Axis, Slice};
use netcdf::File;
use rayon::prelude::*;
use std::path::Path;
use tracing::debug;

/// Names of every variable in a file, in file order
pub fn list_variables(path: &Path) -> Result<Vec<String>> {
    let file = netcdf::open(path)?;
    Ok(file.variables().map(|v| v.name()).collect())
}

/// Per-level `(mean, std)` of a variable.
///
/// The level axis is the one between `time` and the two horizontal axes, if
/// any; a variable without one yields a single pair. `limit` keeps only the
/// first N time samples. NaN and fill values are skipped, and the standard
/// deviation is the population one.
pub fn dataset_stats(path: &Path, var: &str, limit: Option<usize>) -> Result<Vec<(f64, f64)>> {
    let file = netcdf::open(path)?;
    let variable = read_variable(&file, var)?;
    let mut data = variable
        .data
        .to_f64()
        .ok_or_else(|| SyntheticError::VariableNotFound {
            var: var.to_string(),
        })?;

    let has_time = variable.dims.first().map(String::as_str) == Some("time");
    if let (true, Some(n)) = (has_time, limit) {
        let n = n.min(data.shape()[0]);
        data.slice_axis_inplace(Axis(0), Slice::from(..n));
    }

    let leading = data.ndim().saturating_sub(2);
    let level_axis = match (leading, has_time) {
        (2, _) => Some(1),
        (1, false) => Some(0),
        _ => None,
    };
    debug!(
        "Reducing '{}' with dims {:?} over {} threads",
        var,
        variable.dims,
        rayon::current_num_threads()
    );

    Ok(array_stats(&data, level_axis))
}

fn is_valid(v: f64) -> bool {
    v.is_finite() && (v - FLOAT_FILL_VALUE).abs() > FLOAT_FILL_VALUE * 1e-6
}

/// Population mean and standard deviation of the valid values
fn mean_std(values: ArrayViewD<'_, f64>) -> (f64, f64) {
    let (sum, count) = values
        .iter()
        .filter(|v| is_valid(**v))
        .fold((0.0_f64, 0_usize), |(s, c), &v| (s + v, c + 1));
    if count == 0 {
        return (f64::NAN, f64::NAN);
    }
    let mean = sum / count as f64;
    let var = values
        .iter()
        .filter(|v| is_valid(**v))
        .map(|&v| (v - mean).powi(2))
        .sum::<f64>()
        / count as f64;
    (mean, var.sqrt())
}

/// Prints global attributes and variables of a NetCDF file.
pub fn print_metadata(file: &File) -> Result<()> {
    println!("\n===== Global Attributes =====");
    for attr in file.attributes() {
        println!("- {}: {:?}", attr.name(), attr.value()?);
    }

    println!("\n===== Variables =====");
    for var in file.variables() {
        let dims: Vec<String> = var
            .dimensions()
            .iter()
            .map(|d| format!("{}[{}]", d.name(), d.len()))
            .collect();
        println!("- {} ({})", var.name(), dims.join(", "));
    }

    Ok(())
}

/// Prints the per-level statistics of one variable
pub fn print_level_stats(var: &str, stats: &[(f64, f64)]) {
    println!("\n Statistics for Variable: {}", var);
    println!("================================");
    for (level, (mean, std)) in stats.iter().enumerate() {
        println!("   level {:>3}: mean {:>14.6}  std {:>14.6}", level, mean, std);
    }
}

/// Per-level statistics of an array already in memory
pub fn array_stats(data: &ArrayD<f64>, level_axis: Option<usize>) -> Vec<(f64, f64)> {
    match level_axis {
        Some(axis) => (0..data.shape()[axis])
            .into_par_iter()
            .map(|level| mean_std(data.index_axis(Axis(axis), level)))
            .collect(),
        None => vec![mean_std(data.view())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, IxDyn};

    #[test]
    fn fill_and_nan_are_skipped() {
        let data = ArrayD::from_shape_vec(
            IxDyn(&[4]),
            vec![1.0, 3.0, f64::NAN, FLOAT_FILL_VALUE],
        )
        .unwrap();
        let stats = array_stats(&data, None);
        assert_eq!(stats, vec![(2.0, 1.0)]);
    }

    #[test]
    fn per_level_reduction() {
        let mut data = Array3::<f64>::zeros((2, 3, 3));
        data.index_axis_mut(Axis(0), 1).fill(5.0);
        let stats = array_stats(&data.into_dyn(), Some(0));
        assert_eq!(stats, vec![(0.0, 0.0), (5.0, 0.0)]);
    }

    #[test]
    fn all_invalid_gives_nan() {
        let data = ArrayD::from_elem(IxDyn(&[2, 2]), f64::NAN);
        let (mean, std) = array_stats(&data, None)[0];
        assert!(mean.is_nan() && std.is_nan());
    }
}
