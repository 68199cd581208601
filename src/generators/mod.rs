//! Random field kernels and their registry
//!
//! A kernel turns a horizontal shape and a sample count into an eagerly
//! materialized array. Kernels own their random stream: each call builds a
//! [`RandomState`] from an explicit seed, so identical arguments always give
//! bit-identical output.

pub mod convective;
pub mod normal;
pub mod random_state;

pub use random_state::RandomState;

use crate::errors::{Result, SyntheticError};
use ndarray::ArrayD;
use serde::Deserialize;

/// Keyword arguments accepted by the kernels
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct KernelArgs {
    /// `(mean, std)` profiles, one per vertical level
    pub stats: Option<Vec<(f64, f64)>>,
    /// Output selector for multi-output kernels
    pub varname: Option<String>,
}

/// Kernel signature: `(ny, nx)`, sample count, arguments
pub type Kernel = fn((usize, usize), usize, &KernelArgs) -> Result<ArrayD<f64>>;

/// Registered kernels by name
pub const REGISTRY: &[(&str, Kernel)] = &[
    ("normal", normal::normal),
    ("convective", convective::convective),
];

/// Look up a kernel by name
pub fn lookup(name: &str) -> Result<Kernel> {
    REGISTRY
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, kernel)| *kernel)
        .ok_or_else(|| SyntheticError::UnknownGenerator {
            name: name.to_string(),
        })
}

/// Names of every registered kernel
pub fn kernel_names() -> Vec<&'static str> {
    REGISTRY.iter().map(|(n, _)| *n).collect()
}

/// Run a registered kernel and cast its output to f32
pub fn generate_random_array(
    xyshape: (usize, usize),
    ntimes: usize,
    generator: &str,
    args: &KernelArgs,
) -> Result<ArrayD<f32>> {
    let kernel = lookup(generator)?;
    let data = kernel(xyshape, ntimes, args)?;
    Ok(data.mapv(|v| v as f32))
}

pub(crate) fn seed_from(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| SyntheticError::InvalidArgument {
        message: format!("seed {} exceeds the 32-bit range", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kernel_is_rejected() {
        let err = generate_random_array((2, 2), 1, "uniform", &KernelArgs::default()).unwrap_err();
        assert!(matches!(err, SyntheticError::UnknownGenerator { ref name } if name == "uniform"));
        assert_eq!(kernel_names(), vec!["normal", "convective"]);
        assert!(err.to_string().ends_with("(available: normal, convective)"));
    }

    #[test]
    fn output_is_single_precision() {
        let out = generate_random_array((3, 4), 2, "normal", &KernelArgs::default()).unwrap();
        assert_eq!(out.shape(), &[2, 1, 3, 4]);
    }
}
