//! Normally distributed fields with per-level statistics

use super::{seed_from, KernelArgs, RandomState};
use crate::errors::{Result, SyntheticError};
use ndarray::{ArrayD, IxDyn};

/// Profile used when no statistics are supplied
pub const DEFAULT_STATS: (f64, f64) = (1.0, 1.0);

/// Draw a `(ntimes, nprofiles, ny, nx)` field.
///
/// Sample `t` is drawn from a stream seeded with `t`; its profiles are drawn
/// in order from that same stream.
pub fn normal(xyshape: (usize, usize), ntimes: usize, args: &KernelArgs) -> Result<ArrayD<f64>> {
    let stats = args.stats.clone().unwrap_or_else(|| vec![DEFAULT_STATS]);
    if stats.is_empty() {
        return Err(SyntheticError::InvalidArgument {
            message: "normal generator needs at least one (mean, std) profile".to_string(),
        });
    }

    let (ny, nx) = xyshape;
    let plane = ny * nx;
    let mut data = Vec::with_capacity(ntimes * stats.len() * plane);
    for t in 0..ntimes {
        let mut rs = RandomState::new(seed_from(t)?);
        for &(mean, std) in &stats {
            data.extend((0..plane).map(|_| rs.normal(mean, std)));
        }
    }

    Ok(ArrayD::from_shape_vec(
        IxDyn(&[ntimes, stats.len(), ny, nx]),
        data,
    )?)
}
