//! Coupled temperature, moisture and precipitation fields.
//!
//! One stream seeded with the sample count feeds a cascade: column
//! temperature, saturation water vapour, column water vapour and finally
//! precipitation. Each stage draws from the stream after its predecessors,
//! so requesting a downstream output computes every upstream one.

use super::{seed_from, KernelArgs, RandomState};
use crate::errors::{Result, SyntheticError};
use ndarray::{ArrayD, IxDyn, Zip};

/// Output names the kernel can produce
pub const OUTPUTS: [&str; 4] = ["tave", "qsat_int", "cwv", "pr"];

/// mm/hr to m/s
const MM_PER_HOUR_TO_M_PER_S: f64 = 1.0 / 3.6e6;

pub fn convective(xyshape: (usize, usize), ntimes: usize, args: &KernelArgs) -> Result<ArrayD<f64>> {
    let varname = args.varname.as_deref().unwrap_or("missing");
    let stage = OUTPUTS
        .iter()
        .position(|&n| n == varname)
        .ok_or_else(|| SyntheticError::InvalidOutputName {
            generator: "convective".to_string(),
            name: varname.to_string(),
        })?;

    let mut rs = RandomState::new(seed_from(ntimes)?);
    let shape = IxDyn(&[ntimes, xyshape.0, xyshape.1]);

    // K
    let tave = ArrayD::from_shape_simple_fn(shape.clone(), || {
        rs.binomial(10, 0.5) as f64 + 265.0
    });
    if stage == 0 {
        return Ok(tave);
    }

    // mm
    let qsat_int = tave.mapv(|t| 57.0 + (t - 268.0) * (82.0 - 57.0) / (274.0 - 268.0));
    if stage == 1 {
        return Ok(qsat_int);
    }

    // mm
    let chi = ArrayD::from_shape_simple_fn(shape.clone(), || rs.chisquare(4.0));
    let cwv = Zip::from(&qsat_int).and(&chi).map_collect(|&q, &c| {
        let w = q - 2.0 * c;
        if w <= 0.0 {
            q
        } else {
            w
        }
    });
    if stage == 2 {
        return Ok(cwv);
    }

    // m/s
    let noise = ArrayD::from_shape_simple_fn(shape, || rs.normal(0.0, 0.5));
    let pr = Zip::from(&cwv)
        .and(&tave)
        .and(&noise)
        .map_collect(|&w, &t, &z| {
            let w_minus_wc = w - (50.0 + (t - 268.0) * (67.0 - 50.0) / (274.0 - 268.0));
            MM_PER_HOUR_TO_M_PER_S * ((1.0 + (0.6 * w_minus_wc).exp()).ln() + 0.2 * z)
        });
    Ok(pr)
}
