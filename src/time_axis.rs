//! Time axis construction for monthly, daily and sub-daily output.
//!
//! Axes are built in the no-leap calendar. Each builder produces a
//! [`TimeAxis`] (samples plus contiguous bounds), which is rendered into a
//! dataset fragment carrying the convention's variables: `time`, `time_bnds`
//! and either the GFDL averaging triplet or the NCAR `date` field.

use crate::calendar::{days_of_year, NoLeapDateTime};
use crate::convention::Convention;
use crate::dataset::{str_attrs, ArrayData, SyntheticDataset, Variable};
use crate::errors::{Result, SyntheticError};
use ndarray::{Array1, ArrayD, IxDyn};
use std::fmt;
use std::str::FromStr;

/// Sampling frequency of a time axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeResolution {
    Monthly,
    Daily,
    /// Sub-daily with the given hour step
    Hourly(u32),
}

impl TimeResolution {
    /// Keyword used in directory and file names
    pub fn keyword(&self) -> String {
        match self {
            Self::Monthly => "mon".to_string(),
            Self::Daily => "day".to_string(),
            Self::Hourly(h) => format!("{}hr", h),
        }
    }
}

impl FromStr for TimeResolution {
    type Err = SyntheticError;

    fn from_str(s: &str) -> Result<Self> {
        let unknown = || SyntheticError::UnknownTimeResolution {
            name: s.to_string(),
        };
        match s {
            "mon" => Ok(Self::Monthly),
            "day" => Ok(Self::Daily),
            _ => {
                let hours: u32 = s
                    .strip_suffix("hr")
                    .and_then(|h| h.parse().ok())
                    .ok_or_else(unknown)?;
                if hours == 0 || 24 % hours != 0 {
                    return Err(unknown());
                }
                Ok(Self::Hourly(hours))
            }
        }
    }
}

impl fmt::Display for TimeResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.keyword())
    }
}

/// Samples and their `(start, end)` bounds
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    pub times: Vec<NoLeapDateTime>,
    pub bounds: Vec<(NoLeapDateTime, NoLeapDateTime)>,
}

impl TimeAxis {
    /// Pair consecutive edges into bounds; one bound pair per sample is required
    pub fn from_edges(times: Vec<NoLeapDateTime>, edges: &[NoLeapDateTime]) -> Result<Self> {
        let bounds: Vec<_> = edges.windows(2).map(|w| (w[0], w[1])).collect();
        if bounds.len() != times.len() {
            return Err(SyntheticError::DimensionMismatch {
                dim: "time".to_string(),
                expected: times.len(),
                found: bounds.len(),
            });
        }
        if times.is_empty() {
            return Err(SyntheticError::InvalidArgument {
                message: "time axis must contain at least one sample".to_string(),
            });
        }
        Ok(Self { times, bounds })
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Every bound ends where the next one starts
    pub fn is_contiguous(&self) -> bool {
        self.bounds.windows(2).all(|w| w[0].1 == w[1].0)
    }

    /// `"days since YYYY-01-01"` for the year of the first sample
    pub fn base_time_unit(&self) -> String {
        let year = self.times.first().map(|t| t.year).unwrap_or(1);
        format!("days since {:04}-01-01", year)
    }

    /// Render the axis as dataset variables in the convention's layout
    pub fn to_dataset(&self, convention: Convention) -> Result<SyntheticDataset> {
        let n = self.len();
        let bnds_dim = convention.time_bounds_dim();
        let mut dset = SyntheticDataset::new();

        let times = ArrayData::DateTime(Array1::from(self.times.clone()).into_dyn());
        dset.insert(
            "time",
            Variable::new(&["time"], times)?.with_attrs(convention.time_attrs()),
        )?;

        let flat: Vec<NoLeapDateTime> = self.bounds.iter().flat_map(|&(a, b)| [a, b]).collect();
        let bounds = ArrayD::from_shape_vec(IxDyn(&[n, 2]), flat)?;
        dset.insert(
            "time_bnds",
            Variable::new(&["time", bnds_dim], ArrayData::DateTime(bounds))?
                .with_attrs(convention.time_bounds_attrs()),
        )?;

        match convention {
            Convention::Gfdl => {
                let starts: Vec<_> = self.bounds.iter().map(|b| b.0).collect();
                let ends: Vec<_> = self.bounds.iter().map(|b| b.1).collect();
                let spans: Vec<f64> = self
                    .bounds
                    .iter()
                    .map(|(a, b)| {
                        (b.hours_since_year(a.year) - a.hours_since_year(a.year)) as f64 / 24.0
                    })
                    .collect();
                dset.insert(
                    "average_T1",
                    Variable::new(&["time"], ArrayData::DateTime(Array1::from(starts).into_dyn()))?
                        .with_attrs(str_attrs(&[("long_name", "Start time for average period")])),
                )?;
                dset.insert(
                    "average_T2",
                    Variable::new(&["time"], ArrayData::DateTime(Array1::from(ends).into_dyn()))?
                        .with_attrs(str_attrs(&[("long_name", "End time for average period")])),
                )?;
                dset.insert(
                    "average_DT",
                    Variable::new(&["time"], ArrayData::TimeDelta(Array1::from(spans).into_dyn()))?
                        .with_attrs(str_attrs(&[
                            ("long_name", "Length of average period"),
                            ("units", "days"),
                        ])),
                )?;
            }
            Convention::Ncar => {
                let dates: Vec<i32> = self.times.iter().map(|t| t.yyyymmdd()).collect();
                dset.insert(
                    "date",
                    Variable::new(&["time"], ArrayData::Int32(Array1::from(dates).into_dyn()))?
                        .with_attrs(str_attrs(&[("long_name", "current date (YYYYMMDD)")])),
                )?;
            }
            Convention::Cmip => {}
        }

        dset.set_attr("base_time_unit", self.base_time_unit());
        Ok(dset)
    }
}

fn require_years(nyears: u32) -> Result<()> {
    if nyears == 0 {
        return Err(SyntheticError::InvalidArgument {
            message: "nyears must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Monthly axis covering `nyears` years from `startyear`.
///
/// The series is built one year longer than requested. NCAR samples sit on
/// the first of the month and drop the first sample and the last eleven, so
/// each timestamp marks the end of its averaging interval. Other conventions
/// sample the 15th and keep the first `12 * nyears` months. Bounds always
/// drop the last eleven month starts of the extended series.
pub fn generate_monthly_time_axis(
    startyear: i32,
    nyears: u32,
    convention: Convention,
) -> Result<TimeAxis> {
    require_years(nyears)?;
    let extended = nyears as i32 + 1;
    let months: Vec<(i32, u32)> = (0..extended)
        .flat_map(|y| (1..=12).map(move |m| (startyear + y, m)))
        .collect();

    let day = convention.monthly_sample_day();
    let samples: Vec<NoLeapDateTime> = months
        .iter()
        .map(|&(y, m)| NoLeapDateTime::ymd(y, m, day))
        .collect();
    let samples = match convention {
        Convention::Ncar => samples[1..samples.len() - 11].to_vec(),
        Convention::Gfdl | Convention::Cmip => samples[..samples.len() - 12].to_vec(),
    };

    let edges: Vec<NoLeapDateTime> = months
        .iter()
        .map(|&(y, m)| NoLeapDateTime::ymd(y, m, 1))
        .collect();
    TimeAxis::from_edges(samples, &edges[..edges.len() - 11])
}

/// Daily axis: every no-leap day, at noon for GFDL and midnight otherwise
pub fn generate_daily_time_axis(
    startyear: i32,
    nyears: u32,
    convention: Convention,
) -> Result<TimeAxis> {
    require_years(nyears)?;
    let hour = convention.daily_sample_hour();
    let days: Vec<NoLeapDateTime> = (0..nyears as i32)
        .flat_map(|y| days_of_year(startyear + y))
        .collect();

    let samples = days
        .iter()
        .map(|d| NoLeapDateTime::ymdh(d.year, d.month, d.day, hour))
        .collect();
    let mut edges = days;
    edges.push(NoLeapDateTime::ymd(startyear + nyears as i32, 1, 1));
    TimeAxis::from_edges(samples, &edges)
}

/// Sub-daily axis with `24 / dhour` samples per day.
///
/// Bounds come from the sample list with a synthetic opening boundary at
/// `startyear-01-01 00:00` prepended, so the first bound is zero-length and
/// bound `i` spans samples `i-1..i`.
pub fn generate_hourly_time_axis(
    startyear: i32,
    nyears: u32,
    dhour: u32,
) -> Result<TimeAxis> {
    require_years(nyears)?;
    if dhour == 0 || 24 % dhour != 0 {
        return Err(SyntheticError::InvalidSpacing {
            message: format!("hour step {} does not evenly divide 24", dhour),
        });
    }

    let samples: Vec<NoLeapDateTime> = (0..nyears as i32)
        .flat_map(|y| days_of_year(startyear + y))
        .flat_map(|d| {
            (0..24)
                .step_by(dhour as usize)
                .map(move |h| NoLeapDateTime::ymdh(d.year, d.month, d.day, h))
        })
        .collect();

    // The closing (startyear + nyears, 1, 1, dhour) boundary is dropped again
    // to align the bound count with the sample count.
    let mut edges = Vec::with_capacity(samples.len() + 1);
    edges.push(NoLeapDateTime::ymdh(startyear, 1, 1, 0));
    edges.extend(samples.iter().copied());
    TimeAxis::from_edges(samples, &edges)
}

/// Build the axis for a resolution keyword
pub fn generate_time_axis(
    resolution: TimeResolution,
    startyear: i32,
    nyears: u32,
    convention: Convention,
) -> Result<TimeAxis> {
    match resolution {
        TimeResolution::Monthly => generate_monthly_time_axis(startyear, nyears, convention),
        TimeResolution::Daily => generate_daily_time_axis(startyear, nyears, convention),
        TimeResolution::Hourly(h) => generate_hourly_time_axis(startyear, nyears, h),
    }
}

/// Render explicit sample and boundary lists as a convention dataset
pub fn times_from_tuples(
    times: Vec<NoLeapDateTime>,
    edges: &[NoLeapDateTime],
    convention: Convention,
) -> Result<SyntheticDataset> {
    TimeAxis::from_edges(times, edges)?.to_dataset(convention)
}
