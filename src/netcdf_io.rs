//! NetCDF I/O: encoding composed datasets to disk and reading reference arrays
//!
//! Encoding rules are applied per variable before anything is written:
//! time-like variables take their units from the dataset's `base_time_unit`
//! attribute and the `noleap` calendar, `date` is always a 32-bit integer,
//! and other floating and integer variables receive the sentinel fill values
//! expected by downstream tools.

use crate::calendar::reference_year;
use crate::dataset::{ArrayData, Attributes, SyntheticDataset, Variable};
use crate::errors::{Result, SyntheticError};
use chrono::Utc;
use ndarray::{ArrayD, IxDyn};
use netcdf::{create, AttributeValue, File};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;
use std::{fs, path::Path};
use tracing::{debug, warn};

/// Units used for time-like variables when the dataset does not set any
pub const DEFAULT_TIME_UNITS: &str = "days since 0001-01-01";

/// Fill value for floating-point variables and float-encoded times
pub const FLOAT_FILL_VALUE: f64 = 1.0e20;

/// Fill value for integer variables
pub const INT_FILL_VALUE: i32 = -999;

/// Variables encoded against the dataset's time units
pub const TIME_VARIABLES: [&str; 4] = ["time", "time_bnds", "average_T1", "average_T2"];

/// Storage type for time-like variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeDtype {
    /// 64-bit float with a 1e20 fill value
    #[default]
    Float,
    /// 32-bit integer, no fill value
    Int,
}

impl FromStr for TimeDtype {
    type Err = SyntheticError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "float" => Ok(Self::Float),
            "int" => Ok(Self::Int),
            _ => Err(SyntheticError::InvalidArgument {
                message: format!("time dtype must be 'float' or 'int', got '{}'", s),
            }),
        }
    }
}

impl fmt::Display for TimeDtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float => f.write_str("float"),
            Self::Int => f.write_str("int"),
        }
    }
}

/// On-disk values of one variable
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedValues {
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
    Int32(ArrayD<i32>),
}

/// Fill value attached to an encoded variable
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillValue {
    Float32(f32),
    Float64(f64),
    Int32(i32),
}

/// A variable after encoding rules are applied
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedVariable {
    pub name: String,
    pub dims: Vec<String>,
    pub values: EncodedValues,
    pub fill_value: Option<FillValue>,
    pub attrs: Attributes,
}

fn time_units(dset: &SyntheticDataset) -> (String, i32) {
    let units = dset
        .attr_str("base_time_unit")
        .unwrap_or(DEFAULT_TIME_UNITS)
        .to_string();
    let year = reference_year(&units).unwrap_or(1);
    (units, year)
}

fn to_i32(values: &ArrayD<f64>, name: &str) -> Result<ArrayD<i32>> {
    if let Some(bad) = values.iter().find(|v| v.fract() != 0.0 || !v.is_finite()) {
        return Err(SyntheticError::EncodingError(format!(
            "'{}' holds non-integral time value {} and cannot be stored as int",
            name, bad
        )));
    }
    Ok(values.mapv(|v| v as i32))
}

/// Apply the encoding rules to every variable of a dataset
pub fn encode_dataset(dset: &SyntheticDataset, time_dtype: TimeDtype) -> Result<Vec<EncodedVariable>> {
    let (units, ref_year) = time_units(dset);
    let mut encoded = Vec::new();

    for (name, var) in dset.variables() {
        let mut attrs = var.attrs.clone();
        let (values, fill_value) = match &var.data {
            ArrayData::DateTime(times) => {
                let days = times.mapv(|t| t.days_since_year(ref_year));
                attrs.insert("units".into(), units.clone().into());
                attrs.insert("calendar".into(), "noleap".into());
                let is_time_var = TIME_VARIABLES.contains(&name);
                match time_dtype {
                    TimeDtype::Int => (EncodedValues::Int32(to_i32(&days, name)?), None),
                    TimeDtype::Float if is_time_var => (
                        EncodedValues::Float64(days),
                        Some(FillValue::Float64(FLOAT_FILL_VALUE)),
                    ),
                    TimeDtype::Float => (EncodedValues::Float64(days), None),
                }
            }
            ArrayData::Int32(values) if name == "date" => (EncodedValues::Int32(values.clone()), None),
            // missing values are stored as the declared fill
            ArrayData::Float32(values) => {
                let fill = FLOAT_FILL_VALUE as f32;
                (
                    EncodedValues::Float32(values.mapv(|v| if v.is_nan() { fill } else { v })),
                    Some(FillValue::Float32(fill)),
                )
            }
            ArrayData::Float64(values) => (
                EncodedValues::Float64(
                    values.mapv(|v| if v.is_nan() { FLOAT_FILL_VALUE } else { v }),
                ),
                Some(FillValue::Float64(FLOAT_FILL_VALUE)),
            ),
            ArrayData::Int32(values) => (
                EncodedValues::Int32(values.clone()),
                Some(FillValue::Int32(INT_FILL_VALUE)),
            ),
            // Durations are neither float nor integer typed: no fill value
            ArrayData::TimeDelta(days) => (EncodedValues::Float64(days.clone()), None),
        };

        encoded.push(EncodedVariable {
            name: name.to_string(),
            dims: var.dims.clone(),
            values,
            fill_value,
            attrs,
        });
    }
    Ok(encoded)
}

/// Convert a JSON attribute value into a NetCDF attribute
pub fn json_to_attribute(value: &JsonValue) -> Option<AttributeValue> {
    match value {
        JsonValue::String(s) => Some(AttributeValue::Str(s.clone())),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Some(
                i32::try_from(i)
                    .map(AttributeValue::Int)
                    .unwrap_or(AttributeValue::Double(i as f64)),
            ),
            None => n.as_f64().map(AttributeValue::Double),
        },
        JsonValue::Bool(b) => Some(AttributeValue::Int(*b as i32)),
        JsonValue::Array(items) if !items.is_empty() && items.iter().all(|v| v.is_number()) => Some(
            AttributeValue::Doubles(items.iter().filter_map(|v| v.as_f64()).collect()),
        ),
        JsonValue::Array(items) if !items.is_empty() && items.iter().all(|v| v.is_string()) => Some(
            AttributeValue::Strs(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
        ),
        _ => None,
    }
}

/// Convert a NetCDF attribute into a JSON value
pub fn attribute_to_json(value: AttributeValue) -> Option<JsonValue> {
    match value {
        AttributeValue::Str(val) => Some(val.into()),
        AttributeValue::Strs(vals) => Some(vals.into()),
        AttributeValue::Float(val) => Some((val as f64).into()),
        AttributeValue::Floats(vals) => Some(vals.into_iter().map(|v| v as f64).collect()),
        AttributeValue::Double(val) => Some(val.into()),
        AttributeValue::Doubles(vals) => Some(vals.into()),
        AttributeValue::Int(val) => Some(val.into()),
        AttributeValue::Ints(vals) => Some(vals.into()),
        AttributeValue::Short(val) => Some(val.into()),
        AttributeValue::Shorts(vals) => Some(vals.into()),
        _ => None,
    }
}

/// Read a whole variable as f64 together with its dimensions and attributes
pub fn read_variable(file: &File, name: &str) -> Result<Variable> {
    let var = file
        .variable(name)
        .ok_or_else(|| SyntheticError::VariableNotFound {
            var: name.to_string(),
        })?;

    let dims: Vec<String> = var.dimensions().iter().map(|d| d.name().to_string()).collect();
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    let values: Vec<f64> = var.get_values::<f64, _>(..)?;
    let data = ArrayD::from_shape_vec(IxDyn(&shape), values)?;

    let mut attrs = Attributes::new();
    for attr in var.attributes() {
        if let Some(value) = attribute_to_json(attr.value()?) {
            attrs.insert(attr.name().to_string(), value);
        }
    }

    Ok(Variable {
        dims,
        data: ArrayData::Float64(data),
        attrs,
    })
}

/// Writes a composed dataset to a NetCDF file
pub struct NetCDFWriter<'a> {
    output_path: &'a Path,
    time_dtype: TimeDtype,
}

impl<'a> NetCDFWriter<'a> {
    pub fn new(output_path: &'a Path) -> Self {
        Self {
            output_path,
            time_dtype: TimeDtype::default(),
        }
    }

    pub fn with_time_dtype(mut self, time_dtype: TimeDtype) -> Self {
        self.time_dtype = time_dtype;
        self
    }

    /// Encode and write every variable plus the global attributes
    pub fn write(&self, dset: &SyntheticDataset) -> Result<()> {
        let encoded = encode_dataset(dset, self.time_dtype)?;

        if self.output_path.exists() {
            fs::remove_file(self.output_path)?;
        }
        let mut file = create(self.output_path)?;

        for (dim_name, dim_len) in dset.dims() {
            file.add_dimension(&dim_name, dim_len)?;
        }

        for enc in &encoded {
            let dim_refs: Vec<&str> = enc.dims.iter().map(|s| s.as_str()).collect();
            let mut var = match &enc.values {
                EncodedValues::Float32(_) => file.add_variable::<f32>(&enc.name, &dim_refs)?,
                EncodedValues::Float64(_) => file.add_variable::<f64>(&enc.name, &dim_refs)?,
                EncodedValues::Int32(_) => file.add_variable::<i32>(&enc.name, &dim_refs)?,
            };

            match enc.fill_value {
                Some(FillValue::Float32(fv)) => {
                    var.put_attribute("_FillValue", fv)?;
                }
                Some(FillValue::Float64(fv)) => {
                    var.put_attribute("_FillValue", fv)?;
                }
                Some(FillValue::Int32(fv)) => {
                    var.put_attribute("_FillValue", fv)?;
                }
                None => {}
            }

            match &enc.values {
                EncodedValues::Float32(a) => {
                    let values: Vec<f32> = a.iter().copied().collect();
                    var.put_values(&values, ..)?;
                }
                EncodedValues::Float64(a) => {
                    let values: Vec<f64> = a.iter().copied().collect();
                    var.put_values(&values, ..)?;
                }
                EncodedValues::Int32(a) => {
                    let values: Vec<i32> = a.iter().copied().collect();
                    var.put_values(&values, ..)?;
                }
            }

            for (key, value) in &enc.attrs {
                match json_to_attribute(value) {
                    Some(attr) => {
                        var.put_attribute(key, attr)?;
                    }
                    None => warn!("Skipped unsupported attribute type for '{}:{}'", enc.name, key),
                }
            }
        }

        for (key, value) in &dset.attrs {
            match json_to_attribute(value) {
                Some(attr) => {
                    file.add_attribute(key, attr)?;
                }
                None => warn!("Skipped unsupported global attribute type for '{}'", key),
            }
        }

        file.add_attribute(
            "history",
            format!("Created by mdtf-synthetic on {}", Utc::now().to_rfc3339()),
        )?;

        debug!(
            "Wrote {} variables to {}",
            encoded.len(),
            self.output_path.display()
        );
        Ok(())
    }
}

/// Write a dataset to `outfile` with the requested time storage type
pub fn write_to_netcdf(dset: &SyntheticDataset, outfile: &Path, time_dtype: TimeDtype) -> Result<()> {
    NetCDFWriter::new(outfile).with_time_dtype(time_dtype).write(dset)
}
