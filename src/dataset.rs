//! In-memory dataset model shared by every builder.
//!
//! A [`SyntheticDataset`] is an ordered collection of named variables, each
//! carrying dimension names, typed array data and attributes, plus global
//! attributes. Dimensions are implied by the variables that use them; inserting
//! a variable whose dimension lengths disagree with what is already present is
//! rejected, so a dataset can never hold two different lengths for one name.

use crate::calendar::NoLeapDateTime;
use crate::errors::{Result, SyntheticError};
use ndarray::{Array1, ArrayD, IxDyn};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Attribute table for a variable or a dataset
pub type Attributes = BTreeMap<String, JsonValue>;

/// Build an attribute table from string pairs
pub fn str_attrs(pairs: &[(&str, &str)]) -> Attributes {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), JsonValue::from(*v)))
        .collect()
}

/// Typed array payload of a variable
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
    Int32(ArrayD<i32>),
    /// Calendar timestamps, encoded numerically at write time
    DateTime(ArrayD<NoLeapDateTime>),
    /// Interval lengths in days
    TimeDelta(ArrayD<f64>),
}

impl ArrayData {
    pub fn shape(&self) -> &[usize] {
        match self {
            ArrayData::Float32(a) => a.shape(),
            ArrayData::Float64(a) => a.shape(),
            ArrayData::Int32(a) => a.shape(),
            ArrayData::DateTime(a) => a.shape(),
            ArrayData::TimeDelta(a) => a.shape(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    pub fn is_float(&self) -> bool {
        matches!(self, ArrayData::Float32(_) | ArrayData::Float64(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, ArrayData::Int32(_))
    }

    /// Values widened to f64 (timestamps and durations are not numeric here)
    pub fn to_f64(&self) -> Option<ArrayD<f64>> {
        match self {
            ArrayData::Float32(a) => Some(a.mapv(|v| v as f64)),
            ArrayData::Float64(a) => Some(a.clone()),
            ArrayData::Int32(a) => Some(a.mapv(|v| v as f64)),
            ArrayData::TimeDelta(a) => Some(a.clone()),
            ArrayData::DateTime(_) => None,
        }
    }
}

/// A named array with dimensions and attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub dims: Vec<String>,
    pub data: ArrayData,
    pub attrs: Attributes,
}

impl Variable {
    /// Create a variable, checking that every axis has a dimension name
    pub fn new(dims: &[&str], data: ArrayData) -> Result<Self> {
        if dims.len() != data.ndim() {
            return Err(SyntheticError::EncodingError(format!(
                "{} dimension names given for a {}-dimensional array",
                dims.len(),
                data.ndim()
            )));
        }
        Ok(Self {
            dims: dims.iter().map(|d| d.to_string()).collect(),
            data,
            attrs: Attributes::new(),
        })
    }

    /// One-dimensional coordinate variable named after its own dimension
    pub fn coordinate(dim: &str, values: Vec<f64>, attrs: Attributes) -> Self {
        Self {
            dims: vec![dim.to_string()],
            data: ArrayData::Float64(Array1::from(values).into_dyn()),
            attrs,
        }
    }

    pub fn with_attrs(mut self, attrs: Attributes) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Length along a named dimension
    pub fn len_of(&self, dim: &str) -> Option<usize> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .map(|axis| self.shape()[axis])
    }
}

/// Composed dataset: ordered variables plus global attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyntheticDataset {
    variables: Vec<(String, Variable)>,
    pub attrs: Attributes,
    /// Soft warnings raised while the dataset was built
    pub warnings: Vec<String>,
}

impl SyntheticDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimensions in order of first appearance
    pub fn dims(&self) -> Vec<(String, usize)> {
        let mut dims: Vec<(String, usize)> = Vec::new();
        for (_, var) in &self.variables {
            for (name, &len) in var.dims.iter().zip(var.shape()) {
                if !dims.iter().any(|(d, _)| d == name) {
                    dims.push((name.clone(), len));
                }
            }
        }
        dims
    }

    pub fn dim_len(&self, dim: &str) -> Option<usize> {
        self.variables.iter().find_map(|(_, v)| v.len_of(dim))
    }

    fn check_dims(&self, name: &str, var: &Variable) -> Result<()> {
        for (dim, &len) in var.dims.iter().zip(var.shape()) {
            let existing = self
                .variables
                .iter()
                .filter(|(n, _)| n != name)
                .find_map(|(_, v)| v.len_of(dim));
            if let Some(expected) = existing {
                if expected != len {
                    return Err(SyntheticError::DimensionMismatch {
                        dim: dim.clone(),
                        expected,
                        found: len,
                    });
                }
            }
        }
        Ok(())
    }

    /// Insert or replace a variable
    pub fn insert(&mut self, name: &str, var: Variable) -> Result<()> {
        self.check_dims(name, &var)?;
        match self.variables.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = var,
            None => self.variables.push((name.to_string(), var)),
        }
        Ok(())
    }

    /// Merge another dataset into this one; existing global attributes win
    pub fn merge(&mut self, other: SyntheticDataset) -> Result<()> {
        for (name, var) in other.variables {
            self.insert(&name, var)?;
        }
        for (key, value) in other.attrs {
            self.attrs.entry(key).or_insert(value);
        }
        self.warnings.extend(other.warnings);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.variables
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Look up a variable or fail with [`SyntheticError::VariableNotFound`]
    pub fn require(&self, name: &str) -> Result<&Variable> {
        self.get(name).ok_or_else(|| SyntheticError::VariableNotFound {
            var: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Variable> {
        let idx = self.variables.iter().position(|(n, _)| n == name)?;
        Some(self.variables.remove(idx).1)
    }

    /// Remove variables that exist; missing names are ignored
    pub fn drop_vars(&mut self, names: &[&str]) {
        self.variables.retain(|(n, _)| !names.contains(&n.as_str()));
    }

    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.variables.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Rename a dimension on every variable that uses it
    pub fn rename_dim(&mut self, old: &str, new: &str) {
        for (_, var) in self.variables.iter_mut() {
            for dim in var.dims.iter_mut() {
                if dim == old {
                    *dim = new.to_string();
                }
            }
        }
    }

    /// Rename a variable; returns false when it does not exist
    pub fn rename_var(&mut self, old: &str, new: &str) -> bool {
        match self.variables.iter_mut().find(|(n, _)| n == old) {
            Some((name, _)) => {
                *name = new.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_attr(&mut self, key: &str, value: impl Into<JsonValue>) {
        self.attrs.insert(key.to_string(), value.into());
    }

    /// String-valued global attribute
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(|v| v.as_str())
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Two-column bounds array from consecutive edges: `(edges[i], edges[i+1])`.
///
/// At least two edges are needed to close one cell.
pub fn pairwise_bounds(edges: &[f64]) -> Result<ArrayD<f64>> {
    if edges.len() < 2 {
        return Err(SyntheticError::DimensionMismatch {
            dim: "bnds".to_string(),
            expected: 2,
            found: edges.len(),
        });
    }
    let flat: Vec<f64> = edges.windows(2).flat_map(|w| [w[0], w[1]]).collect();
    Ok(ArrayD::from_shape_vec(IxDyn(&[edges.len() - 1, 2]), flat)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn conflicting_dimension_lengths_are_rejected() {
        let mut ds = SyntheticDataset::new();
        ds.insert("lat", Variable::coordinate("lat", vec![0.0, 1.0], Attributes::new()))
            .unwrap();
        let bad = Variable::coordinate("lat", vec![0.0, 1.0, 2.0], Attributes::new());
        // replacing the coordinate itself is allowed
        ds.insert("lat", bad.clone()).unwrap();
        let other = Variable::new(
            &["lat", "lon"],
            ArrayData::Float32(Array2::<f32>::zeros((2, 4)).into_dyn()),
        )
        .unwrap();
        match ds.insert("field", other) {
            Err(SyntheticError::DimensionMismatch {
                dim,
                expected,
                found,
            }) => {
                assert_eq!(dim, "lat");
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("expected DimensionMismatch, got {:?}", other),
        }
    }

    #[test]
    fn rename_and_drop() {
        let mut ds = SyntheticDataset::new();
        ds.insert("xh", Variable::coordinate("xh", vec![1.0, 2.0], Attributes::new()))
            .unwrap();
        ds.rename_dim("xh", "nlon");
        assert!(ds.rename_var("xh", "nlon"));
        assert_eq!(ds.dims(), vec![("nlon".to_string(), 2)]);
        ds.drop_vars(&["nlon", "missing"]);
        assert!(ds.variable_names().is_empty());
    }

    #[test]
    fn bounds_from_edges() {
        let b = pairwise_bounds(&[0.0, 5.0, 10.0]).unwrap();
        assert_eq!(b.shape(), &[2, 2]);
        assert_eq!(b.iter().cloned().collect::<Vec<_>>(), vec![0.0, 5.0, 5.0, 10.0]);
        assert!(matches!(
            pairwise_bounds(&[0.0]),
            Err(SyntheticError::DimensionMismatch { expected: 2, found: 1, .. })
        ));
    }
}
