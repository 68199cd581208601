//! Per-variable YAML configuration
//!
//! A configuration file lists the variables to generate and carries one
//! record per variable:
//!
//! ```yaml
//! variables:
//!   name: [tas, pr]
//! tas:
//!   atts: {units: K, long_name: Near-Surface Air Temperature}
//!   stats: [280.0, 5.0]
//! pr:
//!   atts: {units: m s-1}
//!   generator:
//!     name: convective
//!     args: {varname: pr}
//! ```
//!
//! `${VAR}` and `$VAR` references are expanded from the environment before
//! the text is parsed.

use crate::dataset::Attributes;
use crate::errors::{Result, SyntheticError};
use crate::generators::KernelArgs;
use crate::horizontal::{GridKind, PointType};
use crate::synthetic::{AuxCoordinate, AuxSource, DatasetSpec, FieldSource};
use crate::vertical::VerticalKind;
use ndarray::arr0;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// `(mean, std)` given either as one pair or as a list of pairs
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StatsConfig {
    Single((f64, f64)),
    Profiles(Vec<(f64, f64)>),
}

impl StatsConfig {
    pub fn into_profiles(self) -> Vec<(f64, f64)> {
        match self {
            StatsConfig::Single(pair) => vec![pair],
            StatsConfig::Profiles(pairs) => pairs,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub name: Option<String>,
    pub args: KernelArgs,
}

/// Auxiliary coordinate: a scalar `value` or a grid array named by `source`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoordinateConfig {
    pub name: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub atts: Attributes,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VariableConfig {
    pub atts: Attributes,
    pub stats: Option<StatsConfig>,
    pub generator: GeneratorConfig,
    #[serde(rename = "static")]
    pub is_static: bool,
    pub grid: Option<String>,
    pub point_type: Option<String>,
    /// Take the field from a grid array (`depth`, `wet`, `lat`, `lon`)
    pub source: Option<String>,
    pub vertical: Option<String>,
    pub coordinates: Option<CoordinateConfig>,
}

impl VariableConfig {
    /// Fill a request with this variable's settings.
    ///
    /// `base` carries the run-wide settings (spacing, years, resolution,
    /// convention); every field this record names overrides it.
    pub fn to_dataset_spec(&self, varname: &str, base: DatasetSpec) -> Result<DatasetSpec> {
        let mut spec = base;
        spec.varname = varname.to_string();
        spec.attrs = self.atts.clone();
        spec.static_field = self.is_static;

        let generator = self.generator.name.as_deref().unwrap_or("normal");
        spec = spec.with_generator(generator, self.generator.args.clone());
        if let Some(stats) = &self.stats {
            spec = spec.with_stats(stats.clone().into_profiles());
        }

        let grid = match &self.grid {
            Some(name) => name.parse::<GridKind>()?,
            None => GridKind::default(),
        };
        let point_type = match &self.point_type {
            Some(name) => name.parse::<PointType>()?,
            None => PointType::default(),
        };
        spec = spec.with_grid(grid, point_type);

        if let Some(source) = &self.source {
            spec = spec.with_field(FieldSource::Grid(source.clone()));
        }
        if let Some(name) = &self.vertical {
            spec = spec.with_vertical(name.parse::<VerticalKind>()?);
        }
        if let Some(coord) = &self.coordinates {
            spec = spec.with_coordinate(coord.to_aux_coordinate()?);
        }
        Ok(spec)
    }
}

impl CoordinateConfig {
    pub fn to_aux_coordinate(&self) -> Result<AuxCoordinate> {
        let source = match (&self.source, self.value) {
            (Some(grid_var), None) => AuxSource::Grid(grid_var.clone()),
            (None, Some(value)) => AuxSource::Data {
                dims: Vec::new(),
                values: arr0(value).into_dyn(),
            },
            _ => {
                return Err(SyntheticError::ConfigError(format!(
                    "coordinate '{}' needs exactly one of 'value' or 'source'",
                    self.name
                )))
            }
        };
        Ok(AuxCoordinate {
            name: self.name.clone(),
            source,
            attrs: self.atts.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct VariableList {
    name: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    variables: VariableList,
    #[serde(flatten)]
    entries: BTreeMap<String, VariableConfig>,
}

/// Ordered variable records of one configuration file
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub variables: Vec<(String, VariableConfig)>,
}

impl ConfigFile {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let expanded = expand_env(text)?;
        let mut raw: RawConfig = serde_yaml::from_str(&expanded)?;

        let mut variables = Vec::with_capacity(raw.variables.name.len());
        for name in raw.variables.name {
            let entry = raw.entries.remove(&name).ok_or_else(|| {
                SyntheticError::ConfigError(format!("variable '{}' is listed but has no entry", name))
            })?;
            variables.push((name, entry));
        }
        Ok(Self { variables })
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("Reading configuration {}", path.display());
        let text = fs::read_to_string(path).map_err(|e| {
            SyntheticError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn names(&self) -> Vec<&str> {
        self.variables.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&VariableConfig> {
        self.variables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

/// Expand `${VAR}` and `$VAR` references; an unset variable is an error
pub fn expand_env(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let name: String = if chars.peek() == Some(&'{') {
            chars.next();
            let mut name = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(ch) => name.push(ch),
                    None => {
                        return Err(SyntheticError::ConfigError(format!(
                            "unterminated '${{{}' in configuration",
                            name
                        )))
                    }
                }
            }
            name
        } else {
            let mut name = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_ascii_alphanumeric() || ch == '_' {
                    name.push(ch);
                    chars.next();
                } else {
                    break;
                }
            }
            name
        };

        if name.is_empty() {
            out.push('$');
            continue;
        }
        let value = std::env::var(&name).map_err(|_| {
            SyntheticError::ConfigError(format!("environment variable '{}' is not set", name))
        })?;
        out.push_str(&value);
    }
    Ok(out)
}
