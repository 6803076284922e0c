//! Typed strategy parameters and the discretized search space.
//!
//! A `ParameterSet` is an explicit name → value map with fallible typed
//! accessors; looking up an unknown name is an error, never a silent
//! fallback. A `ParamSpace` describes, per parameter, the numeric range and
//! step the optimizer enumerates.
//!
//! Range convention (applied uniformly): half-open `[min, max)` with a fixed
//! step increment; integer parameters default to step 1.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from parameter lookup and decoding.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParamError {
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),
    #[error("parameter '{name}' is not an {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },
}

/// A single numeric parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
}

impl ParamValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            ParamValue::Int(v) => v as f64,
            ParamValue::Float(v) => v,
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

/// Named numeric parameters for one strategy evaluation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: BTreeMap<String, ParamValue>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Result<ParamValue, ParamError> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| ParamError::UnknownParameter(name.to_string()))
    }

    /// Integer accessor; windows and periods use this.
    pub fn int(&self, name: &str) -> Result<i64, ParamError> {
        match self.get(name)? {
            ParamValue::Int(v) => Ok(v),
            ParamValue::Float(_) => Err(ParamError::TypeMismatch {
                name: name.to_string(),
                expected: "integer",
            }),
        }
    }

    /// Window accessor: a positive integer parameter as usize.
    pub fn window(&self, name: &str) -> Result<usize, ParamError> {
        let v = self.int(name)?;
        usize::try_from(v).map_err(|_| ParamError::TypeMismatch {
            name: name.to_string(),
            expected: "non-negative integer",
        })
    }

    /// Numeric accessor accepting either variant.
    pub fn float(&self, name: &str) -> Result<f64, ParamError> {
        Ok(self.get(name)?.as_f64())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (name, value) in &self.values {
            if !first {
                write!(f, ", ")?;
            }
            match value {
                ParamValue::Int(v) => write!(f, "{name}={v}")?,
                ParamValue::Float(v) => write!(f, "{name}={v}")?,
            }
            first = false;
        }
        Ok(())
    }
}

/// Range and step for one searched parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub min: ParamValue,
    pub max: ParamValue,
    pub step: ParamValue,
}

impl ParamSpec {
    /// Integer range `[min, max)` with step 1.
    pub fn int(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self::int_step(name, min, max, 1)
    }

    /// Integer range `[min, max)` with an explicit step.
    pub fn int_step(name: impl Into<String>, min: i64, max: i64, step: i64) -> Self {
        Self {
            name: name.into(),
            min: ParamValue::Int(min),
            max: ParamValue::Int(max),
            step: ParamValue::Int(step),
        }
    }

    /// Float range `[min, max)` with a fixed increment.
    pub fn float_step(name: impl Into<String>, min: f64, max: f64, step: f64) -> Self {
        Self {
            name: name.into(),
            min: ParamValue::Float(min),
            max: ParamValue::Float(max),
            step: ParamValue::Float(step),
        }
    }

    /// Enumerate candidate values for this parameter.
    ///
    /// Integer specs step exactly; float specs step by fixed increment with a
    /// small epsilon guard so accumulated error cannot produce a value at or
    /// past `max`.
    pub fn candidates(&self) -> Vec<ParamValue> {
        match (self.min, self.max, self.step) {
            (ParamValue::Int(min), ParamValue::Int(max), ParamValue::Int(step)) if step > 0 => {
                (min..max)
                    .step_by(step as usize)
                    .map(ParamValue::Int)
                    .collect()
            }
            _ => {
                let min = self.min.as_f64();
                let max = self.max.as_f64();
                let step = self.step.as_f64();
                let mut out = Vec::new();
                if step <= 0.0 {
                    return out;
                }
                let mut i = 0u32;
                loop {
                    let v = min + step * f64::from(i);
                    if v >= max - 1e-9 {
                        break;
                    }
                    out.push(ParamValue::Float(v));
                    i += 1;
                }
                out
            }
        }
    }
}

/// Ordered parameter search space; declaration order fixes the grid
/// iteration order (rightmost parameter varies fastest).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSpace {
    pub specs: Vec<ParamSpec>,
}

impl ParamSpace {
    pub fn new(specs: Vec<ParamSpec>) -> Self {
        Self { specs }
    }

    /// Total number of grid combinations before validity pruning.
    pub fn grid_size(&self) -> usize {
        self.specs
            .iter()
            .map(|s| s.candidates().len())
            .product::<usize>()
    }

    /// Enumerate the full Cartesian product in declaration order.
    ///
    /// The first spec varies slowest; the last varies fastest. This order is
    /// part of the optimizer's observable contract (first-seen wins ties).
    pub fn combinations(&self) -> Vec<ParameterSet> {
        let mut out = vec![ParameterSet::new()];
        for spec in &self.specs {
            let candidates = spec.candidates();
            let mut next = Vec::with_capacity(out.len() * candidates.len());
            for base in &out {
                for value in &candidates {
                    next.push(base.clone().with(spec.name.clone(), *value));
                }
            }
            out = next;
        }
        out
    }
}
