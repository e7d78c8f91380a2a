// registry.rs — Uniform-array registry for promoted literals
//
// Append-only, deduplicating arrays of literal values, one per element type,
// kept in the job's `PipelineInfo`. Repeated promotion of an identical value
// reuses its slot, so an array grows only with the number of distinct values.
//
// Preconditions: `promote` / `snapshot` need a prior `ensure_registered`.
// Postconditions: an entry's `count` always equals its value-list length.
// Failure modes: unknown names, element-type mismatches, non-finite floats.
// Side effects: mutates the `PipelineInfo` it is called on.

use std::fmt;

use tracing::{debug, trace};

use crate::ast::{BasicType, Literal};
use crate::error::ReduceError;
use crate::pipeline_info::{PipelineInfo, UniformEntry};

/// Array receiving promoted integer literals.
pub const INT_LITERAL_UNIFORM_VALUES: &str = "_GLF_uniform_int_values";
/// Array receiving promoted float literals.
pub const FLOAT_LITERAL_UNIFORM_VALUES: &str = "_GLF_uniform_float_values";

// ── Data types ──────────────────────────────────────────────────────────────

/// Element type of a literal array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Int,
    Float,
}

impl ElementType {
    /// Name of the uniform array collecting literals of this type.
    pub fn literal_array_name(self) -> &'static str {
        match self {
            ElementType::Int => INT_LITERAL_UNIFORM_VALUES,
            ElementType::Float => FLOAT_LITERAL_UNIFORM_VALUES,
        }
    }

    pub fn basic_type(self) -> BasicType {
        match self {
            ElementType::Int => BasicType::Int,
            ElementType::Float => BasicType::Float,
        }
    }

    /// GL setter recorded in the metadata.
    pub fn gl_uniform_func(self, array: bool) -> &'static str {
        match (self, array) {
            (ElementType::Int, false) => "glUniform1i",
            (ElementType::Int, true) => "glUniform1iv",
            (ElementType::Float, false) => "glUniform1f",
            (ElementType::Float, true) => "glUniform1fv",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Int => write!(f, "int"),
            ElementType::Float => write!(f, "float"),
        }
    }
}

/// A decoded literal value.
///
/// Floats compare by bit pattern: `-0.0` and `0.0` are different values
/// (they are not interchangeable in GLSL, e.g. `1.0 / x`).
#[derive(Debug, Clone, Copy)]
pub enum NumericValue {
    Int(i32),
    Float(f32),
}

impl PartialEq for NumericValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NumericValue::Int(a), NumericValue::Int(b)) => a == b,
            (NumericValue::Float(a), NumericValue::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for NumericValue {}

impl NumericValue {
    /// Decode a literal; only int and finite float literals qualify.
    pub fn from_literal(lit: &Literal) -> Option<Self> {
        match *lit {
            Literal::Int(v) => Some(NumericValue::Int(v)),
            Literal::Float(v) if v.is_finite() => Some(NumericValue::Float(v)),
            Literal::Float(_) | Literal::Uint(_) | Literal::Bool(_) => None,
        }
    }

    pub fn element_type(self) -> ElementType {
        match self {
            NumericValue::Int(_) => ElementType::Int,
            NumericValue::Float(_) => ElementType::Float,
        }
    }

    pub fn to_literal(self) -> Literal {
        match self {
            NumericValue::Int(v) => Literal::Int(v),
            NumericValue::Float(v) => Literal::Float(v),
        }
    }

    pub fn as_f32(self) -> f32 {
        match self {
            NumericValue::Int(v) => v as f32,
            NumericValue::Float(v) => v,
        }
    }

    /// JSON number for the metadata; `None` for non-finite floats.
    pub(crate) fn to_json_number(self) -> Option<serde_json::Number> {
        match self {
            NumericValue::Int(v) => Some(serde_json::Number::from(v)),
            // Go through the shortest f32 rendering so 0.1f32 is written as 0.1.
            NumericValue::Float(v) => v
                .to_string()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64),
        }
    }

    pub(crate) fn from_json_number(ty: ElementType, n: &serde_json::Number) -> Option<Self> {
        match ty {
            ElementType::Int => n
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(NumericValue::Int),
            // Values outside f32 range would decode to infinity.
            ElementType::Float => n
                .as_f64()
                .map(|v| v as f32)
                .filter(|v| v.is_finite())
                .map(NumericValue::Float),
        }
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericValue::Int(v) => write!(f, "{v}"),
            NumericValue::Float(v) => write!(f, "{v:?}"),
        }
    }
}

/// Read-only view of one literal array.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformSnapshot {
    pub element_type: ElementType,
    pub length: usize,
    pub values: Vec<NumericValue>,
}

// ── Registry operations ─────────────────────────────────────────────────────

impl PipelineInfo {
    /// Register an empty array named `name` with the next free binding.
    /// No-op if a uniform of that name already exists.
    pub fn ensure_registered(&mut self, name: &str, element_type: ElementType) {
        if self.has_uniform(name) {
            return;
        }
        let binding = self.next_binding();
        let mut entry = UniformEntry::empty_array(element_type);
        entry.binding = Some(binding);
        self.replace_uniform(name, entry);
        debug!(uniform = name, %element_type, binding, "registered literal array");
    }

    /// Position of `value` in the array, appending it if not present yet.
    ///
    /// The uniform record is re-declared with its new length; its binding
    /// is kept.
    pub fn promote(&mut self, name: &str, value: NumericValue) -> Result<usize, ReduceError> {
        let snapshot = self.snapshot(name)?;
        if snapshot.element_type != value.element_type() {
            return Err(ReduceError::ElementTypeMismatch {
                name: name.to_string(),
                expected: snapshot.element_type,
                found: value.element_type(),
            });
        }
        if value.to_json_number().is_none() {
            return Err(ReduceError::NonFiniteValue {
                name: name.to_string(),
                value: value.as_f32(),
            });
        }

        let mut values = snapshot.values;
        let index = match values.iter().position(|v| *v == value) {
            Some(existing) => existing,
            None => {
                values.push(value);
                values.len() - 1
            }
        };

        let old = self
            .uniform(name)
            .ok_or_else(|| ReduceError::UnknownUniform(name.to_string()))?;
        // Build and validate the grown record before the old one is replaced.
        let mut entry = UniformEntry::new(name, snapshot.element_type, Some(values.len()), &values)?;
        entry.push_constant = old.push_constant;
        entry.binding = match old.binding {
            Some(b) => Some(b),
            None if old.push_constant => None,
            None => Some(self.next_binding()),
        };
        self.replace_uniform(name, entry);
        trace!(uniform = name, %value, index, length = values.len(), "promoted literal");
        Ok(index)
    }

    /// Current element type, length and values of a literal array.
    pub fn snapshot(&self, name: &str) -> Result<UniformSnapshot, ReduceError> {
        let entry = self
            .uniform(name)
            .ok_or_else(|| ReduceError::UnknownUniform(name.to_string()))?;
        let element_type = entry
            .element_type()
            .ok_or_else(|| ReduceError::MalformedUniform {
                name: name.to_string(),
            })?;
        let values = self.get_args(name)?;
        Ok(UniformSnapshot {
            element_type,
            length: values.len(),
            values,
        })
    }
}
