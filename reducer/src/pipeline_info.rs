// pipeline_info.rs — Pipeline metadata shared by all stages of a shader job
//
// The JSON record of uniform names, GL setter functions, values and bindings
// that accompanies a shader job. Entries that are not uniform records (such
// as compute-dispatch descriptions) are kept verbatim so they round-trip.
//
// Preconditions: none.
// Postconditions: serialisation is deterministic (keys in sorted order).
// Failure modes: malformed argument lists and non-finite values surface as `ReduceError`.
// Side effects: none.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ReduceError;
use crate::registry::{ElementType, NumericValue};

// ── Entries ─────────────────────────────────────────────────────────────────

/// One uniform record, e.g.
/// `{ "func": "glUniform1iv", "count": 2, "args": [5, 7], "binding": 0 }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformEntry {
    pub func: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub args: Vec<serde_json::Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<u32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub push_constant: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl UniformEntry {
    /// Element type implied by the GL setter, for the scalar int/float setters.
    pub fn element_type(&self) -> Option<ElementType> {
        match self.func.as_str() {
            "glUniform1i" | "glUniform1iv" => Some(ElementType::Int),
            "glUniform1f" | "glUniform1fv" => Some(ElementType::Float),
            _ => None,
        }
    }

    /// Record holding `values` under the GL setter of `element_type`, with no
    /// binding. `count` marks an array uniform. Fails on non-finite floats.
    pub fn new(
        name: &str,
        element_type: ElementType,
        count: Option<usize>,
        values: &[NumericValue],
    ) -> Result<Self, ReduceError> {
        let args = values
            .iter()
            .map(|v| {
                v.to_json_number().ok_or_else(|| ReduceError::NonFiniteValue {
                    name: name.to_string(),
                    value: v.as_f32(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(UniformEntry {
            func: element_type.gl_uniform_func(count.is_some()).to_string(),
            count,
            args,
            binding: None,
            push_constant: false,
        })
    }

    /// Array record with no values yet.
    pub fn empty_array(element_type: ElementType) -> Self {
        UniformEntry {
            func: element_type.gl_uniform_func(true).to_string(),
            count: Some(0),
            args: Vec::new(),
            binding: None,
            push_constant: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum Entry {
    Uniform(UniformEntry),
    Other(serde_json::Value),
}

// ── PipelineInfo ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineInfo {
    entries: BTreeMap<String, Entry>,
}

impl PipelineInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Pretty JSON as written next to the shaders.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Compact JSON with sorted keys, used for fingerprinting.
    pub fn canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniform(name).is_some()
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformEntry> {
        match self.entries.get(name)? {
            Entry::Uniform(entry) => Some(entry),
            Entry::Other(_) => None,
        }
    }

    fn uniform_mut(&mut self, name: &str) -> Option<&mut UniformEntry> {
        match self.entries.get_mut(name)? {
            Entry::Uniform(entry) => Some(entry),
            Entry::Other(_) => None,
        }
    }

    pub fn uniform_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|(name, entry)| match entry {
            Entry::Uniform(_) => Some(name.as_str()),
            Entry::Other(_) => None,
        })
    }

    pub fn num_uniforms(&self) -> usize {
        self.uniform_names().count()
    }

    /// Add (or overwrite) a uniform record. `count` is set for array uniforms.
    pub fn add_uniform(
        &mut self,
        name: &str,
        element_type: ElementType,
        count: Option<usize>,
        values: &[NumericValue],
    ) -> Result<(), ReduceError> {
        let entry = UniformEntry::new(name, element_type, count, values)?;
        self.entries.insert(name.to_string(), Entry::Uniform(entry));
        Ok(())
    }

    /// Swap in `entry` for `name` in one step, returning the previous
    /// uniform record if there was one.
    pub fn replace_uniform(&mut self, name: &str, entry: UniformEntry) -> Option<UniformEntry> {
        match self.entries.insert(name.to_string(), Entry::Uniform(entry))? {
            Entry::Uniform(old) => Some(old),
            Entry::Other(_) => None,
        }
    }

    pub fn remove_uniform(&mut self, name: &str) -> Option<UniformEntry> {
        if !self.has_uniform(name) {
            return None;
        }
        match self.entries.remove(name)? {
            Entry::Uniform(entry) => Some(entry),
            Entry::Other(_) => None,
        }
    }

    /// Record a uniform's binding slot, or mark it as a push constant.
    pub fn add_uniform_binding(
        &mut self,
        name: &str,
        push_constant: bool,
        binding: u32,
    ) -> Result<(), ReduceError> {
        let entry = self
            .uniform_mut(name)
            .ok_or_else(|| ReduceError::UnknownUniform(name.to_string()))?;
        if push_constant {
            entry.push_constant = true;
            entry.binding = None;
        } else {
            entry.push_constant = false;
            entry.binding = Some(binding);
        }
        Ok(())
    }

    /// Decoded argument list of an int or float uniform.
    pub fn get_args(&self, name: &str) -> Result<Vec<NumericValue>, ReduceError> {
        let entry = self
            .uniform(name)
            .ok_or_else(|| ReduceError::UnknownUniform(name.to_string()))?;
        let malformed = || ReduceError::MalformedUniform {
            name: name.to_string(),
        };
        let element_type = entry.element_type().ok_or_else(malformed)?;
        entry
            .args
            .iter()
            .map(|n| NumericValue::from_json_number(element_type, n).ok_or_else(malformed))
            .collect()
    }

    /// Next free binding slot: one past the highest binding in use.
    pub fn next_binding(&self) -> u32 {
        self.entries
            .values()
            .filter_map(|entry| match entry {
                Entry::Uniform(u) => u.binding,
                Entry::Other(_) => None,
            })
            .max()
            .map_or(0, |b| b + 1)
    }

    pub fn num_bindings(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| matches!(entry, Entry::Uniform(u) if u.binding.is_some()))
            .count()
    }
}
