use itertools::Itertools;
use serde_json::Value;

use crate::context::Context;
use crate::errors::{ProcessError, Result};
use crate::stage::Processor;
use crate::values::{kind, to_values};

/// Returns the first element that is neither null nor empty text, or
/// null when no such element exists. Never errors.
#[derive(Clone, Copy, Debug, Default)]
pub struct TakeFirst;

impl TakeFirst {
    pub fn first(&self, values: &[Value]) -> Value {
        values
            .iter()
            .find(|v| !v.is_null() && !matches!(v, Value::String(s) if s.is_empty()))
            .cloned()
            .unwrap_or(Value::Null)
    }
}

impl Processor for TakeFirst {
    fn process(&self, value: Value, _context: Option<&Context>) -> Result<Value> {
        Ok(self.first(&to_values(value)))
    }
}

/// Leaves its input completely untouched; used when no reduction is
/// desired.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl Processor for Identity {
    fn process(&self, value: Value, _context: Option<&Context>) -> Result<Value> {
        Ok(value)
    }
}

/// Concatenates text elements with a separator. Any non-text element
/// is a usage error, never silently coerced.
#[derive(Clone, Debug)]
pub struct Join {
    separator: String,
}

impl Join {
    pub fn new(separator: impl Into<String>) -> Self {
        Self { separator: separator.into() }
    }

    pub fn join(&self, values: &[Value]) -> Result<String> {
        let parts: Vec<&str> = values
            .iter()
            .map(|v| {
                v.as_str().ok_or_else(|| {
                    ProcessError::usage(format!("join expects text elements, got {}", kind(v)))
                })
            })
            .collect::<Result<_>>()?;
        Ok(parts.join(&self.separator))
    }
}

impl Default for Join {
    fn default() -> Self {
        Self::new(" ")
    }
}

impl Processor for Join {
    fn process(&self, value: Value, _context: Option<&Context>) -> Result<Value> {
        Ok(Value::String(self.join(&to_values(value))?))
    }
}

/// Order-preserving deduplication, keyed by canonical JSON text.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unique;

impl Unique {
    pub fn unique(&self, values: Vec<Value>) -> Vec<Value> {
        values
            .into_iter()
            .unique_by(|v| serde_json::to_string(v).unwrap_or_default())
            .collect()
    }
}

impl Processor for Unique {
    fn process(&self, value: Value, _context: Option<&Context>) -> Result<Value> {
        Ok(Value::Array(self.unique(to_values(value))))
    }
}
