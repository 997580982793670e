use serde_json::Value;
use tracing::debug;

use crate::context::Context;
use crate::errors::Result;
use crate::stage::{Processor, Stage};
use crate::values::{is_truthy, to_values};

/// Chains stages where each stage consumes and produces a single
/// scalar value. Once the running value is null the remaining stages
/// are skipped, unless the default context sets `stop_on_none` falsy.
#[derive(Clone)]
pub struct Compose {
    stages: Vec<Stage>,
    default_context: Context,
    stop_on_none: bool,
}

impl Compose {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self::with_context(stages, Context::new())
    }

    pub fn with_context(stages: Vec<Stage>, default_context: Context) -> Self {
        let stop_on_none = default_context
            .get("stop_on_none")
            .map(is_truthy)
            .unwrap_or(true);
        Self { stages, default_context, stop_on_none }
    }

    pub fn call(&self, mut value: Value, context: Option<&Context>) -> Result<Value> {
        let context = self.default_context.effective(context);
        let bound: Vec<_> = self.stages.iter().map(|s| s.bind(&context)).collect();
        for stage in &bound {
            if value.is_null() && self.stop_on_none {
                debug!("null value, skipping remaining stages");
                return Ok(Value::Null);
            }
            value = stage.call(value)?;
        }
        Ok(value)
    }
}

impl Processor for Compose {
    fn process(&self, value: Value, context: Option<&Context>) -> Result<Value> {
        self.call(value, context)
    }
}

/// Chains stages where each stage is applied to every element of a
/// sequence, the per-element results being flattened in element order
/// before the next stage runs. A stage may thus act as a 1-to-1
/// transform, a 1-to-N fan-out, or a filter (null or an empty array
/// drops the element).
#[derive(Clone)]
pub struct MapCompose {
    stages: Vec<Stage>,
    default_context: Context,
}

impl MapCompose {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self::with_context(stages, Context::new())
    }

    pub fn with_context(stages: Vec<Stage>, default_context: Context) -> Self {
        Self { stages, default_context }
    }

    pub fn call(&self, value: Value, context: Option<&Context>) -> Result<Vec<Value>> {
        let context = self.default_context.effective(context);
        let bound: Vec<_> = self.stages.iter().map(|s| s.bind(&context)).collect();
        let mut values = to_values(value);
        for stage in &bound {
            let mut next = Vec::new();
            for v in values {
                next.extend(to_values(stage.call(v)?));
            }
            values = next;
        }
        Ok(values)
    }
}

impl Processor for MapCompose {
    fn process(&self, value: Value, context: Option<&Context>) -> Result<Value> {
        Ok(Value::Array(self.call(value, context)?))
    }
}
