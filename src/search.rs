use serde_json::Value;

use crate::context::Context;
use crate::errors::Result;
use crate::stage::Processor;
use crate::values::to_values;

/// Searches a query path inside a structured value parsed from each
/// text element of the input sequence. The query engine is an optional
/// capability (cargo feature `search`): when it is not compiled in the
/// stage warns and returns its input unprocessed instead of failing
/// the pipeline or dropping data.
#[derive(Clone, Debug)]
pub struct StructuredSearch {
    path: String,
}

impl StructuredSearch {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Whether the query engine is compiled in.
    pub fn available() -> bool {
        cfg!(feature = "search")
    }

    #[cfg(feature = "search")]
    pub fn search(&self, values: Vec<Value>) -> Result<Vec<Value>> {
        use crate::errors::ProcessError;
        use crate::values::{is_truthy, kind};

        // Parse the path once per call, not once per element.
        let path = crate::path::parse(&self.path)?;
        let mut out = Vec::new();
        for value in values {
            let text = match &value {
                Value::String(s) => s,
                other => {
                    return Err(ProcessError::usage(format!(
                        "structured search expects text elements, got {}",
                        kind(other)
                    )))
                }
            };
            if text.is_empty() {
                continue;
            }
            let parsed: Value = serde_json::from_str(text).map_err(|e| {
                ProcessError::usage(format!("malformed structured literal: {e}"))
            })?;
            let matches = path.eval(&parsed);
            let found = match matches.len() {
                0 => continue,
                1 => matches[0].clone(),
                _ => Value::Array(matches.into_iter().cloned().collect()),
            };
            if !is_truthy(&found) {
                continue;
            }
            if found.is_object() {
                out.push(Value::String(serde_json::to_string(&found).unwrap_or_default()));
            } else {
                out.push(found);
            }
        }
        Ok(out)
    }

    #[cfg(not(feature = "search"))]
    pub fn search(&self, values: Vec<Value>) -> Result<Vec<Value>> {
        tracing::warn!(
            path = %self.path,
            "query engine not compiled in, values returned unprocessed"
        );
        Ok(values)
    }
}

impl Processor for StructuredSearch {
    fn process(&self, value: Value, _context: Option<&Context>) -> Result<Value> {
        Ok(Value::Array(self.search(to_values(value))?))
    }
}
