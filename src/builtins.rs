//! Named, ready-made stages. Used by the CLI and handy as building
//! blocks for library pipelines.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::ProcessError;
use crate::stage::Stage;
use crate::values::kind;

/// Thread-safe stage registry.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<HashMap<&'static str, Stage>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut map: HashMap<&'static str, Stage> = HashMap::new();
        map.insert("trim", trim());
        map.insert("lowercase", lowercase());
        map.insert("uppercase", uppercase());
        map.insert("drop_blank", drop_blank());
        map.insert("to_number", to_number());
        map.insert("prefix", prefix());
        Self { inner: Arc::new(map) }
    }

    pub fn register(&mut self, name: &'static str, stage: Stage) {
        Arc::make_mut(&mut self.inner).insert(name, stage);
    }

    pub fn get(&self, name: &str) -> Option<Stage> {
        self.inner.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.inner.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// Trims surrounding whitespace from text; other values pass through.
pub fn trim() -> Stage {
    Stage::map(|v| match v {
        Value::String(s) => Value::String(s.trim().to_string()),
        other => other,
    })
}

pub fn lowercase() -> Stage {
    Stage::map(|v| match v {
        Value::String(s) => Value::String(s.to_lowercase()),
        other => other,
    })
}

pub fn uppercase() -> Stage {
    Stage::map(|v| match v {
        Value::String(s) => Value::String(s.to_uppercase()),
        other => other,
    })
}

/// Turns blank text into null so MapCompose drops the element.
pub fn drop_blank() -> Stage {
    Stage::map(|v| match v {
        Value::String(s) if s.trim().is_empty() => Value::Null,
        other => other,
    })
}

/// Parses text as an integer, then as a float. Non-numeric text and
/// non-text values are usage errors.
pub fn to_number() -> Stage {
    Stage::plain(|value| match value {
        Value::String(s) => {
            let t = s.trim();
            if let Ok(i) = t.parse::<i64>() {
                return Ok(Value::from(i));
            }
            t.parse::<f64>()
                .map(Value::from)
                .map_err(|_| ProcessError::usage(format!("cannot parse {s:?} as a number")))
        }
        other => Err(ProcessError::usage(format!(
            "to_number expects text, got {}",
            kind(&other)
        ))),
    })
}

/// Context-aware: prepends the effective context's `prefix` text entry
/// to text values. Without a `prefix` entry the value passes through.
pub fn prefix() -> Stage {
    Stage::contextual(|value, ctx| match (value, ctx.get("prefix")) {
        (Value::String(s), Some(Value::String(p))) => Ok(Value::String(format!("{p}{s}"))),
        (value, _) => Ok(value),
    })
}
