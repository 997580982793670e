use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ambient configuration visible to context-aware stages. Two layers
/// exist per invocation: the pipeline's default context (captured at
/// construction) and an optional runtime context (supplied per call),
/// with runtime entries winning on key collisions.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    entries: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Entry-wise union where `primary` keys win.
    pub fn merged(primary: &Context, fallback: &Context) -> Context {
        let mut entries = fallback.entries.clone();
        entries.extend(
            primary
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        Context { entries }
    }

    /// Resolve the effective context for one invocation: a non-empty
    /// runtime context is merged over `self`, otherwise `self` is
    /// borrowed unchanged.
    pub(crate) fn effective<'a>(&'a self, runtime: Option<&'a Context>) -> Cow<'a, Context> {
        match runtime {
            Some(runtime) if !runtime.is_empty() => Cow::Owned(Context::merged(runtime, self)),
            _ => Cow::Borrowed(self),
        }
    }
}
