use std::sync::Arc;

use serde_json::Value;

use crate::context::Context;
use crate::errors::Result;

pub type PlainFn = dyn Fn(Value) -> Result<Value> + Send + Sync;
pub type ContextualFn = dyn Fn(Value, &Context) -> Result<Value> + Send + Sync;

/// One unit transform in a pipeline. Whether a stage wants the ambient
/// context is fixed by its variant, so pipelines never have to probe a
/// callable per element.
#[derive(Clone)]
pub enum Stage {
    Plain(Arc<PlainFn>),
    Contextual(Arc<ContextualFn>),
}

impl Stage {
    pub fn plain<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        Stage::Plain(Arc::new(f))
    }

    /// Infallible convenience constructor.
    pub fn map<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Stage::Plain(Arc::new(move |v| Ok(f(v))))
    }

    pub fn contextual<F>(f: F) -> Self
    where
        F: Fn(Value, &Context) -> Result<Value> + Send + Sync + 'static,
    {
        Stage::Contextual(Arc::new(f))
    }

    /// Adopt any processor as a stage, which is how pipelines nest.
    pub fn processor<P: Processor + 'static>(processor: P) -> Self {
        Stage::Contextual(Arc::new(move |v, ctx| processor.process(v, Some(ctx))))
    }

    /// Bind the stage to an effective context. Pipelines bind every
    /// stage once per invocation, before iterating values, so context
    /// resolution cost is O(stages) rather than O(stages x elements).
    pub(crate) fn bind<'a>(&'a self, context: &'a Context) -> Bound<'a> {
        Bound { stage: self, context }
    }
}

pub(crate) struct Bound<'a> {
    stage: &'a Stage,
    context: &'a Context,
}

impl Bound<'_> {
    pub(crate) fn call(&self, value: Value) -> Result<Value> {
        match self.stage {
            Stage::Plain(f) => f(value),
            Stage::Contextual(f) => f(value, self.context),
        }
    }
}

/// Anything that turns one value into another under an optional
/// context. Implemented by pipelines, reducers and the search stage
/// alike, so each can serve as a stage inside another pipeline.
pub trait Processor: Send + Sync {
    fn process(&self, value: Value, context: Option<&Context>) -> Result<Value>;
}
