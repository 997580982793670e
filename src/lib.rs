//! Composable value-transformation pipelines for normalizing raw
//! extracted field values into clean output values.
//!
//! Pipelines are ordered, immutable lists of [`Stage`]s exposed as a
//! single callable: [`Compose`] chains scalar transforms, [`MapCompose`]
//! applies each stage element-wise and flattens the results. A family
//! of terminal reducers ([`TakeFirst`], [`Identity`], [`Join`],
//! [`Unique`]) collapses a sequence of candidate values into one
//! output, and [`StructuredSearch`] queries a path inside structured
//! text values.

pub mod builtins;
pub mod context;
pub mod errors;

mod pipeline;
mod reducers;
mod search;
mod stage;
mod values;

#[cfg(feature = "search")]
mod path;

pub use context::Context;
pub use errors::{ProcessError, Result};
pub use pipeline::{Compose, MapCompose};
pub use reducers::{Identity, Join, TakeFirst, Unique};
pub use search::StructuredSearch;
pub use stage::{Processor, Stage};
pub use values::{is_truthy, to_values};
