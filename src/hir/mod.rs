//! High-level IR (HIR) — the resolved EDM semantic model.
//!
//! A [`Model`] wraps a [`CsdlDocument`](crate::syntax::CsdlDocument) and the
//! documents it references. Declarations are registered eagerly; every
//! cross-reference (base types, parameter types, partners, annotation
//! targets, overload bindings) is resolved on first access and cached in a
//! [`Memo`] cell for the lifetime of the model.
//!
//! ## Key Types
//!
//! - [`Model`] — Schema aggregator and entry point for every lookup
//! - [`Resolution`] — Resolved value, [`Unresolved`] placeholder, or [`Ambiguity`]
//! - [`ElementRef`] — Handle over any annotatable element
//! - [`SchemaType`] / [`TypeReference`] — Named types and their usages
//! - [`Expression`] — Semantic annotation expressions
//! - [`HasErrors`] — Error reporting shared by every semantic value
//!
//! ## Resolution Layers
//!
//! ```text
//! memo                     ← evaluate-once cells with re-entry detection
//!     │
//!     ▼
//! structured / terms /     ← base chains (cycle-safe), properties, keys
//! containers / enums
//!     │
//!     ▼
//! operations / navigation  ← overloads, partners, bindings
//! annotations              ← target paths, expressions
//!     │
//!     ▼
//! model                    ← name tables, aliases, references, errors
//! ```
//!
//! Element handles are plain ids; their accessors take the `&Model` the
//! element was obtained from (or any model whose reference tree contains it).

mod aliases;
mod annotations;
mod containers;
mod diagnostics;
mod elements;
mod enums;
mod expressions;
mod ids;
mod literals;
mod memo;
mod model;
mod navigation;
mod operations;
mod options;
mod resolution;
mod structured;
mod terms;
mod types;

pub use aliases::AliasTable;
pub use diagnostics::{EdmError, ErrorCategory, ErrorCode, HasErrors};
pub use elements::ElementRef;
pub use expressions::{
    Apply, Constant, ConstantValue, Expression, ExpressionKind, PropertyValue,
};
pub use ids::{
    AnnotationId, ContainerId, EntitySetId, EnumMemberId, EnumTypeId, ModelId, OperationId,
    OperationImportId, ParameterId, PropertyId, SingletonId, StructuredTypeId, TermId,
    TypeDefinitionId,
};
pub use literals::{
    Duration, parse_binary, parse_bool, parse_date, parse_date_time_offset, parse_decimal,
    parse_duration, parse_float, parse_guid, parse_int, parse_time_of_day,
};
pub use memo::{Memo, MemoState};
pub use model::{Model, ReferencedModel};
pub use navigation::{NavigationBinding, NavigationSource, ReferentialConstraint};
pub use options::ModelOptions;
pub use resolution::{Ambiguity, PlaceholderKind, Resolution, Unresolved};
pub use structured::{KeyProperty, PropertyKind};
pub use types::{SchemaType, TypeReference};
