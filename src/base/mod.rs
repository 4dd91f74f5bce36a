//! Foundation types for the CSDL semantic model.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`Span`], [`Position`] - Source locations copied from the syntax tree
//! - [`names`] - Splitting of qualified names, collection wrappers and paths
//! - [`primitive`] - The `Edm.*` primitive type catalog
//!
//! This module has NO dependencies on other crate modules.

pub mod names;
mod position;
pub mod primitive;

pub use position::{Position, Span};
pub use primitive::{EDM_NAMESPACE, PrimitiveKind, lookup_primitive_kind};
