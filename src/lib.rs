//! # csdl-semantic-base
//!
//! Resolved semantic model for CSDL (OData EDM) schema documents.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! hir       → Semantic model: lazy, memoized, cycle-safe resolution
//!   ↓
//! syntax    → CSDL syntax tree with raw name/path strings and spans
//!   ↓
//! base      → Primitives (Span, qualified names, Edm primitive catalog)
//! ```
//!
//! ## Example
//!
//! ```
//! use csdl::hir::{HasErrors, Model, Resolution, SchemaType};
//! use csdl::syntax::{CsdlDocument, CsdlSchema, CsdlStructuredType};
//!
//! let document = CsdlDocument::new().with_schema(
//!     CsdlSchema::new("Sales")
//!         .with_alias("S")
//!         .with_type(CsdlStructuredType::entity("Customer"))
//!         .with_type(CsdlStructuredType::entity("VipCustomer").with_base_type("S.Customer")),
//! );
//! let model = Model::new(document);
//!
//! let Resolution::Resolved(SchemaType::Structured(vip)) = model.find_type("S.VipCustomer") else {
//!     panic!("VipCustomer should resolve");
//! };
//! let base = vip.base_type(&model).and_then(Resolution::into_resolved);
//! assert_eq!(base.map(|b| b.full_name(&model)), Some("Sales.Customer".into()));
//! assert!(!vip.has_errors(&model));
//! ```

// ============================================================================
// MODULES (dependency order: base → syntax → hir)
// ============================================================================

/// Foundation types: Span, qualified names, Edm primitives
pub mod base;

/// Syntax: CSDL document tree consumed by the semantic model
pub mod syntax;

/// High-level IR: the resolved semantic model
pub mod hir;

// Re-export foundation types
pub use base::{EDM_NAMESPACE, Position, PrimitiveKind, Span};

// Re-export the model entry points
pub use hir::{EdmError, ErrorCode, HasErrors, Model, ModelOptions, Resolution};
