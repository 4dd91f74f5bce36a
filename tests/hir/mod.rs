//! HIR layer tests
//!
//! Tests for the resolved semantic model:
//! - Base type, base term and container chains, including cycles
//! - Alias handling and referenced documents
//! - Overload resolution
//! - Navigation partners and bindings
//! - Annotation targets and expressions

pub mod tests_annotation_targets;
pub mod tests_containers;
pub mod tests_cycles;
pub mod tests_expressions;
pub mod tests_navigation;
pub mod tests_overloads;
pub mod tests_references;
