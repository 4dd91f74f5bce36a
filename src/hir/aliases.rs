//! Namespace ↔ alias table of one document.

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::Span;
use crate::base::names::is_simple_identifier;

use super::diagnostics::{EdmError, ErrorCode};

/// Bidirectional namespace/alias map.
///
/// A namespace has at most one alias and an alias names at most one
/// namespace. Registering a conflicting pair keeps the first binding and
/// reports the collision. Aliases must be simple identifiers.
#[derive(Clone, Debug, Default)]
pub struct AliasTable {
    alias_by_namespace: IndexMap<SmolStr, SmolStr>,
    namespace_by_alias: IndexMap<SmolStr, SmolStr>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        namespace: &str,
        alias: &str,
        location: Option<Span>,
    ) -> Result<(), EdmError> {
        if !is_simple_identifier(alias) {
            return Err(EdmError::located(
                ErrorCode::InvalidAlias,
                location,
                format!("The alias '{alias}' of namespace '{namespace}' is not a simple identifier."),
            ));
        }
        if let Some(existing) = self.alias_by_namespace.get(namespace) {
            if existing == alias {
                return Ok(());
            }
            return Err(EdmError::located(
                ErrorCode::DuplicateAlias,
                location,
                format!(
                    "The namespace '{namespace}' already has the alias '{existing}'; alias '{alias}' is ignored."
                ),
            ));
        }
        if let Some(existing) = self.namespace_by_alias.get(alias) {
            return Err(EdmError::located(
                ErrorCode::DuplicateAlias,
                location,
                format!(
                    "The alias '{alias}' is already used for namespace '{existing}' and cannot also name '{namespace}'."
                ),
            ));
        }
        self.alias_by_namespace
            .insert(SmolStr::new(namespace), SmolStr::new(alias));
        self.namespace_by_alias
            .insert(SmolStr::new(alias), SmolStr::new(namespace));
        Ok(())
    }

    pub fn alias_of(&self, namespace: &str) -> Option<&str> {
        self.alias_by_namespace.get(namespace).map(SmolStr::as_str)
    }

    pub fn namespace_of(&self, alias: &str) -> Option<&str> {
        self.namespace_by_alias.get(alias).map(SmolStr::as_str)
    }

    /// Substitute a leading alias with its namespace.
    ///
    /// `S.Widget` becomes `NS.Long.Widget` when `S` aliases `NS.Long`.
    /// Returns `None` when the name does not start with a known alias.
    pub fn replace_alias(&self, name: &str) -> Option<String> {
        let (prefix, rest) = name.split_once('.')?;
        let namespace = self.namespace_of(prefix)?;
        Some(format!("{namespace}.{rest}"))
    }

    pub fn len(&self) -> usize {
        self.alias_by_namespace.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alias_by_namespace.is_empty()
    }
}
