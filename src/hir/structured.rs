//! Structured type graph — entity and complex types.
//!
//! Base types resolve lazily through a cycle-aware memo cell. Each base type
//! computation forces the found base type's own base type; a chain that
//! loops back re-enters the cell it started from and receives a cyclic
//! placeholder instead of recursing. Every type on the loop ends up with a
//! cyclic placeholder named after itself, while types that merely derive
//! from a cyclic type still resolve their base normally.

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::Span;
use crate::base::names::split_path;
use crate::syntax::{CsdlNavigationProperty, CsdlProperty, CsdlStructuredType, StructuredKind};

use super::diagnostics::{EdmError, ErrorCode, HasErrors};
use super::elements::{ElementRef, pending_cycle};
use super::ids::{AnnotationId, PropertyId, StructuredTypeId};
use super::memo::Memo;
use super::model::Model;
use super::navigation::NavigationNode;
use super::resolution::{PlaceholderKind, Resolution, Unresolved};
use super::types::{SchemaType, TypeReference};

// ============================================================================
// NODES
// ============================================================================

#[derive(Debug)]
pub(crate) struct StructuredTypeNode {
    pub(crate) syntax: CsdlStructuredType,
    pub(crate) namespace: SmolStr,
    pub(crate) full_name: SmolStr,
    pub(crate) base_type: Memo<Option<Resolution<StructuredTypeId>>>,
    declared_properties: Memo<Vec<PropertyNode>>,
    property_table: Memo<IndexMap<SmolStr, PropertyId>>,
    key: Memo<Option<Vec<KeyProperty>>>,
}

impl StructuredTypeNode {
    pub(crate) fn new(syntax: CsdlStructuredType, namespace: SmolStr, full_name: SmolStr) -> Self {
        Self {
            syntax,
            namespace,
            full_name,
            base_type: Memo::new(),
            declared_properties: Memo::new(),
            property_table: Memo::new(),
            key: Memo::new(),
        }
    }

    /// Wrap each declared property once: structural ones first, then
    /// navigation properties, matching [`PropertyId`] positions.
    fn declared_properties(&self) -> &[PropertyNode] {
        self.declared_properties.get_or_compute(|| {
            let structural = self.syntax.properties.iter().map(|_| PropertyNode::default());
            let navigation = self
                .syntax
                .navigation_properties
                .iter()
                .map(|_| PropertyNode::default());
            structural.chain(navigation).collect()
        })
    }
}

/// Semantic wrapper of one declared property.
#[derive(Debug, Default)]
pub(crate) struct PropertyNode {
    pub(crate) type_reference: Memo<TypeReference>,
    pub(crate) navigation: NavigationNode,
}

/// Borrowed syntax of a property.
#[derive(Clone, Copy, Debug)]
pub(crate) enum PropertySyntax<'a> {
    Structural(&'a CsdlProperty),
    Navigation(&'a CsdlNavigationProperty),
}

impl Model {
    pub(crate) fn property(&self, id: PropertyId) -> (&Model, PropertySyntax<'_>, &PropertyNode) {
        let (owner, node) = self.structured(id.owner());
        let structural = node.syntax.properties.len();
        let syntax = match node.syntax.properties.get(id.index()) {
            Some(property) => PropertySyntax::Structural(property),
            None => PropertySyntax::Navigation(&node.syntax.navigation_properties[id.index() - structural]),
        };
        (owner, syntax, &node.declared_properties()[id.index()])
    }
}

/// Structural or navigation property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Structural,
    Navigation,
}

/// One part of an entity key.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyProperty {
    pub path: SmolStr,
    pub alias: Option<SmolStr>,
    pub property: Resolution<PropertyId>,
    pub location: Span,
}

// ============================================================================
// STRUCTURED TYPES
// ============================================================================

impl StructuredTypeId {
    pub fn name(self, model: &Model) -> &str {
        &model.structured(self).1.syntax.name
    }

    pub fn full_name(self, model: &Model) -> SmolStr {
        model.structured(self).1.full_name.clone()
    }

    pub fn namespace(self, model: &Model) -> &str {
        &model.structured(self).1.namespace
    }

    pub fn kind(self, model: &Model) -> StructuredKind {
        model.structured(self).1.syntax.kind
    }

    pub fn is_entity(self, model: &Model) -> bool {
        self.kind(model) == StructuredKind::Entity
    }

    pub fn is_abstract(self, model: &Model) -> bool {
        model.structured(self).1.syntax.is_abstract
    }

    pub fn is_open(self, model: &Model) -> bool {
        model.structured(self).1.syntax.is_open
    }

    pub fn has_stream(self, model: &Model) -> bool {
        model.structured(self).1.syntax.has_stream
    }

    pub fn location(self, model: &Model) -> Span {
        model.structured(self).1.syntax.location
    }

    /// The resolved base type; `None` when the type declares no base.
    pub fn base_type(self, model: &Model) -> Option<Resolution<StructuredTypeId>> {
        let (owner, node) = model.structured(self);
        node.base_type.get_or_cycle(
            || compute_base_type(owner, node),
            || Some(cyclic_base_type(node, ElementRef::Type(SchemaType::Structured(self)))),
        )
    }

    /// Resolved ancestors, nearest first. Stops at the first base type that
    /// does not resolve.
    pub fn base_types(self, model: &Model) -> Vec<StructuredTypeId> {
        let mut chain = Vec::new();
        let mut current = self;
        while let Some(Resolution::Resolved(base)) = current.base_type(model) {
            if base == self || chain.contains(&base) {
                break;
            }
            chain.push(base);
            current = base;
        }
        chain
    }

    pub fn is_or_derives_from(self, model: &Model, other: StructuredTypeId) -> bool {
        self == other || self.base_types(model).contains(&other)
    }

    /// Properties declared on this type: structural then navigation.
    pub fn declared_properties(self, model: &Model) -> Vec<PropertyId> {
        let (_, node) = model.structured(self);
        (0..node.declared_properties().len())
            .map(|index| PropertyId::new(self, index))
            .collect()
    }

    pub fn declared_structural_properties(self, model: &Model) -> Vec<PropertyId> {
        let (_, node) = model.structured(self);
        (0..node.syntax.properties.len())
            .map(|index| PropertyId::new(self, index))
            .collect()
    }

    pub fn declared_navigation_properties(self, model: &Model) -> Vec<PropertyId> {
        let (_, node) = model.structured(self);
        let offset = node.syntax.properties.len();
        (0..node.syntax.navigation_properties.len())
            .map(|index| PropertyId::new(self, offset + index))
            .collect()
    }

    /// Effective properties, inherited ones first. A redeclared name keeps
    /// its inherited position but takes the more derived declaration.
    pub fn properties(self, model: &Model) -> Vec<PropertyId> {
        self.property_table(model).values().copied().collect()
    }

    pub fn navigation_properties(self, model: &Model) -> Vec<PropertyId> {
        self.properties(model)
            .into_iter()
            .filter(|property| property.is_navigation(model))
            .collect()
    }

    pub fn structural_properties(self, model: &Model) -> Vec<PropertyId> {
        self.properties(model)
            .into_iter()
            .filter(|property| !property.is_navigation(model))
            .collect()
    }

    pub fn find_property(self, model: &Model, name: &str) -> Option<PropertyId> {
        self.property_table(model).get(name).copied()
    }

    fn property_table(self, model: &Model) -> &IndexMap<SmolStr, PropertyId> {
        let (owner, node) = model.structured(self);
        node.property_table.get_or_compute(|| {
            let mut lineage = self.base_types(owner);
            lineage.reverse();
            lineage.push(self);

            let mut table = IndexMap::new();
            for ty in lineage {
                for property in ty.declared_properties(owner) {
                    table.insert(SmolStr::new(property.name(owner)), property);
                }
            }
            table
        })
    }

    /// The declared key, or the key inherited from the nearest base type
    /// declaring one.
    pub fn key(self, model: &Model) -> Option<&[KeyProperty]> {
        if let Some(key) = self.declared_key(model) {
            return Some(key);
        }
        self.base_types(model)
            .into_iter()
            .find_map(|base| base.declared_key(model))
    }

    fn declared_key(self, model: &Model) -> Option<&[KeyProperty]> {
        let (owner, node) = model.structured(self);
        node.key
            .get_or_compute(|| {
                let parts = node.syntax.key.as_ref()?;
                Some(
                    parts
                        .iter()
                        .map(|part| KeyProperty {
                            path: SmolStr::new(&part.name),
                            alias: part.alias.as_deref().map(SmolStr::new),
                            property: resolve_property_path(owner, self, &part.name, part.location),
                            location: part.location,
                        })
                        .collect(),
                )
            })
            .as_deref()
    }

    pub fn vocabulary_annotations(self, model: &Model) -> Vec<AnnotationId> {
        model.find_vocabulary_annotations(ElementRef::Type(SchemaType::Structured(self)))
    }
}

impl HasErrors for StructuredTypeId {
    fn errors(&self, model: &Model) -> Vec<EdmError> {
        let mut errors = self.base_type(model).errors(model);
        for property in self.declared_properties(model) {
            errors.extend(property.errors(model));
        }
        if let Some(key) = self.declared_key(model) {
            for part in key {
                errors.extend(part.property.errors(model));
            }
        }
        errors
    }
}

fn compute_base_type(
    owner: &Model,
    node: &StructuredTypeNode,
) -> Option<Resolution<StructuredTypeId>> {
    let raw = node.syntax.base_type.as_deref()?;
    let location = Some(node.syntax.location);
    let kind = node.syntax.kind;

    let candidates = match owner.resolve_type_name(raw, location) {
        Resolution::Resolved(ty) => vec![ty],
        Resolution::Ambiguous(ambiguity) => ambiguity.candidates().to_vec(),
        Resolution::Unresolved(placeholder) => {
            return Some(unresolved_of_kind(kind, placeholder.name(), node.syntax.location));
        }
    };
    let candidates: Vec<StructuredTypeId> = candidates
        .into_iter()
        .filter_map(SchemaType::as_structured)
        .filter(|candidate| candidate.kind(owner) == kind)
        .collect();
    let full_name = owner.qualify(raw);

    match candidates.as_slice() {
        [] => Some(unresolved_of_kind(kind, &full_name, node.syntax.location)),
        [base] => {
            // Inductive step: force the base's own base type.
            let forced = base.base_type(owner);
            match pending_cycle(owner, forced.as_ref()) {
                Some(origin) => Some(cyclic_base_type(node, origin)),
                None => Some(Resolution::Resolved(*base)),
            }
        }
        _ => Some(Resolution::ambiguous(full_name, candidates, location)),
    }
}

fn cyclic_base_type(node: &StructuredTypeNode, origin: ElementRef) -> Resolution<StructuredTypeId> {
    tracing::debug!("[STRUCTURE] base type chain of '{}' is cyclic", node.full_name);
    let code = match node.syntax.kind {
        StructuredKind::Entity => ErrorCode::BadCyclicEntity,
        StructuredKind::Complex => ErrorCode::BadCyclicComplex,
    };
    Resolution::Unresolved(std::rc::Rc::new(Unresolved::cyclic(
        node.full_name.clone(),
        EdmError::at(
            code,
            node.syntax.location,
            format!("The base type of '{}' is cyclic.", node.full_name),
        ),
        origin,
    )))
}

fn unresolved_of_kind(kind: StructuredKind, name: &str, location: Span) -> Resolution<StructuredTypeId> {
    let (placeholder, code, what) = match kind {
        StructuredKind::Entity => (
            PlaceholderKind::EntityType,
            ErrorCode::BadUnresolvedEntityType,
            "entity type",
        ),
        StructuredKind::Complex => (
            PlaceholderKind::ComplexType,
            ErrorCode::BadUnresolvedComplexType,
            "complex type",
        ),
    };
    Resolution::unresolved(
        placeholder,
        name,
        EdmError::at(code, location, format!("The {what} '{name}' could not be found.")),
    )
}

/// Walk a `/`-separated property path (`Address/Street`) from `start`.
/// Intermediate segments must be structural properties of structured type.
pub(crate) fn resolve_property_path(
    model: &Model,
    start: StructuredTypeId,
    path: &str,
    location: Span,
) -> Resolution<PropertyId> {
    let mut current = start;
    let segments = split_path(path);
    let last = segments.len().saturating_sub(1);
    for (position, segment) in segments.iter().enumerate() {
        let Some(property) = current.find_property(model, segment) else {
            return unresolved_property(current, model, segment, location);
        };
        if position == last {
            return Resolution::Resolved(property);
        }
        match property.type_reference(model).as_structured() {
            Some(next) => current = next,
            None => return unresolved_property(current, model, path, location),
        }
    }
    unresolved_property(start, model, path, location)
}

fn unresolved_property(
    ty: StructuredTypeId,
    model: &Model,
    name: &str,
    location: Span,
) -> Resolution<PropertyId> {
    Resolution::unresolved(
        PlaceholderKind::Property,
        name,
        EdmError::at(
            ErrorCode::BadUnresolvedProperty,
            location,
            format!(
                "The property '{name}' could not be found on type '{}'.",
                ty.full_name(model)
            ),
        ),
    )
}

// ============================================================================
// PROPERTIES
// ============================================================================

impl PropertyId {
    pub fn name(self, model: &Model) -> &str {
        match model.property(self).1 {
            PropertySyntax::Structural(property) => &property.name,
            PropertySyntax::Navigation(navigation) => &navigation.name,
        }
    }

    pub fn kind(self, model: &Model) -> PropertyKind {
        match model.property(self).1 {
            PropertySyntax::Structural(_) => PropertyKind::Structural,
            PropertySyntax::Navigation(_) => PropertyKind::Navigation,
        }
    }

    pub fn is_navigation(self, model: &Model) -> bool {
        self.kind(model) == PropertyKind::Navigation
    }

    pub fn declaring_type(self) -> StructuredTypeId {
        self.owner()
    }

    pub fn location(self, model: &Model) -> Span {
        match model.property(self).1 {
            PropertySyntax::Structural(property) => property.location,
            PropertySyntax::Navigation(navigation) => navigation.location,
        }
    }

    /// Raw `DefaultValue` of a structural property.
    pub fn default_value(self, model: &Model) -> Option<&str> {
        match model.property(self).1 {
            PropertySyntax::Structural(property) => property.default_value.as_deref(),
            PropertySyntax::Navigation(_) => None,
        }
    }

    /// The property's type. For navigation properties this is the target
    /// entity type (see [`PropertyId::target_type`]).
    pub fn type_reference(self, model: &Model) -> TypeReference {
        let (owner, syntax, node) = model.property(self);
        node.type_reference
            .get_or_compute(|| match syntax {
                PropertySyntax::Structural(property) => owner.resolve_type_reference(
                    &property.type_name,
                    property.nullable,
                    &property.facets,
                    property.location,
                ),
                PropertySyntax::Navigation(navigation) => {
                    super::navigation::navigation_type_reference(owner, navigation)
                }
            })
            .clone()
    }

    pub fn vocabulary_annotations(self, model: &Model) -> Vec<AnnotationId> {
        model.find_vocabulary_annotations(ElementRef::Property(self))
    }
}

impl HasErrors for PropertyId {
    fn errors(&self, model: &Model) -> Vec<EdmError> {
        let mut errors = self.type_reference(model).errors(model);
        if self.is_navigation(model) {
            errors.extend(self.navigation_errors(model));
        }
        errors
    }
}
