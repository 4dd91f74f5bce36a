//! Navigation resolver — navigation targets, partners and bindings.

use smol_str::SmolStr;

use crate::base::Span;
use crate::base::names::{split_path, strip_collection};
use crate::syntax::{
    CsdlFacets, CsdlNavigationProperty, CsdlNavigationPropertyBinding, OnDeleteAction,
};

use super::diagnostics::{EdmError, ErrorCode, HasErrors};
use super::ids::{ContainerId, EntitySetId, PropertyId, SingletonId, StructuredTypeId};
use super::memo::Memo;
use super::model::Model;
use super::resolution::{PlaceholderKind, Resolution};
use super::structured::{PropertySyntax, resolve_property_path};
use super::types::{SchemaType, TypeReference};

/// Lazily computed navigation-only state of a property node.
#[derive(Debug, Default)]
pub(crate) struct NavigationNode {
    partner: Memo<Option<Resolution<PropertyId>>>,
    constraints: Memo<Vec<ReferentialConstraint>>,
}

/// A resolved `ReferentialConstraint`.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferentialConstraint {
    /// Property of the declaring (dependent) type.
    pub property: Resolution<PropertyId>,
    /// Property of the target (principal) type.
    pub referenced_property: Resolution<PropertyId>,
    pub location: Span,
}

/// Entity set or singleton.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NavigationSource {
    EntitySet(EntitySetId),
    Singleton(SingletonId),
}

impl NavigationSource {
    pub fn name(self, model: &Model) -> &str {
        match self {
            NavigationSource::EntitySet(id) => id.name(model),
            NavigationSource::Singleton(id) => id.name(model),
        }
    }

    pub fn entity_type(self, model: &Model) -> Resolution<StructuredTypeId> {
        match self {
            NavigationSource::EntitySet(id) => id.entity_type(model),
            NavigationSource::Singleton(id) => id.entity_type(model),
        }
    }
}

/// A resolved `NavigationPropertyBinding`.
#[derive(Clone, Debug, PartialEq)]
pub struct NavigationBinding {
    pub path: SmolStr,
    pub navigation_property: Resolution<PropertyId>,
    pub target: Resolution<NavigationSource>,
    pub location: Span,
}

impl HasErrors for NavigationBinding {
    fn errors(&self, model: &Model) -> Vec<EdmError> {
        let mut errors = self.navigation_property.errors(model);
        errors.extend(self.target.errors(model));
        errors
    }
}

/// Target type of a navigation property. Collection-valued navigation
/// properties are never nullable; single-valued ones default to nullable.
pub(crate) fn navigation_type_reference(model: &Model, syntax: &CsdlNavigationProperty) -> TypeReference {
    let is_collection = strip_collection(&syntax.type_name).is_some();
    let nullable = !is_collection && syntax.nullable.unwrap_or(true);
    let reference = model.resolve_type_reference(
        &syntax.type_name,
        Some(nullable),
        &CsdlFacets::default(),
        syntax.location,
    );

    let definition = match reference.definition() {
        Resolution::Resolved(ty) if ty.is_entity(model) => return reference,
        Resolution::Resolved(ty) => unresolved_entity_type(&ty.full_name(model), syntax.location),
        Resolution::Unresolved(placeholder)
            if placeholder.error().code == ErrorCode::InvalidTypeName =>
        {
            return reference;
        }
        Resolution::Unresolved(placeholder) => {
            unresolved_entity_type(placeholder.name(), syntax.location)
        }
        Resolution::Ambiguous(_) => return reference,
    };
    TypeReference::new(definition, reference.is_collection(), nullable)
}

fn unresolved_entity_type(name: &str, location: Span) -> Resolution<SchemaType> {
    Resolution::unresolved(
        PlaceholderKind::EntityType,
        name,
        EdmError::at(
            ErrorCode::BadUnresolvedEntityType,
            location,
            format!("The entity type '{name}' could not be found."),
        ),
    )
}

// ============================================================================
// NAVIGATION PROPERTIES
// ============================================================================

impl PropertyId {
    fn navigation(self, model: &Model) -> Option<(&Model, &CsdlNavigationProperty, &NavigationNode)> {
        match model.property(self) {
            (owner, PropertySyntax::Navigation(syntax), node) => Some((owner, syntax, &node.navigation)),
            (_, PropertySyntax::Structural(_), _) => None,
        }
    }

    /// Target entity type of a navigation property; `None` for structural
    /// properties.
    pub fn target_type(self, model: &Model) -> Option<Resolution<StructuredTypeId>> {
        self.navigation(model)?;
        Some(match self.type_reference(model).definition() {
            Resolution::Resolved(ty) => match ty.as_structured() {
                Some(target) => Resolution::Resolved(target),
                None => {
                    let name = ty.full_name(model);
                    Resolution::unresolved(
                        PlaceholderKind::EntityType,
                        name.clone(),
                        EdmError::new(
                            ErrorCode::BadUnresolvedEntityType,
                            format!("The entity type '{name}' could not be found."),
                        ),
                    )
                }
            },
            Resolution::Unresolved(placeholder) => Resolution::Unresolved(placeholder.clone()),
            Resolution::Ambiguous(ambiguity) => Resolution::ambiguous(
                ambiguity.name(),
                ambiguity
                    .candidates()
                    .iter()
                    .filter_map(|ty| ty.as_structured())
                    .collect(),
                None,
            ),
        })
    }

    /// Whether the navigation property is collection-valued.
    pub fn is_collection(self, model: &Model) -> bool {
        self.type_reference(model).is_collection()
    }

    pub fn is_nullable(self, model: &Model) -> bool {
        self.type_reference(model).is_nullable()
    }

    pub fn contains_target(self, model: &Model) -> bool {
        self.navigation(model)
            .is_some_and(|(_, syntax, _)| syntax.contains_target)
    }

    pub fn on_delete(self, model: &Model) -> Option<OnDeleteAction> {
        self.navigation(model).and_then(|(_, syntax, _)| syntax.on_delete)
    }

    /// The partner navigation property.
    ///
    /// An explicit `Partner` path is walked from the target type. Without
    /// one, the target type's navigation properties are searched for one
    /// whose own partner is this property. `None` means there is no partner,
    /// which is not an error.
    pub fn partner(self, model: &Model) -> Option<Resolution<PropertyId>> {
        let (owner, syntax, node) = self.navigation(model)?;
        node.partner
            .get_or_cycle(|| compute_partner(owner, self, syntax), || None)
    }

    pub fn referential_constraints(self, model: &Model) -> &[ReferentialConstraint] {
        let Some((owner, syntax, node)) = self.navigation(model) else {
            return &[];
        };
        node.constraints.get_or_compute(|| {
            let target = self.target_type(owner).and_then(Resolution::into_resolved);
            syntax
                .referential_constraints
                .iter()
                .map(|constraint| ReferentialConstraint {
                    property: resolve_property_path(
                        owner,
                        self.owner(),
                        &constraint.property,
                        constraint.location,
                    ),
                    referenced_property: match target {
                        Some(target) => resolve_property_path(
                            owner,
                            target,
                            &constraint.referenced_property,
                            constraint.location,
                        ),
                        None => Resolution::unresolved(
                            PlaceholderKind::Property,
                            constraint.referenced_property.as_str(),
                            EdmError::at(
                                ErrorCode::BadUnresolvedProperty,
                                constraint.location,
                                format!(
                                    "The referenced property '{}' cannot be resolved without a target type.",
                                    constraint.referenced_property
                                ),
                            ),
                        ),
                    },
                    location: constraint.location,
                })
                .collect()
        })
    }

    pub(crate) fn navigation_errors(self, model: &Model) -> Vec<EdmError> {
        let Some((_, syntax, _)) = self.navigation(model) else {
            return Vec::new();
        };
        let mut errors = Vec::new();
        if syntax.nullable.is_some() && self.is_collection(model) {
            errors.push(EdmError::at(
                ErrorCode::NavigationPropertyWithCollectionTypeCannotHaveNullableAttribute,
                syntax.location,
                format!(
                    "The collection-valued navigation property '{}' cannot have a Nullable attribute.",
                    syntax.name
                ),
            ));
        }
        if syntax.partner.is_some() {
            errors.extend(self.partner(model).errors(model));
        }
        for constraint in self.referential_constraints(model) {
            errors.extend(constraint.property.errors(model));
            errors.extend(constraint.referenced_property.errors(model));
        }
        errors
    }
}

fn compute_partner(
    owner: &Model,
    id: PropertyId,
    syntax: &CsdlNavigationProperty,
) -> Option<Resolution<PropertyId>> {
    let target = id.target_type(owner)?.into_resolved()?;

    if let Some(path) = syntax.partner.as_deref() {
        let partner = resolve_navigation_path(owner, target, path, syntax.location);
        tracing::trace!(
            "[NAVIGATION] explicit partner '{}' of '{}' resolved: {}",
            path,
            syntax.name,
            partner.is_resolved()
        );
        return Some(partner);
    }

    if !owner.options().reciprocal_partner_search {
        return None;
    }
    let found = target.navigation_properties(owner).into_iter().find(|candidate| {
        *candidate != id
            && candidate
                .partner(owner)
                .and_then(Resolution::into_resolved)
                == Some(id)
    });
    tracing::trace!(
        "[NAVIGATION] reciprocal partner of '{}': {}",
        syntax.name,
        found.map_or("none", |partner| partner.name(owner))
    );
    found.map(Resolution::Resolved)
}

/// Walk a navigation path from `start`. Property segments descend into the
/// property's type; qualified segments are type casts to a derived type.
/// The final segment must name a navigation property.
pub(crate) fn resolve_navigation_path(
    model: &Model,
    start: StructuredTypeId,
    path: &str,
    location: Span,
) -> Resolution<PropertyId> {
    let unresolved = |from: StructuredTypeId| {
        Resolution::unresolved(
            PlaceholderKind::NavigationPropertyPath,
            path,
            EdmError::at(
                ErrorCode::BadUnresolvedNavigationPropertyPath,
                location,
                format!(
                    "The navigation property path '{path}' could not be resolved from type '{}'.",
                    from.full_name(model)
                ),
            ),
        )
    };

    let segments = split_path(path.trim());
    let last = segments.len().saturating_sub(1);
    let mut current = start;
    for (position, segment) in segments.iter().enumerate() {
        if segment.contains('.') {
            let cast = model
                .resolve_type_name(segment, Some(location))
                .resolved()
                .and_then(|ty| ty.as_structured());
            match cast {
                Some(cast) if position != last && cast.is_or_derives_from(model, current) => {
                    current = cast;
                    continue;
                }
                _ => return unresolved(current),
            }
        }

        let Some(property) = current.find_property(model, segment) else {
            return unresolved(current);
        };
        if position == last {
            return if property.is_navigation(model) {
                Resolution::Resolved(property)
            } else {
                unresolved(current)
            };
        }
        match property.type_reference(model).as_structured() {
            Some(next) => current = next,
            None => return unresolved(current),
        }
    }
    unresolved(start)
}

/// Resolve one navigation property binding of a source in `container`.
pub(crate) fn resolve_binding(
    model: &Model,
    container: ContainerId,
    source_type: &Resolution<StructuredTypeId>,
    syntax: &CsdlNavigationPropertyBinding,
) -> NavigationBinding {
    let navigation_property = match source_type {
        Resolution::Resolved(ty) => resolve_navigation_path(model, *ty, &syntax.path, syntax.location),
        _ => Resolution::unresolved(
            PlaceholderKind::NavigationPropertyPath,
            syntax.path.as_str(),
            EdmError::at(
                ErrorCode::BadUnresolvedNavigationPropertyPath,
                syntax.location,
                format!(
                    "The navigation property path '{}' has no resolved source type.",
                    syntax.path
                ),
            ),
        ),
    };

    NavigationBinding {
        path: SmolStr::new(&syntax.path),
        navigation_property,
        target: resolve_binding_target(model, container, &syntax.target, syntax.location),
        location: syntax.location,
    }
}

/// `Set`, `Singleton`, or `NS.Container/Set`.
fn resolve_binding_target(
    model: &Model,
    container: ContainerId,
    target: &str,
    location: Span,
) -> Resolution<NavigationSource> {
    let segments = split_path(target.trim());
    let found = match segments.as_slice() {
        [name] => container.find_navigation_source(model, name),
        [container_name, name] => model
            .resolve_container_name(container_name, Some(location))
            .into_resolved()
            .and_then(|other| other.find_navigation_source(model, name)),
        _ => None,
    };
    match found {
        Some(source) => Resolution::Resolved(source),
        None => Resolution::unresolved(
            PlaceholderKind::EntitySet,
            target,
            EdmError::at(
                ErrorCode::BadUnresolvedEntitySet,
                location,
                format!("The navigation target '{target}' could not be found."),
            ),
        ),
    }
}
