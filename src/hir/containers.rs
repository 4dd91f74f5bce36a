//! Entity containers and their members.
//!
//! `Extends` chains resolve through the same cycle-aware pattern as base
//! types. Lookups of entity sets, singletons and imports search the
//! container first and then the containers it extends.

use smol_str::SmolStr;

use crate::base::Span;
use crate::base::names::split_path;
use crate::syntax::{CsdlEntityContainer, OperationKind};

use super::diagnostics::{EdmError, ErrorCode, HasErrors};
use super::elements::{ElementRef, pending_cycle};
use super::ids::{
    AnnotationId, ContainerId, EntitySetId, OperationId, OperationImportId, ParameterId, SingletonId,
    StructuredTypeId,
};
use super::memo::Memo;
use super::model::Model;
use super::navigation::{NavigationBinding, NavigationSource, resolve_binding};
use super::resolution::{PlaceholderKind, Resolution, Unresolved};
use super::types::SchemaType;

#[derive(Debug)]
pub(crate) struct ContainerNode {
    pub(crate) syntax: CsdlEntityContainer,
    pub(crate) namespace: SmolStr,
    pub(crate) full_name: SmolStr,
    pub(crate) extends: Memo<Option<Resolution<ContainerId>>>,
    entity_sets: Vec<SourceNode>,
    singletons: Vec<SourceNode>,
    imports: Vec<ImportNode>,
}

impl ContainerNode {
    pub(crate) fn new(syntax: CsdlEntityContainer, namespace: SmolStr, full_name: SmolStr) -> Self {
        let entity_sets = syntax.entity_sets.iter().map(|_| SourceNode::default()).collect();
        let singletons = syntax.singletons.iter().map(|_| SourceNode::default()).collect();
        let imports = syntax
            .operation_imports
            .iter()
            .map(|_| ImportNode::default())
            .collect();
        Self {
            syntax,
            namespace,
            full_name,
            extends: Memo::new(),
            entity_sets,
            singletons,
            imports,
        }
    }
}

#[derive(Debug, Default)]
struct SourceNode {
    entity_type: Memo<Resolution<StructuredTypeId>>,
    bindings: Memo<Vec<NavigationBinding>>,
}

#[derive(Debug, Default)]
struct ImportNode {
    operation: Memo<Resolution<OperationId>>,
    entity_set: Memo<Option<Resolution<EntitySetId>>>,
}

// ============================================================================
// CONTAINERS
// ============================================================================

impl ContainerId {
    pub fn name(self, model: &Model) -> &str {
        &model.container(self).1.syntax.name
    }

    pub fn full_name(self, model: &Model) -> SmolStr {
        model.container(self).1.full_name.clone()
    }

    pub fn namespace(self, model: &Model) -> &str {
        &model.container(self).1.namespace
    }

    pub fn location(self, model: &Model) -> Span {
        model.container(self).1.syntax.location
    }

    /// The container named by `Extends`, if any.
    pub fn extends(self, model: &Model) -> Option<Resolution<ContainerId>> {
        let (owner, node) = model.container(self);
        node.extends
            .get_or_cycle(|| compute_extends(owner, node), || Some(cyclic_extends(node, ElementRef::Container(self))))
    }

    /// This container followed by every container it (transitively) extends.
    pub fn lineage(self, model: &Model) -> Vec<ContainerId> {
        let mut lineage = vec![self];
        let mut current = self;
        while let Some(Resolution::Resolved(next)) = current.extends(model) {
            if lineage.contains(&next) {
                break;
            }
            lineage.push(next);
            current = next;
        }
        lineage
    }

    pub fn entity_sets(self, model: &Model) -> Vec<EntitySetId> {
        let (_, node) = model.container(self);
        (0..node.entity_sets.len())
            .map(|index| EntitySetId::new(self, index))
            .collect()
    }

    pub fn singletons(self, model: &Model) -> Vec<SingletonId> {
        let (_, node) = model.container(self);
        (0..node.singletons.len())
            .map(|index| SingletonId::new(self, index))
            .collect()
    }

    pub fn operation_imports(self, model: &Model) -> Vec<OperationImportId> {
        let (_, node) = model.container(self);
        (0..node.imports.len())
            .map(|index| OperationImportId::new(self, index))
            .collect()
    }

    /// Entity sets of this container and of every extended container.
    pub fn all_entity_sets(self, model: &Model) -> Vec<EntitySetId> {
        self.lineage(model)
            .into_iter()
            .flat_map(|container| container.entity_sets(model))
            .collect()
    }

    pub fn find_entity_set(self, model: &Model, name: &str) -> Option<EntitySetId> {
        self.lineage(model).into_iter().find_map(|container| {
            container
                .entity_sets(model)
                .into_iter()
                .find(|set| set.name(model) == name)
        })
    }

    pub fn find_singleton(self, model: &Model, name: &str) -> Option<SingletonId> {
        self.lineage(model).into_iter().find_map(|container| {
            container
                .singletons(model)
                .into_iter()
                .find(|singleton| singleton.name(model) == name)
        })
    }

    /// Imports with this name in the nearest container declaring any.
    pub fn find_operation_imports(self, model: &Model, name: &str) -> Vec<OperationImportId> {
        for container in self.lineage(model) {
            let found: Vec<_> = container
                .operation_imports(model)
                .into_iter()
                .filter(|import| import.name(model) == name)
                .collect();
            if !found.is_empty() {
                return found;
            }
        }
        Vec::new()
    }

    /// Entity set first, then singleton.
    pub fn find_navigation_source(self, model: &Model, name: &str) -> Option<NavigationSource> {
        self.find_entity_set(model, name)
            .map(NavigationSource::EntitySet)
            .or_else(|| self.find_singleton(model, name).map(NavigationSource::Singleton))
    }

    pub fn vocabulary_annotations(self, model: &Model) -> Vec<AnnotationId> {
        model.find_vocabulary_annotations(ElementRef::Container(self))
    }
}

impl HasErrors for ContainerId {
    fn errors(&self, model: &Model) -> Vec<EdmError> {
        let mut errors = self.extends(model).errors(model);
        for set in self.entity_sets(model) {
            errors.extend(set.errors(model));
        }
        for singleton in self.singletons(model) {
            errors.extend(singleton.errors(model));
        }
        for import in self.operation_imports(model) {
            errors.extend(import.errors(model));
        }
        errors
    }
}

fn compute_extends(owner: &Model, node: &ContainerNode) -> Option<Resolution<ContainerId>> {
    let raw = node.syntax.extends.as_deref()?;
    Some(match owner.resolve_container_name(raw, Some(node.syntax.location)) {
        Resolution::Resolved(base) => {
            let forced = base.extends(owner);
            match pending_cycle(owner, forced.as_ref()) {
                Some(origin) => cyclic_extends(node, origin),
                None => Resolution::Resolved(base),
            }
        }
        other => other,
    })
}

fn cyclic_extends(node: &ContainerNode, origin: ElementRef) -> Resolution<ContainerId> {
    tracing::debug!("[CONTAINER] extends chain of '{}' is cyclic", node.full_name);
    Resolution::Unresolved(std::rc::Rc::new(Unresolved::cyclic(
        node.full_name.clone(),
        EdmError::at(
            ErrorCode::BadCyclicEntityContainer,
            node.syntax.location,
            format!("The entity container '{}' extends itself.", node.full_name),
        ),
        origin,
    )))
}

/// Entity type of a set or singleton: must be an entity type.
fn resolve_entity_type(model: &Model, raw: &str, location: Span) -> Resolution<StructuredTypeId> {
    let unresolved = |name: &str| {
        Resolution::unresolved(
            PlaceholderKind::EntityType,
            name,
            EdmError::at(
                ErrorCode::BadUnresolvedEntityType,
                location,
                format!("The entity type '{name}' could not be found."),
            ),
        )
    };
    match model.resolve_type_name(raw, Some(location)) {
        Resolution::Resolved(SchemaType::Structured(id)) if id.is_entity(model) => {
            Resolution::Resolved(id)
        }
        Resolution::Resolved(ty) => unresolved(&ty.full_name(model)),
        Resolution::Unresolved(placeholder) => unresolved(placeholder.name()),
        Resolution::Ambiguous(ambiguity) => Resolution::ambiguous(
            ambiguity.name(),
            ambiguity
                .candidates()
                .iter()
                .filter_map(|ty| ty.as_structured())
                .collect(),
            Some(location),
        ),
    }
}

// ============================================================================
// ENTITY SETS AND SINGLETONS
// ============================================================================

impl EntitySetId {
    pub fn name(self, model: &Model) -> &str {
        &model.container(self.owner()).1.syntax.entity_sets[self.index()].name
    }

    pub fn container(self) -> ContainerId {
        self.owner()
    }

    pub fn location(self, model: &Model) -> Span {
        model.container(self.owner()).1.syntax.entity_sets[self.index()].location
    }

    pub fn include_in_service_document(self, model: &Model) -> bool {
        model.container(self.owner()).1.syntax.entity_sets[self.index()].include_in_service_document
    }

    pub fn entity_type(self, model: &Model) -> Resolution<StructuredTypeId> {
        let (owner, node) = model.container(self.owner());
        let syntax = &node.syntax.entity_sets[self.index()];
        node.entity_sets[self.index()]
            .entity_type
            .get_or_compute(|| resolve_entity_type(owner, &syntax.entity_type, syntax.location))
            .clone()
    }

    pub fn navigation_property_bindings(self, model: &Model) -> &[NavigationBinding] {
        let (owner, node) = model.container(self.owner());
        let syntax = &node.syntax.entity_sets[self.index()];
        node.entity_sets[self.index()].bindings.get_or_compute(|| {
            let source = self.entity_type(owner);
            syntax
                .bindings
                .iter()
                .map(|binding| resolve_binding(owner, self.owner(), &source, binding))
                .collect()
        })
    }

    /// Target bound to the navigation property at `path`.
    pub fn find_navigation_target(self, model: &Model, path: &str) -> Option<Resolution<NavigationSource>> {
        self.navigation_property_bindings(model)
            .iter()
            .find(|binding| binding.path == path)
            .map(|binding| binding.target.clone())
    }

    pub fn vocabulary_annotations(self, model: &Model) -> Vec<AnnotationId> {
        model.find_vocabulary_annotations(ElementRef::EntitySet(self))
    }
}

impl HasErrors for EntitySetId {
    fn errors(&self, model: &Model) -> Vec<EdmError> {
        let mut errors = self.entity_type(model).errors(model);
        errors.extend(self.navigation_property_bindings(model).errors(model));
        errors
    }
}

impl SingletonId {
    pub fn name(self, model: &Model) -> &str {
        &model.container(self.owner()).1.syntax.singletons[self.index()].name
    }

    pub fn container(self) -> ContainerId {
        self.owner()
    }

    pub fn location(self, model: &Model) -> Span {
        model.container(self.owner()).1.syntax.singletons[self.index()].location
    }

    pub fn entity_type(self, model: &Model) -> Resolution<StructuredTypeId> {
        let (owner, node) = model.container(self.owner());
        let syntax = &node.syntax.singletons[self.index()];
        node.singletons[self.index()]
            .entity_type
            .get_or_compute(|| resolve_entity_type(owner, &syntax.type_name, syntax.location))
            .clone()
    }

    pub fn navigation_property_bindings(self, model: &Model) -> &[NavigationBinding] {
        let (owner, node) = model.container(self.owner());
        let syntax = &node.syntax.singletons[self.index()];
        node.singletons[self.index()].bindings.get_or_compute(|| {
            let source = self.entity_type(owner);
            syntax
                .bindings
                .iter()
                .map(|binding| resolve_binding(owner, self.owner(), &source, binding))
                .collect()
        })
    }

    pub fn vocabulary_annotations(self, model: &Model) -> Vec<AnnotationId> {
        model.find_vocabulary_annotations(ElementRef::Singleton(self))
    }
}

impl HasErrors for SingletonId {
    fn errors(&self, model: &Model) -> Vec<EdmError> {
        let mut errors = self.entity_type(model).errors(model);
        errors.extend(self.navigation_property_bindings(model).errors(model));
        errors
    }
}

// ============================================================================
// OPERATION IMPORTS
// ============================================================================

impl OperationImportId {
    pub fn name(self, model: &Model) -> &str {
        &model.container(self.owner()).1.syntax.operation_imports[self.index()].name
    }

    pub fn kind(self, model: &Model) -> OperationKind {
        model.container(self.owner()).1.syntax.operation_imports[self.index()].kind
    }

    pub fn container(self) -> ContainerId {
        self.owner()
    }

    pub fn location(self, model: &Model) -> Span {
        model.container(self.owner()).1.syntax.operation_imports[self.index()].location
    }

    pub fn include_in_service_document(self, model: &Model) -> bool {
        model.container(self.owner()).1.syntax.operation_imports[self.index()]
            .include_in_service_document
    }

    /// The imported operation: an unbound operation of the import's kind.
    /// An overloaded function yields `Ambiguous` here; see
    /// [`OperationImportId::operations`] for the whole overload set.
    pub fn operation(self, model: &Model) -> Resolution<OperationId> {
        let (owner, node) = model.container(self.owner());
        let syntax = &node.syntax.operation_imports[self.index()];
        node.imports[self.index()]
            .operation
            .get_or_compute(|| {
                let full_name = owner.qualify(&syntax.operation);
                let candidates: Vec<OperationId> = owner
                    .find_operations(&full_name)
                    .into_iter()
                    .filter(|operation| {
                        !operation.is_bound(owner) && operation.kind(owner) == syntax.kind
                    })
                    .collect();
                Resolution::from_candidates(&full_name, candidates, Some(syntax.location), || {
                    Unresolved::new(
                        PlaceholderKind::Operation,
                        full_name.as_str(),
                        EdmError::at(
                            ErrorCode::BadUnresolvedOperation,
                            syntax.location,
                            format!("The operation '{full_name}' could not be found."),
                        ),
                    )
                })
            })
            .clone()
    }

    /// The entity set returned by the import, when declared.
    pub fn entity_set(self, model: &Model) -> Option<Resolution<EntitySetId>> {
        let (owner, node) = model.container(self.owner());
        let syntax = &node.syntax.operation_imports[self.index()];
        node.imports[self.index()]
            .entity_set
            .get_or_compute(|| {
                let raw = syntax.entity_set.as_deref()?;
                let segments = split_path(raw.trim());
                let found = match segments.as_slice() {
                    [name] => self.owner().find_entity_set(owner, name),
                    [container, name] => owner
                        .resolve_container_name(container, Some(syntax.location))
                        .into_resolved()
                        .and_then(|container| container.find_entity_set(owner, name)),
                    _ => None,
                };
                Some(match found {
                    Some(set) => Resolution::Resolved(set),
                    None => Resolution::unresolved(
                        PlaceholderKind::EntitySet,
                        raw,
                        EdmError::at(
                            ErrorCode::BadUnresolvedEntitySet,
                            syntax.location,
                            format!("The entity set '{raw}' could not be found."),
                        ),
                    ),
                })
            })
            .clone()
    }

    /// Every unbound operation the import covers. A function import covers
    /// all unbound overloads of its function.
    pub fn operations(self, model: &Model) -> Vec<OperationId> {
        self.operation(model).candidates().to_vec()
    }

    /// Parameters of the imported operation when it resolves to exactly one.
    pub fn parameters(self, model: &Model) -> Vec<ParameterId> {
        self.operation(model)
            .resolved()
            .map(|operation| operation.parameters(model))
            .unwrap_or_default()
    }

    pub fn vocabulary_annotations(self, model: &Model) -> Vec<AnnotationId> {
        model.find_vocabulary_annotations(ElementRef::OperationImport(self))
    }
}

impl HasErrors for OperationImportId {
    fn errors(&self, model: &Model) -> Vec<EdmError> {
        let operation = self.operation(model);
        let mut errors = match self.kind(model) {
            OperationKind::Function if operation.is_ambiguous() => Vec::new(),
            _ => operation.errors(model),
        };
        errors.extend(self.entity_set(model).errors(model));
        errors
    }
}
