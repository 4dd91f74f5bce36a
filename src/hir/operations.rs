//! Actions, functions and overload resolution.

use smol_str::SmolStr;

use crate::base::Span;
use crate::syntax::{CsdlOperation, OperationKind};

use super::diagnostics::{EdmError, ErrorCode, HasErrors};
use super::elements::ElementRef;
use super::expressions::Expression;
use super::ids::{AnnotationId, OperationId, ParameterId};
use super::memo::Memo;
use super::model::Model;
use super::resolution::{PlaceholderKind, Resolution};
use super::types::{SchemaType, TypeReference};

#[derive(Debug)]
pub(crate) struct OperationNode {
    pub(crate) syntax: CsdlOperation,
    pub(crate) namespace: SmolStr,
    pub(crate) full_name: SmolStr,
    parameters: Vec<Memo<TypeReference>>,
    return_type: Memo<Option<TypeReference>>,
}

impl OperationNode {
    pub(crate) fn new(syntax: CsdlOperation, namespace: SmolStr, full_name: SmolStr) -> Self {
        let parameters = syntax.parameters.iter().map(|_| Memo::new()).collect();
        Self {
            syntax,
            namespace,
            full_name,
            parameters,
            return_type: Memo::new(),
        }
    }
}

impl OperationId {
    pub fn name(self, model: &Model) -> &str {
        &model.operation(self).1.syntax.name
    }

    pub fn full_name(self, model: &Model) -> SmolStr {
        model.operation(self).1.full_name.clone()
    }

    pub fn namespace(self, model: &Model) -> &str {
        &model.operation(self).1.namespace
    }

    pub fn kind(self, model: &Model) -> OperationKind {
        model.operation(self).1.syntax.kind
    }

    pub fn is_function(self, model: &Model) -> bool {
        self.kind(model) == OperationKind::Function
    }

    pub fn is_action(self, model: &Model) -> bool {
        self.kind(model) == OperationKind::Action
    }

    pub fn is_bound(self, model: &Model) -> bool {
        model.operation(self).1.syntax.is_bound
    }

    pub fn is_composable(self, model: &Model) -> bool {
        model.operation(self).1.syntax.is_composable
    }

    pub fn entity_set_path(self, model: &Model) -> Option<&str> {
        model.operation(self).1.syntax.entity_set_path.as_deref()
    }

    pub fn location(self, model: &Model) -> Span {
        model.operation(self).1.syntax.location
    }

    pub fn parameters(self, model: &Model) -> Vec<ParameterId> {
        let (_, node) = model.operation(self);
        (0..node.parameters.len())
            .map(|index| ParameterId::new(self, index))
            .collect()
    }

    pub fn find_parameter(self, model: &Model, name: &str) -> Option<ParameterId> {
        self.parameters(model)
            .into_iter()
            .find(|parameter| parameter.name(model) == name)
    }

    /// First parameter of a bound operation.
    pub fn binding_parameter(self, model: &Model) -> Option<ParameterId> {
        if !self.is_bound(model) {
            return None;
        }
        self.parameters(model).into_iter().next()
    }

    pub fn return_type(self, model: &Model) -> Option<TypeReference> {
        let (owner, node) = model.operation(self);
        node.return_type
            .get_or_compute(|| {
                let syntax = node.syntax.return_type.as_ref()?;
                Some(owner.resolve_type_reference(
                    &syntax.type_name,
                    syntax.nullable,
                    &syntax.facets,
                    syntax.location,
                ))
            })
            .clone()
    }

    /// `NS.Name(T1,T2)` with parameter types fully qualified.
    pub fn signature(self, model: &Model) -> String {
        let parameters: Vec<String> = self
            .parameters(model)
            .into_iter()
            .map(|parameter| parameter.type_reference(model).full_name(model))
            .collect();
        format!("{}({})", self.full_name(model), parameters.join(","))
    }

    /// Whether the parameter types are exactly `types` (already normalized).
    pub(crate) fn matches_signature(self, model: &Model, types: &[String]) -> bool {
        let parameters = self.parameters(model);
        parameters.len() == types.len()
            && parameters
                .iter()
                .zip(types)
                .all(|(parameter, expected)| parameter.type_reference(model).full_name(model) == *expected)
    }

    /// Arity check plus a cast of every argument to its parameter type.
    pub fn accepts_arguments(self, model: &Model, arguments: &[Expression], strict: bool) -> bool {
        let parameters = self.parameters(model);
        parameters.len() == arguments.len()
            && parameters.iter().zip(arguments).all(|(parameter, argument)| {
                argument.try_cast(model, &parameter.type_reference(model), strict)
            })
    }

    pub fn vocabulary_annotations(self, model: &Model) -> Vec<AnnotationId> {
        model.find_vocabulary_annotations(ElementRef::Operation(self))
    }
}

impl HasErrors for OperationId {
    fn errors(&self, model: &Model) -> Vec<EdmError> {
        let mut errors: Vec<EdmError> = self
            .parameters(model)
            .iter()
            .flat_map(|parameter| parameter.errors(model))
            .collect();
        errors.extend(self.return_type(model).errors(model));
        errors
    }
}

impl ParameterId {
    pub fn name(self, model: &Model) -> &str {
        &model.operation(self.owner()).1.syntax.parameters[self.index()].name
    }

    pub fn operation(self) -> OperationId {
        self.owner()
    }

    pub fn location(self, model: &Model) -> Span {
        model.operation(self.owner()).1.syntax.parameters[self.index()].location
    }

    pub fn type_reference(self, model: &Model) -> TypeReference {
        let (owner, node) = model.operation(self.owner());
        let syntax = &node.syntax.parameters[self.index()];
        node.parameters[self.index()]
            .get_or_compute(|| {
                owner.resolve_type_reference(
                    &syntax.type_name,
                    syntax.nullable,
                    &syntax.facets,
                    syntax.location,
                )
            })
            .clone()
    }

    pub fn vocabulary_annotations(self, model: &Model) -> Vec<AnnotationId> {
        model.find_vocabulary_annotations(ElementRef::Parameter(self))
    }
}

impl HasErrors for ParameterId {
    fn errors(&self, model: &Model) -> Vec<EdmError> {
        self.type_reference(model).errors(model)
    }
}

// ============================================================================
// OVERLOAD RESOLUTION
// ============================================================================

impl Model {
    /// Bind a function call to one overload.
    ///
    /// Candidates are the functions named `name`, in declaration order. A
    /// candidate is compatible when its arity matches and every argument
    /// casts to its parameter type with promotions allowed. Several
    /// compatible candidates are narrowed to the exact (non-promoted)
    /// matches; if that does not leave exactly one, the binding is
    /// ambiguous.
    pub fn resolve_overload(
        &self,
        name: &str,
        arguments: &[Expression],
        location: Option<Span>,
    ) -> Resolution<OperationId> {
        let full_name = self.qualify(name);
        let candidates: Vec<OperationId> = self
            .find_operations(&full_name)
            .into_iter()
            .filter(|operation| operation.is_function(self))
            .collect();
        if candidates.is_empty() {
            return Resolution::unresolved(
                PlaceholderKind::Operation,
                full_name.as_str(),
                EdmError::located(
                    ErrorCode::BadUnresolvedOperation,
                    location,
                    format!("The function '{full_name}' could not be found."),
                ),
            );
        }

        let compatible: Vec<OperationId> = candidates
            .iter()
            .copied()
            .filter(|operation| operation.accepts_arguments(self, arguments, false))
            .collect();
        let resolution = match compatible.as_slice() {
            [] => Resolution::unresolved(
                PlaceholderKind::Operation,
                full_name.as_str(),
                EdmError::located(
                    ErrorCode::NoMatchingOverload,
                    location,
                    format!(
                        "The parameters don't match any of the {} overload(s) of '{full_name}'.",
                        candidates.len()
                    ),
                ),
            ),
            [only] => Resolution::Resolved(*only),
            _ => {
                let exact: Vec<OperationId> = compatible
                    .iter()
                    .copied()
                    .filter(|operation| operation.accepts_arguments(self, arguments, true))
                    .collect();
                match exact.as_slice() {
                    [only] => Resolution::Resolved(*only),
                    [] => Resolution::ambiguous(full_name.as_str(), compatible, location),
                    _ => Resolution::ambiguous(full_name.as_str(), exact, location),
                }
            }
        };

        tracing::trace!(
            "[OVERLOAD] '{}' with {} argument(s): {} candidate(s), resolved={}, ambiguous={}",
            full_name,
            arguments.len(),
            candidates.len(),
            resolution.is_resolved(),
            resolution.is_ambiguous()
        );
        resolution
    }

    /// Bound operations anywhere in this tree whose binding parameter
    /// accepts `binding` (derived types allowed).
    pub fn find_bound_operations(&self, binding: SchemaType, is_collection: bool) -> Vec<OperationId> {
        let actual = TypeReference::new(Resolution::Resolved(binding), false, true);
        let actual = if is_collection { actual.as_collection() } else { actual };

        let mut found = Vec::new();
        for model in self.tree() {
            for operation in model.operations() {
                let Some(parameter) = operation.binding_parameter(self) else {
                    continue;
                };
                if parameter.type_reference(self).accepts(self, &actual, false) {
                    found.push(operation);
                }
            }
        }
        found
    }
}
