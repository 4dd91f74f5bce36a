//! Vocabulary annotations and annotation target resolution.
//!
//! Inline annotations are bound to their owner at construction. Out-of-line
//! ones carry a `/`-delimited target path that is resolved on first request,
//! by segment count:
//!
//! ```text
//! 1 segment    NS.Type | NS.Term | NS.Fn(Edm.Int32) | NS.Container
//! 2 segments   Container/Member | Type/Property | Enum/Member
//!              | Fn/parameter | Fn/$ReturnType
//! 3 segments   Container/Import/parameter | Container/Import/$ReturnType
//! otherwise    impossible target
//! ```

use smol_str::SmolStr;

use crate::base::Span;
use crate::base::names::{parse_operation_signature, split_path, split_qualified, strip_collection};
use crate::syntax::CsdlAnnotation;

use super::diagnostics::{EdmError, ErrorCode, HasErrors};
use super::elements::ElementRef;
use super::expressions::Expression;
use super::ids::{AnnotationId, ContainerId, OperationId, TermId};
use super::memo::Memo;
use super::model::{Model, ReferencedModel};
use super::resolution::{PlaceholderKind, Resolution};
use super::types::SchemaType;

const RETURN_TYPE: &str = "$ReturnType";

#[derive(Debug)]
enum Placement {
    Inline(ElementRef),
    OutOfLine {
        raw_target: String,
        normalized: String,
        block_qualifier: Option<String>,
        block_location: Span,
    },
}

#[derive(Debug)]
pub(crate) struct AnnotationNode {
    syntax: CsdlAnnotation,
    placement: Placement,
    term: Memo<Resolution<TermId>>,
    target: Memo<Resolution<ElementRef>>,
    value: Memo<Option<Expression>>,
}

impl AnnotationNode {
    pub(crate) fn inline(syntax: CsdlAnnotation, owner: ElementRef) -> Self {
        Self::new(syntax, Placement::Inline(owner))
    }

    pub(crate) fn out_of_line(
        syntax: CsdlAnnotation,
        raw_target: &str,
        normalized: String,
        block_qualifier: Option<&str>,
        block_location: Span,
    ) -> Self {
        Self::new(
            syntax,
            Placement::OutOfLine {
                raw_target: raw_target.to_string(),
                normalized,
                block_qualifier: block_qualifier.map(str::to_string),
                block_location,
            },
        )
    }

    fn new(syntax: CsdlAnnotation, placement: Placement) -> Self {
        Self {
            syntax,
            placement,
            term: Memo::new(),
            target: Memo::new(),
            value: Memo::new(),
        }
    }
}

impl AnnotationId {
    pub fn term(self, model: &Model) -> Resolution<TermId> {
        let (owner, node) = model.annotation(self);
        node.term
            .get_or_compute(|| owner.resolve_term_name(&node.syntax.term, Some(node.syntax.location)))
            .clone()
    }

    /// Alias-resolved term name, whether or not the term exists.
    pub fn term_name(self, model: &Model) -> String {
        let (owner, node) = model.annotation(self);
        owner.qualify(&node.syntax.term)
    }

    /// The annotation's own qualifier, else that of its `Annotations` block.
    pub fn qualifier(self, model: &Model) -> Option<&str> {
        let (_, node) = model.annotation(self);
        match (&node.syntax.qualifier, &node.placement) {
            (Some(qualifier), _) => Some(qualifier),
            (None, Placement::OutOfLine { block_qualifier, .. }) => block_qualifier.as_deref(),
            (None, Placement::Inline(_)) => None,
        }
    }

    pub fn is_inline(self, model: &Model) -> bool {
        matches!(model.annotation(self).1.placement, Placement::Inline(_))
    }

    /// Target path as written; `None` for inline annotations.
    pub fn target_path(self, model: &Model) -> Option<&str> {
        match &model.annotation(self).1.placement {
            Placement::Inline(_) => None,
            Placement::OutOfLine { raw_target, .. } => Some(raw_target),
        }
    }

    pub fn target(self, model: &Model) -> Resolution<ElementRef> {
        let (owner, node) = model.annotation(self);
        match &node.placement {
            Placement::Inline(element) => Resolution::Resolved(*element),
            Placement::OutOfLine {
                raw_target,
                normalized,
                block_location,
                ..
            } => node
                .target
                .get_or_compute(|| owner.resolve_annotation_target(normalized, raw_target, *block_location))
                .clone(),
        }
    }

    pub fn value<'m>(self, model: &'m Model) -> Option<&'m Expression> {
        let (owner, node) = model.annotation(self);
        node.value
            .get_or_compute(|| {
                node.syntax
                    .value
                    .as_ref()
                    .map(|syntax| Expression::build(owner, syntax))
            })
            .as_ref()
    }

    pub fn location(self, model: &Model) -> Span {
        model.annotation(self).1.syntax.location
    }

    /// Namespace of the annotated element, taken from the first segment of
    /// its path.
    fn target_namespace(self, model: &Model) -> Option<String> {
        let (owner, node) = model.annotation(self);
        let path = match &node.placement {
            Placement::Inline(element) => element.path(owner),
            Placement::OutOfLine { normalized, .. } => normalized.clone(),
        };
        let first = split_path(&path).first().copied().unwrap_or_default();
        let name = parse_operation_signature(first).map_or(first, |signature| signature.name);
        split_qualified(name).map(|(namespace, _)| namespace.to_string())
    }
}

impl HasErrors for AnnotationId {
    fn errors(&self, model: &Model) -> Vec<EdmError> {
        let mut errors = self.term(model).errors(model);
        if !self.is_inline(model) {
            errors.extend(self.target(model).errors(model));
        }
        if let Some(value) = self.value(model) {
            errors.extend(value.errors(model));
        }
        errors
    }
}

impl ReferencedModel {
    /// Whether an `edmx:IncludeAnnotations` of this reference selects
    /// `annotation` (term namespace, then optional qualifier and target
    /// namespace).
    pub(crate) fn selects(&self, annotation: AnnotationId) -> bool {
        let model = self.model();
        let term = annotation.term_name(model);
        let Some((term_namespace, _)) = split_qualified(&term) else {
            return false;
        };
        self.include_annotations().iter().any(|include| {
            include.term_namespace == term_namespace
                && include
                    .qualifier
                    .as_deref()
                    .is_none_or(|qualifier| annotation.qualifier(model) == Some(qualifier))
                && include.target_namespace.as_deref().is_none_or(|namespace| {
                    annotation.target_namespace(model).as_deref() == Some(namespace)
                })
        })
    }
}

// ============================================================================
// TARGET RESOLUTION
// ============================================================================

impl Model {
    /// Replace aliases in every segment of a target path, including the
    /// parameter types of an operation signature. Signatures are rewritten
    /// without spaces.
    pub(crate) fn normalize_target_path(&self, target: &str) -> String {
        split_path(target.trim())
            .into_iter()
            .map(|segment| self.normalize_segment(segment))
            .collect::<Vec<_>>()
            .join("/")
    }

    fn normalize_segment(&self, segment: &str) -> String {
        let segment = segment.trim();
        if !segment.contains('(') {
            return self.qualify(segment);
        }
        let Some(signature) = parse_operation_signature(segment) else {
            return segment.to_string();
        };
        let parameters: Vec<String> = signature
            .parameters
            .unwrap_or_default()
            .into_iter()
            .map(|parameter| match strip_collection(parameter) {
                Some(element) => format!("Collection({})", self.qualify(element)),
                None => self.qualify(parameter),
            })
            .collect();
        format!("{}({})", self.qualify(signature.name), parameters.join(","))
    }

    /// Resolve an alias-normalized target path. `raw` is only used in
    /// error messages.
    pub(crate) fn resolve_annotation_target(
        &self,
        path: &str,
        raw: &str,
        location: Span,
    ) -> Resolution<ElementRef> {
        let segments = split_path(path);
        let resolution = match segments.as_slice() {
            [first] => self.resolve_element_segment(first, raw, location),
            [first, second] => self.resolve_member_segment(first, second, raw, location),
            [container, import, last] => self.resolve_import_segment(container, import, last, raw, location),
            _ => Resolution::unresolved(
                PlaceholderKind::ImpossibleTarget,
                raw,
                EdmError::at(
                    ErrorCode::ImpossibleAnnotationsTarget,
                    location,
                    format!(
                        "The annotation target '{raw}' has {} segments; a target has one to three.",
                        segments.len()
                    ),
                ),
            ),
        };
        tracing::trace!(
            "[MODEL] annotation target '{}': resolved={}, ambiguous={}",
            raw,
            resolution.is_resolved(),
            resolution.is_ambiguous()
        );
        resolution
    }

    /// Schema type, then term, then operation, then container.
    fn resolve_element_segment(&self, segment: &str, raw: &str, location: Span) -> Resolution<ElementRef> {
        let Some(signature) = parse_operation_signature(segment) else {
            return unresolved_type(raw, location);
        };
        if signature.parameters.is_none() {
            let types = self.type_candidates(signature.name);
            if !types.is_empty() {
                return collapse(raw, types.into_iter().map(ElementRef::Type).collect(), location);
            }
            let terms = self.find_term(signature.name);
            if !terms.is_unresolved() {
                return terms.map(ElementRef::Term);
            }
        }
        let operations = self.signature_candidates(segment);
        if !operations.is_empty() {
            return collapse(raw, operations.into_iter().map(ElementRef::Operation).collect(), location);
        }
        if signature.parameters.is_some() {
            return Resolution::unresolved(
                PlaceholderKind::Operation,
                raw,
                EdmError::at(
                    ErrorCode::BadUnresolvedOperation,
                    location,
                    format!("No operation matches the annotation target '{raw}'."),
                ),
            );
        }
        let containers = self.find_entity_container(signature.name);
        if !containers.is_unresolved() {
            return containers.map(ElementRef::Container);
        }
        unresolved_type(raw, location)
    }

    fn resolve_member_segment(
        &self,
        first: &str,
        second: &str,
        raw: &str,
        location: Span,
    ) -> Resolution<ElementRef> {
        let containers = self.find_entity_container(first);
        if let Resolution::Resolved(container) = containers {
            return self.resolve_container_member(container, second, raw, location);
        }
        if containers.is_ambiguous() {
            return containers.map(ElementRef::Container);
        }

        let types = self.type_candidates(first);
        if types.len() > 1 {
            return collapse(raw, types.into_iter().map(ElementRef::Type).collect(), location);
        }
        if let [ty] = types.as_slice() {
            return match *ty {
                SchemaType::Structured(id) => match id.find_property(self, second) {
                    Some(property) => Resolution::Resolved(ElementRef::Property(property)),
                    None => Resolution::unresolved(
                        PlaceholderKind::Property,
                        raw,
                        EdmError::at(
                            ErrorCode::BadUnresolvedProperty,
                            location,
                            format!("The property '{second}' of '{first}' could not be found."),
                        ),
                    ),
                },
                SchemaType::Enum(id) => match id.find_member(self, second) {
                    Some(member) => Resolution::Resolved(ElementRef::EnumMember(member)),
                    None => Resolution::unresolved(
                        PlaceholderKind::EnumMember,
                        raw,
                        EdmError::at(
                            ErrorCode::BadUnresolvedEnumMember,
                            location,
                            format!("The enum member '{second}' of '{first}' could not be found."),
                        ),
                    ),
                },
                _ => unresolved_type(raw, location),
            };
        }

        let operations = self.signature_candidates(first);
        if operations.is_empty() {
            return unresolved_type(raw, location);
        }
        let members: Vec<ElementRef> = operations
            .into_iter()
            .filter_map(|operation| operation_member(self, operation, second))
            .collect();
        if members.is_empty() {
            return unresolved_parameter(raw, second, location);
        }
        collapse(raw, members, location)
    }

    fn resolve_container_member(
        &self,
        container: ContainerId,
        name: &str,
        raw: &str,
        location: Span,
    ) -> Resolution<ElementRef> {
        if let Some(set) = container.find_entity_set(self, name) {
            return Resolution::Resolved(ElementRef::EntitySet(set));
        }
        if let Some(singleton) = container.find_singleton(self, name) {
            return Resolution::Resolved(ElementRef::Singleton(singleton));
        }
        let imports = container.find_operation_imports(self, name);
        if !imports.is_empty() {
            return collapse(raw, imports.into_iter().map(ElementRef::OperationImport).collect(), location);
        }
        Resolution::unresolved(
            PlaceholderKind::EntitySet,
            raw,
            EdmError::at(
                ErrorCode::BadUnresolvedEntitySet,
                location,
                format!(
                    "The entity set '{name}' of container '{}' could not be found.",
                    container.full_name(self)
                ),
            ),
        )
    }

    fn resolve_import_segment(
        &self,
        container: &str,
        import: &str,
        last: &str,
        raw: &str,
        location: Span,
    ) -> Resolution<ElementRef> {
        let container = match self.resolve_container_name(container, Some(location)) {
            Resolution::Resolved(container) => container,
            other => return other.map(ElementRef::Container),
        };
        let imports = container.find_operation_imports(self, import);
        if imports.is_empty() {
            return Resolution::unresolved(
                PlaceholderKind::OperationImport,
                raw,
                EdmError::at(
                    ErrorCode::BadUnresolvedOperationImport,
                    location,
                    format!(
                        "The operation import '{import}' of container '{}' could not be found.",
                        container.full_name(self)
                    ),
                ),
            );
        }
        let mut members: Vec<ElementRef> = Vec::new();
        for import in imports {
            for operation in import.operations(self) {
                let member = match operation_member(self, operation, last) {
                    Some(ElementRef::ReturnType(_)) => ElementRef::ImportReturnType(import),
                    Some(ElementRef::Parameter(parameter)) => {
                        ElementRef::ImportParameter { import, parameter }
                    }
                    _ => continue,
                };
                // Overloads share the import's return type element.
                if !members.contains(&member) {
                    members.push(member);
                }
            }
        }
        if members.is_empty() {
            return unresolved_parameter(raw, last, location);
        }
        collapse(raw, members, location)
    }

    /// Operations named by `segment`, narrowed by its parameter list when
    /// one is given. The segment is already alias-normalized.
    fn signature_candidates(&self, segment: &str) -> Vec<OperationId> {
        let Some(signature) = parse_operation_signature(segment) else {
            return Vec::new();
        };
        let operations = self.find_operations(signature.name);
        match signature.parameters {
            None => operations,
            Some(parameters) => {
                let types: Vec<String> = parameters.into_iter().map(str::to_string).collect();
                operations
                    .into_iter()
                    .filter(|operation| operation.matches_signature(self, &types))
                    .collect()
            }
        }
    }
}

/// A parameter of `operation`, or its return type for `$ReturnType`.
fn operation_member(model: &Model, operation: OperationId, name: &str) -> Option<ElementRef> {
    if name == RETURN_TYPE {
        return operation
            .return_type(model)
            .map(|_| ElementRef::ReturnType(operation));
    }
    operation.find_parameter(model, name).map(ElementRef::Parameter)
}

fn collapse(raw: &str, candidates: Vec<ElementRef>, location: Span) -> Resolution<ElementRef> {
    Resolution::from_candidates(raw, candidates, Some(location), || {
        super::resolution::Unresolved::new(
            PlaceholderKind::Type,
            raw,
            EdmError::at(
                ErrorCode::BadUnresolvedType,
                location,
                format!("The annotation target '{raw}' could not be found."),
            ),
        )
    })
}

fn unresolved_type(raw: &str, location: Span) -> Resolution<ElementRef> {
    collapse(raw, Vec::new(), location)
}

fn unresolved_parameter(raw: &str, name: &str, location: Span) -> Resolution<ElementRef> {
    Resolution::unresolved(
        PlaceholderKind::Parameter,
        SmolStr::new(raw),
        EdmError::at(
            ErrorCode::BadUnresolvedParameter,
            location,
            format!("The parameter '{name}' of annotation target '{raw}' could not be found."),
        ),
    )
}
