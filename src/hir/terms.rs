//! Vocabulary terms.

use smol_str::SmolStr;

use crate::base::Span;
use crate::syntax::CsdlTerm;

use super::diagnostics::{EdmError, ErrorCode, HasErrors};
use super::elements::{ElementRef, pending_cycle};
use super::ids::{AnnotationId, TermId};
use super::memo::Memo;
use super::model::Model;
use super::resolution::{Resolution, Unresolved};
use super::types::TypeReference;

#[derive(Debug)]
pub(crate) struct TermNode {
    pub(crate) syntax: CsdlTerm,
    pub(crate) namespace: SmolStr,
    pub(crate) full_name: SmolStr,
    type_reference: Memo<TypeReference>,
    pub(crate) base_term: Memo<Option<Resolution<TermId>>>,
}

impl TermNode {
    pub(crate) fn new(syntax: CsdlTerm, namespace: SmolStr, full_name: SmolStr) -> Self {
        Self {
            syntax,
            namespace,
            full_name,
            type_reference: Memo::new(),
            base_term: Memo::new(),
        }
    }
}

impl TermId {
    pub fn name(self, model: &Model) -> &str {
        &model.term(self).1.syntax.name
    }

    pub fn full_name(self, model: &Model) -> SmolStr {
        model.term(self).1.full_name.clone()
    }

    pub fn namespace(self, model: &Model) -> &str {
        &model.term(self).1.namespace
    }

    pub fn location(self, model: &Model) -> Span {
        model.term(self).1.syntax.location
    }

    pub fn type_reference(self, model: &Model) -> TypeReference {
        let (owner, node) = model.term(self);
        node.type_reference
            .get_or_compute(|| {
                owner.resolve_type_reference(
                    &node.syntax.type_name,
                    node.syntax.nullable,
                    &node.syntax.facets,
                    node.syntax.location,
                )
            })
            .clone()
    }

    /// The term this one specializes; cyclic chains yield a cyclic
    /// placeholder for every term on the loop.
    pub fn base_term(self, model: &Model) -> Option<Resolution<TermId>> {
        let (owner, node) = model.term(self);
        node.base_term
            .get_or_cycle(|| compute_base_term(owner, node), || Some(cyclic_base_term(node, ElementRef::Term(self))))
    }

    /// `AppliesTo` element kinds, as written.
    pub fn applies_to(self, model: &Model) -> &[String] {
        &model.term(self).1.syntax.applies_to
    }

    /// Whether the term restricts nothing or lists `kind` in `AppliesTo`.
    pub fn can_apply_to(self, model: &Model, kind: &str) -> bool {
        let applies_to = self.applies_to(model);
        applies_to.is_empty() || applies_to.iter().any(|entry| entry == kind)
    }

    /// Raw `DefaultValue` text.
    pub fn default_value(self, model: &Model) -> Option<&str> {
        model.term(self).1.syntax.default_value.as_deref()
    }

    pub fn vocabulary_annotations(self, model: &Model) -> Vec<AnnotationId> {
        model.find_vocabulary_annotations(ElementRef::Term(self))
    }
}

impl HasErrors for TermId {
    fn errors(&self, model: &Model) -> Vec<EdmError> {
        let mut errors = self.type_reference(model).errors(model);
        errors.extend(self.base_term(model).errors(model));
        errors
    }
}

fn compute_base_term(owner: &Model, node: &TermNode) -> Option<Resolution<TermId>> {
    let raw = node.syntax.base_term.as_deref()?;
    Some(match owner.resolve_term_name(raw, Some(node.syntax.location)) {
        Resolution::Resolved(base) => {
            let forced = base.base_term(owner);
            match pending_cycle(owner, forced.as_ref()) {
                Some(origin) => cyclic_base_term(node, origin),
                None => Resolution::Resolved(base),
            }
        }
        other => other,
    })
}

fn cyclic_base_term(node: &TermNode, origin: ElementRef) -> Resolution<TermId> {
    tracing::debug!("[TERM] base term chain of '{}' is cyclic", node.full_name);
    Resolution::Unresolved(std::rc::Rc::new(Unresolved::cyclic(
        node.full_name.clone(),
        EdmError::at(
            ErrorCode::BadCyclicTerm,
            node.syntax.location,
            format!("The base term of '{}' is cyclic.", node.full_name),
        ),
        origin,
    )))
}
