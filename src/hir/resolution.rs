//! Resolved-or-placeholder values.
//!
//! Any lookup that can fail returns a [`Resolution`] instead of an `Option`:
//! the graph stays fully shaped even for invalid input, and the placeholder
//! explains what went wrong via [`HasErrors`].

use std::rc::Rc;

use smol_str::SmolStr;

use crate::base::Span;

use super::diagnostics::{EdmError, ErrorCode, HasErrors};
use super::elements::ElementRef;
use super::model::Model;

/// What a placeholder stands in for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    Type,
    EntityType,
    ComplexType,
    PrimitiveType,
    Term,
    Operation,
    Parameter,
    Property,
    NavigationPropertyPath,
    EntityContainer,
    EntitySet,
    OperationImport,
    EnumMember,
    /// A base type, base term or extended container whose chain loops back.
    Cyclic,
    /// An annotation target path with an impossible shape.
    ImpossibleTarget,
}

/// A reference that did not resolve.
#[derive(Clone, Debug, PartialEq)]
pub struct Unresolved {
    kind: PlaceholderKind,
    name: SmolStr,
    error: EdmError,
    cycle_origin: Option<ElementRef>,
}

impl Unresolved {
    pub fn new(kind: PlaceholderKind, name: impl Into<SmolStr>, error: EdmError) -> Self {
        Self {
            kind,
            name: name.into(),
            error,
            cycle_origin: None,
        }
    }

    /// A cyclic placeholder. `origin` is the element whose cell detected the
    /// loop; it is still evaluating while the loop unwinds.
    pub(crate) fn cyclic(name: impl Into<SmolStr>, error: EdmError, origin: ElementRef) -> Self {
        Self {
            kind: PlaceholderKind::Cyclic,
            name: name.into(),
            error,
            cycle_origin: Some(origin),
        }
    }

    pub fn kind(&self) -> PlaceholderKind {
        self.kind
    }

    /// The name that was looked up (alias-resolved where possible).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn error(&self) -> &EdmError {
        &self.error
    }

    pub fn is_cyclic(&self) -> bool {
        self.kind == PlaceholderKind::Cyclic
    }

    pub(crate) fn cycle_origin(&self) -> Option<ElementRef> {
        self.cycle_origin
    }
}

/// Two or more equally good candidates for one name.
#[derive(Clone, Debug, PartialEq)]
pub struct Ambiguity<T> {
    name: SmolStr,
    candidates: Vec<T>,
    location: Option<Span>,
}

impl<T> Ambiguity<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn candidates(&self) -> &[T] {
        &self.candidates
    }

    pub fn error(&self) -> EdmError {
        EdmError {
            code: ErrorCode::BadAmbiguousElementBinding,
            message: format!(
                "The name '{}' is ambiguous: {} candidates match.",
                self.name,
                self.candidates.len()
            ),
            location: self.location,
        }
    }
}

/// A resolved value, an unresolved placeholder, or an ambiguous binding.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution<T> {
    Resolved(T),
    Unresolved(Rc<Unresolved>),
    Ambiguous(Ambiguity<T>),
}

impl<T> Resolution<T> {
    pub fn unresolved(kind: PlaceholderKind, name: impl Into<SmolStr>, error: EdmError) -> Self {
        Resolution::Unresolved(Rc::new(Unresolved::new(kind, name, error)))
    }

    pub fn ambiguous(name: impl Into<SmolStr>, candidates: Vec<T>, location: Option<Span>) -> Self {
        Resolution::Ambiguous(Ambiguity {
            name: name.into(),
            candidates,
            location,
        })
    }

    /// Collapse a candidate list: one → resolved, several → ambiguous,
    /// none → the placeholder built by `on_empty`.
    pub fn from_candidates(
        name: &str,
        mut candidates: Vec<T>,
        location: Option<Span>,
        on_empty: impl FnOnce() -> Unresolved,
    ) -> Self {
        match candidates.len() {
            0 => Resolution::Unresolved(Rc::new(on_empty())),
            1 => Resolution::Resolved(candidates.remove(0)),
            _ => Resolution::ambiguous(name, candidates, location),
        }
    }

    pub fn resolved(&self) -> Option<&T> {
        match self {
            Resolution::Resolved(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_resolved(self) -> Option<T> {
        match self {
            Resolution::Resolved(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Resolution::Unresolved(_))
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Resolution::Ambiguous(_))
    }

    pub fn is_cyclic(&self) -> bool {
        self.placeholder().is_some_and(Unresolved::is_cyclic)
    }

    pub fn placeholder(&self) -> Option<&Unresolved> {
        match self {
            Resolution::Unresolved(placeholder) => Some(placeholder),
            _ => None,
        }
    }

    pub fn ambiguity(&self) -> Option<&Ambiguity<T>> {
        match self {
            Resolution::Ambiguous(ambiguity) => Some(ambiguity),
            _ => None,
        }
    }

    /// Every candidate: one when resolved, all when ambiguous, none otherwise.
    pub fn candidates(&self) -> &[T] {
        match self {
            Resolution::Resolved(value) => std::slice::from_ref(value),
            Resolution::Ambiguous(ambiguity) => &ambiguity.candidates,
            Resolution::Unresolved(_) => &[],
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Resolution<U> {
        match self {
            Resolution::Resolved(value) => Resolution::Resolved(f(value)),
            Resolution::Unresolved(placeholder) => Resolution::Unresolved(placeholder),
            Resolution::Ambiguous(ambiguity) => Resolution::Ambiguous(Ambiguity {
                name: ambiguity.name,
                candidates: ambiguity.candidates.into_iter().map(f).collect(),
                location: ambiguity.location,
            }),
        }
    }

    /// The errors of the placeholder itself (never those of a resolved target).
    pub fn placeholder_errors(&self) -> Vec<EdmError> {
        match self {
            Resolution::Resolved(_) => Vec::new(),
            Resolution::Unresolved(placeholder) => vec![placeholder.error.clone()],
            Resolution::Ambiguous(ambiguity) => vec![ambiguity.error()],
        }
    }
}

impl<T> HasErrors for Resolution<T> {
    fn errors(&self, _model: &Model) -> Vec<EdmError> {
        self.placeholder_errors()
    }
}
