//! Uniform handle over every annotatable model element.

use super::diagnostics::{EdmError, HasErrors};
use super::ids::{
    AnnotationId, ContainerId, EntitySetId, EnumMemberId, ModelId, OperationId, OperationImportId,
    ParameterId, PropertyId, SingletonId, TermId,
};
use super::model::Model;
use super::resolution::Resolution;
use super::types::SchemaType;

/// Any element an annotation can target or a lookup can return.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementRef {
    Type(SchemaType),
    Term(TermId),
    Operation(OperationId),
    Container(ContainerId),
    EntitySet(EntitySetId),
    Singleton(SingletonId),
    OperationImport(OperationImportId),
    Property(PropertyId),
    EnumMember(EnumMemberId),
    Parameter(ParameterId),
    ReturnType(OperationId),
    /// A parameter of the operation imported by `import`.
    ImportParameter {
        import: OperationImportId,
        parameter: ParameterId,
    },
    ImportReturnType(OperationImportId),
}

impl ElementRef {
    /// The model that declares the element; `None` for built-in types.
    pub fn model_id(self) -> Option<ModelId> {
        Some(match self {
            ElementRef::Type(SchemaType::Structured(id)) => id.model(),
            ElementRef::Type(SchemaType::Enum(id)) => id.model(),
            ElementRef::Type(SchemaType::Definition(id)) => id.model(),
            ElementRef::Type(SchemaType::Primitive(_) | SchemaType::Untyped) => return None,
            ElementRef::Term(id) => id.model(),
            ElementRef::Operation(id) | ElementRef::ReturnType(id) => id.model(),
            ElementRef::Container(id) => id.model(),
            ElementRef::EntitySet(id) => id.model(),
            ElementRef::Singleton(id) => id.model(),
            ElementRef::OperationImport(id) | ElementRef::ImportReturnType(id) => id.model(),
            ElementRef::ImportParameter { import, .. } => import.model(),
            ElementRef::Property(id) => id.model(),
            ElementRef::EnumMember(id) => id.model(),
            ElementRef::Parameter(id) => id.model(),
        })
    }

    /// Canonical target path, e.g. `NS.Container/Customers` or
    /// `NS.Customer/Orders`. Overloads are not disambiguated; see
    /// [`ElementRef::target_paths`].
    pub fn path(self, model: &Model) -> String {
        match self {
            ElementRef::Type(ty) => ty.full_name(model).to_string(),
            ElementRef::Term(id) => id.full_name(model).to_string(),
            ElementRef::Operation(id) => id.full_name(model).to_string(),
            ElementRef::Container(id) => id.full_name(model).to_string(),
            ElementRef::EntitySet(id) => format!("{}/{}", id.owner().full_name(model), id.name(model)),
            ElementRef::Singleton(id) => format!("{}/{}", id.owner().full_name(model), id.name(model)),
            ElementRef::OperationImport(id) => {
                format!("{}/{}", id.owner().full_name(model), id.name(model))
            }
            ElementRef::Property(id) => format!("{}/{}", id.owner().full_name(model), id.name(model)),
            ElementRef::EnumMember(id) => {
                format!("{}/{}", id.owner().full_name(model), id.name(model))
            }
            ElementRef::Parameter(id) => {
                format!("{}/{}", id.owner().full_name(model), id.name(model))
            }
            ElementRef::ReturnType(id) => format!("{}/$ReturnType", id.full_name(model)),
            ElementRef::ImportParameter { import, parameter } => format!(
                "{}/{}",
                ElementRef::OperationImport(import).path(model),
                parameter.name(model)
            ),
            ElementRef::ImportReturnType(id) => {
                format!("{}/$ReturnType", ElementRef::OperationImport(id).path(model))
            }
        }
    }

    /// Every path an out-of-line annotation may use to reach this element:
    /// the canonical path plus, for operation members, the form with the
    /// operation's parameter signature.
    pub fn target_paths(self, model: &Model) -> Vec<String> {
        let mut paths = vec![self.path(model)];
        let signed = match self {
            ElementRef::Operation(id) => Some(id.signature(model)),
            ElementRef::Parameter(id) => {
                Some(format!("{}/{}", id.owner().signature(model), id.name(model)))
            }
            ElementRef::ReturnType(id) => Some(format!("{}/$ReturnType", id.signature(model))),
            _ => None,
        };
        if let Some(signed) = signed {
            if !paths.contains(&signed) {
                paths.push(signed);
            }
        }
        paths
    }

    /// Annotations applied to this element, inline and out-of-line.
    pub fn vocabulary_annotations(self, model: &Model) -> Vec<AnnotationId> {
        model.find_vocabulary_annotations(self)
    }

    /// Whether this element's chain cell (base type, base term, extended
    /// container) is currently evaluating.
    pub(crate) fn is_resolving_chain(self, model: &Model) -> bool {
        match self {
            ElementRef::Type(SchemaType::Structured(id)) => {
                model.structured(id).1.base_type.is_evaluating()
            }
            ElementRef::Term(id) => model.term(id).1.base_term.is_evaluating(),
            ElementRef::Container(id) => model.container(id).1.extends.is_evaluating(),
            _ => false,
        }
    }
}

/// The origin of a cycle placeholder returned by a forced chain step, if
/// that origin is still evaluating further up the stack.
///
/// A caller that receives `Some` lies on the cycle itself; one that receives
/// `None` for a cyclic placeholder merely points into a finished cycle.
pub(crate) fn pending_cycle<T>(model: &Model, forced: Option<&Resolution<T>>) -> Option<ElementRef> {
    let origin = forced?.placeholder()?.cycle_origin()?;
    origin.is_resolving_chain(model).then_some(origin)
}

impl HasErrors for ElementRef {
    fn errors(&self, model: &Model) -> Vec<EdmError> {
        match *self {
            ElementRef::Type(SchemaType::Structured(id)) => id.errors(model),
            ElementRef::Type(SchemaType::Enum(id)) => id.errors(model),
            ElementRef::Type(SchemaType::Definition(id)) => id.errors(model),
            ElementRef::Type(SchemaType::Primitive(_) | SchemaType::Untyped) => Vec::new(),
            ElementRef::Term(id) => id.errors(model),
            ElementRef::Operation(id) => id.errors(model),
            ElementRef::Container(id) => id.errors(model),
            ElementRef::EntitySet(id) => id.errors(model),
            ElementRef::Singleton(id) => id.errors(model),
            ElementRef::OperationImport(id) => id.errors(model),
            ElementRef::Property(id) => id.errors(model),
            ElementRef::EnumMember(id) => id.errors(model),
            ElementRef::Parameter(id) => id.errors(model),
            ElementRef::ReturnType(id) => id
                .return_type(model)
                .map(|ty| ty.errors(model))
                .unwrap_or_default(),
            ElementRef::ImportParameter { parameter, .. } => parameter.errors(model),
            ElementRef::ImportReturnType(id) => id.errors(model),
        }
    }
}

impl From<SchemaType> for ElementRef {
    fn from(ty: SchemaType) -> Self {
        ElementRef::Type(ty)
    }
}
