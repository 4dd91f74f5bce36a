//! Schema types and type references.
//!
//! A [`SchemaType`] names a type definition (primitive, structured, enum or
//! type definition). A [`TypeReference`] is a use site: a possibly-unresolved
//! definition plus collection-ness, nullability and facets.

use std::rc::Rc;

use smol_str::SmolStr;

use crate::base::names::strip_collection;
use crate::base::{EDM_NAMESPACE, PrimitiveKind, Span, lookup_primitive_kind};
use crate::syntax::CsdlFacets;

use super::diagnostics::{EdmError, ErrorCode, HasErrors};
use super::ids::{EnumTypeId, StructuredTypeId, TypeDefinitionId};
use super::model::Model;
use super::resolution::{PlaceholderKind, Resolution, Unresolved};

/// A resolved type definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Primitive(PrimitiveKind),
    /// `Edm.Untyped`
    Untyped,
    Structured(StructuredTypeId),
    Enum(EnumTypeId),
    Definition(TypeDefinitionId),
}

impl SchemaType {
    pub fn full_name(self, model: &Model) -> SmolStr {
        match self {
            SchemaType::Primitive(kind) => SmolStr::new(kind.full_name()),
            SchemaType::Untyped => SmolStr::new(format!("{EDM_NAMESPACE}.Untyped")),
            SchemaType::Structured(id) => id.full_name(model),
            SchemaType::Enum(id) => id.full_name(model),
            SchemaType::Definition(id) => id.full_name(model),
        }
    }

    pub fn as_structured(self) -> Option<StructuredTypeId> {
        match self {
            SchemaType::Structured(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_primitive(self) -> Option<PrimitiveKind> {
        match self {
            SchemaType::Primitive(kind) => Some(kind),
            _ => None,
        }
    }

    /// The primitive kind, looking through type definitions.
    pub fn primitive_kind(self, model: &Model) -> Option<PrimitiveKind> {
        match self {
            SchemaType::Primitive(kind) => Some(kind),
            SchemaType::Definition(id) => id
                .underlying_type(model)
                .resolved()
                .and_then(|ty| ty.as_primitive()),
            _ => None,
        }
    }

    pub fn is_entity(self, model: &Model) -> bool {
        self.as_structured().is_some_and(|id| id.is_entity(model))
    }

    pub fn is_complex(self, model: &Model) -> bool {
        self.as_structured().is_some_and(|id| !id.is_entity(model))
    }

    /// Whether a value of type `self` can stand where `target` is expected.
    ///
    /// Strict mode accepts identity only. Non-strict mode also accepts
    /// primitive promotions, derived structured types, and the abstract
    /// `Edm.PrimitiveType` / `Edm.Untyped` targets.
    pub fn is_compatible_with(self, model: &Model, target: SchemaType, strict: bool) -> bool {
        if self == target {
            return true;
        }
        if strict {
            return false;
        }
        match (self, target) {
            (_, SchemaType::Untyped) => true,
            (SchemaType::Structured(actual), SchemaType::Structured(expected)) => {
                actual.is_or_derives_from(model, expected)
            }
            (actual, SchemaType::Primitive(expected)) => actual
                .primitive_kind(model)
                .is_some_and(|kind| kind == expected || kind.is_promotable_to(expected)),
            (SchemaType::Definition(actual), SchemaType::Definition(expected)) => actual
                .underlying_type(model)
                .resolved()
                .zip(expected.underlying_type(model).resolved())
                .is_some_and(|(a, b)| a == b),
            _ => false,
        }
    }
}

/// A type use site.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeReference {
    definition: Resolution<SchemaType>,
    is_collection: bool,
    nullable: bool,
    facets: CsdlFacets,
}

impl TypeReference {
    pub(crate) fn new(definition: Resolution<SchemaType>, is_collection: bool, nullable: bool) -> Self {
        Self {
            definition,
            is_collection,
            nullable,
            facets: CsdlFacets::default(),
        }
    }

    pub fn primitive(kind: PrimitiveKind, nullable: bool) -> Self {
        Self::new(Resolution::Resolved(SchemaType::Primitive(kind)), false, nullable)
    }

    pub(crate) fn with_facets(mut self, facets: CsdlFacets) -> Self {
        self.facets = facets;
        self
    }

    /// The (element) type definition. For collections, the element type.
    pub fn definition(&self) -> &Resolution<SchemaType> {
        &self.definition
    }

    pub fn is_collection(&self) -> bool {
        self.is_collection
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn facets(&self) -> &CsdlFacets {
        &self.facets
    }

    pub fn as_structured(&self) -> Option<StructuredTypeId> {
        self.definition.resolved().and_then(|ty| ty.as_structured())
    }

    pub fn primitive_kind(&self, model: &Model) -> Option<PrimitiveKind> {
        self.definition.resolved().and_then(|ty| ty.primitive_kind(model))
    }

    /// Same reference with the collection wrapper removed.
    pub fn element_type(&self) -> TypeReference {
        Self {
            is_collection: false,
            ..self.clone()
        }
    }

    pub(crate) fn as_collection(mut self) -> Self {
        self.is_collection = true;
        self
    }

    /// `NS.T` or `Collection(NS.T)`; placeholders render their looked-up name.
    pub fn full_name(&self, model: &Model) -> String {
        let element = match &self.definition {
            Resolution::Resolved(ty) => ty.full_name(model),
            Resolution::Unresolved(placeholder) => SmolStr::new(placeholder.name()),
            Resolution::Ambiguous(ambiguity) => SmolStr::new(ambiguity.name()),
        };
        if self.is_collection {
            format!("Collection({element})")
        } else {
            element.to_string()
        }
    }

    /// Whether a value of type `actual` can stand where `self` is expected.
    pub fn accepts(&self, model: &Model, actual: &TypeReference, strict: bool) -> bool {
        if self.is_collection != actual.is_collection {
            return false;
        }
        match (self.definition.resolved(), actual.definition.resolved()) {
            (Some(&expected), Some(&found)) => found.is_compatible_with(model, expected, strict),
            _ => false,
        }
    }
}

impl HasErrors for TypeReference {
    fn errors(&self, model: &Model) -> Vec<EdmError> {
        self.definition.errors(model)
    }
}

// ============================================================================
// TYPE NAME RESOLUTION
// ============================================================================

impl Model {
    /// Resolve a single (non-collection) qualified type name.
    pub(crate) fn resolve_type_name(&self, raw: &str, location: Option<Span>) -> Resolution<SchemaType> {
        let name = raw.trim();
        if let Some(simple) = name
            .strip_prefix(EDM_NAMESPACE)
            .and_then(|rest| rest.strip_prefix('.'))
        {
            if simple == "Untyped" {
                return Resolution::Resolved(SchemaType::Untyped);
            }
            return match lookup_primitive_kind(name) {
                Some(kind) => Resolution::Resolved(SchemaType::Primitive(kind)),
                None => Resolution::unresolved(
                    PlaceholderKind::PrimitiveType,
                    name,
                    EdmError::located(
                        ErrorCode::BadUnresolvedPrimitiveType,
                        location,
                        format!("The primitive type '{name}' could not be found."),
                    ),
                ),
            };
        }

        let full_name = self.qualify(name);
        let candidates = self.type_candidates(&full_name);
        Resolution::from_candidates(&full_name, candidates, location, || {
            Unresolved::new(
                PlaceholderKind::Type,
                full_name.as_str(),
                EdmError::located(
                    ErrorCode::BadUnresolvedType,
                    location,
                    format!("The type '{full_name}' could not be found."),
                ),
            )
        })
    }

    /// Resolve a raw type string, possibly wrapped in `Collection(...)`.
    pub(crate) fn resolve_type_reference(
        &self,
        raw: &str,
        nullable: Option<bool>,
        facets: &CsdlFacets,
        location: Span,
    ) -> TypeReference {
        let trimmed = raw.trim();
        let nullable = nullable.unwrap_or(true);
        let (element, is_collection) = if trimmed.starts_with("Collection(") {
            match strip_collection(trimmed) {
                Some(inner) => (inner, true),
                None => {
                    return TypeReference::new(invalid_type_name(trimmed, location), false, nullable);
                }
            }
        } else {
            (trimmed, false)
        };
        if element.is_empty() {
            return TypeReference::new(invalid_type_name(trimmed, location), is_collection, nullable);
        }

        let definition = self.resolve_type_name(element, Some(location));
        TypeReference::new(definition, is_collection, nullable).with_facets(facets.clone())
    }
}

fn invalid_type_name(raw: &str, location: Span) -> Resolution<SchemaType> {
    Resolution::Unresolved(Rc::new(Unresolved::new(
        PlaceholderKind::Type,
        raw,
        EdmError::at(
            ErrorCode::InvalidTypeName,
            location,
            format!("The type name '{raw}' is malformed."),
        ),
    )))
}
