//! Enumeration types and type definitions.

use smol_str::SmolStr;

use crate::base::{PrimitiveKind, Span};
use crate::syntax::{CsdlEnumType, CsdlTypeDefinition};

use super::diagnostics::{EdmError, ErrorCode, HasErrors};
use super::elements::ElementRef;
use super::ids::{AnnotationId, EnumMemberId, EnumTypeId, TypeDefinitionId};
use super::memo::Memo;
use super::model::Model;
use super::resolution::{PlaceholderKind, Resolution};
use super::types::SchemaType;

#[derive(Debug)]
pub(crate) struct EnumTypeNode {
    pub(crate) syntax: CsdlEnumType,
    pub(crate) namespace: SmolStr,
    pub(crate) full_name: SmolStr,
    underlying_type: Memo<Resolution<SchemaType>>,
    /// Member values; explicit when parseable, otherwise previous + 1.
    values: Vec<i64>,
    value_errors: Vec<EdmError>,
}

impl EnumTypeNode {
    pub(crate) fn new(syntax: CsdlEnumType, namespace: SmolStr, full_name: SmolStr) -> Self {
        let mut values = Vec::with_capacity(syntax.members.len());
        let mut value_errors = Vec::new();
        let mut next = 0i64;
        for member in &syntax.members {
            let value = match member.value.as_deref().map(str::trim) {
                None => next,
                Some(text) => match text.parse::<i64>() {
                    Ok(value) => value,
                    Err(_) => {
                        value_errors.push(EdmError::at(
                            ErrorCode::InvalidInteger,
                            member.location,
                            format!(
                                "The value '{text}' of enum member '{}' is not a valid integer.",
                                member.name
                            ),
                        ));
                        next
                    }
                },
            };
            values.push(value);
            next = value.wrapping_add(1);
        }
        Self {
            syntax,
            namespace,
            full_name,
            underlying_type: Memo::new(),
            values,
            value_errors,
        }
    }
}

impl EnumTypeId {
    pub fn name(self, model: &Model) -> &str {
        &model.enum_type(self).1.syntax.name
    }

    pub fn full_name(self, model: &Model) -> SmolStr {
        model.enum_type(self).1.full_name.clone()
    }

    pub fn namespace(self, model: &Model) -> &str {
        &model.enum_type(self).1.namespace
    }

    pub fn location(self, model: &Model) -> Span {
        model.enum_type(self).1.syntax.location
    }

    pub fn is_flags(self, model: &Model) -> bool {
        model.enum_type(self).1.syntax.is_flags
    }

    /// `UnderlyingType`, `Edm.Int32` when absent.
    pub fn underlying_type(self, model: &Model) -> Resolution<SchemaType> {
        let (owner, node) = model.enum_type(self);
        node.underlying_type
            .get_or_compute(|| match node.syntax.underlying_type.as_deref() {
                None => Resolution::Resolved(SchemaType::Primitive(PrimitiveKind::Int32)),
                Some(raw) => primitive_only(owner, raw, node.syntax.location),
            })
            .clone()
    }

    pub fn members(self, model: &Model) -> Vec<EnumMemberId> {
        let (_, node) = model.enum_type(self);
        (0..node.syntax.members.len())
            .map(|index| EnumMemberId::new(self, index))
            .collect()
    }

    pub fn find_member(self, model: &Model, name: &str) -> Option<EnumMemberId> {
        self.members(model)
            .into_iter()
            .find(|member| member.name(model) == name)
    }

    pub fn vocabulary_annotations(self, model: &Model) -> Vec<AnnotationId> {
        model.find_vocabulary_annotations(ElementRef::Type(SchemaType::Enum(self)))
    }
}

impl HasErrors for EnumTypeId {
    fn errors(&self, model: &Model) -> Vec<EdmError> {
        let mut errors = self.underlying_type(model).errors(model);
        errors.extend(model.enum_type(*self).1.value_errors.iter().cloned());
        errors
    }
}

impl EnumMemberId {
    pub fn name(self, model: &Model) -> &str {
        &model.enum_type(self.owner()).1.syntax.members[self.index()].name
    }

    pub fn value(self, model: &Model) -> i64 {
        model.enum_type(self.owner()).1.values[self.index()]
    }

    pub fn location(self, model: &Model) -> Span {
        model.enum_type(self.owner()).1.syntax.members[self.index()].location
    }

    pub fn vocabulary_annotations(self, model: &Model) -> Vec<AnnotationId> {
        model.find_vocabulary_annotations(ElementRef::EnumMember(self))
    }
}

impl HasErrors for EnumMemberId {
    // Malformed values are reported once, by the enum type.
    fn errors(&self, _model: &Model) -> Vec<EdmError> {
        Vec::new()
    }
}

// ============================================================================
// TYPE DEFINITIONS
// ============================================================================

#[derive(Debug)]
pub(crate) struct TypeDefinitionNode {
    pub(crate) syntax: CsdlTypeDefinition,
    pub(crate) namespace: SmolStr,
    pub(crate) full_name: SmolStr,
    underlying_type: Memo<Resolution<SchemaType>>,
}

impl TypeDefinitionNode {
    pub(crate) fn new(syntax: CsdlTypeDefinition, namespace: SmolStr, full_name: SmolStr) -> Self {
        Self {
            syntax,
            namespace,
            full_name,
            underlying_type: Memo::new(),
        }
    }
}

impl TypeDefinitionId {
    pub fn name(self, model: &Model) -> &str {
        &model.type_definition(self).1.syntax.name
    }

    pub fn full_name(self, model: &Model) -> SmolStr {
        model.type_definition(self).1.full_name.clone()
    }

    pub fn namespace(self, model: &Model) -> &str {
        &model.type_definition(self).1.namespace
    }

    pub fn location(self, model: &Model) -> Span {
        model.type_definition(self).1.syntax.location
    }

    pub fn underlying_type(self, model: &Model) -> Resolution<SchemaType> {
        let (owner, node) = model.type_definition(self);
        node.underlying_type
            .get_or_compute(|| primitive_only(owner, &node.syntax.underlying_type, node.syntax.location))
            .clone()
    }

    pub fn facets(self, model: &Model) -> &crate::syntax::CsdlFacets {
        &model.type_definition(self).1.syntax.facets
    }

    pub fn vocabulary_annotations(self, model: &Model) -> Vec<AnnotationId> {
        model.find_vocabulary_annotations(ElementRef::Type(SchemaType::Definition(self)))
    }
}

impl HasErrors for TypeDefinitionId {
    fn errors(&self, model: &Model) -> Vec<EdmError> {
        self.underlying_type(model).errors(model)
    }
}

fn primitive_only(model: &Model, raw: &str, location: Span) -> Resolution<SchemaType> {
    match model.resolve_type_name(raw, Some(location)) {
        resolved @ Resolution::Resolved(SchemaType::Primitive(_)) => resolved,
        other => {
            let name = match &other {
                Resolution::Resolved(ty) => ty.full_name(model),
                Resolution::Unresolved(placeholder) => SmolStr::new(placeholder.name()),
                Resolution::Ambiguous(ambiguity) => SmolStr::new(ambiguity.name()),
            };
            Resolution::unresolved(
                PlaceholderKind::PrimitiveType,
                name.clone(),
                EdmError::at(
                    ErrorCode::BadUnresolvedPrimitiveType,
                    location,
                    format!("The underlying type '{name}' is not a primitive type."),
                ),
            )
        }
    }
}
