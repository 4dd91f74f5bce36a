//! Semantic annotation expressions.
//!
//! Built once from the syntax expression of an annotation. Constants carry
//! their parsed value (or a malformed-value error), type names are resolved,
//! and `Apply` calls bind to a function overload on first request.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use uuid::Uuid;

use crate::base::names::split_qualified;
use crate::base::{PrimitiveKind, Span};
use crate::syntax::{
    BinaryOperator, ConstantKind, CsdlExpression, CsdlExpressionKind, CsdlFacets, PathKind,
};

use super::diagnostics::{EdmError, ErrorCode, HasErrors};
use super::ids::{EnumMemberId, EnumTypeId, ModelId, OperationId, StructuredTypeId};
use super::literals::{self, Duration};
use super::memo::Memo;
use super::model::Model;
use super::resolution::{PlaceholderKind, Resolution};
use super::types::{SchemaType, TypeReference};

/// Parsed value of a constant expression.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstantValue {
    Binary(Vec<u8>),
    Boolean(bool),
    Date(NaiveDate),
    DateTimeOffset(DateTime<FixedOffset>),
    /// Decimal digits as written.
    Decimal(SmolStr),
    Duration(Duration),
    /// One member, or several for a flags combination.
    EnumMember(Vec<EnumMemberId>),
    Float(f64),
    Guid(Uuid),
    Int(i64),
    String(String),
    TimeOfDay(NaiveTime),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Constant {
    kind: ConstantKind,
    text: SmolStr,
    value: Result<ConstantValue, EdmError>,
}

impl Constant {
    pub fn kind(&self) -> ConstantKind {
        self.kind
    }

    /// Literal text as written.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> Result<&ConstantValue, &EdmError> {
        self.value.as_ref()
    }

    fn primitive_kind(&self) -> Option<PrimitiveKind> {
        Some(match self.kind {
            ConstantKind::Binary => PrimitiveKind::Binary,
            ConstantKind::Bool => PrimitiveKind::Boolean,
            ConstantKind::Date => PrimitiveKind::Date,
            ConstantKind::DateTimeOffset => PrimitiveKind::DateTimeOffset,
            ConstantKind::Decimal => PrimitiveKind::Decimal,
            ConstantKind::Duration => PrimitiveKind::Duration,
            ConstantKind::Float => PrimitiveKind::Double,
            ConstantKind::Guid => PrimitiveKind::Guid,
            ConstantKind::Int => PrimitiveKind::Int64,
            ConstantKind::String => PrimitiveKind::String,
            ConstantKind::TimeOfDay => PrimitiveKind::TimeOfDay,
            ConstantKind::EnumMember => return None,
        })
    }

    fn enum_type(&self) -> Option<EnumTypeId> {
        match &self.value {
            Ok(ConstantValue::EnumMember(members)) => members.first().map(|member| member.owner()),
            _ => None,
        }
    }

    fn try_cast(&self, model: &Model, target: SchemaType, strict: bool) -> bool {
        let Ok(value) = &self.value else {
            return false;
        };
        let kind = match target {
            SchemaType::Primitive(kind) => kind,
            SchemaType::Definition(_) => match target.primitive_kind(model) {
                Some(kind) if !strict => kind,
                _ => return false,
            },
            SchemaType::Enum(expected) => return self.enum_type() == Some(expected),
            SchemaType::Untyped => return !strict,
            SchemaType::Structured(_) => return false,
        };
        if kind == PrimitiveKind::PrimitiveType {
            return !strict;
        }
        match value {
            ConstantValue::Int(int) => match kind.integral_range() {
                Some((min, max)) => (min..=max).contains(int),
                None => {
                    !strict
                        && matches!(
                            kind,
                            PrimitiveKind::Single | PrimitiveKind::Double | PrimitiveKind::Decimal
                        )
                }
            },
            ConstantValue::Float(_) => match kind {
                PrimitiveKind::Double | PrimitiveKind::Single => true,
                PrimitiveKind::Decimal => !strict,
                _ => false,
            },
            _ => self.primitive_kind() == Some(kind),
        }
    }
}

/// A `PropertyValue` of a record.
#[derive(Debug)]
pub struct PropertyValue {
    pub property: SmolStr,
    pub value: Expression,
    pub location: Span,
}

/// A function application; the overload is bound lazily.
#[derive(Debug)]
pub struct Apply {
    function: SmolStr,
    arguments: Vec<Expression>,
    owner: ModelId,
    binding: Memo<Resolution<OperationId>>,
}

impl Apply {
    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn arguments(&self) -> &[Expression] {
        &self.arguments
    }
}

#[derive(Debug)]
pub enum ExpressionKind {
    Constant(Constant),
    Null,
    Path {
        kind: PathKind,
        path: SmolStr,
    },
    Record {
        type_name: Option<Resolution<StructuredTypeId>>,
        properties: Vec<PropertyValue>,
    },
    Collection(Vec<Expression>),
    If {
        test: Box<Expression>,
        if_true: Box<Expression>,
        if_false: Option<Box<Expression>>,
    },
    Apply(Apply),
    Cast {
        type_reference: TypeReference,
        operand: Box<Expression>,
    },
    IsOf {
        type_reference: TypeReference,
        operand: Box<Expression>,
    },
    LabeledElement {
        name: SmolStr,
        operand: Box<Expression>,
    },
    /// `found` is false when no element of the same expression tree
    /// carries the label.
    LabeledElementReference {
        name: SmolStr,
        found: bool,
    },
    Not(Box<Expression>),
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

#[derive(Debug)]
pub struct Expression {
    kind: ExpressionKind,
    location: Span,
}

impl Expression {
    /// Build the semantic tree of `syntax`, resolving names in `model`.
    pub fn build(model: &Model, syntax: &CsdlExpression) -> Expression {
        let mut labels = FxHashSet::default();
        collect_labels(syntax, &mut labels);
        Builder { model, labels }.build(syntax)
    }

    pub fn kind(&self) -> &ExpressionKind {
        &self.kind
    }

    pub fn location(&self) -> Span {
        self.location
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match &self.kind {
            ExpressionKind::Constant(constant) => Some(constant),
            _ => None,
        }
    }

    /// Overload bound by an `Apply`; `None` for other expressions.
    pub fn function_binding(&self, model: &Model) -> Option<Resolution<OperationId>> {
        let ExpressionKind::Apply(apply) = &self.kind else {
            return None;
        };
        let owner = model.locate(apply.owner);
        Some(
            apply
                .binding
                .get_or_compute(|| {
                    owner.resolve_overload(&apply.function, &apply.arguments, Some(self.location))
                })
                .clone(),
        )
    }

    /// Statically known type; `None` for untyped expressions (null, paths,
    /// label references, untyped records and collections).
    pub fn static_type(&self, model: &Model) -> Option<TypeReference> {
        match &self.kind {
            ExpressionKind::Constant(constant) => match constant.primitive_kind() {
                Some(kind) => Some(TypeReference::primitive(kind, false)),
                None => constant.enum_type().map(|id| {
                    TypeReference::new(Resolution::Resolved(SchemaType::Enum(id)), false, false)
                }),
            },
            ExpressionKind::Null
            | ExpressionKind::Path { .. }
            | ExpressionKind::LabeledElementReference { .. }
            | ExpressionKind::Collection(_) => None,
            ExpressionKind::Record { type_name, .. } => match type_name {
                Some(Resolution::Resolved(id)) => Some(TypeReference::new(
                    Resolution::Resolved(SchemaType::Structured(*id)),
                    false,
                    false,
                )),
                _ => None,
            },
            ExpressionKind::If { if_true, .. } => if_true.static_type(model),
            ExpressionKind::Apply(_) => self
                .function_binding(model)?
                .resolved()
                .and_then(|operation| operation.return_type(model)),
            ExpressionKind::Cast { type_reference, .. } => Some(type_reference.clone()),
            ExpressionKind::IsOf { .. } | ExpressionKind::Not(_) | ExpressionKind::Binary { .. } => {
                Some(TypeReference::primitive(PrimitiveKind::Boolean, false))
            }
            ExpressionKind::LabeledElement { operand, .. } => operand.static_type(model),
        }
    }

    /// Whether this expression can be used where `target` is expected.
    ///
    /// Non-strict mode allows primitive promotions, derived types and the
    /// abstract `Edm.PrimitiveType`/`Edm.Untyped` targets; strict mode
    /// requires an exact type. Integer constants fit any integral type whose
    /// range holds them. Paths and label references are untyped and always
    /// castable. A target that did not resolve accepts nothing.
    pub fn try_cast(&self, model: &Model, target: &TypeReference, strict: bool) -> bool {
        let Some(&target_type) = target.definition().resolved() else {
            return false;
        };
        match &self.kind {
            ExpressionKind::Null => target.is_nullable(),
            ExpressionKind::Path { .. } | ExpressionKind::LabeledElementReference { .. } => true,
            ExpressionKind::LabeledElement { operand, .. } => operand.try_cast(model, target, strict),
            ExpressionKind::If {
                if_true, if_false, ..
            } => {
                if_true.try_cast(model, target, strict)
                    && if_false
                        .as_ref()
                        .is_none_or(|branch| branch.try_cast(model, target, strict))
            }
            ExpressionKind::Collection(elements) => {
                let element = target.element_type();
                target.is_collection()
                    && elements
                        .iter()
                        .all(|value| value.try_cast(model, &element, strict))
            }
            _ if target.is_collection() => false,
            ExpressionKind::Constant(constant) => constant.try_cast(model, target_type, strict),
            ExpressionKind::Record { type_name, .. } => match (target_type, type_name) {
                (SchemaType::Untyped, _) => !strict,
                (SchemaType::Structured(_), None) => true,
                (SchemaType::Structured(expected), Some(Resolution::Resolved(actual))) => {
                    if strict {
                        *actual == expected
                    } else {
                        actual.is_or_derives_from(model, expected)
                    }
                }
                _ => false,
            },
            _ => match self.static_type(model) {
                Some(actual) => target.accepts(model, &actual, strict),
                None => false,
            },
        }
    }
}

impl HasErrors for Expression {
    fn errors(&self, model: &Model) -> Vec<EdmError> {
        match &self.kind {
            ExpressionKind::Constant(constant) => match &constant.value {
                Ok(_) => Vec::new(),
                Err(error) => vec![error.clone()],
            },
            ExpressionKind::Null | ExpressionKind::Path { .. } => Vec::new(),
            ExpressionKind::Record {
                type_name,
                properties,
            } => {
                let mut errors = type_name.errors(model);
                for property in properties {
                    errors.extend(property.value.errors(model));
                }
                errors
            }
            ExpressionKind::Collection(elements) => elements.errors(model),
            ExpressionKind::If {
                test,
                if_true,
                if_false,
            } => {
                let mut errors = test.errors(model);
                errors.extend(if_true.errors(model));
                if let Some(branch) = if_false {
                    errors.extend(branch.errors(model));
                }
                errors
            }
            ExpressionKind::Apply(apply) => {
                let mut errors = self.function_binding(model).errors(model);
                errors.extend(apply.arguments.errors(model));
                errors
            }
            ExpressionKind::Cast {
                type_reference,
                operand,
            }
            | ExpressionKind::IsOf {
                type_reference,
                operand,
            } => {
                let mut errors = type_reference.errors(model);
                errors.extend(operand.errors(model));
                errors
            }
            ExpressionKind::LabeledElement { operand, .. } | ExpressionKind::Not(operand) => {
                operand.errors(model)
            }
            ExpressionKind::LabeledElementReference { name, found } => {
                if *found {
                    Vec::new()
                } else {
                    vec![EdmError::at(
                        ErrorCode::BadUnresolvedLabeledElement,
                        self.location,
                        format!("The labeled element '{name}' could not be found."),
                    )]
                }
            }
            ExpressionKind::Binary { left, right, .. } => {
                let mut errors = left.errors(model);
                errors.extend(right.errors(model));
                errors
            }
        }
    }
}

// ============================================================================
// BUILDER
// ============================================================================

fn collect_labels(syntax: &CsdlExpression, labels: &mut FxHashSet<SmolStr>) {
    match &syntax.kind {
        CsdlExpressionKind::LabeledElement { name, operand } => {
            labels.insert(SmolStr::new(name));
            collect_labels(operand, labels);
        }
        CsdlExpressionKind::Record { properties, .. } => {
            for property in properties {
                collect_labels(&property.value, labels);
            }
        }
        CsdlExpressionKind::Collection(elements) | CsdlExpressionKind::Apply { arguments: elements, .. } => {
            for element in elements {
                collect_labels(element, labels);
            }
        }
        CsdlExpressionKind::If {
            test,
            if_true,
            if_false,
        } => {
            collect_labels(test, labels);
            collect_labels(if_true, labels);
            if let Some(branch) = if_false {
                collect_labels(branch, labels);
            }
        }
        CsdlExpressionKind::Cast { operand, .. }
        | CsdlExpressionKind::IsOf { operand, .. }
        | CsdlExpressionKind::Not(operand) => collect_labels(operand, labels),
        CsdlExpressionKind::Binary { left, right, .. } => {
            collect_labels(left, labels);
            collect_labels(right, labels);
        }
        CsdlExpressionKind::Constant { .. }
        | CsdlExpressionKind::Null
        | CsdlExpressionKind::Path { .. }
        | CsdlExpressionKind::LabeledElementReference(_) => {}
    }
}

struct Builder<'a> {
    model: &'a Model,
    labels: FxHashSet<SmolStr>,
}

impl Builder<'_> {
    fn build(&self, syntax: &CsdlExpression) -> Expression {
        let location = syntax.location;
        let kind = match &syntax.kind {
            CsdlExpressionKind::Constant { kind, text } => {
                ExpressionKind::Constant(self.constant(*kind, text, location))
            }
            CsdlExpressionKind::Null => ExpressionKind::Null,
            CsdlExpressionKind::Path { kind, path } => ExpressionKind::Path {
                kind: *kind,
                path: SmolStr::new(path),
            },
            CsdlExpressionKind::Record {
                type_name,
                properties,
            } => ExpressionKind::Record {
                type_name: type_name
                    .as_deref()
                    .map(|name| self.record_type(name, location)),
                properties: properties
                    .iter()
                    .map(|property| PropertyValue {
                        property: SmolStr::new(&property.property),
                        value: self.build(&property.value),
                        location: property.location,
                    })
                    .collect(),
            },
            CsdlExpressionKind::Collection(elements) => {
                ExpressionKind::Collection(elements.iter().map(|e| self.build(e)).collect())
            }
            CsdlExpressionKind::If {
                test,
                if_true,
                if_false,
            } => ExpressionKind::If {
                test: Box::new(self.build(test)),
                if_true: Box::new(self.build(if_true)),
                if_false: if_false.as_ref().map(|branch| Box::new(self.build(branch))),
            },
            CsdlExpressionKind::Apply {
                function,
                arguments,
            } => ExpressionKind::Apply(Apply {
                function: SmolStr::new(function),
                arguments: arguments.iter().map(|a| self.build(a)).collect(),
                owner: self.model.id(),
                binding: Memo::new(),
            }),
            CsdlExpressionKind::Cast { type_name, operand } => ExpressionKind::Cast {
                type_reference: self.type_reference(type_name, location),
                operand: Box::new(self.build(operand)),
            },
            CsdlExpressionKind::IsOf { type_name, operand } => ExpressionKind::IsOf {
                type_reference: self.type_reference(type_name, location),
                operand: Box::new(self.build(operand)),
            },
            CsdlExpressionKind::LabeledElement { name, operand } => ExpressionKind::LabeledElement {
                name: SmolStr::new(name),
                operand: Box::new(self.build(operand)),
            },
            CsdlExpressionKind::LabeledElementReference(name) => {
                ExpressionKind::LabeledElementReference {
                    name: SmolStr::new(name),
                    found: self.labels.contains(name.as_str()),
                }
            }
            CsdlExpressionKind::Not(operand) => ExpressionKind::Not(Box::new(self.build(operand))),
            CsdlExpressionKind::Binary {
                operator,
                left,
                right,
            } => ExpressionKind::Binary {
                operator: *operator,
                left: Box::new(self.build(left)),
                right: Box::new(self.build(right)),
            },
        };
        Expression { kind, location }
    }

    fn type_reference(&self, raw: &str, location: Span) -> TypeReference {
        self.model
            .resolve_type_reference(raw, None, &CsdlFacets::default(), location)
    }

    fn record_type(&self, raw: &str, location: Span) -> Resolution<StructuredTypeId> {
        match self.model.resolve_type_name(raw, Some(location)) {
            Resolution::Resolved(SchemaType::Structured(id)) => Resolution::Resolved(id),
            other => {
                let name = match &other {
                    Resolution::Resolved(ty) => ty.full_name(self.model),
                    Resolution::Unresolved(placeholder) => SmolStr::new(placeholder.name()),
                    Resolution::Ambiguous(ambiguity) => SmolStr::new(ambiguity.name()),
                };
                Resolution::unresolved(
                    PlaceholderKind::ComplexType,
                    name.clone(),
                    EdmError::at(
                        ErrorCode::BadUnresolvedComplexType,
                        location,
                        format!("The structured type '{name}' of a record could not be found."),
                    ),
                )
            }
        }
    }

    fn constant(&self, kind: ConstantKind, text: &str, location: Span) -> Constant {
        let malformed = |code: ErrorCode, what: &str| {
            EdmError::at(code, location, format!("The value '{text}' is not a valid {what}."))
        };
        let value = match kind {
            ConstantKind::Binary => literals::parse_binary(text)
                .map(ConstantValue::Binary)
                .ok_or_else(|| malformed(ErrorCode::InvalidBinary, "binary value")),
            ConstantKind::Bool => literals::parse_bool(text)
                .map(ConstantValue::Boolean)
                .ok_or_else(|| malformed(ErrorCode::InvalidBoolean, "boolean")),
            ConstantKind::Date => literals::parse_date(text)
                .map(ConstantValue::Date)
                .ok_or_else(|| malformed(ErrorCode::InvalidDate, "date")),
            ConstantKind::DateTimeOffset => literals::parse_date_time_offset(text)
                .map(ConstantValue::DateTimeOffset)
                .ok_or_else(|| malformed(ErrorCode::InvalidDateTimeOffset, "date-time offset")),
            ConstantKind::Decimal => literals::parse_decimal(text)
                .map(|digits| ConstantValue::Decimal(SmolStr::new(digits)))
                .ok_or_else(|| malformed(ErrorCode::InvalidDecimal, "decimal")),
            ConstantKind::Duration => literals::parse_duration(text)
                .map(ConstantValue::Duration)
                .ok_or_else(|| malformed(ErrorCode::InvalidDuration, "duration")),
            ConstantKind::Float => literals::parse_float(text)
                .map(ConstantValue::Float)
                .ok_or_else(|| malformed(ErrorCode::InvalidFloatingPoint, "floating point value")),
            ConstantKind::Guid => literals::parse_guid(text)
                .map(ConstantValue::Guid)
                .ok_or_else(|| malformed(ErrorCode::InvalidGuid, "guid")),
            ConstantKind::Int => literals::parse_int(text)
                .map(ConstantValue::Int)
                .ok_or_else(|| malformed(ErrorCode::InvalidInteger, "integer")),
            ConstantKind::String => Ok(ConstantValue::String(text.to_string())),
            ConstantKind::TimeOfDay => literals::parse_time_of_day(text)
                .map(ConstantValue::TimeOfDay)
                .ok_or_else(|| malformed(ErrorCode::InvalidTimeOfDay, "time of day")),
            ConstantKind::EnumMember => self.enum_members(text, location),
        };
        Constant {
            kind,
            text: SmolStr::new(text),
            value,
        }
    }

    /// `NS.Enum/Member`, space-separated for flag combinations.
    fn enum_members(&self, text: &str, location: Span) -> Result<ConstantValue, EdmError> {
        let mut members = Vec::new();
        let mut enum_type: Option<EnumTypeId> = None;
        for reference in text.split_whitespace() {
            let invalid = || {
                EdmError::at(
                    ErrorCode::InvalidEnumMemberPath,
                    location,
                    format!("'{reference}' is not a valid enum member path."),
                )
            };
            let (type_name, member_name) = reference.split_once('/').ok_or_else(invalid)?;
            if split_qualified(type_name).is_none() || member_name.is_empty() {
                return Err(invalid());
            }
            let unresolved = || {
                EdmError::at(
                    ErrorCode::BadUnresolvedEnumMember,
                    location,
                    format!("The enum member '{reference}' could not be found."),
                )
            };
            let Some(SchemaType::Enum(id)) = self
                .model
                .resolve_type_name(type_name, Some(location))
                .into_resolved()
            else {
                return Err(unresolved());
            };
            if enum_type.is_some_and(|first| first != id) {
                return Err(invalid());
            }
            enum_type = Some(id);
            members.push(id.find_member(self.model, member_name).ok_or_else(unresolved)?);
        }
        if members.is_empty() {
            return Err(EdmError::at(
                ErrorCode::InvalidEnumMemberPath,
                location,
                "An enum member expression must name at least one member.",
            ));
        }
        Ok(ConstantValue::EnumMember(members))
    }
}
