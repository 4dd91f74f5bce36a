//! Diagnostics — resolution errors reported by the semantic model.
//!
//! Failures are data: a reference that does not resolve produces a
//! placeholder value carrying an [`EdmError`], and construction carries on.
//! [`HasErrors`] is the common capability every semantic value exposes so
//! callers never have to type-test for failure.

use std::fmt;

use thiserror::Error;

use crate::base::Span;

use super::model::Model;

// ============================================================================
// ERROR CODES
// ============================================================================

/// Error taxonomy of the resolution layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A string reference matches no known declaration.
    UnresolvedName,
    /// A chain of references returns to its own start.
    Cycle,
    /// Two or more equally valid candidates.
    Ambiguous,
    /// A literal does not parse as its claimed type.
    MalformedValue,
    /// Structurally invalid combination of attributes.
    Structural,
    /// An annotation target path that cannot name any model element.
    ImpossibleTarget,
}

/// Specific error codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    BadUnresolvedType,
    BadUnresolvedEntityType,
    BadUnresolvedComplexType,
    BadUnresolvedPrimitiveType,
    BadUnresolvedTerm,
    BadUnresolvedOperation,
    NoMatchingOverload,
    BadUnresolvedParameter,
    BadUnresolvedProperty,
    BadUnresolvedNavigationPropertyPath,
    BadUnresolvedEntityContainer,
    BadUnresolvedEntitySet,
    BadUnresolvedOperationImport,
    BadUnresolvedEnumMember,
    BadUnresolvedLabeledElement,
    BadCyclicEntity,
    BadCyclicComplex,
    BadCyclicTerm,
    BadCyclicEntityContainer,
    BadAmbiguousElementBinding,
    DuplicateAlias,
    InvalidAlias,
    InvalidNamespaceName,
    InvalidTypeName,
    InvalidBinary,
    InvalidBoolean,
    InvalidDate,
    InvalidDateTimeOffset,
    InvalidDecimal,
    InvalidDuration,
    InvalidFloatingPoint,
    InvalidGuid,
    InvalidInteger,
    InvalidTimeOfDay,
    InvalidEnumMemberPath,
    NavigationPropertyWithCollectionTypeCannotHaveNullableAttribute,
    ImpossibleAnnotationsTarget,
}

impl ErrorCode {
    pub fn category(self) -> ErrorCategory {
        use ErrorCode::*;
        match self {
            BadUnresolvedType
            | BadUnresolvedEntityType
            | BadUnresolvedComplexType
            | BadUnresolvedPrimitiveType
            | BadUnresolvedTerm
            | BadUnresolvedOperation
            | NoMatchingOverload
            | BadUnresolvedParameter
            | BadUnresolvedProperty
            | BadUnresolvedNavigationPropertyPath
            | BadUnresolvedEntityContainer
            | BadUnresolvedEntitySet
            | BadUnresolvedOperationImport
            | BadUnresolvedEnumMember
            | BadUnresolvedLabeledElement => ErrorCategory::UnresolvedName,
            BadCyclicEntity | BadCyclicComplex | BadCyclicTerm | BadCyclicEntityContainer => {
                ErrorCategory::Cycle
            }
            BadAmbiguousElementBinding | DuplicateAlias => ErrorCategory::Ambiguous,
            InvalidTypeName
            | InvalidBinary
            | InvalidBoolean
            | InvalidDate
            | InvalidDateTimeOffset
            | InvalidDecimal
            | InvalidDuration
            | InvalidFloatingPoint
            | InvalidGuid
            | InvalidInteger
            | InvalidTimeOfDay
            | InvalidEnumMemberPath => ErrorCategory::MalformedValue,
            InvalidAlias
            | InvalidNamespaceName
            | NavigationPropertyWithCollectionTypeCannotHaveNullableAttribute => {
                ErrorCategory::Structural
            }
            ImpossibleAnnotationsTarget => ErrorCategory::ImpossibleTarget,
        }
    }

    pub fn as_str(self) -> &'static str {
        use ErrorCode::*;
        match self {
            BadUnresolvedType => "BadUnresolvedType",
            BadUnresolvedEntityType => "BadUnresolvedEntityType",
            BadUnresolvedComplexType => "BadUnresolvedComplexType",
            BadUnresolvedPrimitiveType => "BadUnresolvedPrimitiveType",
            BadUnresolvedTerm => "BadUnresolvedTerm",
            BadUnresolvedOperation => "BadUnresolvedOperation",
            NoMatchingOverload => "NoMatchingOverload",
            BadUnresolvedParameter => "BadUnresolvedParameter",
            BadUnresolvedProperty => "BadUnresolvedProperty",
            BadUnresolvedNavigationPropertyPath => "BadUnresolvedNavigationPropertyPath",
            BadUnresolvedEntityContainer => "BadUnresolvedEntityContainer",
            BadUnresolvedEntitySet => "BadUnresolvedEntitySet",
            BadUnresolvedOperationImport => "BadUnresolvedOperationImport",
            BadUnresolvedEnumMember => "BadUnresolvedEnumMember",
            BadUnresolvedLabeledElement => "BadUnresolvedLabeledElement",
            BadCyclicEntity => "BadCyclicEntity",
            BadCyclicComplex => "BadCyclicComplex",
            BadCyclicTerm => "BadCyclicTerm",
            BadCyclicEntityContainer => "BadCyclicEntityContainer",
            BadAmbiguousElementBinding => "BadAmbiguousElementBinding",
            DuplicateAlias => "DuplicateAlias",
            InvalidAlias => "InvalidAlias",
            InvalidNamespaceName => "InvalidNamespaceName",
            InvalidTypeName => "InvalidTypeName",
            InvalidBinary => "InvalidBinary",
            InvalidBoolean => "InvalidBoolean",
            InvalidDate => "InvalidDate",
            InvalidDateTimeOffset => "InvalidDateTimeOffset",
            InvalidDecimal => "InvalidDecimal",
            InvalidDuration => "InvalidDuration",
            InvalidFloatingPoint => "InvalidFloatingPoint",
            InvalidGuid => "InvalidGuid",
            InvalidInteger => "InvalidInteger",
            InvalidTimeOfDay => "InvalidTimeOfDay",
            InvalidEnumMemberPath => "InvalidEnumMemberPath",
            NavigationPropertyWithCollectionTypeCannotHaveNullableAttribute => {
                "NavigationPropertyWithCollectionTypeCannotHaveNullableAttribute"
            }
            ImpossibleAnnotationsTarget => "ImpossibleAnnotationsTarget",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// EDM ERROR
// ============================================================================

/// A single resolution error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct EdmError {
    pub code: ErrorCode,
    pub message: String,
    pub location: Option<Span>,
}

impl EdmError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            location: None,
        }
    }

    /// Create an error at a source location.
    pub fn at(code: ErrorCode, location: Span, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            location: Some(location),
        }
    }

    /// Create an error whose location may be unknown.
    pub fn located(code: ErrorCode, location: Option<Span>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            location,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }
}

/// Capability shared by every semantic value that can carry errors.
///
/// Resolved elements report the errors of their own sub-resolutions;
/// placeholders report the error that produced them.
pub trait HasErrors {
    fn errors(&self, model: &Model) -> Vec<EdmError>;

    fn has_errors(&self, model: &Model) -> bool {
        !self.errors(model).is_empty()
    }
}

impl<T: HasErrors> HasErrors for Option<T> {
    fn errors(&self, model: &Model) -> Vec<EdmError> {
        self.as_ref().map(|v| v.errors(model)).unwrap_or_default()
    }
}

impl<T: HasErrors> HasErrors for [T] {
    fn errors(&self, model: &Model) -> Vec<EdmError> {
        self.iter().flat_map(|v| v.errors(model)).collect()
    }
}

impl<T: HasErrors> HasErrors for Vec<T> {
    fn errors(&self, model: &Model) -> Vec<EdmError> {
        self.as_slice().errors(model)
    }
}
