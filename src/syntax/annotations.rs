//! Vocabulary annotation syntax and annotation expressions.

use crate::base::Span;

/// An out-of-line `Annotations` block bound to a target path string.
#[derive(Debug, Clone, Default)]
pub struct CsdlAnnotations {
    pub target: String,
    pub qualifier: Option<String>,
    pub annotations: Vec<CsdlAnnotation>,
    pub location: Span,
}

impl CsdlAnnotations {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn with_annotation(mut self, annotation: CsdlAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// A single `Annotation` element.
#[derive(Debug, Clone, Default)]
pub struct CsdlAnnotation {
    /// Qualified (possibly aliased) term name.
    pub term: String,
    pub qualifier: Option<String>,
    pub value: Option<CsdlExpression>,
    pub location: Span,
}

impl CsdlAnnotation {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Self::default()
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn with_value(mut self, value: CsdlExpression) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_location(mut self, location: Span) -> Self {
        self.location = location;
        self
    }
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

/// Constant expression kinds; the literal text is kept raw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstantKind {
    Binary,
    Bool,
    Date,
    DateTimeOffset,
    Decimal,
    Duration,
    EnumMember,
    Float,
    Guid,
    Int,
    String,
    TimeOfDay,
}

/// Path expression flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    Path,
    PropertyPath,
    NavigationPropertyPath,
    AnnotationPath,
    ModelElementPath,
}

/// Operators of the logical/comparison expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    And,
    Or,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

/// A `PropertyValue` inside a `Record`.
#[derive(Debug, Clone)]
pub struct CsdlPropertyValue {
    pub property: String,
    pub value: CsdlExpression,
    pub location: Span,
}

/// An annotation expression.
#[derive(Debug, Clone)]
pub struct CsdlExpression {
    pub kind: CsdlExpressionKind,
    pub location: Span,
}

#[derive(Debug, Clone)]
pub enum CsdlExpressionKind {
    Constant {
        kind: ConstantKind,
        text: String,
    },
    Null,
    Path {
        kind: PathKind,
        path: String,
    },
    Record {
        type_name: Option<String>,
        properties: Vec<CsdlPropertyValue>,
    },
    Collection(Vec<CsdlExpression>),
    If {
        test: Box<CsdlExpression>,
        if_true: Box<CsdlExpression>,
        if_false: Option<Box<CsdlExpression>>,
    },
    Apply {
        function: String,
        arguments: Vec<CsdlExpression>,
    },
    Cast {
        type_name: String,
        operand: Box<CsdlExpression>,
    },
    IsOf {
        type_name: String,
        operand: Box<CsdlExpression>,
    },
    LabeledElement {
        name: String,
        operand: Box<CsdlExpression>,
    },
    LabeledElementReference(String),
    Not(Box<CsdlExpression>),
    Binary {
        operator: BinaryOperator,
        left: Box<CsdlExpression>,
        right: Box<CsdlExpression>,
    },
}

impl CsdlExpression {
    pub fn new(kind: CsdlExpressionKind) -> Self {
        Self {
            kind,
            location: Span::default(),
        }
    }

    pub fn with_location(mut self, location: Span) -> Self {
        self.location = location;
        self
    }

    pub fn constant(kind: ConstantKind, text: impl Into<String>) -> Self {
        Self::new(CsdlExpressionKind::Constant {
            kind,
            text: text.into(),
        })
    }

    pub fn int(value: i64) -> Self {
        Self::constant(ConstantKind::Int, value.to_string())
    }

    pub fn string(text: impl Into<String>) -> Self {
        Self::constant(ConstantKind::String, text)
    }

    pub fn bool(value: bool) -> Self {
        Self::constant(ConstantKind::Bool, value.to_string())
    }

    pub fn null() -> Self {
        Self::new(CsdlExpressionKind::Null)
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self::new(CsdlExpressionKind::Path {
            kind: PathKind::Path,
            path: path.into(),
        })
    }

    pub fn apply(function: impl Into<String>, arguments: Vec<CsdlExpression>) -> Self {
        Self::new(CsdlExpressionKind::Apply {
            function: function.into(),
            arguments,
        })
    }

    pub fn cast(type_name: impl Into<String>, operand: CsdlExpression) -> Self {
        Self::new(CsdlExpressionKind::Cast {
            type_name: type_name.into(),
            operand: Box::new(operand),
        })
    }

    pub fn record(type_name: Option<&str>, properties: Vec<(&str, CsdlExpression)>) -> Self {
        Self::new(CsdlExpressionKind::Record {
            type_name: type_name.map(str::to_string),
            properties: properties
                .into_iter()
                .map(|(property, value)| CsdlPropertyValue {
                    property: property.to_string(),
                    value,
                    location: Span::default(),
                })
                .collect(),
        })
    }

    pub fn collection(elements: Vec<CsdlExpression>) -> Self {
        Self::new(CsdlExpressionKind::Collection(elements))
    }
}
