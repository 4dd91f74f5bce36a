//! CSDL syntax tree — the input consumed by the semantic model.
//!
//! The tree is purely syntactic: every cross-reference is a raw string
//! exactly as written in the document (possibly alias-qualified), and every
//! node carries the [`Span`](crate::base::Span) it was parsed from. Turning
//! document text into this tree is the parser's job and lives outside this
//! crate.

mod annotations;
mod schema;

pub use annotations::{
    BinaryOperator, ConstantKind, CsdlAnnotation, CsdlAnnotations, CsdlExpression,
    CsdlExpressionKind, CsdlPropertyValue, PathKind,
};
pub use schema::{
    CsdlDocument, CsdlEntityContainer, CsdlEntitySet, CsdlEnumMember, CsdlEnumType, CsdlFacets,
    CsdlInclude, CsdlIncludeAnnotations, CsdlNavigationProperty, CsdlNavigationPropertyBinding,
    CsdlOperation, CsdlOperationImport, CsdlParameter, CsdlProperty, CsdlPropertyRef,
    CsdlReference, CsdlReferentialConstraint, CsdlReturnType, CsdlSchema, CsdlSingleton,
    CsdlStructuredType, CsdlTerm, CsdlTypeDefinition, OnDeleteAction, OperationKind,
    StructuredKind,
};
