//! Schema-level CSDL syntax nodes.
//!
//! These mirror the CSDL elements one-to-one and carry raw strings for every
//! reference (type names, base types, partner paths, binding targets). All
//! fields are public; the `with_*` helpers exist so callers can assemble
//! trees without a parser.

use crate::base::Span;

use super::annotations::{CsdlAnnotation, CsdlAnnotations};

/// A parsed CSDL document: its own schemas plus referenced documents.
#[derive(Debug, Clone, Default)]
pub struct CsdlDocument {
    pub version: Option<String>,
    pub schemas: Vec<CsdlSchema>,
    pub references: Vec<CsdlReference>,
}

impl CsdlDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, schema: CsdlSchema) -> Self {
        self.schemas.push(schema);
        self
    }

    pub fn with_reference(mut self, reference: CsdlReference) -> Self {
        self.references.push(reference);
        self
    }
}

/// `edmx:Reference` together with the document it points at.
#[derive(Debug, Clone, Default)]
pub struct CsdlReference {
    pub uri: String,
    pub includes: Vec<CsdlInclude>,
    pub include_annotations: Vec<CsdlIncludeAnnotations>,
    pub document: CsdlDocument,
    pub location: Span,
}

impl CsdlReference {
    pub fn new(uri: impl Into<String>, document: CsdlDocument) -> Self {
        Self {
            uri: uri.into(),
            document,
            ..Self::default()
        }
    }

    pub fn with_include(mut self, namespace: impl Into<String>, alias: Option<&str>) -> Self {
        self.includes.push(CsdlInclude {
            namespace: namespace.into(),
            alias: alias.map(str::to_string),
            location: Span::default(),
        });
        self
    }

    pub fn with_include_annotations(mut self, include: CsdlIncludeAnnotations) -> Self {
        self.include_annotations.push(include);
        self
    }
}

/// `edmx:Include`
#[derive(Debug, Clone, Default)]
pub struct CsdlInclude {
    pub namespace: String,
    pub alias: Option<String>,
    pub location: Span,
}

/// `edmx:IncludeAnnotations`
#[derive(Debug, Clone, Default)]
pub struct CsdlIncludeAnnotations {
    pub term_namespace: String,
    pub qualifier: Option<String>,
    pub target_namespace: Option<String>,
}

impl CsdlIncludeAnnotations {
    pub fn new(term_namespace: impl Into<String>) -> Self {
        Self {
            term_namespace: term_namespace.into(),
            ..Self::default()
        }
    }
}

/// A `Schema` element.
#[derive(Debug, Clone, Default)]
pub struct CsdlSchema {
    pub namespace: String,
    pub alias: Option<String>,
    pub structured_types: Vec<CsdlStructuredType>,
    pub enum_types: Vec<CsdlEnumType>,
    pub type_definitions: Vec<CsdlTypeDefinition>,
    pub operations: Vec<CsdlOperation>,
    pub terms: Vec<CsdlTerm>,
    pub entity_containers: Vec<CsdlEntityContainer>,
    pub out_of_line_annotations: Vec<CsdlAnnotations>,
    pub location: Span,
}

impl CsdlSchema {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_type(mut self, ty: CsdlStructuredType) -> Self {
        self.structured_types.push(ty);
        self
    }

    pub fn with_enum(mut self, ty: CsdlEnumType) -> Self {
        self.enum_types.push(ty);
        self
    }

    pub fn with_type_definition(mut self, ty: CsdlTypeDefinition) -> Self {
        self.type_definitions.push(ty);
        self
    }

    pub fn with_operation(mut self, operation: CsdlOperation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn with_term(mut self, term: CsdlTerm) -> Self {
        self.terms.push(term);
        self
    }

    pub fn with_container(mut self, container: CsdlEntityContainer) -> Self {
        self.entity_containers.push(container);
        self
    }

    pub fn with_annotations(mut self, annotations: CsdlAnnotations) -> Self {
        self.out_of_line_annotations.push(annotations);
        self
    }
}

// ============================================================================
// TYPES
// ============================================================================

/// Entity or complex type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructuredKind {
    Entity,
    Complex,
}

/// Facets that can accompany any type reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsdlFacets {
    /// `None` when absent, `Some(None)` for `max`.
    pub max_length: Option<Option<u32>>,
    pub precision: Option<u32>,
    /// `Some(None)` for `variable`.
    pub scale: Option<Option<u32>>,
    /// `Some(None)` for `variable`.
    pub srid: Option<Option<u32>>,
    pub unicode: Option<bool>,
}

/// `EntityType` / `ComplexType`
#[derive(Debug, Clone)]
pub struct CsdlStructuredType {
    pub kind: StructuredKind,
    pub name: String,
    pub base_type: Option<String>,
    pub is_abstract: bool,
    pub is_open: bool,
    pub has_stream: bool,
    pub key: Option<Vec<CsdlPropertyRef>>,
    pub properties: Vec<CsdlProperty>,
    pub navigation_properties: Vec<CsdlNavigationProperty>,
    pub annotations: Vec<CsdlAnnotation>,
    pub location: Span,
}

impl CsdlStructuredType {
    pub fn new(kind: StructuredKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            base_type: None,
            is_abstract: false,
            is_open: false,
            has_stream: false,
            key: None,
            properties: Vec::new(),
            navigation_properties: Vec::new(),
            annotations: Vec::new(),
            location: Span::default(),
        }
    }

    pub fn entity(name: impl Into<String>) -> Self {
        Self::new(StructuredKind::Entity, name)
    }

    pub fn complex(name: impl Into<String>) -> Self {
        Self::new(StructuredKind::Complex, name)
    }

    pub fn with_base_type(mut self, base_type: impl Into<String>) -> Self {
        self.base_type = Some(base_type.into());
        self
    }

    pub fn with_key<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.key = Some(
            names
                .into_iter()
                .map(|name| CsdlPropertyRef {
                    name: name.to_string(),
                    alias: None,
                    location: Span::default(),
                })
                .collect(),
        );
        self
    }

    pub fn with_property(mut self, property: CsdlProperty) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_navigation(mut self, navigation: CsdlNavigationProperty) -> Self {
        self.navigation_properties.push(navigation);
        self
    }

    pub fn with_annotation(mut self, annotation: CsdlAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_location(mut self, location: Span) -> Self {
        self.location = location;
        self
    }

    pub fn set_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn set_open(mut self) -> Self {
        self.is_open = true;
        self
    }
}

/// `Key/PropertyRef`
#[derive(Debug, Clone, Default)]
pub struct CsdlPropertyRef {
    /// Property path, e.g. `Id` or `Address/Street`.
    pub name: String,
    pub alias: Option<String>,
    pub location: Span,
}

/// A structural `Property`.
#[derive(Debug, Clone, Default)]
pub struct CsdlProperty {
    pub name: String,
    pub type_name: String,
    pub nullable: Option<bool>,
    pub facets: CsdlFacets,
    pub default_value: Option<String>,
    pub annotations: Vec<CsdlAnnotation>,
    pub location: Span,
}

impl CsdlProperty {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_facets(mut self, facets: CsdlFacets) -> Self {
        self.facets = facets;
        self
    }

    pub fn with_annotation(mut self, annotation: CsdlAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// `OnDelete/@Action`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OnDeleteAction {
    Cascade,
    None,
    SetNull,
    SetDefault,
}

/// `ReferentialConstraint`
#[derive(Debug, Clone, Default)]
pub struct CsdlReferentialConstraint {
    pub property: String,
    pub referenced_property: String,
    pub location: Span,
}

/// A `NavigationProperty`.
#[derive(Debug, Clone, Default)]
pub struct CsdlNavigationProperty {
    pub name: String,
    pub type_name: String,
    pub nullable: Option<bool>,
    pub partner: Option<String>,
    pub contains_target: bool,
    pub referential_constraints: Vec<CsdlReferentialConstraint>,
    pub on_delete: Option<OnDeleteAction>,
    pub annotations: Vec<CsdlAnnotation>,
    pub location: Span,
}

impl CsdlNavigationProperty {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    pub fn with_partner(mut self, partner: impl Into<String>) -> Self {
        self.partner = Some(partner.into());
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn with_contains_target(mut self) -> Self {
        self.contains_target = true;
        self
    }

    pub fn with_on_delete(mut self, action: OnDeleteAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    pub fn with_constraint(
        mut self,
        property: impl Into<String>,
        referenced_property: impl Into<String>,
    ) -> Self {
        self.referential_constraints.push(CsdlReferentialConstraint {
            property: property.into(),
            referenced_property: referenced_property.into(),
            location: Span::default(),
        });
        self
    }

    pub fn with_annotation(mut self, annotation: CsdlAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// `EnumType`
#[derive(Debug, Clone, Default)]
pub struct CsdlEnumType {
    pub name: String,
    pub underlying_type: Option<String>,
    pub is_flags: bool,
    pub members: Vec<CsdlEnumMember>,
    pub annotations: Vec<CsdlAnnotation>,
    pub location: Span,
}

impl CsdlEnumType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_underlying_type(mut self, type_name: impl Into<String>) -> Self {
        self.underlying_type = Some(type_name.into());
        self
    }

    pub fn with_flags(mut self) -> Self {
        self.is_flags = true;
        self
    }

    pub fn with_member(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.members.push(CsdlEnumMember {
            name: name.into(),
            value: value.map(str::to_string),
            annotations: Vec::new(),
            location: Span::default(),
        });
        self
    }
}

/// `EnumType/Member`
#[derive(Debug, Clone, Default)]
pub struct CsdlEnumMember {
    pub name: String,
    /// Raw text of the `Value` attribute.
    pub value: Option<String>,
    pub annotations: Vec<CsdlAnnotation>,
    pub location: Span,
}

/// `TypeDefinition`
#[derive(Debug, Clone, Default)]
pub struct CsdlTypeDefinition {
    pub name: String,
    pub underlying_type: String,
    pub facets: CsdlFacets,
    pub annotations: Vec<CsdlAnnotation>,
    pub location: Span,
}

impl CsdlTypeDefinition {
    pub fn new(name: impl Into<String>, underlying_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            underlying_type: underlying_type.into(),
            ..Self::default()
        }
    }
}

// ============================================================================
// OPERATIONS
// ============================================================================

/// `Action` or `Function`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Action,
    Function,
}

/// `Action` / `Function`
#[derive(Debug, Clone)]
pub struct CsdlOperation {
    pub kind: OperationKind,
    pub name: String,
    pub is_bound: bool,
    pub is_composable: bool,
    pub entity_set_path: Option<String>,
    pub parameters: Vec<CsdlParameter>,
    pub return_type: Option<CsdlReturnType>,
    pub annotations: Vec<CsdlAnnotation>,
    pub location: Span,
}

impl CsdlOperation {
    pub fn new(kind: OperationKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            is_bound: false,
            is_composable: false,
            entity_set_path: None,
            parameters: Vec::new(),
            return_type: None,
            annotations: Vec::new(),
            location: Span::default(),
        }
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::new(OperationKind::Function, name)
    }

    pub fn action(name: impl Into<String>) -> Self {
        Self::new(OperationKind::Action, name)
    }

    pub fn bound(mut self) -> Self {
        self.is_bound = true;
        self
    }

    pub fn composable(mut self) -> Self {
        self.is_composable = true;
        self
    }

    pub fn with_entity_set_path(mut self, path: impl Into<String>) -> Self {
        self.entity_set_path = Some(path.into());
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.parameters.push(CsdlParameter::new(name, type_name));
        self
    }

    pub fn with_return_type(mut self, type_name: impl Into<String>) -> Self {
        self.return_type = Some(CsdlReturnType::new(type_name));
        self
    }

    pub fn with_location(mut self, location: Span) -> Self {
        self.location = location;
        self
    }
}

/// `Parameter`
#[derive(Debug, Clone, Default)]
pub struct CsdlParameter {
    pub name: String,
    pub type_name: String,
    pub nullable: Option<bool>,
    pub facets: CsdlFacets,
    pub annotations: Vec<CsdlAnnotation>,
    pub location: Span,
}

impl CsdlParameter {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Self::default()
        }
    }
}

/// `ReturnType`
#[derive(Debug, Clone, Default)]
pub struct CsdlReturnType {
    pub type_name: String,
    pub nullable: Option<bool>,
    pub facets: CsdlFacets,
    pub annotations: Vec<CsdlAnnotation>,
    pub location: Span,
}

impl CsdlReturnType {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ..Self::default()
        }
    }
}

// ============================================================================
// TERMS
// ============================================================================

/// `Term`
#[derive(Debug, Clone, Default)]
pub struct CsdlTerm {
    pub name: String,
    pub type_name: String,
    pub base_term: Option<String>,
    /// Space-separated `AppliesTo` values, already split.
    pub applies_to: Vec<String>,
    pub default_value: Option<String>,
    pub nullable: Option<bool>,
    pub facets: CsdlFacets,
    pub annotations: Vec<CsdlAnnotation>,
    pub location: Span,
}

impl CsdlTerm {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    pub fn with_base_term(mut self, base_term: impl Into<String>) -> Self {
        self.base_term = Some(base_term.into());
        self
    }

    pub fn with_applies_to<'a>(mut self, targets: impl IntoIterator<Item = &'a str>) -> Self {
        self.applies_to = targets.into_iter().map(str::to_string).collect();
        self
    }

    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

// ============================================================================
// CONTAINERS
// ============================================================================

/// `EntityContainer`
#[derive(Debug, Clone, Default)]
pub struct CsdlEntityContainer {
    pub name: String,
    pub extends: Option<String>,
    pub entity_sets: Vec<CsdlEntitySet>,
    pub singletons: Vec<CsdlSingleton>,
    pub operation_imports: Vec<CsdlOperationImport>,
    pub annotations: Vec<CsdlAnnotation>,
    pub location: Span,
}

impl CsdlEntityContainer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_extends(mut self, extends: impl Into<String>) -> Self {
        self.extends = Some(extends.into());
        self
    }

    pub fn with_entity_set(mut self, set: CsdlEntitySet) -> Self {
        self.entity_sets.push(set);
        self
    }

    pub fn with_singleton(mut self, singleton: CsdlSingleton) -> Self {
        self.singletons.push(singleton);
        self
    }

    pub fn with_import(mut self, import: CsdlOperationImport) -> Self {
        self.operation_imports.push(import);
        self
    }
}

/// `NavigationPropertyBinding`
#[derive(Debug, Clone, Default)]
pub struct CsdlNavigationPropertyBinding {
    pub path: String,
    pub target: String,
    pub location: Span,
}

/// `EntitySet`
#[derive(Debug, Clone)]
pub struct CsdlEntitySet {
    pub name: String,
    pub entity_type: String,
    pub include_in_service_document: bool,
    pub bindings: Vec<CsdlNavigationPropertyBinding>,
    pub annotations: Vec<CsdlAnnotation>,
    pub location: Span,
}

impl CsdlEntitySet {
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            include_in_service_document: true,
            bindings: Vec::new(),
            annotations: Vec::new(),
            location: Span::default(),
        }
    }

    pub fn with_binding(mut self, path: impl Into<String>, target: impl Into<String>) -> Self {
        self.bindings.push(CsdlNavigationPropertyBinding {
            path: path.into(),
            target: target.into(),
            location: Span::default(),
        });
        self
    }
}

/// `Singleton`
#[derive(Debug, Clone, Default)]
pub struct CsdlSingleton {
    pub name: String,
    pub type_name: String,
    pub bindings: Vec<CsdlNavigationPropertyBinding>,
    pub annotations: Vec<CsdlAnnotation>,
    pub location: Span,
}

impl CsdlSingleton {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ..Self::default()
        }
    }

    pub fn with_binding(mut self, path: impl Into<String>, target: impl Into<String>) -> Self {
        self.bindings.push(CsdlNavigationPropertyBinding {
            path: path.into(),
            target: target.into(),
            location: Span::default(),
        });
        self
    }
}

/// `ActionImport` / `FunctionImport`
#[derive(Debug, Clone)]
pub struct CsdlOperationImport {
    pub kind: OperationKind,
    pub name: String,
    /// Qualified name of the imported action or function.
    pub operation: String,
    pub entity_set: Option<String>,
    pub include_in_service_document: bool,
    pub annotations: Vec<CsdlAnnotation>,
    pub location: Span,
}

impl CsdlOperationImport {
    pub fn new(kind: OperationKind, name: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            operation: operation.into(),
            entity_set: None,
            include_in_service_document: false,
            annotations: Vec::new(),
            location: Span::default(),
        }
    }

    pub fn function(name: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::new(OperationKind::Function, name, operation)
    }

    pub fn action(name: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::new(OperationKind::Action, name, operation)
    }

    pub fn with_entity_set(mut self, entity_set: impl Into<String>) -> Self {
        self.entity_set = Some(entity_set.into());
        self
    }
}
