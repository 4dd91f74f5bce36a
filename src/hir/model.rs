//! The schema aggregator.
//!
//! A [`Model`] owns every semantic node of one CSDL document plus the models
//! of the documents it references. Construction only registers declarations
//! into name tables; every cross-reference is resolved lazily by the element
//! accessors (see the `structured`, `operations`, `navigation` and
//! `annotations` modules) and cached in [`Memo`](super::memo::Memo) cells.
//!
//! ## Construction
//!
//! ```text
//! references      ← referenced documents first, each with its own aliases
//!     │
//!     ▼
//! aliases         ← edmx:Include aliases, then schema aliases
//!     │
//!     ▼
//! declarations    ← types, operations (overload buckets), terms, containers
//!     │
//!     ▼
//! derived index   ← keyed by the raw base type's simple name
//!     │
//!     ▼
//! annotations     ← inline ones keyed by owner, out-of-line ones by
//!                   alias-normalized target path
//! ```
//!
//! ## Threading
//!
//! Reads write into memo cells, so a `Model` is neither `Sync` nor meant to
//! be shared between threads. Build and query it on one thread.

use std::mem;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::names::{is_qualified_name, is_simple_identifier, simple_name};
use crate::syntax::{
    CsdlAnnotation, CsdlAnnotations, CsdlDocument, CsdlInclude, CsdlIncludeAnnotations, CsdlSchema,
};

use super::aliases::AliasTable;
use super::annotations::AnnotationNode;
use super::containers::ContainerNode;
use super::diagnostics::{EdmError, ErrorCode, HasErrors};
use super::elements::ElementRef;
use super::enums::{EnumTypeNode, TypeDefinitionNode};
use super::ids::{
    AnnotationId, ContainerId, EntitySetId, EnumMemberId, EnumTypeId, ModelId, OperationId,
    OperationImportId, ParameterId, PropertyId, SingletonId, StructuredTypeId, TermId,
    TypeDefinitionId,
};
use super::operations::OperationNode;
use super::options::ModelOptions;
use super::resolution::{PlaceholderKind, Resolution, Unresolved};
use super::structured::StructuredTypeNode;
use super::terms::TermNode;
use super::types::SchemaType;

/// A referenced document and the selection made by the referencing document.
#[derive(Debug)]
pub struct ReferencedModel {
    uri: String,
    includes: Vec<CsdlInclude>,
    include_annotations: Vec<CsdlIncludeAnnotations>,
    model: Model,
}

impl ReferencedModel {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn includes(&self) -> &[CsdlInclude] {
        &self.includes
    }

    pub fn include_annotations(&self) -> &[CsdlIncludeAnnotations] {
        &self.include_annotations
    }

    pub fn model(&self) -> &Model {
        &self.model
    }
}

/// Resolved semantic model of one CSDL document.
#[derive(Debug)]
pub struct Model {
    id: ModelId,
    options: ModelOptions,
    version: Option<String>,
    references: Vec<ReferencedModel>,
    namespaces: Vec<SmolStr>,
    aliases: AliasTable,

    pub(crate) structured_types: Vec<StructuredTypeNode>,
    pub(crate) enum_types: Vec<EnumTypeNode>,
    pub(crate) type_definitions: Vec<TypeDefinitionNode>,
    pub(crate) operations: Vec<OperationNode>,
    pub(crate) terms: Vec<TermNode>,
    pub(crate) containers: Vec<ContainerNode>,
    pub(crate) annotations: Vec<AnnotationNode>,

    types_by_name: IndexMap<SmolStr, Vec<SchemaType>>,
    terms_by_name: IndexMap<SmolStr, Vec<TermId>>,
    operations_by_name: IndexMap<SmolStr, Vec<OperationId>>,
    containers_by_name: IndexMap<SmolStr, Vec<ContainerId>>,
    /// Structured types keyed by the simple name of their raw base type.
    derived_types: IndexMap<SmolStr, Vec<StructuredTypeId>>,
    /// Out-of-line annotations keyed by alias-normalized target path.
    out_of_line: IndexMap<String, Vec<AnnotationId>>,
    inline: FxHashMap<ElementRef, Vec<AnnotationId>>,
    construction_errors: Vec<EdmError>,
}

impl Model {
    pub fn new(document: CsdlDocument) -> Self {
        Self::with_options(document, ModelOptions::default())
    }

    pub fn with_options(document: CsdlDocument, options: ModelOptions) -> Self {
        let mut next_id = 0;
        Self::build(document, options, &mut next_id)
    }

    fn build(mut document: CsdlDocument, options: ModelOptions, next_id: &mut u32) -> Self {
        // 1. Referenced documents first
        let references: Vec<ReferencedModel> = mem::take(&mut document.references)
            .into_iter()
            .map(|reference| ReferencedModel {
                uri: reference.uri,
                includes: reference.includes,
                include_annotations: reference.include_annotations,
                model: Model::build(reference.document, options.clone(), next_id),
            })
            .collect();

        let id = ModelId(*next_id);
        *next_id += 1;

        let mut model = Model {
            id,
            options,
            version: document.version.take(),
            references,
            namespaces: Vec::new(),
            aliases: AliasTable::new(),
            structured_types: Vec::new(),
            enum_types: Vec::new(),
            type_definitions: Vec::new(),
            operations: Vec::new(),
            terms: Vec::new(),
            containers: Vec::new(),
            annotations: Vec::new(),
            types_by_name: IndexMap::new(),
            terms_by_name: IndexMap::new(),
            operations_by_name: IndexMap::new(),
            containers_by_name: IndexMap::new(),
            derived_types: IndexMap::new(),
            out_of_line: IndexMap::new(),
            inline: FxHashMap::default(),
            construction_errors: Vec::new(),
        };

        // 2. Aliases: included namespaces, then the document's own schemas
        let mut bindings = Vec::new();
        for reference in &model.references {
            for include in &reference.includes {
                if let Some(alias) = &include.alias {
                    bindings.push((include.namespace.clone(), alias.clone(), include.location));
                }
            }
        }
        for schema in &document.schemas {
            if let Some(alias) = &schema.alias {
                bindings.push((schema.namespace.clone(), alias.clone(), schema.location));
            }
        }
        for (namespace, alias, location) in bindings {
            if let Err(error) = model.aliases.register(&namespace, &alias, Some(location)) {
                tracing::warn!("[MODEL] {}", error.message);
                model.construction_errors.push(error);
            }
        }

        // 3-5. Declarations, derived index and annotation indexes
        for schema in document.schemas {
            model.register_schema(schema);
        }

        tracing::debug!(
            "[MODEL] built {}: {} namespace(s), {} type(s), {} operation(s), {} term(s), {} container(s), {} annotation(s), {} reference(s)",
            model.id,
            model.namespaces.len(),
            model.structured_types.len() + model.enum_types.len() + model.type_definitions.len(),
            model.operations.len(),
            model.terms.len(),
            model.containers.len(),
            model.annotations.len(),
            model.references.len()
        );
        model
    }

    fn register_schema(&mut self, schema: CsdlSchema) {
        let namespace = SmolStr::new(&schema.namespace);
        if !is_simple_identifier(&namespace) && !is_qualified_name(&namespace) {
            let error = EdmError::at(
                ErrorCode::InvalidNamespaceName,
                schema.location,
                format!("The namespace '{namespace}' is not a dotted sequence of simple identifiers."),
            );
            tracing::warn!("[MODEL] {}", error.message);
            self.construction_errors.push(error);
        }
        if !self.namespaces.contains(&namespace) {
            self.namespaces.push(namespace.clone());
        }

        for mut syntax in schema.structured_types {
            let id = StructuredTypeId::new(self.id, self.structured_types.len());
            let full_name = qualify_in(&namespace, &syntax.name);

            self.add_inline(
                ElementRef::Type(SchemaType::Structured(id)),
                mem::take(&mut syntax.annotations),
            );
            let structural = syntax.properties.len();
            for (index, property) in syntax.properties.iter_mut().enumerate() {
                self.add_inline(
                    ElementRef::Property(PropertyId::new(id, index)),
                    mem::take(&mut property.annotations),
                );
            }
            for (index, navigation) in syntax.navigation_properties.iter_mut().enumerate() {
                self.add_inline(
                    ElementRef::Property(PropertyId::new(id, structural + index)),
                    mem::take(&mut navigation.annotations),
                );
            }

            if let Some(base) = &syntax.base_type {
                self.derived_types
                    .entry(SmolStr::new(simple_name(base.trim())))
                    .or_default()
                    .push(id);
            }
            self.types_by_name
                .entry(full_name.clone())
                .or_default()
                .push(SchemaType::Structured(id));
            self.structured_types
                .push(StructuredTypeNode::new(syntax, namespace.clone(), full_name));
        }

        for mut syntax in schema.enum_types {
            let id = EnumTypeId::new(self.id, self.enum_types.len());
            let full_name = qualify_in(&namespace, &syntax.name);

            self.add_inline(
                ElementRef::Type(SchemaType::Enum(id)),
                mem::take(&mut syntax.annotations),
            );
            for (index, member) in syntax.members.iter_mut().enumerate() {
                self.add_inline(
                    ElementRef::EnumMember(EnumMemberId::new(id, index)),
                    mem::take(&mut member.annotations),
                );
            }

            self.types_by_name
                .entry(full_name.clone())
                .or_default()
                .push(SchemaType::Enum(id));
            self.enum_types
                .push(EnumTypeNode::new(syntax, namespace.clone(), full_name));
        }

        for mut syntax in schema.type_definitions {
            let id = TypeDefinitionId::new(self.id, self.type_definitions.len());
            let full_name = qualify_in(&namespace, &syntax.name);

            self.add_inline(
                ElementRef::Type(SchemaType::Definition(id)),
                mem::take(&mut syntax.annotations),
            );

            self.types_by_name
                .entry(full_name.clone())
                .or_default()
                .push(SchemaType::Definition(id));
            self.type_definitions
                .push(TypeDefinitionNode::new(syntax, namespace.clone(), full_name));
        }

        for mut syntax in schema.operations {
            let id = OperationId::new(self.id, self.operations.len());
            let full_name = qualify_in(&namespace, &syntax.name);

            self.add_inline(ElementRef::Operation(id), mem::take(&mut syntax.annotations));
            for (index, parameter) in syntax.parameters.iter_mut().enumerate() {
                self.add_inline(
                    ElementRef::Parameter(ParameterId::new(id, index)),
                    mem::take(&mut parameter.annotations),
                );
            }
            if let Some(return_type) = syntax.return_type.as_mut() {
                self.add_inline(
                    ElementRef::ReturnType(id),
                    mem::take(&mut return_type.annotations),
                );
            }

            let bucket = self.operations_by_name.entry(full_name.clone()).or_default();
            bucket.push(id);
            if bucket.len() > 1 {
                tracing::trace!(
                    "[MODEL] '{}' has {} overloads",
                    full_name,
                    bucket.len()
                );
            }
            self.operations
                .push(OperationNode::new(syntax, namespace.clone(), full_name));
        }

        for mut syntax in schema.terms {
            let id = TermId::new(self.id, self.terms.len());
            let full_name = qualify_in(&namespace, &syntax.name);

            self.add_inline(ElementRef::Term(id), mem::take(&mut syntax.annotations));

            self.terms_by_name
                .entry(full_name.clone())
                .or_default()
                .push(id);
            self.terms
                .push(TermNode::new(syntax, namespace.clone(), full_name));
        }

        for mut syntax in schema.entity_containers {
            let id = ContainerId::new(self.id, self.containers.len());
            let full_name = qualify_in(&namespace, &syntax.name);

            self.add_inline(ElementRef::Container(id), mem::take(&mut syntax.annotations));
            for (index, set) in syntax.entity_sets.iter_mut().enumerate() {
                self.add_inline(
                    ElementRef::EntitySet(EntitySetId::new(id, index)),
                    mem::take(&mut set.annotations),
                );
            }
            for (index, singleton) in syntax.singletons.iter_mut().enumerate() {
                self.add_inline(
                    ElementRef::Singleton(SingletonId::new(id, index)),
                    mem::take(&mut singleton.annotations),
                );
            }
            for (index, import) in syntax.operation_imports.iter_mut().enumerate() {
                self.add_inline(
                    ElementRef::OperationImport(OperationImportId::new(id, index)),
                    mem::take(&mut import.annotations),
                );
            }

            self.containers_by_name
                .entry(full_name.clone())
                .or_default()
                .push(id);
            self.containers
                .push(ContainerNode::new(syntax, namespace.clone(), full_name));
        }

        for block in schema.out_of_line_annotations {
            self.add_out_of_line(block);
        }
    }

    /// Wrap inline annotations once, keyed by their owner.
    fn add_inline(&mut self, owner: ElementRef, annotations: Vec<CsdlAnnotation>) {
        for syntax in annotations {
            let id = AnnotationId::new(self.id, self.annotations.len());
            self.annotations.push(AnnotationNode::inline(syntax, owner));
            self.inline.entry(owner).or_default().push(id);
        }
    }

    fn add_out_of_line(&mut self, block: CsdlAnnotations) {
        let normalized = self.normalize_target_path(&block.target);
        for syntax in block.annotations {
            let id = AnnotationId::new(self.id, self.annotations.len());
            self.annotations.push(AnnotationNode::out_of_line(
                syntax,
                &block.target,
                normalized.clone(),
                block.qualifier.as_deref(),
                block.location,
            ));
            self.out_of_line
                .entry(normalized.clone())
                .or_default()
                .push(id);
        }
    }

    // ========================================================================
    // IDENTITY
    // ========================================================================

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    /// `Version` of the source document, if it declared one.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn references(&self) -> &[ReferencedModel] {
        &self.references
    }

    /// The model in this tree with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` belongs to a model outside this tree; element ids are
    /// only meaningful together with the model tree that issued them.
    pub(crate) fn locate(&self, id: ModelId) -> &Model {
        match self.find_model(id) {
            Some(model) => model,
            None => panic!("{id} is not part of the model tree rooted at {}", self.id),
        }
    }

    fn find_model(&self, id: ModelId) -> Option<&Model> {
        if self.id == id {
            return Some(self);
        }
        self.references
            .iter()
            .find_map(|reference| reference.model.find_model(id))
    }

    /// Every model in this tree, this one first.
    pub(crate) fn tree(&self) -> Vec<&Model> {
        let mut models = vec![self];
        for reference in &self.references {
            models.extend(reference.model.tree());
        }
        models
    }

    // Node access. Each returns the declaring model along with the node so
    // that lazy resolution runs in the declaring document's scope.

    pub(crate) fn structured(&self, id: StructuredTypeId) -> (&Model, &StructuredTypeNode) {
        let owner = self.locate(id.model());
        (owner, &owner.structured_types[id.index()])
    }

    pub(crate) fn enum_type(&self, id: EnumTypeId) -> (&Model, &EnumTypeNode) {
        let owner = self.locate(id.model());
        (owner, &owner.enum_types[id.index()])
    }

    pub(crate) fn type_definition(&self, id: TypeDefinitionId) -> (&Model, &TypeDefinitionNode) {
        let owner = self.locate(id.model());
        (owner, &owner.type_definitions[id.index()])
    }

    pub(crate) fn operation(&self, id: OperationId) -> (&Model, &OperationNode) {
        let owner = self.locate(id.model());
        (owner, &owner.operations[id.index()])
    }

    pub(crate) fn term(&self, id: TermId) -> (&Model, &TermNode) {
        let owner = self.locate(id.model());
        (owner, &owner.terms[id.index()])
    }

    pub(crate) fn container(&self, id: ContainerId) -> (&Model, &ContainerNode) {
        let owner = self.locate(id.model());
        (owner, &owner.containers[id.index()])
    }

    pub(crate) fn annotation(&self, id: AnnotationId) -> (&Model, &AnnotationNode) {
        let owner = self.locate(id.model());
        (owner, &owner.annotations[id.index()])
    }

    // ========================================================================
    // ALIASES
    // ========================================================================

    /// Substitute a leading alias with its namespace; `None` when the name
    /// does not start with an alias known to this document.
    pub fn replace_alias(&self, name: &str) -> Option<String> {
        self.aliases.replace_alias(name)
    }

    pub fn namespace_alias(&self, namespace: &str) -> Option<&str> {
        self.aliases.alias_of(namespace)
    }

    pub fn alias_namespace(&self, alias: &str) -> Option<&str> {
        self.aliases.namespace_of(alias)
    }

    /// Alias-resolved form of a qualified name.
    pub(crate) fn qualify(&self, name: &str) -> String {
        let name = name.trim();
        self.replace_alias(name).unwrap_or_else(|| name.to_string())
    }

    // ========================================================================
    // LOOKUPS
    // ========================================================================

    pub fn declared_namespaces(&self) -> &[SmolStr] {
        &self.namespaces
    }

    /// Every top-level declaration of this document, in registration order.
    pub fn schema_elements(&self) -> impl Iterator<Item = ElementRef> + '_ {
        let id = self.id;
        let structured = (0..self.structured_types.len())
            .map(move |i| ElementRef::Type(SchemaType::Structured(StructuredTypeId::new(id, i))));
        let enums = (0..self.enum_types.len())
            .map(move |i| ElementRef::Type(SchemaType::Enum(EnumTypeId::new(id, i))));
        let definitions = (0..self.type_definitions.len())
            .map(move |i| ElementRef::Type(SchemaType::Definition(TypeDefinitionId::new(id, i))));
        let operations =
            (0..self.operations.len()).map(move |i| ElementRef::Operation(OperationId::new(id, i)));
        let terms = (0..self.terms.len()).map(move |i| ElementRef::Term(TermId::new(id, i)));
        let containers =
            (0..self.containers.len()).map(move |i| ElementRef::Container(ContainerId::new(id, i)));
        structured
            .chain(enums)
            .chain(definitions)
            .chain(operations)
            .chain(terms)
            .chain(containers)
    }

    pub fn structured_types(&self) -> impl Iterator<Item = StructuredTypeId> + '_ {
        (0..self.structured_types.len()).map(|i| StructuredTypeId::new(self.id, i))
    }

    pub fn enum_types(&self) -> impl Iterator<Item = EnumTypeId> + '_ {
        (0..self.enum_types.len()).map(|i| EnumTypeId::new(self.id, i))
    }

    pub fn type_definitions(&self) -> impl Iterator<Item = TypeDefinitionId> + '_ {
        (0..self.type_definitions.len()).map(|i| TypeDefinitionId::new(self.id, i))
    }

    pub fn operations(&self) -> impl Iterator<Item = OperationId> + '_ {
        (0..self.operations.len()).map(|i| OperationId::new(self.id, i))
    }

    pub fn terms(&self) -> impl Iterator<Item = TermId> + '_ {
        (0..self.terms.len()).map(|i| TermId::new(self.id, i))
    }

    pub fn entity_containers(&self) -> impl Iterator<Item = ContainerId> + '_ {
        (0..self.containers.len()).map(|i| ContainerId::new(self.id, i))
    }

    /// Look up a type by qualified (possibly aliased) name. Built-in
    /// `Edm.*` primitives and `Edm.Untyped` are always found.
    pub fn find_type(&self, name: &str) -> Resolution<SchemaType> {
        self.resolve_type_name(name, None)
    }

    pub fn find_term(&self, name: &str) -> Resolution<TermId> {
        self.resolve_term_name(name, None)
    }

    /// Every operation with this name, in declaration order: this document
    /// first, then referenced documents.
    pub fn find_operations(&self, name: &str) -> Vec<OperationId> {
        let full_name = self.qualify(name);
        self.candidates(&full_name, operations_table)
    }

    pub fn find_entity_container(&self, name: &str) -> Resolution<ContainerId> {
        self.resolve_container_name(name, None)
    }

    pub(crate) fn resolve_term_name(
        &self,
        name: &str,
        location: Option<crate::base::Span>,
    ) -> Resolution<TermId> {
        let full_name = self.qualify(name);
        let candidates = self.candidates(&full_name, terms_table);
        Resolution::from_candidates(&full_name, candidates, location, || {
            Unresolved::new(
                PlaceholderKind::Term,
                full_name.as_str(),
                EdmError::located(
                    ErrorCode::BadUnresolvedTerm,
                    location,
                    format!("The term '{full_name}' could not be found."),
                ),
            )
        })
    }

    pub(crate) fn resolve_container_name(
        &self,
        name: &str,
        location: Option<crate::base::Span>,
    ) -> Resolution<ContainerId> {
        let full_name = self.qualify(name);
        let candidates = self.candidates(&full_name, containers_table);
        Resolution::from_candidates(&full_name, candidates, location, || {
            Unresolved::new(
                PlaceholderKind::EntityContainer,
                full_name.as_str(),
                EdmError::located(
                    ErrorCode::BadUnresolvedEntityContainer,
                    location,
                    format!("The entity container '{full_name}' could not be found."),
                ),
            )
        })
    }

    pub(crate) fn type_candidates(&self, full_name: &str) -> Vec<SchemaType> {
        self.candidates(full_name, types_table)
    }

    fn candidates<T: Copy + PartialEq>(
        &self,
        full_name: &str,
        table: fn(&Model) -> &IndexMap<SmolStr, Vec<T>>,
    ) -> Vec<T> {
        let mut found = Vec::new();
        self.collect_candidates(full_name, table, &mut found);
        found
    }

    fn collect_candidates<T: Copy + PartialEq>(
        &self,
        full_name: &str,
        table: fn(&Model) -> &IndexMap<SmolStr, Vec<T>>,
        found: &mut Vec<T>,
    ) {
        if let Some(entries) = table(self).get(full_name) {
            for entry in entries {
                if !found.contains(entry) {
                    found.push(*entry);
                }
            }
        }
        for reference in &self.references {
            reference.model.collect_candidates(full_name, table, found);
        }
    }

    // ========================================================================
    // DERIVED TYPES
    // ========================================================================

    /// Types anywhere in this tree whose base type resolves to `base`.
    pub fn find_direct_derived_types(&self, base: StructuredTypeId) -> Vec<StructuredTypeId> {
        let base_name = base.name(self).to_string();
        let mut derived = Vec::new();
        for model in self.tree() {
            let Some(candidates) = model.derived_types.get(base_name.as_str()) else {
                continue;
            };
            for &candidate in candidates {
                let resolves_to_base = candidate
                    .base_type(self)
                    .and_then(|resolution| resolution.into_resolved())
                    == Some(base);
                if resolves_to_base && !derived.contains(&candidate) {
                    derived.push(candidate);
                }
            }
        }
        derived
    }

    /// Transitive closure of [`Model::find_direct_derived_types`].
    pub fn find_all_derived_types(&self, base: StructuredTypeId) -> Vec<StructuredTypeId> {
        let mut all = Vec::new();
        let mut pending = vec![base];
        while let Some(current) = pending.pop() {
            for derived in self.find_direct_derived_types(current) {
                if derived != base && !all.contains(&derived) {
                    all.push(derived);
                    pending.push(derived);
                }
            }
        }
        all
    }

    // ========================================================================
    // ANNOTATIONS
    // ========================================================================

    /// Every vocabulary annotation of this document (inline and out-of-line)
    /// followed by those merged from referenced documents.
    pub fn vocabulary_annotations(&self) -> Vec<AnnotationId> {
        let mut all: Vec<AnnotationId> = (0..self.annotations.len())
            .map(|i| AnnotationId::new(self.id, i))
            .collect();
        for reference in &self.references {
            for annotation in reference.model.vocabulary_annotations() {
                if self.options.include_all_referenced_annotations
                    || reference.selects(annotation)
                {
                    all.push(annotation);
                }
            }
        }
        all
    }

    /// Annotations applied to `element`: inline first, then out-of-line ones
    /// from this document and the merged referenced annotations.
    pub fn find_vocabulary_annotations(&self, element: ElementRef) -> Vec<AnnotationId> {
        let mut found = Vec::new();
        if let Some(model) = element.model_id().and_then(|id| self.find_model(id)) {
            if let Some(inline) = model.inline.get(&element) {
                found.extend(inline.iter().copied());
            }
        }
        for path in element.target_paths(self) {
            for annotation in self.find_vocabulary_annotations_for_path(&path) {
                if !found.contains(&annotation) {
                    found.push(annotation);
                }
            }
        }
        found
    }

    /// Out-of-line annotations whose target path normalizes to `target`.
    pub fn find_vocabulary_annotations_for_path(&self, target: &str) -> Vec<AnnotationId> {
        let normalized = self.normalize_target_path(target);
        let mut found: Vec<AnnotationId> = self
            .out_of_line
            .get(&normalized)
            .cloned()
            .unwrap_or_default();
        for reference in &self.references {
            for annotation in reference.model.find_vocabulary_annotations_for_path(&normalized) {
                if self.options.include_all_referenced_annotations
                    || reference.selects(annotation)
                {
                    found.push(annotation);
                }
            }
        }
        found
    }

    // ========================================================================
    // ERRORS
    // ========================================================================

    /// Every error of every element, this document first, then each
    /// referenced document.
    pub fn errors(&self) -> Vec<EdmError> {
        let mut errors = self.construction_errors.clone();
        for id in self.structured_types() {
            errors.extend(id.errors(self));
        }
        for id in self.enum_types() {
            errors.extend(id.errors(self));
        }
        for id in self.type_definitions() {
            errors.extend(id.errors(self));
        }
        for id in self.operations() {
            errors.extend(id.errors(self));
        }
        for id in self.terms() {
            errors.extend(id.errors(self));
        }
        for id in self.entity_containers() {
            errors.extend(id.errors(self));
        }
        for i in 0..self.annotations.len() {
            errors.extend(AnnotationId::new(self.id, i).errors(self));
        }
        for reference in &self.references {
            errors.extend(reference.model.errors());
        }
        errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }
}

fn qualify_in(namespace: &str, name: &str) -> SmolStr {
    SmolStr::new(format!("{namespace}.{name}"))
}

fn types_table(model: &Model) -> &IndexMap<SmolStr, Vec<SchemaType>> {
    &model.types_by_name
}

fn terms_table(model: &Model) -> &IndexMap<SmolStr, Vec<TermId>> {
    &model.terms_by_name
}

fn operations_table(model: &Model) -> &IndexMap<SmolStr, Vec<OperationId>> {
    &model.operations_by_name
}

fn containers_table(model: &Model) -> &IndexMap<SmolStr, Vec<ContainerId>> {
    &model.containers_by_name
}
