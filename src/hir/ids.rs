//! Stable handles into a model's node arenas.
//!
//! Every element id records the [`ModelId`] of the document that declares
//! it, so a root model can hand out and resolve ids that belong to its
//! referenced documents. Nested elements (properties, parameters, container
//! members) are addressed by their owner plus a position.

use std::fmt;

/// Identity of one model (document) within a model tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub(crate) u32);

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model#{}", self.0)
    }
}

macro_rules! top_level_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            model: ModelId,
            index: u32,
        }

        impl $name {
            pub(crate) fn new(model: ModelId, index: usize) -> Self {
                Self {
                    model,
                    index: index as u32,
                }
            }

            /// The model that declares this element.
            pub fn model(self) -> ModelId {
                self.model
            }

            pub(crate) fn index(self) -> usize {
                self.index as usize
            }
        }
    };
}

macro_rules! nested_id {
    ($(#[$meta:meta])* $name:ident => $owner:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            owner: $owner,
            index: u32,
        }

        impl $name {
            pub(crate) fn new(owner: $owner, index: usize) -> Self {
                Self {
                    owner,
                    index: index as u32,
                }
            }

            pub fn owner(self) -> $owner {
                self.owner
            }

            pub fn model(self) -> ModelId {
                self.owner.model()
            }

            pub(crate) fn index(self) -> usize {
                self.index as usize
            }
        }
    };
}

top_level_id!(
    /// An entity or complex type.
    StructuredTypeId
);
top_level_id!(EnumTypeId);
top_level_id!(TypeDefinitionId);
top_level_id!(
    /// An action or function.
    OperationId
);
top_level_id!(TermId);
top_level_id!(ContainerId);
top_level_id!(
    /// A vocabulary annotation, inline or out-of-line.
    AnnotationId
);

nested_id!(
    /// A declared structural or navigation property.
    PropertyId => StructuredTypeId
);
nested_id!(EnumMemberId => EnumTypeId);
nested_id!(ParameterId => OperationId);
nested_id!(EntitySetId => ContainerId);
nested_id!(SingletonId => ContainerId);
nested_id!(
    /// An action import or function import.
    OperationImportId => ContainerId
);
