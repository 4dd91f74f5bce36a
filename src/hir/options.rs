//! Model construction options

/// Options controlling how a [`Model`](super::Model) resolves its document.
///
/// Referenced models are built with the same options as their referencer.
#[derive(Debug, Clone)]
pub struct ModelOptions {
    /// Search the target type for a reciprocal navigation property when a
    /// navigation property declares no `Partner`.
    pub reciprocal_partner_search: bool,
    /// Merge every annotation of referenced documents, not only those
    /// selected by `edmx:IncludeAnnotations`.
    pub include_all_referenced_annotations: bool,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            reciprocal_partner_search: true,
            include_all_referenced_annotations: false,
        }
    }
}

impl ModelOptions {
    pub fn with_reciprocal_partner_search(mut self, enabled: bool) -> Self {
        self.reciprocal_partner_search = enabled;
        self
    }

    pub fn with_all_referenced_annotations(mut self, enabled: bool) -> Self {
        self.include_all_referenced_annotations = enabled;
        self
    }
}
