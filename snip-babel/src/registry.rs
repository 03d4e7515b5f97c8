//! Format registry for target discovery and selection
//!
//! Descriptors are registered and looked up by name, so callers (the CLI, config-driven
//! batch runs) never reference a format constant directly.

use crate::emit::{self, EmitReport};
use crate::error::ExportError;
use crate::format::{FormatDescriptor, TargetContext};
use crate::store::SnippetStore;
use std::collections::HashMap;

/// Registry of export targets
///
/// # Examples
///
/// ```ignore
/// let registry = FormatRegistry::default();
/// let target = TargetContext::new("text.pml", "pml", "out/atom");
/// let report = registry.export(&store, "atom", &target)?;
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, FormatDescriptor>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a descriptor
    ///
    /// If a descriptor with the same name already exists, it will be replaced.
    pub fn register(&mut self, descriptor: FormatDescriptor) {
        self.formats.insert(descriptor.name.to_string(), descriptor);
    }

    /// Get a descriptor by name
    pub fn get(&self, name: &str) -> Result<&FormatDescriptor, ExportError> {
        self.formats
            .get(name)
            .ok_or_else(|| ExportError::FormatNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// List all available format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// All descriptors, sorted by name
    pub fn descriptors(&self) -> Vec<&FormatDescriptor> {
        let mut descriptors: Vec<_> = self.formats.values().collect();
        descriptors.sort_by_key(|d| d.name);
        descriptors
    }

    /// Export one target using the named format
    pub fn export(
        &self,
        store: &dyn SnippetStore,
        format: &str,
        target: &TargetContext,
    ) -> Result<EmitReport, ExportError> {
        let descriptor = self.get(format)?;
        emit::emit(store, descriptor, target)
    }

    /// Create a registry with every built-in format
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for descriptor in crate::formats::all() {
            registry.register(descriptor);
        }
        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
