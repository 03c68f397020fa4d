//! Shared cache of built schema descriptors.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::Result;
use crate::model::XmlModel;

use super::build::build_schema;
use super::declare::{ModelKey, ModelRef};
use super::descriptor::SchemaDescriptor;

/// Cache mapping model types to their descriptors.
///
/// Descriptors are built on first use, together with every model reachable
/// through nested fields, and never change afterwards. Lookups take a read
/// lock; builds are serialized by a separate mutex and re-check the cache,
/// so each model is built once even under contention. If any model in a
/// nested graph is invalid, nothing from that graph is cached.
#[derive(Debug, Default)]
pub struct SchemaStore {
    schemas: RwLock<HashMap<ModelKey, Arc<SchemaDescriptor>>>,
    build_lock: Mutex<()>,
}

impl SchemaStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor of `T`, building it if needed.
    ///
    /// # Errors
    /// Returns `Schema` if the declaration of `T` or of a nested model is invalid.
    pub fn schema_for<T: XmlModel>(&self) -> Result<Arc<SchemaDescriptor>> {
        self.resolve(ModelRef::of::<T>())
    }

    /// Descriptor of the referenced model, building it if needed.
    ///
    /// # Errors
    /// Returns `Schema` if the declaration or a nested declaration is invalid.
    pub fn resolve(&self, model: ModelRef) -> Result<Arc<SchemaDescriptor>> {
        if let Some(schema) = self.get(&model.key()) {
            return Ok(schema);
        }

        let _guard = self.build_lock.lock();
        if let Some(schema) = self.get(&model.key()) {
            return Ok(schema);
        }

        let (root, others) = self.build_graph(model)?;
        let root = Arc::new(root);
        let mut schemas = self.schemas.write();
        schemas.insert(root.key, Arc::clone(&root));
        for schema in others {
            schemas.insert(schema.key, Arc::new(schema));
        }
        Ok(root)
    }

    /// Build `model` and every not yet cached model reachable from it.
    fn build_graph(&self, model: ModelRef) -> Result<(SchemaDescriptor, Vec<SchemaDescriptor>)> {
        let (root, mut pending) = self.build_one(model)?;
        let mut seen = vec![model.key()];
        let mut built = Vec::new();

        while let Some(next) = pending.pop() {
            let key = next.key();
            if seen.contains(&key) || self.contains(&key) {
                continue;
            }
            seen.push(key);
            let (schema, nested) = self.build_one(next)?;
            pending.extend(nested);
            built.push(schema);
        }
        Ok((root, built))
    }

    fn build_one(&self, model: ModelRef) -> Result<(SchemaDescriptor, Vec<ModelRef>)> {
        let decl = model.declaration();
        let (schema, nested) = build_schema(model.key(), &decl)?;
        tracing::debug!(
            model = %model.key(),
            fields = schema.fields.len(),
            "Built schema descriptor"
        );
        Ok((schema, nested))
    }

    /// Cached descriptor for `key`, without building.
    #[must_use]
    pub fn get(&self, key: &ModelKey) -> Option<Arc<SchemaDescriptor>> {
        self.schemas.read().get(key).cloned()
    }

    #[must_use]
    pub fn contains(&self, key: &ModelKey) -> bool {
        self.schemas.read().contains_key(key)
    }

    /// Number of cached descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }
}
