//! Reloadable holder for the current schema snapshot.

use super::Schema;
use std::sync::{Arc, PoisonError, RwLock};

/// Holds the schema visible to new validations.
///
/// Reloading never mutates a [`Schema`]: [`SchemaStore::replace`] swaps in a
/// freshly built one. Callers that took a [`SchemaStore::snapshot`] keep
/// validating against it until they drop the `Arc`.
#[derive(Debug)]
pub struct SchemaStore {
    current: RwLock<Arc<Schema>>,
}

impl SchemaStore {
    pub fn new(schema: Schema) -> Self {
        Self {
            current: RwLock::new(Arc::new(schema)),
        }
    }

    /// The schema new validations should use.
    pub fn snapshot(&self) -> Arc<Schema> {
        // The guarded value is a plain Arc swap, so a poisoned lock still holds a valid schema.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Swap in a new schema, returning the previous snapshot.
    pub fn replace(&self, schema: Schema) -> Arc<Schema> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Table;

    fn schema_with(name: &str) -> Schema {
        Schema::from_tables(vec![Table::new(name).with_column("id", "")]).unwrap()
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let store = SchemaStore::new(schema_with("users"));
        let before = store.snapshot();

        let previous = store.replace(schema_with("tickets"));

        assert!(before.has_table("users"));
        assert!(previous.has_table("users"));
        assert!(store.snapshot().has_table("tickets"));
        assert!(!store.snapshot().has_table("users"));
    }
}
