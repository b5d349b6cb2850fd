use std::cmp::Ordering;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::{debug, error};

use docql_core::{
    Document, DocqlError, DocqlResult, DocumentQuery, DocumentStore, DocumentStoreAsync,
    ResultCallback, SortDirection,
};

use super::eval::{get_field_value, sort_order, Predicate};

/// Collections of JSON documents held in memory.
///
/// Cloning is cheap and clones share the same data, which is what lets the
/// async path hand the store to a blocking task.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from `{"collection": [doc, ...], ...}`.
    pub fn from_json(data: Value) -> DocqlResult<Self> {
        let Value::Object(collections) = data else {
            return Err(DocqlError::StoreError(
                "Data must be an object of collections".to_string(),
            ));
        };

        let store = Self::new();
        for (name, docs) in collections {
            match docs {
                Value::Array(docs) => store.add_collection(&name, docs),
                other => {
                    return Err(DocqlError::StoreError(format!(
                        "Collection '{}' must be an array, got {}",
                        name, other
                    )));
                }
            }
        }
        Ok(store)
    }

    /// Replace a collection with the given documents
    pub fn add_collection(&self, name: &str, docs: Vec<Document>) {
        self.collections.write().insert(name.to_string(), docs);
    }

    /// Append a single document, creating the collection if needed
    pub fn insert(&self, collection: &str, doc: Document) {
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .push(doc);
    }

    pub fn collection_exists(&self, name: &str) -> bool {
        self.collections.read().contains_key(name)
    }

    pub fn list_collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn count(&self, collection: &str) -> usize {
        self.collections.read().get(collection).map_or(0, Vec::len)
    }

    fn execute(&self, query: &DocumentQuery) -> DocqlResult<Vec<Document>> {
        let predicate = query
            .condition
            .as_ref()
            .map(Predicate::compile)
            .transpose()?;

        let mut results: Vec<Document> = {
            let collections = self.collections.read();
            let docs = collections.get(&query.document_collection).ok_or_else(|| {
                DocqlError::StoreError(format!(
                    "Collection not found: {}",
                    query.document_collection
                ))
            })?;

            docs.iter()
                .filter(|doc| predicate.as_ref().map_or(true, |p| p.matches(doc)))
                .cloned()
                .collect()
        };

        if !query.sorts.is_empty() {
            results.sort_by(|a, b| {
                for sort in &query.sorts {
                    let ordering =
                        sort_order(get_field_value(a, &sort.name), get_field_value(b, &sort.name));
                    let ordering = match sort.direction {
                        SortDirection::Asc => ordering,
                        SortDirection::Desc => ordering.reverse(),
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = match query.limit {
            0 => usize::MAX,
            n => usize::try_from(n).unwrap_or(usize::MAX),
        };

        let results: Vec<Document> = results
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| project(doc, &query.documents))
            .collect();

        debug!(
            collection = %query.document_collection,
            matched = results.len(),
            "Memory store select"
        );
        Ok(results)
    }
}

/// Keep only the requested fields. Dotted paths rebuild the nesting; missing
/// fields are left out.
fn project(doc: Document, fields: &[String]) -> Document {
    if fields.is_empty() {
        return doc;
    }

    let mut projected = Map::new();
    for field in fields {
        let value = get_field_value(&doc, field);
        if value.is_null() {
            continue;
        }
        insert_path(&mut projected, field, value.clone());
    }
    Value::Object(projected)
}

fn insert_path(target: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            target.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(child) = child {
                insert_path(child, rest, value);
            }
        }
    }
}

/// Hand the outcome of `run` to `callback`, turning a panic into a store
/// error so the callback is still called exactly once.
fn deliver<F>(callback: ResultCallback, run: F)
where
    F: FnOnce() -> DocqlResult<Vec<Document>>,
{
    let result = panic::catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|_| {
        error!("Memory store select panicked");
        Err(DocqlError::StoreError(
            "Memory store select panicked".to_string(),
        ))
    });
    callback(result);
}

impl DocumentStore for MemoryStore {
    fn select(&self, query: &DocumentQuery) -> DocqlResult<Vec<Document>> {
        self.execute(query)
    }
}

impl DocumentStoreAsync for MemoryStore {
    /// Runs on tokio's blocking pool. Outside a runtime the callback is
    /// invoked immediately with a store error.
    fn select(&self, query: DocumentQuery, callback: ResultCallback) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let store = self.clone();
                handle.spawn_blocking(move || deliver(callback, || store.execute(&query)));
            }
            Err(e) => callback(Err(DocqlError::StoreError(format!(
                "No async runtime available: {}",
                e
            )))),
        }
    }
}
