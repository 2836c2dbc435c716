//! # Document Store
//!
//! Collection-keyed, in-memory JSON document store. Each document is a
//! `serde_json::Map` carrying `_id`, `createdAt` and `updatedAt`, which only
//! the store writes.
//!
//! Single-document calls take the lock for the duration of the call.
//! Read-check-write sequences that span several documents (uniqueness
//! checks, agent rollups) go through [`DocumentStore::with_write`], which
//! hands the closure a [`StoreTx`] under one write lock. The lock is
//! `parking_lot` and is never held across an `.await`.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use agency_core::temporal::{format_timestamp, now_rfc3339};
use agency_core::DocId;
use parking_lot::RwLock;
use serde_json::{Map, Value};

/// A stored document.
pub type Document = Map<String, Value>;

type Collections = HashMap<String, HashMap<String, Document>>;

/// Stored id of a document.
pub fn doc_id(doc: &Document) -> Option<&str> {
    doc.get("_id").and_then(Value::as_str)
}

/// Newest first: `createdAt` descending, then `_id` descending.
pub fn newest_first(a: &Document, b: &Document) -> Ordering {
    created_at(b)
        .cmp(created_at(a))
        .then_with(|| doc_id(b).cmp(&doc_id(a)))
}

fn created_at(doc: &Document) -> &str {
    doc.get("createdAt").and_then(Value::as_str).unwrap_or("")
}

/// Shared handle to the document store.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    data: Arc<RwLock<Collections>>,
}

/// Mutable view of the store held under its write lock.
pub struct StoreTx<'a> {
    data: &'a mut Collections,
}

impl StoreTx<'_> {
    /// Fetch a document.
    pub fn get(&self, collection: &str, id: &DocId) -> Option<&Document> {
        self.data.get(collection)?.get(id.as_str())
    }

    /// Iterate a collection in no particular order.
    pub fn iter<'s>(&'s self, collection: &str) -> impl Iterator<Item = &'s Document> + 's {
        self.data.get(collection).into_iter().flat_map(|c| c.values())
    }

    /// Clone every document matching `pred`, newest first.
    pub fn find(&self, collection: &str, pred: impl Fn(&Document) -> bool) -> Vec<Document> {
        let mut docs: Vec<Document> = self.iter(collection).filter(|d| pred(d)).cloned().collect();
        docs.sort_by(newest_first);
        docs
    }

    /// Insert a new document, assigning `_id`, `createdAt` and `updatedAt`.
    /// Any `_id` already present in `doc` is replaced.
    pub fn insert(&mut self, collection: &str, mut doc: Document) -> Document {
        let id = DocId::new();
        let now = now_rfc3339();
        doc.insert("_id".into(), Value::String(id.to_string()));
        doc.insert("createdAt".into(), Value::String(now.clone()));
        doc.insert("updatedAt".into(), Value::String(now));
        self.data
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc.clone());
        doc
    }

    /// Mutate a document in place and refresh `updatedAt`.
    /// Returns the updated document, or `None` if it does not exist.
    pub fn update(
        &mut self,
        collection: &str,
        id: &DocId,
        f: impl FnOnce(&mut Document),
    ) -> Option<Document> {
        let doc = self.data.get_mut(collection)?.get_mut(id.as_str())?;
        f(doc);
        doc.insert("_id".into(), Value::String(id.to_string()));
        doc.insert("updatedAt".into(), Value::String(now_rfc3339()));
        Some(doc.clone())
    }

    /// Store `doc` exactly as given, keyed by its `_id`. Documents without a
    /// valid `_id` are ignored and `false` is returned.
    pub fn replace(&mut self, collection: &str, doc: Document) -> bool {
        let Some(id) = doc_id(&doc).and_then(|s| DocId::parse(s).ok()) else {
            return false;
        };
        self.data
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), doc);
        true
    }

    /// Remove a document.
    pub fn remove(&mut self, collection: &str, id: &DocId) -> Option<Document> {
        self.data.get_mut(collection)?.remove(id.as_str())
    }

    /// Store a document read from durable storage. A missing `createdAt`
    /// is taken from the creation second embedded in the id.
    pub fn restore(&mut self, collection: &str, mut doc: Document) -> bool {
        if doc.get("createdAt").and_then(Value::as_str).is_none() {
            let created = doc_id(&doc)
                .and_then(|id| DocId::parse(id).ok())
                .and_then(|id| id.timestamp());
            if let Some(at) = created {
                doc.insert("createdAt".into(), Value::String(format_timestamp(at)));
            }
        }
        self.replace(collection, doc)
    }
}

impl DocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with exclusive access to every collection.
    pub fn with_write<R>(&self, f: impl FnOnce(&mut StoreTx<'_>) -> R) -> R {
        let mut guard = self.data.write();
        let mut tx = StoreTx { data: &mut *guard };
        f(&mut tx)
    }

    /// Insert a new document. See [`StoreTx::insert`].
    pub fn insert(&self, collection: &str, doc: Document) -> Document {
        self.with_write(|tx| tx.insert(collection, doc))
    }

    /// Fetch a document.
    pub fn get(&self, collection: &str, id: &DocId) -> Option<Document> {
        self.data.read().get(collection)?.get(id.as_str()).cloned()
    }

    /// Every document of a collection, newest first.
    pub fn list(&self, collection: &str) -> Vec<Document> {
        self.find(collection, |_| true)
    }

    /// Documents matching `pred`, newest first.
    pub fn find(&self, collection: &str, pred: impl Fn(&Document) -> bool) -> Vec<Document> {
        let guard = self.data.read();
        let mut docs: Vec<Document> = guard
            .get(collection)
            .into_iter()
            .flat_map(|c| c.values())
            .filter(|d| pred(d))
            .cloned()
            .collect();
        drop(guard);
        docs.sort_by(newest_first);
        docs
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.data.read().get(collection).map_or(0, HashMap::len)
    }

    /// Number of documents matching `pred`.
    pub fn count_where(&self, collection: &str, pred: impl Fn(&Document) -> bool) -> usize {
        self.data
            .read()
            .get(collection)
            .map_or(0, |c| c.values().filter(|d| pred(d)).count())
    }

    /// Mutate a document. See [`StoreTx::update`].
    pub fn update(
        &self,
        collection: &str,
        id: &DocId,
        f: impl FnOnce(&mut Document),
    ) -> Option<Document> {
        self.with_write(|tx| tx.update(collection, id, f))
    }

    /// Store a document as given. See [`StoreTx::replace`].
    pub fn replace(&self, collection: &str, doc: Document) -> bool {
        self.with_write(|tx| tx.replace(collection, doc))
    }

    /// Remove a document.
    pub fn remove(&self, collection: &str, id: &DocId) -> Option<Document> {
        self.with_write(|tx| tx.remove(collection, id))
    }

    /// Bulk-load documents read from durable storage. Returns how many were
    /// accepted; documents without a valid `_id` are skipped.
    pub fn load(&self, collection: &str, docs: impl IntoIterator<Item = Document>) -> usize {
        self.with_write(|tx| {
            let mut accepted = 0;
            for doc in docs {
                if tx.restore(collection, doc) {
                    accepted += 1;
                }
            }
            accepted
        })
    }

    /// Per-collection document counts.
    pub fn counts(&self) -> HashMap<String, usize> {
        self.data
            .read()
            .iter()
            .map(|(name, docs)| (name.clone(), docs.len()))
            .collect()
    }
}
