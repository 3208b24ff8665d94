//! Document store contract and in-memory implementation.
//!
//! The engine's persistence collaborator: keyed JSON documents grouped in
//! named collections, written through a [`Transaction`] whose operations
//! commit atomically. Creation is an overwrite (upsert) so deterministic
//! document keys never duplicate; deletion is idempotent.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::error::{EngineError, EngineResult};

/// A buffered write operation.
#[derive(Debug, Clone)]
enum WriteOp {
    Put {
        collection: String,
        id: String,
        doc: Value,
    },
    Delete {
        collection: String,
        id: String,
    },
}

/// A write buffer committed atomically by the store.
///
/// Reads during a transaction see the committed state; the buffer only
/// holds this call's own writes (last-writer-wins at the store layer).
#[derive(Debug, Default)]
pub struct Transaction {
    ops: Vec<WriteOp>,
}

impl Transaction {
    /// Buffers an upsert of a document.
    pub fn put<T: Serialize>(&mut self, collection: &str, id: &str, doc: &T) -> EngineResult<()> {
        let value = serde_json::to_value(doc).map_err(|e| EngineError::Validation {
            field: format!("{}/{}", collection, id),
            message: format!("document not serializable: {}", e),
        })?;
        self.ops.push(WriteOp::Put {
            collection: collection.to_string(),
            id: id.to_string(),
            doc: value,
        });
        Ok(())
    }

    /// Buffers a deletion.
    pub fn delete(&mut self, collection: &str, id: &str) {
        self.ops.push(WriteOp::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        });
    }

    /// The number of buffered operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True when nothing was buffered.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// The persistence contract consumed by the engine's services.
pub trait DocumentStore {
    /// Runs `f` with a fresh transaction and commits its writes atomically.
    ///
    /// An error from `f` discards the buffer; nothing is applied.
    fn run_in_transaction<T, F>(&self, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut Transaction) -> EngineResult<T>;

    /// Fetches one document by id.
    fn fetch_one<T: DeserializeOwned>(&self, collection: &str, id: &str)
    -> EngineResult<Option<T>>;

    /// Fetches every document whose id starts with `prefix`, with ids, in
    /// id order.
    fn fetch_prefix<T: DeserializeOwned>(
        &self,
        collection: &str,
        prefix: &str,
    ) -> EngineResult<Vec<(String, T)>>;

    /// Upserts a document, inside `tx` when given, else in a fresh
    /// transaction of its own.
    fn create<T: Serialize>(
        &self,
        collection: &str,
        id: &str,
        doc: &T,
        tx: Option<&mut Transaction>,
    ) -> EngineResult<()> {
        match tx {
            Some(tx) => tx.put(collection, id, doc),
            None => self.run_in_transaction(|tx| tx.put(collection, id, doc)),
        }
    }

    /// Overwrites a document; same commit semantics as [`create`](Self::create).
    fn update<T: Serialize>(
        &self,
        collection: &str,
        id: &str,
        doc: &T,
        tx: Option<&mut Transaction>,
    ) -> EngineResult<()> {
        self.create(collection, id, doc, tx)
    }

    /// Deletes a document (idempotent); same commit semantics as
    /// [`create`](Self::create).
    fn delete(&self, collection: &str, id: &str, tx: Option<&mut Transaction>) -> EngineResult<()> {
        match tx {
            Some(tx) => {
                tx.delete(collection, id);
                Ok(())
            }
            None => self.run_in_transaction(|tx| {
                tx.delete(collection, id);
                Ok(())
            }),
        }
    }
}

/// In-memory document store.
///
/// The test double standing in for the external transactional store:
/// collections of JSON documents behind one mutex, so a committed
/// transaction is atomic with respect to every other call.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, BTreeMap<String, Value>>> {
        // A poisoned mutex only means another test thread panicked; the
        // data itself is JSON documents and stays usable.
        self.collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The number of documents currently in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.lock().get(collection).map_or(0, BTreeMap::len)
    }
}

impl DocumentStore for MemoryStore {
    fn run_in_transaction<T, F>(&self, f: F) -> EngineResult<T>
    where
        F: FnOnce(&mut Transaction) -> EngineResult<T>,
    {
        let mut tx = Transaction::default();
        let out = f(&mut tx)?;

        let mut collections = self.lock();
        for op in tx.ops {
            match op {
                WriteOp::Put { collection, id, doc } => {
                    collections.entry(collection).or_default().insert(id, doc);
                }
                WriteOp::Delete { collection, id } => {
                    if let Some(docs) = collections.get_mut(&collection) {
                        docs.remove(&id);
                    }
                }
            }
        }
        Ok(out)
    }

    fn fetch_one<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> EngineResult<Option<T>> {
        let collections = self.lock();
        let Some(doc) = collections.get(collection).and_then(|docs| docs.get(id)) else {
            return Ok(None);
        };
        let parsed = serde_json::from_value(doc.clone()).map_err(|e| EngineError::Validation {
            field: format!("{}/{}", collection, id),
            message: format!("stored document not deserializable: {}", e),
        })?;
        Ok(Some(parsed))
    }

    fn fetch_prefix<T: DeserializeOwned>(
        &self,
        collection: &str,
        prefix: &str,
    ) -> EngineResult<Vec<(String, T)>> {
        let collections = self.lock();
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        for (id, doc) in docs.range(prefix.to_string()..) {
            if !id.starts_with(prefix) {
                break;
            }
            let parsed =
                serde_json::from_value(doc.clone()).map_err(|e| EngineError::Validation {
                    field: format!("{}/{}", collection, id),
                    message: format!("stored document not deserializable: {}", e),
                })?;
            out.push((id.clone(), parsed));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Doc {
        value: i64,
    }

    /// DS-001: committed writes are visible
    #[test]
    fn test_create_and_fetch() {
        let store = MemoryStore::new();
        store.create("docs", "a", &Doc { value: 1 }, None).unwrap();
        let fetched: Option<Doc> = store.fetch_one("docs", "a").unwrap();
        assert_eq!(fetched, Some(Doc { value: 1 }));
    }

    /// DS-002: create overwrites rather than duplicates
    #[test]
    fn test_create_is_upsert() {
        let store = MemoryStore::new();
        store.create("docs", "a", &Doc { value: 1 }, None).unwrap();
        store.create("docs", "a", &Doc { value: 2 }, None).unwrap();
        assert_eq!(store.count("docs"), 1);
        let fetched: Option<Doc> = store.fetch_one("docs", "a").unwrap();
        assert_eq!(fetched, Some(Doc { value: 2 }));
    }

    /// DS-003: a failed transaction applies nothing
    #[test]
    fn test_failed_transaction_discards_writes() {
        let store = MemoryStore::new();
        let result: EngineResult<()> = store.run_in_transaction(|tx| {
            tx.put("docs", "a", &Doc { value: 1 })?;
            Err(EngineError::Validation {
                field: "test".to_string(),
                message: "boom".to_string(),
            })
        });
        assert!(result.is_err());
        assert_eq!(store.count("docs"), 0);
    }

    /// DS-004: all writes of one transaction commit together
    #[test]
    fn test_transaction_commits_all_ops() {
        let store = MemoryStore::new();
        store.create("docs", "a", &Doc { value: 1 }, None).unwrap();
        store
            .run_in_transaction(|tx| {
                tx.put("docs", "b", &Doc { value: 2 })?;
                tx.delete("docs", "a");
                Ok(())
            })
            .unwrap();
        assert_eq!(store.count("docs"), 1);
        let fetched: Option<Doc> = store.fetch_one("docs", "b").unwrap();
        assert_eq!(fetched, Some(Doc { value: 2 }));
    }

    /// DS-005: delete is idempotent
    #[test]
    fn test_delete_missing_is_ok() {
        let store = MemoryStore::new();
        store.delete("docs", "missing", None).unwrap();
        assert_eq!(store.count("docs"), 0);
    }

    /// DS-006: prefix fetch returns matching ids in order
    #[test]
    fn test_fetch_prefix() {
        let store = MemoryStore::new();
        store.create("docs", "S1-E2", &Doc { value: 2 }, None).unwrap();
        store.create("docs", "S1-E1", &Doc { value: 1 }, None).unwrap();
        store.create("docs", "S2-E1", &Doc { value: 3 }, None).unwrap();

        let matches: Vec<(String, Doc)> = store.fetch_prefix("docs", "S1-").unwrap();
        let ids: Vec<&str> = matches.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["S1-E1", "S1-E2"]);
    }

    #[test]
    fn test_fetch_prefix_empty_collection() {
        let store = MemoryStore::new();
        let matches: Vec<(String, Doc)> = store.fetch_prefix("docs", "S1-").unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_fetch_one_missing_is_none() {
        let store = MemoryStore::new();
        let fetched: Option<Doc> = store.fetch_one("docs", "missing").unwrap();
        assert_eq!(fetched, None);
    }
}
