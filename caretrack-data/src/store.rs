//! In-memory document store.
//!
//! One `Collection<T>` per entity, keyed by id. Queries serialize each
//! document to JSON and evaluate the structured filter against it, which
//! gives the same field name space the wire uses.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use uuid::Uuid;

use crate::query::{compare_values, ListQuery};

/// Error type for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Poisoned lock
    #[error("Store lock error: {0}")]
    Lock(String),

    /// Document failed to (de)serialize
    #[error("Document serialization error: {0}")]
    Serialization(String),
}

/// A single in-memory collection of documents
#[derive(Debug)]
pub struct Collection<T> {
    documents: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            documents: Arc::clone(&self.documents),
        }
    }
}

impl<T: Clone + Serialize + DeserializeOwned> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Collection<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Create an empty collection
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert or replace a document under the given id
    pub fn put(&self, id: Uuid, document: T) -> Result<T, StoreError> {
        let mut store = self
            .documents
            .write()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        store.insert(id, document.clone());
        Ok(document)
    }

    /// Fetch a document by id
    pub fn get(&self, id: &Uuid) -> Result<Option<T>, StoreError> {
        let store = self
            .documents
            .read()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        Ok(store.get(id).cloned())
    }

    /// Remove a document by id, returning it if present
    pub fn remove(&self, id: &Uuid) -> Result<Option<T>, StoreError> {
        let mut store = self
            .documents
            .write()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        Ok(store.remove(id))
    }

    /// Number of stored documents
    pub fn len(&self) -> Result<usize, StoreError> {
        let store = self
            .documents
            .read()
            .map_err(|e| StoreError::Lock(e.to_string()))?;
        Ok(store.len())
    }

    /// True when the collection holds no documents
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Run a list query: filter, sort, then apply the pagination window.
    /// Returns the page of documents and the total count matching the
    /// filter. Count and fetch happen under one read lock, so within a
    /// single call the total is consistent with the page.
    pub fn find(&self, query: &ListQuery) -> Result<(Vec<T>, usize), StoreError> {
        let store = self
            .documents
            .read()
            .map_err(|e| StoreError::Lock(e.to_string()))?;

        let mut matched: Vec<(T, Value)> = Vec::new();
        for document in store.values() {
            let serialized = serde_json::to_value(document)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
            if query.filter.matches(&serialized) {
                matched.push((document.clone(), serialized));
            }
        }

        matched.sort_by(|(_, a), (_, b)| {
            for key in &query.sort {
                let left = a.get(&key.field).unwrap_or(&Value::Null);
                let right = b.get(&key.field).unwrap_or(&Value::Null);
                let ordering = compare_values(left, right);
                let ordering = if key.desc { ordering.reverse() } else { ordering };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });

        let total = matched.len();
        let page = matched
            .into_iter()
            .skip(query.skip())
            .take(query.limit)
            .map(|(document, _)| document)
            .collect();

        Ok((page, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Doc {
        id: Uuid,
        name: String,
        age: i64,
        created_at: String,
    }

    fn doc(name: &str, age: i64, created_at: &str) -> Doc {
        Doc {
            id: Uuid::new_v4(),
            name: name.to_string(),
            age,
            created_at: created_at.to_string(),
        }
    }

    fn seeded() -> Collection<Doc> {
        let collection = Collection::new();
        for d in [
            doc("alice", 34, "2023-01-03T00:00:00Z"),
            doc("bob", 58, "2023-01-01T00:00:00Z"),
            doc("carol", 17, "2023-01-02T00:00:00Z"),
        ] {
            collection.put(d.id, d).unwrap();
        }
        collection
    }

    fn query(raw: &[(&str, &str)]) -> ListQuery {
        let pairs: Vec<(String, String)> = raw
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ListQuery::from_pairs(&pairs).unwrap()
    }

    #[test]
    fn test_default_collection_is_empty() {
        let collection: Collection<Doc> = Collection::default();
        assert!(collection.is_empty().unwrap());
    }

    #[test]
    fn test_put_get_remove() {
        let collection = Collection::new();
        let d = doc("alice", 34, "2023-01-01T00:00:00Z");
        let id = d.id;

        collection.put(id, d.clone()).unwrap();
        assert_eq!(collection.get(&id).unwrap(), Some(d.clone()));

        assert_eq!(collection.remove(&id).unwrap(), Some(d));
        assert_eq!(collection.get(&id).unwrap(), None);
    }

    #[test]
    fn test_find_default_sorts_newest_first() {
        let collection = seeded();
        let (docs, total) = collection.find(&query(&[])).unwrap();
        assert_eq!(total, 3);
        let names: Vec<&str> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["alice", "carol", "bob"]);
    }

    #[test]
    fn test_find_with_filter() {
        let collection = seeded();
        let (docs, total) = collection.find(&query(&[("age[gte]", "18")])).unwrap();
        assert_eq!(total, 2);
        assert!(docs.iter().all(|d| d.age >= 18));
    }

    #[test]
    fn test_find_pagination_window() {
        let collection = seeded();
        let (docs, total) = collection
            .find(&query(&[("page", "2"), ("limit", "2"), ("sort", "name")]))
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "carol");
    }

    #[test]
    fn test_find_ascending_sort() {
        let collection = seeded();
        let (docs, _) = collection.find(&query(&[("sort", "age")])).unwrap();
        let ages: Vec<i64> = docs.iter().map(|d| d.age).collect();
        assert_eq!(ages, vec![17, 34, 58]);
    }
}
