use std::{
    collections::{BTreeMap, HashSet},
    error::Error as StdError,
    sync::{Mutex, MutexGuard, PoisonError},
};

/// The two store operations a publish run needs.
///
/// Implemented by the Consul HTTP client and by [`MemoryStore`].
#[allow(async_fn_in_trait)]
pub trait KvStore {
    type Error: StdError + Send + Sync + 'static;

    /// Remove every key that starts with `prefix`.
    ///
    /// Callers pass a prefix ending in `/` to limit the delete to one subtree.
    async fn delete_tree(&self, prefix: &str) -> Result<(), Self::Error>;

    /// Write a single key.
    async fn put(&self, key: &str, value: &str) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryStoreError {
    #[error("Rejected write to {0}")]
    RejectedWrite(String),
    #[error("Rejected delete of {0}")]
    RejectedDelete(String),
}

#[derive(Debug, Default)]
struct Inner {
    data: BTreeMap<String, String>,
    log: Vec<Operation>,
}

/// A store operation as recorded by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    DeleteTree(String),
    Put(String, String),
}

/// An in-process key-value store.
///
/// Used for dry runs and as a test double. Writes to keys registered with
/// [`MemoryStore::reject_key`] fail, as does every delete once
/// [`MemoryStore::reject_deletes`] was called.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    rejected_keys: HashSet<String>,
    reject_deletes: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing data.
    #[must_use]
    pub fn with_data<I, K, V>(data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let data = data
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        Self {
            inner: Mutex::new(Inner {
                data,
                log: Vec::new(),
            }),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn reject_key(mut self, key: impl Into<String>) -> Self {
        self.rejected_keys.insert(key.into());
        self
    }

    #[must_use]
    pub fn reject_deletes(mut self) -> Self {
        self.reject_deletes = true;
        self
    }

    /// A snapshot of the current contents.
    #[must_use]
    pub fn data(&self) -> BTreeMap<String, String> {
        self.lock().data.clone()
    }

    /// Every operation that was attempted, including rejected ones, in order.
    #[must_use]
    pub fn operations(&self) -> Vec<Operation> {
        self.lock().log.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Whether `key` is `prefix` itself or lies below it.
///
/// Only whole path segments match, so `a/b` does not cover `a/bc`.
fn in_subtree(key: &str, prefix: &str) -> bool {
    if prefix.is_empty() || prefix.ends_with('/') {
        return key.starts_with(prefix);
    }

    key.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

impl KvStore for MemoryStore {
    type Error = MemoryStoreError;

    async fn delete_tree(&self, prefix: &str) -> Result<(), Self::Error> {
        let mut inner = self.lock();
        inner.log.push(Operation::DeleteTree(prefix.to_string()));

        if self.reject_deletes {
            return Err(MemoryStoreError::RejectedDelete(prefix.to_string()));
        }

        inner.data.retain(|key, _| !in_subtree(key, prefix));
        Ok(())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let mut inner = self.lock();
        inner
            .log
            .push(Operation::Put(key.to_string(), value.to_string()));

        if self.rejected_keys.contains(key) {
            return Err(MemoryStoreError::RejectedWrite(key.to_string()));
        }

        inner.data.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
