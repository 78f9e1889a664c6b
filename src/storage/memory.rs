use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use super::traits::{HashStore, StorageError};

/// A collection stored under one name, mirroring Redis value types.
#[derive(Debug, Clone)]
enum Collection {
    Hash(HashMap<String, String>),
    SortedSet(HashMap<String, i64>),
}

/// In-process [`HashStore`] used for tests, demos and single-node setups.
///
/// Like Redis, a name holds exactly one collection type; using a hash
/// command against a sorted set (or vice versa) is a backend error.
pub struct InMemoryHashStore {
    data: DashMap<String, Collection>,
    unavailable: AtomicBool,
}

fn wrong_type(name: &str) -> StorageError {
    StorageError::Backend(format!(
        "WRONGTYPE Operation against a key holding the wrong kind of value: {}",
        name
    ))
}

impl InMemoryHashStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Number of top-level collections
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Simulate an outage: while set, every operation fails.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Release);
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::Acquire) {
            Err(StorageError::Backend("connection refused (store unavailable)".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Default for InMemoryHashStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HashStore for InMemoryHashStore {
    async fn hget(&self, hash: &str, field: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        match self.data.get(hash).as_deref() {
            None => Ok(None),
            Some(Collection::Hash(fields)) => Ok(fields.get(field).cloned()),
            Some(_) => Err(wrong_type(hash)),
        }
    }

    async fn hset(&self, hash: &str, field: &str, value: &str) -> Result<(), StorageError> {
        self.check_available()?;
        match self.data.entry(hash.to_string()) {
            Entry::Vacant(slot) => {
                let mut fields = HashMap::new();
                fields.insert(field.to_string(), value.to_string());
                slot.insert(Collection::Hash(fields));
                Ok(())
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Collection::Hash(fields) => {
                    fields.insert(field.to_string(), value.to_string());
                    Ok(())
                }
                _ => Err(wrong_type(hash)),
            },
        }
    }

    async fn hdel(&self, hash: &str, field: &str) -> Result<bool, StorageError> {
        self.check_available()?;
        let removed = match self.data.get_mut(hash).as_deref_mut() {
            None => return Ok(false),
            Some(Collection::Hash(fields)) => fields.remove(field).is_some(),
            Some(_) => return Err(wrong_type(hash)),
        };
        // Redis drops empty collections
        self.data.remove_if(hash, |_, c| matches!(c, Collection::Hash(f) if f.is_empty()));
        Ok(removed)
    }

    async fn hexists(&self, hash: &str, field: &str) -> Result<bool, StorageError> {
        self.check_available()?;
        match self.data.get(hash).as_deref() {
            None => Ok(false),
            Some(Collection::Hash(fields)) => Ok(fields.contains_key(field)),
            Some(_) => Err(wrong_type(hash)),
        }
    }

    async fn hkeys(&self, hash: &str) -> Result<Vec<String>, StorageError> {
        self.check_available()?;
        match self.data.get(hash).as_deref() {
            None => Ok(Vec::new()),
            Some(Collection::Hash(fields)) => Ok(fields.keys().cloned().collect()),
            Some(_) => Err(wrong_type(hash)),
        }
    }

    async fn hlen(&self, hash: &str) -> Result<u64, StorageError> {
        self.check_available()?;
        match self.data.get(hash).as_deref() {
            None => Ok(0),
            Some(Collection::Hash(fields)) => Ok(fields.len() as u64),
            Some(_) => Err(wrong_type(hash)),
        }
    }

    async fn zadd(&self, set: &str, member: &str, score: i64) -> Result<(), StorageError> {
        self.check_available()?;
        match self.data.entry(set.to_string()) {
            Entry::Vacant(slot) => {
                let mut members = HashMap::new();
                members.insert(member.to_string(), score);
                slot.insert(Collection::SortedSet(members));
                Ok(())
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Collection::SortedSet(members) => {
                    members.insert(member.to_string(), score);
                    Ok(())
                }
                _ => Err(wrong_type(set)),
            },
        }
    }

    async fn zrem(&self, set: &str, member: &str) -> Result<bool, StorageError> {
        self.check_available()?;
        let removed = match self.data.get_mut(set).as_deref_mut() {
            None => return Ok(false),
            Some(Collection::SortedSet(members)) => members.remove(member).is_some(),
            Some(_) => return Err(wrong_type(set)),
        };
        self.data.remove_if(set, |_, c| matches!(c, Collection::SortedSet(m) if m.is_empty()));
        Ok(removed)
    }

    async fn zcard(&self, set: &str) -> Result<u64, StorageError> {
        self.check_available()?;
        match self.data.get(set).as_deref() {
            None => Ok(0),
            Some(Collection::SortedSet(members)) => Ok(members.len() as u64),
            Some(_) => Err(wrong_type(set)),
        }
    }

    async fn zfirst(&self, set: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        match self.data.get(set).as_deref() {
            None => Ok(None),
            Some(Collection::SortedSet(members)) => Ok(members
                .iter()
                .min_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)))
                .map(|(member, _)| member.clone())),
            Some(_) => Err(wrong_type(set)),
        }
    }

    async fn del(&self, name: &str) -> Result<(), StorageError> {
        self.check_available()?;
        self.data.remove(name);
        Ok(())
    }

    async fn flush_all(&self) -> Result<(), StorageError> {
        self.check_available()?;
        self.data.clear();
        Ok(())
    }
}
