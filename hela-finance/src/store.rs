//! Record storage keyed by owning user and record id.
//!
//! `JsonFileStore` keeps one pretty-printed JSON array per user per collection:
//!   <data_dir>/<user>/transactions.json
//!   <data_dir>/<user>/budgets.json
//!   ...

use std::collections::HashMap;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use hela_core::{Budget, IncomeStream, SavingsGoal, TransactionRecord, ValidationError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no {collection} record with id {id}")]
    NotFound { collection: &'static str, id: String },

    #[error("{collection} record {id} already exists")]
    Duplicate { collection: &'static str, id: String },

    #[error("invalid user id: {0:?}")]
    InvalidUser(String),

    #[error("invalid record: {0}")]
    Invalid(#[from] ValidationError),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A record type the stores know how to file
pub trait StoredRecord: Clone + Serialize + DeserializeOwned {
    /// Collection name, also the JSON file stem
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

impl StoredRecord for TransactionRecord {
    const COLLECTION: &'static str = "transactions";

    fn id(&self) -> &str {
        &self.id
    }
}

impl StoredRecord for Budget {
    const COLLECTION: &'static str = "budgets";

    fn id(&self) -> &str {
        &self.id
    }
}

impl StoredRecord for SavingsGoal {
    const COLLECTION: &'static str = "goals";

    fn id(&self) -> &str {
        &self.id
    }
}

impl StoredRecord for IncomeStream {
    const COLLECTION: &'static str = "income";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Create/read/update/delete for one record type
pub trait RecordStore<T: StoredRecord> {
    fn create(&mut self, user: &str, record: T) -> Result<T, StoreError>;
    fn get(&self, user: &str, id: &str) -> Result<T, StoreError>;
    fn list(&self, user: &str) -> Result<Vec<T>, StoreError>;
    fn update(&mut self, user: &str, record: T) -> Result<T, StoreError>;
    fn delete(&mut self, user: &str, id: &str) -> Result<(), StoreError>;
}

/// Fresh random record id
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Short prefix of an id for display; ids are matched by prefix on the CLI
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// User ids become directory names, so only `[A-Za-z0-9_-]` is accepted.
pub fn validate_user(user: &str) -> Result<(), StoreError> {
    let ok = !user.is_empty()
        && user
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidUser(user.to_string()))
    }
}

fn insert<T: StoredRecord>(records: &mut Vec<T>, record: T) -> Result<T, StoreError> {
    if records.iter().any(|r| r.id() == record.id()) {
        return Err(StoreError::Duplicate {
            collection: T::COLLECTION,
            id: record.id().to_string(),
        });
    }
    records.push(record.clone());
    Ok(record)
}

fn replace<T: StoredRecord>(records: &mut [T], record: T) -> Result<T, StoreError> {
    let slot = records
        .iter_mut()
        .find(|r| r.id() == record.id())
        .ok_or_else(|| StoreError::NotFound {
            collection: T::COLLECTION,
            id: record.id().to_string(),
        })?;
    *slot = record.clone();
    Ok(record)
}

fn remove<T: StoredRecord>(records: &mut Vec<T>, id: &str) -> Result<(), StoreError> {
    let before = records.len();
    records.retain(|r| r.id() != id);
    if records.len() == before {
        return Err(StoreError::NotFound {
            collection: T::COLLECTION,
            id: id.to_string(),
        });
    }
    Ok(())
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}

/// Volatile store, used by tests and dry runs
#[derive(Debug, Clone)]
pub struct MemoryStore<T> {
    users: HashMap<String, Vec<T>>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self {
            users: HashMap::new(),
        }
    }
}

impl<T: StoredRecord> MemoryStore<T> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: StoredRecord> RecordStore<T> for MemoryStore<T> {
    fn create(&mut self, user: &str, record: T) -> Result<T, StoreError> {
        validate_user(user)?;
        insert(self.users.entry(user.to_string()).or_default(), record)
    }

    fn get(&self, user: &str, id: &str) -> Result<T, StoreError> {
        validate_user(user)?;
        self.users
            .get(user)
            .and_then(|records| records.iter().find(|r| r.id() == id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                collection: T::COLLECTION,
                id: id.to_string(),
            })
    }

    fn list(&self, user: &str) -> Result<Vec<T>, StoreError> {
        validate_user(user)?;
        Ok(self.users.get(user).cloned().unwrap_or_default())
    }

    fn update(&mut self, user: &str, record: T) -> Result<T, StoreError> {
        validate_user(user)?;
        replace(self.users.entry(user.to_string()).or_default(), record)
    }

    fn delete(&mut self, user: &str, id: &str) -> Result<(), StoreError> {
        validate_user(user)?;
        remove::<T>(self.users.entry(user.to_string()).or_default(), id)
    }
}

/// File-backed store under a data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore<T> {
    root: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: StoredRecord> JsonFileStore<T> {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            _marker: PhantomData,
        }
    }

    fn path_for(&self, user: &str) -> Result<PathBuf, StoreError> {
        validate_user(user)?;
        Ok(self.root.join(user).join(format!("{}.json", T::COLLECTION)))
    }

    fn load(&self, user: &str) -> Result<Vec<T>, StoreError> {
        let path = self.path_for(user)?;
        if !path.exists() {
            return Ok(Vec::new());
        }
        let s = fs::read_to_string(&path).map_err(io_err(&path))?;
        if s.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&s).map_err(|source| StoreError::Json { path, source })
    }

    /// Written to a sibling temp file, then renamed over the target
    fn save(&self, user: &str, records: &[T]) -> Result<(), StoreError> {
        let path = self.path_for(user)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(io_err(dir))?;
        }
        let json = serde_json::to_string_pretty(records).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_err(&tmp))?;
        fs::rename(&tmp, &path).map_err(io_err(&path))?;

        debug!(collection = T::COLLECTION, user, count = records.len(), "saved");
        Ok(())
    }
}

impl<T: StoredRecord> RecordStore<T> for JsonFileStore<T> {
    fn create(&mut self, user: &str, record: T) -> Result<T, StoreError> {
        let mut records = self.load(user)?;
        let created = insert(&mut records, record)?;
        self.save(user, &records)?;
        Ok(created)
    }

    fn get(&self, user: &str, id: &str) -> Result<T, StoreError> {
        self.load(user)?
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| StoreError::NotFound {
                collection: T::COLLECTION,
                id: id.to_string(),
            })
    }

    fn list(&self, user: &str) -> Result<Vec<T>, StoreError> {
        self.load(user)
    }

    fn update(&mut self, user: &str, record: T) -> Result<T, StoreError> {
        let mut records = self.load(user)?;
        let updated = replace(&mut records, record)?;
        self.save(user, &records)?;
        Ok(updated)
    }

    fn delete(&mut self, user: &str, id: &str) -> Result<(), StoreError> {
        let mut records = self.load(user)?;
        remove::<T>(&mut records, id)?;
        self.save(user, &records)
    }
}

/// Resolve a full id from a unique prefix, as typed on the command line
pub fn resolve_id<T: StoredRecord>(records: &[T], prefix: &str) -> Result<String, StoreError> {
    let mut matches = records.iter().filter(|r| r.id().starts_with(prefix));
    match (matches.next(), matches.next()) {
        (Some(r), None) if !prefix.is_empty() => Ok(r.id().to_string()),
        _ => Err(StoreError::NotFound {
            collection: T::COLLECTION,
            id: prefix.to_string(),
        }),
    }
}
