//! Per-user transaction cache over a record store.
//!
//! Reads go through the cache (loaded on first use). Writes are applied to
//! the cache first and rolled back if the store rejects them.

use hela_core::{NewTransaction, TransactionPatch, TransactionRecord};
use tracing::{debug, warn};

use crate::store::{RecordStore, StoreError, StoredRecord, new_id};

pub struct Session<S> {
    user: String,
    store: S,
    cache: Option<Vec<TransactionRecord>>,
}

impl<S: RecordStore<TransactionRecord>> Session<S> {
    pub fn new(user: impl Into<String>, store: S) -> Self {
        Self {
            user: user.into(),
            store,
            cache: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn load_if_needed(&mut self) -> Result<(), StoreError> {
        if self.cache.is_none() {
            let records = self.store.list(&self.user)?;
            debug!(user = %self.user, count = records.len(), "loaded transactions");
            self.cache = Some(records);
        }
        Ok(())
    }

    /// Drop the cache and reload from the store
    pub fn refresh(&mut self) -> Result<(), StoreError> {
        self.cache = None;
        self.load_if_needed()
    }

    /// Cached transactions, newest first
    pub fn transactions(&mut self) -> Result<Vec<TransactionRecord>, StoreError> {
        self.load_if_needed()?;
        let mut out = self.cache.clone().unwrap_or_default();
        out.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }

    pub fn get(&mut self, id: &str) -> Result<TransactionRecord, StoreError> {
        self.load_if_needed()?;
        self.cache
            .iter()
            .flatten()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    pub fn add(&mut self, new: NewTransaction) -> Result<TransactionRecord, StoreError> {
        let record = TransactionRecord::from_new(new_id(), new)?;
        self.load_if_needed()?;

        let cache = self.cache.get_or_insert_with(Vec::new);
        cache.push(record.clone());

        match self.store.create(&self.user, record.clone()) {
            Ok(saved) => {
                if let Some(slot) = cache.iter_mut().find(|r| r.id == saved.id) {
                    *slot = saved.clone();
                }
                debug!(id = %saved.id, amount = %saved.amount, "added transaction");
                Ok(saved)
            }
            Err(e) => {
                cache.retain(|r| r.id != record.id);
                warn!(error = %e, "store rejected new transaction; rolled back");
                Err(e)
            }
        }
    }

    pub fn update(&mut self, id: &str, patch: &TransactionPatch) -> Result<TransactionRecord, StoreError> {
        self.load_if_needed()?;
        let cache = self.cache.get_or_insert_with(Vec::new);
        let idx = cache
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| not_found(id))?;

        let previous = cache[idx].clone();
        let mut updated = previous.clone();
        patch.apply(&mut updated)?;
        cache[idx] = updated.clone();

        match self.store.update(&self.user, updated) {
            Ok(saved) => {
                cache[idx] = saved.clone();
                Ok(saved)
            }
            Err(e) => {
                cache[idx] = previous;
                warn!(id, error = %e, "store rejected update; rolled back");
                Err(e)
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Result<TransactionRecord, StoreError> {
        self.load_if_needed()?;
        let cache = self.cache.get_or_insert_with(Vec::new);
        let idx = cache
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| not_found(id))?;

        let removed = cache.remove(idx);
        match self.store.delete(&self.user, id) {
            Ok(()) => Ok(removed),
            Err(e) => {
                cache.insert(idx, removed);
                warn!(id, error = %e, "store rejected delete; rolled back");
                Err(e)
            }
        }
    }
}

fn not_found(id: &str) -> StoreError {
    StoreError::NotFound {
        collection: TransactionRecord::COLLECTION,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use hela_core::{Category, PaymentChannel, ValidationError};
    use rust_decimal::Decimal;

    /// Delegates to a memory store until told to fail
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore<TransactionRecord>,
        fail_writes: bool,
        list_calls: std::cell::Cell<usize>,
    }

    impl FlakyStore {
        fn check(&self) -> Result<(), StoreError> {
            if self.fail_writes {
                return Err(StoreError::Io {
                    path: "offline".into(),
                    source: std::io::Error::other("backend unavailable"),
                });
            }
            Ok(())
        }
    }

    impl RecordStore<TransactionRecord> for FlakyStore {
        fn create(&mut self, user: &str, record: TransactionRecord) -> Result<TransactionRecord, StoreError> {
            self.check()?;
            self.inner.create(user, record)
        }
        fn get(&self, user: &str, id: &str) -> Result<TransactionRecord, StoreError> {
            self.inner.get(user, id)
        }
        fn list(&self, user: &str) -> Result<Vec<TransactionRecord>, StoreError> {
            self.list_calls.set(self.list_calls.get() + 1);
            self.inner.list(user)
        }
        fn update(&mut self, user: &str, record: TransactionRecord) -> Result<TransactionRecord, StoreError> {
            self.check()?;
            self.inner.update(user, record)
        }
        fn delete(&mut self, user: &str, id: &str) -> Result<(), StoreError> {
            self.check()?;
            self.inner.delete(user, id)
        }
    }

    fn new_tx(day: u32, amount: i64, desc: &str) -> NewTransaction {
        NewTransaction {
            amount: Decimal::new(amount, 0),
            category: Category::Food,
            description: desc.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            channel: PaymentChannel::MobileMoney,
        }
    }

    #[test]
    fn test_add_and_list_newest_first() {
        let mut session = Session::new("amina", MemoryStore::new());
        session.add(new_tx(1, -200, "tea")).unwrap();
        session.add(new_tx(5, -900, "groceries")).unwrap();
        session.add(new_tx(3, 5000, "refund")).unwrap();

        let txns = session.transactions().unwrap();
        let days: Vec<_> = txns.iter().map(|t| t.date.format("%d").to_string()).collect();
        assert_eq!(days, vec!["05", "03", "01"]);
        assert_eq!(session.store().list("amina").unwrap().len(), 3);
    }

    #[test]
    fn test_cache_is_read_through() {
        let mut session = Session::new("amina", FlakyStore::default());
        session.transactions().unwrap();
        session.transactions().unwrap();
        session.add(new_tx(1, -200, "tea")).unwrap();
        assert_eq!(session.store().list_calls.get(), 1);

        session.refresh().unwrap();
        assert_eq!(session.store().list_calls.get(), 2);
    }

    #[test]
    fn test_failed_add_rolls_back() {
        let mut session = Session::new("amina", FlakyStore::default());
        session.add(new_tx(1, -200, "tea")).unwrap();

        session.store.fail_writes = true;
        assert!(session.add(new_tx(2, -300, "lunch")).is_err());
        assert_eq!(session.transactions().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_update_and_remove_roll_back() {
        let mut session = Session::new("amina", FlakyStore::default());
        let tx = session.add(new_tx(1, -200, "tea")).unwrap();

        session.store.fail_writes = true;
        let patch = TransactionPatch {
            amount: Some(Decimal::new(-250, 0)),
            ..Default::default()
        };
        assert!(session.update(&tx.id, &patch).is_err());
        assert_eq!(session.get(&tx.id).unwrap().amount, Decimal::new(-200, 0));

        assert!(session.remove(&tx.id).is_err());
        assert_eq!(session.transactions().unwrap().len(), 1);

        session.store.fail_writes = false;
        let updated = session.update(&tx.id, &patch).unwrap();
        assert_eq!(updated.amount, Decimal::new(-250, 0));
        session.remove(&tx.id).unwrap();
        assert!(session.transactions().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_input_never_reaches_store() {
        let mut session = Session::new("amina", MemoryStore::new());
        let err = session.add(new_tx(1, 0, "nothing")).unwrap_err();
        assert!(matches!(err, StoreError::Invalid(ValidationError::ZeroAmount)));
        let mut huge = new_tx(2, 1, "lottery");
        huge.amount = Decimal::MAX;
        let err = session.add(huge).unwrap_err();
        assert!(matches!(err, StoreError::Invalid(ValidationError::AmountTooLarge { .. })));
        assert!(session.store().list("amina").unwrap().is_empty());
        assert!(matches!(session.remove("missing"), Err(StoreError::NotFound { .. })));
    }
}
