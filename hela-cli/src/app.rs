//! Per-invocation context: config, the logged-in user and their stores.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use hela_core::TransactionRecord;
use hela_finance::{JsonFileStore, RecordStore, Session, StoredRecord, resolve_id};
use hela_ingest::MessageParser;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::{Config, load_config};
use crate::fmt;

pub struct App {
    pub cfg: Config,
    data_dir: std::path::PathBuf,
}

impl App {
    pub fn load() -> Result<Self> {
        let cfg = load_config()?;
        let data_dir = cfg.data_dir()?;
        debug!(user = %cfg.user.id, data_dir = %data_dir.display(), "loaded config");
        Ok(Self { cfg, data_dir })
    }

    pub fn user(&self) -> &str {
        &self.cfg.user.id
    }

    pub fn store<T: StoredRecord>(&self) -> JsonFileStore<T> {
        JsonFileStore::new(&self.data_dir)
    }

    pub fn session(&self) -> Session<JsonFileStore<TransactionRecord>> {
        Session::new(self.user(), self.store())
    }

    pub fn parser(&self) -> Result<MessageParser> {
        MessageParser::new(self.cfg.parser.clone()).context("building message parser from [parser] config")
    }

    pub fn today(&self) -> Result<NaiveDate> {
        hela_core::time::today_in(&self.cfg.display.timezone)
    }

    pub fn money(&self, amount: Decimal) -> String {
        fmt::money(amount, &self.cfg.display.currency)
    }

    /// Load every record of one kind and resolve a CLI id prefix against them
    pub fn find<T: StoredRecord>(&self, id_prefix: &str) -> Result<(JsonFileStore<T>, T)> {
        let store = self.store::<T>();
        let records = store.list(self.user())?;
        let id = resolve_id(&records, id_prefix)
            .with_context(|| format!("no unique {} id starting with '{id_prefix}'", T::COLLECTION))?;
        let record = store.get(self.user(), &id)?;
        Ok((store, record))
    }
}
