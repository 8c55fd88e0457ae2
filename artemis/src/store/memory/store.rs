use crate::common::{async_task, Document, Value};
use crate::errors::{ArtemisError, ArtemisResult, ErrorKind};
use crate::query::{compare_documents, Condition, DeleteQuery, LiteralQuery, Params, Query};
use crate::store::live::LiveListeners;
use crate::store::memory::MemoryStoreConfig;
use crate::store::{
    AsyncStore, LiveCallback, LiveQuery, Record, ResultCallback, Store, Subscription,
};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A [Store] and [AsyncStore] that keeps records in memory.
///
/// # Characteristics
/// - Records keep insertion order; saving an existing key replaces it in place
/// - Records saved without a key get a random UUID key
/// - Expired records are invisible to reads and purged on the next write
/// - Literal queries are not supported, live or not
/// - Asynchronous operations run on a spawned thread, where the callback is
///   invoked
/// - Live queries see every save and update, from either interface, and are
///   called on the writing thread; expiry and deletes are not reported
///
/// Cloning is cheap and clones share the same data.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryStoreInner>,
}

impl MemoryStore {
    pub fn new(config: MemoryStoreConfig) -> MemoryStore {
        MemoryStore {
            inner: Arc::new(MemoryStoreInner::new(config)),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Relaxed)
    }

    /// Number of live records in `collection`.
    pub fn count(&self, collection: &str) -> usize {
        self.inner
            .collections
            .get(collection)
            .map(|entries| entries.read().iter().filter(|e| e.is_live()).count())
            .unwrap_or(0)
    }

    /// Number of live subscriptions.
    pub fn live_queries(&self) -> usize {
        self.inner.live.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new(MemoryStoreConfig::default())
    }
}

impl Store for MemoryStore {
    fn find(&self, query: &Query) -> ArtemisResult<Vec<Record>> {
        self.inner.find(query)
    }

    fn delete(&self, query: &DeleteQuery) -> ArtemisResult<()> {
        self.inner.delete(query)
    }

    fn save(&self, record: Record, ttl: Option<Duration>) -> ArtemisResult<Record> {
        self.inner.save(record, ttl)
    }

    fn update(&self, record: Record) -> ArtemisResult<Record> {
        self.inner.update(record)
    }

    fn execute(&self, query: &LiteralQuery, _params: &Params) -> ArtemisResult<Vec<Record>> {
        self.inner.check_opened()?;
        log::error!("Memory store cannot execute {}", query);
        Err(ArtemisError::new(
            &format!("Memory store does not support {} queries", query.language()),
            ErrorKind::UnsupportedQuery,
        ))
    }

    fn close(&self) -> ArtemisResult<()> {
        self.inner.close()
    }
}

impl AsyncStore for MemoryStore {
    fn find(&self, query: Query, callback: ResultCallback<Vec<Record>>) {
        let store = self.clone();
        async_task(move || callback(Store::find(&store, &query)));
    }

    fn delete(&self, query: DeleteQuery, callback: ResultCallback<()>) {
        let store = self.clone();
        async_task(move || callback(Store::delete(&store, &query)));
    }

    fn save(&self, record: Record, ttl: Option<Duration>, callback: ResultCallback<Record>) {
        let store = self.clone();
        async_task(move || callback(Store::save(&store, record, ttl)));
    }

    fn save_all(
        &self,
        records: Vec<Record>,
        ttl: Option<Duration>,
        callback: ResultCallback<Vec<Record>>,
    ) {
        let store = self.clone();
        async_task(move || callback(Store::save_all(&store, records, ttl)));
    }

    fn update(&self, record: Record, callback: ResultCallback<Record>) {
        let store = self.clone();
        async_task(move || callback(Store::update(&store, record)));
    }

    fn update_all(&self, records: Vec<Record>, callback: ResultCallback<Vec<Record>>) {
        let store = self.clone();
        async_task(move || callback(Store::update_all(&store, records)));
    }

    fn execute(&self, query: LiteralQuery, params: Params, callback: ResultCallback<Vec<Record>>) {
        let store = self.clone();
        async_task(move || callback(Store::execute(&store, &query, &params)));
    }

    fn live(&self, query: LiveQuery, callback: LiveCallback) -> ArtemisResult<Subscription> {
        self.inner.check_opened()?;
        match query {
            LiveQuery::Query(query) => Ok(self.inner.live.register(&query, callback)),
            LiveQuery::Literal(query, _) => {
                log::error!("Memory store cannot subscribe to {}", query);
                Err(ArtemisError::new(
                    &format!("Memory store does not support live {} queries", query.language()),
                    ErrorKind::UnsupportedQuery,
                ))
            }
        }
    }

    fn unsubscribe(&self, subscription: &Subscription) -> ArtemisResult<()> {
        if !self.inner.live.deregister(subscription) {
            log::debug!("Live query {} is not registered", subscription.id());
        }
        Ok(())
    }

    fn close(&self) -> ArtemisResult<()> {
        self.inner.close()
    }
}

struct Entry {
    key: Value,
    document: Document,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self) -> bool {
        self.expires_at.map_or(true, |at| Instant::now() < at)
    }

    fn to_record(&self, collection: &str) -> Record {
        Record::new(collection, Some(self.key.clone()), self.document.clone())
    }
}

struct MemoryStoreInner {
    closed: AtomicBool,
    config: MemoryStoreConfig,
    collections: DashMap<String, RwLock<Vec<Entry>>>,
    live: LiveListeners,
}

impl MemoryStoreInner {
    fn new(config: MemoryStoreConfig) -> MemoryStoreInner {
        MemoryStoreInner {
            closed: AtomicBool::from(false),
            config,
            collections: DashMap::new(),
            live: LiveListeners::default(),
        }
    }

    fn check_opened(&self) -> ArtemisResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            log::error!("Memory store is already closed");
            return Err(ArtemisError::new(
                "Memory store is already closed",
                ErrorKind::StoreAlreadyClosed,
            ));
        }
        Ok(())
    }

    fn find(&self, query: &Query) -> ArtemisResult<Vec<Record>> {
        self.check_opened()?;
        let Some(entries) = self.collections.get(query.collection()) else {
            return Ok(Vec::new());
        };

        let mut selected = Vec::new();
        for entry in entries.read().iter().filter(|e| e.is_live()) {
            if matches(query.condition(), &entry.document)? {
                selected.push(entry.to_record(query.collection()));
            }
        }

        if !query.sorts().is_empty() {
            selected.sort_by(|a, b| compare_documents(query.sorts(), a.document(), b.document()));
        }

        let limit = query.limit_count().unwrap_or(usize::MAX);
        Ok(selected
            .into_iter()
            .skip(query.skip_count())
            .take(limit)
            .collect())
    }

    fn delete(&self, query: &DeleteQuery) -> ArtemisResult<()> {
        self.check_opened()?;
        let Some(entries) = self.collections.get(query.collection()) else {
            return Ok(());
        };

        let mut entries = entries.write();
        let mut keep = Vec::with_capacity(entries.len());
        for entry in entries.iter() {
            keep.push(entry.is_live() && !matches(query.condition(), &entry.document)?);
        }
        let mut keep = keep.into_iter();
        entries.retain(|_| keep.next().unwrap_or(true));
        Ok(())
    }

    fn save(&self, record: Record, ttl: Option<Duration>) -> ArtemisResult<Record> {
        self.check_opened()?;
        let record = if record.key().is_some() {
            record
        } else {
            record.with_key(Value::from(uuid::Uuid::new_v4().to_string()))
        };
        let expires_at = ttl
            .or(self.config.default_ttl())
            .map(|ttl| Instant::now() + ttl);
        self.upsert(&record, expires_at);
        self.live.publish(&record);
        Ok(record)
    }

    fn update(&self, record: Record) -> ArtemisResult<Record> {
        self.check_opened()?;
        if record.key().is_none() {
            log::error!("Cannot update a record without key in {}", record.collection());
            return Err(ArtemisError::new(
                &format!("Cannot update a record without key in {}", record.collection()),
                ErrorKind::InvalidOperation,
            ));
        }

        let expires_at = self.config.default_ttl().map(|ttl| Instant::now() + ttl);
        self.upsert(&record, expires_at);
        self.live.publish(&record);
        Ok(record)
    }

    fn upsert(&self, record: &Record, expires_at: Option<Instant>) {
        let Some(key) = record.key() else {
            return;
        };
        let entries = self
            .collections
            .entry(record.collection().to_string())
            .or_insert_with(|| RwLock::new(Vec::new()));

        let mut entries = entries.write();
        entries.retain(Entry::is_live);
        let entry = Entry {
            key: key.clone(),
            document: record.document().clone(),
            expires_at,
        };
        match entries.iter_mut().find(|e| &e.key == key) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
    }

    fn close(&self) -> ArtemisResult<()> {
        if self.closed.swap(true, Ordering::Relaxed) {
            return Ok(());
        }
        self.collections.clear();
        self.live.clear();
        log::debug!("Memory store closed");
        Ok(())
    }
}

fn matches(condition: Option<&Condition>, document: &Document) -> ArtemisResult<bool> {
    match condition {
        Some(condition) => condition.matches(document),
        None => Ok(true),
    }
}
