use crate::common::{Convertible, Document, Value};
use crate::doc;
use crate::entity::{Entity, EntityMetadata};
use crate::errors::{ArtemisError, ArtemisResult};
use crate::query::{DeleteQuery, LiteralQuery, Params, Query};
use crate::store::{
    AsyncStore, LiveCallback, LiveQuery, Record, ResultCallback, Store, Subscription,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Person {
    pub(crate) name: String,
    pub(crate) age: i64,
}

pub(crate) fn person(name: &str, age: i64) -> Person {
    Person {
        name: name.to_string(),
        age,
    }
}

impl Convertible for Person {
    type Output = Person;

    fn to_value(&self) -> ArtemisResult<Value> {
        Ok(Value::Document(doc! { name: (self.name.clone()), age: (self.age) }))
    }

    fn from_value(value: &Value) -> ArtemisResult<Self::Output> {
        let document = Document::from_value(value)?;
        Ok(Person {
            name: String::from_value(&document.get("name"))?,
            age: i64::from_value(&document.get("age"))?,
        })
    }
}

impl Entity for Person {
    fn entity_metadata() -> EntityMetadata {
        EntityMetadata::new("Person").field("name").field("age").id("name")
    }
}

/// Store that answers every read with fixed rows, or fails every call.
///
/// Asynchronous calls complete on the caller's thread.
#[derive(Default)]
pub(crate) struct StubStore {
    rows: Vec<Record>,
    failure: Option<ArtemisError>,
    found: Mutex<Vec<Query>>,
    deleted: Mutex<Vec<DeleteQuery>>,
    saved: Mutex<Vec<Record>>,
    executed: Mutex<Vec<(LiteralQuery, Params)>>,
    close_failure: Option<ArtemisError>,
    closes: AtomicUsize,
    live: Mutex<Vec<(LiveQuery, LiveCallback)>>,
    unsubscribed: Mutex<Vec<Subscription>>,
}

impl StubStore {
    pub(crate) fn with_rows(rows: Vec<Record>) -> Self {
        StubStore {
            rows,
            ..Default::default()
        }
    }

    pub(crate) fn failing(error: ArtemisError) -> Self {
        StubStore {
            failure: Some(error),
            ..Default::default()
        }
    }

    pub(crate) fn failing_close(error: ArtemisError) -> Self {
        StubStore {
            close_failure: Some(error),
            ..Default::default()
        }
    }

    pub(crate) fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub(crate) fn found(&self) -> Vec<Query> {
        self.found.lock().clone()
    }

    pub(crate) fn deleted(&self) -> Vec<DeleteQuery> {
        self.deleted.lock().clone()
    }

    pub(crate) fn saved(&self) -> Vec<Record> {
        self.saved.lock().clone()
    }

    pub(crate) fn executed(&self) -> Vec<(LiteralQuery, Params)> {
        self.executed.lock().clone()
    }

    pub(crate) fn live_queries(&self) -> Vec<LiveQuery> {
        self.live.lock().iter().map(|(query, _)| query.clone()).collect()
    }

    pub(crate) fn unsubscribed(&self) -> Vec<Subscription> {
        self.unsubscribed.lock().clone()
    }

    /// Hands `record` to every live callback, as a store would on a write.
    pub(crate) fn publish(&self, record: Record) {
        let callbacks: Vec<LiveCallback> =
            self.live.lock().iter().map(|(_, c)| c.clone()).collect();
        for callback in callbacks {
            callback(Ok(record.clone()));
        }
    }

    fn check(&self) -> ArtemisResult<()> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl Store for StubStore {
    fn find(&self, query: &Query) -> ArtemisResult<Vec<Record>> {
        self.found.lock().push(query.clone());
        self.check()?;
        Ok(self.rows.clone())
    }

    fn delete(&self, query: &DeleteQuery) -> ArtemisResult<()> {
        self.deleted.lock().push(query.clone());
        self.check()
    }

    fn save(&self, record: Record, _ttl: Option<Duration>) -> ArtemisResult<Record> {
        self.check()?;
        self.saved.lock().push(record.clone());
        Ok(record)
    }

    fn update(&self, record: Record) -> ArtemisResult<Record> {
        Store::save(self, record, None)
    }

    fn execute(&self, query: &LiteralQuery, params: &Params) -> ArtemisResult<Vec<Record>> {
        self.executed.lock().push((query.clone(), params.clone()));
        self.check()?;
        Ok(self.rows.clone())
    }

    fn close(&self) -> ArtemisResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        match &self.close_failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl AsyncStore for StubStore {
    fn find(&self, query: Query, callback: ResultCallback<Vec<Record>>) {
        callback(Store::find(self, &query))
    }

    fn delete(&self, query: DeleteQuery, callback: ResultCallback<()>) {
        callback(Store::delete(self, &query))
    }

    fn save(&self, record: Record, ttl: Option<Duration>, callback: ResultCallback<Record>) {
        callback(Store::save(self, record, ttl))
    }

    fn save_all(
        &self,
        records: Vec<Record>,
        ttl: Option<Duration>,
        callback: ResultCallback<Vec<Record>>,
    ) {
        callback(Store::save_all(self, records, ttl))
    }

    fn update(&self, record: Record, callback: ResultCallback<Record>) {
        callback(Store::update(self, record))
    }

    fn update_all(&self, records: Vec<Record>, callback: ResultCallback<Vec<Record>>) {
        callback(Store::update_all(self, records))
    }

    fn execute(&self, query: LiteralQuery, params: Params, callback: ResultCallback<Vec<Record>>) {
        callback(Store::execute(self, &query, &params))
    }

    fn live(&self, query: LiveQuery, callback: LiveCallback) -> ArtemisResult<Subscription> {
        self.check()?;
        self.live.lock().push((query, callback));
        Ok(Subscription::new())
    }

    fn unsubscribe(&self, subscription: &Subscription) -> ArtemisResult<()> {
        self.unsubscribed.lock().push(subscription.clone());
        Ok(())
    }

    fn close(&self) -> ArtemisResult<()> {
        Store::close(self)
    }
}
