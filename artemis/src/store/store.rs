use crate::errors::{ArtemisError, ArtemisResult, ErrorKind};
use crate::query::{DeleteQuery, LiteralQuery, Params, Query};
use crate::store::{LiveCallback, LiveQuery, Record, Subscription};
use std::time::Duration;

/// Callback receiving the outcome of an asynchronous store operation.
pub type ResultCallback<R> = Box<dyn FnOnce(ArtemisResult<R>) + Send + 'static>;

/// Synchronous client of a backing NoSQL store.
///
/// Defines the contract a driver binding fulfils so repositories can run on
/// it. Implementations are shared behind an `Arc` by every repository of a
/// registry and must be safe to call concurrently.
///
/// # Responsibilities
///
/// * **Querying**: run [Query] and [DeleteQuery] descriptors
/// * **Writing**: insert or replace records, optionally with a time to live
/// * **Native queries**: execute [LiteralQuery] text with bound [Params]
/// * **Lifecycle**: release driver resources on [Store::close]
///
/// Errors raised here reach repository callers unchanged.
pub trait Store: Send + Sync {
    /// Returns the records selected by `query`, in store order.
    fn find(&self, query: &Query) -> ArtemisResult<Vec<Record>>;

    /// Removes the records selected by `query`.
    fn delete(&self, query: &DeleteQuery) -> ArtemisResult<()>;

    /// Inserts or replaces `record`, expiring it after `ttl` when given.
    ///
    /// Returns the record as stored, with its key assigned.
    fn save(&self, record: Record, ttl: Option<Duration>) -> ArtemisResult<Record>;

    fn save_all(&self, records: Vec<Record>, ttl: Option<Duration>) -> ArtemisResult<Vec<Record>> {
        records.into_iter().map(|r| self.save(r, ttl)).collect()
    }

    /// Replaces the stored record with the same key.
    fn update(&self, record: Record) -> ArtemisResult<Record>;

    fn update_all(&self, records: Vec<Record>) -> ArtemisResult<Vec<Record>> {
        records.into_iter().map(|r| self.update(r)).collect()
    }

    /// Executes a store-native query.
    fn execute(&self, query: &LiteralQuery, params: &Params) -> ArtemisResult<Vec<Record>>;

    fn close(&self) -> ArtemisResult<()>;
}

/// Asynchronous client of a backing NoSQL store.
///
/// Every operation returns immediately; the outcome, including any failure,
/// is delivered to the callback, possibly on a thread owned by the store.
///
/// Stores able to push changes also serve live queries: the callback of
/// [AsyncStore::live] is invoked for every record written afterwards that
/// the query matches, until the subscription is cancelled.
pub trait AsyncStore: Send + Sync {
    fn find(&self, query: Query, callback: ResultCallback<Vec<Record>>);

    fn delete(&self, query: DeleteQuery, callback: ResultCallback<()>);

    fn save(&self, record: Record, ttl: Option<Duration>, callback: ResultCallback<Record>);

    fn save_all(
        &self,
        records: Vec<Record>,
        ttl: Option<Duration>,
        callback: ResultCallback<Vec<Record>>,
    );

    fn update(&self, record: Record, callback: ResultCallback<Record>);

    fn update_all(&self, records: Vec<Record>, callback: ResultCallback<Vec<Record>>);

    fn execute(&self, query: LiteralQuery, params: Params, callback: ResultCallback<Vec<Record>>);

    /// Subscribes `callback` to the records matching `query`.
    ///
    /// Fails with `UnsupportedQuery` unless the store implements live queries.
    fn live(&self, query: LiveQuery, _callback: LiveCallback) -> ArtemisResult<Subscription> {
        log::error!("Store does not support live queries, cannot run {:?}", query);
        Err(ArtemisError::new(
            "Store does not support live queries",
            ErrorKind::UnsupportedQuery,
        ))
    }

    /// Cancels a live subscription; unknown subscriptions are ignored.
    fn unsubscribe(&self, _subscription: &Subscription) -> ArtemisResult<()> {
        Ok(())
    }

    fn close(&self) -> ArtemisResult<()>;
}
