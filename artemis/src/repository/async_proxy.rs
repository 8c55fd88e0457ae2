use crate::common::Value;
use crate::config::{RepositoryConfig, UnknownMethodPolicy};
use crate::entity::{Entity, EntityConverter, EntityMetadata};
use crate::errors::{ArtemisError, ArtemisResult, ErrorKind};
use crate::query::{ConsistencyLevel, LiteralQuery, Params, Query, QueryParser};
use crate::repository::{Args, AsyncCrudRepository, MethodKind, MethodTable, RepositoryMethod};
use crate::store::{AsyncStore, LiveQuery, Record, Subscription};
use std::sync::Arc;
use std::time::Duration;

type EntitiesFn<T> = Box<dyn FnOnce(ArtemisResult<Vec<T>>) + Send + 'static>;
type CompletionFn = Box<dyn FnOnce(ArtemisResult<()>) + Send + 'static>;

/// Receives the outcome of an asynchronous repository invocation.
///
/// An entities callback gets the entities found or written; a completion
/// callback only learns whether the operation succeeded. Either one gets the
/// store's error when the operation fails.
pub enum Callback<T> {
    Entities(EntitiesFn<T>),
    Completion(CompletionFn),
}

impl<T> Callback<T> {
    pub fn entities<F>(f: F) -> Self
    where
        F: FnOnce(ArtemisResult<Vec<T>>) + Send + 'static,
    {
        Callback::Entities(Box::new(f))
    }

    pub fn completion<F>(f: F) -> Self
    where
        F: FnOnce(ArtemisResult<()>) + Send + 'static,
    {
        Callback::Completion(Box::new(f))
    }

    fn noop() -> Self {
        Callback::Completion(Box::new(|_| {}))
    }

    fn accepts_entities(&self) -> bool {
        matches!(self, Callback::Entities(_))
    }

    fn complete_with_entities(self, result: ArtemisResult<Vec<T>>) {
        match self {
            Callback::Entities(f) => f(result),
            Callback::Completion(f) => f(result.map(|_| ())),
        }
    }

    fn complete(self, result: ArtemisResult<()>) {
        match self {
            Callback::Entities(f) => f(result.map(|_| Vec::new())),
            Callback::Completion(f) => f(result),
        }
    }
}

/// Dispatches the methods of an asynchronous repository to an [AsyncStore].
///
/// Follows the same precedence as
/// [RepositoryProxy](crate::repository::RepositoryProxy), but never returns
/// a result: it is delivered to the [Callback], usually on a thread owned by
/// the store.
///
/// # Callbacks
/// - `findBy…` requires an entities callback; without one the call fails
///   before the name is parsed
/// - literal queries and `deleteBy…` run with a no-op callback when none is
///   given
/// - `save` and `update` accept an optional callback
///
/// Errors raised while preparing the call (parsing, mapping, a missing
/// callback) are returned; errors raised by the store go to the callback.
pub struct AsyncRepositoryProxy<T> {
    inner: Arc<AsyncRepositoryProxyInner<T>>,
}

impl<T> Clone for AsyncRepositoryProxy<T> {
    fn clone(&self) -> Self {
        AsyncRepositoryProxy {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Entity> AsyncRepositoryProxy<T> {
    pub fn new(
        store: Arc<dyn AsyncStore>,
        methods: Vec<RepositoryMethod>,
        config: RepositoryConfig,
    ) -> Self {
        AsyncRepositoryProxy {
            inner: Arc::new(AsyncRepositoryProxyInner {
                store,
                converter: EntityConverter::new(Arc::new(T::entity_metadata())),
                methods: MethodTable::new(methods),
                config,
            }),
        }
    }

    pub fn metadata(&self) -> &EntityMetadata {
        self.inner.converter.metadata()
    }

    /// Submits `method` for execution.
    pub fn invoke(
        &self,
        method: &str,
        args: Args<T>,
        callback: Option<Callback<T>>,
    ) -> ArtemisResult<()> {
        self.inner.invoke(method, args, callback)
    }

    /// Subscribes `callback` to the entities written from now on that match
    /// `query`.
    ///
    /// The callback runs once per matching write, on a thread chosen by the
    /// store, and gets the mapping error when a record does not convert.
    /// Fails with `UnsupportedQuery` when the store has no live queries.
    pub fn live<F>(&self, query: Query, callback: F) -> ArtemisResult<Subscription>
    where
        F: Fn(ArtemisResult<T>) + Send + Sync + 'static,
    {
        self.inner.live(LiveQuery::Query(query), callback)
    }

    /// Like [AsyncRepositoryProxy::live], with a store-native query.
    ///
    /// The parameters of `args` bind the way they do for a literal method.
    pub fn live_literal<F>(
        &self,
        query: LiteralQuery,
        args: Args<T>,
        callback: F,
    ) -> ArtemisResult<Subscription>
    where
        F: Fn(ArtemisResult<T>) + Send + Sync + 'static,
    {
        let invocation = args.into_invocation();
        invocation.forbid_consistency("live")?;
        let params = Params::from_values(invocation.params);
        self.inner.live(LiveQuery::Literal(query, params), callback)
    }

    pub fn unsubscribe(&self, subscription: &Subscription) -> ArtemisResult<()> {
        self.inner.store.unsubscribe(subscription)
    }
}

impl<T: Entity> AsyncCrudRepository<T> for AsyncRepositoryProxy<T> {
    fn save(&self, entity: T, callback: Option<Callback<T>>) -> ArtemisResult<()> {
        self.inner.save(vec![entity], None, callback)
    }

    fn save_with_ttl(
        &self,
        entity: T,
        ttl: Duration,
        callback: Option<Callback<T>>,
    ) -> ArtemisResult<()> {
        self.inner.save(vec![entity], Some(ttl), callback)
    }

    fn save_all(&self, entities: Vec<T>, callback: Option<Callback<T>>) -> ArtemisResult<()> {
        self.inner.save(entities, None, callback)
    }

    fn update(&self, entity: T, callback: Option<Callback<T>>) -> ArtemisResult<()> {
        self.inner.update(vec![entity], callback)
    }

    fn update_all(&self, entities: Vec<T>, callback: Option<Callback<T>>) -> ArtemisResult<()> {
        self.inner.update(entities, callback)
    }
}

struct AsyncRepositoryProxyInner<T> {
    store: Arc<dyn AsyncStore>,
    converter: EntityConverter<T>,
    methods: MethodTable,
    config: RepositoryConfig,
}

impl<T: Entity> AsyncRepositoryProxyInner<T> {
    fn invoke(
        &self,
        name: &str,
        args: Args<T>,
        callback: Option<Callback<T>>,
    ) -> ArtemisResult<()> {
        let method = self.methods.resolve(name);
        let mut invocation = args.into_invocation();
        log::debug!(
            "Submitting {}.{} as {:?}",
            self.converter.metadata().name(),
            name,
            method.kind()
        );

        if let Some(query) = method.literal() {
            invocation.forbid_consistency(name)?;
            let callback = callback.unwrap_or_else(Callback::noop);
            self.execute_literal(query.clone(), invocation.params, callback);
            return Ok(());
        }

        match method.kind() {
            MethodKind::Save => {
                invocation.forbid_consistency(name)?;
                let entities = invocation.require_entities(name)?;
                self.save(entities, invocation.ttl, callback)
            }
            MethodKind::Update => {
                invocation.forbid_consistency(name)?;
                let entities = invocation.require_entities(name)?;
                self.update(entities, callback)
            }
            MethodKind::DeleteBy => {
                let callback = callback.unwrap_or_else(Callback::noop);
                let mut query =
                    QueryParser::parse_delete(name, &invocation.params, self.converter.metadata())?;
                if let Some(consistency) = self.consistency(invocation.consistency) {
                    query.set_consistency(consistency);
                }
                self.store
                    .delete(query, Box::new(move |result| callback.complete(result)));
                Ok(())
            }
            MethodKind::FindBy => {
                let callback = match callback {
                    Some(callback) if callback.accepts_entities() => callback,
                    _ => {
                        log::error!("Asynchronous find {} needs an entities callback", name);
                        return Err(ArtemisError::new(
                            &format!(
                                "Asynchronous find {} needs an entities callback to receive its result",
                                name
                            ),
                            ErrorKind::DynamicQueryError,
                        ));
                    }
                };
                let mut query =
                    QueryParser::parse_find(name, &invocation.params, self.converter.metadata())?;
                if let Some(consistency) = self.consistency(invocation.consistency) {
                    query.set_consistency(consistency);
                }
                let converter = self.converter.clone();
                self.store.find(
                    query,
                    Box::new(move |result| {
                        callback.complete_with_entities(
                            result.and_then(|records| converter.to_entities(&records)),
                        )
                    }),
                );
                Ok(())
            }
            MethodKind::Literal | MethodKind::Unrecognized => {
                match self.config.unknown_method_policy() {
                    UnknownMethodPolicy::ReturnNull => {
                        log::debug!("Method {} is not a repository query, ignoring it", name);
                        Ok(())
                    }
                    UnknownMethodPolicy::Fail => {
                        log::error!("Method {} is not a repository query", name);
                        Err(ArtemisError::new(
                            &format!("Method {} is not a repository query", name),
                            ErrorKind::DynamicQueryError,
                        ))
                    }
                }
            }
        }
    }

    fn execute_literal(&self, query: LiteralQuery, params: Vec<Value>, callback: Callback<T>) {
        let params = Params::from_values(params);
        let converter = self.converter.clone();
        self.store.execute(
            query,
            params,
            Box::new(move |result| {
                callback.complete_with_entities(
                    result.and_then(|records| converter.to_entities(&records)),
                )
            }),
        );
    }

    fn consistency(&self, requested: Option<ConsistencyLevel>) -> Option<ConsistencyLevel> {
        requested.or(self.config.default_consistency())
    }

    fn live<F>(&self, query: LiveQuery, callback: F) -> ArtemisResult<Subscription>
    where
        F: Fn(ArtemisResult<T>) + Send + Sync + 'static,
    {
        let converter = self.converter.clone();
        let subscription = self.store.live(
            query,
            Arc::new(move |record: ArtemisResult<Record>| {
                callback(record.and_then(|record| converter.to_entity(&record)))
            }),
        )?;
        log::debug!(
            "Live query {} on {} subscribed",
            subscription.id(),
            self.converter.metadata().name()
        );
        Ok(subscription)
    }

    fn save(
        &self,
        entities: Vec<T>,
        ttl: Option<Duration>,
        callback: Option<Callback<T>>,
    ) -> ArtemisResult<()> {
        let mut records = self.converter.to_records(&entities)?;
        let callback = callback.unwrap_or_else(Callback::noop);
        match (records.pop(), records.is_empty()) {
            (Some(record), true) => self.store.save(
                record,
                ttl,
                Box::new(move |result| callback.complete_with_entities(result.map(|_| entities))),
            ),
            (last, _) => {
                records.extend(last);
                self.store.save_all(
                    records,
                    ttl,
                    Box::new(move |result| {
                        callback.complete_with_entities(result.map(|_| entities))
                    }),
                )
            }
        }
        Ok(())
    }

    fn update(&self, entities: Vec<T>, callback: Option<Callback<T>>) -> ArtemisResult<()> {
        let mut records = self.converter.to_records(&entities)?;
        let callback = callback.unwrap_or_else(Callback::noop);
        match (records.pop(), records.is_empty()) {
            (Some(record), true) => self.store.update(
                record,
                Box::new(move |result| callback.complete_with_entities(result.map(|_| entities))),
            ),
            (last, _) => {
                records.extend(last);
                self.store.update_all(
                    records,
                    Box::new(move |result| {
                        callback.complete_with_entities(result.map(|_| entities))
                    }),
                )
            }
        }
        Ok(())
    }
}
