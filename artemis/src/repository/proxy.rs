use crate::config::{RepositoryConfig, UnknownMethodPolicy};
use crate::entity::{Entity, EntityConverter, EntityMetadata};
use crate::errors::{ArtemisError, ArtemisResult, ErrorKind};
use crate::query::{ConsistencyLevel, LiteralQuery, Params, QueryParser};
use crate::repository::{
    Args, CrudRepository, FromEntities, MethodKind, MethodTable, Outcome, RepositoryMethod,
    ResultShape,
};
use crate::store::Store;
use crate::common::Value;
use std::sync::Arc;
use std::time::Duration;

/// Dispatches the methods of a synchronous repository to a [Store].
///
/// # Purpose
/// Stands in for the body of every declared repository method. A method is
/// dispatched by the first rule that applies:
///
/// 1. it carries a literal query: the query runs with the positional
///    parameters bound (a document parameter binds by name), and the
///    records come back as entities
/// 2. it is `save` or `update`: the entity arguments are written
/// 3. its name starts with `deleteBy`: the name is parsed and the delete runs
/// 4. its name starts with `findBy` (or `findFirstBy`, `findTopNBy`): the
///    name is parsed and the query runs
/// 5. otherwise the configured [UnknownMethodPolicy] decides
///
/// Store errors reach the caller unchanged.
///
/// # Usage
/// ```rust,ignore
/// struct PersonRepository {
///     proxy: RepositoryProxy<Person>,
/// }
///
/// impl PersonRepository {
///     fn find_by_name(&self, name: &str) -> ArtemisResult<Option<Person>> {
///         self.proxy.call("findByName", Args::new().param(name))
///     }
/// }
/// ```
///
/// Cloning is cheap; clones share the store handle and the method table.
pub struct RepositoryProxy<T> {
    inner: Arc<RepositoryProxyInner<T>>,
}

impl<T> Clone for RepositoryProxy<T> {
    fn clone(&self) -> Self {
        RepositoryProxy {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Entity> RepositoryProxy<T> {
    pub fn new(
        store: Arc<dyn Store>,
        methods: Vec<RepositoryMethod>,
        config: RepositoryConfig,
    ) -> Self {
        RepositoryProxy {
            inner: Arc::new(RepositoryProxyInner {
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

    /// Dispatches `method` and returns the unshaped outcome.
    pub fn invoke(&self, method: &str, args: Args<T>) -> ArtemisResult<Outcome<T>> {
        self.inner.invoke(method, args)
    }

    /// Dispatches `method` and shapes the outcome as `R`.
    ///
    /// `R` plays the part of the method's declared return type: `Option<T>`,
    /// `Vec<T>`, a set, a queue, an [EntityStream](crate::repository::EntityStream),
    /// or [Outcome] for the raw result.
    ///
    /// A `deleteBy…` method returns nothing, so only [Outcome] fits it; any
    /// other `R` fails with `InvalidOperation` before the store is touched.
    pub fn call<R: FromEntities<T>>(&self, method: &str, args: Args<T>) -> ArtemisResult<R> {
        self.inner.check_shape(method, R::SHAPE)?;
        R::from_outcome(self.inner.invoke(method, args)?)
    }

    /// Dispatches `method`, discarding any result.
    pub fn execute(&self, method: &str, args: Args<T>) -> ArtemisResult<()> {
        self.inner.invoke(method, args).map(|_| ())
    }
}

impl<T: Entity> CrudRepository<T> for RepositoryProxy<T> {
    fn save(&self, entity: T) -> ArtemisResult<T> {
        self.inner.save_one(entity, None)
    }

    fn save_with_ttl(&self, entity: T, ttl: Duration) -> ArtemisResult<T> {
        self.inner.save_one(entity, Some(ttl))
    }

    fn save_all(&self, entities: Vec<T>) -> ArtemisResult<Vec<T>> {
        self.inner.save_many(entities, None)
    }

    fn update(&self, entity: T) -> ArtemisResult<T> {
        self.inner.update_one(entity)
    }

    fn update_all(&self, entities: Vec<T>) -> ArtemisResult<Vec<T>> {
        self.inner.update_many(entities)
    }
}

struct RepositoryProxyInner<T> {
    store: Arc<dyn Store>,
    converter: EntityConverter<T>,
    methods: MethodTable,
    config: RepositoryConfig,
}

impl<T: Entity> RepositoryProxyInner<T> {
    fn invoke(&self, name: &str, args: Args<T>) -> ArtemisResult<Outcome<T>> {
        let method = self.methods.resolve(name);
        let mut invocation = args.into_invocation();
        log::debug!(
            "Dispatching {}.{} as {:?}",
            self.converter.metadata().name(),
            name,
            method.kind()
        );

        if let Some(query) = method.literal() {
            invocation.forbid_consistency(name)?;
            return self.execute_literal(query, invocation.params);
        }

        match method.kind() {
            MethodKind::Save => {
                invocation.forbid_consistency(name)?;
                let entities = invocation.require_entities(name)?;
                let saved = match <[T; 1]>::try_from(entities) {
                    Ok([entity]) => vec![self.save_one(entity, invocation.ttl)?],
                    Err(entities) => self.save_many(entities, invocation.ttl)?,
                };
                Ok(Outcome::Saved(saved))
            }
            MethodKind::Update => {
                invocation.forbid_consistency(name)?;
                let entities = invocation.require_entities(name)?;
                let updated = match <[T; 1]>::try_from(entities) {
                    Ok([entity]) => vec![self.update_one(entity)?],
                    Err(entities) => self.update_many(entities)?,
                };
                Ok(Outcome::Saved(updated))
            }
            MethodKind::DeleteBy => {
                let mut query =
                    QueryParser::parse_delete(name, &invocation.params, self.converter.metadata())?;
                if let Some(consistency) = self.consistency(invocation.consistency) {
                    query.set_consistency(consistency);
                }
                self.store.delete(&query)?;
                Ok(Outcome::Done)
            }
            MethodKind::FindBy => {
                let mut query =
                    QueryParser::parse_find(name, &invocation.params, self.converter.metadata())?;
                if let Some(consistency) = self.consistency(invocation.consistency) {
                    query.set_consistency(consistency);
                }
                let records = self.store.find(&query)?;
                Ok(Outcome::Entities(self.converter.to_entities(&records)?))
            }
            MethodKind::Literal | MethodKind::Unrecognized => self.unrecognized(name),
        }
    }

    fn check_shape(&self, name: &str, shape: ResultShape) -> ArtemisResult<()> {
        let method = self.methods.resolve(name);
        let deletes = method.literal().is_none() && method.kind() == MethodKind::DeleteBy;
        if deletes && shape != ResultShape::Raw {
            log::error!("Method {} deletes and cannot return a {:?} result", name, shape);
            return Err(ArtemisError::new(
                &format!("Method {} deletes and cannot return a {:?} result", name, shape),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }

    fn execute_literal(&self, query: &LiteralQuery, params: Vec<Value>) -> ArtemisResult<Outcome<T>> {
        let params = Params::from_values(params);
        let records = self.store.execute(query, &params)?;
        Ok(Outcome::Entities(self.converter.to_entities(&records)?))
    }

    fn consistency(&self, requested: Option<ConsistencyLevel>) -> Option<ConsistencyLevel> {
        requested.or(self.config.default_consistency())
    }

    fn unrecognized(&self, name: &str) -> ArtemisResult<Outcome<T>> {
        match self.config.unknown_method_policy() {
            UnknownMethodPolicy::ReturnNull => {
                log::debug!("Method {} is not a repository query, returning null", name);
                Ok(Outcome::Null)
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

    fn save_one(&self, entity: T, ttl: Option<Duration>) -> ArtemisResult<T> {
        let record = self.converter.to_record(&entity)?;
        self.store.save(record, ttl)?;
        Ok(entity)
    }

    fn save_many(&self, entities: Vec<T>, ttl: Option<Duration>) -> ArtemisResult<Vec<T>> {
        let records = self.converter.to_records(&entities)?;
        self.store.save_all(records, ttl)?;
        Ok(entities)
    }

    fn update_one(&self, entity: T) -> ArtemisResult<T> {
        let record = self.converter.to_record(&entity)?;
        self.store.update(record)?;
        Ok(entity)
    }

    fn update_many(&self, entities: Vec<T>) -> ArtemisResult<Vec<T>> {
        let records = self.converter.to_records(&entities)?;
        self.store.update_all(records)?;
        Ok(entities)
    }
}
