use crate::errors::ArtemisResult;
use crate::repository::Callback;
use std::time::Duration;

/// Write operations every synchronous repository supports.
///
/// The entities returned are the ones given, once the store accepted them.
pub trait CrudRepository<T> {
    fn save(&self, entity: T) -> ArtemisResult<T>;

    /// Saves `entity` so that the store expires it after `ttl`.
    fn save_with_ttl(&self, entity: T, ttl: Duration) -> ArtemisResult<T>;

    fn save_all(&self, entities: Vec<T>) -> ArtemisResult<Vec<T>>;

    fn update(&self, entity: T) -> ArtemisResult<T>;

    fn update_all(&self, entities: Vec<T>) -> ArtemisResult<Vec<T>>;
}

/// Write operations every asynchronous repository supports.
///
/// Calls return once the operation is submitted. The callback, when given,
/// receives the written entities or the store's error; an entities callback
/// gets the entities, a completion callback only the success.
pub trait AsyncCrudRepository<T> {
    fn save(&self, entity: T, callback: Option<Callback<T>>) -> ArtemisResult<()>;

    fn save_with_ttl(
        &self,
        entity: T,
        ttl: Duration,
        callback: Option<Callback<T>>,
    ) -> ArtemisResult<()>;

    fn save_all(&self, entities: Vec<T>, callback: Option<Callback<T>>) -> ArtemisResult<()>;

    fn update(&self, entity: T, callback: Option<Callback<T>>) -> ArtemisResult<()>;

    fn update_all(&self, entities: Vec<T>, callback: Option<Callback<T>>) -> ArtemisResult<()>;
}
