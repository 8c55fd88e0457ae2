use artemis::common::async_task;
use artemis::config::UnknownMethodPolicy;
use artemis::errors::{ArtemisError, ArtemisResult};
use artemis::query::{DeleteQuery, LiteralQuery, Params, Query};
use artemis::repository::{
    AsyncRepository, AsyncRepositoryProxy, Repository, RepositoryMethod, RepositoryProxy,
    RepositoryRegistry,
};
use artemis::store::{
    AsyncStore, LiveCallback, LiveQuery, MemoryStore, Record, ResultCallback, Store, Subscription,
};
use artemis_derive::{Convertible, Entity};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Convertible, Entity)]
#[entity(name = "Person", id = "name")]
pub struct Person {
    pub name: String,
    pub age: i64,
    pub city: Option<String>,
}

impl Person {
    pub fn new(name: &str, age: i64) -> Self {
        Person {
            name: name.to_string(),
            age,
            city: None,
        }
    }

    pub fn living_in(mut self, city: &str) -> Self {
        self.city = Some(city.to_string());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Convertible, Entity)]
#[entity(name = "cars", id = "plate")]
#[converter(ignored = "display_name")]
pub struct Car {
    #[column(name = "_key")]
    pub plate: String,
    pub model: String,
    #[column(name = "model_year")]
    pub year: i32,
    pub display_name: String,
}

pub struct PersonRepository(RepositoryProxy<Person>);

impl Repository for PersonRepository {
    type Entity = Person;

    fn methods() -> Vec<RepositoryMethod> {
        vec![
            RepositoryMethod::with_query(
                "findAdults",
                LiteralQuery::cql("select * from Person where age > 17"),
            ),
            RepositoryMethod::with_query(
                "findByCity",
                LiteralQuery::n1ql("select * from Person where city = $city"),
            ),
        ]
    }

    fn create(proxy: RepositoryProxy<Person>) -> Self {
        PersonRepository(proxy)
    }
}

impl PersonRepository {
    pub fn proxy(&self) -> &RepositoryProxy<Person> {
        &self.0
    }
}

pub struct AsyncPersonRepository(AsyncRepositoryProxy<Person>);

impl AsyncRepository for AsyncPersonRepository {
    type Entity = Person;

    fn methods() -> Vec<RepositoryMethod> {
        vec![RepositoryMethod::with_query(
            "findAdults",
            LiteralQuery::cql("select * from Person where age > ?"),
        )]
    }

    fn create(proxy: AsyncRepositoryProxy<Person>) -> Self {
        AsyncPersonRepository(proxy)
    }
}

impl AsyncPersonRepository {
    pub fn proxy(&self) -> &AsyncRepositoryProxy<Person> {
        &self.0
    }
}

pub struct CarRepository(RepositoryProxy<Car>);

impl Repository for CarRepository {
    type Entity = Car;

    fn create(proxy: RepositoryProxy<Car>) -> Self {
        CarRepository(proxy)
    }
}

impl CarRepository {
    pub fn proxy(&self) -> &RepositoryProxy<Car> {
        &self.0
    }
}

/// Store double that records every call and answers from canned rows.
///
/// Asynchronous calls complete on a spawned thread, as a driver would.
/// Clones share the same recordings.
#[derive(Clone, Default)]
pub struct RecordingStore {
    inner: Arc<RecordingStoreInner>,
}

#[derive(Default)]
struct RecordingStoreInner {
    rows: Vec<Record>,
    failure: Option<ArtemisError>,
    finds: Mutex<Vec<Query>>,
    deletes: Mutex<Vec<DeleteQuery>>,
    saves: Mutex<Vec<(Record, Option<Duration>)>>,
    updates: Mutex<Vec<Record>>,
    executes: Mutex<Vec<(LiteralQuery, Params)>>,
    close_failure: Option<ArtemisError>,
    closed: AtomicUsize,
    live: Mutex<Vec<(Subscription, LiveQuery, LiveCallback)>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        RecordingStore::default()
    }

    pub fn with_rows(rows: Vec<Record>) -> Self {
        RecordingStore {
            inner: Arc::new(RecordingStoreInner {
                rows,
                ..Default::default()
            }),
        }
    }

    pub fn failing(error: ArtemisError) -> Self {
        RecordingStore {
            inner: Arc::new(RecordingStoreInner {
                failure: Some(error),
                ..Default::default()
            }),
        }
    }

    /// A store whose every `close` fails with `error`.
    pub fn failing_close(error: ArtemisError) -> Self {
        RecordingStore {
            inner: Arc::new(RecordingStoreInner {
                close_failure: Some(error),
                ..Default::default()
            }),
        }
    }

    pub fn finds(&self) -> Vec<Query> {
        self.inner.finds.lock().clone()
    }

    pub fn deletes(&self) -> Vec<DeleteQuery> {
        self.inner.deletes.lock().clone()
    }

    pub fn saves(&self) -> Vec<(Record, Option<Duration>)> {
        self.inner.saves.lock().clone()
    }

    pub fn updates(&self) -> Vec<Record> {
        self.inner.updates.lock().clone()
    }

    pub fn executes(&self) -> Vec<(LiteralQuery, Params)> {
        self.inner.executes.lock().clone()
    }

    pub fn live_queries(&self) -> Vec<LiveQuery> {
        self.inner.live.lock().iter().map(|(_, q, _)| q.clone()).collect()
    }

    /// Pushes `record` to every live subscriber on a spawned thread, as a
    /// driver notifying a change would.
    pub fn publish(&self, record: Record) {
        let callbacks: Vec<LiveCallback> =
            self.inner.live.lock().iter().map(|(_, _, c)| c.clone()).collect();
        async_task(move || {
            for callback in callbacks {
                callback(Ok(record.clone()));
            }
        });
    }

    pub fn close_count(&self) -> usize {
        self.inner.closed.load(Ordering::SeqCst)
    }

    fn outcome<R>(&self, value: R) -> ArtemisResult<R> {
        match &self.inner.failure {
            Some(error) => Err(error.clone()),
            None => Ok(value),
        }
    }
}

impl Store for RecordingStore {
    fn find(&self, query: &Query) -> ArtemisResult<Vec<Record>> {
        self.inner.finds.lock().push(query.clone());
        self.outcome(self.inner.rows.clone())
    }

    fn delete(&self, query: &DeleteQuery) -> ArtemisResult<()> {
        self.inner.deletes.lock().push(query.clone());
        self.outcome(())
    }

    fn save(&self, record: Record, ttl: Option<Duration>) -> ArtemisResult<Record> {
        self.inner.saves.lock().push((record.clone(), ttl));
        self.outcome(record)
    }

    fn update(&self, record: Record) -> ArtemisResult<Record> {
        self.inner.updates.lock().push(record.clone());
        self.outcome(record)
    }

    fn execute(&self, query: &LiteralQuery, params: &Params) -> ArtemisResult<Vec<Record>> {
        self.inner.executes.lock().push((query.clone(), params.clone()));
        self.outcome(self.inner.rows.clone())
    }

    fn close(&self) -> ArtemisResult<()> {
        self.inner.closed.fetch_add(1, Ordering::SeqCst);
        match &self.inner.close_failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl AsyncStore for RecordingStore {
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
        let subscription = self.outcome(Subscription::new())?;
        self.inner
            .live
            .lock()
            .push((subscription.clone(), query, callback));
        Ok(subscription)
    }

    fn unsubscribe(&self, subscription: &Subscription) -> ArtemisResult<()> {
        self.inner.live.lock().retain(|(s, _, _)| s != subscription);
        Ok(())
    }

    fn close(&self) -> ArtemisResult<()> {
        Store::close(self)
    }
}

/// A registry with every test repository, and the store behind it.
#[derive(Clone)]
pub struct TestContext {
    registry: RepositoryRegistry,
    memory: Option<MemoryStore>,
    recorder: Option<RecordingStore>,
}

impl TestContext {
    pub fn registry(&self) -> &RepositoryRegistry {
        &self.registry
    }

    pub fn people(&self) -> ArtemisResult<Arc<PersonRepository>> {
        self.registry.get::<PersonRepository>()
    }

    pub fn async_people(&self) -> ArtemisResult<Arc<AsyncPersonRepository>> {
        self.registry.get::<AsyncPersonRepository>()
    }

    pub fn cars(&self) -> ArtemisResult<Arc<CarRepository>> {
        self.registry.get::<CarRepository>()
    }

    /// The in-memory store, when the context was built over one.
    pub fn memory(&self) -> Option<&MemoryStore> {
        self.memory.as_ref()
    }

    /// The recording store, when the context was built over one.
    pub fn recorder(&self) -> Option<&RecordingStore> {
        self.recorder.as_ref()
    }
}

/// Runs `test` between `before` and `after`; `after` runs even when the test fails.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: FnOnce(TestContext) -> ArtemisResult<()>,
    B: FnOnce() -> ArtemisResult<TestContext>,
    A: FnOnce(TestContext) -> ArtemisResult<()>,
{
    let start = Instant::now();
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let result = test(ctx.clone());
    let cleanup = after(ctx);
    log::debug!("Test finished in {:?}", start.elapsed());

    if let Err(e) = result {
        panic!("Test failed: {:?}", e);
    }
    if let Err(e) = cleanup {
        panic!("After run failed: {:?}", e);
    }
}

/// Every test repository over one shared [MemoryStore].
pub fn create_test_context() -> ArtemisResult<TestContext> {
    create_test_context_with(UnknownMethodPolicy::ReturnNull)
}

pub fn create_test_context_with(policy: UnknownMethodPolicy) -> ArtemisResult<TestContext> {
    let memory = MemoryStore::default();
    let shared = Arc::new(memory.clone());
    let registry = RepositoryRegistry::builder()
        .store(shared.clone())
        .async_store(shared)
        .unknown_method_policy(policy)
        .repository::<PersonRepository>()
        .repository::<CarRepository>()
        .async_repository::<AsyncPersonRepository>()
        .build()?;

    Ok(TestContext {
        registry,
        memory: Some(memory),
        recorder: None,
    })
}

/// Every test repository over `store`, which records what reaches it.
pub fn create_recording_context(recorder: RecordingStore) -> ArtemisResult<TestContext> {
    let shared = Arc::new(recorder.clone());
    let registry = RepositoryRegistry::builder()
        .store(shared.clone())
        .async_store(shared)
        .repository::<PersonRepository>()
        .repository::<CarRepository>()
        .async_repository::<AsyncPersonRepository>()
        .build()?;

    Ok(TestContext {
        registry,
        memory: None,
        recorder: Some(recorder),
    })
}

pub fn cleanup(ctx: TestContext) -> ArtemisResult<()> {
    ctx.registry.shutdown()
}

/// Shared slot a callback writes its outcome into.
pub struct Captured<R> {
    slot: Arc<Mutex<Option<ArtemisResult<R>>>>,
    calls: Arc<AtomicUsize>,
}

impl<R> Clone for Captured<R> {
    fn clone(&self) -> Self {
        Captured {
            slot: Arc::clone(&self.slot),
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<R: Send + 'static> Captured<R> {
    pub fn new() -> Self {
        Captured {
            slot: Arc::new(Mutex::new(None)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A closure that stores its argument here.
    pub fn sink(&self) -> impl FnOnce(ArtemisResult<R>) + Send + 'static {
        let captured = self.clone();
        move |result| {
            *captured.slot.lock() = Some(result);
            captured.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Waits up to five seconds for the callback, then takes its outcome.
    pub fn wait(&self) -> ArtemisResult<R> {
        awaitility::at_most(Duration::from_secs(5)).until(|| self.calls() > 0);
        match self.slot.lock().take() {
            Some(result) => result,
            None => panic!("callback was not invoked"),
        }
    }
}

impl<R: Send + 'static> Default for Captured<R> {
    fn default() -> Self {
        Captured::new()
    }
}
