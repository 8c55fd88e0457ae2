use crate::config::{RepositoryConfig, UnknownMethodPolicy};
use crate::entity::Entity;
use crate::errors::{ArtemisError, ArtemisResult, ErrorKind};
use crate::query::ConsistencyLevel;
use crate::repository::{AsyncRepositoryProxy, RepositoryMethod, RepositoryProxy};
use crate::store::{AsyncStore, Store};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A synchronous repository declaration.
///
/// The implementing type is what callers use; it holds the
/// [RepositoryProxy] it is created with and forwards its methods to it.
///
/// ```rust,ignore
/// struct PersonRepository(RepositoryProxy<Person>);
///
/// impl Repository for PersonRepository {
///     type Entity = Person;
///
///     fn methods() -> Vec<RepositoryMethod> {
///         vec![RepositoryMethod::with_query("adults", LiteralQuery::cql("select * from Person where age > 17"))]
///     }
///
///     fn create(proxy: RepositoryProxy<Person>) -> Self {
///         PersonRepository(proxy)
///     }
/// }
/// ```
pub trait Repository: Send + Sync + 'static {
    type Entity: Entity;

    /// The declared methods; only needed for methods with a literal query.
    fn methods() -> Vec<RepositoryMethod> {
        Vec::new()
    }

    fn create(proxy: RepositoryProxy<Self::Entity>) -> Self;
}

/// An asynchronous repository declaration. See [Repository].
pub trait AsyncRepository: Send + Sync + 'static {
    type Entity: Entity;

    fn methods() -> Vec<RepositoryMethod> {
        Vec::new()
    }

    fn create(proxy: AsyncRepositoryProxy<Self::Entity>) -> Self;
}

type SharedRepository = Arc<dyn Any + Send + Sync>;

enum Registration {
    Sync {
        name: &'static str,
        type_id: TypeId,
        create: fn(Arc<dyn Store>, RepositoryConfig) -> SharedRepository,
    },
    Async {
        name: &'static str,
        type_id: TypeId,
        create: fn(Arc<dyn AsyncStore>, RepositoryConfig) -> SharedRepository,
    },
}

impl Registration {
    fn type_id(&self) -> TypeId {
        match self {
            Registration::Sync { type_id, .. } | Registration::Async { type_id, .. } => *type_id,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Registration::Sync { name, .. } | Registration::Async { name, .. } => *name,
        }
    }
}

fn create_sync<R: Repository>(store: Arc<dyn Store>, config: RepositoryConfig) -> SharedRepository {
    Arc::new(R::create(RepositoryProxy::new(store, R::methods(), config)))
}

fn create_async<R: AsyncRepository>(
    store: Arc<dyn AsyncStore>,
    config: RepositoryConfig,
) -> SharedRepository {
    Arc::new(R::create(AsyncRepositoryProxy::new(store, R::methods(), config)))
}

/// Builds a [RepositoryRegistry].
///
/// Errors raised while configuring are kept and returned by
/// [RepositoryRegistryBuilder::build].
#[derive(Default)]
pub struct RepositoryRegistryBuilder {
    error: Option<ArtemisError>,
    config: RepositoryConfig,
    store: Option<Arc<dyn Store>>,
    async_store: Option<Arc<dyn AsyncStore>>,
    registrations: Vec<Registration>,
}

impl RepositoryRegistryBuilder {
    pub fn new() -> Self {
        RepositoryRegistryBuilder::default()
    }

    /// The store shared by every synchronous repository.
    pub fn store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// The store shared by every asynchronous repository.
    pub fn async_store(mut self, store: Arc<dyn AsyncStore>) -> Self {
        self.async_store = Some(store);
        self
    }

    pub fn unknown_method_policy(mut self, policy: UnknownMethodPolicy) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_unknown_method_policy(policy) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn default_consistency(mut self, consistency: ConsistencyLevel) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_default_consistency(consistency) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn repository<R: Repository>(self) -> Self {
        self.register(Registration::Sync {
            name: type_name::<R>(),
            type_id: TypeId::of::<R>(),
            create: create_sync::<R>,
        })
    }

    pub fn async_repository<R: AsyncRepository>(self) -> Self {
        self.register(Registration::Async {
            name: type_name::<R>(),
            type_id: TypeId::of::<R>(),
            create: create_async::<R>,
        })
    }

    fn register(mut self, registration: Registration) -> Self {
        if self.error.is_none()
            && self
                .registrations
                .iter()
                .any(|r| r.type_id() == registration.type_id())
        {
            log::error!("Repository {} is registered twice", registration.name());
            self.error = Some(ArtemisError::new(
                &format!("Repository {} is registered twice", registration.name()),
                ErrorKind::InvalidOperation,
            ));
        }
        self.registrations.push(registration);
        self
    }

    /// Creates every registered repository.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error, or `InvalidOperation` when a
    /// repository is registered without the matching store.
    pub fn build(self) -> ArtemisResult<RepositoryRegistry> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let mut repositories: HashMap<TypeId, SharedRepository> =
            HashMap::with_capacity(self.registrations.len());
        for registration in &self.registrations {
            let repository = match registration {
                Registration::Sync { name, create, .. } => {
                    let store = require(self.store.as_ref(), name, "store")?;
                    create(Arc::clone(store), self.config.clone())
                }
                Registration::Async { name, create, .. } => {
                    let store = require(self.async_store.as_ref(), name, "async store")?;
                    create(Arc::clone(store), self.config.clone())
                }
            };
            log::info!("Repository {} is ready", registration.name());
            repositories.insert(registration.type_id(), repository);
        }

        self.config.mark_configured();
        log::info!("Repository registry started with {} repositories", repositories.len());
        Ok(RepositoryRegistry {
            inner: Arc::new(RepositoryRegistryInner {
                repositories,
                store: self.store,
                async_store: self.async_store,
                config: self.config,
                closed: AtomicBool::from(false),
            }),
        })
    }
}

fn require<'a, S: ?Sized>(store: Option<&'a Arc<S>>, repository: &str, kind: &str) -> ArtemisResult<&'a Arc<S>> {
    store.ok_or_else(|| {
        log::error!("Repository {} needs a {}, none was configured", repository, kind);
        ArtemisError::new(
            &format!("Repository {} needs a {}, none was configured", repository, kind),
            ErrorKind::InvalidOperation,
        )
    })
}

/// Holds one shared instance of every repository declared at startup.
///
/// # Responsibilities
///
/// * **Creation**: builds each repository's proxy once, over the shared store
/// * **Lookup**: hands out the same `Arc` for a repository type every time
/// * **Teardown**: closes the stores once on [RepositoryRegistry::shutdown]
///
/// Cheap to clone; clones share the same repositories.
#[derive(Clone)]
pub struct RepositoryRegistry {
    inner: Arc<RepositoryRegistryInner>,
}

impl RepositoryRegistry {
    pub fn builder() -> RepositoryRegistryBuilder {
        RepositoryRegistryBuilder::new()
    }

    /// Returns the repository of type `R`.
    ///
    /// # Errors
    ///
    /// `RepositoryNotFound` when `R` was not registered, `StoreAlreadyClosed`
    /// after [RepositoryRegistry::shutdown].
    pub fn get<R: Any + Send + Sync>(&self) -> ArtemisResult<Arc<R>> {
        self.inner.get::<R>()
    }

    pub fn contains<R: Any>(&self) -> bool {
        self.inner.repositories.contains_key(&TypeId::of::<R>())
    }

    pub fn len(&self) -> usize {
        self.inner.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.repositories.is_empty()
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.inner.config
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Relaxed)
    }

    /// Closes the stores, each one once even when it serves both roles.
    ///
    /// Every store is closed even if another fails; the first failure is
    /// returned and the registry stays open, so shutdown can be retried.
    /// Once it succeeds, later calls do nothing.
    pub fn shutdown(&self) -> ArtemisResult<()> {
        self.inner.shutdown()
    }
}

struct RepositoryRegistryInner {
    repositories: HashMap<TypeId, SharedRepository>,
    store: Option<Arc<dyn Store>>,
    async_store: Option<Arc<dyn AsyncStore>>,
    config: RepositoryConfig,
    closed: AtomicBool,
}

impl RepositoryRegistryInner {
    fn get<R: Any + Send + Sync>(&self) -> ArtemisResult<Arc<R>> {
        if self.closed.load(Ordering::Relaxed) {
            log::error!("Repository registry is already shut down");
            return Err(ArtemisError::new(
                "Repository registry is already shut down",
                ErrorKind::StoreAlreadyClosed,
            ));
        }

        let repository = self.repositories.get(&TypeId::of::<R>()).cloned();
        match repository.map(|r| r.downcast::<R>()) {
            Some(Ok(repository)) => Ok(repository),
            Some(Err(_)) => {
                log::error!("Repository {} has an unexpected type", type_name::<R>());
                Err(ArtemisError::new(
                    &format!("Repository {} has an unexpected type", type_name::<R>()),
                    ErrorKind::InternalError,
                ))
            }
            None => {
                log::error!("No repository {} is registered", type_name::<R>());
                Err(ArtemisError::new(
                    &format!("No repository {} is registered", type_name::<R>()),
                    ErrorKind::RepositoryNotFound,
                ))
            }
        }
    }

    fn shutdown(&self) -> ArtemisResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            return Ok(());
        }

        let mut first_error = None;
        if let Some(store) = &self.store {
            if let Err(e) = store.close() {
                log::error!("Failed to close the store: {}", e);
                first_error.get_or_insert(e);
            }
        }
        if let Some(async_store) = &self.async_store {
            if self.shares_store(async_store) {
                log::debug!("Asynchronous store is the synchronous one, already closed");
            } else if let Err(e) = async_store.close() {
                log::error!("Failed to close the asynchronous store: {}", e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                self.closed.store(true, Ordering::Relaxed);
                log::info!("Repository registry shut down");
                Ok(())
            }
        }
    }

    fn shares_store(&self, async_store: &Arc<dyn AsyncStore>) -> bool {
        self.store.as_ref().is_some_and(|store| {
            Arc::as_ptr(store) as *const () == Arc::as_ptr(async_store) as *const ()
        })
    }
}
