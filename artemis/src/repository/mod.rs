//! Repository dispatch: from declared methods to store calls.
//!
//! A repository is declared as a type implementing [Repository] (or
//! [AsyncRepository]) that wraps a proxy. The [RepositoryRegistry] creates
//! each repository once at startup, over a shared store, and hands out the
//! same instance on every lookup.
//!
//! ```rust,ignore
//! let registry = RepositoryRegistry::builder()
//!     .store(Arc::new(MemoryStore::default()))
//!     .repository::<PersonRepository>()
//!     .build()?;
//!
//! let people = registry.get::<PersonRepository>()?;
//! let ada: Option<Person> = people.0.call("findByName", Args::new().param("Ada"))?;
//! ```

mod argument;
mod async_proxy;
mod crud;
mod method;
mod proxy;
mod registry;
mod shape;

#[cfg(test)]
pub(crate) mod fixtures;

pub use argument::*;
pub use async_proxy::*;
pub use crud::*;
pub use method::*;
pub use proxy::*;
pub use registry::*;
pub use shape::*;
