//! # Artemis - repository mapping for NoSQL stores
//!
//! Artemis turns declared repositories into calls against a NoSQL store.
//! A repository names its methods after what they do (`findByNameAndAge`,
//! `deleteByName`), or attaches a store-native query to them; Artemis parses
//! the names, runs the queries, and shapes the results into the type the
//! caller asked for.
//!
//! ## Key Features
//!
//! - **Derived queries**: `findBy…`, `findFirstBy…`, `findTopNBy…` and
//!   `deleteBy…` method names, with `And`/`Or`, comparison, `Between`,
//!   `Like`, `In` and `OrderBy`
//! - **Literal queries**: CQL, N1QL, OrientDB SQL or search DSL text bound
//!   to positional or named parameters
//! - **Result shapes**: `Option<T>`, `Vec<T>`, sets, priority queues and
//!   single-pass streams
//! - **Async repositories**: results delivered to explicit callbacks, and
//!   live queries following the entities written after subscribing
//! - **Store contracts**: [store::Store] and [store::AsyncStore], with an
//!   in-memory implementation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use artemis::repository::{Args, Repository, RepositoryProxy, RepositoryRegistry};
//! use artemis::store::MemoryStore;
//! use std::sync::Arc;
//!
//! #[derive(Entity, Convertible, Default, Debug)]
//! #[entity(name = "Person", id = "name")]
//! struct Person {
//!     name: String,
//!     age: i32,
//! }
//!
//! struct People(RepositoryProxy<Person>);
//!
//! impl Repository for People {
//!     type Entity = Person;
//!
//!     fn create(proxy: RepositoryProxy<Person>) -> Self {
//!         People(proxy)
//!     }
//! }
//!
//! let registry = RepositoryRegistry::builder()
//!     .store(Arc::new(MemoryStore::default()))
//!     .repository::<People>()
//!     .build()?;
//!
//! let people = registry.get::<People>()?;
//! let adults: Vec<Person> = people.0.call("findByAgeGreaterThan", Args::new().param(17))?;
//! registry.shutdown()?;
//! ```
//!
//! ## Module Organization
//!
//! - [`common`] - Values, documents and conversion
//! - [`config`] - Repository layer configuration
//! - [`entity`] - Entity metadata and entity/record conversion
//! - [`errors`] - Error types and result definitions
//! - [`query`] - Query descriptors and the method-name translator
//! - [`repository`] - Dispatchers, result shapes and the registry
//! - [`store`] - Store contracts and the in-memory store

pub mod common;
pub mod config;
pub mod entity;
pub mod errors;
pub mod query;
pub mod repository;
pub mod store;
