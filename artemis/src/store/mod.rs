//! Store contracts and the in-memory store.
//!
//! Repositories talk to a backing store only through [Store] and
//! [AsyncStore]; a driver binding implements one or both. [MemoryStore]
//! implements both and backs the tests, including live queries.

mod live;
mod memory;
mod record;
#[allow(clippy::module_inception)]
mod store;

pub use live::*;
pub use memory::*;
pub use record::*;
pub use store::*;
