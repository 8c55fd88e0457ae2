use crate::errors::{ArtemisError, ArtemisResult, ErrorKind};
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

/// The declared result shape of a repository method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultShape {
    /// One entity or none.
    Single,
    /// Every entity, in store order.
    List,
    /// Every entity, in store order, as a general collection.
    Collection,
    /// Every distinct entity.
    Set,
    /// Every entity, smallest first.
    Queue,
    /// Every entity, as a single-pass iterator.
    Stream,
    /// The dispatch outcome itself.
    Raw,
}

/// What a repository invocation produced, before it is shaped.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Entities selected by a find or a literal query.
    Entities(Vec<T>),
    /// Entities written by `save` or `update`.
    Saved(Vec<T>),
    /// A delete completed.
    Done,
    /// The method was not recognized.
    Null,
}

impl<T> Outcome<T> {
    pub fn is_null(&self) -> bool {
        matches!(self, Outcome::Null)
    }

    /// The entities of the outcome; `Null` has none, `Done` is not a result.
    pub fn into_entities(self) -> Option<Vec<T>> {
        match self {
            Outcome::Entities(entities) | Outcome::Saved(entities) => Some(entities),
            Outcome::Null => Some(Vec::new()),
            Outcome::Done => None,
        }
    }
}

/// Converts the entities returned by a store into a declared result type.
///
/// # Characteristics
/// - Pure: the result depends only on the entities given
/// - `Option<T>` keeps the first entity, covering both an entity-or-null
///   and an optional return
/// - Sets deduplicate by value equality; queues order by `Ord`, smallest first
/// - Any type not listed falls back to [Outcome] itself
pub trait FromEntities<T>: Sized {
    const SHAPE: ResultShape;

    fn from_entities(entities: Vec<T>) -> Self;

    /// Shapes a dispatch outcome.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidOperation` when the outcome carries no entities,
    /// as after a delete.
    fn from_outcome(outcome: Outcome<T>) -> ArtemisResult<Self> {
        match outcome.into_entities() {
            Some(entities) => Ok(Self::from_entities(entities)),
            None => {
                log::error!("A {:?} result cannot be built from a completed delete", Self::SHAPE);
                Err(ArtemisError::new(
                    &format!("A {:?} result cannot be built from a completed delete", Self::SHAPE),
                    ErrorKind::InvalidOperation,
                ))
            }
        }
    }
}

impl<T> FromEntities<T> for Option<T> {
    const SHAPE: ResultShape = ResultShape::Single;

    fn from_entities(entities: Vec<T>) -> Self {
        entities.into_iter().next()
    }
}

impl<T> FromEntities<T> for Vec<T> {
    const SHAPE: ResultShape = ResultShape::List;

    fn from_entities(entities: Vec<T>) -> Self {
        entities
    }
}

impl<T> FromEntities<T> for VecDeque<T> {
    const SHAPE: ResultShape = ResultShape::Collection;

    fn from_entities(entities: Vec<T>) -> Self {
        VecDeque::from(entities)
    }
}

impl<T: Eq + Hash> FromEntities<T> for HashSet<T> {
    const SHAPE: ResultShape = ResultShape::Set;

    fn from_entities(entities: Vec<T>) -> Self {
        entities.into_iter().collect()
    }
}

impl<T: Ord> FromEntities<T> for BTreeSet<T> {
    const SHAPE: ResultShape = ResultShape::Set;

    fn from_entities(entities: Vec<T>) -> Self {
        entities.into_iter().collect()
    }
}

impl<T: Ord> FromEntities<T> for BinaryHeap<Reverse<T>> {
    const SHAPE: ResultShape = ResultShape::Queue;

    fn from_entities(entities: Vec<T>) -> Self {
        entities.into_iter().map(Reverse).collect()
    }
}

impl<T> FromEntities<T> for EntityStream<T> {
    const SHAPE: ResultShape = ResultShape::Stream;

    fn from_entities(entities: Vec<T>) -> Self {
        EntityStream {
            entities: entities.into_iter(),
        }
    }
}

impl<T> FromEntities<T> for Outcome<T> {
    const SHAPE: ResultShape = ResultShape::Raw;

    fn from_entities(entities: Vec<T>) -> Self {
        Outcome::Entities(entities)
    }

    fn from_outcome(outcome: Outcome<T>) -> ArtemisResult<Self> {
        Ok(outcome)
    }
}

/// A single-pass iterator over query results.
///
/// Consumed by iteration; it cannot be rewound or cloned.
pub struct EntityStream<T> {
    entities: std::vec::IntoIter<T>,
}

impl<T> Iterator for EntityStream<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.entities.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entities.size_hint()
    }
}

impl<T> ExactSizeIterator for EntityStream<T> {}

impl<T: Debug> Debug for EntityStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStream")
            .field("remaining", &self.entities.as_slice())
            .finish()
    }
}
