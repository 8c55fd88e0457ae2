use crate::common::Value;
use crate::errors::{ArtemisError, ArtemisResult, ErrorKind};
use crate::query::ConsistencyLevel;
use std::time::Duration;

/// One argument of a repository method invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument<T> {
    /// A query parameter, or a bind parameter of a literal query.
    Param(Value),
    /// An entity to save or update.
    Entity(T),
    /// Entities to save or update in one call.
    Entities(Vec<T>),
    /// Time to live of the saved entities.
    Ttl(Duration),
    /// Consistency requested for this invocation.
    Consistency(ConsistencyLevel),
}

/// The ordered arguments of a repository method invocation.
///
/// ```rust,ignore
/// let args = Args::new().param("Ada").consistency(ConsistencyLevel::One);
/// let people: Vec<Person> = proxy.call("findByName", args)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Args<T> {
    items: Vec<Argument<T>>,
}

impl<T> Default for Args<T> {
    fn default() -> Self {
        Args { items: Vec::new() }
    }
}

impl<T> Args<T> {
    pub fn new() -> Self {
        Args::default()
    }

    pub fn param<V: Into<Value>>(mut self, value: V) -> Self {
        self.items.push(Argument::Param(value.into()));
        self
    }

    pub fn entity(mut self, entity: T) -> Self {
        self.items.push(Argument::Entity(entity));
        self
    }

    pub fn entities(mut self, entities: Vec<T>) -> Self {
        self.items.push(Argument::Entities(entities));
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.items.push(Argument::Ttl(ttl));
        self
    }

    pub fn consistency(mut self, consistency: ConsistencyLevel) -> Self {
        self.items.push(Argument::Consistency(consistency));
        self
    }

    pub fn push(&mut self, argument: Argument<T>) {
        self.items.push(argument);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn into_invocation(self) -> Invocation<T> {
        let mut invocation = Invocation {
            params: Vec::new(),
            entities: None,
            ttl: None,
            consistency: None,
        };
        for item in self.items {
            match item {
                Argument::Param(value) => invocation.params.push(value),
                Argument::Entity(entity) => {
                    invocation.entities.get_or_insert_with(Vec::new).push(entity)
                }
                Argument::Entities(entities) => {
                    invocation.entities.get_or_insert_with(Vec::new).extend(entities)
                }
                Argument::Ttl(ttl) => invocation.ttl = Some(ttl),
                Argument::Consistency(consistency) => invocation.consistency = Some(consistency),
            }
        }
        invocation
    }
}

impl<T> FromIterator<Argument<T>> for Args<T> {
    fn from_iter<I: IntoIterator<Item = Argument<T>>>(iter: I) -> Self {
        Args {
            items: iter.into_iter().collect(),
        }
    }
}

/// Arguments of one invocation, grouped by role.
pub(crate) struct Invocation<T> {
    pub(crate) params: Vec<Value>,
    pub(crate) entities: Option<Vec<T>>,
    pub(crate) ttl: Option<Duration>,
    pub(crate) consistency: Option<ConsistencyLevel>,
}

impl<T> Invocation<T> {
    /// Fails when a consistency was requested for a method that cannot carry one.
    pub(crate) fn forbid_consistency(&self, method: &str) -> ArtemisResult<()> {
        match self.consistency {
            Some(consistency) => {
                log::error!("Method {} cannot run at consistency {:?}", method, consistency);
                Err(ArtemisError::new(
                    &format!("Method {} cannot run at consistency {:?}", method, consistency),
                    ErrorKind::DynamicQueryError,
                ))
            }
            None => Ok(()),
        }
    }

    /// Entities passed to `save` or `update`; failing when there are none.
    pub(crate) fn require_entities(&mut self, method: &str) -> ArtemisResult<Vec<T>> {
        match self.entities.take() {
            Some(entities) => Ok(entities),
            None => {
                log::error!("Method {} needs an entity argument", method);
                Err(ArtemisError::new(
                    &format!("Method {} needs an entity argument", method),
                    ErrorKind::DynamicQueryError,
                ))
            }
        }
    }
}
