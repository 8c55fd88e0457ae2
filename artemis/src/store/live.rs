use crate::common::Document;
use crate::errors::ArtemisResult;
use crate::query::{Condition, LiteralQuery, Params, Query};
use crate::store::Record;
use dashmap::DashMap;
use std::sync::Arc;

/// Callback invoked for every record a live query matches.
///
/// It may run many times and on any thread, so it is shared rather than
/// consumed.
pub type LiveCallback = Arc<dyn Fn(ArtemisResult<Record>) + Send + Sync + 'static>;

/// What a live subscription listens for.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveQuery {
    /// Records written to the query's collection that satisfy its condition.
    /// Sorting, skip and limit have no meaning here and are ignored.
    Query(Query),
    /// A store-native live query with bound parameters.
    Literal(LiteralQuery, Params),
}

/// Handle of a live subscription, used to cancel it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: String,
}

impl Subscription {
    pub fn new() -> Self {
        Subscription {
            id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Subscription::new()
    }
}

struct Listener {
    collection: String,
    condition: Option<Condition>,
    callback: LiveCallback,
}

/// Live listeners of a store, notified of every written record.
///
/// Callbacks run on the writer's thread, after the write, and outside any
/// internal lock, so a callback may subscribe or unsubscribe.
#[derive(Default)]
pub(crate) struct LiveListeners {
    listeners: DashMap<Subscription, Listener>,
}

impl LiveListeners {
    pub(crate) fn register(&self, query: &Query, callback: LiveCallback) -> Subscription {
        let subscription = Subscription::new();
        self.listeners.insert(
            subscription.clone(),
            Listener {
                collection: query.collection().to_string(),
                condition: query.condition().cloned(),
                callback,
            },
        );
        log::debug!("Live query {} registered on {}", subscription.id(), query.collection());
        subscription
    }

    pub(crate) fn deregister(&self, subscription: &Subscription) -> bool {
        self.listeners.remove(subscription).is_some()
    }

    pub(crate) fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn publish(&self, record: &Record) {
        if !self.has_listeners() {
            return;
        }

        let targets: Vec<(LiveCallback, ArtemisResult<bool>)> = self
            .listeners
            .iter()
            .filter(|l| l.collection == record.collection())
            .map(|l| (Arc::clone(&l.callback), accepts(l.condition.as_ref(), record.document())))
            .collect();

        for (callback, accepted) in targets {
            match accepted {
                Ok(true) => callback(Ok(record.clone())),
                Ok(false) => {}
                Err(e) => callback(Err(e)),
            }
        }
    }

    pub(crate) fn clear(&self) {
        self.listeners.clear();
    }
}

fn accepts(condition: Option<&Condition>, document: &Document) -> ArtemisResult<bool> {
    match condition {
        Some(condition) => condition.matches(document),
        None => Ok(true),
    }
}
