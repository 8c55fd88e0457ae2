use crate::common::{Document, Value};
use std::fmt::{Display, Formatter};

/// The store-side form of an entity: the collection it lives in, its key and
/// its columns.
///
/// # Characteristics
/// - `key` is the value of the entity's id column, when it declares one;
///   stores use it to upsert
/// - Records without a key are appended; the in-memory store assigns one
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    collection: String,
    key: Option<Value>,
    document: Document,
}

impl Record {
    pub fn new(collection: &str, key: Option<Value>, document: Document) -> Self {
        Record {
            collection: collection.to_string(),
            key,
            document,
        }
    }

    /// Creates a keyless record, as a driver returns from a literal query.
    pub fn of(collection: &str, document: Document) -> Self {
        Record::new(collection, None, document)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn key(&self) -> Option<&Value> {
        self.key.as_ref()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub(crate) fn with_key(mut self, key: Value) -> Self {
        self.key = Some(key);
        self
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}[{}] {}", self.collection, key, self.document),
            None => write!(f, "{} {}", self.collection, self.document),
        }
    }
}
