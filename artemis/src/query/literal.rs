use crate::common::{Document, Value};
use std::fmt::{Display, Formatter};

/// Native query dialect of a backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryLanguage {
    /// Column store query language.
    Cql,
    /// Document store query language; accepts named parameters.
    N1ql,
    /// SQL dialect of the graph/document hybrid store.
    OrientSql,
    /// JSON query DSL of the search engine.
    SearchDsl,
}

impl Display for QueryLanguage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryLanguage::Cql => write!(f, "CQL"),
            QueryLanguage::N1ql => write!(f, "N1QL"),
            QueryLanguage::OrientSql => write!(f, "OrientDB SQL"),
            QueryLanguage::SearchDsl => write!(f, "Search DSL"),
        }
    }
}

/// Read/write consistency requested from a column store.
///
/// Carried on query descriptors as a hint; the repository layer never
/// enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsistencyLevel {
    Any,
    One,
    Two,
    Three,
    Quorum,
    All,
    LocalQuorum,
    EachQuorum,
    Serial,
    LocalSerial,
    LocalOne,
}

/// A store-native query attached to a repository method.
///
/// When a method carries one, dispatch executes it verbatim and ignores the
/// method name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LiteralQuery {
    language: QueryLanguage,
    text: String,
}

impl LiteralQuery {
    pub fn new(language: QueryLanguage, text: &str) -> Self {
        LiteralQuery {
            language,
            text: text.to_string(),
        }
    }

    pub fn cql(text: &str) -> Self {
        LiteralQuery::new(QueryLanguage::Cql, text)
    }

    pub fn n1ql(text: &str) -> Self {
        LiteralQuery::new(QueryLanguage::N1ql, text)
    }

    pub fn orient_sql(text: &str) -> Self {
        LiteralQuery::new(QueryLanguage::OrientSql, text)
    }

    pub fn search(text: &str) -> Self {
        LiteralQuery::new(QueryLanguage::SearchDsl, text)
    }

    pub fn language(&self) -> QueryLanguage {
        self.language
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Display for LiteralQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.language, self.text)
    }
}

/// Bind parameters for a [LiteralQuery].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Params {
    /// Bound in order to `?` placeholders.
    Positional(Vec<Value>),
    /// Bound by name to `$name` placeholders.
    Named(Document),
    #[default]
    None,
}

impl Params {
    /// Builds the parameters from a method's positional arguments.
    ///
    /// A document argument switches to named binding: the first document
    /// found is used as the parameter map and the other arguments are
    /// ignored.
    pub fn from_values(values: Vec<Value>) -> Self {
        if values.is_empty() {
            return Params::None;
        }
        let named = values.iter().find_map(|v| v.as_document().cloned());
        match named {
            Some(document) => Params::Named(document),
            None => Params::Positional(values),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Params::Positional(values) => values.is_empty(),
            Params::Named(document) => document.is_empty(),
            Params::None => true,
        }
    }
}
