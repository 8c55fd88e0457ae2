use crate::query::{split_words, LiteralQuery};
use std::collections::HashMap;

/// How a repository method is dispatched.
///
/// Classification happens once, when the repository's proxy is built, and
/// follows this precedence: a literal query wins over everything, then the
/// reserved names `save` and `update`, then the `deleteBy` and `findBy`
/// prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Literal,
    Save,
    Update,
    DeleteBy,
    FindBy,
    Unrecognized,
}

impl MethodKind {
    /// Classifies a method that carries no literal query.
    ///
    /// `findBy`, `findFirstBy` and `findTop10By` (and their snake_case
    /// spellings) are all finds; `finder` or `findAll` are not.
    pub fn of(name: &str) -> MethodKind {
        match name {
            "save" => return MethodKind::Save,
            "update" => return MethodKind::Update,
            _ => {}
        }

        let words = split_words(name);
        match words.first().map(String::as_str) {
            Some("find") if words.iter().any(|w| w == "by") => MethodKind::FindBy,
            Some("delete") if words.get(1).map(String::as_str) == Some("by") => {
                MethodKind::DeleteBy
            }
            _ => MethodKind::Unrecognized,
        }
    }
}

/// One declared method of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryMethod {
    name: String,
    literal: Option<LiteralQuery>,
    kind: MethodKind,
}

impl RepositoryMethod {
    /// Declares a method dispatched by its name.
    pub fn new(name: &str) -> Self {
        RepositoryMethod {
            name: name.to_string(),
            literal: None,
            kind: MethodKind::of(name),
        }
    }

    /// Declares a method that executes `query` whatever its name says.
    pub fn with_query(name: &str, query: LiteralQuery) -> Self {
        RepositoryMethod {
            name: name.to_string(),
            literal: Some(query),
            kind: MethodKind::Literal,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn literal(&self) -> Option<&LiteralQuery> {
        self.literal.as_ref()
    }

    pub fn kind(&self) -> MethodKind {
        self.kind
    }
}

/// The dispatch table of one repository, keyed by method name.
///
/// Names missing from the table are classified on the fly, so undeclared
/// `findBy…` methods still work; only declared methods can carry a literal
/// query.
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    methods: HashMap<String, RepositoryMethod>,
}

impl MethodTable {
    pub fn new(methods: Vec<RepositoryMethod>) -> Self {
        let mut table = HashMap::with_capacity(methods.len());
        for method in methods {
            if table.contains_key(method.name()) {
                log::warn!("Repository method {} declared twice, keeping the last one", method.name());
            }
            table.insert(method.name.clone(), method);
        }
        MethodTable { methods: table }
    }

    pub fn resolve(&self, name: &str) -> RepositoryMethod {
        match self.methods.get(name) {
            Some(method) => method.clone(),
            None => RepositoryMethod::new(name),
        }
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
