use crate::common::{SortOrder, Value};
use crate::entity::{EntityMetadata, FieldMapping};
use crate::errors::{ArtemisError, ArtemisResult, ErrorKind};
use crate::query::tokenizer::{split_words, Words};
use crate::query::{Condition, DeleteQuery, Query, Sort};

/// Translates derived-query method names into query descriptors.
///
/// Method names are split into words (`findByNameAndAgeGreaterThan` and
/// `find_by_name_and_age_greater_than` both give
/// `find by name and age greater than`) and parsed with this grammar:
///
/// ```text
/// find        := 'find' limit? 'by' predicate? order?
/// delete      := 'delete' 'by' predicate?
/// limit       := ('first' | 'top') NUMBER?
/// predicate   := conjunction ('or' conjunction)*
/// conjunction := clause ('and' clause)*
/// clause      := field operator?
/// operator    := 'not' | 'greater' 'than' | 'greater' 'equal' 'than'
///              | 'less' 'than' | 'less' 'equal' 'than' | 'between'
///              | 'like' | 'in' | 'equals'
/// order       := 'order' 'by' (field ('asc' | 'desc')?)+
/// ```
///
/// Fields are matched against the entity's field names, longest match first,
/// and replaced by their column names. Every clause consumes one parameter,
/// `between` consumes two, and the parameter count must match exactly.
pub struct QueryParser;

impl QueryParser {
    /// Parses a `findBy…` method into a [Query].
    ///
    /// # Errors
    ///
    /// Returns a `DynamicQueryError` for an unknown field, a malformed name,
    /// or a parameter count that differs from what the name implies.
    pub fn parse_find(
        method: &str,
        params: &[Value],
        metadata: &EntityMetadata,
    ) -> ArtemisResult<Query> {
        let mut parser = Parser::new(method, params, metadata);
        let query = parser.find()?;
        log::debug!("Method {} translated to: {}", method, query);
        Ok(query)
    }

    /// Parses a `deleteBy…` method into a [DeleteQuery].
    ///
    /// # Errors
    ///
    /// Same as [QueryParser::parse_find].
    pub fn parse_delete(
        method: &str,
        params: &[Value],
        metadata: &EntityMetadata,
    ) -> ArtemisResult<DeleteQuery> {
        let mut parser = Parser::new(method, params, metadata);
        let query = parser.delete()?;
        log::debug!("Method {} translated to: {}", method, query);
        Ok(query)
    }
}

struct Parser<'a> {
    method: &'a str,
    words: Words,
    pos: usize,
    params: &'a [Value],
    next_param: usize,
    metadata: &'a EntityMetadata,
}

impl<'a> Parser<'a> {
    fn new(method: &'a str, params: &'a [Value], metadata: &'a EntityMetadata) -> Self {
        Parser {
            method,
            words: split_words(method),
            pos: 0,
            params,
            next_param: 0,
            metadata,
        }
    }

    fn find(&mut self) -> ArtemisResult<Query> {
        self.expect("find")?;
        let limit = self.limit()?;
        self.expect("by")?;

        let mut query = Query::new(self.metadata.name());
        if let Some(condition) = self.optional_predicate()? {
            query = query.with_condition(condition);
        }
        for sort in self.order()? {
            query = query.sort(sort);
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        self.finish()?;
        Ok(query)
    }

    fn delete(&mut self) -> ArtemisResult<DeleteQuery> {
        self.expect("delete")?;
        self.expect("by")?;

        let mut query = DeleteQuery::new(self.metadata.name());
        if let Some(condition) = self.optional_predicate()? {
            query = query.with_condition(condition);
        }
        self.finish()?;
        Ok(query)
    }

    fn limit(&mut self) -> ArtemisResult<Option<usize>> {
        if !(self.accept("first") || self.accept("top")) {
            return Ok(None);
        }
        match self.peek().map(|w| w.parse::<usize>()) {
            Some(Ok(n)) => {
                self.pos += 1;
                Ok(Some(n))
            }
            _ => Ok(Some(1)),
        }
    }

    fn optional_predicate(&mut self) -> ArtemisResult<Option<Condition>> {
        match self.peek() {
            None => Ok(None),
            Some("order") if self.peek_at(1) == Some("by") => Ok(None),
            Some(_) => self.predicate().map(Some),
        }
    }

    fn predicate(&mut self) -> ArtemisResult<Condition> {
        let mut condition = self.conjunction()?;
        while self.accept("or") {
            condition = condition.or(self.conjunction()?);
        }
        Ok(condition)
    }

    fn conjunction(&mut self) -> ArtemisResult<Condition> {
        let mut condition = self.clause()?;
        while self.accept("and") {
            condition = condition.and(self.clause()?);
        }
        Ok(condition)
    }

    fn clause(&mut self) -> ArtemisResult<Condition> {
        let column = self.field()?.column_name().to_string();

        if self.accept("not") {
            let value = self.param()?;
            return Ok(Condition::NotEq { column, value });
        }
        if self.accept("greater") {
            let inclusive = self.comparison_suffix()?;
            let value = self.param()?;
            return Ok(if inclusive {
                Condition::Gte { column, value }
            } else {
                Condition::Gt { column, value }
            });
        }
        if self.accept("less") {
            let inclusive = self.comparison_suffix()?;
            let value = self.param()?;
            return Ok(if inclusive {
                Condition::Lte { column, value }
            } else {
                Condition::Lt { column, value }
            });
        }
        if self.accept("between") {
            let lower = self.param()?;
            let upper = self.param()?;
            return Ok(Condition::Between { column, lower, upper });
        }
        if self.accept("like") {
            return match self.param()? {
                Value::String(pattern) => Ok(Condition::Like { column, pattern }),
                other => Err(self.error(&format!(
                    "like on '{}' needs a string parameter, got {}",
                    column, other
                ))),
            };
        }
        if self.accept("in") {
            return match self.param()? {
                Value::Array(values) => Ok(Condition::In { column, values }),
                other => Err(self.error(&format!(
                    "in on '{}' needs an array parameter, got {}",
                    column, other
                ))),
            };
        }

        self.accept("equals");
        let value = self.param()?;
        Ok(Condition::Eq { column, value })
    }

    /// Consumes the rest of `greater …`/`less …`; true when inclusive.
    ///
    /// Accepts both `equal than` and `than equal`.
    fn comparison_suffix(&mut self) -> ArtemisResult<bool> {
        if self.accept("equal") {
            self.expect("than")?;
            return Ok(true);
        }
        self.expect("than")?;
        Ok(self.accept("equal"))
    }

    fn order(&mut self) -> ArtemisResult<Vec<Sort>> {
        let mut sorts = Vec::new();
        if !self.accept("order") {
            return Ok(sorts);
        }
        self.expect("by")?;
        loop {
            let column = self.field()?.column_name().to_string();
            let order = if self.accept("desc") {
                SortOrder::Descending
            } else {
                self.accept("asc");
                SortOrder::Ascending
            };
            sorts.push(Sort::new(&column, order));
            if self.peek().is_none() {
                break;
            }
            // "OrderByAgeDescAndName" reads naturally, allow the connector
            self.accept("and");
        }
        Ok(sorts)
    }

    /// Longest entity field whose words start at the current position.
    fn field(&mut self) -> ArtemisResult<&'a FieldMapping> {
        let remaining = &self.words[self.pos..];
        let metadata: &'a EntityMetadata = self.metadata;
        let best = metadata
            .fields()
            .iter()
            .filter(|f| !f.words().is_empty() && remaining.starts_with(f.words()))
            .max_by_key(|f| f.words().len());

        match best {
            Some(field) => {
                self.pos += field.words().len();
                Ok(field)
            }
            None => {
                let found = match self.peek() {
                    Some(word) => format!("no field matching '{}'", word),
                    None => "a field name is missing".to_string(),
                };
                Err(self.error(&format!("{} on entity {}", found, self.metadata.name())))
            }
        }
    }

    fn param(&mut self) -> ArtemisResult<Value> {
        match self.params.get(self.next_param) {
            Some(value) => {
                self.next_param += 1;
                Ok(value.clone())
            }
            None => Err(self.error(&format!(
                "expects more than the {} parameter(s) given",
                self.params.len()
            ))),
        }
    }

    fn finish(&self) -> ArtemisResult<()> {
        if let Some(word) = self.peek() {
            return Err(self.error(&format!("unexpected '{}'", word)));
        }
        if self.next_param != self.params.len() {
            return Err(self.error(&format!(
                "takes {} parameter(s) but {} were given",
                self.next_param,
                self.params.len()
            )));
        }
        Ok(())
    }

    fn peek(&self) -> Option<&str> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<&str> {
        self.words.get(self.pos + offset).map(String::as_str)
    }

    fn accept(&mut self, word: &str) -> bool {
        if self.peek() == Some(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, word: &str) -> ArtemisResult<()> {
        if self.accept(word) {
            return Ok(());
        }
        let found = self.peek().unwrap_or("end of name").to_string();
        Err(self.error(&format!("expected '{}' but found '{}'", word, found)))
    }

    fn error(&self, message: &str) -> ArtemisError {
        log::error!("Invalid query method {}: {}", self.method, message);
        ArtemisError::new(
            &format!("Invalid query method {}: {}", self.method, message),
            ErrorKind::DynamicQueryError,
        )
    }
}
