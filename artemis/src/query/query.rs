use crate::common::{Document, SortOrder};
use crate::query::{Condition, ConsistencyLevel};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// One ordering key of a [Query].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    column: String,
    order: SortOrder,
}

impl Sort {
    pub fn new(column: &str, order: SortOrder) -> Self {
        Sort {
            column: column.to_string(),
            order,
        }
    }

    pub fn asc(column: &str) -> Self {
        Sort::new(column, SortOrder::Ascending)
    }

    pub fn desc(column: &str) -> Self {
        Sort::new(column, SortOrder::Descending)
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }
}

/// Compares two documents by a list of sort keys, first key first.
pub fn compare_documents(sorts: &[Sort], a: &Document, b: &Document) -> Ordering {
    for sort in sorts {
        let ordering = a.get(sort.column()).cmp(&b.get(sort.column()));
        let ordering = match sort.order() {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// A store-agnostic select: which collection, which rows, in what order, how
/// many.
///
/// # Characteristics
/// - No condition selects every record of the collection
/// - `skip` applies before `limit`; a limit of `None` is unbounded
/// - The consistency level is a hint stores may ignore
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    collection: String,
    condition: Option<Condition>,
    sorts: Vec<Sort>,
    skip: usize,
    limit: Option<usize>,
    consistency: Option<ConsistencyLevel>,
}

impl Query {
    /// Selects everything in `collection`.
    pub fn new(collection: &str) -> Self {
        Query {
            collection: collection.to_string(),
            condition: None,
            sorts: Vec::new(),
            skip: 0,
            limit: None,
            consistency: None,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn set_consistency(&mut self, consistency: ConsistencyLevel) {
        self.consistency = Some(consistency);
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    pub fn skip_count(&self) -> usize {
        self.skip
    }

    pub fn limit_count(&self) -> Option<usize> {
        self.limit
    }

    pub fn consistency(&self) -> Option<ConsistencyLevel> {
        self.consistency
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "select from {}", self.collection)?;
        if let Some(condition) = &self.condition {
            write!(f, " where {}", condition)?;
        }
        for (i, sort) in self.sorts.iter().enumerate() {
            let order = match sort.order {
                SortOrder::Ascending => "asc",
                SortOrder::Descending => "desc",
            };
            let prefix = if i == 0 { " order by" } else { "," };
            write!(f, "{} {} {}", prefix, sort.column, order)?;
        }
        if self.skip > 0 {
            write!(f, " skip {}", self.skip)?;
        }
        if let Some(limit) = self.limit {
            write!(f, " limit {}", limit)?;
        }
        Ok(())
    }
}

/// A store-agnostic delete: which collection and which rows.
///
/// No condition deletes every record of the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteQuery {
    collection: String,
    condition: Option<Condition>,
    consistency: Option<ConsistencyLevel>,
}

impl DeleteQuery {
    pub fn new(collection: &str) -> Self {
        DeleteQuery {
            collection: collection.to_string(),
            condition: None,
            consistency: None,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn set_consistency(&mut self, consistency: ConsistencyLevel) {
        self.consistency = Some(consistency);
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn consistency(&self) -> Option<ConsistencyLevel> {
        self.consistency
    }
}

impl Display for DeleteQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "delete from {}", self.collection)?;
        if let Some(condition) = &self.condition {
            write!(f, " where {}", condition)?;
        }
        Ok(())
    }
}
