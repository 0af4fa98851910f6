//! Structured relational queries.
//!
//! The query service describes what it wants with these types and the store
//! adapter turns them into its own dialect, so matching policy stays out of
//! the adapter.

use listings_search_shared::EntityKind;

/// Columns a listing query may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Title,
    Description,
    CompanyName,
    City,
    Country,
    RegionCode,
    Remote,
    Online,
    Skills,
    Tags,
    /// `salary_min`, falling back to `salary_max`.
    SalaryFloor,
    Currency,
    Experience,
    PostedAt,
    StartsAt,
}

/// A literal compared against a column.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Bool(bool),
    Int(i64),
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

/// A boolean condition over one listing row.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Equality; text compares case-insensitively.
    Eq(Column, Scalar),
    /// Case-insensitive substring match on a text column.
    Contains(Column, String),
    /// Array column holds the element (case-insensitive).
    HasElement(Column, String),
    /// Numeric column is at least the value.
    Gte(Column, i64),
    /// At least one of the predicates holds. Empty means false.
    Any(Vec<Predicate>),
    /// All of the predicates hold. Empty means true.
    All(Vec<Predicate>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Sort key; rows with a null value always sort last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: Column,
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(column: Column) -> Self {
        Self {
            column,
            direction: Direction::Asc,
        }
    }

    pub fn desc(column: Column) -> Self {
        Self {
            column,
            direction: Direction::Desc,
        }
    }
}

/// A filtered, ordered listing query.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreQuery {
    pub kind: EntityKind,
    /// Conjunction.
    pub predicates: Vec<Predicate>,
    /// Applied in order, then by id for a stable window.
    pub order: Vec<OrderBy>,
}

impl StoreQuery {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            predicates: Vec::new(),
            order: Vec::new(),
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order.push(order);
        self
    }
}
