//! Filter compilation from query parameters into a tagged predicate list.
//!
//! Inbound query parameters are untrusted and schema-less. [`ListQuery::from_params`] turns
//! them into a [`ListQuery`]: a [`Pagination`] window plus an ordered list of [`Predicate`]s
//! that are implicitly joined with AND.
//!
//! # Parameter rules
//!
//! - `limit` and `offset` are pagination controls, never filters.
//! - `created_gt`, `created_gte`, `created_lt`, `created_lte` and the four matching
//!   `updated_*` keys are range filters over the timestamp columns.
//! - Every other key is an equality filter over the top-level payload field of that name,
//!   compared as text. Keys outside the [`FieldName`] allow-list are dropped silently.
//!
//! Only the first value of a repeated key is used. Backends translate predicates with a
//! [`QueryVisitor`], which keeps value binding in one place per engine.
//!
//! ```ignore
//! use docbin::query::{ListQuery, QueryParams};
//!
//! let params: QueryParams = vec![
//!     ("color".into(), "red".into()),
//!     ("created_gte".into(), "2024-01-01".into()),
//!     ("limit".into(), "5".into()),
//! ];
//! let query = ListQuery::from_params(&params);
//!
//! assert_eq!(query.filter.len(), 2);
//! assert_eq!(query.pagination.limit, 5);
//! ```

use std::{collections::HashSet, fmt};

use tracing::trace;

use crate::{
    error::DocumentStoreError,
    page::{LIMIT_PARAM, OFFSET_PARAM, Pagination},
};

/// Ordered, possibly repeated query parameters as delivered by the transport.
pub type QueryParams = Vec<(String, String)>;

/// Timestamp columns available to range filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Insertion time.
    Created,
    /// Last write time.
    Updated,
}

impl Column {
    /// The storage column name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Created => "created",
            Column::Updated => "updated",
        }
    }
}

/// Comparison operators for range filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOp {
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Lte,
}

impl RangeOp {
    /// The SQL comparison operator.
    pub fn as_sql(&self) -> &'static str {
        match self {
            RangeOp::Gt => ">",
            RangeOp::Gte => ">=",
            RangeOp::Lt => "<",
            RangeOp::Lte => "<=",
        }
    }
}

/// Reserved range-filter keys, in the order they are checked.
pub const RANGE_PARAMS: [(&str, Column, RangeOp); 8] = [
    ("created_gt", Column::Created, RangeOp::Gt),
    ("created_gte", Column::Created, RangeOp::Gte),
    ("created_lt", Column::Created, RangeOp::Lt),
    ("created_lte", Column::Created, RangeOp::Lte),
    ("updated_gt", Column::Updated, RangeOp::Gt),
    ("updated_gte", Column::Updated, RangeOp::Gte),
    ("updated_lt", Column::Updated, RangeOp::Lt),
    ("updated_lte", Column::Updated, RangeOp::Lte),
];

/// An identifier that passed the allow-list: non-empty, ASCII alphanumeric or underscore.
///
/// Only values of this type, and collection names checked by the same rule, are ever
/// embedded into statement text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldName(String);

impl FieldName {
    /// Validates `name` against the allow-list.
    pub fn parse(name: &str) -> Option<Self> {
        if is_allowed_identifier(name) {
            Some(Self(name.to_string()))
        } else {
            None
        }
    }

    /// Returns the validated name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns `true` if `name` is non-empty and consists of ASCII alphanumerics and underscores.
pub fn is_allowed_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// A single filter condition. Values are always bound, never interpolated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// The payload field, read as text, equals `value`.
    Equality {
        /// The allow-listed top-level field.
        field: FieldName,
        /// The comparison value.
        value: String,
    },
    /// A timestamp column compared against `value`.
    Range {
        /// The timestamp column.
        column: Column,
        /// The comparison operator.
        op: RangeOp,
        /// The comparison value.
        value: String,
    },
}

impl Predicate {
    /// Creates an equality predicate.
    pub fn eq(field: FieldName, value: impl Into<String>) -> Self {
        Predicate::Equality {
            field,
            value: value.into(),
        }
    }

    /// Creates a range predicate.
    pub fn range(column: Column, op: RangeOp, value: impl Into<String>) -> Self {
        Predicate::Range {
            column,
            op,
            value: value.into(),
        }
    }
}

/// A compiled list request: a conjunction of predicates and a pagination window.
///
/// Results are always ordered by creation time, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Predicates joined with AND. Empty means no filtering.
    pub filter: Vec<Predicate>,
    /// The window to return.
    pub pagination: Pagination,
}

impl ListQuery {
    /// Creates an unfiltered query with default pagination.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new query builder.
    pub fn builder() -> ListQueryBuilder {
        ListQueryBuilder::new()
    }

    /// Compiles query parameters into a list query.
    ///
    /// Range filters are emitted first, in [`RANGE_PARAMS`] order, followed by equality
    /// filters in the order their keys first appear. Range keys with an empty value are
    /// skipped; equality keys with an empty value match fields equal to the empty string.
    pub fn from_params(params: &[(String, String)]) -> Self {
        let first = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        let mut builder = ListQuery::builder().pagination(Pagination::from_raw(
            first(LIMIT_PARAM),
            first(OFFSET_PARAM),
        ));

        for (key, column, op) in RANGE_PARAMS {
            if let Some(value) = first(key).filter(|value| !value.is_empty()) {
                builder = builder.filter(Predicate::range(column, op, value));
            }
        }

        let mut seen = HashSet::new();

        for (key, value) in params {
            if is_reserved(key) || !seen.insert(key.as_str()) {
                continue;
            }

            match FieldName::parse(key) {
                Some(field) => builder = builder.filter(Predicate::eq(field, value.as_str())),
                None => trace!("Ignoring filter key outside the allow-list: {:?}", key),
            }
        }

        builder.build()
    }
}

fn is_reserved(key: &str) -> bool {
    key == LIMIT_PARAM
        || key == OFFSET_PARAM
        || RANGE_PARAMS
            .iter()
            .any(|(name, _, _)| *name == key)
}

/// Builder for [`ListQuery`].
#[derive(Debug, Clone, Default)]
pub struct ListQueryBuilder {
    query: ListQuery,
}

impl ListQueryBuilder {
    /// Creates a new query builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a predicate to the conjunction.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.query.filter.push(predicate);
        self
    }

    /// Sets the pagination window.
    pub fn pagination(mut self, pagination: Pagination) -> Self {
        self.query.pagination = pagination;
        self
    }

    /// Sets the page size, clamped like any other limit.
    pub fn limit(mut self, limit: usize) -> Self {
        self.query.pagination = Pagination::new(limit, self.query.pagination.offset);
        self
    }

    /// Sets the number of documents to skip.
    pub fn offset(mut self, offset: usize) -> Self {
        self.query.pagination.offset = offset;
        self
    }

    /// Builds the final query.
    pub fn build(self) -> ListQuery {
        self.query
    }
}

/// Translates predicates into an engine-native form.
pub trait QueryVisitor {
    type Output;
    type Error: Into<DocumentStoreError>;

    fn visit_equality(&mut self, field: &FieldName, value: &str) -> Result<Self::Output, Self::Error>;
    fn visit_range(
        &mut self,
        column: Column,
        op: RangeOp,
        value: &str,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_predicate(&mut self, predicate: &Predicate) -> Result<Self::Output, Self::Error> {
        match predicate {
            Predicate::Equality { field, value } => self.visit_equality(field, value),
            Predicate::Range { column, op, value } => self.visit_range(*column, *op, value),
        }
    }
}
