//! Translation of predicates into SQLite `WHERE` clauses.
//!
//! Equality filters read the payload field with `json_extract` and compare it as text, so
//! `?count=1` matches both `"count": 1` and `"count": "1"`. Booleans extract as `1` or `0`.
//! Range filters compare the timestamp columns directly. Every comparison value is a bound
//! parameter; the only names placed into the clause text are the allow-listed field name and
//! fixed column names.

use docbin_core::{
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Column, FieldName, Predicate, QueryVisitor, RangeOp},
};

use crate::identifier::json_path;

/// Predicates compiled into clause fragments and their bound values, in matching order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledFilter {
    /// Clause fragments, each with exactly one `?` placeholder.
    pub clauses: Vec<String>,
    /// Values bound to the placeholders, in order.
    pub values: Vec<String>,
}

impl CompiledFilter {
    /// Compiles a conjunction of predicates.
    pub fn compile(filter: &[Predicate]) -> DocumentStoreResult<Self> {
        let mut translator = SqlFilterTranslator;
        let mut compiled = CompiledFilter::default();

        for predicate in filter {
            let (clause, value) = translator.visit_predicate(predicate)?;
            compiled.clauses.push(clause);
            compiled.values.push(value);
        }

        Ok(compiled)
    }

    /// Returns the `WHERE` clause with a leading space, or an empty string when unfiltered.
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }
}

/// Translates a single predicate into a clause fragment and its bound value.
pub(crate) struct SqlFilterTranslator;

impl QueryVisitor for SqlFilterTranslator {
    type Output = (String, String);
    type Error = DocumentStoreError;

    fn visit_equality(&mut self, field: &FieldName, value: &str) -> Result<Self::Output, Self::Error> {
        Ok((
            format!("CAST(json_extract(data, '{}') AS TEXT) = ?", json_path(field)),
            value.to_string(),
        ))
    }

    fn visit_range(&mut self, column: Column, op: RangeOp, value: &str) -> Result<Self::Output, Self::Error> {
        Ok((
            format!("{} {} ?", column.as_str(), op.as_sql()),
            value.to_string(),
        ))
    }
}
