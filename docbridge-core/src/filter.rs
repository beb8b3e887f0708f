//! Filter criteria: the declarative building blocks of repository queries.
//!
//! A query is an ordered list of [`FilterCriterion`] values joined by a
//! single [`Combinator`]. Criteria are plain data; they are resolved against
//! an entity type and turned into an executable predicate by the
//! [`PredicateCompiler`](crate::predicate::PredicateCompiler).
//!
//! # Example
//!
//! ```ignore
//! use docbridge_core::filter::{Combinator, FilterCriterion};
//!
//! let criteria = vec![
//!     FilterCriterion::eq("status", "active"),
//!     FilterCriterion::gt("age", 18i64),
//! ];
//! // compiled with Combinator::And: status == "active" && age > 18
//! ```

use bson::Bson;

/// Comparison operators a criterion can apply to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal to (exact match).
    Eq,
    /// Not equal to.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Lte,
    /// Substring match on text fields, element membership on array fields.
    Contains,
    /// Field value is a member of the provided value set.
    In,
}

/// The boolean operator merging all criteria of one compilation call.
///
/// One combinator applies uniformly across the entire criteria list; mixed
/// or grouped boolean trees are not supported. Nested logic is composed from
/// multiple repository calls at a higher layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    /// Every criterion must match.
    #[default]
    And,
    /// At least one criterion must match.
    Or,
}

/// One comparison to apply against a field of the target entity type.
///
/// A criterion is an immutable value: a field name, an operator, and the
/// comparison operand. It owns no resources and is discarded after predicate
/// compilation. The field must name a declared property of the entity type
/// (or the identity field); resolution happens at predicate build time and
/// an unknown name is a build failure, never a silent no-match.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriterion {
    /// The serialized field name to compare.
    pub field: String,
    /// The comparison operator.
    pub operator: CompareOp,
    /// The comparison operand.
    pub value: Bson,
}

impl FilterCriterion {
    /// Creates a criterion from its parts.
    pub fn new(field: impl Into<String>, operator: CompareOp, value: impl Into<Bson>) -> Self {
        FilterCriterion { field: field.into(), operator, value: value.into() }
    }

    /// Creates an equality criterion.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new(field, CompareOp::Eq, value)
    }

    /// Creates a not-equal criterion.
    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new(field, CompareOp::Ne, value)
    }

    /// Creates a greater-than criterion.
    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new(field, CompareOp::Gt, value)
    }

    /// Creates a greater-than-or-equal criterion.
    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new(field, CompareOp::Gte, value)
    }

    /// Creates a less-than criterion.
    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new(field, CompareOp::Lt, value)
    }

    /// Creates a less-than-or-equal criterion.
    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new(field, CompareOp::Lte, value)
    }

    /// Creates a contains criterion: substring match on text fields, element
    /// membership on array fields.
    pub fn contains(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new(field, CompareOp::Contains, value)
    }

    /// Creates a set-membership criterion matching documents whose field
    /// value is one of `values`.
    pub fn is_in<V: Into<Bson>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::new(
            field,
            CompareOp::In,
            Bson::Array(
                values
                    .into_iter()
                    .map(Into::into)
                    .collect(),
            ),
        )
    }
}
