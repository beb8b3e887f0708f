//! Predicate compilation: from filter criteria to a store-executable form.
//!
//! The [`PredicateCompiler`] resolves each criterion against the target
//! entity type's field table, checks the comparison value against the
//! field's declared kind, and combines the validated comparisons under a
//! single boolean combinator. Both failure modes (unknown field and value
//! type mismatch) surface here, before any store I/O.
//!
//! Backends never interpret criteria themselves; they consume a compiled
//! [`Predicate`] through the [`PredicateVisitor`] trait and translate it to
//! their native query form (a BSON filter document for MongoDB, direct
//! boolean evaluation for the in-memory store).

use bson::Bson;

use crate::{
    entity::{Entity, FieldKind},
    error::{RepositoryError, RepositoryResult},
    filter::{Combinator, CompareOp, FilterCriterion},
    normalize::ID_FIELD,
};

/// One validated field comparison inside a compiled predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// The resolved field name.
    pub field: String,
    /// The comparison operator.
    pub op: CompareOp,
    /// The checked comparison operand.
    pub value: Bson,
}

/// A compiled, immutable predicate over documents of one entity type.
///
/// A predicate captures nothing beyond the criteria and combinator it was
/// built from: it is reusable across repeated executions and safe to store
/// and reapply. The shape is deliberately flat: one combinator over a list
/// of comparisons, mirroring the query surface it compiles from.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every document (the result of compiling an empty criteria
    /// list, for either combinator).
    All,
    /// All comparisons must match.
    And(Vec<Comparison>),
    /// At least one comparison must match.
    Or(Vec<Comparison>),
}

/// Sort direction for sorted retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

/// Sort specification: which field to sort by, and in which direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    /// The field name to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

impl Sort {
    /// Creates an ascending sort on the given field.
    pub fn ascending(field: impl Into<String>) -> Self {
        Sort { field: field.into(), direction: SortDirection::Asc }
    }

    /// Creates a descending sort on the given field.
    pub fn descending(field: impl Into<String>) -> Self {
        Sort { field: field.into(), direction: SortDirection::Desc }
    }
}

/// Visitor trait backends implement to translate or evaluate predicates.
pub trait PredicateVisitor {
    type Output;
    type Error: Into<RepositoryError>;

    /// Visits the match-everything predicate.
    fn visit_all(&mut self) -> Result<Self::Output, Self::Error>;

    /// Visits a conjunction of comparisons.
    fn visit_and(&mut self, comparisons: &[Comparison]) -> Result<Self::Output, Self::Error>;

    /// Visits a disjunction of comparisons.
    fn visit_or(&mut self, comparisons: &[Comparison]) -> Result<Self::Output, Self::Error>;

    /// Visits one elementary comparison.
    fn visit_comparison(&mut self, comparison: &Comparison) -> Result<Self::Output, Self::Error>;

    /// Dispatches over the predicate shape.
    fn visit_predicate(&mut self, predicate: &Predicate) -> Result<Self::Output, Self::Error> {
        match predicate {
            Predicate::All => self.visit_all(),
            Predicate::And(comparisons) => self.visit_and(comparisons),
            Predicate::Or(comparisons) => self.visit_or(comparisons),
        }
    }
}

/// Compiles filter criteria into a [`Predicate`] for an entity type.
pub struct PredicateCompiler;

impl PredicateCompiler {
    /// Compiles an ordered criteria list under one combinator.
    ///
    /// An empty list compiles to [`Predicate::All`], the identity element
    /// for both combinators. Otherwise every criterion is resolved and
    /// checked in order, and the validated comparisons are combined
    /// left-to-right under the chosen combinator.
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::UnknownField`] if a criterion names a field the
    ///   entity type does not declare.
    /// - [`RepositoryError::ValueTypeMismatch`] if a criterion value cannot
    ///   be compared against the resolved field.
    pub fn compile<E: Entity>(
        criteria: &[FilterCriterion],
        combinator: Combinator,
    ) -> RepositoryResult<Predicate> {
        if criteria.is_empty() {
            return Ok(Predicate::All);
        }

        let comparisons = criteria
            .iter()
            .map(Self::check::<E>)
            .collect::<RepositoryResult<Vec<Comparison>>>()?;

        Ok(match combinator {
            Combinator::And => Predicate::And(comparisons),
            Combinator::Or => Predicate::Or(comparisons),
        })
    }

    /// Resolves a field name against the entity type's table.
    ///
    /// The identity field resolves for every entity type; all other names
    /// must appear in the table.
    fn resolve<E: Entity>(field: &str) -> RepositoryResult<FieldKind> {
        if field == ID_FIELD {
            return Ok(FieldKind::ObjectId);
        }

        E::field(field)
            .map(|spec| spec.kind)
            .ok_or_else(|| RepositoryError::UnknownField {
                field: field.to_string(),
                entity: std::any::type_name::<E>(),
            })
    }

    /// Validates one criterion and converts it into a [`Comparison`].
    fn check<E: Entity>(criterion: &FilterCriterion) -> RepositoryResult<Comparison> {
        let kind = Self::resolve::<E>(&criterion.field)?;

        match criterion.operator {
            CompareOp::In => {
                // The operand is the value set; elements check individually.
                let Bson::Array(items) = &criterion.value else {
                    return Err(Self::mismatch(criterion, "Array of values", &criterion.value));
                };

                for item in items {
                    if !kind.accepts(item) {
                        return Err(Self::mismatch(criterion, kind.name(), item));
                    }
                }
            }
            CompareOp::Contains => match kind {
                FieldKind::Text => {
                    if !matches!(criterion.value, Bson::String(_) | Bson::Null) {
                        return Err(Self::mismatch(criterion, "Text", &criterion.value));
                    }
                }
                // Array elements are unconstrained; the contained value may
                // be of any element type.
                FieldKind::Array | FieldKind::Any => {}
                _ => {
                    return Err(RepositoryError::ValueTypeMismatch {
                        field: criterion.field.clone(),
                        expected: "Text or Array field",
                        actual: kind.name(),
                    });
                }
            },
            _ => {
                if !kind.accepts(&criterion.value) {
                    return Err(Self::mismatch(criterion, kind.name(), &criterion.value));
                }
            }
        }

        Ok(Comparison {
            field: criterion.field.clone(),
            op: criterion.operator,
            value: criterion.value.clone(),
        })
    }

    fn mismatch(
        criterion: &FilterCriterion,
        expected: &'static str,
        actual: &Bson,
    ) -> RepositoryError {
        RepositoryError::ValueTypeMismatch {
            field: criterion.field.clone(),
            expected,
            actual: bson_type_name(actual),
        }
    }
}

/// Returns the display name of a BSON value's type, used in error messages.
pub(crate) fn bson_type_name(value: &Bson) -> &'static str {
    match value {
        Bson::Null => "Null",
        Bson::String(_) => "String",
        Bson::Int32(_) => "Int32",
        Bson::Int64(_) => "Int64",
        Bson::Double(_) => "Double",
        Bson::Boolean(_) => "Boolean",
        Bson::DateTime(_) => "DateTime",
        Bson::ObjectId(_) => "ObjectId",
        Bson::Array(_) => "Array",
        Bson::Document(_) => "Document",
        _ => "Unsupported",
    }
}
