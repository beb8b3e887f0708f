//! Predicate evaluation for in-memory document filtering.
//!
//! This module evaluates compiled predicates directly against BSON
//! documents, giving the memory backend the same matching semantics the
//! MongoDB backend gets from the server's query engine.

use std::{cmp::Ordering, collections::HashMap};

use bson::{Bson, Document, datetime::DateTime, oid::ObjectId};

use docbridge_core::{
    error::{RepositoryError, RepositoryResult},
    filter::CompareOp,
    predicate::{Comparison, Predicate, PredicateVisitor},
};

/// Type-erased, comparable representation of BSON values.
///
/// Wraps BSON values for filtering comparisons. All numeric types normalize
/// to f64; values of different shapes are never equal and never ordered.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    DateTime(DateTime),
    ObjectId(&'a ObjectId),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
    // Exotic BSON types are neither equal nor ordered
    Opaque,
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::ObjectId(value) => Comparable::ObjectId(value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr.iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>(),
            ),
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>(),
            ),
            _ => Comparable::Opaque,
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Evaluates a compiled predicate against one document.
pub(crate) struct DocumentMatcher<'a> {
    document: &'a Document,
}

impl<'a> DocumentMatcher<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn matches(&mut self, predicate: &Predicate) -> RepositoryResult<bool> {
        self.visit_predicate(predicate)
    }

    /// Filters documents down to those matching the predicate, preserving
    /// the input order.
    pub fn filter(
        documents: impl IntoIterator<Item = &'a Document>,
        predicate: &Predicate,
    ) -> RepositoryResult<Vec<Document>> {
        Ok(documents
            .into_iter()
            .filter(|doc| {
                DocumentMatcher::new(doc)
                    .matches(predicate)
                    .unwrap_or(false)
            })
            .cloned()
            .collect::<Vec<_>>())
    }

    /// Orders two documents by a field, for sorted retrieval.
    ///
    /// Documents missing the field, and field values that are mutually
    /// unordered, compare as equal so the surrounding order is preserved.
    pub fn compare_by_field(a: &Document, b: &Document, field: &str) -> Ordering {
        let left = a.get(field).map(Comparable::from);
        let right = b.get(field).map(Comparable::from);

        match (left, right) {
            (Some(left), Some(right)) => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        }
    }
}

impl<'a> PredicateVisitor for DocumentMatcher<'a> {
    type Output = bool;
    type Error = RepositoryError;

    fn visit_all(&mut self) -> Result<Self::Output, Self::Error> {
        Ok(true)
    }

    fn visit_and(&mut self, comparisons: &[Comparison]) -> Result<Self::Output, Self::Error> {
        for comparison in comparisons {
            if !self.visit_comparison(comparison)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, comparisons: &[Comparison]) -> Result<Self::Output, Self::Error> {
        for comparison in comparisons {
            if self.visit_comparison(comparison)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_comparison(&mut self, comparison: &Comparison) -> Result<Self::Output, Self::Error> {
        let Some(field_value) = self.document.get(&comparison.field) else {
            // Absent fields match nothing, including Ne
            return Ok(false);
        };

        match comparison.op {
            CompareOp::Eq => {
                Ok(Comparable::from(field_value) == Comparable::from(&comparison.value))
            }
            CompareOp::Ne => {
                Ok(Comparable::from(field_value) != Comparable::from(&comparison.value))
            }
            CompareOp::Gt | CompareOp::Gte | CompareOp::Lt | CompareOp::Lte => {
                match Comparable::from(field_value)
                    .partial_cmp(&Comparable::from(&comparison.value))
                {
                    Some(ordering) => Ok(match comparison.op {
                        CompareOp::Gt => ordering == Ordering::Greater,
                        CompareOp::Gte => ordering != Ordering::Less,
                        CompareOp::Lt => ordering == Ordering::Less,
                        CompareOp::Lte => ordering != Ordering::Greater,
                        _ => unreachable!(),
                    }),
                    None => Ok(false),
                }
            }
            CompareOp::Contains => match Comparable::from(field_value) {
                Comparable::String(text) => match &comparison.value {
                    Bson::String(needle) => Ok(text.contains(needle.as_str())),
                    _ => Ok(false),
                },
                Comparable::Array(elements) => Ok(elements
                    .iter()
                    .any(|element| element == &Comparable::from(&comparison.value))),
                _ => Ok(false),
            },
            CompareOp::In => match &comparison.value {
                Bson::Array(values) => Ok(values
                    .iter()
                    .any(|value| Comparable::from(value) == Comparable::from(field_value))),
                _ => Ok(false),
            },
        }
    }
}
