//! Predicate translation to MongoDB query syntax.
//!
//! This module translates compiled predicates into MongoDB BSON filter
//! documents for execution by the server's query engine.

use bson::{Bson, Document, doc};

use docbridge_core::{
    error::RepositoryError,
    filter::CompareOp,
    predicate::{Comparison, PredicateVisitor},
};

/// Translates compiled predicates into MongoDB filter documents.
pub(crate) struct BsonTranslator;

impl PredicateVisitor for BsonTranslator {
    type Output = Document;
    type Error = RepositoryError;

    fn visit_all(&mut self) -> Result<Self::Output, Self::Error> {
        Ok(doc! {})
    }

    fn visit_and(&mut self, comparisons: &[Comparison]) -> Result<Self::Output, Self::Error> {
        if comparisons.is_empty() {
            return self.visit_all();
        }

        Ok(doc! {
            "$and": comparisons
                .iter()
                .map(|comparison| self.visit_comparison(comparison))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_or(&mut self, comparisons: &[Comparison]) -> Result<Self::Output, Self::Error> {
        if comparisons.is_empty() {
            return self.visit_all();
        }

        Ok(doc! {
            "$or": comparisons
                .iter()
                .map(|comparison| self.visit_comparison(comparison))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_comparison(&mut self, comparison: &Comparison) -> Result<Self::Output, Self::Error> {
        let field = comparison.field.as_str();
        let value = &comparison.value;

        Ok(doc! {
            field: match comparison.op {
                CompareOp::Eq => doc! { "$eq": value },
                CompareOp::Ne => doc! { "$ne": value },
                CompareOp::Gt => doc! { "$gt": value },
                CompareOp::Gte => doc! { "$gte": value },
                CompareOp::Lt => doc! { "$lt": value },
                CompareOp::Lte => doc! { "$lte": value },
                CompareOp::Contains => match value {
                    // Substring on text fields, element membership on arrays
                    Bson::String(s) => doc! { "$regex": escape_regex(s) },
                    other => doc! { "$elemMatch": { "$eq": other } },
                },
                CompareOp::In => doc! { "$in": value },
            }
        })
    }
}

/// Escapes regex metacharacters so a substring search matches literally.
fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\' | '/') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;
    use docbridge_core::{
        entity::{Entity, FieldKind, FieldSpec},
        filter::{Combinator, FilterCriterion},
        predicate::{Predicate, PredicateCompiler},
    };
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Device {
        hostname: String,
        port: i64,
        labels: Vec<String>,
    }

    impl Entity for Device {
        fn collection_name() -> &'static str {
            "Device"
        }

        fn fields() -> &'static [FieldSpec] {
            &[
                FieldSpec { name: "hostname", kind: FieldKind::Text },
                FieldSpec { name: "port", kind: FieldKind::Number },
                FieldSpec { name: "labels", kind: FieldKind::Array },
            ]
        }
    }

    fn translate(criteria: &[FilterCriterion], combinator: Combinator) -> Document {
        let predicate = PredicateCompiler::compile::<Device>(criteria, combinator).unwrap();
        BsonTranslator.visit_predicate(&predicate).unwrap()
    }

    #[test]
    fn match_all_translates_to_the_empty_filter() {
        assert_eq!(BsonTranslator.visit_predicate(&Predicate::All).unwrap(), doc! {});
    }

    #[test]
    fn conjunction_translates_to_and() {
        let filter = translate(
            &[
                FilterCriterion::eq("hostname", "db-1"),
                FilterCriterion::lt("port", 1024i64),
            ],
            Combinator::And,
        );

        assert_eq!(
            filter,
            doc! {
                "$and": [
                    { "hostname": { "$eq": "db-1" } },
                    { "port": { "$lt": 1024i64 } },
                ]
            }
        );
    }

    #[test]
    fn disjunction_translates_to_or() {
        let filter = translate(
            &[
                FilterCriterion::eq("hostname", "db-1"),
                FilterCriterion::eq("hostname", "db-2"),
            ],
            Combinator::Or,
        );

        assert_eq!(
            filter,
            doc! {
                "$or": [
                    { "hostname": { "$eq": "db-1" } },
                    { "hostname": { "$eq": "db-2" } },
                ]
            }
        );
    }

    #[test]
    fn identity_equality_translates_to_an_exact_match() {
        let id = ObjectId::new();
        let filter = translate(&[FilterCriterion::eq("_id", id)], Combinator::And);
        assert_eq!(filter, doc! { "$and": [ { "_id": { "$eq": id } } ] });
    }

    #[test]
    fn contains_on_text_translates_to_an_escaped_regex() {
        let filter = translate(
            &[FilterCriterion::contains("hostname", "db.internal")],
            Combinator::And,
        );
        assert_eq!(
            filter,
            doc! { "$and": [ { "hostname": { "$regex": "db\\.internal" } } ] }
        );
    }

    #[test]
    fn contains_on_arrays_translates_to_elem_match() {
        let filter = translate(
            &[FilterCriterion::contains("labels", 5i64)],
            Combinator::And,
        );
        assert_eq!(
            filter,
            doc! { "$and": [ { "labels": { "$elemMatch": { "$eq": 5i64 } } } ] }
        );
    }

    #[test]
    fn in_translates_to_the_native_membership_operator() {
        let filter = translate(
            &[FilterCriterion::is_in("port", [80i64, 443])],
            Combinator::And,
        );
        assert_eq!(
            filter,
            doc! { "$and": [ { "port": { "$in": [80i64, 443i64] } } ] }
        );
    }

    #[test]
    fn escape_regex_neutralizes_metacharacters() {
        assert_eq!(escape_regex("a.b*c"), "a\\.b\\*c");
        assert_eq!(escape_regex("plain"), "plain");
        assert_eq!(escape_regex("(x|y)"), "\\(x\\|y\\)");
    }
}
