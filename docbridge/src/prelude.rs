//! Convenient re-exports of commonly used types from docbridge.
//!
//! Import this prelude module to quickly access the most frequently used
//! types and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use docbridge::prelude::*;
//! ```

pub use docbridge_core::{
    client::StoreClient,
    entity::{Entity, EntityExt, FieldKind, FieldSpec},
    error::{RepositoryError, RepositoryResult},
    filter::{Combinator, CompareOp, FilterCriterion},
    normalize::{DocumentNormalizer, ID_FIELD, TYPE_TAG_FIELD},
    predicate::{Comparison, Predicate, PredicateCompiler, PredicateVisitor, Sort, SortDirection},
    repository::{DeleteOutcome, EntityStore, Repository},
};

pub use docbridge_macros::Entity;
