//! Core traits and types for entity definition and serialization.
//!
//! This module provides the trait every stored entity type must implement,
//! the compile-time field table used for predicate validation, and utilities
//! for converting entities between formats (BSON, JSON).

use bson::{Bson, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Deserialize, Serialize};
use serde_json::{Value, from_value, to_value};

use crate::error::RepositoryResult;

/// Core trait that all entities stored through a repository must implement.
///
/// An entity declares the collection its documents live in and a static
/// table of its fields. The table is what lets predicate compilation resolve
/// field names and check comparison value types before any store I/O; a
/// criterion naming a field absent from the table fails the build.
///
/// The table is usually generated with `#[derive(Entity)]` from the
/// `docbridge-macros` crate, but hand implementations are equally valid.
///
/// # Example
///
/// ```ignore
/// use docbridge_core::entity::{Entity, FieldKind, FieldSpec};
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct User {
///     pub name: String,
///     pub age: i64,
/// }
///
/// impl Entity for User {
///     fn collection_name() -> &'static str {
///         "User"
///     }
///
///     fn fields() -> &'static [FieldSpec] {
///         &[
///             FieldSpec { name: "name", kind: FieldKind::Text },
///             FieldSpec { name: "age", kind: FieldKind::Number },
///         ]
///     }
/// }
/// ```
pub trait Entity: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns the name of the collection documents of this type belong to.
    fn collection_name() -> &'static str;

    /// Returns the static field table for this entity type.
    ///
    /// Field names must match the serialized document keys. The identity
    /// field is not part of the table; it resolves implicitly for every
    /// entity type.
    fn fields() -> &'static [FieldSpec];

    /// Looks up one field by its serialized name.
    fn field(name: &str) -> Option<&'static FieldSpec> {
        Self::fields().iter().find(|spec| spec.name == name)
    }
}

/// One entry in an entity's field table: a serialized field name paired with
/// the kind of values the field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// The serialized name of the field.
    pub name: &'static str,
    /// The kind of values stored under the field.
    pub kind: FieldKind,
}

/// The declared, BSON-comparable kind of an entity field.
///
/// Kinds drive the build-time value check in predicate compilation: a
/// criterion value must be accepted by the kind of the field it compares
/// against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// UTF-8 string field.
    Text,
    /// Integer or floating-point field.
    Number,
    /// Boolean field.
    Bool,
    /// Date/time field.
    DateTime,
    /// Opaque document-identity field (primary or reference).
    ObjectId,
    /// Array field.
    Array,
    /// Embedded sub-document field.
    Document,
    /// Field whose values are not checked (maps, unions, unknown types).
    Any,
}

impl FieldKind {
    /// Returns whether a comparison value of the given BSON type can be
    /// compared against values of this kind.
    ///
    /// `Null` is accepted by every kind, since any field may be absent or
    /// explicitly null in a schema-less store.
    pub fn accepts(&self, value: &Bson) -> bool {
        if matches!(value, Bson::Null) {
            return true;
        }

        match self {
            FieldKind::Text => matches!(value, Bson::String(_)),
            FieldKind::Number => {
                matches!(value, Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_))
            }
            FieldKind::Bool => matches!(value, Bson::Boolean(_)),
            FieldKind::DateTime => matches!(value, Bson::DateTime(_)),
            FieldKind::ObjectId => matches!(value, Bson::ObjectId(_)),
            FieldKind::Array => matches!(value, Bson::Array(_)),
            FieldKind::Document => matches!(value, Bson::Document(_)),
            FieldKind::Any => true,
        }
    }

    /// Returns a short display name, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "Text",
            FieldKind::Number => "Number",
            FieldKind::Bool => "Bool",
            FieldKind::DateTime => "DateTime",
            FieldKind::ObjectId => "ObjectId",
            FieldKind::Array => "Array",
            FieldKind::Document => "Document",
            FieldKind::Any => "Any",
        }
    }
}

/// Extension trait providing serialization/deserialization utilities for
/// entities.
///
/// This trait is automatically implemented for all types that implement
/// [`Entity`].
pub trait EntityExt: Entity {
    /// Converts this entity to a BSON value for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_bson(&self) -> RepositoryResult<Bson>;

    /// Creates an entity from a BSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the structure is invalid.
    fn from_bson(bson: Bson) -> RepositoryResult<Self>;

    /// Converts this entity to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_json(&self) -> RepositoryResult<Value>;

    /// Creates an entity from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the structure is invalid.
    fn from_json(value: Value) -> RepositoryResult<Self>;
}

impl<E: Entity> EntityExt for E {
    fn to_bson(&self) -> RepositoryResult<Bson> {
        Ok(serialize_to_bson(self)?)
    }

    fn from_bson(bson: Bson) -> RepositoryResult<Self> {
        Ok(deserialize_from_bson(bson)?)
    }

    fn to_json(&self) -> RepositoryResult<Value> {
        Ok(to_value(self)?)
    }

    fn from_json(value: Value) -> RepositoryResult<Self> {
        Ok(from_value(value)?)
    }
}
