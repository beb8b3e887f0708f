//! Entity/document normalization and identity handling.
//!
//! An entity is a typed in-memory value; a document is its store-native,
//! identity-bearing form. [`DocumentNormalizer`] converts between the two,
//! strips serializer metadata from the stored shape, and owns all access to
//! the well-known identity field.

use bson::{Bson, Document, oid::ObjectId};

use crate::{
    entity::{Entity, EntityExt},
    error::{RepositoryError, RepositoryResult},
};

/// Well-known name of the identity field every stored document carries.
///
/// This single constant names the identity field across the whole system:
/// the normalizer, the repository, and every store backend.
pub const ID_FIELD: &str = "_id";

/// Metadata key a tagged serializer may inject into the document form.
///
/// A type discriminator is an artifact of serialization, not domain data;
/// normalization removes it from the stored document rather than relying on
/// any serializer setting.
pub const TYPE_TAG_FIELD: &str = "_t";

/// Converts between entities and their stored-document representation.
pub struct DocumentNormalizer;

impl DocumentNormalizer {
    /// Serializes an entity to its document form, stripping the type tag.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Deserialization`] if the entity does not
    /// serialize, or serializes to something other than a document.
    pub fn normalize<E: Entity>(entity: &E) -> RepositoryResult<Document> {
        let mut document = entity
            .to_bson()?
            .as_document()
            .cloned()
            .ok_or_else(|| {
                RepositoryError::Deserialization("entity did not serialize to a document".into())
            })?;

        document.remove(TYPE_TAG_FIELD);

        Ok(document)
    }

    /// Deserializes a document back into an entity.
    ///
    /// Fields the entity type does not declare (the identity field included)
    /// are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Deserialization`] if the document's shape
    /// does not satisfy the entity type's required fields.
    pub fn denormalize<E: Entity>(document: Document) -> RepositoryResult<E> {
        E::from_bson(Bson::Document(document))
    }

    /// Extracts the identity value from a document.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::MissingIdentity`] if the identity field is
    /// absent or is not an identity value.
    pub fn identity_of(document: &Document) -> RepositoryResult<ObjectId> {
        match document.get(ID_FIELD) {
            Some(Bson::ObjectId(id)) => Ok(*id),
            _ => Err(RepositoryError::MissingIdentity(
                "document has no identity field".into(),
            )),
        }
    }

    /// Returns the document with its identity field set or overwritten.
    pub fn with_identity(mut document: Document, id: ObjectId) -> Document {
        document.insert(ID_FIELD, id);
        document
    }
}
