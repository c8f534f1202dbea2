//! The immutable rider version store

use crate::RiderSchema;
use chrono::Utc;
use rider_types::{
    FieldName, FieldValue, NegotiationError, NegotiationResult, RiderDocument, RiderDocumentId,
    UserId,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

/// Stores every published version of every rider.
///
/// Versions are snapshots: `publish` creates version 1, `revise`
/// appends `version + 1`, and nothing is ever edited or deleted. The
/// marketplace's persistence layer wraps this contract with real
/// storage; negotiations only rely on the read side staying stable.
pub struct DocumentStore {
    schema: RiderSchema,
    versions: RwLock<HashMap<RiderDocumentId, Vec<RiderDocument>>>,
}

impl DocumentStore {
    /// Create a store validating against the standard rider schema
    pub fn new() -> Self {
        Self::with_schema(RiderSchema::standard())
    }

    /// Create a store with a custom schema
    pub fn with_schema(schema: RiderSchema) -> Self {
        Self {
            schema,
            versions: RwLock::new(HashMap::new()),
        }
    }

    /// Publish a brand-new rider as version 1
    pub fn publish(
        &self,
        owner_id: UserId,
        fields: BTreeMap<FieldName, FieldValue>,
    ) -> NegotiationResult<RiderDocument> {
        self.schema.validate(&fields)?;

        let document = RiderDocument {
            document_id: RiderDocumentId::generate(),
            owner_id,
            version: 1,
            fields,
            published_at: Utc::now(),
        };

        let mut versions = self
            .versions
            .write()
            .map_err(|_| NegotiationError::LockPoisoned)?;
        versions.insert(document.document_id.clone(), vec![document.clone()]);

        tracing::info!(document_id = %document.document_id, "rider published");
        Ok(document)
    }

    /// Publish the next version of an existing rider. Only the owning
    /// artist may revise; prior versions stay untouched.
    pub fn revise(
        &self,
        document_id: &RiderDocumentId,
        owner_id: &UserId,
        fields: BTreeMap<FieldName, FieldValue>,
    ) -> NegotiationResult<RiderDocument> {
        self.schema.validate(&fields)?;

        let mut versions = self
            .versions
            .write()
            .map_err(|_| NegotiationError::LockPoisoned)?;
        let history = versions
            .get_mut(document_id)
            .ok_or_else(|| NegotiationError::NotFound(format!("rider {}", document_id)))?;

        // History is never empty once a rider exists
        let latest = history.last().ok_or_else(|| {
            NegotiationError::NotFound(format!("rider {} has no versions", document_id))
        })?;
        if &latest.owner_id != owner_id {
            return Err(NegotiationError::Validation(format!(
                "rider {} is not owned by {}",
                document_id, owner_id
            )));
        }

        let document = RiderDocument {
            document_id: document_id.clone(),
            owner_id: owner_id.clone(),
            version: latest.version + 1,
            fields,
            published_at: Utc::now(),
        };
        history.push(document.clone());

        tracing::info!(
            document_id = %document_id,
            version = document.version,
            "rider revised"
        );
        Ok(document)
    }

    /// Fetch one immutable version snapshot
    pub fn get_version(
        &self,
        document_id: &RiderDocumentId,
        version: u32,
    ) -> NegotiationResult<RiderDocument> {
        let versions = self
            .versions
            .read()
            .map_err(|_| NegotiationError::LockPoisoned)?;
        versions
            .get(document_id)
            .and_then(|history| history.iter().find(|d| d.version == version))
            .cloned()
            .ok_or_else(|| {
                NegotiationError::NotFound(format!("rider {} version {}", document_id, version))
            })
    }

    /// Fetch the most recently published version
    pub fn latest_version(&self, document_id: &RiderDocumentId) -> NegotiationResult<RiderDocument> {
        let versions = self
            .versions
            .read()
            .map_err(|_| NegotiationError::LockPoisoned)?;
        versions
            .get(document_id)
            .and_then(|history| history.last())
            .cloned()
            .ok_or_else(|| NegotiationError::NotFound(format!("rider {}", document_id)))
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn fields(duration: i64) -> BTreeMap<FieldName, FieldValue> {
        let mut fields = BTreeMap::new();
        fields.insert(
            FieldName::new("performance_duration_minutes"),
            FieldValue::Integer(duration),
        );
        fields.insert(
            FieldName::new("performance_fee"),
            FieldValue::Decimal(Decimal::from_str("800.00").unwrap()),
        );
        fields
    }

    #[test]
    fn test_publish_and_get() {
        let store = DocumentStore::new();
        let doc = store.publish(UserId::new("artist-1"), fields(60)).unwrap();
        assert_eq!(doc.version, 1);

        let fetched = store.get_version(&doc.document_id, 1).unwrap();
        assert_eq!(
            fetched.field(&FieldName::new("performance_duration_minutes")),
            Some(&FieldValue::Integer(60))
        );
    }

    #[test]
    fn test_revise_leaves_old_version_untouched() {
        let store = DocumentStore::new();
        let artist = UserId::new("artist-1");
        let v1 = store.publish(artist.clone(), fields(60)).unwrap();
        let v2 = store.revise(&v1.document_id, &artist, fields(90)).unwrap();

        assert_eq!(v2.version, 2);
        // The snapshot referenced by a negotiation must not move
        let old = store.get_version(&v1.document_id, 1).unwrap();
        assert_eq!(
            old.field(&FieldName::new("performance_duration_minutes")),
            Some(&FieldValue::Integer(60))
        );
        assert_eq!(store.latest_version(&v1.document_id).unwrap().version, 2);
    }

    #[test]
    fn test_revise_requires_owner() {
        let store = DocumentStore::new();
        let doc = store.publish(UserId::new("artist-1"), fields(60)).unwrap();

        let err = store
            .revise(&doc.document_id, &UserId::new("artist-2"), fields(90))
            .unwrap_err();
        assert!(matches!(err, NegotiationError::Validation(_)));
    }

    #[test]
    fn test_invalid_fields_rejected_on_publish() {
        let store = DocumentStore::new();
        let err = store
            .publish(UserId::new("artist-1"), BTreeMap::new())
            .unwrap_err();
        assert!(matches!(err, NegotiationError::Validation(_)));
    }

    #[test]
    fn test_unknown_version_not_found() {
        let store = DocumentStore::new();
        let doc = store.publish(UserId::new("artist-1"), fields(60)).unwrap();
        assert!(matches!(
            store.get_version(&doc.document_id, 7),
            Err(NegotiationError::NotFound(_))
        ));
        assert!(matches!(
            store.latest_version(&RiderDocumentId::new("missing")),
            Err(NegotiationError::NotFound(_))
        ));
    }
}
