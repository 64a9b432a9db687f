//! Storage collaborators for mappings and records

use crate::{ExportError, Result};
use async_trait::async_trait;
use filler::{Mapping, MappingRecord, Record};
use tokio::sync::RwLock;

/// Saved mappings, keyed by name
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// The most recently updated mapping
    async fn latest(&self) -> Result<Option<MappingRecord>>;

    async fn get(&self, name: &str) -> Result<Option<MappingRecord>>;

    /// Insert or replace the mapping called `name`
    async fn upsert(&self, name: &str, mapping: Mapping) -> Result<MappingRecord>;
}

/// Submission records. Read-only for export.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<Record>>;

    /// All records in storage order
    async fn list(&self) -> Result<Vec<Record>>;
}

/// In-memory [`MappingStore`]
#[derive(Debug, Default)]
pub struct MemoryMappingStore {
    // most recently written last
    records: RwLock<Vec<MappingRecord>>,
}

impl MemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MappingStore for MemoryMappingStore {
    async fn latest(&self) -> Result<Option<MappingRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().max_by_key(|r| r.updated_at).cloned())
    }

    async fn get(&self, name: &str) -> Result<Option<MappingRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.name == name).cloned())
    }

    async fn upsert(&self, name: &str, mapping: Mapping) -> Result<MappingRecord> {
        if name.trim().is_empty() {
            return Err(ExportError::Validation("mapping name is required".to_string()));
        }
        mapping
            .validate()
            .map_err(|e| ExportError::Validation(e.to_string()))?;

        let record = MappingRecord::new(name, mapping);
        let mut records = self.records.write().await;
        records.retain(|r| r.name != name);
        records.push(record.clone());
        Ok(record)
    }
}

/// In-memory [`RecordStore`]
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<Vec<Record>>,
}

impl MemoryRecordStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub async fn insert(&self, record: Record) {
        self.records.write().await.push(record);
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, id: &str) -> Result<Option<Record>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id().as_deref() == Some(id)).cloned())
    }

    async fn list(&self) -> Result<Vec<Record>> {
        Ok(self.records.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filler::MappingField;
    use pretty_assertions::assert_eq;

    fn mapping(field: &str) -> Mapping {
        Mapping::new(vec![MappingField::text(field, 1.0, 1.0)], 600.0, 800.0)
    }

    #[tokio::test]
    async fn test_latest_is_most_recent_upsert() {
        let store = MemoryMappingStore::new();
        assert!(store.latest().await.unwrap().is_none());

        store.upsert("a", mapping("one")).await.unwrap();
        store.upsert("b", mapping("two")).await.unwrap();
        store.upsert("a", mapping("three")).await.unwrap();

        let latest = store.latest().await.unwrap().unwrap();
        assert_eq!(latest.name, "a");
        assert_eq!(latest.mapping, mapping("three"));
        assert_eq!(store.get("b").await.unwrap().unwrap().mapping, mapping("two"));
    }

    #[tokio::test]
    async fn test_upsert_validates() {
        let store = MemoryMappingStore::new();
        let bad = Mapping::new(vec![MappingField::text("", 1.0, 1.0)], 600.0, 800.0);
        assert!(store.upsert("a", bad).await.unwrap_err().is_validation());
        assert!(store.upsert(" ", mapping("x")).await.unwrap_err().is_validation());
        assert!(store.latest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_record_store() {
        let store = MemoryRecordStore::new(vec![
            Record::new().with("id", 1).with("full_name", "A"),
            Record::new().with("id", "two").with("full_name", "B"),
        ]);
        store.insert(Record::new().with("id", 3)).await;

        assert_eq!(store.list().await.unwrap().len(), 3);
        assert_eq!(
            store.get("two").await.unwrap().unwrap().display_name(),
            Some("B".to_string())
        );
        assert!(store.get("1").await.unwrap().is_some());
        assert!(store.get("nope").await.unwrap().is_none());
    }
}
