//! In-memory claim store

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use core_kernel::{
    ClaimId, DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata, PortError,
};

use crate::record::{ClaimRecord, ClaimRecordPort};

/// Claim store backed by a shared map
#[derive(Debug, Clone, Default)]
pub struct InMemoryClaimStore {
    records: Arc<RwLock<HashMap<ClaimId, ClaimRecord>>>,
}

impl InMemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored claims
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// All stored claims, oldest first
    pub async fn all(&self) -> Vec<ClaimRecord> {
        let mut records: Vec<ClaimRecord> = self.records.read().await.values().cloned().collect();
        records.sort_by_key(|r| r.completed_at);
        records
    }
}

impl DomainPort for InMemoryClaimStore {}

#[async_trait]
impl HealthCheckable for InMemoryClaimStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("in-memory-claim-store")
    }
}

#[async_trait]
impl ClaimRecordPort for InMemoryClaimStore {
    async fn save_claim(
        &self,
        record: &ClaimRecord,
        metadata: &OperationMetadata,
    ) -> Result<(), PortError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(PortError::conflict(format!("claim {} already stored", record.id)));
        }
        records.insert(record.id, record.clone());

        info!(
            claim_id = %record.id,
            route = %record.route.route,
            correlation_id = metadata.correlation_id.as_deref().unwrap_or("-"),
            "claim record stored"
        );
        Ok(())
    }

    async fn get_claim(&self, id: ClaimId) -> Result<ClaimRecord, PortError> {
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("ClaimRecord", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::{AnswerModel, AnswerPatch, ClaimType};
    use crate::routing::{ClaimRoute, RouteResult};

    fn record() -> ClaimRecord {
        ClaimRecord::new(
            AnswerModel::from_patch(AnswerPatch::new().claim_type(ClaimType::Withdrawal)),
            RouteResult::new(ClaimRoute::SellerRefund),
        )
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let store = InMemoryClaimStore::new();
        let record = record();

        store.save_claim(&record, &OperationMetadata::default()).await.unwrap();

        let loaded = store.get_claim(record.id).await.unwrap();
        assert_eq!(loaded, record);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_save_conflicts() {
        let store = InMemoryClaimStore::new();
        let record = record();
        store.save_claim(&record, &OperationMetadata::default()).await.unwrap();

        let err = store
            .save_claim(&record, &OperationMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_missing_claim_is_not_found() {
        let store = InMemoryClaimStore::new();
        let err = store.get_claim(ClaimId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
