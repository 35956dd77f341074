//! Completed claim records and the port they are persisted through
//!
//! The wizard never writes claims itself. Once it completes, the caller takes
//! the [`ClaimRecord`] and hands it to a [`ClaimRecordPort`] adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, DomainPort, HealthCheckable, OperationMetadata, PortError};

use crate::answers::AnswerModel;
use crate::routing::RouteResult;

/// A routed claim ready to be stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub id: ClaimId,
    pub answers: AnswerModel,
    pub route: RouteResult,
    pub completed_at: DateTime<Utc>,
}

impl ClaimRecord {
    pub fn new(answers: AnswerModel, route: RouteResult) -> Self {
        Self {
            id: ClaimId::new(),
            answers,
            route,
            completed_at: Utc::now(),
        }
    }
}

/// Storage for completed claims
#[async_trait]
pub trait ClaimRecordPort: DomainPort + HealthCheckable {
    /// Stores a completed claim
    ///
    /// # Errors
    ///
    /// `PortError::Conflict` if a record with the same id already exists
    async fn save_claim(
        &self,
        record: &ClaimRecord,
        metadata: &OperationMetadata,
    ) -> Result<(), PortError>;

    /// Loads a stored claim
    async fn get_claim(&self, id: ClaimId) -> Result<ClaimRecord, PortError>;
}
