//! Append-only version ledger.
//!
//! Every synthesis attempt that completes the pipeline is recorded here,
//! renderable or not; selecting a past version feeds its stored source back
//! into the render engine without touching the pipeline.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The immutable unit of persistence and of history-list display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub id: Uuid,
    /// The user utterance that produced this version.
    pub prompt: String,
    /// Advisory planning text, not validated.
    pub plan: String,
    /// Fence-stripped candidate source.
    pub code: String,
    /// One-sentence rationale, cosmetic only.
    pub explanation: String,
    pub created_at: DateTime<Utc>,
}

impl SynthesisResult {
    pub fn new(prompt: &str, plan: String, code: String, explanation: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            prompt: prompt.to_string(),
            plan,
            code,
            explanation,
            created_at: Utc::now(),
        }
    }
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ledger storage error: {0}")]
    Storage(String),
}

/// The persistence collaborator's surface. Durability and ordering guarantees
/// belong to the implementation, not to the pipeline.
#[async_trait]
pub trait VersionLedger: Send + Sync {
    /// Append a result and return its id.
    async fn append(&self, result: SynthesisResult) -> Result<Uuid, LedgerError>;

    /// Most recent first.
    async fn list_recent(&self, n: usize) -> Result<Vec<SynthesisResult>, LedgerError>;

    /// Fetch a single stored version; backs `restore`.
    async fn get(&self, id: Uuid) -> Result<Option<SynthesisResult>, LedgerError>;
}

/// In-memory ledger. Safe for concurrent appends; the id log preserves
/// append order independently of the map.
#[derive(Default)]
pub struct MemoryLedger {
    entries: DashMap<Uuid, SynthesisResult>,
    order: Mutex<Vec<Uuid>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl VersionLedger for MemoryLedger {
    async fn append(&self, result: SynthesisResult) -> Result<Uuid, LedgerError> {
        let id = result.id;
        self.entries.insert(id, result);
        self.order
            .lock()
            .map_err(|_| LedgerError::Storage("order log poisoned".to_string()))?
            .push(id);
        Ok(id)
    }

    async fn list_recent(&self, n: usize) -> Result<Vec<SynthesisResult>, LedgerError> {
        let order = self
            .order
            .lock()
            .map_err(|_| LedgerError::Storage("order log poisoned".to_string()))?;
        Ok(order
            .iter()
            .rev()
            .take(n)
            .filter_map(|id| self.entries.get(id).map(|e| e.clone()))
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<SynthesisResult>, LedgerError> {
        Ok(self.entries.get(&id).map(|e| e.clone()))
    }
}
