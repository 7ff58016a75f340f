//! Conversational session: one document, one pipeline, one ledger.
//!
//! The session owns the current source wholesale. Each accepted synthesis
//! replaces the whole document; there is no patching or merging, so the
//! document is always exactly one ledger entry's `code` (or the starting
//! placeholder).

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use uidraft_udml::{RenderEngine, RenderOutcome};

use crate::ledger::{SynthesisResult, VersionLedger};
use crate::pipeline::{SynthesisError, SynthesisPipeline};

/// What a fresh session shows before any request has been made.
pub const DEFAULT_SOURCE: &str =
    "<Container>\n  <Alert type=\"info\">Describe a UI to generate it!</Alert>\n</Container>";

pub struct Session {
    pipeline: SynthesisPipeline,
    engine: RenderEngine,
    ledger: Arc<dyn VersionLedger>,
    // Keeps synthesis single-flight per session without holding the document
    // lock across provider calls; readers never wait on the pipeline.
    in_flight: Mutex<()>,
    document: RwLock<String>,
}

impl Session {
    pub fn new(
        pipeline: SynthesisPipeline,
        engine: RenderEngine,
        ledger: Arc<dyn VersionLedger>,
    ) -> Self {
        Self {
            pipeline,
            engine,
            ledger,
            in_flight: Mutex::new(()),
            document: RwLock::new(DEFAULT_SOURCE.to_string()),
        }
    }

    /// Run one utterance through the pipeline against the current document.
    /// The document is replaced only on success; a failed synthesis leaves
    /// both the document and the ledger untouched. While the pipeline runs,
    /// the document stays readable at its last value.
    pub async fn synthesize(&self, utterance: &str) -> Result<SynthesisResult, SynthesisError> {
        let _guard = self.in_flight.lock().await;
        let current = self.document.read().await.clone();
        let result = self.pipeline.synthesize(utterance, &current).await?;
        *self.document.write().await = result.code.clone();
        Ok(result)
    }

    /// Swap the document back to a stored version, byte for byte. The ledger
    /// is read, never written; restoring creates no new entry.
    pub async fn restore(&self, id: Uuid) -> Result<SynthesisResult, SynthesisError> {
        let stored = self
            .ledger
            .get(id)
            .await?
            .ok_or(SynthesisError::VersionNotFound(id))?;
        *self.document.write().await = stored.code.clone();
        Ok(stored)
    }

    /// Render the current document. Rendering never mutates the session, so
    /// a document that fails to render stays in place for the next request
    /// to repair.
    pub async fn render(&self) -> RenderOutcome {
        let document = self.document.read().await;
        self.engine.render(&document)
    }

    pub async fn source(&self) -> String {
        self.document.read().await.clone()
    }

    pub async fn history(&self, n: usize) -> Result<Vec<SynthesisResult>, SynthesisError> {
        Ok(self.ledger.list_recent(n).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_source_renders() {
        let outcome = RenderEngine::builtin().render(DEFAULT_SOURCE);
        assert!(outcome.is_rendered(), "{:?}", outcome.error());
    }
}
