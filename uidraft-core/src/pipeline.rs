//! Three-stage synthesis pipeline: plan → generate → explain.
//!
//! One request walks an explicit state machine
//! `{Planning, Generating, Explaining, Done, Failed}`. The stages are
//! strictly ordered, none is skipped, none retries on its own, and a provider
//! failure in any stage moves straight to `Failed` without entering the later
//! stages. Only a request that reaches `Done` is appended to the ledger.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use uidraft_udml::Registry;

use crate::ledger::{LedgerError, SynthesisResult, VersionLedger};
use crate::provider::{CompletionProvider, ProviderError};

const PLANNER_SYSTEM: &str = "You are a UI Architect. Create a brief 3-step plan.";

const EXPLAINER_SYSTEM: &str = "Explain in 1 sentence why you chose these components.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Planning,
    Generating,
    Explaining,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Planning => "planning",
            Stage::Generating => "generating",
            Stage::Explaining => "explaining",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

#[derive(Error, Debug)]
pub enum SynthesisError {
    /// The model provider errored, timed out, or returned unusable text.
    /// Recoverable by retrying the whole synthesis; nothing was persisted.
    #[error("model provider failed while {stage}: {source}")]
    Upstream {
        stage: Stage,
        #[source]
        source: ProviderError,
    },

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("version {0} not found")]
    VersionNotFound(Uuid),
}

/// Strip surrounding code-fence markers and whitespace from raw model output.
/// The generator is asked for bare source, but raw model text is not trusted
/// to be clean.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```udml", "")
        .replace("```jsx", "")
        .replace("```xml", "")
        .replace("```html", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Build the generator's system prompt from the registry, so the prompt
/// contract and the execution scope cannot drift apart.
fn generator_system_prompt(registry: &Registry) -> String {
    format!(
        "You are a UI generator. You strictly adhere to a FIXED component system.\n\
You CANNOT use raw HTML tags like <div>, <button>, <input>.\n\
You MUST use only these components:\n\
{}\n\n\
RULES:\n\
1. Return ONLY the markup. No markdown, no ```.\n\
2. Do NOT include import statements or 'export default'.\n\
3. The markup must have exactly one root element.\n\
4. If the user asks for a modification, keep the existing structure but update the props/components.",
        registry.grammar_summary()
    )
}

/// Orchestrates the three provider calls for one synthesis request and
/// persists the result. The provider and ledger are injected capabilities;
/// the pipeline holds no process-global state.
pub struct SynthesisPipeline {
    provider: Arc<dyn CompletionProvider>,
    ledger: Arc<dyn VersionLedger>,
    generator_system: String,
}

impl SynthesisPipeline {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        ledger: Arc<dyn VersionLedger>,
        registry: &Registry,
    ) -> Self {
        Self {
            provider,
            ledger,
            generator_system: generator_system_prompt(registry),
        }
    }

    /// Run one full synthesis. On success the result is appended to the
    /// ledger before returning; on any upstream failure nothing is persisted
    /// and the caller's document must be left as it was.
    #[tracing::instrument(skip(self, current_source), fields(utterance_len = utterance.len()))]
    pub async fn synthesize(
        &self,
        utterance: &str,
        current_source: &str,
    ) -> Result<SynthesisResult, SynthesisError> {
        let mut stage = Stage::Planning;
        let mut plan = String::new();
        let mut code = String::new();
        let mut explanation = String::new();

        while stage != Stage::Done {
            match stage {
                Stage::Planning => {
                    plan = self.call(stage, PLANNER_SYSTEM, utterance).await?;
                    stage = Stage::Generating;
                }
                Stage::Generating => {
                    let current = if current_source.trim().is_empty() {
                        "None"
                    } else {
                        current_source
                    };
                    let user = format!(
                        "PLAN: {plan}\nCURRENT CODE: {current}\nUSER REQUEST: {utterance}\n\nGenerate the pure markup now:"
                    );
                    let raw = self.call(stage, &self.generator_system, &user).await?;
                    code = strip_code_fences(&raw);
                    if code.is_empty() {
                        tracing::warn!(%stage, "generator output empty after fence stripping");
                        return Err(SynthesisError::Upstream {
                            stage,
                            source: ProviderError::EmptyResponse,
                        });
                    }
                    stage = Stage::Explaining;
                }
                Stage::Explaining => {
                    let user = format!("Plan: {plan}. Request: {utterance}");
                    explanation = self.call(stage, EXPLAINER_SYSTEM, &user).await?;
                    stage = Stage::Done;
                }
                // Terminal states never re-enter the loop: failures return
                // out of the stage that hit them.
                Stage::Done | Stage::Failed => unreachable!("terminal stage inside pipeline loop"),
            }
        }

        let result = SynthesisResult::new(utterance, plan, code, explanation);
        self.ledger.append(result.clone()).await?;
        tracing::info!(id = %result.id, "synthesis persisted");
        Ok(result)
    }

    async fn call(
        &self,
        stage: Stage,
        system: &str,
        user: &str,
    ) -> Result<String, SynthesisError> {
        tracing::debug!(%stage, "calling model provider");
        self.provider
            .complete(system, user)
            .await
            .map_err(|source| {
                tracing::warn!(%stage, error = %source, "stage failed, aborting synthesis");
                SynthesisError::Upstream { stage, source }
            })
    }
}
