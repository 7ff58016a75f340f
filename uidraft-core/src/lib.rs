//! Conversational UI synthesis on top of `uidraft-udml`.
//!
//! A [`Session`] turns natural-language utterances into full document
//! rewrites: a three-stage [`SynthesisPipeline`] (plan, generate, explain)
//! drives a pluggable [`CompletionProvider`], every completed attempt lands
//! in a [`VersionLedger`], and the session renders whatever the current
//! document is through the sandboxed engine.

pub mod ledger;
pub mod pipeline;
pub mod provider;
pub mod session;

pub use ledger::{LedgerError, MemoryLedger, SynthesisResult, VersionLedger};
pub use pipeline::{strip_code_fences, Stage, SynthesisError, SynthesisPipeline};
pub use provider::{CompletionProvider, OpenAiCompatProvider, ProviderError};
pub use session::{Session, DEFAULT_SOURCE};
