//! # UI Draft Markup Language (UDML)
//!
//! A closed-vocabulary, JSX-flavored markup language for LLM-generated UI
//! previews, with a sandboxed render engine.
//!
//! Generated source may only reference components registered in a
//! [`Registry`]; the engine binds every tag and attribute against that
//! registry and converts every fault into a [`RenderOutcome::Failed`] value
//! instead of raising it into the host.
//!
//! ## Example
//! ```
//! use uidraft_udml::RenderEngine;
//!
//! let engine = RenderEngine::builtin();
//! let outcome = engine.render(r#"
//! <Container>
//!   <Card title="Welcome">
//!     <Button variant="primary">Start</Button>
//!   </Card>
//! </Container>
//! "#);
//! assert!(outcome.is_rendered());
//! ```

pub mod error;
pub mod html;
pub mod parser;
pub mod registry;
pub mod render;
pub mod view;

// --- Core types ---
pub use error::{UdmlError, UdmlResult};
pub use registry::{ComponentSpec, PropSpec, PropType, Registry};
pub use render::{RenderEngine, RenderOutcome};
pub use view::{PropValue, ViewChild, ViewNode};

/// Render a UDML source string against the built-in vocabulary.
///
/// Convenience for one-off renders; construct a [`RenderEngine`] to reuse a
/// registry across calls.
pub fn render(source: &str) -> RenderOutcome {
    RenderEngine::builtin().render(source)
}

/// Validate a UDML source string against the built-in vocabulary without
/// keeping the view tree.
pub fn validate(source: &str) -> UdmlResult<()> {
    RenderEngine::builtin().try_render(source).map(|_| ())
}
