use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{UdmlError, UdmlResult};
use crate::parser::{self, RawChild, RawNode};
use crate::registry::{ComponentSpec, PropType, Registry};
use crate::view::{PropValue, ViewChild, ViewNode};

/// Guard against runaway nesting in generated source.
const MAX_NESTING_DEPTH: usize = 24;

/// The engine's only output: a view tree or a message. Never both, never a
/// half-built tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderOutcome {
    Rendered(ViewNode),
    Failed(String),
}

impl RenderOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, RenderOutcome::Rendered(_))
    }

    pub fn view(&self) -> Option<&ViewNode> {
        match self {
            RenderOutcome::Rendered(view) => Some(view),
            RenderOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RenderOutcome::Rendered(_) => None,
            RenderOutcome::Failed(message) => Some(message),
        }
    }
}

/// Sandboxed render engine: transpiles UDML source and evaluates it against
/// a scope containing exactly the registry's component names.
///
/// Pure and stateless per call: the same source against the same registry
/// always yields a structurally identical outcome, and no call touches host
/// state. All faults (syntax, unknown identifiers, bad props, runaway
/// nesting) come back as [`RenderOutcome::Failed`] values; nothing is
/// raised past this boundary.
#[derive(Debug, Clone)]
pub struct RenderEngine {
    registry: Arc<Registry>,
}

impl RenderEngine {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Engine with the built-in vocabulary.
    pub fn builtin() -> Self {
        Self::new(Arc::new(Registry::builtin()))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn render(&self, source: &str) -> RenderOutcome {
        match self.try_render(source) {
            Ok(view) => RenderOutcome::Rendered(view),
            Err(err) => RenderOutcome::Failed(err.to_string()),
        }
    }

    /// Stage 1 (transform) then stages 2+3 (bind, evaluate) on the raw tree.
    /// Prefer [`RenderEngine::render`] at the host boundary; this variant
    /// keeps the typed error for callers that want to match on it.
    pub fn try_render(&self, source: &str) -> UdmlResult<ViewNode> {
        let raw = parser::parse_source(source)?;
        self.bind_node(&raw, 0)
    }

    /// Bind a raw element against the registry and evaluate it to a view
    /// node. The only resolvable identifiers are registered component names;
    /// anything else fails here rather than falling through to a host value.
    fn bind_node(&self, raw: &RawNode, depth: usize) -> UdmlResult<ViewNode> {
        if depth >= MAX_NESTING_DEPTH {
            return Err(UdmlError::MaxNestingDepthExceeded {
                max_depth: MAX_NESTING_DEPTH,
            });
        }

        let spec = self
            .registry
            .get(&raw.name)
            .ok_or_else(|| UdmlError::UnknownIdentifier {
                name: raw.name.clone(),
            })?;

        let mut view = ViewNode::new(&spec.name);

        for (attr_name, attr_value) in &raw.attrs {
            let prop = spec.prop(attr_name).ok_or_else(|| UdmlError::UnknownProp {
                component: spec.name.clone(),
                prop: attr_name.clone(),
            })?;
            let value = parser::eval_attr_value(attr_value)?;
            let value = coerce_prop_value(spec, prop.name.as_str(), &prop.prop_type, value)?;
            view.props.insert(prop.name.clone(), value);
        }

        apply_defaults(spec, &mut view)?;

        for child in &raw.children {
            match child {
                RawChild::Text(text) => {
                    if !spec.accepts_children {
                        return Err(UdmlError::ChildrenNotAllowed {
                            component: spec.name.clone(),
                        });
                    }
                    view.children.push(ViewChild::Text(text.clone()));
                }
                RawChild::Element(element) => {
                    if !spec.accepts_children {
                        return Err(UdmlError::ChildrenNotAllowed {
                            component: spec.name.clone(),
                        });
                    }
                    view.children
                        .push(ViewChild::Node(self.bind_node(element, depth + 1)?));
                }
            }
        }

        Ok(view)
    }
}

/// Fill in declared defaults and enforce required props.
fn apply_defaults(spec: &ComponentSpec, view: &mut ViewNode) -> UdmlResult<()> {
    for prop in &spec.props {
        if view.props.contains_key(&prop.name) {
            continue;
        }
        if let Some(default) = &prop.default {
            view.props.insert(prop.name.clone(), default.clone());
        } else if prop.required {
            return Err(UdmlError::MissingProperty {
                component: spec.name.clone(),
                prop: prop.name.clone(),
            });
        }
    }
    Ok(())
}

/// Check a value against its declared prop type, coercing text where the
/// type allows it (attributes arrive as text unless written as expressions).
fn coerce_prop_value(
    spec: &ComponentSpec,
    prop_name: &str,
    prop_type: &PropType,
    value: PropValue,
) -> UdmlResult<PropValue> {
    match prop_type {
        PropType::Text => match value {
            PropValue::Text(_) => Ok(value),
            other => Ok(PropValue::Text(other.to_string())),
        },
        PropType::Number => match &value {
            PropValue::Number(_) => Ok(value),
            PropValue::Text(s) => {
                let n = s.parse::<f64>().map_err(|_| UdmlError::InvalidProperty {
                    component: spec.name.clone(),
                    property: prop_name.to_string(),
                    reason: format!("expected a number, got '{}'", s),
                })?;
                Ok(PropValue::Number(n))
            }
            PropValue::Boolean(b) => Err(UdmlError::InvalidProperty {
                component: spec.name.clone(),
                property: prop_name.to_string(),
                reason: format!("expected a number, got '{}'", b),
            }),
        },
        PropType::Boolean => match &value {
            PropValue::Boolean(_) => Ok(value),
            PropValue::Text(s) => match s.as_str() {
                "true" => Ok(PropValue::Boolean(true)),
                "false" => Ok(PropValue::Boolean(false)),
                other => Err(UdmlError::InvalidProperty {
                    component: spec.name.clone(),
                    property: prop_name.to_string(),
                    reason: format!("expected 'true' or 'false', got '{}'", other),
                }),
            },
            PropValue::Number(n) => Err(UdmlError::InvalidProperty {
                component: spec.name.clone(),
                property: prop_name.to_string(),
                reason: format!("expected 'true' or 'false', got '{}'", n),
            }),
        },
        PropType::OneOf(allowed) => {
            let text = value.to_string();
            if allowed.iter().any(|v| v == &text) {
                Ok(PropValue::Text(text))
            } else {
                Err(UdmlError::InvalidEnum {
                    property: prop_name.to_string(),
                    value: text,
                    expected: allowed.join(", "),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> RenderEngine {
        RenderEngine::builtin()
    }

    #[test]
    fn test_render_minimal_container() {
        let outcome = engine().render("<Container/>");
        let view = outcome.view().expect("should render");
        assert_eq!(view.name, "Container");
    }

    #[test]
    fn test_unknown_tag_fails_with_exact_message() {
        let outcome = engine().render("<Foo/>");
        assert_eq!(outcome.error(), Some("unknown identifier: Foo"));
    }

    #[test]
    fn test_lowercase_html_tag_is_unknown_identifier() {
        let outcome = engine().render("<div>hi</div>");
        assert_eq!(outcome.error(), Some("unknown identifier: div"));
    }

    #[test]
    fn test_defaults_applied() {
        let outcome = engine().render("<Button>Go</Button>");
        let view = outcome.view().unwrap();
        assert_eq!(
            view.prop("variant"),
            Some(&PropValue::Text("primary".to_string()))
        );
    }

    #[test]
    fn test_disabled_accepts_boolean_forms() {
        let attr = engine().render(r#"<Button disabled="true">Go</Button>"#);
        assert_eq!(
            attr.view().unwrap().prop("disabled"),
            Some(&PropValue::Boolean(true))
        );
        let expr = engine().render("<Button disabled={true}>Go</Button>");
        assert_eq!(
            expr.view().unwrap().prop("disabled"),
            Some(&PropValue::Boolean(true))
        );
    }

    #[test]
    fn test_variant_outside_closed_set_fails() {
        let outcome = engine().render(r#"<Button variant="sparkly">Go</Button>"#);
        assert!(matches!(outcome, RenderOutcome::Failed(_)));
    }

    #[test]
    fn test_unknown_prop_fails() {
        let outcome = engine().render(r#"<Card href="/x"/>"#);
        assert!(outcome
            .error()
            .unwrap()
            .contains("Unknown prop 'href' for component 'Card'"));
    }

    #[test]
    fn test_input_rejects_children() {
        let outcome = engine().render(r#"<Input label="Email"><Row/></Input>"#);
        assert!(outcome
            .error()
            .unwrap()
            .contains("does not accept children"));
    }

    #[test]
    fn test_depth_guard_fails_instead_of_hanging() {
        let depth = MAX_NESTING_DEPTH + 4;
        let mut source = String::new();
        for _ in 0..depth {
            source.push_str("<Container>");
        }
        source.push_str("<Row/>");
        for _ in 0..depth {
            source.push_str("</Container>");
        }
        let outcome = engine().render(&source);
        assert!(outcome
            .error()
            .unwrap()
            .contains("Maximum nesting depth"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let source = r#"
<Container>
  <Card title="Login" footer="Forgot password?">
    <Input label="Email" placeholder="you@example.com"/>
    <Input label="Password" type="password"/>
    <Button variant="primary">Sign in</Button>
  </Card>
</Container>
"#;
        let e = engine();
        let first = e.render(source);
        let second = e.render(source);
        assert!(first.is_rendered());
        assert_eq!(first, second);
    }

    #[test]
    fn test_failure_does_not_leak_partial_view() {
        // The second child is invalid; no view at all comes back.
        let outcome = engine().render("<Row><Card title=\"ok\"/><Nope/></Row>");
        assert!(outcome.view().is_none());
        assert_eq!(outcome.error(), Some("unknown identifier: Nope"));
    }

    #[test]
    fn test_expression_prop_coerced_to_text() {
        let outcome = engine().render("<Col width={2}><Row/></Col>");
        let view = outcome.view().unwrap();
        assert_eq!(view.prop("width"), Some(&PropValue::Text("2".to_string())));
    }
}
