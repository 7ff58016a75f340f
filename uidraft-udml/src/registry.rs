use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{UdmlError, UdmlResult};
use crate::view::PropValue;

/// The fixed vocabulary shipped with the engine. Custom registries may extend
/// it through [`Registry::register`], but these names are always taken.
pub const BUILTIN_COMPONENTS: &[&str] =
    &["Container", "Card", "Button", "Input", "Alert", "Row", "Col"];

/// A prop's accepted value shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropType {
    Text,
    Number,
    Boolean,
    /// Closed set of accepted string values.
    OneOf(Vec<String>),
}

/// A single named parameter accepted by a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropSpec {
    /// camelCase prop name
    pub name: String,
    pub prop_type: PropType,
    /// Required props have no default; absence is a binding failure.
    pub required: bool,
    /// Applied during evaluation when the prop is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<PropValue>,
}

impl PropSpec {
    pub fn text(name: &str) -> Self {
        Self {
            name: name.to_string(),
            prop_type: PropType::Text,
            required: false,
            default: None,
        }
    }

    pub fn boolean(name: &str) -> Self {
        Self {
            name: name.to_string(),
            prop_type: PropType::Boolean,
            required: false,
            default: Some(PropValue::Boolean(false)),
        }
    }

    pub fn one_of(name: &str, values: &[&str], default: &str) -> Self {
        Self {
            name: name.to_string(),
            prop_type: PropType::OneOf(values.iter().map(|v| v.to_string()).collect()),
            required: false,
            default: Some(PropValue::Text(default.to_string())),
        }
    }

    pub fn with_default(mut self, value: PropValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// A renderable primitive: unique name, accepted props, child policy.
///
/// Specs are immutable once registered. The rendering itself is a pure
/// function of (props, children) performed by the engine's evaluate stage;
/// the spec only declares the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    /// PascalCase, globally unique within a registry
    pub name: String,
    pub props: Vec<PropSpec>,
    pub accepts_children: bool,
}

impl ComponentSpec {
    pub fn new(name: &str, props: Vec<PropSpec>, accepts_children: bool) -> Self {
        Self {
            name: name.to_string(),
            props,
            accepts_children,
        }
    }

    pub fn prop(&self, name: &str) -> Option<&PropSpec> {
        self.props.iter().find(|p| p.name == name)
    }
}

/// The single source of truth for what generated code may reference.
///
/// Both the synthesis prompt (via [`Registry::grammar_summary`]) and the
/// render engine's binding scope derive from the same registry, so the two
/// cannot drift apart.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    specs: HashMap<String, ComponentSpec>,
    /// Registration order, used for stable grammar output.
    order: Vec<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed component vocabulary, mirroring the preview component set:
    /// a page container, a titled card, buttons with closed variants, labeled
    /// inputs, typed alerts, and flex row/column primitives.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let specs = vec![
            ComponentSpec::new("Container", vec![], true),
            ComponentSpec::new(
                "Card",
                vec![PropSpec::text("title"), PropSpec::text("footer")],
                true,
            ),
            ComponentSpec::new(
                "Button",
                vec![
                    PropSpec::one_of(
                        "variant",
                        &["primary", "secondary", "danger", "ghost"],
                        "primary",
                    ),
                    PropSpec::boolean("disabled"),
                ],
                true,
            ),
            ComponentSpec::new(
                "Input",
                vec![
                    PropSpec::text("label"),
                    PropSpec::text("placeholder"),
                    PropSpec::one_of("type", &["text", "password", "number"], "text"),
                ],
                false,
            ),
            ComponentSpec::new(
                "Alert",
                vec![PropSpec::one_of(
                    "type",
                    &["info", "success", "warning"],
                    "info",
                )],
                true,
            ),
            ComponentSpec::new("Row", vec![PropSpec::text("gap")], true),
            ComponentSpec::new(
                "Col",
                vec![
                    PropSpec::text("width").with_default(PropValue::Text("1".to_string())),
                    PropSpec::text("gap"),
                ],
                true,
            ),
        ];
        for spec in specs {
            // Built-in names are distinct by construction.
            registry
                .register(spec)
                .expect("built-in vocabulary must not contain duplicates");
        }
        registry
    }

    /// Register a component. Fails with [`UdmlError::DuplicateName`] if the
    /// name is already taken; the registry is left unchanged in that case.
    pub fn register(&mut self, spec: ComponentSpec) -> UdmlResult<()> {
        if self.specs.contains_key(&spec.name) {
            return Err(UdmlError::DuplicateName {
                name: spec.name.clone(),
            });
        }
        self.order.push(spec.name.clone());
        self.specs.insert(spec.name.clone(), spec);
        Ok(())
    }

    /// Resolve a name to its spec, or fail with [`UdmlError::NotFound`].
    pub fn resolve(&self, name: &str) -> UdmlResult<&ComponentSpec> {
        self.specs.get(name).ok_or_else(|| UdmlError::NotFound {
            name: name.to_string(),
        })
    }

    /// Non-failing lookup used by the engine's bind stage, where an absent
    /// name is an unknown-identifier render failure rather than misuse.
    pub fn get(&self, name: &str) -> Option<&ComponentSpec> {
        self.specs.get(name)
    }

    /// All registered names in registration order.
    pub fn all_names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// One-line natural-language description of the vocabulary, embedded in
    /// the generation prompt. Example output for a button:
    /// `<Button variant="primary|secondary|danger|ghost">`.
    pub fn grammar_summary(&self) -> String {
        let mut parts = Vec::with_capacity(self.order.len());
        for name in &self.order {
            let spec = &self.specs[name];
            if spec.props.is_empty() {
                parts.push(format!("<{}>", spec.name));
                continue;
            }
            let attrs = spec
                .props
                .iter()
                .map(|p| match &p.prop_type {
                    PropType::OneOf(values) => format!("{}=\"{}\"", p.name, values.join("|")),
                    _ => format!("{}=\"\"", p.name),
                })
                .collect::<Vec<_>>()
                .join(" ");
            parts.push(format!("<{} {}>", spec.name, attrs));
        }
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_vocabulary_names() {
        let registry = Registry::builtin();
        assert_eq!(
            registry.all_names(),
            BUILTIN_COMPONENTS
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_register_then_resolve() {
        let mut registry = Registry::new();
        let spec = ComponentSpec::new("Panel", vec![PropSpec::text("title")], true);
        registry.register(spec.clone()).unwrap();
        assert_eq!(registry.resolve("Panel").unwrap(), &spec);
    }

    #[test]
    fn test_duplicate_name_rejected_registry_unchanged() {
        let mut registry = Registry::builtin();
        let before = registry.all_names();
        let result = registry.register(ComponentSpec::new("Card", vec![], true));
        assert!(matches!(result, Err(UdmlError::DuplicateName { .. })));
        assert_eq!(registry.all_names(), before);
        // The original Card spec survived the collision.
        assert!(registry.resolve("Card").unwrap().prop("title").is_some());
    }

    #[test]
    fn test_resolve_unknown_is_not_found() {
        let registry = Registry::builtin();
        assert!(matches!(
            registry.resolve("Widget"),
            Err(UdmlError::NotFound { .. })
        ));
    }

    #[test]
    fn test_grammar_summary_covers_every_name() {
        let registry = Registry::builtin();
        let grammar = registry.grammar_summary();
        for name in registry.all_names() {
            assert!(grammar.contains(&format!("<{}", name)), "missing {}", name);
        }
        assert!(grammar.contains("variant=\"primary|secondary|danger|ghost\""));
        assert!(grammar.contains("type=\"info|success|warning\""));
    }
}
