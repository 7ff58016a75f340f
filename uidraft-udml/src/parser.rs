use std::sync::OnceLock;

use regex::{Captures, Regex};
use roxmltree::Node;

use crate::error::{UdmlError, UdmlResult};
use crate::view::PropValue;

/// Synthetic root tag wrapped around UDML source so a bare fragment parses as
/// a well-formed XML document.
const WRAPPER: &str = "__udml_root__";

fn wrap(source: &str) -> String {
    format!("<{0}>{1}</{0}>", WRAPPER, source)
}

fn forbidden_statement_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*(?:import|export)\b").expect("valid regex"))
}

fn expression_attr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // attr={...}, a JSX-style expression attribute, not valid XML until quoted
    RE.get_or_init(|| Regex::new(r#"=\s*\{([^{}]*)\}"#).expect("valid regex"))
}

fn ampersand_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Any ampersand, with an optional entity tail captured for preservation
    RE.get_or_init(|| {
        Regex::new(r"&(#x[0-9a-fA-F]+;|#[0-9]+;|[a-zA-Z][a-zA-Z0-9]*;)?").expect("valid regex")
    })
}

/// A parsed but not yet bound element tree. The transform stage produces this
/// owned representation; binding against a registry happens in the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RawNode {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<RawChild>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawChild {
    Text(String),
    Element(RawNode),
}

/// Transform stage: turn a source string into a single raw element tree.
///
/// Rejects import/export statements, quotes JSX expression attributes into
/// well-formed XML, and enforces exactly one root element. Any failure here
/// is a syntax failure; evaluation is never attempted.
pub fn parse_source(source: &str) -> UdmlResult<RawNode> {
    if forbidden_statement_re().is_match(source) {
        return Err(UdmlError::ForbiddenStatement);
    }

    let normalized = quote_expression_attrs(&escape_bare_ampersands(source));
    let wrapped = wrap(&normalized);
    let doc = roxmltree::Document::parse(&wrapped)?;
    let root = doc.root_element();

    let mut elements = element_children(root);
    let first = elements.next().ok_or(UdmlError::EmptyDocument)?;
    if elements.next().is_some() {
        return Err(UdmlError::MultipleRootComponents);
    }

    Ok(build_raw_node(first))
}

/// Rewrite `attr={expr}` as `attr="{expr}"` so the XML parser accepts it.
/// The quote flavor is chosen to avoid colliding with quotes inside the
/// expression; an expression using both flavors is left alone and surfaces
/// as an XML syntax error.
fn quote_expression_attrs(source: &str) -> String {
    expression_attr_re()
        .replace_all(source, |caps: &Captures| {
            let expr = &caps[1];
            if !expr.contains('"') {
                format!("=\"{{{}}}\"", expr)
            } else if !expr.contains('\'') {
                format!("='{{{}}}'", expr)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Rewrite a bare `&` as `&amp;` while leaving real entity references alone.
/// Generated text routinely contains unescaped ampersands ("Save & exit")
/// that the XML parser would otherwise reject.
fn escape_bare_ampersands(source: &str) -> String {
    ampersand_re()
        .replace_all(source, |caps: &Captures| match caps.get(1) {
            Some(_) => caps[0].to_string(),
            None => "&amp;".to_string(),
        })
        .into_owned()
}

/// Iterator over element children (skips text/CDATA/comment nodes).
fn element_children<'a>(node: Node<'a, 'a>) -> impl Iterator<Item = Node<'a, 'a>> {
    node.children().filter(|n| n.is_element())
}

fn build_raw_node(node: Node) -> RawNode {
    let attrs = node
        .attributes()
        .map(|a| (a.name().to_string(), a.value().to_string()))
        .collect();

    let mut children = Vec::new();
    for child in node.children() {
        if child.is_element() {
            children.push(RawChild::Element(build_raw_node(child)));
        } else if child.is_text() {
            if let Some(text) = child.text() {
                if !text.trim().is_empty() {
                    children.push(RawChild::Text(text.trim().to_string()));
                }
            }
        }
    }

    RawNode {
        name: node.tag_name().name().to_string(),
        attrs,
        children,
    }
}

/// Evaluate an attribute value into a [`PropValue`].
///
/// `key="literal"` is plain text. `key="{expr}"` (the quoted form of
/// `key={expr}`) is an expression, restricted to literals: the execution
/// scope resolves component names only, so a bare identifier has nothing to
/// bind to and fails as an unknown identifier.
pub fn eval_attr_value(value: &str) -> UdmlResult<PropValue> {
    let trimmed = value.trim();
    if let Some(inner) = trimmed
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
    {
        eval_expression(inner.trim())
    } else {
        Ok(PropValue::Text(value.to_string()))
    }
}

fn eval_expression(expr: &str) -> UdmlResult<PropValue> {
    if expr.is_empty() {
        return Err(UdmlError::InvalidExpression {
            expression: expr.to_string(),
            reason: "empty expression".to_string(),
        });
    }

    // String literal, either quote flavor
    for quote in ['"', '\''] {
        if let Some(inner) = expr
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return Ok(PropValue::Text(inner.to_string()));
        }
    }

    match expr {
        "true" => return Ok(PropValue::Boolean(true)),
        "false" => return Ok(PropValue::Boolean(false)),
        _ => {}
    }

    if let Ok(n) = expr.parse::<f64>() {
        return Ok(PropValue::Number(n));
    }

    if is_identifier(expr) {
        return Err(UdmlError::UnknownIdentifier {
            name: expr.to_string(),
        });
    }

    Err(UdmlError::InvalidExpression {
        expression: expr.to_string(),
        reason: "only string, number, and boolean literals are supported".to_string(),
    })
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.')
        }
        _ => false,
    }
}
