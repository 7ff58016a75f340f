//! Converts an evaluated view tree to safe static HTML for preview embedding.
//! No scripts, no inline event handlers; only structure and a fixed stylesheet.

use std::fmt::Write;

use crate::render::RenderOutcome;
use crate::view::{PropValue, ViewChild, ViewNode};

/// Fixed preview stylesheet. Variant classes mirror the vocabulary's closed
/// prop sets, so every reachable view node has a style.
const UDML_BASE_STYLES: &str = "html,body{margin:0;background:#f3f4f6;color:#111827;font-family:sans-serif;}\
.ud-container{padding:24px;max-width:896px;margin:0 auto;}\
.ud-card{background:#fff;border:1px solid #e5e7eb;border-radius:12px;margin-bottom:24px;overflow:hidden;}\
.ud-card-header{background:#f9fafb;padding:16px 24px;border-bottom:1px solid #f3f4f6;font-weight:600;}\
.ud-card-body{padding:24px;}\
.ud-card-footer{background:#f9fafb;padding:12px 24px;border-top:1px solid #e5e7eb;font-size:14px;color:#6b7280;}\
.ud-btn{padding:8px 16px;border-radius:8px;font-weight:500;border:none;cursor:pointer;}\
.ud-btn-primary{background:#2563eb;color:#fff;}\
.ud-btn-secondary{background:#fff;color:#374151;border:1px solid #d1d5db;}\
.ud-btn-danger{background:#ef4444;color:#fff;}\
.ud-btn-ghost{background:none;color:#4b5563;}\
.ud-field{margin-bottom:16px;}\
.ud-field label{display:block;font-size:14px;font-weight:500;color:#374151;margin-bottom:6px;}\
.ud-field input{width:100%;border:1px solid #d1d5db;border-radius:8px;padding:10px 16px;box-sizing:border-box;}\
.ud-alert{padding:16px;border-radius:8px;border:1px solid;margin-bottom:16px;}\
.ud-alert-info{background:#eff6ff;color:#1e40af;border-color:#bfdbfe;}\
.ud-alert-success{background:#f0fdf4;color:#166534;border-color:#bbf7d0;}\
.ud-alert-warning{background:#fefce8;color:#854d0e;border-color:#fef08a;}\
.ud-row{display:flex;flex-wrap:wrap;gap:16px;}\
.ud-col{flex:1;}\
.ud-error{background:#fee2e2;color:#b91c1c;border:1px solid #fecaca;padding:16px;border-radius:8px;font-family:monospace;font-size:14px;}";

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn prop_text(view: &ViewNode, name: &str) -> Option<String> {
    view.prop(name).map(|v| v.to_string())
}

/// Render a view tree to an HTML fragment.
pub fn view_to_html(view: &ViewNode) -> String {
    let mut out = String::new();
    write_node(view, &mut out);
    out
}

/// Full preview page: rendered view, or an error banner on failure. The
/// caller decides whether to keep showing the previous good preview; this
/// document is what replaces it only on success.
pub fn preview_document(outcome: &RenderOutcome, title: &str) -> String {
    let body = match outcome {
        RenderOutcome::Rendered(view) => view_to_html(view),
        RenderOutcome::Failed(message) => {
            format!("<div class=\"ud-error\">{}</div>", escape_html(message))
        }
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        UDML_BASE_STYLES,
        body
    )
}

fn write_children(view: &ViewNode, out: &mut String) {
    for child in &view.children {
        match child {
            ViewChild::Text(text) => out.push_str(&escape_html(text)),
            ViewChild::Node(node) => write_node(node, out),
        }
    }
}

fn write_node(view: &ViewNode, out: &mut String) {
    match view.name.as_str() {
        "Container" => {
            out.push_str("<div class=\"ud-container\">");
            write_children(view, out);
            out.push_str("</div>");
        }
        "Card" => {
            out.push_str("<div class=\"ud-card\">");
            if let Some(title) = prop_text(view, "title") {
                let _ = write!(
                    out,
                    "<div class=\"ud-card-header\">{}</div>",
                    escape_html(&title)
                );
            }
            out.push_str("<div class=\"ud-card-body\">");
            write_children(view, out);
            out.push_str("</div>");
            if let Some(footer) = prop_text(view, "footer") {
                let _ = write!(
                    out,
                    "<div class=\"ud-card-footer\">{}</div>",
                    escape_html(&footer)
                );
            }
            out.push_str("</div>");
        }
        "Button" => {
            let variant = prop_text(view, "variant").unwrap_or_else(|| "primary".to_string());
            let disabled = matches!(view.prop("disabled"), Some(PropValue::Boolean(true)));
            let _ = write!(
                out,
                "<button class=\"ud-btn ud-btn-{}\"{}>",
                variant,
                if disabled { " disabled" } else { "" }
            );
            write_children(view, out);
            out.push_str("</button>");
        }
        "Input" => {
            out.push_str("<div class=\"ud-field\">");
            if let Some(label) = prop_text(view, "label") {
                let _ = write!(out, "<label>{}</label>", escape_html(&label));
            }
            let input_type = prop_text(view, "type").unwrap_or_else(|| "text".to_string());
            let _ = write!(out, "<input type=\"{}\"", input_type);
            if let Some(placeholder) = prop_text(view, "placeholder") {
                let _ = write!(out, " placeholder=\"{}\"", escape_html(&placeholder));
            }
            out.push_str("></div>");
        }
        "Alert" => {
            let kind = prop_text(view, "type").unwrap_or_else(|| "info".to_string());
            let _ = write!(out, "<div class=\"ud-alert ud-alert-{}\">", kind);
            write_children(view, out);
            out.push_str("</div>");
        }
        "Row" => {
            match prop_text(view, "gap") {
                Some(gap) => {
                    let _ = write!(
                        out,
                        "<div class=\"ud-row\" style=\"gap:{}px\">",
                        escape_html(&gap)
                    );
                }
                None => out.push_str("<div class=\"ud-row\">"),
            }
            write_children(view, out);
            out.push_str("</div>");
        }
        "Col" => {
            let width = prop_text(view, "width").unwrap_or_else(|| "1".to_string());
            let style = match prop_text(view, "gap") {
                Some(gap) => format!(
                    "flex:{};display:flex;flex-direction:column;gap:{}px",
                    escape_html(&width),
                    escape_html(&gap)
                ),
                None => format!("flex:{}", escape_html(&width)),
            };
            let _ = write!(out, "<div class=\"ud-col\" style=\"{}\">", style);
            write_children(view, out);
            out.push_str("</div>");
        }
        // Custom registered components render as a tagged block.
        other => {
            let _ = write!(
                out,
                "<div data-component=\"{}\">",
                escape_html(other)
            );
            write_children(view, out);
            out.push_str("</div>");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderEngine;

    #[test]
    fn test_card_html_has_title_and_footer() {
        let outcome =
            RenderEngine::builtin().render(r#"<Card title="Login" footer="v2">hi</Card>"#);
        let html = view_to_html(outcome.view().unwrap());
        assert!(html.contains("ud-card-header\">Login</div>"));
        assert!(html.contains("ud-card-footer\">v2</div>"));
        assert!(html.contains("ud-card-body\">hi</div>"));
    }

    #[test]
    fn test_text_content_is_escaped() {
        let outcome = RenderEngine::builtin().render("<Alert>a &amp; b</Alert>");
        let html = view_to_html(outcome.view().unwrap());
        assert!(html.contains("a &amp; b"));
        assert!(!html.contains("<script"));
    }

    #[test]
    fn test_failed_outcome_becomes_error_banner() {
        let outcome = RenderEngine::builtin().render("<Foo/>");
        let doc = preview_document(&outcome, "Preview");
        assert!(doc.contains("ud-error"));
        assert!(doc.contains("unknown identifier: Foo"));
    }

    #[test]
    fn test_disabled_button_carries_attribute() {
        let outcome =
            RenderEngine::builtin().render(r#"<Button disabled="true">Wait</Button>"#);
        let html = view_to_html(outcome.view().unwrap());
        assert!(html.contains("<button class=\"ud-btn ud-btn-primary\" disabled>"));
    }

    #[test]
    fn test_row_gap_becomes_inline_style() {
        let outcome = RenderEngine::builtin().render(r#"<Row gap="8"><Col>a</Col></Row>"#);
        let html = view_to_html(outcome.view().unwrap());
        assert!(html.contains("ud-row\" style=\"gap:8px\""));
    }

    #[test]
    fn test_no_event_handlers_emitted() {
        let outcome = RenderEngine::builtin()
            .render(r#"<Container><Button variant="danger">Del</Button></Container>"#);
        let html = view_to_html(outcome.view().unwrap());
        assert!(!html.contains("onclick"));
        assert!(html.contains("ud-btn-danger"));
    }
}
