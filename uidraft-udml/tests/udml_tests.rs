use pretty_assertions::assert_eq;
use uidraft_udml::{
    render, validate, ComponentSpec, PropSpec, PropValue, Registry, RenderEngine, RenderOutcome,
    UdmlError, ViewChild,
};

// --- Registry contract ---

#[test]
fn test_register_then_resolve_round_trip() {
    let mut registry = Registry::new();
    let spec = ComponentSpec::new("Hero", vec![PropSpec::text("headline")], true);
    registry.register(spec.clone()).unwrap();
    assert_eq!(registry.resolve("Hero").unwrap(), &spec);
}

#[test]
fn test_duplicate_registration_fails_and_preserves_registry() {
    let mut registry = Registry::builtin();
    let size_before = registry.len();
    let result = registry.register(ComponentSpec::new("Button", vec![], false));
    assert!(matches!(result, Err(UdmlError::DuplicateName { .. })));
    assert_eq!(registry.len(), size_before);
    // Original Button spec is intact, children still accepted.
    assert!(registry.resolve("Button").unwrap().accepts_children);
}

#[test]
fn test_prompt_scope_and_execution_scope_share_names() {
    let registry = Registry::builtin();
    let grammar = registry.grammar_summary();
    let engine = RenderEngine::new(std::sync::Arc::new(registry));
    for name in engine.registry().all_names() {
        assert!(grammar.contains(&name));
        let outcome = engine.render(&format!("<Container><{0}></{0}></Container>", name));
        // Every advertised name is renderable (all built-ins accept children
        // or tolerate an empty element).
        assert!(
            outcome.is_rendered(),
            "{} failed: {:?}",
            name,
            outcome.error()
        );
    }
}

// --- Render engine: well-formed vocabulary source always renders ---

#[test]
fn test_vocabulary_only_source_renders() {
    let sources = [
        "<Container/>",
        r#"<Card title="Stats"><Row><Col width="2">left</Col><Col>right</Col></Row></Card>"#,
        r#"<Alert type="warning">Careful</Alert>"#,
        r#"<Container>
  <Card title="Login card" footer="New here? Sign up">
    <Input label="Email" placeholder="you@example.com"/>
    <Input label="Password" type="password"/>
    <Row>
      <Button variant="primary">Sign in</Button>
      <Button variant="ghost">Cancel</Button>
    </Row>
  </Card>
</Container>"#,
    ];
    for source in sources {
        let outcome = render(source);
        assert!(outcome.is_rendered(), "failed for {source}: {:?}", outcome.error());
    }
}

#[test]
fn test_unregistered_identifier_always_fails() {
    let outcome = render("<Container><Widget/></Container>");
    assert_eq!(outcome.error(), Some("unknown identifier: Widget"));
}

#[test]
fn test_render_idempotence() {
    let source = r#"<Card title="Once"><Button variant="secondary">Again</Button></Card>"#;
    let engine = RenderEngine::builtin();
    assert_eq!(engine.render(source), engine.render(source));
}

#[test]
fn test_idempotence_includes_serialized_form() {
    let engine = RenderEngine::builtin();
    let source = r#"<Row><Col width={2}><Alert type="success">ok</Alert></Col></Row>"#;
    let a = engine.render(source);
    let b = engine.render(source);
    let ja = serde_json::to_string(a.view().unwrap()).unwrap();
    let jb = serde_json::to_string(b.view().unwrap()).unwrap();
    assert_eq!(ja, jb);
}

// --- Sandboxing ---

#[test]
fn test_import_syntax_never_evaluates() {
    let outcome = render("import fs from 'fs';\n<Container/>");
    assert!(matches!(outcome, RenderOutcome::Failed(_)));
}

#[test]
fn test_host_global_in_expression_is_unknown() {
    let outcome = render(r#"<Card title={document}/>"#);
    assert_eq!(outcome.error(), Some("unknown identifier: document"));
}

#[test]
fn test_function_call_expression_rejected() {
    let outcome = render(r#"<Card title={fetch('http://evil')}/>"#);
    assert!(outcome.error().unwrap().contains("Invalid expression"));
}

#[test]
fn test_syntax_error_reported_without_evaluation() {
    let outcome = render("<Container><Card></Container>");
    let message = outcome.error().unwrap();
    assert!(message.contains("XML parse error"), "got: {message}");
}

// --- View tree shape ---

#[test]
fn test_login_card_structure() {
    let outcome = render(
        r#"<Card title="Login">
  <Input label="Email"/>
  <Input label="Password" type="password"/>
  <Button>Sign in</Button>
</Card>"#,
    );
    let view = outcome.view().unwrap();
    assert_eq!(view.name, "Card");
    assert_eq!(view.prop("title"), Some(&PropValue::Text("Login".into())));
    let children: Vec<&str> = view.child_nodes().map(|n| n.name.as_str()).collect();
    assert_eq!(children, vec!["Input", "Input", "Button"]);
    let password = view.child_nodes().nth(1).unwrap();
    assert_eq!(password.prop("type"), Some(&PropValue::Text("password".into())));
}

#[test]
fn test_text_children_preserved() {
    let outcome = render("<Alert>Saved successfully</Alert>");
    let view = outcome.view().unwrap();
    assert_eq!(view.text_content(), "Saved successfully");
    assert!(matches!(view.children[0], ViewChild::Text(_)));
}

#[test]
fn test_defaults_fill_absent_props() {
    let view = render("<Alert>hi</Alert>");
    let view = view.view().unwrap().clone();
    assert_eq!(view.prop("type"), Some(&PropValue::Text("info".into())));
}

// --- Custom registries ---

#[test]
fn test_custom_component_renders_through_custom_registry() {
    let mut registry = Registry::builtin();
    registry
        .register(ComponentSpec::new(
            "Avatar",
            vec![PropSpec::text("initials").required()],
            false,
        ))
        .unwrap();
    let engine = RenderEngine::new(std::sync::Arc::new(registry));

    let ok = engine.render(r#"<Row><Avatar initials="JD"/></Row>"#);
    assert!(ok.is_rendered());

    let missing = engine.render("<Row><Avatar/></Row>");
    assert!(missing
        .error()
        .unwrap()
        .contains("Missing required prop 'initials'"));
}

// --- validate() facade ---

#[test]
fn test_validate_accepts_good_source() {
    assert!(validate(r#"<Container><Row/></Container>"#).is_ok());
}

#[test]
fn test_validate_surfaces_typed_error() {
    assert!(matches!(
        validate("<Bogus/>"),
        Err(UdmlError::UnknownIdentifier { .. })
    ));
}
