// ABOUTME: Integration tests for the compiled-in prompt template library.
// ABOUTME: Renders real templates and checks lookup and error reporting.

use std::collections::HashMap;

use ava::templates::{self, TemplateError};

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn every_name_is_findable() {
    for template in templates::all() {
        assert_eq!(templates::find(template.name), Some(template));
        assert!(!template.description.is_empty());
    }
}

#[test]
fn analyze_transcript_variables() {
    let template = templates::get("analyze-transcript").unwrap();
    assert_eq!(template.variables().unwrap(), vec!["title", "transcript"]);
}

#[test]
fn render_fills_every_variable() {
    for template in templates::all() {
        let names = template.variables().unwrap();
        let values: HashMap<String, String> = names
            .iter()
            .map(|name| (name.clone(), format!("<<{name}>>")))
            .collect();
        let rendered = template.render(&values).unwrap();
        for name in &names {
            assert!(rendered.contains(&format!("<<{name}>>")), "{}", template.name);
            assert!(
                !rendered.contains(&format!("{{{{ {name} }}}}")),
                "{}",
                template.name
            );
        }
    }
}

#[test]
fn generate_prompt_keeps_literal_braces() {
    let template = templates::get("generate-prompt").unwrap();
    assert_eq!(template.variables().unwrap(), vec!["task"]);
    let rendered = template.render(&vars(&[("task", "write tests")])).unwrap();
    assert!(rendered.contains("{{placeholders}}"));
    assert!(rendered.contains("write tests"));
}

#[test]
fn extra_variables_are_ignored() {
    let template = templates::get("tree-of-thought").unwrap();
    let rendered = template
        .render(&vars(&[("question", "2+2?"), ("unused", "x")]))
        .unwrap();
    assert!(rendered.contains("2+2?"));
}

#[test]
fn missing_variable_names_template_and_variable() {
    let template = templates::get("generate-search-terms").unwrap();
    let err = template.render(&vars(&[("topic", "rust")])).unwrap_err();
    assert!(err.to_string().contains("count"));
    assert!(matches!(
        err,
        TemplateError::MissingVariable { ref template, ref variable }
            if template == "generate-search-terms" && variable == "count"
    ));
}
