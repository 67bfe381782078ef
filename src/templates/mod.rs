// ABOUTME: Static prompt-template library compiled in from src/templates/*.md.
// ABOUTME: Templates are minijinja sources rendered with strict undefined-variable checks.

use std::collections::HashMap;

use minijinja::{Environment, UndefinedBehavior};

pub const ANALYZE_TRANSCRIPT: &str = include_str!("analyze_transcript.md");
pub const CHAIN_OF_DENSITY: &str = include_str!("chain_of_density.md");
pub const DISTILL_KNOWLEDGE: &str = include_str!("distill_knowledge.md");
pub const EXTRACT_RELEVANT_LINKS: &str = include_str!("extract_relevant_links.md");
pub const GENERATE_PROMPT: &str = include_str!("generate_prompt.md");
pub const GENERATE_SEARCH_TERMS: &str = include_str!("generate_search_terms.md");
pub const PROMPT_TAGGING: &str = include_str!("prompt_tagging.md");
pub const STABLE_DIFFUSION_PROMPT: &str = include_str!("stable_diffusion_prompt.md");
pub const TREE_OF_THOUGHT: &str = include_str!("tree_of_thought.md");

/// A named prompt template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub template: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),

    #[error("template '{template}' needs a value for '{variable}'")]
    MissingVariable { template: String, variable: String },

    #[error("template error: {0}")]
    Render(#[from] minijinja::Error),
}

const TEMPLATES: [PromptTemplate; 9] = [
    PromptTemplate {
        name: "analyze-transcript",
        description: "Summarize and critique a video transcript",
        template: ANALYZE_TRANSCRIPT,
    },
    PromptTemplate {
        name: "chain-of-density",
        description: "Iteratively denser entity-rich summaries",
        template: CHAIN_OF_DENSITY,
    },
    PromptTemplate {
        name: "distill-knowledge",
        description: "Extract concepts, procedures, and facts from text",
        template: DISTILL_KNOWLEDGE,
    },
    PromptTemplate {
        name: "extract-relevant-links",
        description: "Pick the links that serve a research goal",
        template: EXTRACT_RELEVANT_LINKS,
    },
    PromptTemplate {
        name: "generate-prompt",
        description: "Write a prompt for a described task",
        template: GENERATE_PROMPT,
    },
    PromptTemplate {
        name: "generate-search-terms",
        description: "Produce varied web search queries for a topic",
        template: GENERATE_SEARCH_TERMS,
    },
    PromptTemplate {
        name: "prompt-tagging",
        description: "Tag and categorize a prompt",
        template: PROMPT_TAGGING,
    },
    PromptTemplate {
        name: "stable-diffusion-prompt",
        description: "Turn an idea into a text-to-image prompt",
        template: STABLE_DIFFUSION_PROMPT,
    },
    PromptTemplate {
        name: "tree-of-thought",
        description: "Multi-expert step-by-step reasoning",
        template: TREE_OF_THOUGHT,
    },
];

/// Every template, sorted by name.
pub fn all() -> &'static [PromptTemplate] {
    &TEMPLATES
}

pub fn find(name: &str) -> Option<&'static PromptTemplate> {
    TEMPLATES.iter().find(|t| t.name == name)
}

/// Like `find`, but an unknown name is an error.
pub fn get(name: &str) -> Result<&'static PromptTemplate, TemplateError> {
    find(name).ok_or_else(|| TemplateError::UnknownTemplate(name.to_string()))
}

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    env
}

impl PromptTemplate {
    /// Names of the variables the template reads, sorted.
    pub fn variables(&self) -> Result<Vec<String>, TemplateError> {
        let env = environment();
        let template = env.template_from_named_str(self.name, self.template)?;
        let mut names: Vec<String> = template.undeclared_variables(false).into_iter().collect();
        names.sort();
        Ok(names)
    }

    /// Substitute every variable. Extra entries in `vars` are ignored.
    pub fn render(&self, vars: &HashMap<String, String>) -> Result<String, TemplateError> {
        if let Some(missing) = self
            .variables()?
            .into_iter()
            .find(|name| !vars.contains_key(name))
        {
            return Err(TemplateError::MissingVariable {
                template: self.name.to_string(),
                variable: missing,
            });
        }

        let env = environment();
        let template = env.template_from_named_str(self.name, self.template)?;
        Ok(template.render(vars)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inline(template: &'static str) -> PromptTemplate {
        PromptTemplate {
            name: "inline",
            description: "",
            template,
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn library_is_sorted_and_complete() {
        let names: Vec<&str> = all().iter().map(|t| t.name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 9);
    }

    #[test]
    fn every_template_parses_and_has_a_variable() {
        for template in all() {
            let names = template.variables().unwrap();
            assert!(!names.is_empty(), "{} has no variables", template.name);
        }
    }

    #[test]
    fn variables_are_unique_and_sorted() {
        let t = inline("{{ b }} and {{ a }} then {{ b }} again");
        assert_eq!(t.variables().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn raw_blocks_keep_literal_braces() {
        let t = inline("use {% raw %}{{name}}{% endraw %} for {{ what }}");
        assert_eq!(t.variables().unwrap(), vec!["what"]);
        assert_eq!(
            t.render(&vars(&[("what", "inputs")])).unwrap(),
            "use {{name}} for inputs"
        );
    }

    #[test]
    fn trailing_newline_is_kept() {
        let t = inline("{{ x }}\n");
        assert_eq!(t.render(&vars(&[("x", "1")])).unwrap(), "1\n");
    }

    #[test]
    fn missing_variable_is_reported() {
        let t = inline("{{ x }}{{ y }}");
        let err = t.render(&vars(&[("x", "1")])).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::MissingVariable { ref template, ref variable }
                if template == "inline" && variable == "y"
        ));
    }

    #[test]
    fn syntax_error_is_a_render_error() {
        let t = inline("{{ unclosed");
        assert!(matches!(t.variables(), Err(TemplateError::Render(_))));
    }

    #[test]
    fn unknown_template_lookup() {
        assert!(find("nope").is_none());
        assert!(matches!(
            get("nope"),
            Err(TemplateError::UnknownTemplate(ref name)) if name == "nope"
        ));
    }
}
