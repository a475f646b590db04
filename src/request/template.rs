//! Body templating
//!
//! Bodies use `{{.Vars.name}}` substitution sites. Those sites are rewritten
//! into Tera expressions over a `Vars` object and rendered with Tera; anything
//! else inside `{{ }}` is handed to Tera as-is and fails there. Text between
//! actions is literal, so Tera's `{% %}` and `{# #}` have no meaning in it.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tera::{Context, Tera};

use crate::errors::{Result, VolleyError};

/// `{{.Vars.name}}`, with optional whitespace trim markers
static VAR_ACTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{(-?)\s*\.Vars\.([A-Za-z_][A-Za-z0-9_]*)\s*(-?)\}\}").unwrap()
});

/// Any `{{ ... }}` action
static ACTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{\{.*?\}\}").unwrap());

static VAR_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

static VAR_NOT_FOUND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Variable `Vars\.([^`]+)` not found").unwrap()
});

/// Variables exposed to body templates as `Vars.<name>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateContext {
    vars: IndexMap<String, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer configuration variables under command-line `name=value` pairs
    pub fn from_layers(config: &IndexMap<String, String>, cli: &[String]) -> Result<Self> {
        let mut ctx = Self::new();
        for (name, value) in config {
            ctx.insert(name, value)?;
        }
        for raw in cli {
            let (name, value) = raw.split_once('=').ok_or_else(|| {
                VolleyError::Argument(format!("variable '{}' must be NAME=VALUE", raw))
            })?;
            ctx.insert(name.trim(), value)?;
        }
        Ok(ctx)
    }

    pub fn insert(&mut self, name: &str, value: &str) -> Result<()> {
        if !VAR_NAME_RE.is_match(name) {
            return Err(VolleyError::Argument(format!(
                "invalid variable name '{}': use letters, digits and underscores",
                name
            )));
        }
        self.vars.insert(name.to_string(), value.to_string());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }
}

/// Render `content` against `ctx`.
///
/// With no variables the content is returned untouched, so static files can
/// contain braces freely.
pub fn render(source_name: &str, content: &[u8], ctx: &TemplateContext) -> Result<Vec<u8>> {
    if ctx.is_empty() {
        return Ok(content.to_vec());
    }

    let text = std::str::from_utf8(content).map_err(|e| VolleyError::Template {
        source_name: source_name.to_string(),
        message: format!("template is not valid UTF-8: {}", e),
    })?;

    let translated = VAR_ACTION_RE.replace_all(text, "{{${1} Vars.${2} ${3}}}");
    let translated = protect_literals(&translated);

    let mut context = Context::new();
    context.insert("Vars", &ctx.vars);

    Tera::one_off(&translated, &context, false)
        .map(String::into_bytes)
        .map_err(|e| VolleyError::Template {
            source_name: source_name.to_string(),
            message: describe_tera_error(&e, ctx),
        })
}

/// Wrap literal text that Tera would read as a tag or comment in a raw block
fn protect_literals(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for action in ACTION_RE.find_iter(text) {
        push_literal(&mut out, &text[last..action.start()]);
        out.push_str(action.as_str());
        last = action.end();
    }
    push_literal(&mut out, &text[last..]);
    out
}

fn push_literal(out: &mut String, literal: &str) {
    if literal.contains("{%") || literal.contains("{#") {
        out.push_str("{% raw %}");
        out.push_str(literal);
        out.push_str("{% endraw %}");
    } else {
        out.push_str(literal);
    }
}

/// Flatten a Tera error chain into one line
fn describe_tera_error(err: &tera::Error, ctx: &TemplateContext) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    let joined = parts.join(": ");

    if let Some(caps) = VAR_NOT_FOUND_RE.captures(&joined) {
        let known: Vec<&str> = ctx.vars.keys().map(String::as_str).collect();
        return format!(
            "undefined variable '{}' (defined: {})",
            &caps[1],
            known.join(", ")
        );
    }
    joined
}
