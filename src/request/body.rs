//! Body pipeline
//!
//! Exactly one source provides the request body. Sources are tried in order:
//!
//! 1. `-d` (literal, `@path` or `stdin`)
//! 2. `-t` template file
//! 3. `-F` form fields
//! 4. configured `body`, then configured `template`
//! 5. configured `form` fields
//! 6. legacy `--file` / configured `file`
//! 7. piped stdin (never an interactive terminal)
//!
//! Text sources are rendered against the template variables when any are set.

use std::io::Read;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;

use crate::errors::{Result, VolleyError};
use crate::models::FormEncoding;
use super::form::{self, EncodedForm, MultipartField, FILE_INDICATOR};
use super::template::{self, TemplateContext};

/// Reference value meaning "read standard input"
pub const STDIN_REFERENCE: &str = "stdin";

/// Where a `-d`/`body` value points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyReference {
    Inline(String),
    File(PathBuf),
    Stdin,
}

impl BodyReference {
    pub fn parse(raw: &str) -> Self {
        if raw == STDIN_REFERENCE || raw == "@-" {
            return BodyReference::Stdin;
        }
        match raw.strip_prefix(FILE_INDICATOR) {
            Some(path) => BodyReference::File(PathBuf::from(path)),
            None => BodyReference::Inline(raw.to_string()),
        }
    }
}

/// Every place a body may come from, command line and configuration
#[derive(Debug, Clone, Default)]
pub struct BodySources {
    pub data: Option<String>,
    pub template: Option<PathBuf>,
    pub form: Vec<String>,
    pub form_encoding: FormEncoding,
    pub config_body: Option<String>,
    pub config_template: Option<PathBuf>,
    pub config_form: Vec<String>,
    pub legacy_file: Option<PathBuf>,
}

/// Resolved body content
#[derive(Debug, Clone)]
pub enum BodyPayload {
    Bytes(Bytes),
    /// Parts are loaded once; a fresh form is assembled per request
    Multipart(Vec<MultipartField>),
}

#[derive(Debug, Clone)]
pub struct ResolvedBody {
    pub payload: BodyPayload,
    /// Content type implied by the source (forms only)
    pub content_type_hint: Option<&'static str>,
    /// Human readable origin, used in logs and errors
    pub source_name: String,
}

impl ResolvedBody {
    pub fn is_form(&self) -> bool {
        self.content_type_hint.is_some()
    }

    fn bytes(data: Vec<u8>, source_name: impl Into<String>) -> Self {
        Self {
            payload: BodyPayload::Bytes(Bytes::from(data)),
            content_type_hint: None,
            source_name: source_name.into(),
        }
    }

    fn form(encoded: EncodedForm, source_name: &str) -> Self {
        let hint = encoded.content_type();
        let payload = match encoded {
            EncodedForm::UrlEncoded(data) => BodyPayload::Bytes(data),
            EncodedForm::Multipart(parts) => BodyPayload::Multipart(parts),
        };
        Self { payload, content_type_hint: Some(hint), source_name: source_name.to_string() }
    }
}

/// Resolve the request body.
///
/// `stdin` is `None` when standard input is a terminal or was ignored.
pub fn resolve(
    sources: &BodySources,
    vars: &TemplateContext,
    mut stdin: Option<&mut dyn Read>,
) -> Result<Option<ResolvedBody>> {
    if let Some(raw) = &sources.data {
        return resolve_reference(raw, vars, stdin.take()).map(Some);
    }

    if let Some(path) = &sources.template {
        return resolve_template(path, vars).map(Some);
    }

    if !sources.form.is_empty() {
        let fields = form::parse_fields(&sources.form)?;
        return Ok(Some(ResolvedBody::form(form::encode(&fields, sources.form_encoding)?, "form")));
    }

    if let Some(raw) = &sources.config_body {
        return resolve_reference(raw, vars, stdin.take()).map(Some);
    }

    if let Some(path) = &sources.config_template {
        return resolve_template(path, vars).map(Some);
    }

    if !sources.config_form.is_empty() {
        let fields = form::parse_fields(&sources.config_form)?;
        return Ok(Some(ResolvedBody::form(
            form::encode(&fields, sources.form_encoding)?,
            "config form",
        )));
    }

    if let Some(path) = &sources.legacy_file {
        let name = path.display().to_string();
        let content = read_file(path)?;
        return Ok(Some(ResolvedBody::bytes(template::render(&name, &content, vars)?, name)));
    }

    if let Some(reader) = stdin {
        let content = read_stdin(reader)?;
        if content.is_empty() {
            debug!("stdin is empty, sending no body");
            return Ok(None);
        }
        return Ok(Some(ResolvedBody::bytes(
            template::render("<stdin>", &content, vars)?,
            "<stdin>",
        )));
    }

    Ok(None)
}

fn resolve_reference(
    raw: &str,
    vars: &TemplateContext,
    stdin: Option<&mut dyn Read>,
) -> Result<ResolvedBody> {
    let (name, content) = match BodyReference::parse(raw) {
        BodyReference::Inline(text) => ("<inline>".to_string(), text.into_bytes()),
        BodyReference::File(path) => (path.display().to_string(), read_file(&path)?),
        BodyReference::Stdin => {
            let reader = stdin.ok_or_else(|| {
                VolleyError::Argument("body refers to stdin but stdin is not available".to_string())
            })?;
            ("<stdin>".to_string(), read_stdin(reader)?)
        }
    };
    let rendered = template::render(&name, &content, vars)?;
    debug!(source = %name, bytes = rendered.len(), "resolved body");
    Ok(ResolvedBody::bytes(rendered, name))
}

fn resolve_template(path: &Path, vars: &TemplateContext) -> Result<ResolvedBody> {
    let name = path.display().to_string();
    let content = read_file(path)?;
    let rendered = template::render(&name, &content, vars)?;
    debug!(template = %name, vars = vars.len(), "rendered template");
    Ok(ResolvedBody::bytes(rendered, name))
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        VolleyError::Io(std::io::Error::new(
            e.kind(),
            format!("cannot read '{}': {}", path.display(), e),
        ))
    })
}

fn read_stdin(reader: &mut dyn Read) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Re-encode a YAML (or JSON) document as compact JSON
pub fn coerce_json(content: &[u8]) -> Result<Bytes> {
    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(Bytes::copy_from_slice(content));
    }
    let value: serde_json::Value =
        serde_yaml::from_slice(content).map_err(|e| VolleyError::BodyParse(e.to_string()))?;
    let json = serde_json::to_vec(&value).map_err(|e| VolleyError::BodyParse(e.to_string()))?;
    Ok(Bytes::from(json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn vars(pairs: &[(&str, &str)]) -> TemplateContext {
        let mut ctx = TemplateContext::new();
        for (k, v) in pairs {
            ctx.insert(k, v).unwrap();
        }
        ctx
    }

    fn bytes_of(body: &ResolvedBody) -> &[u8] {
        match &body.payload {
            BodyPayload::Bytes(b) => b,
            BodyPayload::Multipart(_) => panic!("expected bytes"),
        }
    }

    #[test]
    fn test_reference_parse() {
        assert_eq!(BodyReference::parse("stdin"), BodyReference::Stdin);
        assert_eq!(BodyReference::parse("@-"), BodyReference::Stdin);
        assert_eq!(BodyReference::parse("@body.json"), BodyReference::File("body.json".into()));
        assert_eq!(BodyReference::parse("{\"a\":1}"), BodyReference::Inline("{\"a\":1}".into()));
    }

    #[test]
    fn test_inline_data() {
        let sources = BodySources { data: Some("hello".into()), ..Default::default() };
        let body = resolve(&sources, &TemplateContext::new(), None).unwrap().unwrap();
        assert_eq!(bytes_of(&body), b"hello");
        assert!(!body.is_form());
    }

    #[test]
    fn test_file_data_with_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.txt");
        std::fs::write(&path, "Hello, {{.Vars.name}}!").unwrap();

        let sources = BodySources { data: Some(format!("@{}", path.display())), ..Default::default() };
        let body = resolve(&sources, &vars(&[("name", "World")]), None).unwrap().unwrap();
        assert_eq!(bytes_of(&body), b"Hello, World!");
    }

    #[test]
    fn test_no_vars_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("static.tmpl");
        let content = b"{{.Vars.name}} stays \x00\xff";
        std::fs::write(&path, content).unwrap();

        let sources = BodySources { template: Some(path), ..Default::default() };
        let body = resolve(&sources, &TemplateContext::new(), None).unwrap().unwrap();
        assert_eq!(bytes_of(&body), content);
    }

    #[test]
    fn test_precedence_data_over_everything() {
        let sources = BodySources {
            data: Some("cli".into()),
            config_body: Some("config".into()),
            config_form: vec!["a=1".into()],
            ..Default::default()
        };
        let mut stdin = Cursor::new(b"piped".to_vec());
        let body = resolve(&sources, &TemplateContext::new(), Some(&mut stdin)).unwrap().unwrap();
        assert_eq!(bytes_of(&body), b"cli");
    }

    #[test]
    fn test_precedence_config_body_over_config_form() {
        let sources = BodySources {
            config_body: Some("config".into()),
            config_form: vec!["a=1".into()],
            legacy_file: Some("/nonexistent".into()),
            ..Default::default()
        };
        let body = resolve(&sources, &TemplateContext::new(), None).unwrap().unwrap();
        assert_eq!(bytes_of(&body), b"config");
    }

    #[test]
    fn test_config_form_over_legacy_file() {
        let sources = BodySources {
            config_form: vec!["a=1".into(), "b=two words".into()],
            legacy_file: Some("/nonexistent".into()),
            ..Default::default()
        };
        let body = resolve(&sources, &TemplateContext::new(), None).unwrap().unwrap();
        assert_eq!(body.content_type_hint, Some(form::URLENCODED_CONTENT_TYPE));
        assert_eq!(bytes_of(&body), b"a=1&b=two+words");
    }

    #[test]
    fn test_stdin_fallback() {
        let sources = BodySources::default();
        let mut stdin = Cursor::new(b"from pipe".to_vec());
        let body = resolve(&sources, &TemplateContext::new(), Some(&mut stdin)).unwrap().unwrap();
        assert_eq!(bytes_of(&body), b"from pipe");
        assert_eq!(body.source_name, "<stdin>");
    }

    #[test]
    fn test_empty_stdin_means_no_body() {
        let mut stdin = Cursor::new(Vec::new());
        let body = resolve(&BodySources::default(), &TemplateContext::new(), Some(&mut stdin)).unwrap();
        assert!(body.is_none());
        assert!(resolve(&BodySources::default(), &TemplateContext::new(), None).unwrap().is_none());
    }

    #[test]
    fn test_stdin_reference_without_stdin() {
        let sources = BodySources { data: Some("stdin".into()), ..Default::default() };
        assert!(matches!(
            resolve(&sources, &TemplateContext::new(), None),
            Err(VolleyError::Argument(_))
        ));
    }

    #[test]
    fn test_template_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.tmpl");
        std::fs::write(&path, "{{.Vars.unknown}}").unwrap();

        let sources = BodySources { template: Some(path.clone()), ..Default::default() };
        match resolve(&sources, &vars(&[("name", "x")]), None) {
            Err(VolleyError::Template { source_name, .. }) => {
                assert_eq!(source_name, path.display().to_string())
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_coerce_yaml_to_json() {
        let json = coerce_json(b"name: alice\ntags:\n  - a\n  - b\n").unwrap();
        assert_eq!(&json[..], br#"{"name":"alice","tags":["a","b"]}"#);

        let json = coerce_json(b"{ \"b\": 1,  \"a\": [true] }").unwrap();
        assert_eq!(&json[..], br#"{"b":1,"a":[true]}"#);
    }

    #[test]
    fn test_coerce_malformed() {
        assert!(matches!(coerce_json(b"{ unclosed"), Err(VolleyError::BodyParse(_))));
    }
}
