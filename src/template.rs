//! HTML template engine used to render the address book page.
//!
//! Workflow:
//! 1. `render_template` loads the child template from the template directory.
//! 2. `tokenize_template` splits content into Text, Variable, and Tag tokens.
//! 3. `parse_tokens` and `parse_nodes` build an AST of `Node`.
//! 4. Child `Block` definitions and the `Extends` tag are collected.
//! 5. `merge_blocks` swaps child blocks into the base template by name.
//! 6. `render_nodes` walks the merged AST and outputs HTML, resolving
//!    variables (HTML-escaped), `if`/`if not` conditions, `for` loops, and the
//!    Tailwind CDN import via `{% tailwind %}`.
//!
//! Runtime logging is controlled via `set_display_logs`.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::router::Response;

/// Global switch for enabling/disabling internal template logs
static DISPLAY_LOGS: Lazy<AtomicBool> = Lazy::new(|| AtomicBool::new(false));

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(\{\{.*?\}\}|\{%.*?%\})").expect("template token pattern is valid")
});

/// Enable or disable internal debug logs for the template engine
pub fn set_display_logs(enabled: bool) {
    DISPLAY_LOGS.store(enabled, Ordering::Relaxed);
}

macro_rules! tdebug {
    ($($arg:tt)+) => {
        if DISPLAY_LOGS.load(Ordering::Relaxed) {
            debug!($($arg)+);
        }
    }
}

/// Supported value types for template context
#[derive(Clone, Debug)]
pub enum TemplateValue {
    String(String),
    Bool(bool),
    Number(f64),
    List(Vec<TemplateValue>),
    Object(HashMap<String, TemplateValue>),
}

impl TemplateValue {
    /// Convert the value to a string for rendering
    pub fn as_string(&self) -> String {
        match self {
            TemplateValue::String(s) => s.clone(),
            TemplateValue::Bool(b) => b.to_string(),
            TemplateValue::Number(n) => n.to_string(),
            TemplateValue::List(_) | TemplateValue::Object(_) => String::new(),
        }
    }

    /// Build an `Object` from key/value pairs.
    pub fn object<K: Into<String>>(pairs: impl IntoIterator<Item = (K, TemplateValue)>) -> Self {
        TemplateValue::Object(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    fn is_truthy(&self) -> bool {
        match self {
            TemplateValue::Bool(b) => *b,
            TemplateValue::String(s) => !s.is_empty(),
            TemplateValue::Number(n) => *n != 0.0,
            TemplateValue::List(l) => !l.is_empty(),
            TemplateValue::Object(o) => !o.is_empty(),
        }
    }
}

impl fmt::Display for TemplateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl From<&str> for TemplateValue {
    fn from(s: &str) -> Self {
        TemplateValue::String(s.to_string())
    }
}

impl From<String> for TemplateValue {
    fn from(s: String) -> Self {
        TemplateValue::String(s)
    }
}

impl From<bool> for TemplateValue {
    fn from(b: bool) -> Self {
        TemplateValue::Bool(b)
    }
}

impl From<usize> for TemplateValue {
    fn from(n: usize) -> Self {
        TemplateValue::Number(n as f64)
    }
}

/// Token types extracted from the template
#[derive(Debug, Clone)]
pub enum Token {
    Text(String),     // Plain text
    Variable(String), // {{ variable }}
    Tag(String),      // {% tag %}
}

/// AST node types for the template engine
#[derive(Debug, Clone)]
pub enum Node {
    Text(String),
    Variable(String),
    If {
        condition: String,
        negated: bool,
        then_body: Vec<Node>,
        else_body: Vec<Node>,
    },
    For {
        var_name: String,
        list_name: String,
        body: Vec<Node>,
    },
    Block {
        name: String,
        body: Vec<Node>,
    },
    Extends(String), // {% extends "base.html" %}
    Tailwind,        // {% tailwind %}
}

/// Tokenizes the template content into a Vec<Token>
pub fn tokenize_template(content: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut last_end = 0;
    for mat in TOKEN_RE.find_iter(content) {
        let start = mat.start();
        if start > last_end {
            tokens.push(Token::Text(content[last_end..start].to_string()));
        }
        let m = mat.as_str();
        if let Some(inner) = m.strip_prefix("{{").and_then(|s| s.strip_suffix("}}")) {
            let inner = inner.trim().to_string();
            tdebug!("tokenize: Variable '{}'", inner);
            tokens.push(Token::Variable(inner));
        } else if let Some(inner) = m.strip_prefix("{%").and_then(|s| s.strip_suffix("%}")) {
            let inner = inner.trim().to_string();
            tdebug!("tokenize: Tag '{}'", inner);
            tokens.push(Token::Tag(inner));
        }
        last_end = mat.end();
    }
    if last_end < content.len() {
        tokens.push(Token::Text(content[last_end..].to_string()));
    }
    tokens
}

/// Parses a sequence of Token into an AST of Node
pub fn parse_tokens(tokens: &[Token]) -> Vec<Node> {
    let mut idx = 0;
    parse_nodes(tokens, &mut idx, &[])
}

/// Recursive parser: consumes tokens until one of `end_tags` is found
fn parse_nodes(tokens: &[Token], idx: &mut usize, end_tags: &[&str]) -> Vec<Node> {
    let mut nodes = Vec::new();
    while *idx < tokens.len() {
        match &tokens[*idx] {
            Token::Text(t) => {
                nodes.push(Node::Text(t.clone()));
                *idx += 1;
            }
            Token::Variable(v) => {
                nodes.push(Node::Variable(v.clone()));
                *idx += 1;
            }
            Token::Tag(tag) => {
                let t = tag.trim();
                if end_tags.contains(&t) {
                    break;
                }
                if let Some(rest) = t.strip_prefix("extends ") {
                    nodes.push(Node::Extends(rest.trim().trim_matches('"').to_string()));
                    *idx += 1;
                    continue;
                }
                if let Some(name) = t.strip_prefix("block ") {
                    *idx += 1;
                    let body = parse_nodes(tokens, idx, &["endblock"]);
                    *idx += 1; // endblock
                    nodes.push(Node::Block {
                        name: name.trim().to_string(),
                        body,
                    });
                    continue;
                }
                if let Some(cond) = t.strip_prefix("if ") {
                    let cond = cond.trim();
                    let (condition, negated) = match cond.strip_prefix("not ") {
                        Some(inner) => (inner.trim(), true),
                        None => (cond, false),
                    };
                    *idx += 1;
                    let then_body = parse_nodes(tokens, idx, &["else", "endif"]);
                    let mut else_body = Vec::new();
                    if let Some(Token::Tag(tt)) = tokens.get(*idx) {
                        if tt.trim() == "else" {
                            *idx += 1;
                            else_body = parse_nodes(tokens, idx, &["endif"]);
                        }
                    }
                    *idx += 1; // endif
                    nodes.push(Node::If {
                        condition: condition.to_string(),
                        negated,
                        then_body,
                        else_body,
                    });
                    continue;
                }
                if let Some(rest) = t.strip_prefix("for ") {
                    let parts: Vec<&str> = rest.split_whitespace().collect();
                    if parts.len() == 3 && parts[1] == "in" {
                        *idx += 1;
                        let body = parse_nodes(tokens, idx, &["endfor"]);
                        *idx += 1; // endfor
                        nodes.push(Node::For {
                            var_name: parts[0].to_string(),
                            list_name: parts[2].to_string(),
                            body,
                        });
                        continue;
                    }
                }
                if t == "tailwind" {
                    nodes.push(Node::Tailwind);
                    *idx += 1;
                    continue;
                }
                tdebug!("parse: skipping unknown tag '{}'", t);
                *idx += 1;
            }
        }
    }
    nodes
}

/// Resolves a dotted variable path 'a.b.c' within the context
fn resolve_variable<'a>(
    name: &str,
    context: &'a HashMap<String, TemplateValue>,
) -> Option<&'a TemplateValue> {
    let mut parts = name.split('.');
    let mut current = context.get(parts.next()?)?;
    for key in parts {
        match current {
            TemplateValue::Object(map) => current = map.get(key)?,
            _ => return None,
        }
    }
    Some(current)
}

/// Escape text for safe inclusion in HTML bodies and quoted attributes.
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

/// Merges child blocks into base AST by matching block names
fn merge_blocks(nodes: &[Node], child_blocks: &HashMap<String, Vec<Node>>) -> Vec<Node> {
    nodes
        .iter()
        .map(|node| match node {
            Node::Block { name, body } => Node::Block {
                name: name.clone(),
                body: match child_blocks.get(name) {
                    Some(child) => child.clone(),
                    None => merge_blocks(body, child_blocks),
                },
            },
            Node::If {
                condition,
                negated,
                then_body,
                else_body,
            } => Node::If {
                condition: condition.clone(),
                negated: *negated,
                then_body: merge_blocks(then_body, child_blocks),
                else_body: merge_blocks(else_body, child_blocks),
            },
            Node::For {
                var_name,
                list_name,
                body,
            } => Node::For {
                var_name: var_name.clone(),
                list_name: list_name.clone(),
                body: merge_blocks(body, child_blocks),
            },
            other => other.clone(),
        })
        .collect()
}

/// Renders the AST into an HTML string using the context
pub fn render_nodes(nodes: &[Node], context: &HashMap<String, TemplateValue>) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Variable(name) => {
                if let Some(val) = resolve_variable(name, context) {
                    out.push_str(&escape_html(&val.as_string()));
                }
            }
            Node::If {
                condition,
                negated,
                then_body,
                else_body,
            } => {
                let truthy = resolve_variable(condition, context)
                    .map(TemplateValue::is_truthy)
                    .unwrap_or(false);
                if truthy != *negated {
                    out.push_str(&render_nodes(then_body, context));
                } else {
                    out.push_str(&render_nodes(else_body, context));
                }
            }
            Node::For {
                var_name,
                list_name,
                body,
            } => {
                if let Some(TemplateValue::List(items)) = resolve_variable(list_name, context) {
                    let mut local = context.clone();
                    for item in items {
                        local.insert(var_name.clone(), item.clone());
                        out.push_str(&render_nodes(body, &local));
                    }
                }
            }
            Node::Block { body, .. } => {
                out.push_str(&render_nodes(body, context));
            }
            Node::Extends(_) => {}
            Node::Tailwind => {
                tdebug!("Inserting Tailwind CDN link");
                out.push_str(r#"<script src="https://cdn.tailwindcss.com"></script>"#);
            }
        }
    }
    out
}

fn html_response(status_code: u16, body: String) -> Response {
    let mut response = Response::html(body);
    response.status_code = status_code;
    response
}

/// Load `template_name` from `dir`, merge it into its base template if it
/// extends one, and render it with `context`.
pub fn render_template(
    dir: impl AsRef<Path>,
    template_name: &str,
    context: &HashMap<String, TemplateValue>,
) -> Response {
    let dir = dir.as_ref();
    let child = match std::fs::read_to_string(dir.join(template_name)) {
        Ok(c) => c,
        Err(e) => {
            log::error!("Template '{}' could not be read: {}", template_name, e);
            return html_response(404, format!("Template '{}' not found", template_name));
        }
    };
    let child_nodes = parse_tokens(&tokenize_template(&child));
    tdebug!("Child AST: {:?}", child_nodes);

    let mut child_blocks = HashMap::new();
    let mut base_name: Option<String> = None;
    for node in &child_nodes {
        match node {
            Node::Extends(b) => base_name = Some(b.clone()),
            Node::Block { name, body } => {
                child_blocks.insert(name.clone(), body.clone());
            }
            _ => {}
        }
    }

    let html = match base_name {
        Some(base) => {
            let base_content = match std::fs::read_to_string(dir.join(&base)) {
                Ok(c) => c,
                Err(e) => {
                    log::error!("Base template '{}' could not be read: {}", base, e);
                    return html_response(404, format!("Template '{}' not found", base));
                }
            };
            let base_nodes = parse_tokens(&tokenize_template(&base_content));
            let merged = merge_blocks(&base_nodes, &child_blocks);
            tdebug!("Merged AST: {:?}", merged);
            render_nodes(&merged, context)
        }
        None => render_nodes(&child_nodes, context),
    };

    html_response(200, html)
}
