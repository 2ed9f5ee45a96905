//! Python syntax layer.
//!
//! Parses source with tree-sitter and lowers the concrete syntax tree into a
//! small tagged-variant model. Only the statement shapes schema extraction
//! cares about are kept (assignments, classes, functions, returns and the
//! bodies of compound statements); everything else lowers to `Other`.

use thiserror::Error;
use tree_sitter::{Node, Parser};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("invalid syntax at line {line}")]
    Invalid { line: usize },
    #[error("failed to load Python grammar: {0}")]
    Grammar(String),
    #[error("parser returned no syntax tree")]
    NoTree,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyModule {
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `a = b = value`; only simple-name targets are recorded.
    Assign { targets: Vec<String>, value: Expr },
    Class(ClassDef),
    Function(FunctionDef),
    Return(Option<Expr>),
    /// Flattened bodies of `if`/`for`/`while`/`try`/`with`/`match`.
    Block(Vec<Stmt>),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    pub name: String,
    /// 1-based line of the `class` keyword.
    pub line: usize,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: String,
    /// Decorator expressions without the leading `@`.
    pub decorators: Vec<String>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Str(String),
    Name(String),
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    /// Anything that is not a literal, kept as source text.
    Other(String),
}

impl Expr {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expr::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a tuple or list literal.
    pub fn as_sequence(&self) -> Option<&[Expr]> {
        match self {
            Expr::Tuple(items) | Expr::List(items) => Some(items),
            _ => None,
        }
    }

    /// Literal string value or bare identifier.
    pub fn as_tag(&self) -> Option<&str> {
        match self {
            Expr::Str(s) | Expr::Name(s) => Some(s),
            _ => None,
        }
    }

    /// Source-like text of the expression, used as a fallback label.
    pub fn label(&self) -> String {
        match self {
            Expr::Str(s) | Expr::Name(s) | Expr::Other(s) => s.clone(),
            Expr::Tuple(items) => format!("({})", join_labels(items)),
            Expr::List(items) => format!("[{}]", join_labels(items)),
            Expr::Dict(_) => "{...}".to_string(),
        }
    }
}

fn join_labels(items: &[Expr]) -> String {
    items.iter().map(Expr::label).collect::<Vec<_>>().join(", ")
}

/// Visit every statement of a scope, descending into compound-statement
/// bodies but never into class or function bodies.
pub fn walk_scope<'a, F>(stmts: &'a [Stmt], visit: &mut F)
where
    F: FnMut(&'a Stmt),
{
    for stmt in stmts {
        match stmt {
            Stmt::Block(inner) => walk_scope(inner, visit),
            other => visit(other),
        }
    }
}

pub fn parse_python_source(source: &str) -> Result<PyModule, SyntaxError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| SyntaxError::Grammar(e.to_string()))?;

    let tree = parser.parse(source, None).ok_or(SyntaxError::NoTree)?;
    let root = tree.root_node();

    if root.has_error() {
        let line = first_error_line(root).unwrap_or(root.start_position().row + 1);
        return Err(SyntaxError::Invalid { line });
    }

    let src = source.as_bytes();
    Ok(PyModule {
        body: lower_block(root, src),
    })
}

fn first_error_line(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error_line)
}

fn named(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

fn text(node: Node, src: &[u8]) -> String {
    node.utf8_text(src).unwrap_or("").to_string()
}

const COMPOUND_STATEMENTS: &[&str] = &[
    "if_statement",
    "for_statement",
    "while_statement",
    "try_statement",
    "with_statement",
    "match_statement",
];

fn lower_block(node: Node, src: &[u8]) -> Vec<Stmt> {
    named(node)
        .into_iter()
        .map(|child| lower_stmt(child, src))
        .collect()
}

fn lower_stmt(node: Node, src: &[u8]) -> Stmt {
    match node.kind() {
        "expression_statement" => match named(node).as_slice() {
            [child] if child.kind() == "assignment" => {
                lower_assignment(*child, src).unwrap_or(Stmt::Other)
            }
            _ => Stmt::Other,
        },
        "class_definition" => lower_class(node, src).unwrap_or(Stmt::Other),
        "function_definition" => lower_function(node, src, Vec::new()).unwrap_or(Stmt::Other),
        "decorated_definition" => lower_decorated(node, src).unwrap_or(Stmt::Other),
        "return_statement" => Stmt::Return(named(node).first().map(|e| lower_expr(*e, src))),
        kind if COMPOUND_STATEMENTS.contains(&kind) || kind.ends_with("_clause") => {
            Stmt::Block(lower_compound(node, src))
        }
        _ => Stmt::Other,
    }
}

fn lower_compound(node: Node, src: &[u8]) -> Vec<Stmt> {
    let mut stmts = Vec::new();
    for child in named(node) {
        if child.kind() == "block" {
            stmts.extend(lower_block(child, src));
        } else if child.kind().ends_with("_clause") {
            stmts.extend(lower_compound(child, src));
        }
    }
    stmts
}

fn lower_assignment(node: Node, src: &[u8]) -> Option<Stmt> {
    let mut targets = Vec::new();
    let mut current = node;
    loop {
        if let Some(left) = current.child_by_field_name("left")
            && left.kind() == "identifier"
        {
            targets.push(text(left, src));
        }
        match current.child_by_field_name("right") {
            Some(right) if right.kind() == "assignment" => current = right,
            Some(right) => {
                return Some(Stmt::Assign {
                    targets,
                    value: lower_expr(right, src),
                });
            }
            // Bare annotation, e.g. `x: int`.
            None => return None,
        }
    }
}

fn lower_class(node: Node, src: &[u8]) -> Option<Stmt> {
    let name = text(node.child_by_field_name("name")?, src);
    let body = node
        .child_by_field_name("body")
        .map(|b| lower_block(b, src))
        .unwrap_or_default();
    Some(Stmt::Class(ClassDef {
        name,
        line: node.start_position().row + 1,
        body,
    }))
}

fn lower_function(node: Node, src: &[u8], decorators: Vec<String>) -> Option<Stmt> {
    let name = text(node.child_by_field_name("name")?, src);
    let body = node
        .child_by_field_name("body")
        .map(|b| lower_block(b, src))
        .unwrap_or_default();
    Some(Stmt::Function(FunctionDef {
        name,
        decorators,
        body,
    }))
}

fn lower_decorated(node: Node, src: &[u8]) -> Option<Stmt> {
    let decorators = named(node)
        .into_iter()
        .filter(|child| child.kind() == "decorator")
        .map(|d| text(d, src).trim_start_matches('@').trim().to_string())
        .collect();
    let definition = node.child_by_field_name("definition")?;
    match definition.kind() {
        "function_definition" => lower_function(definition, src, decorators),
        "class_definition" => lower_class(definition, src),
        _ => None,
    }
}

fn lower_expr(node: Node, src: &[u8]) -> Expr {
    match node.kind() {
        "string" => lower_string(node, src),
        "concatenated_string" => {
            let mut joined = String::new();
            for part in named(node) {
                match lower_string(part, src) {
                    Expr::Str(s) => joined.push_str(&s),
                    _ => return Expr::Other(text(node, src)),
                }
            }
            Expr::Str(joined)
        }
        "identifier" => Expr::Name(text(node, src)),
        "tuple" | "expression_list" => Expr::Tuple(lower_items(node, src)),
        "list" => Expr::List(lower_items(node, src)),
        "dictionary" => Expr::Dict(
            named(node)
                .into_iter()
                .filter(|child| child.kind() == "pair")
                .filter_map(|pair| {
                    let key = pair.child_by_field_name("key")?;
                    let value = pair.child_by_field_name("value")?;
                    Some((lower_expr(key, src), lower_expr(value, src)))
                })
                .collect(),
        ),
        "parenthesized_expression" => match named(node).as_slice() {
            [inner] => lower_expr(*inner, src),
            _ => Expr::Other(text(node, src)),
        },
        _ => Expr::Other(text(node, src)),
    }
}

fn lower_items(node: Node, src: &[u8]) -> Vec<Expr> {
    named(node)
        .into_iter()
        .map(|child| lower_expr(child, src))
        .collect()
}

fn has_interpolation(node: Node) -> bool {
    if node.kind() == "interpolation" {
        return true;
    }
    named(node).into_iter().any(has_interpolation)
}

fn lower_string(node: Node, src: &[u8]) -> Expr {
    let raw = text(node, src);
    if node.kind() != "string" || has_interpolation(node) {
        return Expr::Other(raw);
    }

    let quote_start = raw.find(['"', '\'']).unwrap_or(0);
    let (prefix, quoted) = raw.split_at(quote_start);
    let delimiter = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        3
    } else {
        1
    };
    if quoted.len() < delimiter * 2 {
        return Expr::Other(raw);
    }
    let body = &quoted[delimiter..quoted.len() - delimiter];

    if prefix.contains(['r', 'R']) {
        Expr::Str(body.to_string())
    } else {
        Expr::Str(unescape(body))
    }
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\n') => {}
            Some(kind @ ('x' | 'u' | 'U')) => {
                let width = match kind {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = (0..width).filter_map(|_| chars.next()).collect();
                match u32::from_str_radix(&digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push(kind);
                        out.push_str(&digits);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
