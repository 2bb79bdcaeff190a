//! AST module for the hackeme front end
//!
//! Provides the canonical tree node type shared by the canonicalizer and the
//! arity grouper, together with the depth-first walk protocol that drives
//! tree-rewriting passes.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// NODE VOCABULARY
// ============================================================================

/// The closed vocabulary of canonical node tags.
///
/// `Id`, `Num`, and `Str` are token leaves copied through from the lexical
/// level; everything else is produced by a canonicalization transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "hackeme")]
    Hackeme,
    #[serde(rename = "vardef")]
    Vardef,
    #[serde(rename = "fundef")]
    Fundef,
    #[serde(rename = "parameters")]
    Parameters,
    #[serde(rename = "parameter")]
    Parameter,
    #[serde(rename = "var")]
    Var,
    #[serde(rename = "localdefs")]
    Localdefs,
    #[serde(rename = "body")]
    Body,
    #[serde(rename = "if_expr")]
    IfExpr,
    #[serde(rename = "test")]
    Test,
    #[serde(rename = "consequent")]
    Consequent,
    #[serde(rename = "alternate")]
    Alternate,
    #[serde(rename = "cond")]
    Cond,
    #[serde(rename = "branch")]
    Branch,
    #[serde(rename = "call")]
    Call,
    #[serde(rename = "callee")]
    Callee,
    #[serde(rename = "arguments")]
    Arguments,
    #[serde(rename = "operator")]
    Operator,
    #[serde(rename = "TRUE")]
    True,
    #[serde(rename = "FALSE")]
    False,
    #[serde(rename = "list")]
    List,
    #[serde(rename = "arity")]
    Arity,
    #[serde(rename = "ID")]
    Id,
    #[serde(rename = "NUM")]
    Num,
    #[serde(rename = "STR")]
    Str,
}

impl NodeKind {
    /// The canonical tag string for this kind.
    pub const fn tag(self) -> &'static str {
        match self {
            NodeKind::Hackeme => "hackeme",
            NodeKind::Vardef => "vardef",
            NodeKind::Fundef => "fundef",
            NodeKind::Parameters => "parameters",
            NodeKind::Parameter => "parameter",
            NodeKind::Var => "var",
            NodeKind::Localdefs => "localdefs",
            NodeKind::Body => "body",
            NodeKind::IfExpr => "if_expr",
            NodeKind::Test => "test",
            NodeKind::Consequent => "consequent",
            NodeKind::Alternate => "alternate",
            NodeKind::Cond => "cond",
            NodeKind::Branch => "branch",
            NodeKind::Call => "call",
            NodeKind::Callee => "callee",
            NodeKind::Arguments => "arguments",
            NodeKind::Operator => "operator",
            NodeKind::True => "TRUE",
            NodeKind::False => "FALSE",
            NodeKind::List => "list",
            NodeKind::Arity => "arity",
            NodeKind::Id => "ID",
            NodeKind::Num => "NUM",
            NodeKind::Str => "STR",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Child-role tags attached by the grammar to mark which slot a child fills.
///
/// Transforms locate children exclusively through these tags, never through
/// positional indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Name,
    Param,
    Vararg,
    Localdef,
    Body,
    Value,
    Test,
    Consequent,
    Alternate,
    Branch,
    Callee,
    Arg,
    Li,
    Single,
}

// ============================================================================
// TREE NODE
// ============================================================================

/// A canonical tree node.
///
/// Children are exclusively owned and their order is significant (source
/// order). Attributes are leaf metadata: `name` on `vardef`/`fundef`,
/// `value` on `operator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ast {
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub attrs: HashMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<Ast>,
}

impl Ast {
    /// Creates a composite node with no children yet.
    pub fn node(kind: NodeKind) -> Self {
        Ast {
            kind,
            role: None,
            value: None,
            attrs: HashMap::new(),
            children: Vec::new(),
        }
    }

    /// Creates a terminal leaf carrying its lexical value.
    pub fn leaf(kind: NodeKind, value: impl Into<String>) -> Self {
        Ast {
            kind,
            role: None,
            value: Some(value.into()),
            attrs: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = Some(role);
    }

    pub fn clear_role(&mut self) {
        self.role = None;
    }

    /// Appends a child, preserving insertion order.
    pub fn push(&mut self, child: Ast) {
        self.children.push(child);
    }

    /// Children carrying the given role tag, in order.
    pub fn tagged(&self, role: Role) -> impl Iterator<Item = &Ast> {
        self.children.iter().filter(move |c| c.role == Some(role))
    }

    /// Copies kind, role, attributes, and value, but none of the children.
    ///
    /// Every node entering the grouped tree goes through this so that the
    /// canonical tree and the grouped tree never alias a node.
    pub fn shape_clone(&self) -> Ast {
        Ast {
            kind: self.kind,
            role: self.role,
            value: self.value.clone(),
            attrs: self.attrs.clone(),
            children: Vec::new(),
        }
    }

    /// Depth-first walk in document order.
    ///
    /// Composite nodes get an `enter`/`exit` pair around their children;
    /// childless nodes get a single `visit` and are never descended into.
    pub fn walk(&self, visitor: &mut dyn TreeVisitor) {
        if self.children.is_empty() {
            visitor.visit(self);
            return;
        }
        visitor.enter(self);
        for child in &self.children {
            child.walk(visitor);
        }
        visitor.exit(self);
    }

    /// Renders the tree as a compact s-expression, for inspection and tests.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.render(&mut out);
        out
    }

    fn render(&self, out: &mut String) {
        match self.kind {
            NodeKind::Id | NodeKind::Num => {
                out.push_str(self.value.as_deref().unwrap_or(""));
            }
            NodeKind::Str => {
                out.push('"');
                out.push_str(self.value.as_deref().unwrap_or(""));
                out.push('"');
            }
            _ => {
                out.push('(');
                out.push_str(self.kind.tag());
                if let Some(value) = &self.value {
                    out.push(' ');
                    out.push_str(value);
                }
                let mut attrs: Vec<_> = self.attrs.iter().collect();
                attrs.sort();
                for (key, value) in attrs {
                    out.push_str(" :");
                    out.push_str(key);
                    out.push(' ');
                    out.push_str(value);
                }
                for child in &self.children {
                    out.push(' ');
                    child.render(out);
                }
                out.push(')');
            }
        }
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}

// ============================================================================
// WALK PROTOCOL
// ============================================================================

/// Callbacks for the depth-first walk.
///
/// `enter` and `exit` bracket composite nodes; `visit` fires once for each
/// childless node.
pub trait TreeVisitor {
    fn enter(&mut self, node: &Ast);
    fn exit(&mut self, node: &Ast);
    fn visit(&mut self, node: &Ast);
}
