//! The canonicalizer: one transform per grammar production.
//!
//! Each transform is a pure, stateless function from a reduced production to
//! exactly one canonical node. Transforms locate children only through role
//! tags, so grammar punctuation and disambiguation productions are invisible
//! downstream. The registry is populated once at start-up; the production
//! set is fixed, so no runtime registration exists.

use std::collections::HashMap;

use miette::SourceSpan;
use once_cell::sync::Lazy;

use crate::ast::{Ast, NodeKind, Role};
use crate::errors::{ErrorKind, HackemeError, SourceContext};
use crate::syntax::parser::Rule;

// ============================================================================
// REDUCTION INPUT
// ============================================================================

/// A matched production, with its children already canonicalized and
/// carrying the role tags the grammar assigned to them.
pub struct Reduction<'src> {
    pub rule: Rule,
    pub span: SourceSpan,
    /// The source slice the production matched (terminal productions read
    /// their token from here).
    pub text: &'src str,
    pub children: Vec<Ast>,
}

impl Reduction<'_> {
    /// Removes and returns the children tagged with `role`, in order.
    pub fn take_tagged(&mut self, role: Role) -> Vec<Ast> {
        let mut taken = Vec::new();
        let mut kept = Vec::new();
        for child in self.children.drain(..) {
            if child.role == Some(role) {
                taken.push(child);
            } else {
                kept.push(child);
            }
        }
        self.children = kept;
        taken
    }

    /// The single meaningful child of a passthrough production.
    pub fn sole_child(mut self, ctx: &SourceContext) -> Result<Ast, HackemeError> {
        if self.children.is_empty() {
            return Err(ctx.report(
                ErrorKind::EmptyProduction {
                    production: self.production(),
                },
                self.span,
            ));
        }
        Ok(self.children.remove(0))
    }

    /// The token value of the required child tagged with `role`.
    pub fn require_value(&mut self, role: Role, ctx: &SourceContext) -> Result<String, HackemeError> {
        let node = self.take_tagged(role).into_iter().next().ok_or_else(|| {
            ctx.report(
                ErrorKind::MissingRole {
                    production: self.production(),
                    role: format!("{role:?}").to_lowercase(),
                },
                self.span,
            )
        })?;
        Ok(node.value.unwrap()) // role rules wrap tokens that carry their lexeme
    }

    fn production(&self) -> String {
        format!("{:?}", self.rule)
    }
}

// ============================================================================
// TRANSFORM REGISTRY
// ============================================================================

pub type Transform = for<'src> fn(Reduction<'src>, &SourceContext) -> Result<Ast, HackemeError>;

static TRANSFORMS: Lazy<HashMap<Rule, Transform>> = Lazy::new(|| {
    let mut table: HashMap<Rule, Transform> = HashMap::new();
    table.insert(Rule::start, start);
    table.insert(Rule::definition, passthrough);
    table.insert(Rule::expr, passthrough);
    table.insert(Rule::no_list, passthrough);
    table.insert(Rule::vardef, vardef);
    table.insert(Rule::fundef, fundef);
    table.insert(Rule::if_expr, if_expr);
    table.insert(Rule::cond_expr, cond_expr);
    table.insert(Rule::cond_branch, cond_branch);
    table.insert(Rule::call, call);
    table.insert(Rule::operator, operator);
    table.insert(Rule::boolean, boolean);
    table.insert(Rule::list, list);
    table.insert(Rule::list_item, list_item);
    table
});

pub fn transform_for(rule: Rule) -> Option<Transform> {
    TRANSFORMS.get(&rule).copied()
}

// ============================================================================
// PER-PRODUCTION TRANSFORMS
// ============================================================================

/// `start`: wraps the program in a `hackeme` node. Role tags propagated onto
/// direct children are cleared so they read as top-level statements.
fn start(mut red: Reduction<'_>, _ctx: &SourceContext) -> Result<Ast, HackemeError> {
    let mut program = Ast::node(NodeKind::Hackeme);
    for mut child in red.children.drain(..) {
        child.clear_role();
        program.push(child);
    }
    Ok(program)
}

/// `definition` / `expr` / `no_list`: grammar disambiguation only, not
/// represented in the canonical tree.
fn passthrough(red: Reduction<'_>, ctx: &SourceContext) -> Result<Ast, HackemeError> {
    red.sole_child(ctx)
}

fn vardef(mut red: Reduction<'_>, ctx: &SourceContext) -> Result<Ast, HackemeError> {
    let mut node = Ast::node(NodeKind::Vardef);
    let name = red.require_value(Role::Name, ctx)?;
    node.set_attr("name", name);
    for child in red.take_tagged(Role::Value) {
        node.push(child);
    }
    Ok(node)
}

fn fundef(mut red: Reduction<'_>, ctx: &SourceContext) -> Result<Ast, HackemeError> {
    let mut node = Ast::node(NodeKind::Fundef);
    let name = red.require_value(Role::Name, ctx)?;
    node.set_attr("name", name);

    let mut params = Ast::node(NodeKind::Parameters);
    for param in red.take_tagged(Role::Param) {
        let token = param.value.unwrap(); // param wraps an identifier token
        params.push(Ast::leaf(NodeKind::Parameter, token));
    }
    if let Some(vararg) = red.take_tagged(Role::Vararg).into_iter().next() {
        let token = vararg.value.unwrap(); // vararg is its own token
        let stripped = token.strip_suffix('.').unwrap_or(&token);
        params.push(Ast::leaf(NodeKind::Var, stripped));
    }
    node.push(params);

    let mut localdefs = Ast::node(NodeKind::Localdefs);
    for def in red.take_tagged(Role::Localdef) {
        localdefs.push(def);
    }
    node.push(localdefs);

    let mut body = Ast::node(NodeKind::Body);
    for form in red.take_tagged(Role::Body) {
        body.push(form);
    }
    node.push(body);

    Ok(node)
}

fn if_expr(mut red: Reduction<'_>, _ctx: &SourceContext) -> Result<Ast, HackemeError> {
    let mut node = Ast::node(NodeKind::IfExpr);
    node.push(wrap(NodeKind::Test, red.take_tagged(Role::Test)));
    node.push(wrap(NodeKind::Consequent, red.take_tagged(Role::Consequent)));
    node.push(wrap(NodeKind::Alternate, red.take_tagged(Role::Alternate)));
    Ok(node)
}

fn cond_expr(mut red: Reduction<'_>, _ctx: &SourceContext) -> Result<Ast, HackemeError> {
    let mut node = Ast::node(NodeKind::Cond);
    for branch in red.take_tagged(Role::Branch) {
        node.push(branch);
    }
    Ok(node)
}

fn cond_branch(mut red: Reduction<'_>, _ctx: &SourceContext) -> Result<Ast, HackemeError> {
    let mut node = Ast::node(NodeKind::Branch);
    node.push(wrap(NodeKind::Test, red.take_tagged(Role::Test)));
    node.push(wrap(NodeKind::Consequent, red.take_tagged(Role::Consequent)));
    Ok(node)
}

fn call(mut red: Reduction<'_>, _ctx: &SourceContext) -> Result<Ast, HackemeError> {
    let mut node = Ast::node(NodeKind::Call);
    node.push(wrap(NodeKind::Callee, red.take_tagged(Role::Callee)));
    node.push(wrap(NodeKind::Arguments, red.take_tagged(Role::Arg)));
    Ok(node)
}

fn operator(red: Reduction<'_>, _ctx: &SourceContext) -> Result<Ast, HackemeError> {
    let mut node = Ast::node(NodeKind::Operator);
    node.set_attr("value", red.text);
    Ok(node)
}

fn boolean(red: Reduction<'_>, _ctx: &SourceContext) -> Result<Ast, HackemeError> {
    if red.text == "#t" || red.text == "#true" {
        Ok(Ast::node(NodeKind::True))
    } else {
        Ok(Ast::node(NodeKind::False))
    }
}

fn list(mut red: Reduction<'_>, _ctx: &SourceContext) -> Result<Ast, HackemeError> {
    let mut node = Ast::node(NodeKind::List);
    for item in red.take_tagged(Role::Li) {
        node.push(item);
    }
    Ok(node)
}

/// `list_item`: a `single` child is a plain expression and is returned
/// directly (role cleared); anything else is a nested list literal.
fn list_item(mut red: Reduction<'_>, _ctx: &SourceContext) -> Result<Ast, HackemeError> {
    if let Some(mut single) = red.take_tagged(Role::Single).into_iter().next() {
        single.clear_role();
        return Ok(single);
    }
    let mut node = Ast::node(NodeKind::List);
    for item in red.take_tagged(Role::Li) {
        node.push(item);
    }
    Ok(node)
}

fn wrap(kind: NodeKind, children: Vec<Ast>) -> Ast {
    let mut node = Ast::node(kind);
    for child in children {
        node.push(child);
    }
    node
}
