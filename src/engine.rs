//! Front-end pipeline entry points.
//!
//! Source text flows through two phases: the grammar engine plus
//! canonicalizer produce the canonical AST, and the arity grouper rewrites
//! it into the tree later stages consume. Both phases are deterministic pure
//! functions of their input; parsing the same text twice yields
//! structurally identical trees.

use crate::ast::Ast;
use crate::errors::{HackemeError, SourceContext};
use crate::grouping::group_arities;
use crate::syntax;

/// Parses hackeme source and returns the grouped canonical AST.
///
/// This is the contract later stages rely on: within any lexical scope, all
/// `fundef` nodes sharing a name have been collapsed into one node with
/// ordered `arity` children. A syntax error means no AST is produced.
pub fn parse_program(name: &str, source: &str) -> Result<Ast, HackemeError> {
    let canonical = canonicalize(name, source)?;
    Ok(group_arities(&canonical))
}

/// Parses hackeme source into the canonical AST, before arity grouping.
pub fn canonicalize(name: &str, source: &str) -> Result<Ast, HackemeError> {
    let ctx = SourceContext::from_source(name, source);
    syntax::parser::parse(source, &ctx)
}
