//! Hackeme grammar engine.
//!
//! Parses source text with the pest grammar and reduces the resulting pair
//! tree bottom-up into the canonical AST. Role rules tag the slot a child
//! fills; production rules are handed to the transform registered for them
//! in [`transforms`](crate::syntax::transforms). The reduction order mirrors
//! production-reduction order: children are canonicalized before their
//! parent's transform runs.

use miette::SourceSpan;
use pest::{error::Error, iterators::Pair, Parser};
use pest_derive::Parser;

use crate::ast::{Ast, NodeKind, Role};
use crate::errors::{ErrorKind, HackemeError, SourceContext};
use crate::syntax::transforms::{self, Reduction};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct HackemeParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses hackeme source into the canonical (pre-grouping) AST.
///
/// The returned root is a `hackeme` node. Syntax errors surface as
/// `ErrorKind::Syntax`; no partial tree is produced.
pub fn parse(source: &str, ctx: &SourceContext) -> Result<Ast, HackemeError> {
    let mut pairs = HackemeParser::parse(Rule::start, source)
        .map_err(|e| convert_parse_error(e, ctx))?;

    let start = pairs.next().unwrap(); // pest guarantees the start rule exists
    reduce(start, ctx)
}

// ============================================================================
// REDUCTION DRIVER
// ============================================================================

fn reduce(pair: Pair<'_, Rule>, ctx: &SourceContext) -> Result<Ast, HackemeError> {
    let rule = pair.as_rule();
    let text = pair.as_str();
    let span = span_of(&pair);

    // Role rules wrap exactly one child and exist only to tag it.
    if let Some(role) = role_of(rule) {
        let mut node = match pair.into_inner().next() {
            Some(inner) => reduce(inner, ctx)?,
            // Atomic role rules (vararg) expose no inner pair; the matched
            // token itself is the child.
            None => Ast::leaf(NodeKind::Id, text),
        };
        node.set_role(role);
        return Ok(node);
    }

    // Terminal tokens pass through as leaves.
    if let Some(kind) = token_kind(rule) {
        return Ok(Ast::leaf(kind, text));
    }

    // A production: canonicalize the children first, then apply the
    // registered transform for this production.
    let mut children = Vec::new();
    for inner in pair.into_inner() {
        if inner.as_rule() == Rule::EOI {
            continue;
        }
        children.push(reduce(inner, ctx)?);
    }

    let reduction = Reduction {
        rule,
        span,
        text,
        children,
    };
    let transform = transforms::transform_for(rule)
        .unwrap_or_else(|| unreachable!("no transform registered for grammar rule {rule:?}"));
    transform(reduction, ctx)
}

fn role_of(rule: Rule) -> Option<Role> {
    Some(match rule {
        Rule::name => Role::Name,
        Rule::param => Role::Param,
        Rule::vararg => Role::Vararg,
        Rule::localdef => Role::Localdef,
        Rule::body => Role::Body,
        Rule::value => Role::Value,
        Rule::test => Role::Test,
        Rule::consequent => Role::Consequent,
        Rule::alternate => Role::Alternate,
        Rule::branch => Role::Branch,
        Rule::callee => Role::Callee,
        Rule::arg => Role::Arg,
        Rule::li => Role::Li,
        Rule::single => Role::Single,
        _ => return None,
    })
}

fn token_kind(rule: Rule) -> Option<NodeKind> {
    Some(match rule {
        Rule::identifier => NodeKind::Id,
        Rule::number => NodeKind::Num,
        Rule::string => NodeKind::Str,
        _ => return None,
    })
}

// ============================================================================
// UTILITIES
// ============================================================================

fn span_of(pair: &Pair<'_, Rule>) -> SourceSpan {
    let span = pair.as_span();
    (span.start()..span.end()).into()
}

fn convert_parse_error(error: Error<Rule>, ctx: &SourceContext) -> HackemeError {
    let span: SourceSpan = match error.location {
        pest::error::InputLocation::Pos(pos) => (pos..pos).into(),
        pest::error::InputLocation::Span((start, end)) => (start..end).into(),
    };

    let message = error.variant.message().to_string();
    ctx.report(ErrorKind::Syntax { message }, span)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(source: &str) -> Result<Ast, HackemeError> {
        let ctx = SourceContext::from_source("test.hm", source);
        parse(source, &ctx)
    }

    #[test]
    fn empty_input_yields_empty_program() {
        let program = parse_str("").unwrap();
        assert_eq!(program.kind, NodeKind::Hackeme);
        assert!(program.children.is_empty());
    }

    #[test]
    fn simple_number_is_a_leaf_statement() {
        let program = parse_str("42").unwrap();
        assert_eq!(program.children.len(), 1);
        assert_eq!(program.children[0], Ast::leaf(NodeKind::Num, "42"));
    }

    #[test]
    fn comments_are_invisible() {
        let program = parse_str("; greeting\n(display x) ; trailing\n").unwrap();
        assert_eq!(program.children.len(), 1);
        assert_eq!(program.children[0].kind, NodeKind::Call);
    }

    #[test]
    fn unclosed_list_is_a_syntax_error() {
        let err = parse_str("(f 1").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Syntax { .. }));
    }

    #[test]
    fn stray_closing_paren_is_a_syntax_error() {
        assert!(parse_str(")").is_err());
    }
}
