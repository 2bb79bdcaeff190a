//! Arity-grouping properties: same-named definitions merge within one
//! lexical scope, first occurrence fixes the position, and everything else
//! keeps its order.

use hackeme::{parse_program, Ast, NodeKind};

fn grouped(source: &str) -> Ast {
    parse_program("test.hm", source).expect("source should parse")
}

fn fundef_names(node: &Ast) -> Vec<(&str, usize)> {
    node.children
        .iter()
        .filter(|c| c.kind == NodeKind::Fundef)
        .map(|c| (c.attr("name").unwrap(), c.children.len()))
        .collect()
}

#[test]
fn same_scope_same_name_definitions_collapse() {
    let program = grouped(
        "(define (add) 0)\n\
         (define (add a) a)\n\
         (define (add a b rest.) (plus a b))",
    );

    assert_eq!(program.children.len(), 1);
    let add = &program.children[0];
    assert_eq!(add.kind, NodeKind::Fundef);
    assert_eq!(add.attr("name"), Some("add"));

    assert_eq!(add.children.len(), 3);
    assert!(add.children.iter().all(|c| c.kind == NodeKind::Arity));

    // Declaration order is preserved: zero params, one, then two plus vararg.
    let param_counts: Vec<_> = add
        .children
        .iter()
        .map(|arity| arity.children[0].children.len())
        .collect();
    assert_eq!(param_counts, vec![0, 1, 3]);

    let variadic = &add.children[2].children[0];
    assert_eq!(variadic.children.last().unwrap().kind, NodeKind::Var);
    assert_eq!(
        variadic.children.last().unwrap().value.as_deref(),
        Some("rest")
    );
}

#[test]
fn merged_node_takes_the_position_of_its_first_clause() {
    let program = grouped(
        "(define x 0)\n\
         (define (f a) a)\n\
         (define y 1)\n\
         (define (f a b) (g a b))",
    );

    let kinds: Vec<_> = program.children.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![NodeKind::Vardef, NodeKind::Fundef, NodeKind::Vardef]
    );

    assert_eq!(program.children[0].attr("name"), Some("x"));
    assert_eq!(program.children[2].attr("name"), Some("y"));

    let f = &program.children[1];
    assert_eq!(f.attr("name"), Some("f"));
    assert_eq!(f.children.len(), 2);
}

#[test]
fn each_arity_clause_keeps_its_definition_subtree() {
    let program = grouped(
        "(define (f) 0)\n\
         (define (f a) (define b 1) (g a b))",
    );

    let f = &program.children[0];
    for arity in &f.children {
        let kinds: Vec<_> = arity.children.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::Parameters, NodeKind::Localdefs, NodeKind::Body]
        );
    }

    // The second clause kept its local definition.
    let localdefs = &f.children[1].children[1];
    assert_eq!(localdefs.children.len(), 1);
    assert_eq!(localdefs.children[0].attr("name"), Some("b"));
}

#[test]
fn interleaved_names_group_by_first_occurrence() {
    let program = grouped(
        "(define (f) 0)\n\
         (define (g) 1)\n\
         (define (f a) a)\n\
         (define (g a) a)",
    );

    assert_eq!(fundef_names(&program), vec![("f", 2), ("g", 2)]);
}

#[test]
fn scopes_do_not_merge_across_function_boundaries() {
    let program = grouped(
        "(define (helper x) x)\n\
         (define (outer y)\n\
           (define (helper z) z)\n\
           (helper y))",
    );

    // Two distinct top-level functions, one arity each.
    assert_eq!(fundef_names(&program), vec![("helper", 1), ("outer", 1)]);

    // The nested helper lives in outer's localdefs, unmerged.
    let outer = &program.children[1];
    let localdefs = &outer.children[0].children[1];
    assert_eq!(localdefs.children.len(), 1);
    let nested = &localdefs.children[0];
    assert_eq!(nested.kind, NodeKind::Fundef);
    assert_eq!(nested.attr("name"), Some("helper"));
    assert_eq!(nested.children.len(), 1);
}

#[test]
fn a_nested_definition_sharing_the_outer_name_stays_separate() {
    let program = grouped(
        "(define (f x)\n\
           (define (f y) y)\n\
           (f x))",
    );

    let outer = &program.children[0];
    assert_eq!(outer.attr("name"), Some("f"));
    assert_eq!(outer.children.len(), 1, "outer f has a single arity");

    let localdefs = &outer.children[0].children[1];
    assert_eq!(localdefs.children[0].kind, NodeKind::Fundef);
    assert_eq!(localdefs.children[0].children.len(), 1);
}

#[test]
fn duplicate_identical_arities_are_kept_as_two_clauses() {
    // Structural grouping only: conflicting clauses are a matter for later
    // semantic stages.
    let program = grouped(
        "(define (f) 0)\n\
         (define (f) 1)",
    );

    let f = &program.children[0];
    assert_eq!(f.children.len(), 2);
}

#[test]
fn non_definition_statements_pass_through_untouched() {
    let program = grouped("(display x)\n42\n'(1 2)");
    let kinds: Vec<_> = program.children.iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec![NodeKind::Call, NodeKind::Num, NodeKind::List]);
}

#[test]
fn parsing_twice_yields_deep_equal_trees() {
    let source = "(define (add) 0)\n\
                  (define (add a) a)\n\
                  (define x 3)\n\
                  (if #t (add) (add x))";

    let first = grouped(source);
    let second = grouped(source);
    assert_eq!(first, second);
}

#[test]
fn empty_source_yields_an_empty_program_node() {
    let program = grouped("");
    assert_eq!(program.kind, NodeKind::Hackeme);
    assert!(program.children.is_empty());
}
