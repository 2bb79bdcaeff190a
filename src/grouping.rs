//! The arity grouper.
//!
//! A single depth-first pass over the canonical AST that collapses
//! same-named `fundef` siblings within one lexical scope into one `fundef`
//! node carrying ordered `arity` children. Every node entering the grouped
//! tree is a fresh shape clone; the canonical tree is left untouched.
//!
//! The pass rebuilds the tree iteratively from the walk callbacks. Nodes
//! under construction live in an arena, with a node stack of handles (top =
//! node whose children are still accumulating) and a parallel scope stack of
//! name-to-handle maps, one per open lexical scope. A merged `fundef` must
//! keep receiving `arity` children after it is already attached to its
//! parent, which is exactly what the arena handles make possible.

use std::collections::HashMap;

use crate::ast::{Ast, NodeKind, TreeVisitor};

/// Groups same-named sibling function definitions in `canonical`, returning
/// the rewritten tree.
pub fn group_arities(canonical: &Ast) -> Ast {
    let mut grouping = ArityGrouping::new();
    canonical.walk(&mut grouping);
    grouping
        .into_grouped_ast()
        .expect("walking a tree always yields a root")
}

/// Tree-walk state for the grouping pass.
pub struct ArityGrouping {
    /// Shape-cloned nodes under construction, addressed by handle.
    arena: Vec<Ast>,
    /// Child handles per arena node, in attachment order.
    edges: Vec<Vec<usize>>,
    /// Ancestors being rebuilt; top is the node receiving children.
    node_stack: Vec<usize>,
    /// One name-to-fundef map per open lexical scope; top is innermost.
    scope_stack: Vec<HashMap<String, usize>>,
    root: Option<usize>,
}

impl ArityGrouping {
    pub fn new() -> Self {
        ArityGrouping {
            arena: Vec::new(),
            edges: Vec::new(),
            node_stack: Vec::new(),
            scope_stack: Vec::new(),
            root: None,
        }
    }

    /// Consumes the state and assembles the grouped tree.
    ///
    /// `None` only if no walk happened at all.
    pub fn into_grouped_ast(self) -> Option<Ast> {
        let root = self.root?;
        let mut slots: Vec<Option<Ast>> = self.arena.into_iter().map(Some).collect();
        Some(assemble(&mut slots, &self.edges, root))
    }

    fn alloc(&mut self, node: Ast) -> usize {
        self.arena.push(node);
        self.edges.push(Vec::new());
        self.arena.len() - 1
    }

    fn attach_to_parent(&mut self, child: usize) {
        if let Some(&parent) = self.node_stack.last() {
            self.edges[parent].push(child);
        }
    }

    fn enter_root(&mut self, node: &Ast) -> usize {
        let id = self.alloc(node.shape_clone());
        self.root = Some(id);
        self.scope_stack = vec![HashMap::new()];
        id
    }

    fn enter_fundef(&mut self, node: &Ast) {
        let name = node
            .attr("name")
            .expect("fundef node without a name attribute")
            .to_string();

        let existing = self
            .scope_stack
            .last()
            .expect("fundef entered with no open scope")
            .get(&name)
            .copied();

        let func = match existing {
            Some(func) => func,
            None => {
                // First occurrence: the merged node takes this position
                // among its siblings.
                let func = self.alloc(node.shape_clone());
                self.attach_to_parent(func);
                self.scope_stack
                    .last_mut()
                    .expect("fundef entered with no open scope")
                    .insert(name, func);
                func
            }
        };

        // One arity clause per original definition, in occurrence order.
        let arity = self.alloc(Ast::node(NodeKind::Arity));
        self.edges[func].push(arity);
        self.node_stack.push(arity);

        // Definitions inside this function's body open a scope of their own.
        self.scope_stack.push(HashMap::new());
    }
}

impl Default for ArityGrouping {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeVisitor for ArityGrouping {
    fn enter(&mut self, node: &Ast) {
        if self.node_stack.is_empty() {
            let id = self.enter_root(node);
            self.node_stack.push(id);
        } else if node.kind == NodeKind::Fundef {
            self.enter_fundef(node);
        } else {
            let id = self.alloc(node.shape_clone());
            self.node_stack.push(id);
        }
    }

    fn exit(&mut self, node: &Ast) {
        let finished = self
            .node_stack
            .pop()
            .expect("exit callback without a matching enter");

        if node.kind == NodeKind::Fundef {
            // The merged node was attached at entry and the popped handle is
            // this definition's arity clause, already a child of it.
            self.scope_stack
                .pop()
                .expect("fundef exit without a matching scope");
        } else {
            self.attach_to_parent(finished);
        }
    }

    fn visit(&mut self, node: &Ast) {
        if self.node_stack.is_empty() {
            // A childless root (empty program): the copy is the whole result.
            self.enter_root(node);
            return;
        }
        let id = self.alloc(node.shape_clone());
        self.attach_to_parent(id);
    }
}

fn assemble(slots: &mut [Option<Ast>], edges: &[Vec<usize>], id: usize) -> Ast {
    let mut node = slots[id].take().expect("arena node assembled twice");
    for &child in &edges[id] {
        node.children.push(assemble(slots, edges, child));
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fundef(name: &str) -> Ast {
        let mut node = Ast::node(NodeKind::Fundef);
        node.set_attr("name", name);
        node.push(Ast::node(NodeKind::Parameters));
        node.push(Ast::node(NodeKind::Localdefs));
        let mut body = Ast::node(NodeKind::Body);
        body.push(Ast::leaf(NodeKind::Num, "1"));
        node.push(body);
        node
    }

    fn vardef(name: &str) -> Ast {
        let mut node = Ast::node(NodeKind::Vardef);
        node.set_attr("name", name);
        node.push(Ast::leaf(NodeKind::Num, "0"));
        node
    }

    #[test]
    fn sibling_fundefs_merge_at_first_position() {
        let mut program = Ast::node(NodeKind::Hackeme);
        program.push(vardef("x"));
        program.push(fundef("f"));
        program.push(vardef("y"));
        program.push(fundef("f"));

        let grouped = group_arities(&program);
        let kinds: Vec<_> = grouped.children.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::Vardef, NodeKind::Fundef, NodeKind::Vardef]
        );

        let merged = &grouped.children[1];
        assert_eq!(merged.attr("name"), Some("f"));
        assert_eq!(merged.children.len(), 2);
        assert!(merged.children.iter().all(|c| c.kind == NodeKind::Arity));
    }

    #[test]
    fn grouping_does_not_alias_the_canonical_tree() {
        let mut program = Ast::node(NodeKind::Hackeme);
        program.push(fundef("f"));
        let before = program.clone();

        let _ = group_arities(&program);
        assert_eq!(program, before);
    }

    #[test]
    fn childless_root_is_copied_through() {
        let program = Ast::node(NodeKind::Hackeme);
        let grouped = group_arities(&program);
        assert_eq!(grouped, program);
    }
}
