//! Depth-first traversal of a mapping tree with an explicit path stack.

use crate::{
    node::{Mapping, MappingNode, Object},
    routing::RoutingPath,
};
use std::ops::ControlFlow;

///
/// VisitContext
/// Where the visitor currently stands in the tree.
///

#[derive(Clone, Copy, Debug)]
pub struct VisitContext<'a> {
    pub path: &'a [&'a str],

    /// Number of nested objects strictly above the current field.
    pub nested_depth: usize,
}

impl VisitContext<'_> {
    #[must_use]
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }

    #[must_use]
    pub const fn under_nested(&self) -> bool {
        self.nested_depth > 0
    }
}

///
/// Visitor
///

pub trait Visitor<'m> {
    fn visit(&mut self, ctx: VisitContext<'_>, node: &'m MappingNode) -> ControlFlow<()>;
}

/// Visit every field of the mapping in definition order, parents before children.
pub fn walk<'m, V: Visitor<'m>>(mapping: &'m Mapping, visitor: &mut V) -> ControlFlow<()> {
    let mut path = Vec::new();

    walk_object(&mapping.root, &mut path, 0, visitor)
}

fn walk_object<'m, V: Visitor<'m>>(
    object: &'m Object,
    path: &mut Vec<&'m str>,
    nested_depth: usize,
    visitor: &mut V,
) -> ControlFlow<()> {
    for field in object.fields.iter() {
        path.push(&field.name);

        let ctx = VisitContext {
            path: path.as_slice(),
            nested_depth,
        };
        let mut flow = visitor.visit(ctx, &field.node);
        if flow.is_continue() {
            flow = match &field.node {
                MappingNode::Leaf(_) => ControlFlow::Continue(()),
                MappingNode::Object(child) => walk_object(child, path, nested_depth, visitor),
                MappingNode::Nested(child) => walk_object(child, path, nested_depth + 1, visitor),
            };
        }

        path.pop();
        flow?;
    }

    ControlFlow::Continue(())
}

///
/// MatchedField
/// A field selected by the routing path.
///

#[derive(Clone, Debug)]
pub struct MatchedField<'m> {
    pub path: String,
    pub node: &'m MappingNode,
}

///
/// MatchCollector
///

struct MatchCollector<'r, 'm> {
    routing: &'r RoutingPath,
    matched: Vec<MatchedField<'m>>,
}

impl<'m> Visitor<'m> for MatchCollector<'_, 'm> {
    fn visit(&mut self, ctx: VisitContext<'_>, node: &'m MappingNode) -> ControlFlow<()> {
        let path = ctx.dotted();

        // objects are only selected when a literal pattern names them
        let selected = match node {
            MappingNode::Leaf(_) => self.routing.matches(&path),
            MappingNode::Object(_) | MappingNode::Nested(_) => self.routing.names_exactly(&path),
        };

        if selected {
            self.matched.push(MatchedField { path, node });
        }

        ControlFlow::Continue(())
    }
}

/// Every leaf matched by the routing path, plus any object a literal pattern names.
#[must_use]
pub fn collect_matching_leaves<'m>(
    mapping: &'m Mapping,
    routing: &RoutingPath,
) -> Vec<MatchedField<'m>> {
    let mut collector = MatchCollector {
        routing,
        matched: Vec::new(),
    };
    let _ = walk(mapping, &mut collector);

    collector.matched
}

///
/// NestedDimensionCollector
///

#[derive(Default)]
struct NestedDimensionCollector {
    paths: Vec<String>,
}

impl<'m> Visitor<'m> for NestedDimensionCollector {
    fn visit(&mut self, ctx: VisitContext<'_>, node: &'m MappingNode) -> ControlFlow<()> {
        if ctx.under_nested() && node.as_leaf().is_some_and(|leaf| leaf.dimension) {
            self.paths.push(ctx.dotted());
        }

        ControlFlow::Continue(())
    }
}

/// Paths of leaves flagged as dimensions somewhere below a nested object.
#[must_use]
pub fn nested_dimension_paths(mapping: &Mapping) -> Vec<String> {
    let mut collector = NestedDimensionCollector::default();
    let _ = walk(mapping, &mut collector);

    collector.paths
}
