// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Grammar-independent visitor infrastructure.
//!
//! Grammar crates build two kinds of visitors on top of this module:
//!
//! - **Rewriting visitors** return a (possibly) new tree. Their default
//!   traversal rebuilds nodes with `with_*`, so untouched subtrees come back
//!   as the same allocation. The pipeline drives them through the erased
//!   [`TreeVisitor`] interface.
//! - **Accumulating visitors** implement [`Fold`]: they turn every node into
//!   an output value and combine values with an associative `reduce`,
//!   left to right in declared child order. [`fold_children`] is the default
//!   traversal every per-variant hook falls back to.
//!
//! # Example
//!
//! ```ignore
//! struct CountMethods;
//!
//! impl Fold<J> for CountMethods {
//!     type Output = usize;
//!     fn default_to(&mut self, cursor: &Cursor<'_, J>) -> usize {
//!         matches!(cursor.value(), J::MethodDeclaration(_)) as usize
//!     }
//!     fn reduce(&mut self, left: usize, right: usize) -> usize {
//!         left + right
//!     }
//! }
//! ```

use crate::context::ExecutionContext;
use crate::cursor::Cursor;
use crate::tree::{SourceRef, TreeNode};

/// Accumulating traversal over a grammar's node sum type.
pub trait Fold<N: TreeNode> {
    type Output;

    /// Value a node contributes on its own, before its children.
    fn default_to(&mut self, cursor: &Cursor<'_, N>) -> Self::Output;

    /// Combine two values. Must be associative.
    fn reduce(&mut self, left: Self::Output, right: Self::Output) -> Self::Output;
}

/// Default accumulation for the node at `cursor`:
/// `reduce(default_to(node), dispatch(child)...)`, children in declared order.
///
/// `dispatch` is the grammar's per-variant entry point, so overridden hooks
/// are honored for every descendant.
pub fn fold_children<F, N>(
    folder: &mut F,
    cursor: &Cursor<'_, N>,
    dispatch: fn(&mut F, &Cursor<'_, N>) -> F::Output,
) -> F::Output
where
    F: Fold<N> + ?Sized,
    N: TreeNode,
{
    let mut acc = folder.default_to(cursor);
    for child in cursor.value().children() {
        let child_cursor = cursor.push(child);
        let value = dispatch(folder, &child_cursor);
        acc = folder.reduce(acc, value);
    }
    acc
}

/// A rewriting visitor erased over grammars, as the pipeline sees it.
///
/// Implementations return the input handle unchanged for sources of other
/// grammars and for sources they did not change.
pub trait TreeVisitor {
    fn visit_source(&mut self, source: SourceRef, ctx: &mut ExecutionContext) -> SourceRef;
}

/// Visitor that changes nothing, for recipes that only aggregate others.
#[derive(Debug, Default)]
pub struct NoopVisitor;

impl TreeVisitor for NoopVisitor {
    fn visit_source(&mut self, source: SourceRef, _ctx: &mut ExecutionContext) -> SourceRef {
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NodeId;

    #[derive(Debug, Clone)]
    struct Node {
        label: &'static str,
        children: Vec<Node>,
    }

    impl TreeNode for Node {
        fn id(&self) -> NodeId {
            NodeId(0)
        }
        fn kind(&self) -> &'static str {
            "Node"
        }
        fn children(&self) -> Vec<Self> {
            self.children.clone()
        }
    }

    fn leaf(label: &'static str) -> Node {
        Node {
            label,
            children: Vec::new(),
        }
    }

    struct Labels;

    impl Fold<Node> for Labels {
        type Output = String;
        fn default_to(&mut self, cursor: &Cursor<'_, Node>) -> String {
            cursor.value().label.to_string()
        }
        fn reduce(&mut self, left: String, right: String) -> String {
            left + &right
        }
    }

    fn dispatch(folder: &mut Labels, cursor: &Cursor<'_, Node>) -> String {
        fold_children(folder, cursor, dispatch)
    }

    #[test]
    fn folds_in_pre_order() {
        let tree = Node {
            label: "a",
            children: vec![
                Node {
                    label: "b",
                    children: vec![leaf("c")],
                },
                leaf("d"),
            ],
        };
        let cursor = Cursor::root(tree);
        assert_eq!(dispatch(&mut Labels, &cursor), "abcd");
    }

    struct Depths(Vec<usize>);

    impl Fold<Node> for Depths {
        type Output = ();
        fn default_to(&mut self, cursor: &Cursor<'_, Node>) {
            self.0.push(cursor.depth());
        }
        fn reduce(&mut self, _left: (), _right: ()) {}
    }

    fn depth_dispatch(folder: &mut Depths, cursor: &Cursor<'_, Node>) {
        fold_children(folder, cursor, depth_dispatch)
    }

    #[test]
    fn children_see_their_ancestors() {
        let tree = Node {
            label: "a",
            children: vec![Node {
                label: "b",
                children: vec![leaf("c")],
            }],
        };
        let mut depths = Depths(Vec::new());
        depth_dispatch(&mut depths, &Cursor::root(tree));
        assert_eq!(depths.0, vec![0, 1, 2]);
    }
}
