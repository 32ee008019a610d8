//! Text rendering of decision trees via termtree

use termtree::Tree as TermTree;

use crate::domain::entities::{Node, Tree};

pub trait TreeRender {
    fn to_tree_string(&self, name: &str) -> TermTree<String>;
}

impl TreeRender for Tree {
    /// Renders from the start node following options in display order.
    ///
    /// An answer leading back to one of its own ancestors is shown as a
    /// back-reference instead of being expanded again.
    fn to_tree_string(&self, name: &str) -> TermTree<String> {
        fn build<'t>(tree: &'t Tree, id: &'t str, edge: Option<&str>, path: &mut Vec<&'t str>) -> TermTree<String> {
            let prefix = edge.map(|opt| format!("[{opt}] ")).unwrap_or_default();

            if path.contains(&id) {
                return TermTree::new(format!("{prefix}{id} (back to ancestor)"));
            }
            let Some(node) = tree.node(id) else {
                return TermTree::new(format!("{prefix}{id} (missing)"));
            };

            match node {
                Node::Diagnosis(diagnosis) => TermTree::new(format!("{prefix}{id}: {diagnosis}")),
                Node::Question(q) => {
                    path.push(id);
                    let leaves: Vec<_> = node
                        .edges()
                        .into_iter()
                        .map(|(option, target)| build(tree, target, Some(option), path))
                        .collect();
                    path.pop();
                    TermTree::new(format!("{prefix}{id}: {}", q.question)).with_leaves(leaves)
                }
            }
        }

        let mut path = Vec::new();
        let start = build(self, self.start_node(), None, &mut path);
        TermTree::new(name.to_string()).with_leaves([start])
    }
}
