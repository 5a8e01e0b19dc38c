use crate::node::Firmware;
use crate::path::NodePath;

/// An operation dispatched over every node of a firmware tree.
///
/// [`Firmware::apply`] calls [`visit`](Visitor::visit) on a node, then
/// forwards the visitor to each of its children in order unless
/// [`descend`](Visitor::descend) returns `false` for that node. A visitor
/// that has nothing to do for a kind simply returns `Ok(())` and the walk
/// carries on below it.
pub trait Visitor {
    type Error;

    /// Handle one node. `path` locates it relative to the root of the walk.
    fn visit(&mut self, node: &mut Firmware, path: &NodePath) -> Result<(), Self::Error>;

    /// Whether to forward the visitor to `node`'s children.
    fn descend(&self, _node: &Firmware) -> bool {
        true
    }
}
