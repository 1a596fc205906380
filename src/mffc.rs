//! MFFC labeling (component B): the set of nodes that become
//! dereferenced if a root's own fanout edges are all removed, with a
//! given leaf set protected as the replacement's boundary.
//!
//! Rather than physically bumping and un-bumping real fanout counts (as
//! spec.md §4.B describes at the C-struct level), this tracks virtual
//! "remaining fanout" counts in a scratch map seeded so that boundary
//! leaves can never reach zero -- same effect, no mutation of live AIG
//! state to undo afterwards.
use fxhash::{FxHashMap, FxHashSet};
use crate::aig::{Aig, NodeKind};
use crate::edge::NodeId;

pub struct Mffc {
  pub nodes: FxHashSet<NodeId>,
}

impl Mffc {
  pub fn len(&self) -> usize { self.nodes.len() }
  pub fn is_empty(&self) -> bool { self.nodes.is_empty() }
  pub fn contains(&self, id: NodeId) -> bool { self.nodes.contains(&id) }
}

/// Label the maximum fanout-free cone rooted at `root`, treating `leaves`
/// as the external boundary that must never be absorbed into the cone
/// (step 1 of §4.B, done virtually -- see module docs).
pub fn label_mffc(aig: &Aig, root: NodeId, leaves: &[NodeId]) -> Mffc {
  let mut remaining: FxHashMap<NodeId, i64> = FxHashMap::default();
  for &leaf in leaves {
    // seed with one extra "phantom" fanout so a protected leaf can never
    // be fully dereferenced by this labeling pass.
    remaining.insert(leaf, aig.fanout_count(leaf) as i64 + 1);
  }
  let mut marked = FxHashSet::default();
  marked.insert(root);
  deref_rec(aig, root, &mut remaining, &mut marked);
  Mffc { nodes: marked }
}

fn deref_rec(aig: &Aig, id: NodeId, remaining: &mut FxHashMap<NodeId, i64>, marked: &mut FxHashSet<NodeId>) {
  if let Some((a, b)) = aig.node(id).fanin_edges() {
    for fanin in [a.node(), b.node()] {
      let left = remaining.entry(fanin).or_insert_with(|| aig.fanout_count(fanin) as i64);
      *left -= 1;
      if *left == 0 && matches!(aig.node(fanin).kind, NodeKind::And(..)) {
        marked.insert(fanin);
        deref_rec(aig, fanin, remaining, marked);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::aig::Aig;

  #[test] fn test_mffc_simple_cone() {
    let mut a = Aig::new();
    let x = a.create_pi(); let y = a.create_pi(); let z = a.create_pi();
    let xy = a.and(x, y);
    let root = a.and(xy, z);
    let mffc = label_mffc(&a, root.node(), &[x.node(), y.node(), z.node()]);
    assert!(mffc.contains(root.node()));
    assert!(mffc.contains(xy.node()));
    assert_eq!(mffc.len(), 2);
  }

  #[test] fn test_mffc_excludes_externally_used_node() {
    // xy has fanout 2 (one internal into root, one external PO): it must
    // not be absorbed into root's MFFC. (§8 scenario 5)
    let mut a = Aig::new();
    let x = a.create_pi(); let y = a.create_pi(); let z = a.create_pi();
    let xy = a.and(x, y);
    let root = a.and(xy, z);
    a.create_po(xy); // external use
    let mffc = label_mffc(&a, root.node(), &[x.node(), y.node(), z.node()]);
    assert!(mffc.contains(root.node()));
    assert!(!mffc.contains(xy.node()), "externally-used node must survive the root's removal");
    assert_eq!(mffc.len(), 1);
  }
}
