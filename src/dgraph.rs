//! Decomposition graph (DGraph, component D): a small factored-form
//! AND/OR DAG used as a replacement *blueprint* for both rewriting and
//! refactoring (§3, §4.D). A DGraph is never part of the AIG -- its
//! leaves are unbound placeholders, resolved to real AIG edges only when
//! `network::graph_update_network` splices the blueprint in.
//!
//! Mirrors `Edge`/`NodeId`'s "small packed value, not a pointer" design
//! from `edge.rs`, but over the DGraph's own local index space so a
//! blueprint can be built and thrown away independently of any `Aig`.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DNodeId(pub u32);
impl DNodeId { #[inline] pub fn index(self) -> usize { self.0 as usize } }

/// A `(DNodeId, complement)` pair, packed exactly like `edge::Edge`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DEdge(u32);
const INV: u32 = 1;

impl DEdge {
  #[inline] pub const fn new(node: DNodeId, inv: bool) -> Self { DEdge((node.0 << 1) | (inv as u32)) }
  #[inline] pub fn node(self) -> DNodeId { DNodeId(self.0 >> 1) }
  #[inline] pub fn is_inv(self) -> bool { (self.0 & INV) != 0 }
}
impl std::ops::Not for DEdge { type Output = DEdge; fn not(self) -> DEdge { DEdge(self.0 ^ INV) } }
impl fmt::Debug for DEdge {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    if self.is_inv() { write!(f, "!d{}", self.node().0) } else { write!(f, "d{}", self.node().0) }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DKind {
  /// The constant node, id 0 (mirrors `Aig`'s reserved id-0 constant).
  Const,
  /// An external binding point, indexed `[0, nLeaves)`.
  Leaf(u32),
  /// Two-input AND. OR is never a distinct node kind -- `add_or` builds
  /// it as a negated-inputs AND per §3 ("OR ... stored internally as
  /// negated-inputs AND") and returns the complemented edge, so no node
  /// in this table is ever tagged `Or`.
  And(DEdge, DEdge),
}

/// A factored-form replacement blueprint. `n_leaves` external binding
/// points occupy ids `[1, n_leaves]`; internal AND nodes are appended
/// after them. One edge is the designated root; `complement()` flips a
/// graph-wide sign bit on that root without touching any node.
#[derive(Debug, Clone)]
pub struct DGraph {
  nodes: Vec<DKind>,
  n_leaves: u32,
  root: Option<DEdge>,
}

impl DGraph {
  pub const FALSE: DEdge = DEdge::new(DNodeId(0), false);
  pub const TRUE: DEdge = DEdge::new(DNodeId(0), true);

  pub fn new(n_leaves: u32) -> Self {
    let mut nodes = Vec::with_capacity(1 + n_leaves as usize);
    nodes.push(DKind::Const);
    for i in 0..n_leaves { nodes.push(DKind::Leaf(i)); }
    DGraph { nodes, n_leaves, root: None }
  }

  pub fn n_leaves(&self) -> u32 { self.n_leaves }
  pub fn len(&self) -> usize { self.nodes.len() }
  pub fn is_empty(&self) -> bool { false }
  pub fn leaf(&self, i: u32) -> DEdge { debug_assert!(i < self.n_leaves); DEdge::new(DNodeId(1 + i), false) }
  pub fn kind(&self, id: DNodeId) -> DKind { self.nodes[id.index()] }
  pub fn is_leaf_or_const(&self, id: DNodeId) -> bool { !matches!(self.kind(id), DKind::And(..)) }

  pub fn set_root(&mut self, e: DEdge) { self.root = Some(e); }
  pub fn root(&self) -> DEdge { self.root.expect("DGraph::root() called before set_root") }
  pub fn complement(&mut self) { self.root = self.root.map(|e| !e); }

  /// Structurally simplified two-input AND (mirrors `Aig::and`'s trivial
  /// cases, so a blueprint never carries redundant internal nodes).
  pub fn add_and(&mut self, e0: DEdge, e1: DEdge) -> DEdge {
    if e0 == e1 { return e0; }
    if e0 == !e1 { return Self::FALSE; }
    if e0 == Self::FALSE || e1 == Self::FALSE { return Self::FALSE; }
    if e0 == Self::TRUE { return e1; }
    if e1 == Self::TRUE { return e0; }
    let id = DNodeId(self.nodes.len() as u32);
    self.nodes.push(DKind::And(e0, e1));
    DEdge::new(id, false)
  }

  /// `a OR b = !(!a AND !b)`, per §3/§4.D.
  pub fn add_or(&mut self, e0: DEdge, e1: DEdge) -> DEdge { !self.add_and(!e0, !e1) }

  /// Internal AND nodes reachable from `root`, in post-order (fanins
  /// before the node that uses them) with no duplicates -- the walk
  /// order `graph_to_network_count`/`graph_update_network` depend on.
  pub fn postorder(&self, root: DEdge) -> Vec<DNodeId> {
    let mut order = Vec::new();
    let mut seen = vec![false; self.nodes.len()];
    let mut stack: Vec<(DNodeId, bool)> = vec![(root.node(), false)];
    while let Some((id, expanded)) = stack.pop() {
      if seen[id.index()] { continue; }
      if self.is_leaf_or_const(id) { seen[id.index()] = true; continue; }
      if expanded { seen[id.index()] = true; order.push(id); continue; }
      stack.push((id, true));
      if let DKind::And(a, b) = self.kind(id) {
        if !seen[a.node().index()] { stack.push((a.node(), false)); }
        if !seen[b.node().index()] { stack.push((b.node(), false)); }
      }
    }
    order
  }

  /// Evaluate the blueprint's function as a truth table over its
  /// leaves, for equivalence-testing the factoring/library machinery.
  #[cfg(test)]
  pub fn truth(&self) -> crate::truth::TruthTable {
    use crate::truth::TruthTable;
    let nv = self.n_leaves as u8;
    let mut memo: std::collections::HashMap<DNodeId, TruthTable> = std::collections::HashMap::new();
    memo.insert(DNodeId(0), TruthTable::zeros(nv));
    for i in 0..self.n_leaves { memo.insert(DNodeId(1 + i), TruthTable::literal(nv, i as u8)); }
    fn eval(g: &DGraph, e: DEdge, memo: &mut std::collections::HashMap<DNodeId, TruthTable>) -> TruthTable {
      if let Some(t) = memo.get(&e.node()) {
        let t = t.clone();
        return if e.is_inv() { t.not() } else { t };
      }
      let t = match g.kind(e.node()) {
        DKind::And(a, b) => eval(g, a, memo).and(&eval(g, b, memo)),
        _ => unreachable!(),
      };
      memo.insert(e.node(), t.clone());
      if e.is_inv() { t.not() } else { t }
    }
    eval(self, self.root(), &mut memo)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test] fn test_and_or_simplification() {
    let mut g = DGraph::new(2);
    let a = g.leaf(0); let b = g.leaf(1);
    assert_eq!(g.add_and(a, a), a);
    assert_eq!(g.add_and(a, !a), DGraph::FALSE);
    assert_eq!(g.add_and(a, DGraph::TRUE), a);
    assert_eq!(g.add_and(a, DGraph::FALSE), DGraph::FALSE);
    let ab = g.add_and(a, b);
    assert_ne!(ab, a);
    assert_ne!(ab, b);
  }

  #[test] fn test_postorder_fanins_first() {
    let mut g = DGraph::new(3);
    let a = g.leaf(0); let b = g.leaf(1); let c = g.leaf(2);
    let ab = g.add_and(a, b);
    let abc = g.add_and(ab, c);
    let order = g.postorder(abc);
    assert_eq!(order, vec![ab.node(), abc.node()]);
  }

  #[test] fn test_truth_matches_and_or() {
    let mut g = DGraph::new(2);
    let a = g.leaf(0); let b = g.leaf(1);
    let or = g.add_or(a, b);
    g.set_root(or);
    let t = g.truth();
    for i in 0..4 { assert_eq!(t.get(i), (i & 1 != 0) || (i & 2 != 0)); }
  }
}
