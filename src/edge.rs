//! Node ids and edges: the atoms the rest of the engine is built from.
//!
//! An [`Edge`] is a `(NodeId, complement-bit)` pair packed into a `u32`.
//! Inversion lives on the edge, never on the node it points to -- the
//! design note in the spec calls this "pointer soup -> arena + stable
//! ids": every reference into the AIG is a small, identity-less value,
//! never a raw pointer.
use std::fmt;

/// Stable 32-bit index into the network's node arena.
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
  /// id 0 is reserved for the constant node.
  pub const CONST: NodeId = NodeId(0);
  #[inline] pub fn index(self) -> usize { self.0 as usize }
}

impl fmt::Display for NodeId {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "n{}", self.0) }
}

/// A `(NodeId, complement)` pair, packed into a `u32`: bit 0 is the
/// complement flag, the remaining 31 bits are the node index.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Edge(u32);

const INV: u32 = 1;

impl Edge {
  #[inline] pub fn new(node: NodeId, inv: bool) -> Self { Edge((node.0 << 1) | (inv as u32)) }
  #[inline] pub fn node(self) -> NodeId { NodeId(self.0 >> 1) }
  #[inline] pub fn is_inv(self) -> bool { (self.0 & INV) != 0 }
  #[inline] pub fn raw(self) -> u32 { self.0 }
  #[inline] pub fn to_inv(self, inv: bool) -> Edge { if inv { !self } else { self } }

  /// The constant-0 edge: the positive polarity of the constant node.
  pub const FALSE: Edge = Edge(NodeId::CONST.0 << 1);
  /// The constant-1 edge: the complemented constant node.
  pub const TRUE: Edge = Edge((NodeId::CONST.0 << 1) | INV);

  #[inline] pub fn is_const(self) -> bool { self.node() == NodeId::CONST }
  #[inline] pub fn is_const0(self) -> bool { self == Edge::FALSE }
  #[inline] pub fn is_const1(self) -> bool { self == Edge::TRUE }
}

impl std::ops::Not for Edge {
  type Output = Edge;
  fn not(self) -> Edge { Edge(self.0 ^ INV) }
}

impl fmt::Debug for Edge {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    if self.is_inv() { write!(f, "!{}", self.node()) } else { write!(f, "{}", self.node()) }
  }
}
impl fmt::Display for Edge {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { fmt::Debug::fmt(self, f) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test] fn test_edge_pack() {
    let n = NodeId(7);
    let e = Edge::new(n, false);
    assert_eq!(e.node(), n);
    assert!(!e.is_inv());
    let ne = !e;
    assert_eq!(ne.node(), n);
    assert!(ne.is_inv());
    assert_eq!(!ne, e);
  }

  #[test] fn test_const_edges() {
    assert!(Edge::FALSE.is_const());
    assert!(Edge::TRUE.is_const());
    assert_ne!(Edge::FALSE, Edge::TRUE);
    assert_eq!(!Edge::FALSE, Edge::TRUE);
  }
}
