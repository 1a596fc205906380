//! DFS, cycle detection and level recomputation over the AIG substrate
//! (§4.A). Generalized from the teacher's `Walkable` trait
//! (`vhl.rs::Walkable::step`, which recurses hi/lo with a `HashSet` of
//! seen nids) to an explicit work-stack walk over AND fanins, per the
//! "recursion -> explicit work stack" design note: AIG-wide traversals
//! are not bounded by a cut/cone size, so they must not recurse.
use crate::aig::{Aig, NodeKind};
use crate::edge::{Edge, NodeId};
use crate::error::{AigError, AigResult};

/// Topological (fanins-before-node) collection of internal AND nodes
/// reachable from `roots`. PIs and the constant are skipped; a node
/// appears once, immediately after both its fanins.
pub fn dfs_topo(aig: &mut Aig, roots: &[Edge]) -> Vec<NodeId> {
  let trav = aig.new_trav();
  let mut order = Vec::new();
  let mut stack: Vec<(NodeId, bool)> = Vec::new();
  for &r in roots {
    if matches!(aig.node(r.node()).kind, NodeKind::And(..)) && !aig.is_marked(r.node(), trav) {
      stack.push((r.node(), false));
    }
    while let Some((id, expanded)) = stack.pop() {
      if aig.is_marked(id, trav) { continue; }
      if expanded {
        aig.mark(id, trav);
        order.push(id);
        continue;
      }
      stack.push((id, true));
      if let Some((a, b)) = aig.node(id).fanin_edges() {
        for e in [a, b] {
          if matches!(aig.node(e.node()).kind, NodeKind::And(..)) && !aig.is_marked(e.node(), trav) {
            stack.push((e.node(), false));
          }
        }
      }
    }
  }
  order
}

/// Three-color DFS looking for a back-edge among internal AND nodes.
/// Returns the witness chain (node ids forming the cycle) on failure.
pub fn check_acyclic(aig: &mut Aig) -> AigResult<()> {
  let on_path = aig.new_trav();
  let done = aig.new_trav();
  debug_assert!(done == on_path + 1);

  // explicit-stack DFS; each frame tracks which fanin (0 or 1) to visit next.
  let roots: Vec<Edge> = aig.pos.iter().map(|&po| aig.po_fanin(po)).collect();
  let mut path: Vec<NodeId> = Vec::new();
  let mut stack: Vec<(NodeId, u8)> = Vec::new();

  for r in roots {
    if !matches!(aig.node(r.node()).kind, NodeKind::And(..)) { continue; }
    if aig.is_marked(r.node(), done) { continue; }
    stack.push((r.node(), 0));
    path.push(r.node());
    aig.mark(r.node(), on_path);
    while let Some(&(id, next)) = stack.last() {
      let fanins = aig.node(id).fanin_edges();
      let child = fanins.and_then(|(a, b)| [a, b].get(next as usize).copied());
      match child {
        Some(e) => {
          stack.last_mut().unwrap().1 = next + 1;
          if matches!(aig.node(e.node()).kind, NodeKind::And(..)) {
            if aig.is_marked(e.node(), on_path) {
              let mut witness: Vec<NodeId> = path.iter().skip_while(|&&n| n != e.node()).copied().collect();
              witness.push(e.node());
              return Err(AigError::Cycle { witness });
            }
            if !aig.is_marked(e.node(), done) {
              stack.push((e.node(), 0));
              path.push(e.node());
              aig.mark(e.node(), on_path);
            }
          }
        }
        None => {
          aig.mark(id, done);
          stack.pop();
          path.pop();
        }
      }
    }
  }
  Ok(())
}

/// Recompute `level` for every live AND node from scratch, in any order
/// (levels are memoized via a topological pass). PIs/const stay at 0.
pub fn recompute_levels(aig: &mut Aig) {
  let roots: Vec<Edge> = aig.pos.iter().map(|&po| aig.po_fanin(po)).collect();
  let order = dfs_topo(aig, &roots);
  for id in order {
    if let Some((a, b)) = aig.node(id).fanin_edges() {
      let level = 1 + aig.edge_level(a).max(aig.edge_level(b));
      aig.set_level(id, level);
    }
  }
  for &po in &aig.pos.clone() {
    let fanin = aig.po_fanin(po);
    aig.set_level(po, 1 + aig.edge_level(fanin));
  }
}

/// Network depth: the maximum level over all nodes.
pub fn depth(aig: &Aig) -> u32 {
  aig.pos.iter().map(|&po| aig.level(po)).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::aig::Aig;

  #[test] fn test_topo_order_fanins_first() {
    let mut a = Aig::new();
    let x = a.create_pi(); let y = a.create_pi(); let z = a.create_pi();
    let xy = a.and(x, y);
    let xyz = a.and(xy, z);
    let order = dfs_topo(&mut a, &[xyz]);
    assert_eq!(order, vec![xy.node(), xyz.node()]);
  }

  #[test] fn test_acyclic_simple() {
    let mut a = Aig::new();
    let x = a.create_pi(); let y = a.create_pi();
    let xy = a.and(x, y);
    a.create_po(xy);
    assert!(check_acyclic(&mut a).is_ok());
  }

  #[test] fn test_cycle_detected_with_witness() {
    // x = a & y; y = b & x  (§8 scenario 6)
    let mut a = Aig::new();
    let pa = a.create_pi(); let pb = a.create_pi();
    let x = a.debug_push_and(pa, Edge::FALSE); // placeholder 2nd fanin, fixed below
    let y = a.debug_push_and(pb, x);
    a.debug_set_and_fanins(x.node(), pa, y);
    a.create_po(x);
    match check_acyclic(&mut a) {
      Err(AigError::Cycle { witness }) => {
        assert!(witness.contains(&x.node()));
        assert!(witness.contains(&y.node()));
      }
      other => panic!("expected a cycle, got {other:?}"),
    }
  }

  #[test] fn test_levels() {
    let mut a = Aig::new();
    let x = a.create_pi(); let y = a.create_pi(); let z = a.create_pi();
    let xy = a.and(x, y);
    let xyz = a.and(xy, z);
    a.create_po(xyz);
    recompute_levels(&mut a);
    assert_eq!(a.level(xy.node()), 1);
    assert_eq!(a.level(xyz.node()), 2);
    assert_eq!(depth(&a), 3);
  }
}
