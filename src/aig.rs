//! The AIG substrate: an arena of nodes, hash-consed ANDs, fanout
//! tracking and traversal-id scratch state. Generalized from the
//! teacher's hash-consing node stores (`ast::RawASTBase`'s `hash:
//! HashMap<Ops, NID>`, `vhl::HiLoCache`'s `index: ... HashMap<HiLo,
//! usize>`) to the AIG's two-input-AND-with-structural-hashing model,
//! and from `boxcar`/`dashmap` (built for concurrent access) down to a
//! plain `Vec` + `FxHashMap`, since §5 rules out parallel execution
//! across nodes.
use fxhash::FxHashMap;
use crate::edge::{Edge, NodeId};
use crate::error::{AigError, AigResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
  /// The single constant node (id 0). `Edge::FALSE`/`Edge::TRUE` select
  /// its two polarities.
  Const,
  /// Primary input.
  Pi,
  /// Two-input AND gate. Fanins are kept in a canonical (sorted) order
  /// so that `a & b` and `b & a` hash to the same node.
  And(Edge, Edge),
  /// Primary output. Carries a single fanin edge.
  Po(Edge),
}

#[derive(Debug, Clone)]
pub struct AigNode {
  pub kind: NodeKind,
  pub level: u32,
  /// Multiset of nodes that reference this one, one entry per using
  /// edge (so a node fed twice by the same AND appears twice). This is
  /// the fanout count from §3, kept exact incrementally rather than
  /// recomputed.
  pub fanouts: Vec<NodeId>,
  /// Scratch traversal-id, compared against `Aig::cur_trav`/`prev_trav`.
  pub trav_id: u32,
  /// Set once a node's fanout count has dropped to zero and it has been
  /// recursively dereferenced; the id is retired until the next GC pass
  /// (§4.H) reassigns ids and compacts the arena.
  pub dead: bool,
}

impl AigNode {
  pub fn fanin_edges(&self) -> Option<(Edge, Edge)> {
    match self.kind { NodeKind::And(a, b) => Some((a, b)), _ => None }
  }
}

fn remap_edge(e: Edge, map: &FxHashMap<NodeId, NodeId>) -> Edge { Edge::new(map[&e.node()], e.is_inv()) }

/// The AIG arena: owns every node, structurally hashes ANDs so that two
/// gates with identical (sorted) fanin edges cannot both exist, and
/// tracks primary inputs/outputs and traversal scratch state.
#[derive(Debug, Clone)]
pub struct Aig {
  nodes: Vec<AigNode>,
  /// Structural hash table: canonical fanin-edge pair -> existing AND.
  struct_hash: FxHashMap<(Edge, Edge), NodeId>,
  pub pis: Vec<NodeId>,
  pub pos: Vec<NodeId>,
  cur_trav: u32,
}

impl Default for Aig { fn default() -> Self { Self::new() } }

impl Aig {
  pub fn new() -> Self {
    let mut a = Aig {
      nodes: Vec::new(),
      struct_hash: FxHashMap::default(),
      pis: Vec::new(),
      pos: Vec::new(),
      cur_trav: 0,
    };
    // id 0: the constant node, always present.
    a.nodes.push(AigNode { kind: NodeKind::Const, level: 0, fanouts: Vec::new(), trav_id: 0, dead: false });
    a
  }

  #[inline] pub fn node(&self, id: NodeId) -> &AigNode { &self.nodes[id.index()] }
  #[inline] fn node_mut(&mut self, id: NodeId) -> &mut AigNode { &mut self.nodes[id.index()] }
  pub fn num_nodes(&self) -> usize { self.nodes.len() }

  /// Number of live (non-dead, non-PI/PO/const) AND gates -- the figure
  /// tracked by the node-non-increase invariant in §8.
  pub fn and_count(&self) -> usize {
    self.nodes.iter().filter(|n| !n.dead && matches!(n.kind, NodeKind::And(..))).count()
  }

  pub fn level(&self, id: NodeId) -> u32 { self.node(id).level }
  pub fn edge_level(&self, e: Edge) -> u32 { self.level(e.node()) }
  pub fn set_level(&mut self, id: NodeId, level: u32) { self.node_mut(id).level = level; }

  pub fn fanout_count(&self, id: NodeId) -> usize { self.node(id).fanouts.len() }

  // -- traversal-id scratch state --------------------------------------

  /// Bump the traversal generation and return it. Marking a node
  /// "current" means storing this value in its `trav_id`.
  pub fn new_trav(&mut self) -> u32 { self.cur_trav += 1; self.cur_trav }
  pub fn cur_trav(&self) -> u32 { self.cur_trav }
  pub fn mark(&mut self, id: NodeId, trav: u32) { self.node_mut(id).trav_id = trav; }
  pub fn is_marked(&self, id: NodeId, trav: u32) -> bool { self.node(id).trav_id == trav }

  // -- construction ------------------------------------------------------

  pub fn create_pi(&mut self) -> Edge {
    let id = NodeId(self.nodes.len() as u32);
    self.nodes.push(AigNode { kind: NodeKind::Pi, level: 0, fanouts: Vec::new(), trav_id: 0, dead: false });
    self.pis.push(id);
    Edge::new(id, false)
  }

  pub fn create_po(&mut self, fanin: Edge) -> NodeId {
    let id = NodeId(self.nodes.len() as u32);
    self.nodes.push(AigNode { kind: NodeKind::Po(fanin), level: 1 + self.edge_level(fanin), fanouts: Vec::new(), trav_id: 0, dead: false });
    self.bump_fanout(fanin.node(), id);
    self.pos.push(id);
    id
  }

  /// Repoint a PO at a new driving edge (used by network update / H).
  pub fn set_po_fanin(&mut self, po: NodeId, new_fanin: Edge) {
    let old_fanin = match self.node(po).kind { NodeKind::Po(e) => e, _ => panic!("set_po_fanin: {po} is not a PO") };
    self.drop_fanout(old_fanin.node(), po);
    self.node_mut(po).kind = NodeKind::Po(new_fanin);
    self.bump_fanout(new_fanin.node(), po);
    self.node_mut(po).level = 1 + self.edge_level(new_fanin);
  }

  pub fn po_fanin(&self, po: NodeId) -> Edge {
    match self.node(po).kind { NodeKind::Po(e) => e, _ => panic!("po_fanin: {po} is not a PO") }
  }

  /// Evaluate every primary output for one input assignment (indexed in
  /// `self.pis` order), by a topological pass propagating two-input AND
  /// over the fanin complement bits. Exists so callers (and tests) can
  /// check §8 property 1 -- `eval(T(N), o, x) == eval(N, o, x)` -- across
  /// a transformation, not just well-formedness.
  pub fn simulate(&mut self, inputs: &[bool]) -> Vec<bool> {
    assert_eq!(inputs.len(), self.pis.len(), "simulate: one input value per PI");
    let mut vals: FxHashMap<NodeId, bool> = FxHashMap::default();
    vals.insert(NodeId::CONST, false);
    for (&pi, &v) in self.pis.clone().iter().zip(inputs) { vals.insert(pi, v); }
    let roots: Vec<Edge> = self.pos.iter().map(|&po| self.po_fanin(po)).collect();
    for id in crate::traverse::dfs_topo(self, &roots) {
      let (a, b) = self.node(id).fanin_edges().expect("dfs_topo only yields AND nodes");
      let va = vals[&a.node()] ^ a.is_inv();
      let vb = vals[&b.node()] ^ b.is_inv();
      vals.insert(id, va && vb);
    }
    self.pos.iter().map(|&po| {
      let e = self.po_fanin(po);
      vals[&e.node()] ^ e.is_inv()
    }).collect()
  }

  #[inline] fn bump_fanout(&mut self, of: NodeId, user: NodeId) { self.node_mut(of).fanouts.push(user); }

  /// Remove exactly one occurrence of `user` from `of`'s fanout multiset.
  fn drop_fanout(&mut self, of: NodeId, user: NodeId) {
    let fanouts = &mut self.node_mut(of).fanouts;
    if let Some(pos) = fanouts.iter().position(|&n| n == user) { fanouts.swap_remove(pos); }
  }

  /// The trivial simplifications (`x&x`, `x&!x`, `x&0`, `x&1`) shared by
  /// `and()` and component H's gain-counting walk (`network::graph_to_network_count`).
  pub fn try_simplify_and(f0: Edge, f1: Edge) -> Option<Edge> {
    if f0 == f1 { return Some(f0); }
    if f0 == !f1 { return Some(Edge::FALSE); }
    if f0.is_const0() || f1.is_const0() { return Some(Edge::FALSE); }
    if f0.is_const1() { return Some(f1); }
    if f1.is_const1() { return Some(f0); }
    None
  }

  /// Read-only structural-hash probe (canonical fanin order, no trivial
  /// simplification applied beyond what `try_simplify_and` already
  /// covers at the call site): does an AND with these fanins already
  /// exist?
  pub fn lookup_and(&self, f0: Edge, f1: Edge) -> Option<Edge> {
    let (a, b) = if f0.raw() <= f1.raw() { (f0, f1) } else { (f1, f0) };
    self.struct_hash.get(&(a, b)).map(|&id| Edge::new(id, false))
  }

  /// Structurally hash-conses a two-input AND. Handles the trivial
  /// simplifications (`x&x`, `x&!x`, `x&0`, `x&1`) and canonicalizes
  /// fanin order before interning, per §3's structural-hashing invariant.
  pub fn and(&mut self, f0: Edge, f1: Edge) -> Edge {
    if let Some(e) = Self::try_simplify_and(f0, f1) { return e; }
    if let Some(e) = self.lookup_and(f0, f1) { return e; }
    let (a, b) = if f0.raw() <= f1.raw() { (f0, f1) } else { (f1, f0) };
    let id = NodeId(self.nodes.len() as u32);
    let level = 1 + self.edge_level(a).max(self.edge_level(b));
    self.nodes.push(AigNode { kind: NodeKind::And(a, b), level, fanouts: Vec::new(), trav_id: 0, dead: false });
    self.struct_hash.insert((a, b), id);
    self.bump_fanout(a.node(), id);
    self.bump_fanout(b.node(), id);
    Edge::new(id, false)
  }

  /// Recursively dereference `id`: drop its contribution to each fanin's
  /// fanout count, recursing into any fanin whose count reaches zero.
  /// Used both by MFFC-driven deletion after a replacement (§4.H) and by
  /// garbage collection.
  pub fn delete_node(&mut self, id: NodeId) {
    if self.node(id).dead { return; }
    let fanins = self.node(id).fanin_edges();
    self.node_mut(id).dead = true;
    if let NodeKind::And(a, b) = self.node(id).kind {
      self.struct_hash.remove(&(a, b));
    }
    if let Some((a, b)) = fanins {
      self.drop_fanout(a.node(), id);
      self.drop_fanout(b.node(), id);
      if !self.node(a.node()).dead && self.fanout_count(a.node()) == 0 && matches!(self.node(a.node()).kind, NodeKind::And(..)) {
        self.delete_node(a.node());
      }
      if !self.node(b.node()).dead && self.fanout_count(b.node()) == 0 && matches!(self.node(b.node()).kind, NodeKind::And(..)) {
        self.delete_node(b.node());
      }
    }
  }

  /// Redirect every fanout edge currently pointing at `old` to point at
  /// `new` instead (XOR-ing in `new`'s complement bit appropriately),
  /// then dereference `old`. This is `graphUpdateNetwork`'s final splice
  /// step (§4.D), generalized to operate on any node (AND or PO fanin).
  pub fn replace(&mut self, old: NodeId, new: Edge) {
    if old == new.node() { return; }
    let users = self.node(old).fanouts.clone();
    for user in users {
      if self.node(user).dead { continue; }
      match self.node(user).kind {
        NodeKind::And(a, b) => {
          let na = if a.node() == old { new.to_inv(a.is_inv() ^ new.is_inv()) } else { a };
          let nb = if b.node() == old { new.to_inv(b.is_inv() ^ new.is_inv()) } else { b };
          // withdraw the old AND from the struct-hash under its old key,
          // rewire, then re-insert (or collapse) under the new key.
          if let NodeKind::And(oa, ob) = self.node(user).kind { self.struct_hash.remove(&(oa, ob)); }
          self.drop_fanout(a.node(), user);
          self.drop_fanout(b.node(), user);
          self.bump_fanout(na.node(), user);
          self.bump_fanout(nb.node(), user);
          let (ca, cb) = if na.raw() <= nb.raw() { (na, nb) } else { (nb, na) };
          self.node_mut(user).kind = NodeKind::And(ca, cb);
          self.struct_hash.insert((ca, cb), user);
        }
        NodeKind::Po(e) => {
          let ne = if e.node() == old { new.to_inv(e.is_inv() ^ new.is_inv()) } else { e };
          self.drop_fanout(e.node(), user);
          self.bump_fanout(ne.node(), user);
          self.node_mut(user).kind = NodeKind::Po(ne);
        }
        _ => unreachable!("fanout of a node can only be AND or PO"),
      }
    }
    self.node_mut(old).fanouts.clear();
    self.delete_node(old);
  }

  // -- network update / reassignment (component H) --------------------

  fn rebuild_fanouts(&mut self) {
    for i in 0..self.nodes.len() {
      let id = NodeId(i as u32);
      match self.node(id).kind {
        NodeKind::And(a, b) => { self.bump_fanout(a.node(), id); self.bump_fanout(b.node(), id); }
        NodeKind::Po(e) => { self.bump_fanout(e.node(), id); }
        NodeKind::Pi | NodeKind::Const => {}
      }
    }
  }

  /// Garbage-collect dead nodes and reassign ids in DFS order (const,
  /// then PIs, then internal ANDs fanins-before-node, then POs), so that
  /// fanout locality is restored after a pass of replacements (§4.H).
  /// Recomputes levels as the final step.
  pub fn gc_and_renumber(&mut self) {
    let roots: Vec<Edge> = self.pos.iter().map(|&po| self.po_fanin(po)).collect();
    let order = crate::traverse::dfs_topo(self, &roots);

    let mut old_to_new: FxHashMap<NodeId, NodeId> = FxHashMap::default();
    old_to_new.insert(NodeId::CONST, NodeId::CONST);
    let mut new_nodes = Vec::with_capacity(self.nodes.len());
    new_nodes.push(AigNode { kind: NodeKind::Const, level: 0, fanouts: Vec::new(), trav_id: 0, dead: false });

    for &old_pi in &self.pis.clone() {
      old_to_new.insert(old_pi, NodeId(new_nodes.len() as u32));
      new_nodes.push(AigNode { kind: NodeKind::Pi, level: 0, fanouts: Vec::new(), trav_id: 0, dead: false });
    }
    for old_id in order {
      old_to_new.insert(old_id, NodeId(new_nodes.len() as u32));
      let (a, b) = self.node(old_id).fanin_edges().expect("dfs_topo only yields AND nodes");
      let kind = NodeKind::And(remap_edge(a, &old_to_new), remap_edge(b, &old_to_new));
      new_nodes.push(AigNode { kind, level: 0, fanouts: Vec::new(), trav_id: 0, dead: false });
    }
    let mut new_pos = Vec::with_capacity(self.pos.len());
    for &old_po in &self.pos.clone() {
      let fanin = remap_edge(self.po_fanin(old_po), &old_to_new);
      new_pos.push(NodeId(new_nodes.len() as u32));
      new_nodes.push(AigNode { kind: NodeKind::Po(fanin), level: 0, fanouts: Vec::new(), trav_id: 0, dead: false });
    }

    let mut struct_hash = FxHashMap::default();
    for (i, node) in new_nodes.iter().enumerate() {
      if let NodeKind::And(a, b) = node.kind { struct_hash.insert((a, b), NodeId(i as u32)); }
    }

    self.nodes = new_nodes;
    self.pis = (0..self.pis.len() as u32).map(|i| NodeId(1 + i)).collect();
    self.pos = new_pos;
    self.struct_hash = struct_hash;
    self.rebuild_fanouts();
    crate::traverse::recompute_levels(self);
  }

  // -- checking ------------------------------------------------------

  /// Re-derive every AND's structural-hash key and fanout multiset from
  /// scratch and compare against the live tables; any mismatch is a
  /// `StructuralViolation`. Collects *all* violations rather than
  /// stopping at the first, per SPEC_FULL.md's diagnostics goal.
  pub fn check(&self) -> AigResult<()> {
    let mut violations = Vec::new();
    let mut expect_fanouts: FxHashMap<NodeId, Vec<NodeId>> = FxHashMap::default();
    let mut seen_keys: FxHashMap<(Edge, Edge), NodeId> = FxHashMap::default();

    for (i, node) in self.nodes.iter().enumerate() {
      let id = NodeId(i as u32);
      if node.dead { continue; }
      match node.kind {
        NodeKind::And(a, b) => {
          if a.node() == id || b.node() == id {
            violations.push(format!("{id}: AND fanin references itself"));
          }
          if a.node().index() >= self.nodes.len() || b.node().index() >= self.nodes.len() {
            violations.push(format!("{id}: AND fanin out of range"));
          }
          if a.raw() > b.raw() {
            violations.push(format!("{id}: AND fanins not in canonical order"));
          }
          if let Some(prior) = seen_keys.insert((a, b), id) {
            violations.push(format!("{id} and {prior} share structural-hash key ({a:?},{b:?})"));
          }
          expect_fanouts.entry(a.node()).or_default().push(id);
          expect_fanouts.entry(b.node()).or_default().push(id);
          let want_level = 1 + self.edge_level(a).max(self.edge_level(b));
          if node.level != want_level {
            violations.push(format!("{id}: level {} != expected {want_level}", node.level));
          }
        }
        NodeKind::Po(e) => {
          expect_fanouts.entry(e.node()).or_default().push(id);
        }
        NodeKind::Pi | NodeKind::Const => {
          if node.level != 0 { violations.push(format!("{id}: PI/const level must be 0")); }
        }
      }
    }
    for (i, node) in self.nodes.iter().enumerate() {
      let id = NodeId(i as u32);
      if node.dead { continue; }
      let mut want = expect_fanouts.remove(&id).unwrap_or_default();
      let mut have = node.fanouts.clone();
      want.sort(); have.sort();
      if want != have {
        violations.push(format!("{id}: fanout set {have:?} != expected {want:?}"));
      }
    }
    if violations.is_empty() { Ok(()) } else { Err(AigError::StructuralViolation(violations)) }
  }

  /// Construct a raw AND node bypassing structural hashing, for building
  /// hand-crafted pathological graphs (e.g. cycles) in tests.
  #[cfg(test)]
  pub fn debug_push_and(&mut self, f0: Edge, f1: Edge) -> Edge {
    let id = NodeId(self.nodes.len() as u32);
    self.nodes.push(AigNode { kind: NodeKind::And(f0, f1), level: 0, fanouts: Vec::new(), trav_id: 0, dead: false });
    self.bump_fanout(f0.node(), id);
    self.bump_fanout(f1.node(), id);
    Edge::new(id, false)
  }

  /// Overwrite a raw AND node's fanins in place, for wiring up a cycle in
  /// tests (normal code always goes through `replace`).
  #[cfg(test)]
  pub fn debug_set_and_fanins(&mut self, id: NodeId, f0: Edge, f1: Edge) {
    self.bump_fanout(f0.node(), id);
    self.bump_fanout(f1.node(), id);
    self.node_mut(id).kind = NodeKind::And(f0, f1);
  }
}
