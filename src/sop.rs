//! SOP + algebraic factoring (component E, §4.D/§4.E): derive an
//! irredundant sum-of-products from a truth table, then factor it into a
//! `DGraph` blueprint.
//!
//! Cubes are packed two bits per variable (§3's "Cube" glossary entry):
//! for variable `v`, bit `2v` means "this cube is satisfied when `v=0`"
//! and bit `2v+1` means "...when `v=1`". A literal sets exactly one of
//! the pair; a don't-care variable sets both.
use crate::dgraph::{DEdge, DGraph};
use crate::truth::TruthTable;

pub type Cube = u32;

pub const LIT_NEG: u8 = 0b01;
pub const LIT_POS: u8 = 0b10;
pub const LIT_DC: u8 = 0b11;

#[inline] pub fn cube_get(cube: Cube, v: u8) -> u8 { ((cube >> (2 * v)) & 0b11) as u8 }
#[inline] pub fn cube_set(cube: Cube, v: u8, bits: u8) -> Cube { cube | ((bits as u32) << (2 * v)) }
#[inline] fn cube_clear(cube: Cube, v: u8) -> Cube { cube_set(cube & !(0b11 << (2 * v)), v, LIT_DC) }

pub fn cube_to_truth(cube: Cube, nvars: u8) -> TruthTable {
  let mut t = TruthTable::ones(nvars);
  for v in 0..nvars {
    match cube_get(cube, v) {
      LIT_POS => t = t.and(&TruthTable::literal(nvars, v)),
      LIT_NEG => t = t.and(&TruthTable::literal(nvars, v).not()),
      _ => {}
    }
  }
  t
}

pub fn cubes_to_truth(cubes: &[Cube], nvars: u8) -> TruthTable {
  let mut t = TruthTable::zeros(nvars);
  for &c in cubes { t = t.or(&cube_to_truth(c, nvars)); }
  t
}

/// Result of ISOP (§4.D): the standard `Kit_TruthIsop` three-way return
/// (`0`/`1`/`-1`) is reproduced as `Computed`/`TooLarge`, per
/// SPEC_FULL.md's Open Question resolution #2 -- both the recursion-time
/// cap and the post-success cube-count cap are enforced.
pub enum IsopResult {
  /// `complemented = true` means the cubes cover `!f`, not `f`; the
  /// caller must complement the factored result (the "returns the
  /// polarity" behavior from §4.D).
  Computed { cubes: Vec<Cube>, complemented: bool },
  TooLarge,
}

const CUBE_CAP: usize = 1 << 16;

pub fn isop(f: &TruthTable) -> IsopResult {
  let mut count = 0usize;
  if let Ok(cubes) = isop_rec(f, f, &mut count) {
    if cubes.len() <= CUBE_CAP { return IsopResult::Computed { cubes, complemented: false }; }
  }
  let nf = f.not();
  let mut count2 = 0usize;
  if let Ok(cubes) = isop_rec(&nf, &nf, &mut count2) {
    if cubes.len() <= CUBE_CAP { return IsopResult::Computed { cubes, complemented: true }; }
  }
  IsopResult::TooLarge
}

/// Minato-style recursive ISOP over the interval `[l, u]` (`l` = must-be-1
/// minterms, `u` = may-be-1 minterms; with no don't-cares `l == u == f`,
/// `f_use_dcs` threading it through a nonzero `u - l` gap is the
/// documented future hook per SPEC_FULL.md). Fails (the `-1`/overflow
/// path) once the running cube count exceeds `1<<16`.
fn isop_rec(l: &TruthTable, u: &TruthTable, count: &mut usize) -> Result<Vec<Cube>, ()> {
  let w = l.nvars;
  if w == 0 {
    return if l.get(0) {
      *count += 1;
      if *count > CUBE_CAP { return Err(()); }
      Ok(vec![0u32])
    } else { Ok(vec![]) };
  }
  if l.is_zero() { return Ok(vec![]); }
  if u.is_ones() {
    *count += 1;
    if *count > CUBE_CAP { return Err(()); }
    let mut c = 0u32;
    for v in 0..w { c = cube_set(c, v, LIT_DC); }
    return Ok(vec![c]);
  }
  let var = w - 1;
  let l0 = l.cofactor_top(false);
  let l1 = l.cofactor_top(true);
  let u0 = u.cofactor_top(false);
  let u1 = u.cofactor_top(true);
  let l0p = l0.andnot(&u1);
  let l1p = l1.andnot(&u0);
  let c0 = isop_rec(&l0p, &u0, count)?;
  let c1 = isop_rec(&l1p, &u1, count)?;
  let cov0 = cubes_to_truth(&c0, var);
  let cov1 = cubes_to_truth(&c1, var);
  let lr = l0.andnot(&cov0).or(&l1.andnot(&cov1));
  let ur = u0.and(&u1);
  let cr = isop_rec(&lr, &ur, count)?;
  let mut out = Vec::with_capacity(c0.len() + c1.len() + cr.len());
  for c in c0 { out.push(cube_set(c, var, LIT_NEG)); }
  for c in c1 { out.push(cube_set(c, var, LIT_POS)); }
  for c in cr { out.push(cube_set(c, var, LIT_DC)); }
  Ok(out)
}

// -- algebraic factoring (§4.E) -----------------------------------------

/// Factor a cover into a `DGraph`, binding variable `v` to `leaves[v]`.
/// The core step is literal division: pick the literal appearing in the
/// most cubes, split the cover into `F = L*Q + R` (an exact algebraic
/// identity for single-literal division, no approximation needed),
/// recurse on `Q` and `R`. When no literal repeats, the cover is already
/// cube-free and step 1's "no divisor -> trivial factored tree" applies.
pub fn factor(cover: &[Cube], nvars: u8, g: &mut DGraph, leaves: &[DEdge]) -> DEdge {
  if cover.is_empty() { return DGraph::FALSE; }
  if cover.len() == 1 { return and_tree_of_cube(cover[0], nvars, g, leaves); }
  match best_literal(cover, nvars) {
    Some((var, positive)) => {
      let want = if positive { LIT_POS } else { LIT_NEG };
      let mut quotient = Vec::new();
      let mut remainder = Vec::new();
      for &c in cover {
        if cube_get(c, var) == want { quotient.push(cube_clear(c, var)); } else { remainder.push(c); }
      }
      let lit_edge = if positive { leaves[var as usize] } else { !leaves[var as usize] };
      let q = factor(&quotient, nvars, g, leaves);
      let product = g.add_and(lit_edge, q);
      if remainder.is_empty() { product } else {
        let r = factor(&remainder, nvars, g, leaves);
        g.add_or(product, r)
      }
    }
    None => trivial_factor(cover, nvars, g, leaves),
  }
}

/// Literal repeated across the most cubes (ties broken by lowest
/// variable index, then positive polarity), or `None` if every literal
/// appears in at most one cube (the cover is cube-free).
fn best_literal(cover: &[Cube], nvars: u8) -> Option<(u8, bool)> {
  let mut best: Option<(u8, bool, usize)> = None;
  for v in 0..nvars {
    for (bits, positive) in [(LIT_POS, true), (LIT_NEG, false)] {
      let n = cover.iter().filter(|&&c| cube_get(c, v) == bits).count();
      if n >= 2 && best.as_ref().map(|&(_, _, b)| n > b).unwrap_or(true) {
        best = Some((v, positive, n));
      }
    }
  }
  best.map(|(v, p, _)| (v, p))
}

/// Balanced binary AND-tree over a single cube's literals (§4.D's
/// "Trivial factor"): split the literal list in half each step to
/// minimize depth. A cube with no literals (all don't-care) is the
/// constant-1 cube.
fn and_tree_of_cube(cube: Cube, nvars: u8, g: &mut DGraph, leaves: &[DEdge]) -> DEdge {
  let lits: Vec<DEdge> = (0..nvars).filter_map(|v| match cube_get(cube, v) {
    LIT_POS => Some(leaves[v as usize]),
    LIT_NEG => Some(!leaves[v as usize]),
    _ => None,
  }).collect();
  balanced_and(&lits, g)
}

fn balanced_and(edges: &[DEdge], g: &mut DGraph) -> DEdge {
  match edges.len() {
    0 => DGraph::TRUE,
    1 => edges[0],
    n => {
      let mid = n / 2;
      let lo = balanced_and(&edges[..mid], g);
      let hi = balanced_and(&edges[mid..], g);
      g.add_and(lo, hi)
    }
  }
}

/// Balanced binary OR-tree over the cover's per-cube AND-trees.
fn trivial_factor(cover: &[Cube], nvars: u8, g: &mut DGraph, leaves: &[DEdge]) -> DEdge {
  let terms: Vec<DEdge> = cover.iter().map(|&c| and_tree_of_cube(c, nvars, g, leaves)).collect();
  balanced_or(&terms, g)
}

fn balanced_or(edges: &[DEdge], g: &mut DGraph) -> DEdge {
  match edges.len() {
    0 => DGraph::FALSE,
    1 => edges[0],
    n => {
      let mid = n / 2;
      let lo = balanced_or(&edges[..mid], g);
      let hi = balanced_or(&edges[mid..], g);
      g.add_or(lo, hi)
    }
  }
}

/// Derive a `DGraph` for `f` via ISOP + algebraic factoring, binding
/// variable `v` to `leaves[v]`. Handles constants directly (§4.G step 3).
pub fn truth_to_dgraph(f: &TruthTable, leaves: &[DEdge]) -> Option<DGraph> {
  let mut g = DGraph::new(f.nvars as u32);
  if f.is_zero() { g.set_root(DGraph::FALSE); return Some(g); }
  if f.is_ones() { g.set_root(DGraph::TRUE); return Some(g); }
  match isop(f) {
    IsopResult::TooLarge => None,
    IsopResult::Computed { cubes, complemented } => {
      let mut root = factor(&cubes, f.nvars, &mut g, leaves);
      if complemented { root = !root; }
      g.set_root(root);
      Some(g)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn check_isop_matches(f: &TruthTable) {
    match isop(f) {
      IsopResult::TooLarge => panic!("unexpected overflow for small test function"),
      IsopResult::Computed { cubes, complemented } => {
        let cov = cubes_to_truth(&cubes, f.nvars);
        let got = if complemented { cov.not() } else { cov };
        assert_eq!(&got, f, "ISOP cover must reconstruct the original function");
      }
    }
  }

  #[test] fn test_isop_and3() {
    let a = TruthTable::literal(3, 0);
    let b = TruthTable::literal(3, 1);
    let c = TruthTable::literal(3, 2);
    let f = a.and(&b).and(&c);
    check_isop_matches(&f);
  }

  #[test] fn test_isop_xor2() {
    let a = TruthTable::literal(2, 0);
    let b = TruthTable::literal(2, 1);
    let f = a.and(&b.not()).or(&a.not().and(&b));
    check_isop_matches(&f);
  }

  #[test] fn test_isop_constants() {
    check_isop_matches(&TruthTable::zeros(3));
    check_isop_matches(&TruthTable::ones(3));
  }

  #[test] fn test_factor_matches_function_and3() {
    let a = TruthTable::literal(3, 0);
    let b = TruthTable::literal(3, 1);
    let c = TruthTable::literal(3, 2);
    let f = a.and(&b).and(&c);
    let g = DGraph::new(3);
    let leaves: Vec<DEdge> = (0..3).map(|i| g.leaf(i)).collect();
    let dg = truth_to_dgraph(&f, &leaves).unwrap();
    assert_eq!(dg.truth(), f);
  }

  #[test] fn test_factor_matches_function_majority3() {
    // maj(a,b,c) = ab + bc + ac -- exercises the shared-literal divisor path.
    let a = TruthTable::literal(3, 0);
    let b = TruthTable::literal(3, 1);
    let c = TruthTable::literal(3, 2);
    let f = a.and(&b).or(&b.and(&c)).or(&a.and(&c));
    let g = DGraph::new(3);
    let leaves: Vec<DEdge> = (0..3).map(|i| g.leaf(i)).collect();
    let dg = truth_to_dgraph(&f, &leaves).unwrap();
    assert_eq!(dg.truth(), f);
  }

  #[test] fn test_factor_constants() {
    let leaves: Vec<DEdge> = vec![];
    let zero = TruthTable::zeros(0);
    let mut z = zero.clone(); z.set(0, false);
    let dg0 = truth_to_dgraph(&z, &leaves).unwrap();
    assert_eq!(dg0.root(), DGraph::FALSE);
    let mut o = zero; o.set(0, true);
    let dg1 = truth_to_dgraph(&o, &leaves).unwrap();
    assert_eq!(dg1.root(), DGraph::TRUE);
  }
}
