//! Per-pass counters, in the spirit of `BddBase::get_stats`/`print_stats`
//! in the teacher: per-node failures (§7) are absorbed here silently
//! rather than surfaced as errors.
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassStats {
  pub nodes_before: usize,
  pub nodes_after: usize,
  pub nodes_tried: usize,
  pub cuts_computed: usize,
  pub cut_limit_hits: usize,
  pub isop_overflows: usize,
  pub accepted: usize,
  pub rejected_no_cut: usize,
  pub rejected_no_gain: usize,
  pub rejected_zero_gain: usize,
  /// Candidates that otherwise had acceptable gain but were rejected
  /// because the replacement blueprint's predicted level at the root
  /// exceeds the node's current level (§8 property 3: depth must never
  /// increase across a single accept).
  pub rejected_level_increase: usize,
}

impl PassStats {
  pub fn nodes_saved(&self) -> i64 { self.nodes_before as i64 - self.nodes_after as i64 }
}

impl fmt::Display for PassStats {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(
      f,
      "{} -> {} nodes (saved {}), {} accepted / {} tried, {} cut-cap hits, {} ISOP overflows, {} rejected for depth increase",
      self.nodes_before, self.nodes_after, self.nodes_saved(),
      self.accepted, self.nodes_tried, self.cut_limit_hits, self.isop_overflows, self.rejected_level_increase,
    )
  }
}
