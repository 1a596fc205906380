//! Configuration for the two passes (§6). Constructors validate ranges
//! and return `Result`, per SPEC_FULL.md: a manager never ends up
//! partially initialized on bad input.
use crate::error::{AigError, AigResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteParams {
  /// cut input limit; library lookup only works at exactly 4.
  pub n_vars_max: u8,
  /// cut cap per node.
  pub n_keep_max: u16,
  pub f_truth: bool,
  pub f_filter: bool,
  pub f_use_zeros: bool,
}

impl Default for RewriteParams {
  fn default() -> Self {
    RewriteParams { n_vars_max: 4, n_keep_max: 250, f_truth: true, f_filter: true, f_use_zeros: false }
  }
}

impl RewriteParams {
  pub fn validated(self) -> AigResult<Self> {
    if !(3..=16).contains(&self.n_vars_max) {
      return Err(AigError::Config(format!("n_vars_max must be in [3,16], got {}", self.n_vars_max)));
    }
    if !(1..=250).contains(&self.n_keep_max) {
      return Err(AigError::Config(format!("n_keep_max must be in [1,250], got {}", self.n_keep_max)));
    }
    Ok(self)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefactorParams {
  pub n_node_size_max: u8,
  pub n_cone_size_max: u8,
  pub f_use_zeros: bool,
  /// Accepted but does not change behavior in this implementation --
  /// don't-care injection during refactor is a documented future hook
  /// (SPEC_FULL.md Open Question resolution #3).
  pub f_use_dcs: bool,
}

impl Default for RefactorParams {
  fn default() -> Self {
    RefactorParams { n_node_size_max: 10, n_cone_size_max: 20, f_use_zeros: false, f_use_dcs: false }
  }
}

impl RefactorParams {
  pub fn validated(self) -> AigResult<Self> {
    if !(3..=16).contains(&self.n_node_size_max) {
      return Err(AigError::Config(format!("n_node_size_max must be in [3,16], got {}", self.n_node_size_max)));
    }
    if self.n_cone_size_max < self.n_node_size_max {
      return Err(AigError::Config("n_cone_size_max must be >= n_node_size_max".into()));
    }
    Ok(self)
  }
}
