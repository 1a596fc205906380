//! Error kinds for the engine, per §7 of the spec: structural violations,
//! cycles, resource exhaustion and configuration errors. Plain enum +
//! hand-written `Display`/`Error`, matching the style of the pack's own
//! error types (e.g. awint's `EvalError`) rather than reaching for a
//! derive-macro error crate.
use std::fmt;
use crate::edge::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKind {
  /// A node's cut list hit `nKeepMax` before all merges were tried.
  CutCap,
  /// `Kit_TruthIsop`-equivalent: the ISOP recursion produced more than
  /// `1<<16` cubes, or overflowed during computation.
  IsopOverflow,
  /// A fixed-size memory pool (cuts, forest nodes) ran out of slots.
  PoolExhausted,
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      ResourceKind::CutCap => write!(f, "cut cap reached"),
      ResourceKind::IsopOverflow => write!(f, "ISOP cube count overflow"),
      ResourceKind::PoolExhausted => write!(f, "memory pool exhausted"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AigError {
  /// Cycle detected by the acyclicity check; carries the witness chain.
  Cycle { witness: Vec<NodeId> },
  /// An AIG invariant (§3) was found broken. Carries all violations found,
  /// not just the first, for better diagnostics.
  StructuralViolation(Vec<String>),
  /// Recovered locally per §7; only surfaces when a caller invokes a
  /// sub-operation (e.g. cut enumeration) standalone, outside a pass that
  /// would otherwise just absorb it into `PassStats`.
  ResourceExhausted(ResourceKind),
  /// Raised at manager construction; no partial state is left behind.
  Config(String),
}

impl fmt::Display for AigError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      AigError::Cycle { witness } => {
        write!(f, "cycle detected: ")?;
        for (i, n) in witness.iter().enumerate() {
          if i > 0 { write!(f, " -> ")?; }
          write!(f, "{n}")?;
        }
        Ok(())
      }
      AigError::StructuralViolation(msgs) => {
        write!(f, "structural check failed ({} violation(s)): ", msgs.len())?;
        write!(f, "{}", msgs.join("; "))
      }
      AigError::ResourceExhausted(kind) => write!(f, "resource exhausted: {kind}"),
      AigError::Config(msg) => write!(f, "configuration error: {msg}"),
    }
  }
}

impl std::error::Error for AigError {}

pub type AigResult<T> = Result<T, AigError>;
