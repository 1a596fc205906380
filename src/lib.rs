//! aigopt: technology-independent optimization of And-Inverter Graphs.
//!
//! The core is four tightly-coupled subsystems over a shared AIG
//! substrate: k-feasible cut enumeration, MFFC labeling, DAG-aware
//! rewriting (library lookup by NPN class) and refactoring (ISOP +
//! algebraic factoring). See `network::rewrite`/`network::refactor` for
//! the entry points.
#[macro_use] extern crate log;

pub mod edge;
pub mod error;
pub mod aig;
pub mod traverse;
pub mod mffc;
pub mod truth;
pub mod cut;
pub mod npn;
pub mod dgraph;
pub mod sop;
pub mod rewrite;
pub mod refactor;
pub mod network;
pub mod params;
pub mod stats;

pub use aig::Aig;
pub use edge::{Edge, NodeId};
pub use error::{AigError, AigResult};
pub use params::{RewriteParams, RefactorParams};
pub use network::{rewrite, refactor, check};
