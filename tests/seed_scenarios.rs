//! Integration suite for the concrete seed scenarios: one AIG per
//! scenario, driven through the public `rewrite`/`refactor`/`check` API.
use aigopt::{check, rewrite, Aig, Edge, RefactorParams, RewriteParams};

#[test]
fn identity_gate_is_left_unchanged() {
    let mut aig = Aig::new();
    let a = aig.create_pi();
    let b = aig.create_pi();
    let x = aig.and(a, b);
    aig.create_po(x);
    let before = aig.and_count();

    let stats = rewrite(&mut aig, &RewriteParams::default()).unwrap();

    assert_eq!(aig.and_count(), before);
    assert_eq!(stats.nodes_saved(), 0);
    check(&mut aig).unwrap();
}

#[test]
fn redundant_and_collapses_at_creation() {
    let mut aig = Aig::new();
    let a = aig.create_pi();
    let x = aig.and(a, a);
    assert_eq!(x, a, "structural hashing must collapse a & a to a, not create a node");
    aig.create_po(x);
    check(&mut aig).unwrap();
}

#[test]
fn constant_sink_is_eliminated_by_refactor() {
    // a & b & a & !b == 0, but not via a single hash-consed a & !a step.
    let mut aig = Aig::new();
    let a = aig.create_pi();
    let b = aig.create_pi();
    let ab = aig.and(a, b);
    let a_nb = aig.and(a, !b);
    let x = aig.and(ab, a_nb);
    aig.create_po(x);
    let before = aig.and_count();

    let stats = aigopt::refactor(&mut aig, &RefactorParams::default()).unwrap();

    assert!(aig.and_count() < before, "the constant cone's internal nodes must be freed");
    // the pass renumbers nodes, so look the PO up fresh rather than reusing
    // the pre-pass id.
    assert_eq!(aig.po_fanin(aig.pos[0]), Edge::FALSE);
    assert!(stats.nodes_saved() > 0);
    check(&mut aig).unwrap();
}

/// All `2^n` input assignments over `n` PIs, each as a `Vec<bool>` in PI
/// index order -- small enough here (n <= 4) to brute force rather than
/// sample.
fn all_assignments(n: usize) -> Vec<Vec<bool>> {
    (0..(1usize << n)).map(|mask| (0..n).map(|i| (mask >> i) & 1 != 0).collect()).collect()
}

#[test]
fn npn_equivalent_three_and_chain_reduces_to_two_ands() {
    // a & b & c implemented as a right-leaning chain of three 2-input
    // ANDs (cut truth 0x8888 over 4 vars, ignoring the unused 4th input
    // is handled by padding the cut to 4 leaves naturally via a dummy PI
    // fanin-free cut; here we give it a genuine 4th leaf that the
    // library's balanced-tree blueprint for the AND3 class can route
    // around, and confirm rewrite never increases the count).
    let mut aig = Aig::new();
    let a = aig.create_pi();
    let b = aig.create_pi();
    let c = aig.create_pi();
    let ab = aig.and(a, b);
    let abc = aig.and(ab, c);
    aig.create_po(abc);
    let before = aig.and_count();
    let before_outputs: Vec<Vec<bool>> =
        all_assignments(aig.pis.len()).into_iter().map(|x| aig.simulate(&x)).collect();

    rewrite(&mut aig, &RewriteParams::default()).unwrap();

    assert!(aig.and_count() <= before);
    check(&mut aig).unwrap();

    // §8 property 1: every PO must evaluate identically on every input
    // vector after the rewrite as it did before, not merely leave a
    // well-formed network behind.
    let after_outputs: Vec<Vec<bool>> =
        all_assignments(aig.pis.len()).into_iter().map(|x| aig.simulate(&x)).collect();
    assert_eq!(before_outputs, after_outputs, "rewrite must preserve every PO's function exactly");
}

#[test]
fn mffc_protection_keeps_externally_used_and_counted_as_non_free() {
    // the shared AND `ab` has fanout 2: once into `abc` (the rewrite
    // root) and once directly to a second PO. Its MFFC under `abc` must
    // exclude it, so any replacement blueprint that still needs `a & b`
    // cannot claim it for free.
    let mut aig = Aig::new();
    let a = aig.create_pi();
    let b = aig.create_pi();
    let c = aig.create_pi();
    let ab = aig.and(a, b);
    let abc = aig.and(ab, c);
    aig.create_po(abc);
    aig.create_po(ab);

    let mffc = aigopt::mffc::label_mffc(&aig, abc.node(), &[a.node(), b.node(), c.node()]);
    assert!(!mffc.contains(ab.node()), "externally-fanned-out node must not be absorbed into the MFFC");

    rewrite(&mut aig, &RewriteParams::default()).unwrap();
    check(&mut aig).unwrap();
}

// Cycle detection (scenario 6) is exercised inline in traverse.rs and
// network.rs, which can reach the `#[cfg(test)]`-only hand-crafting
// helpers that build a cycle bypassing structural hashing; those helpers
// aren't part of the public API surface this integration suite drives.

#[test]
fn rewrite_pass_logs_at_trace_level() {
    // Wires up a concrete `log` subscriber the way the teacher does in
    // its own swarm tests (`test-bdd.rs`'s `TermLogger::init(...)` call),
    // so the per-pass `info!`/`debug!` calls in `network.rs` actually
    // reach something. This is the only call site in the crate -- a
    // process-wide logger can only be installed once, so it lives in its
    // own `tests/` binary rather than alongside the other unit tests.
    use simplelog::*;
    TermLogger::init(LevelFilter::Trace, Config::default()).unwrap();

    let mut aig = Aig::new();
    let a = aig.create_pi();
    let b = aig.create_pi();
    let c = aig.create_pi();
    let ab = aig.and(a, b);
    let abc = aig.and(ab, c);
    aig.create_po(abc);

    rewrite(&mut aig, &RewriteParams::default()).unwrap();
    check(&mut aig).unwrap();
}
