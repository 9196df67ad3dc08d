use thiserror::Error;

/// A broken structural invariant, reported by the `validate` diagnostics.
///
/// These are programming defects in the collection, never caused by input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("in-order walk is not sorted")]
    Unordered,
    #[error("found {counted} nodes but the collection records {recorded}")]
    CountMismatch { counted: usize, recorded: usize },
    #[error("stored height {recorded} differs from computed height {computed}")]
    StaleHeight { recorded: usize, computed: usize },
    #[error("sibling subtree heights {left} and {right} differ by more than one")]
    Unbalanced { left: usize, right: usize },
    #[error("root is red")]
    RedRoot,
    #[error("red node has a red child")]
    RedRed,
    #[error("black heights {left} and {right} differ")]
    BlackHeight { left: usize, right: usize },
    #[error("child does not link back to its parent")]
    ParentLink,
}
