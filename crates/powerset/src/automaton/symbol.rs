//! Symbol types for automata transitions.

/// A symbol identifier represented as a u32.
/// The special value `EPSILON` represents an epsilon (empty) transition.
pub type SymbolId = u32;

/// Reserved symbol ID for moves that consume no input. Never part of an alphabet.
pub const EPSILON: SymbolId = u32::MAX;

#[inline]
pub fn is_epsilon(symbol: SymbolId) -> bool {
    symbol == EPSILON
}
