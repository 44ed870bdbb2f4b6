//! Finite automata and the subset construction.
//!
//! This module provides epsilon-NFA and DFA implementations with:
//! - Epsilon closure computation
//! - Subset construction (NFA to DFA conversion), over the full powerset or
//!   only the reachable subsets
//! - Reachability pruning
//! - Builders over caller-chosen state labels and symbols

mod dfa;
mod epsilon_nfa;
mod labeled;
mod state;
mod subset_construction;
mod symbol;

pub use dfa::DFA;
pub use epsilon_nfa::EpsilonNFA;
pub use labeled::{DfaBuilder, Edge, LabeledDfa, LabeledNfa, NfaBuilder, Subset};
pub use state::{StateId, StateSet};
pub use subset_construction::{reachable_subset_construction, subset_construction};
pub use symbol::{EPSILON, SymbolId, is_epsilon};
