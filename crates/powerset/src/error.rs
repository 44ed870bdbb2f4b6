//! Errors raised while building or running automata.

use crate::automaton::{StateId, SymbolId};
use thiserror::Error;

/// Errors for malformed automata and unsupported constructions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    #[error("automaton has no start state")]
    MissingStartState,

    #[error("state {state} is out of range (automaton has {num_states} states)")]
    StateOutOfRange { state: StateId, num_states: StateId },

    #[error("state `{0}` was not declared")]
    UnknownState(String),

    #[error("symbol `{0}` is not in the alphabet")]
    UnknownSymbol(String),

    #[error("symbol {0} is reserved for epsilon transitions")]
    ReservedSymbol(SymbolId),

    #[error("too many symbols")]
    TooManySymbols,

    #[error("powerset of {states} NFA states exceeds the configured limit of {limit}")]
    TooManyStates { states: usize, limit: usize },

    #[error("state `{state}` has more than one target on symbol `{symbol}`")]
    ConflictingTransition { state: String, symbol: String },

    #[error("no transition from state {state} on symbol {symbol}")]
    UndefinedTransition { state: StateId, symbol: SymbolId },
}

pub type Result<T> = std::result::Result<T, AutomatonError>;
