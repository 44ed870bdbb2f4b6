//! Deterministic Finite Automaton (DFA) implementation with reachability pruning.

use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::{EPSILON, SymbolId};
use crate::error::{AutomatonError, Result};
use log::{debug, warn};
use std::collections::{BTreeSet, HashMap, VecDeque};

/// A Deterministic Finite Automaton.
///
/// The automaton itself is immutable once built; running input never stores a
/// cursor on it, so `accepts` only needs `&self`.
#[derive(Debug, Clone, Default)]
pub struct DFA {
    /// Number of states
    num_states: StateId,
    /// Start state (None if empty)
    start_state: Option<StateId>,
    /// Final (accepting) states
    final_states: StateSet,
    /// Transitions: (source, symbol) -> destination
    transitions: HashMap<(StateId, SymbolId), StateId>,
    /// Input symbols
    alphabet: BTreeSet<SymbolId>,
    /// Mapping from DFA states to original NFA states (if created via subset construction)
    state_mapping: Option<HashMap<StateId, Vec<StateId>>>,
}

impl DFA {
    /// Create a new empty DFA.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new state and return its ID.
    pub fn add_state(&mut self) -> StateId {
        let id = self.num_states;
        self.num_states += 1;
        id
    }

    /// Set the start state.
    pub fn set_start_state(&mut self, state: StateId) {
        self.start_state = Some(state);
    }

    /// Add a final (accepting) state.
    pub fn add_final_state(&mut self, state: StateId) {
        self.final_states.insert(state);
    }

    /// Declare an input symbol, even if no transition uses it yet.
    pub fn add_symbol(&mut self, symbol: SymbolId) {
        self.alphabet.insert(symbol);
    }

    /// Add a transition, replacing any previous one for `(source, symbol)`.
    pub fn add_transition(&mut self, source: StateId, symbol: SymbolId, destination: StateId) {
        self.alphabet.insert(symbol);
        self.transitions.insert((source, symbol), destination);
    }

    /// Get the transition from a state on a symbol.
    pub fn transition(&self, source: StateId, symbol: SymbolId) -> Option<StateId> {
        self.transitions.get(&(source, symbol)).copied()
    }

    /// Get the number of states.
    pub fn num_states(&self) -> StateId {
        self.num_states
    }

    /// Get the start state.
    pub fn start_state(&self) -> Option<StateId> {
        self.start_state
    }

    /// Get the final states.
    pub fn final_states(&self) -> &StateSet {
        &self.final_states
    }

    /// Check if a state is final.
    pub fn is_final(&self, state: StateId) -> bool {
        self.final_states.contains(state)
    }

    /// Get the alphabet.
    pub fn alphabet(&self) -> &BTreeSet<SymbolId> {
        &self.alphabet
    }

    /// Set the state mapping from original NFA states.
    pub fn set_state_mapping(&mut self, mapping: HashMap<StateId, Vec<StateId>>) {
        self.state_mapping = Some(mapping);
    }

    /// Get the state mapping.
    pub fn state_mapping(&self) -> Option<&HashMap<StateId, Vec<StateId>>> {
        self.state_mapping.as_ref()
    }

    /// The sorted NFA states a DFA state stands for, when the DFA was derived
    /// by subset construction.
    pub fn nfa_states(&self, state: StateId) -> Option<&[StateId]> {
        self.state_mapping
            .as_ref()?
            .get(&state)
            .map(Vec::as_slice)
    }

    /// Get all transitions as an iterator.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, SymbolId, StateId)> + '_ {
        self.transitions
            .iter()
            .map(|(&(src, sym), &dst)| (src, sym, dst))
    }

    /// Check that the DFA is well formed: the start state exists, every state
    /// it mentions is in range, and the transition function is total over
    /// states and alphabet.
    pub fn validate(&self) -> Result<()> {
        let in_range = |state: StateId| {
            if state < self.num_states {
                Ok(())
            } else {
                Err(AutomatonError::StateOutOfRange {
                    state,
                    num_states: self.num_states,
                })
            }
        };

        in_range(self.start_state.ok_or(AutomatonError::MissingStartState)?)?;
        for state in self.final_states.iter() {
            in_range(state)?;
        }
        if self.alphabet.contains(&EPSILON) {
            return Err(AutomatonError::ReservedSymbol(EPSILON));
        }
        for (src, _, dst) in self.transitions() {
            in_range(src)?;
            in_range(dst)?;
        }
        for state in 0..self.num_states {
            for &symbol in &self.alphabet {
                if self.transition(state, symbol).is_none() {
                    return Err(AutomatonError::UndefinedTransition { state, symbol });
                }
            }
        }
        Ok(())
    }

    /// Run `input` from the start state and return the state the run ends in.
    ///
    /// Returns `Ok(None)` as soon as a symbol outside the alphabet is seen;
    /// the rest of the input is not consumed.
    pub fn run<I>(&self, input: I) -> Result<Option<StateId>>
    where
        I: IntoIterator<Item = SymbolId>,
    {
        let mut current = self.start_state.ok_or(AutomatonError::MissingStartState)?;
        for symbol in input {
            if !self.alphabet.contains(&symbol) {
                return Ok(None);
            }
            current = self
                .transition(current, symbol)
                .ok_or(AutomatonError::UndefinedTransition {
                    state: current,
                    symbol,
                })?;
        }
        Ok(Some(current))
    }

    /// Check whether the DFA accepts `input`.
    ///
    /// Fails closed: symbols outside the alphabet, a missing start state and
    /// undefined transitions all reject.
    pub fn accepts<I>(&self, input: I) -> bool
    where
        I: IntoIterator<Item = SymbolId>,
    {
        match self.run(input) {
            Ok(Some(state)) => self.is_final(state),
            Ok(None) => false,
            Err(err) => {
                warn!("rejecting input: {err}");
                false
            }
        }
    }

    /// Check if the DFA is empty (accepts no strings).
    pub fn is_empty(&self) -> bool {
        !self
            .reachable_states()
            .iter()
            .any(|state| self.is_final(state))
    }

    /// Find all states reachable from the start state, by BFS over the alphabet.
    pub fn reachable_states(&self) -> StateSet {
        self.reachable_in_order().into_iter().collect()
    }

    /// Reachable states in BFS discovery order, start state first. This is
    /// the numbering [`DFA::prune`] gives the surviving states.
    pub fn reachable_in_order(&self) -> Vec<StateId> {
        let mut order = Vec::new();
        let Some(start) = self.start_state else {
            return order;
        };

        let mut visited = StateSet::with_capacity(self.num_states as usize);
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(state) = queue.pop_front() {
            order.push(state);
            for &symbol in &self.alphabet {
                if let Some(next) = self.transition(state, symbol) {
                    if visited.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        order
    }

    /// Return a copy holding only the states reachable from the start state.
    ///
    /// States are renumbered in BFS discovery order, so the start state becomes
    /// state 0. The accepted language is unchanged.
    pub fn prune(&self) -> DFA {
        let order = self.reachable_in_order();
        let renumber: HashMap<StateId, StateId> = order
            .iter()
            .enumerate()
            .map(|(new, &old)| (old, new as StateId))
            .collect();

        let mut pruned = DFA::new();
        pruned.alphabet = self.alphabet.clone();
        for _ in &order {
            pruned.add_state();
        }
        if let Some(&start) = self.start_state.as_ref().and_then(|s| renumber.get(s)) {
            pruned.set_start_state(start);
        }

        for (&old, &new) in &renumber {
            if self.is_final(old) {
                pruned.add_final_state(new);
            }
            for &symbol in &self.alphabet {
                if let Some(dest) = self.transition(old, symbol) {
                    // Targets of reachable states are themselves reachable.
                    if let Some(&new_dest) = renumber.get(&dest) {
                        pruned.add_transition(new, symbol, new_dest);
                    }
                }
            }
        }

        if let Some(mapping) = &self.state_mapping {
            pruned.state_mapping = Some(
                renumber
                    .iter()
                    .filter_map(|(old, &new)| Some((new, mapping.get(old)?.clone())))
                    .collect(),
            );
        }

        debug!(
            "pruned DFA from {} to {} states",
            self.num_states, pruned.num_states
        );
        pruned
    }
}
