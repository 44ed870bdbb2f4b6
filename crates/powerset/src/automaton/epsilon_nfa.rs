//! Epsilon Non-deterministic Finite Automaton (ε-NFA) implementation.

use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::{EPSILON, SymbolId, is_epsilon};
use crate::error::{AutomatonError, Result};
use std::collections::{BTreeSet, HashMap, VecDeque};

/// An Epsilon Non-deterministic Finite Automaton.
///
/// The transition relation is partial: a missing `(state, symbol)` entry
/// means there is no such move, which is the same as moving to the empty set.
#[derive(Debug, Clone, Default)]
pub struct EpsilonNFA {
    /// Number of states (states are numbered 0..num_states)
    num_states: StateId,
    start_state: Option<StateId>,
    /// Final (accepting) states
    final_states: StateSet,
    /// Transitions: (source, symbol) -> set of destination states.
    /// Epsilon moves are stored under `EPSILON`.
    transitions: HashMap<(StateId, SymbolId), StateSet>,
    /// Declared input symbols, never containing epsilon once validated
    alphabet: BTreeSet<SymbolId>,
    /// Cached epsilon closures for each state
    epsilon_closures: Option<Vec<StateSet>>,
}

impl EpsilonNFA {
    /// Create a new empty epsilon-NFA.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an NFA with states `0..num_states` and no transitions.
    pub fn with_states(num_states: StateId) -> Self {
        Self {
            num_states,
            ..Self::default()
        }
    }

    /// Add a new state and return its ID.
    pub fn add_state(&mut self) -> StateId {
        let id = self.num_states;
        self.num_states += 1;
        self.epsilon_closures = None;
        id
    }

    /// Declare an input symbol, even if no transition uses it yet.
    pub fn add_symbol(&mut self, symbol: SymbolId) {
        self.alphabet.insert(symbol);
    }

    /// Add a transition from source to destination on the given symbol.
    /// Non-epsilon symbols are added to the alphabet.
    pub fn add_transition(&mut self, source: StateId, symbol: SymbolId, destination: StateId) {
        if !is_epsilon(symbol) {
            self.alphabet.insert(symbol);
        }

        self.transitions
            .entry((source, symbol))
            .or_insert_with(|| StateSet::with_capacity(self.num_states as usize))
            .insert(destination);

        self.epsilon_closures = None;
    }

    /// Add an epsilon transition from source to destination.
    pub fn add_epsilon_transition(&mut self, source: StateId, destination: StateId) {
        self.add_transition(source, EPSILON, destination);
    }

    /// Set the start state.
    pub fn set_start_state(&mut self, state: StateId) {
        self.start_state = Some(state);
    }

    /// Add a final (accepting) state.
    pub fn add_final_state(&mut self, state: StateId) {
        self.final_states.insert(state);
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

    /// The input alphabet in ascending order. Epsilon is not part of it.
    pub fn alphabet(&self) -> &BTreeSet<SymbolId> {
        &self.alphabet
    }

    /// The set of states reachable from `state` by one move on `symbol`.
    /// An undefined move yields the empty set.
    pub fn delta(&self, state: StateId, symbol: SymbolId) -> StateSet {
        self.transitions
            .get(&(state, symbol))
            .cloned()
            .unwrap_or_default()
    }

    /// Get all transitions as an iterator.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, SymbolId, StateId)> + '_ {
        self.transitions
            .iter()
            .flat_map(|(&(src, sym), dests)| dests.iter().map(move |dst| (src, sym, dst)))
    }

    /// Check that the NFA is well formed: a start state exists (unless there
    /// are no states at all) and every referenced state is in range.
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

        match self.start_state {
            Some(start) => in_range(start)?,
            // An NFA without states has nowhere to start; its powerset is {∅}.
            None if self.num_states == 0 => {}
            None => return Err(AutomatonError::MissingStartState),
        }
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
        Ok(())
    }

    /// Compute the epsilon closure of a single state using DFS.
    fn epsilon_closure_single(&self, state: StateId) -> StateSet {
        self.closure_from(StateSet::singleton(state, self.num_states as usize))
    }

    /// Compute epsilon closures for all states (cached until the next mutation).
    pub fn compute_epsilon_closures(&mut self) {
        if self.epsilon_closures.is_some() {
            return;
        }

        let closures = (0..self.num_states)
            .map(|state| self.epsilon_closure_single(state))
            .collect();
        self.epsilon_closures = Some(closures);
    }

    /// The epsilon closure E(S): `states` plus everything reachable from them
    /// through zero or more epsilon moves.
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        match &self.epsilon_closures {
            Some(cached) => {
                let mut closure = states.clone();
                for state in states.iter() {
                    if let Some(single) = cached.get(state as usize) {
                        closure.union_with(single);
                    }
                }
                closure
            }
            None => self.closure_from(states.clone()),
        }
    }

    /// Worklist fixed point: every state taken off the stack has its epsilon
    /// successors added, until nothing new appears.
    fn closure_from(&self, mut closure: StateSet) -> StateSet {
        let mut stack: Vec<StateId> = closure.iter().collect();

        while let Some(s) = stack.pop() {
            if let Some(destinations) = self.transitions.get(&(s, EPSILON)) {
                for dest in destinations.iter() {
                    if closure.insert(dest) {
                        stack.push(dest);
                    }
                }
            }
        }

        closure
    }

    /// The raw image of `states` under one move on `symbol`, without closure.
    /// States with no move on `symbol` contribute nothing.
    pub fn move_on_symbol(&self, states: &StateSet, symbol: SymbolId) -> StateSet {
        assert!(!is_epsilon(symbol), "Use epsilon_closure for epsilon moves");

        let mut reached = StateSet::with_capacity(self.num_states as usize);

        for state in states.iter() {
            if let Some(destinations) = self.transitions.get(&(state, symbol)) {
                reached.union_with(destinations);
            }
        }

        reached
    }

    /// The derived deterministic move: E(move(states, symbol)).
    pub fn next_states(&self, states: &StateSet, symbol: SymbolId) -> StateSet {
        self.epsilon_closure(&self.move_on_symbol(states, symbol))
    }

    /// The closed start set E({start}), or the empty set without a start state.
    pub fn start_closure(&self) -> StateSet {
        match self.start_state {
            Some(start) => self.epsilon_closure_single(start),
            None => StateSet::default(),
        }
    }

    /// Check if the NFA accepts no string at all.
    /// Uses BFS from the start closure following all transitions.
    pub fn is_empty(&self) -> bool {
        let mut visited = StateSet::with_capacity(self.num_states as usize);
        let mut queue: VecDeque<StateId> = self.start_closure().iter().collect();

        while let Some(state) = queue.pop_front() {
            if !visited.insert(state) {
                continue;
            }

            if self.final_states.contains(state) {
                return false;
            }

            for &symbol in self.alphabet.iter().chain(std::iter::once(&EPSILON)) {
                if let Some(destinations) = self.transitions.get(&(state, symbol)) {
                    queue.extend(destinations.iter().filter(|&dest| !visited.contains(dest)));
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(states: &[StateId]) -> StateSet {
        states.iter().copied().collect()
    }

    #[test]
    fn test_epsilon_nfa_basic() {
        // 0 -a-> 1 -ε-> 2 (final)
        let mut nfa = EpsilonNFA::with_states(3);
        nfa.add_transition(0, 0, 1);
        nfa.add_epsilon_transition(1, 2);
        nfa.set_start_state(0);
        nfa.add_final_state(2);

        assert_eq!(nfa.num_states(), 3);
        assert_eq!(nfa.alphabet().iter().copied().collect::<Vec<_>>(), vec![0]);
        assert!(nfa.validate().is_ok());
        assert!(!nfa.is_empty());
    }

    #[test]
    fn test_epsilon_closure_chain() {
        // 0 -ε-> 1 -ε-> 2 -ε-> 3
        let mut nfa = EpsilonNFA::with_states(4);
        nfa.add_epsilon_transition(0, 1);
        nfa.add_epsilon_transition(1, 2);
        nfa.add_epsilon_transition(2, 3);

        let closure = nfa.epsilon_closure(&set(&[0]));
        assert_eq!(closure, set(&[0, 1, 2, 3]));
        assert_eq!(nfa.epsilon_closure(&set(&[2])), set(&[2, 3]));
    }

    #[test]
    fn test_epsilon_closure_cycle_and_cache() {
        // 0 -ε-> 1 -ε-> 0, 1 -ε-> 2
        let mut nfa = EpsilonNFA::with_states(4);
        nfa.add_epsilon_transition(0, 1);
        nfa.add_epsilon_transition(1, 0);
        nfa.add_epsilon_transition(1, 2);

        let uncached = nfa.epsilon_closure(&set(&[0, 3]));
        nfa.compute_epsilon_closures();
        let cached = nfa.epsilon_closure(&set(&[0, 3]));

        assert_eq!(uncached, set(&[0, 1, 2, 3]));
        assert_eq!(cached, uncached);
    }

    #[test]
    fn test_closure_is_extensive_and_idempotent() {
        let mut nfa = EpsilonNFA::with_states(5);
        nfa.add_epsilon_transition(0, 2);
        nfa.add_epsilon_transition(2, 4);
        nfa.add_epsilon_transition(3, 1);
        nfa.add_transition(1, 0, 3);

        for mask in 0..(1u32 << 5) {
            let states = StateSet::from_mask(mask);
            let closure = nfa.epsilon_closure(&states);
            assert!(states.is_subset(&closure));
            assert_eq!(nfa.epsilon_closure(&closure), closure);
        }
    }

    #[test]
    fn test_move_on_symbol() {
        // 0 -a-> 1, 0 -a-> 2, 1 -ε-> 3
        let mut nfa = EpsilonNFA::with_states(4);
        nfa.add_transition(0, 0, 1);
        nfa.add_transition(0, 0, 2);
        nfa.add_epsilon_transition(1, 3);

        let start = StateSet::singleton(0, 4);
        assert_eq!(nfa.move_on_symbol(&start, 0), set(&[1, 2]));
        assert_eq!(nfa.next_states(&start, 0), set(&[1, 2, 3]));
        // 3 has no move on 'a'
        assert!(nfa.move_on_symbol(&set(&[3]), 0).is_empty());
    }

    #[test]
    fn test_undefined_move_is_empty() {
        let nfa = EpsilonNFA::with_states(2);
        assert!(nfa.delta(0, 7).is_empty());
        assert!(nfa.delta(1, EPSILON).is_empty());
    }

    #[test]
    fn test_validate_rejects_malformed() {
        let mut nfa = EpsilonNFA::with_states(2);
        assert_eq!(nfa.validate(), Err(AutomatonError::MissingStartState));

        nfa.set_start_state(5);
        assert_eq!(
            nfa.validate(),
            Err(AutomatonError::StateOutOfRange {
                state: 5,
                num_states: 2
            })
        );

        nfa.set_start_state(0);
        nfa.add_transition(0, 0, 9);
        assert!(matches!(
            nfa.validate(),
            Err(AutomatonError::StateOutOfRange { state: 9, .. })
        ));

        let mut nfa = EpsilonNFA::with_states(1);
        nfa.set_start_state(0);
        nfa.add_symbol(EPSILON);
        assert_eq!(nfa.validate(), Err(AutomatonError::ReservedSymbol(EPSILON)));
    }

    #[test]
    fn test_stateless_nfa_is_valid() {
        let nfa = EpsilonNFA::new();
        assert!(nfa.validate().is_ok());
        assert!(nfa.start_closure().is_empty());
        assert!(nfa.is_empty());
    }

    #[test]
    fn test_empty_language() {
        let mut nfa = EpsilonNFA::with_states(2);
        nfa.set_start_state(0);
        nfa.add_final_state(1);
        // No transitions - no path from 0 to 1
        assert!(nfa.is_empty());

        nfa.add_epsilon_transition(0, 1);
        assert!(!nfa.is_empty());
    }
}
