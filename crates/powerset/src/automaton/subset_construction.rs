//! Subset construction algorithm for converting ε-NFA to DFA.
//!
//! [`subset_construction`] builds the full powerset automaton: one DFA state
//! for every subset of NFA states, `2^n` in total. That blow-up is inherent
//! to the construction. [`reachable_subset_construction`] only materializes
//! the subsets reachable from the start state, which is what
//! [`DFA::prune`] would keep from the full automaton anyway.

use crate::automaton::dfa::DFA;
use crate::automaton::epsilon_nfa::EpsilonNFA;
use crate::automaton::state::{StateId, StateSet};
use crate::config::{ConstructionConfig, MAX_POWERSET_STATES};
use crate::error::{AutomatonError, Result};
use indexmap::IndexMap;
use log::{debug, trace};
use std::collections::HashMap;

/// Convert an epsilon-NFA to a DFA over the whole powerset of its states.
///
/// DFA state `i` is the subset whose members are the set bits of `i`, so
/// equal subsets always get the same id. For a subset `R` and symbol `a` the
/// transition goes to `E(move(R, a))`; the empty subset is the sink state.
/// A subset is accepting iff it contains an accepting NFA state, and the start
/// state is `E({start})`.
pub fn subset_construction(nfa: &EpsilonNFA, config: &ConstructionConfig) -> Result<DFA> {
    nfa.validate()?;

    let num_nfa_states = nfa.num_states() as usize;
    let limit = config.max_nfa_states.min(MAX_POWERSET_STATES);
    if num_nfa_states > limit {
        return Err(AutomatonError::TooManyStates {
            states: num_nfa_states,
            limit,
        });
    }

    // E(delta(q, a)) per NFA state and symbol. The derived move of a subset is
    // the union over its members, since closure distributes over union.
    let symbols: Vec<_> = nfa.alphabet().iter().copied().collect();
    let single_moves: Vec<Vec<u32>> = (0..nfa.num_states())
        .map(|state| {
            let from = StateSet::singleton(state, num_nfa_states);
            symbols
                .iter()
                .map(|&symbol| nfa.next_states(&from, symbol).to_mask())
                .collect()
        })
        .collect();

    let mut dfa = DFA::new();
    for &symbol in &symbols {
        dfa.add_symbol(symbol);
    }

    let num_subsets: u32 = 1 << num_nfa_states;
    let mut mapping = HashMap::with_capacity(num_subsets as usize);
    let final_mask = nfa.final_states().to_mask();

    for mask in 0..num_subsets {
        let state = dfa.add_state();
        debug_assert_eq!(state, mask);

        if mask & final_mask != 0 {
            dfa.add_final_state(state);
        }

        let subset = StateSet::from_mask(mask);
        for (index, &symbol) in symbols.iter().enumerate() {
            let next = subset
                .iter()
                .fold(0, |acc, member| acc | single_moves[member as usize][index]);
            dfa.add_transition(state, symbol, next);
        }
        mapping.insert(state, subset.to_vec());
    }

    let start = nfa.start_closure().to_mask();
    dfa.set_start_state(start);
    dfa.set_state_mapping(mapping);

    debug!(
        "subset construction: {} NFA states -> {} DFA states over {} symbols",
        num_nfa_states,
        dfa.num_states(),
        symbols.len()
    );

    Ok(if config.prune { dfa.prune() } else { dfa })
}

/// Convert an epsilon-NFA to a DFA, building only the subsets reachable from
/// `E({start})`.
///
/// The empty subset is kept as an explicit sink whenever it is reachable, so
/// the transition function is total. The result accepts the same language
/// as [`subset_construction`] and needs no state limit.
pub fn reachable_subset_construction(nfa: &EpsilonNFA) -> Result<DFA> {
    nfa.validate()?;

    // Each DFA state corresponds to a set of NFA states
    let mut state_mapping: IndexMap<StateSet, StateId> = IndexMap::new();
    let mut dfa = DFA::new();
    for &symbol in nfa.alphabet() {
        dfa.add_symbol(symbol);
    }

    let initial_set = nfa.start_closure();
    let initial_dfa_state = dfa.add_state();
    dfa.set_start_state(initial_dfa_state);
    if initial_set.intersects(nfa.final_states()) {
        dfa.add_final_state(initial_dfa_state);
    }
    state_mapping.insert(initial_set.clone(), initial_dfa_state);

    let mut worklist = vec![(initial_set, initial_dfa_state)];

    while let Some((current_nfa_set, current_dfa_state)) = worklist.pop() {
        trace!("expanding DFA state {current_dfa_state} = {current_nfa_set:?}");

        for &symbol in nfa.alphabet() {
            let next_nfa_set = nfa.next_states(&current_nfa_set, symbol);

            let next_dfa_state = match state_mapping.get(&next_nfa_set) {
                Some(&existing) => existing,
                None => {
                    let new_state = dfa.add_state();
                    if next_nfa_set.intersects(nfa.final_states()) {
                        dfa.add_final_state(new_state);
                    }
                    state_mapping.insert(next_nfa_set.clone(), new_state);
                    worklist.push((next_nfa_set, new_state));
                    new_state
                }
            };

            dfa.add_transition(current_dfa_state, symbol, next_dfa_state);
        }
    }

    let inverse_mapping: HashMap<StateId, Vec<StateId>> = state_mapping
        .into_iter()
        .map(|(nfa_states, dfa_state)| (dfa_state, nfa_states.to_vec()))
        .collect();
    dfa.set_state_mapping(inverse_mapping);

    debug!(
        "reachable subset construction: {} NFA states -> {} DFA states",
        nfa.num_states(),
        dfa.num_states()
    );

    Ok(dfa)
}
