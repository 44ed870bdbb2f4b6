//! Automata over caller-chosen state labels and symbols.
//!
//! The numeric automata work on dense `u32` ids. The types here intern
//! arbitrary labels (`"q1"`, `'a'`, ...) into those ids, check that every
//! referenced label was declared, and map results back for display.

use crate::automaton::dfa::DFA;
use crate::automaton::epsilon_nfa::EpsilonNFA;
use crate::automaton::state::{StateId, StateSet};
use crate::automaton::subset_construction::subset_construction;
use crate::automaton::symbol::{EPSILON, SymbolId};
use crate::config::ConstructionConfig;
use crate::error::{AutomatonError, Result};
use indexmap::IndexSet;
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::Hash;

/// The label of an NFA move: an input symbol, or epsilon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Edge<A> {
    Symbol(A),
    Epsilon,
}

impl<A: fmt::Display> fmt::Display for Edge<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Symbol(symbol) => symbol.fmt(f),
            Edge::Epsilon => f.write_str("epsilon"),
        }
    }
}

/// A DFA state produced by subset construction: a set of NFA state labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Subset<S>(pub BTreeSet<S>);

impl<S: Ord> Subset<S> {
    pub fn contains(&self, state: &S) -> bool {
        self.0.contains(state)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Ord> FromIterator<S> for Subset<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Subset(iter.into_iter().collect())
    }
}

impl<S: fmt::Display> fmt::Display for Subset<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, state) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            state.fmt(f)?;
        }
        f.write_str("}")
    }
}

fn state_id<S: Hash + Eq + fmt::Debug>(states: &IndexSet<S>, state: &S) -> Result<StateId> {
    states
        .get_index_of(state)
        .map(|index| index as StateId)
        .ok_or_else(|| AutomatonError::UnknownState(format!("{state:?}")))
}

fn symbol_id<A: Hash + Eq + fmt::Debug>(symbols: &IndexSet<A>, symbol: &A) -> Result<SymbolId> {
    symbols
        .get_index_of(symbol)
        .map(|index| index as SymbolId)
        .ok_or_else(|| AutomatonError::UnknownSymbol(format!("{symbol:?}")))
}

fn check_capacity(num_states: usize, num_symbols: usize) -> Result<()> {
    if num_symbols >= EPSILON as usize {
        return Err(AutomatonError::TooManySymbols);
    }
    if num_states > StateId::MAX as usize {
        return Err(AutomatonError::TooManyStates {
            states: num_states,
            limit: StateId::MAX as usize,
        });
    }
    Ok(())
}

/// Collects the parts of an NFA by label before checking and interning them.
#[derive(Debug, Clone)]
pub struct NfaBuilder<S, A> {
    states: IndexSet<S>,
    symbols: IndexSet<A>,
    transitions: Vec<(S, Edge<A>, S)>,
    start: Option<S>,
    accept: Vec<S>,
}

impl<S, A> Default for NfaBuilder<S, A> {
    fn default() -> Self {
        Self {
            states: IndexSet::new(),
            symbols: IndexSet::new(),
            transitions: Vec::new(),
            start: None,
            accept: Vec::new(),
        }
    }
}

impl<S, A> NfaBuilder<S, A>
where
    S: Clone + Eq + Hash + Ord + fmt::Debug,
    A: Clone + Eq + Hash + Ord + fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states<I: IntoIterator<Item = S>>(mut self, states: I) -> Self {
        self.states.extend(states);
        self
    }

    pub fn alphabet<I: IntoIterator<Item = A>>(mut self, symbols: I) -> Self {
        self.symbols.extend(symbols);
        self
    }

    /// Add moves from `source` to each of `destinations` on `edge`.
    pub fn transition<I>(mut self, source: S, edge: Edge<A>, destinations: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        for destination in destinations {
            self.transitions.push((source.clone(), edge.clone(), destination));
        }
        self
    }

    pub fn epsilon(self, source: S, destination: S) -> Self {
        self.transition(source, Edge::Epsilon, [destination])
    }

    pub fn start(mut self, state: S) -> Self {
        self.start = Some(state);
        self
    }

    pub fn accept<I: IntoIterator<Item = S>>(mut self, states: I) -> Self {
        self.accept.extend(states);
        self
    }

    /// Intern every label and validate the result.
    ///
    /// Fails if a transition, the start state or an accept state names an
    /// undeclared state, or a transition uses a symbol outside the alphabet.
    pub fn build(self) -> Result<LabeledNfa<S, A>> {
        check_capacity(self.states.len(), self.symbols.len())?;

        let mut nfa = EpsilonNFA::with_states(self.states.len() as StateId);
        for index in 0..self.symbols.len() {
            nfa.add_symbol(index as SymbolId);
        }
        for (source, edge, destination) in &self.transitions {
            let source = state_id(&self.states, source)?;
            let destination = state_id(&self.states, destination)?;
            match edge {
                Edge::Symbol(symbol) => {
                    nfa.add_transition(source, symbol_id(&self.symbols, symbol)?, destination)
                }
                Edge::Epsilon => nfa.add_epsilon_transition(source, destination),
            }
        }
        if let Some(start) = &self.start {
            nfa.set_start_state(state_id(&self.states, start)?);
        }
        for state in &self.accept {
            nfa.add_final_state(state_id(&self.states, state)?);
        }
        nfa.validate()?;
        nfa.compute_epsilon_closures();

        Ok(LabeledNfa {
            nfa,
            states: self.states,
            symbols: self.symbols,
        })
    }
}

/// An epsilon-NFA whose states and symbols carry caller labels.
#[derive(Debug, Clone)]
pub struct LabeledNfa<S, A> {
    nfa: EpsilonNFA,
    states: IndexSet<S>,
    symbols: IndexSet<A>,
}

impl<S, A> LabeledNfa<S, A>
where
    S: Clone + Eq + Hash + Ord + fmt::Debug,
    A: Clone + Eq + Hash + Ord + fmt::Debug,
{
    pub fn builder() -> NfaBuilder<S, A> {
        NfaBuilder::new()
    }

    /// The underlying numeric automaton. State `i` is `states()[i]`.
    pub fn nfa(&self) -> &EpsilonNFA {
        &self.nfa
    }

    pub fn states(&self) -> &IndexSet<S> {
        &self.states
    }

    pub fn alphabet(&self) -> &IndexSet<A> {
        &self.symbols
    }

    pub fn start(&self) -> Option<&S> {
        self.nfa
            .start_state()
            .and_then(|state| self.states.get_index(state as usize))
    }

    pub fn accept(&self) -> BTreeSet<&S> {
        self.labels(self.nfa.final_states().iter())
    }

    /// States reachable from `state` by one move on `edge`; empty when the
    /// move is undefined or a label is unknown.
    pub fn delta(&self, state: &S, edge: Edge<&A>) -> BTreeSet<&S> {
        let Ok(source) = state_id(&self.states, state) else {
            return BTreeSet::new();
        };
        let symbol = match edge {
            Edge::Symbol(symbol) => match symbol_id(&self.symbols, symbol) {
                Ok(symbol) => symbol,
                Err(_) => return BTreeSet::new(),
            },
            Edge::Epsilon => EPSILON,
        };
        self.labels(self.nfa.delta(source, symbol).iter())
    }

    /// The epsilon closure of a set of labelled states.
    pub fn epsilon_closure<'a, I>(&'a self, states: I) -> Result<BTreeSet<&'a S>>
    where
        I: IntoIterator<Item = &'a S>,
    {
        let ids: StateSet = states
            .into_iter()
            .map(|state| state_id(&self.states, state))
            .collect::<Result<_>>()?;
        Ok(self.labels(self.nfa.epsilon_closure(&ids).iter()))
    }

    /// Derive the equivalent DFA by subset construction, pruning unreachable
    /// subsets when `config.prune` is set.
    pub fn to_dfa(&self, config: &ConstructionConfig) -> Result<LabeledDfa<Subset<S>, A>> {
        let dfa = subset_construction(&self.nfa, config)?;
        let states: Vec<Subset<S>> = (0..dfa.num_states())
            .map(|state| {
                dfa.nfa_states(state)
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|&nfa_state| self.states.get_index(nfa_state as usize))
                    .cloned()
                    .collect()
            })
            .collect();

        Ok(LabeledDfa {
            dfa,
            states,
            symbols: self.symbols.clone(),
        })
    }

    fn labels(&self, ids: impl Iterator<Item = StateId>) -> BTreeSet<&S> {
        ids.filter_map(|state| self.states.get_index(state as usize))
            .collect()
    }
}

impl<S, A> fmt::Display for LabeledNfa<S, A>
where
    S: Clone + Eq + Hash + Ord + fmt::Debug + fmt::Display,
    A: Clone + Eq + Hash + Ord + fmt::Debug + fmt::Display,
{
    /// One line per state, sorted by label, listing every defined move.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut symbols: Vec<&A> = self.symbols.iter().collect();
        symbols.sort();
        let edges = symbols
            .into_iter()
            .map(Edge::Symbol)
            .chain(std::iter::once(Edge::Epsilon));

        let mut lines: Vec<(&S, String)> = Vec::with_capacity(self.states.len());
        for state in &self.states {
            let moves: Vec<String> = edges
                .clone()
                .filter_map(|edge| {
                    let targets = self.delta(state, edge);
                    if targets.is_empty() {
                        return None;
                    }
                    let targets: Subset<&S> = targets.into_iter().collect();
                    Some(format!("{edge} -> {targets}"))
                })
                .collect();
            lines.push((state, moves.join(", ")));
        }
        lines.sort();

        for (i, (state, moves)) in lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{state}: {{{moves}}}")?;
        }
        Ok(())
    }
}

/// Collects the parts of a DFA by label before checking and interning them.
#[derive(Debug, Clone)]
pub struct DfaBuilder<S, A> {
    states: IndexSet<S>,
    symbols: IndexSet<A>,
    transitions: Vec<(S, A, S)>,
    start: Option<S>,
    accept: Vec<S>,
}

impl<S, A> Default for DfaBuilder<S, A> {
    fn default() -> Self {
        Self {
            states: IndexSet::new(),
            symbols: IndexSet::new(),
            transitions: Vec::new(),
            start: None,
            accept: Vec::new(),
        }
    }
}

impl<S, A> DfaBuilder<S, A>
where
    S: Clone + Eq + Hash + Ord + fmt::Debug,
    A: Clone + Eq + Hash + Ord + fmt::Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states<I: IntoIterator<Item = S>>(mut self, states: I) -> Self {
        self.states.extend(states);
        self
    }

    pub fn alphabet<I: IntoIterator<Item = A>>(mut self, symbols: I) -> Self {
        self.symbols.extend(symbols);
        self
    }

    pub fn transition(mut self, source: S, symbol: A, destination: S) -> Self {
        self.transitions.push((source, symbol, destination));
        self
    }

    pub fn start(mut self, state: S) -> Self {
        self.start = Some(state);
        self
    }

    pub fn accept<I: IntoIterator<Item = S>>(mut self, states: I) -> Self {
        self.accept.extend(states);
        self
    }

    /// Intern every label and validate the result, including that the
    /// transition function is total and gives each `(state, symbol)` a
    /// single target.
    pub fn build(self) -> Result<LabeledDfa<S, A>> {
        check_capacity(self.states.len(), self.symbols.len())?;

        let mut dfa = DFA::new();
        for _ in &self.states {
            dfa.add_state();
        }
        for index in 0..self.symbols.len() {
            dfa.add_symbol(index as SymbolId);
        }
        for (source, symbol, destination) in &self.transitions {
            let src = state_id(&self.states, source)?;
            let sym = symbol_id(&self.symbols, symbol)?;
            let dst = state_id(&self.states, destination)?;
            // A repeated move is fine; a second target makes the table nondeterministic.
            if let Some(existing) = dfa.transition(src, sym) {
                if existing != dst {
                    return Err(AutomatonError::ConflictingTransition {
                        state: format!("{source:?}"),
                        symbol: format!("{symbol:?}"),
                    });
                }
            }
            dfa.add_transition(src, sym, dst);
        }
        if let Some(start) = &self.start {
            dfa.set_start_state(state_id(&self.states, start)?);
        }
        for state in &self.accept {
            dfa.add_final_state(state_id(&self.states, state)?);
        }
        dfa.validate()?;

        Ok(LabeledDfa {
            dfa,
            states: self.states.into_iter().collect(),
            symbols: self.symbols,
        })
    }
}

/// A DFA whose states and symbols carry caller labels.
///
/// For a DFA derived from a [`LabeledNfa`], the state labels are
/// [`Subset`]s of NFA state labels.
#[derive(Debug, Clone)]
pub struct LabeledDfa<L, A> {
    dfa: DFA,
    states: Vec<L>,
    symbols: IndexSet<A>,
}

impl<L, A> LabeledDfa<L, A>
where
    L: Clone,
    A: Clone + Eq + Hash,
{
    /// The underlying numeric automaton. State `i` is `states()[i]`.
    pub fn dfa(&self) -> &DFA {
        &self.dfa
    }

    pub fn states(&self) -> &[L] {
        &self.states
    }

    pub fn alphabet(&self) -> &IndexSet<A> {
        &self.symbols
    }

    pub fn start(&self) -> Option<&L> {
        self.dfa
            .start_state()
            .and_then(|state| self.states.get(state as usize))
    }

    pub fn accept(&self) -> impl Iterator<Item = &L> + '_ {
        self.dfa
            .final_states()
            .iter()
            .filter_map(|state| self.states.get(state as usize))
    }

    /// The target of the move from the state with id `state` on `symbol`.
    pub fn transition(&self, state: StateId, symbol: &A) -> Option<&L> {
        let symbol = self.symbols.get_index_of(symbol)? as SymbolId;
        let next = self.dfa.transition(state, symbol)?;
        self.states.get(next as usize)
    }

    /// Check whether the DFA accepts `input`. Any symbol outside the alphabet
    /// rejects the whole input.
    pub fn accepts<I, B>(&self, input: I) -> bool
    where
        I: IntoIterator<Item = B>,
        B: Borrow<A>,
    {
        let mut ids = Vec::new();
        for symbol in input {
            match self.symbols.get_index_of(symbol.borrow()) {
                Some(index) => ids.push(index as SymbolId),
                None => return false,
            }
        }
        self.dfa.accepts(ids)
    }

    /// Keep only the states reachable from the start state.
    pub fn prune(&self) -> LabeledDfa<L, A> {
        let states: Vec<L> = self
            .dfa
            .reachable_in_order()
            .into_iter()
            .filter_map(|state| self.states.get(state as usize))
            .cloned()
            .collect();

        LabeledDfa {
            dfa: self.dfa.prune(),
            states,
            symbols: self.symbols.clone(),
        }
    }
}

impl<L, A> fmt::Display for LabeledDfa<L, A>
where
    L: Clone + Ord + fmt::Display,
    A: Clone + Eq + Hash + Ord + fmt::Display,
{
    /// One line per state, sorted by label, listing the target on every symbol.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut symbols: Vec<&A> = self.symbols.iter().collect();
        symbols.sort();

        let mut lines: Vec<(&L, String)> = Vec::with_capacity(self.states.len());
        for (state, label) in self.states.iter().enumerate() {
            let moves: Vec<String> = symbols
                .iter()
                .filter_map(|&symbol| {
                    let target = self.transition(state as StateId, symbol)?;
                    Some(format!("{symbol} -> {target}"))
                })
                .collect();
            lines.push((label, moves.join(", ")));
        }
        lines.sort();

        for (i, (state, moves)) in lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{state}: {{{moves}}}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sipser's example 1.16.
    fn sipser() -> LabeledNfa<&'static str, char> {
        LabeledNfa::builder()
            .states(["1", "2", "3"])
            .alphabet(['a', 'b'])
            .transition("1", Edge::Symbol('b'), ["2"])
            .epsilon("1", "3")
            .transition("2", Edge::Symbol('a'), ["2", "3"])
            .transition("2", Edge::Symbol('b'), ["3"])
            .transition("3", Edge::Symbol('a'), ["1", "3"])
            .start("1")
            .accept(["1"])
            .build()
            .unwrap()
    }

    fn subset(states: &[&'static str]) -> Subset<&'static str> {
        states.iter().copied().collect()
    }

    #[test]
    fn test_sipser_strings() {
        let dfa = sipser().to_dfa(&ConstructionConfig::default()).unwrap();

        for accepted in ["", "a", "baba", "baa"] {
            assert!(dfa.accepts(accepted.chars()), "{accepted:?} should be accepted");
        }
        for rejected in ["b", "bb", "babba"] {
            assert!(!dfa.accepts(rejected.chars()), "{rejected:?} should be rejected");
        }
        assert!(!dfa.accepts("abc".chars()));
    }

    #[test]
    fn test_start_and_accept_labels() {
        let nfa = sipser();
        assert_eq!(nfa.start(), Some(&"1"));
        assert_eq!(nfa.accept().into_iter().collect::<Vec<_>>(), vec![&"1"]);

        let dfa = nfa.to_dfa(&ConstructionConfig::default()).unwrap();
        assert_eq!(dfa.start(), Some(&subset(&["1", "3"])));
        assert_eq!(dfa.states().len(), 8);
        for label in dfa.accept() {
            assert!(label.contains(&"1"));
        }
        assert_eq!(dfa.accept().count(), 4);
    }

    #[test]
    fn test_labeled_closure_and_delta() {
        let nfa = sipser();
        let closure = nfa.epsilon_closure([&"1"]).unwrap();
        assert_eq!(closure.into_iter().collect::<Vec<_>>(), vec![&"1", &"3"]);

        assert!(nfa.delta(&"3", Edge::Symbol(&'b')).is_empty());
        assert!(nfa.delta(&"9", Edge::Symbol(&'a')).is_empty());
        assert_eq!(nfa.delta(&"1", Edge::Epsilon).len(), 1);
        assert_eq!(
            nfa.epsilon_closure([&"7"]),
            Err(AutomatonError::UnknownState("\"7\"".to_string()))
        );
    }

    #[test]
    fn test_nfa_dump() {
        let expected = "1: {b -> {2}, epsilon -> {3}}\n\
                        2: {a -> {2, 3}, b -> {3}}\n\
                        3: {a -> {1, 3}}";
        assert_eq!(sipser().to_string(), expected);
    }

    #[test]
    fn test_pruned_dfa_dump() {
        let config = ConstructionConfig::new().with_prune(true);
        let dfa = sipser().to_dfa(&config).unwrap();

        let expected = "{}: {a -> {}, b -> {}}\n\
                        {1, 2, 3}: {a -> {1, 2, 3}, b -> {2, 3}}\n\
                        {1, 3}: {a -> {1, 3}, b -> {2}}\n\
                        {2}: {a -> {2, 3}, b -> {3}}\n\
                        {2, 3}: {a -> {1, 2, 3}, b -> {3}}\n\
                        {3}: {a -> {1, 3}, b -> {}}";
        assert_eq!(dfa.to_string(), expected);
    }

    #[test]
    fn test_prune_keeps_labels_aligned() {
        let full = sipser().to_dfa(&ConstructionConfig::default()).unwrap();
        let pruned = full.prune();

        assert_eq!(pruned.states().len(), 6);
        assert_eq!(pruned.start(), Some(&subset(&["1", "3"])));
        for (id, label) in pruned.states().iter().enumerate() {
            let nfa_states = pruned.dfa().nfa_states(id as StateId).unwrap();
            assert_eq!(nfa_states.len(), label.0.len());
        }
        for input in ["", "a", "b", "baba", "babba", "aab", "bab"] {
            assert_eq!(pruned.accepts(input.chars()), full.accepts(input.chars()));
        }
    }

    #[test]
    fn test_build_rejects_undeclared_labels() {
        let err = NfaBuilder::<&str, char>::new()
            .states(["p"])
            .alphabet(['x'])
            .transition("p", Edge::Symbol('x'), ["q"])
            .start("p")
            .build()
            .unwrap_err();
        assert_eq!(err, AutomatonError::UnknownState("\"q\"".to_string()));

        let err = NfaBuilder::<&str, char>::new()
            .states(["p"])
            .alphabet(['x'])
            .transition("p", Edge::Symbol('y'), ["p"])
            .start("p")
            .build()
            .unwrap_err();
        assert_eq!(err, AutomatonError::UnknownSymbol("'y'".to_string()));

        let err = NfaBuilder::<&str, char>::new()
            .states(["p"])
            .build()
            .unwrap_err();
        assert_eq!(err, AutomatonError::MissingStartState);
    }

    #[test]
    fn test_dfa_builder_regression() {
        let mut builder = DfaBuilder::new()
            .states(["a", "b", "c", "d"])
            .alphabet(['0', '1'])
            .start("a")
            .accept(["d"]);
        for (state, on_zero, on_one) in [
            ("a", "b", "a"),
            ("b", "c", "a"),
            ("c", "c", "d"),
            ("d", "d", "d"),
        ] {
            builder = builder
                .transition(state, '0', on_zero)
                .transition(state, '1', on_one);
        }
        let dfa = builder.build().unwrap();

        assert!(dfa.accepts("1110100111010111011".chars()));
        assert!(!dfa.accepts("0101".chars()));
        assert!(!dfa.accepts("0012".chars()));
        assert_eq!(
            dfa.to_string(),
            "a: {0 -> b, 1 -> a}\nb: {0 -> c, 1 -> a}\nc: {0 -> c, 1 -> d}\nd: {0 -> d, 1 -> d}"
        );
    }

    #[test]
    fn test_dfa_builder_rejects_conflicting_targets() {
        let err = DfaBuilder::new()
            .states(["a", "b"])
            .alphabet(['0'])
            .transition("a", '0', "a")
            .transition("a", '0', "b")
            .transition("b", '0', "b")
            .start("a")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            AutomatonError::ConflictingTransition {
                state: "\"a\"".to_string(),
                symbol: "'0'".to_string()
            }
        );

        // Repeating the same move is not a conflict.
        let dfa = DfaBuilder::new()
            .states(["a"])
            .alphabet(['0'])
            .transition("a", '0', "a")
            .transition("a", '0', "a")
            .start("a")
            .accept(["a"])
            .build()
            .unwrap();
        assert!(dfa.accepts("00".chars()));
    }

    #[test]
    fn test_dfa_builder_requires_total_function() {
        let err = DfaBuilder::new()
            .states(["a", "b"])
            .alphabet(['0'])
            .transition("a", '0', "b")
            .start("a")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            AutomatonError::UndefinedTransition {
                state: 1,
                symbol: 0
            }
        );
    }
}
