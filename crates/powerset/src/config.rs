//! Options for the subset construction.

/// Largest NFA whose powerset still fits in `u32` DFA state ids.
pub const MAX_POWERSET_STATES: usize = 31;

/// Tuning for [`subset_construction`](crate::automaton::subset_construction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstructionConfig {
    /// Largest NFA accepted by the full powerset construction. The derived
    /// DFA has `2^max_nfa_states` states, so keep this small.
    pub max_nfa_states: usize,
    /// Drop states unreachable from the start state after construction.
    pub prune: bool,
}

impl ConstructionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the state limit, clamped to [`MAX_POWERSET_STATES`].
    pub fn with_max_nfa_states(mut self, max_nfa_states: usize) -> Self {
        self.max_nfa_states = max_nfa_states.min(MAX_POWERSET_STATES);
        self
    }

    pub fn with_prune(mut self, prune: bool) -> Self {
        self.prune = prune;
        self
    }
}

impl Default for ConstructionConfig {
    fn default() -> Self {
        Self {
            max_nfa_states: 16,
            prune: false,
        }
    }
}
