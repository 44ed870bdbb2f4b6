//! Conversion of nondeterministic finite automata with epsilon moves into
//! equivalent deterministic automata, by the powerset construction.
//!
//! ```
//! use powerset::{ConstructionConfig, Edge, LabeledNfa};
//!
//! let nfa = LabeledNfa::builder()
//!     .states(["1", "2"])
//!     .alphabet(['a'])
//!     .transition("1", Edge::Symbol('a'), ["2"])
//!     .epsilon("2", "1")
//!     .start("1")
//!     .accept(["2"])
//!     .build()?;
//! let dfa = nfa.to_dfa(&ConstructionConfig::default())?;
//! assert!(dfa.accepts("aaa".chars()));
//! assert!(!dfa.accepts("".chars()));
//! # Ok::<(), powerset::AutomatonError>(())
//! ```

pub mod automaton;
pub mod config;
pub mod error;

pub use automaton::{
    DFA, DfaBuilder, Edge, EpsilonNFA, LabeledDfa, LabeledNfa, NfaBuilder, Subset,
    reachable_subset_construction, subset_construction,
};
pub use config::ConstructionConfig;
pub use error::{AutomatonError, Result};
