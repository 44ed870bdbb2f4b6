//! Runs the textbook examples through the subset construction and prints the
//! results. Set `RUST_LOG=debug` to see construction details.

use anyhow::Result;
use log::info;
use powerset::{ConstructionConfig, DfaBuilder, Edge, LabeledNfa};

fn main() -> Result<()> {
    env_logger::init();

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
    let dfa = builder.build()?;
    println!("{}", dfa.accepts("1110100111010111011".chars()));

    // Sipser, example 1.16.
    let nfa = LabeledNfa::builder()
        .states(["1", "2", "3"])
        .alphabet(['a', 'b'])
        .transition("1", Edge::Symbol('b'), ["2"])
        .epsilon("1", "3")
        .transition("2", Edge::Symbol('a'), ["2", "3"])
        .transition("2", Edge::Symbol('b'), ["3"])
        .transition("3", Edge::Symbol('a'), ["1", "3"])
        .start("1")
        .accept(["1"])
        .build()?;
    let dfa = nfa.to_dfa(&ConstructionConfig::default())?;
    info!("derived DFA has {} states", dfa.states().len());

    println!("These should be true.");
    for input in ["", "a", "baba", "baa"] {
        println!("{}", dfa.accepts(input.chars()));
    }
    println!("These should be false.");
    for input in ["b", "bb", "babba"] {
        println!("{}", dfa.accepts(input.chars()));
    }

    println!("This is the original NFA.");
    println!("{nfa}");
    println!("This is the converted DFA.");
    println!("{dfa}");
    println!("Now with the inaccessible states cut.");
    println!("{}", dfa.prune());

    Ok(())
}
