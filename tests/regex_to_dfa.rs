#[macro_use]
extern crate quickcheck;

use std::thread;

use re2dfa::{regex_to_dfa, Error, Nfa, StateSet};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn ab_string(bits: &[bool]) -> String {
    bits.iter().map(|&bit| if bit { 'a' } else { 'b' }).collect()
}

#[test]
fn ends_with_abb() {
    init();
    let dfa = regex_to_dfa("(a|b)*abb").unwrap();
    assert!(dfa.accepts("aabb"));
    assert!(!dfa.accepts("ababa"));
    assert!(dfa.accepts("abb"));
    assert!(!dfa.accepts("a"));
    assert!(!dfa.accepts(""));
    assert!(dfa.accepts("bbbabb"));
    assert!(!dfa.accepts("abba"));
}

#[test]
fn single_literal() {
    let dfa = regex_to_dfa("a").unwrap();
    assert!(dfa.accepts("a"));
    assert!(!dfa.accepts(""));
    assert!(!dfa.accepts("aa"));
}

#[test]
fn star() {
    let dfa = regex_to_dfa("a*").unwrap();
    assert!(dfa.accepts(""));
    assert!(dfa.accepts("aaaa"));
    assert!(!dfa.accepts("aab"));
}

#[test]
fn union() {
    let dfa = regex_to_dfa("a|b").unwrap();
    assert!(dfa.accepts("a"));
    assert!(dfa.accepts("b"));
    assert!(!dfa.accepts("ab"));
}

#[test]
fn nested_groups() {
    let dfa = regex_to_dfa("(ab|b)*a").unwrap();
    assert!(dfa.accepts("a"));
    assert!(dfa.accepts("abba"));
    assert!(dfa.accepts("bba"));
    assert!(!dfa.accepts("aa"));
    assert!(!dfa.accepts("ab"));
}

#[test]
fn malformed_expressions() {
    assert!(regex_to_dfa("(a|b)").is_ok());
    assert_eq!(
        regex_to_dfa("(a|b").unwrap_err(),
        Error::MalformedExpression { pos: 0 }
    );
    assert!(matches!(
        regex_to_dfa(")a(").unwrap_err(),
        Error::MalformedExpression { .. }
    ));
    assert_eq!(regex_to_dfa("a||b").unwrap_err(), Error::EmptyStack);
    assert_eq!(regex_to_dfa("").unwrap_err(), Error::EmptyStack);
    assert_eq!(
        regex_to_dfa("ax").unwrap_err(),
        Error::UnexpectedCharacter { ch: 'x', pos: 1 }
    );
}

#[test]
fn error_messages() {
    assert_eq!(
        Error::MalformedExpression { pos: 3 }.to_string(),
        "unbalanced parenthesis at position 3"
    );
    assert_eq!(Error::EmptyStack.to_string(), "operator is missing an operand");
}

#[test]
fn shared_across_threads() {
    let dfa = regex_to_dfa("(a|b)*abb").unwrap();
    let inputs = ["abb", "babb", "ab", "bbbb"];
    thread::scope(|s| {
        for &input in &inputs {
            let dfa = &dfa;
            s.spawn(move || {
                assert_eq!(dfa.accepts(input), input.ends_with("abb"));
            });
        }
    });
}

quickcheck! {
    fn suffix_abb(bits: Vec<bool>) -> bool {
        let input = ab_string(&bits);
        let dfa = regex_to_dfa("(a|b)*abb").unwrap();
        dfa.accepts(&input) == input.ends_with("abb")
    }

    fn rebuild_agrees(bits: Vec<bool>) -> bool {
        let input = ab_string(&bits);
        let first = regex_to_dfa("(ab|b*)*a(a|b)").unwrap();
        let second = regex_to_dfa("(ab|b*)*a(a|b)").unwrap();
        first.accepts(&input) == second.accepts(&input)
    }

    fn closure_idempotent(seeds: Vec<u8>) -> bool {
        let nfa = Nfa::re2nfa("((a|b)*ab|b)*").unwrap();
        let set: StateSet = seeds.iter().map(|&s| s as usize % nfa.len()).collect();
        let once = nfa.epsilon_closure(&set);
        nfa.epsilon_closure(&once) == once && set.is_subset(&once)
    }
}
