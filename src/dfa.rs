use std::collections::HashMap;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::{debug, trace};

use crate::nfa::{Nfa, StateSet};
use crate::postfix::ALPHABET;

/// Index of `symbol` in the transition table, if it belongs to the alphabet.
fn symbol_index(symbol: char) -> Option<usize> {
    ALPHABET.iter().position(|&c| c == symbol)
}

/// A DFA produced by subset construction. State `0` is the start state;
/// a missing table entry means the input is rejected.
#[derive(Debug, Clone)]
pub struct Dfa {
    transitions: Vec<[Option<usize>; ALPHABET.len()]>,
    init_state: usize,
    ac_state_set: StateSet,
    subsets: Vec<StateSet>,
}

impl Dfa {
    pub fn nfa2dfa(nfa: &Nfa) -> Self {
        Dfa::construct(nfa)
    }

    fn construct(nfa: &Nfa) -> Self {
        let init_state_set = nfa.epsilon_closure(&StateSet::singleton(nfa.start()));

        let mut state_set_to_id = HashMap::new();
        state_set_to_id.insert(init_state_set.clone(), 0);
        let mut subsets = vec![init_state_set.clone()];
        let mut transitions = vec![[None; ALPHABET.len()]];
        let mut unmarked = vec![init_state_set];

        while let Some(current) = unmarked.pop() {
            let current_id = state_set_to_id[&current];
            for (index, &symbol) in ALPHABET.iter().enumerate() {
                let target = nfa.epsilon_closure(&nfa.move_on_symbol(&current, symbol));
                if target.is_empty() {
                    continue;
                }
                let target_id = match state_set_to_id.get(&target) {
                    Some(&id) => id,
                    None => {
                        let id = subsets.len();
                        trace!("d{} = {:?} (from d{} on {:?})", id, target.0, current_id, symbol);
                        state_set_to_id.insert(target.clone(), id);
                        subsets.push(target.clone());
                        transitions.push([None; ALPHABET.len()]);
                        unmarked.push(target);
                        id
                    }
                };
                transitions[current_id][index] = Some(target_id);
            }
        }

        let nfa_ac_states = nfa.accepting_states();
        let ac_state_set = subsets
            .iter()
            .enumerate()
            .filter(|(_, subset)| !subset.is_disjoint(&nfa_ac_states))
            .map(|(id, _)| id)
            .collect::<StateSet>();

        debug!(
            "subset construction: {} nfa states -> {} dfa states ({} accepting)",
            nfa.len(),
            subsets.len(),
            ac_state_set.len()
        );

        Dfa {
            transitions,
            init_state: 0,
            ac_state_set,
            subsets,
        }
    }

    pub fn accepts(&self, s: &str) -> bool {
        let mut state = self.init_state;
        for c in s.chars() {
            let next = symbol_index(c).and_then(|index| self.transitions[state][index]);
            match next {
                Some(next_state) => state = next_state,
                None => return false,
            }
        }
        self.ac_state_set.contains(&state)
    }

    pub fn start_state(&self) -> usize {
        self.init_state
    }

    pub fn num_states(&self) -> usize {
        self.transitions.len()
    }

    pub fn transition(&self, state: usize, symbol: char) -> Option<usize> {
        let index = symbol_index(symbol)?;
        self.transitions.get(state)?[index]
    }

    pub fn accepting_states(&self) -> &StateSet {
        &self.ac_state_set
    }

    pub fn is_accepting(&self, state: usize) -> bool {
        self.ac_state_set.contains(&state)
    }

    /// The NFA states that DFA state `state` stands for.
    pub fn subset(&self, state: usize) -> Option<&StateSet> {
        self.subsets.get(state)
    }

    pub fn dot(&self) -> String {
        let mut dot = r###"
digraph G {
rankdir=LR;
empty [label = "" shape = plaintext];
"###
        .to_owned();
        let mut ac_state_dot = "node [shape = doublecircle]".to_owned();

        for ac_state in self.ac_state_set.iter() {
            ac_state_dot.push_str(&format!(" s{}", ac_state));
        }
        ac_state_dot.push_str(";\n");
        dot.push_str(&ac_state_dot);
        dot.push_str(&format!(
            "node [shape = circle];\nempty -> s{} [label = \"start\"];\n",
            self.init_state
        ));
        for (state, row) in self.transitions.iter().enumerate() {
            for (label, t_state) in ALPHABET.iter().zip(row.iter()) {
                if let Some(t_state) = t_state {
                    dot.push_str(&format!(
                        "s{} -> s{} [label = \"{}\"];\n",
                        state, t_state, label
                    ));
                }
            }
        }
        dot.push('}');
        dot
    }

    pub fn write<P: AsRef<Path>>(&self, file_name: P) -> io::Result<()> {
        let mut f = BufWriter::new(fs::File::create(file_name)?);
        f.write_all(self.dot().as_bytes())?;
        f.flush()
    }
}

#[cfg(test)]
fn build(regex: &str) -> Dfa {
    let nfa = Nfa::re2nfa(regex).unwrap();
    Dfa::nfa2dfa(&nfa)
}

#[test]
fn regex_accept_char() {
    let dfa = build("a");
    assert!(dfa.accepts("a"));
    assert!(!dfa.accepts(""));
    assert!(!dfa.accepts("aa"));
    assert!(!dfa.accepts("b"));
}

#[test]
fn regex_accept_union() {
    let dfa = build("a|b");
    assert!(dfa.accepts("a"));
    assert!(dfa.accepts("b"));
    assert!(!dfa.accepts("ab"));
    assert!(!dfa.accepts(""));
}

#[test]
fn regex_accept_concat() {
    let dfa = build("ab");
    assert!(dfa.accepts("ab"));
    assert!(!dfa.accepts("a"));
    assert!(!dfa.accepts("ba"));
}

#[test]
fn regex_accept_star() {
    let dfa = build("a*");
    assert!(dfa.accepts(""));
    assert!(dfa.accepts("a"));
    assert!(dfa.accepts("aaaaaaaaaaaaaaaa"));
    assert!(!dfa.accepts("aab"));
}

#[test]
fn regex_accept_01() {
    let dfa = build("(a|b)b");
    assert!(dfa.accepts("ab"));
    assert!(dfa.accepts("bb"));
    assert!(!dfa.accepts("b"));
}

#[test]
fn regex_accept_02() {
    let dfa = build("a*b");
    assert!(dfa.accepts("b"));
    assert!(dfa.accepts("ab"));
    assert!(dfa.accepts("aaaaab"));
    assert!(!dfa.accepts("aaaaa"));
}

#[test]
fn regex_accept_03() {
    let dfa = build("(a|b)*");
    assert!(dfa.accepts(""));
    assert!(dfa.accepts("abbbbb"));
    assert!(dfa.accepts("aaaaab"));
    assert!(dfa.accepts("aaaaaaaaaaaaaaaa"));
}

#[test]
fn dfa_rejects_foreign_symbols() {
    let dfa = build("(a|b)*");
    assert!(!dfa.accepts("abc"));
    assert!(!dfa.accepts("é"));
    assert_eq!(dfa.transition(0, 'c'), None);
}

#[test]
fn dfa_numbering() {
    let dfa = build("ab");
    assert_eq!(dfa.start_state(), 0);
    assert_eq!(dfa.num_states(), 3);
    assert_eq!(dfa.transition(0, 'a'), Some(1));
    assert_eq!(dfa.transition(0, 'b'), None);
    assert_eq!(dfa.transition(1, 'b'), Some(2));
    assert_eq!(dfa.transition(7, 'a'), None);
    assert!(dfa.is_accepting(2));
    assert!(!dfa.is_accepting(0));
}

#[test]
fn dfa_subsets() {
    let nfa = Nfa::re2nfa("a*").unwrap();
    let dfa = Dfa::nfa2dfa(&nfa);
    let start = dfa.subset(dfa.start_state()).unwrap();
    assert_eq!(*start, nfa.epsilon_closure(&StateSet::singleton(nfa.start())));
    assert!(dfa.subset(dfa.num_states()).is_none());
}

#[test]
fn dfa_dot() {
    let dfa = build("ab");
    let dot = dfa.dot();
    assert!(dot.contains("node [shape = doublecircle] s2;"));
    assert!(dot.contains("empty -> s0 [label = \"start\"];"));
    assert!(dot.contains("s0 -> s1 [label = \"a\"];"));
    assert!(dot.contains("s1 -> s2 [label = \"b\"];"));
}
