use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::iter::FromIterator;
use std::ops::{Deref, DerefMut};
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::postfix::{self, Token};

#[derive(Debug)]
pub struct State {
    pub transitions: HashMap<char, StateSet>,
    pub epsilon_transitions: StateSet,
    pub id: usize,
    pub accept: bool,
}

/// A piece of automaton under construction: one entry, one exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fragment {
    start: usize,
    end: usize,
}

/// A Thompson NFA. States live in an arena and refer to each other by
/// index, so back edges from `*` need no shared ownership.
#[derive(Debug)]
pub struct Nfa {
    pub states: Vec<State>,
    start: usize,
    end: usize,
}

impl Nfa {
    pub fn re2nfa(regex: &str) -> Result<Nfa> {
        let postfix = postfix::to_postfix(regex)?;
        Nfa::from_postfix(&postfix)
    }

    pub fn from_postfix(postfix: &[Token]) -> Result<Nfa> {
        let mut nfa = Nfa {
            states: Vec::new(),
            start: 0,
            end: 0,
        };
        let mut stack: Vec<Fragment> = Vec::new();

        for &token in postfix {
            let fragment = match token {
                Token::Literal(c) => {
                    let start = nfa.add_state(false);
                    let end = nfa.add_state(true);
                    nfa.add_transition(start, c, end);
                    Fragment { start, end }
                }
                Token::Star => {
                    let inner = stack.pop().ok_or(Error::EmptyStack)?;
                    let start = nfa.add_state(false);
                    let end = nfa.add_state(true);
                    nfa.add_epsilon_transition(start, inner.start);
                    nfa.add_epsilon_transition(start, end);
                    nfa.add_epsilon_transition(inner.end, inner.start);
                    nfa.add_epsilon_transition(inner.end, end);
                    nfa.states[inner.end].accept = false;
                    Fragment { start, end }
                }
                Token::Concat => {
                    let rhs = stack.pop().ok_or(Error::EmptyStack)?;
                    let lhs = stack.pop().ok_or(Error::EmptyStack)?;
                    nfa.add_epsilon_transition(lhs.end, rhs.start);
                    nfa.states[lhs.end].accept = false;
                    Fragment {
                        start: lhs.start,
                        end: rhs.end,
                    }
                }
                Token::Union => {
                    let rhs = stack.pop().ok_or(Error::EmptyStack)?;
                    let lhs = stack.pop().ok_or(Error::EmptyStack)?;
                    let start = nfa.add_state(false);
                    let end = nfa.add_state(true);
                    nfa.add_epsilon_transition(start, lhs.start);
                    nfa.add_epsilon_transition(start, rhs.start);
                    nfa.add_epsilon_transition(lhs.end, end);
                    nfa.add_epsilon_transition(rhs.end, end);
                    nfa.states[lhs.end].accept = false;
                    nfa.states[rhs.end].accept = false;
                    Fragment { start, end }
                }
            };
            stack.push(fragment);
        }

        let whole = stack.pop().ok_or(Error::EmptyStack)?;
        if !stack.is_empty() {
            return Err(Error::UnconsumedFragments {
                count: stack.len() + 1,
            });
        }
        nfa.start = whole.start;
        nfa.end = whole.end;
        debug!(
            "built nfa with {} states (start s{}, accept s{})",
            nfa.states.len(),
            nfa.start,
            nfa.end
        );
        Ok(nfa)
    }

    fn add_state(&mut self, accept: bool) -> usize {
        let id = self.states.len();
        self.states.push(State {
            transitions: HashMap::new(),
            epsilon_transitions: StateSet::new(),
            id,
            accept,
        });
        id
    }

    fn add_transition(&mut self, from: usize, symbol: char, to: usize) {
        self.states[from]
            .transitions
            .entry(symbol)
            .or_insert_with(StateSet::new)
            .insert(to);
    }

    fn add_epsilon_transition(&mut self, from: usize, to: usize) {
        self.states[from].epsilon_transitions.insert(to);
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, id: usize) -> Option<&State> {
        self.states.get(id)
    }

    pub fn accepting_states(&self) -> StateSet {
        self.states
            .iter()
            .filter(|state| state.accept)
            .map(|state| state.id)
            .collect()
    }

    /// Every state reachable from `state_set` through epsilon edges alone,
    /// `state_set` included.
    pub fn epsilon_closure(&self, state_set: &StateSet) -> StateSet {
        let mut queue = state_set.iter().cloned().collect::<Vec<usize>>();
        let mut done = state_set.clone();
        while let Some(state_id) = queue.pop() {
            for &next_state_id in self.states[state_id].epsilon_transitions.iter() {
                if done.insert(next_state_id) {
                    queue.push(next_state_id);
                }
            }
        }
        done
    }

    /// The states one `symbol` edge away from `state_set`. Epsilon edges are
    /// not followed.
    pub fn move_on_symbol(&self, state_set: &StateSet, symbol: char) -> StateSet {
        let mut reached = StateSet::new();
        for &id in state_set.iter() {
            if let Some(targets) = self.states[id].transitions.get(&symbol) {
                reached.extend(targets.iter().cloned());
            }
        }
        reached
    }

    pub fn dot(&self) -> String {
        let mut dot = r###"
digraph G {
rankdir=LR;
empty [label = "" shape = plaintext];
"###
        .to_owned();

        let mut ac_state_dot = "node [shape = doublecircle]".to_owned();
        for ac_state in self.states.iter().filter(|&state| state.accept) {
            ac_state_dot.push_str(&format!(" s{}", ac_state.id));
        }
        dot.push_str(&(ac_state_dot + ";\n"));
        dot.push_str(&format!(
            "node [shape = circle];\nempty -> s{} [label = \"start\"];\n",
            self.start
        ));

        for state in self.states.iter() {
            let mut labels: Vec<_> = state.transitions.iter().collect();
            labels.sort_by_key(|&(label, _)| *label);
            for (label, t_state_set) in labels {
                for t_state in t_state_set.iter() {
                    dot.push_str(&format!(
                        "s{} -> s{} [label = \"{}\"];\n",
                        state.id, t_state, label
                    ));
                }
            }
            for et_state in state.epsilon_transitions.iter() {
                dot.push_str(&format!(
                    "s{} -> s{} [label = \"ε\"];\n",
                    state.id, et_state
                ));
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

/// A set of NFA state ids. Ordered, so two sets holding the same states
/// compare and hash the same no matter how they were filled.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateSet(pub BTreeSet<usize>);

impl Deref for StateSet {
    type Target = BTreeSet<usize>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for StateSet {
    fn deref_mut(&mut self) -> &mut BTreeSet<usize> {
        &mut self.0
    }
}

impl FromIterator<usize> for StateSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        StateSet(iter.into_iter().collect())
    }
}

impl StateSet {
    pub fn new() -> StateSet {
        StateSet(BTreeSet::new())
    }

    pub fn singleton(id: usize) -> StateSet {
        let mut set = StateSet::new();
        set.insert(id);
        set
    }
}

#[cfg(test)]
fn state_set(ids: &[usize]) -> StateSet {
    ids.iter().cloned().collect()
}

#[test]
fn nfa_literal() {
    let nfa = Nfa::re2nfa("a").unwrap();
    assert_eq!(nfa.len(), 2);
    assert_eq!(nfa.accepting_states(), state_set(&[nfa.end()]));
    let reached = nfa.move_on_symbol(&StateSet::singleton(nfa.start()), 'a');
    assert_eq!(reached, state_set(&[nfa.end()]));
    assert!(nfa
        .move_on_symbol(&StateSet::singleton(nfa.start()), 'b')
        .is_empty());
}

#[test]
fn nfa_single_accepting_state() {
    for regex in &["ab", "a|b", "a*", "(a|b)*abb", "((ab)*|b)*a"] {
        let nfa = Nfa::re2nfa(regex).unwrap();
        assert_eq!(nfa.accepting_states(), state_set(&[nfa.end()]), "{}", regex);
    }
}

#[test]
fn nfa_star_topology() {
    let nfa = Nfa::re2nfa("a*").unwrap();
    // inner literal is s0 -a-> s1, the star adds s2 (start) and s3 (end)
    assert_eq!(nfa.len(), 4);
    assert_eq!(nfa.start(), 2);
    assert_eq!(nfa.end(), 3);
    assert_eq!(nfa.states[2].epsilon_transitions, state_set(&[0, 3]));
    assert_eq!(nfa.states[1].epsilon_transitions, state_set(&[0, 3]));
    assert!(!nfa.states[1].accept);
}

#[test]
fn nfa_epsilon_closure() {
    let nfa = Nfa::re2nfa("a*").unwrap();
    let closure = nfa.epsilon_closure(&StateSet::singleton(nfa.start()));
    assert_eq!(closure, state_set(&[0, 2, 3]));
    let after_a = nfa.epsilon_closure(&nfa.move_on_symbol(&closure, 'a'));
    assert_eq!(after_a, state_set(&[0, 1, 3]));
}

#[test]
fn nfa_epsilon_closure_idempotent() {
    let nfa = Nfa::re2nfa("(a|b)*abb").unwrap();
    for id in 0..nfa.len() {
        let once = nfa.epsilon_closure(&StateSet::singleton(id));
        let twice = nfa.epsilon_closure(&once);
        assert_eq!(once, twice);
        assert!(once.contains(&id));
    }
}

#[test]
fn nfa_move_ignores_epsilon() {
    let nfa = Nfa::re2nfa("a|b").unwrap();
    assert!(nfa
        .move_on_symbol(&StateSet::singleton(nfa.start()), 'a')
        .is_empty());
    assert!(nfa.move_on_symbol(&StateSet::new(), 'a').is_empty());
}

#[test]
fn nfa_missing_operand() {
    assert_eq!(Nfa::re2nfa("").unwrap_err(), Error::EmptyStack);
    assert_eq!(Nfa::re2nfa("*").unwrap_err(), Error::EmptyStack);
    assert_eq!(Nfa::re2nfa("a|").unwrap_err(), Error::EmptyStack);
    assert_eq!(Nfa::re2nfa("()").unwrap_err(), Error::EmptyStack);
}

#[test]
fn nfa_unconsumed_fragments() {
    let postfix = [Token::Literal('a'), Token::Literal('b')];
    assert_eq!(
        Nfa::from_postfix(&postfix).unwrap_err(),
        Error::UnconsumedFragments { count: 2 }
    );
}

#[test]
fn nfa_dot() {
    let nfa = Nfa::re2nfa("a").unwrap();
    let dot = nfa.dot();
    assert!(dot.contains("empty -> s0 [label = \"start\"];"));
    assert!(dot.contains("s0 -> s1 [label = \"a\"];"));
    assert!(dot.contains("node [shape = doublecircle] s1;"));
}
