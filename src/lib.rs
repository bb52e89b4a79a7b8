//! Regular expressions over `{a, b}` compiled to DFAs: infix to postfix,
//! Thompson construction, then subset construction.

#[macro_use]
extern crate lazy_static;

pub mod dfa;
mod error;
pub mod nfa;
pub mod pda;
pub mod postfix;

pub use crate::dfa::Dfa;
pub use crate::error::{Error, Result};
pub use crate::nfa::{Nfa, StateSet};
pub use crate::pda::is_odd_palindrome;
pub use crate::postfix::{to_postfix, Token, ALPHABET};

pub fn regex_to_dfa(regex: &str) -> Result<Dfa> {
    let nfa = Nfa::re2nfa(regex)?;
    Ok(Dfa::nfa2dfa(&nfa))
}
