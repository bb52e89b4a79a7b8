use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::error::{Error, Result};

/// The input symbols an expression may match, in the order the subset
/// construction visits them.
pub const ALPHABET: [char; 2] = ['a', 'b'];

lazy_static! {
    static ref PRECEDENCE: HashMap<char, u8> = {
        let mut precedence = HashMap::new();
        precedence.insert('*', 3);
        precedence.insert('.', 2);
        precedence.insert('|', 1);
        precedence
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Literal(char),
    Star,
    Concat,
    Union,
}

impl Token {
    fn operator(c: char) -> Option<Token> {
        match c {
            '*' => Some(Token::Star),
            '.' => Some(Token::Concat),
            '|' => Some(Token::Union),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Token::Literal(c) => c,
            Token::Star => '*',
            Token::Concat => '.',
            Token::Union => '|',
        }
    }

    fn precedence(self) -> u8 {
        PRECEDENCE.get(&self.as_char()).copied().unwrap_or(0)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

pub fn postfix_string(tokens: &[Token]) -> String {
    tokens.iter().map(|token| token.as_char()).collect()
}

enum Pending {
    Open(usize),
    Operator(Token),
}

fn is_literal(c: char) -> bool {
    ALPHABET.contains(&c)
}

fn ends_operand(c: char) -> bool {
    is_literal(c) || c == ')' || c == '*'
}

fn begins_operand(c: char) -> bool {
    is_literal(c) || c == '('
}

/// Makes concatenation explicit: a `.` goes between every adjacent pair
/// where the left side closes an operand and the right side opens one.
/// Each character keeps its offset in the source; an inserted `.` takes
/// the offset of the character after it.
fn insert_concatenation(regex: &str) -> Result<Vec<(usize, char)>> {
    let mut chars = Vec::with_capacity(regex.len() * 2);
    let mut prev: Option<char> = None;
    for (pos, c) in regex.chars().enumerate() {
        if !is_literal(c) && !"()|*".contains(c) {
            return Err(Error::UnexpectedCharacter { ch: c, pos });
        }
        if let Some(p) = prev {
            if ends_operand(p) && begins_operand(c) {
                chars.push((pos, '.'));
            }
        }
        chars.push((pos, c));
        prev = Some(c);
    }
    Ok(chars)
}

/// Rewrites an infix expression over `a`/`b` into postfix order.
///
/// An empty expression yields an empty token list; the NFA builder
/// rejects it.
pub fn to_postfix(regex: &str) -> Result<Vec<Token>> {
    let mut output = Vec::new();
    let mut stack: Vec<Pending> = Vec::new();

    for (pos, c) in insert_concatenation(regex)? {
        match c {
            '(' => stack.push(Pending::Open(pos)),
            ')' => loop {
                match stack.pop() {
                    Some(Pending::Operator(op)) => output.push(op),
                    Some(Pending::Open(_)) => break,
                    None => return Err(Error::MalformedExpression { pos }),
                }
            },
            c if is_literal(c) => output.push(Token::Literal(c)),
            c => {
                let op = Token::operator(c).ok_or(Error::UnexpectedCharacter { ch: c, pos })?;
                while let Some(&Pending::Operator(top)) = stack.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    output.push(top);
                    stack.pop();
                }
                stack.push(Pending::Operator(op));
            }
        }
    }

    while let Some(pending) = stack.pop() {
        match pending {
            Pending::Operator(op) => output.push(op),
            Pending::Open(pos) => return Err(Error::MalformedExpression { pos }),
        }
    }

    debug!("{:?} -> postfix {:?}", regex, postfix_string(&output));
    Ok(output)
}

#[test]
fn postfix_concat() {
    let postfix = to_postfix("ab").unwrap();
    assert_eq!(postfix_string(&postfix), "ab.");
}

#[test]
fn postfix_union() {
    let postfix = to_postfix("a|b").unwrap();
    assert_eq!(postfix_string(&postfix), "ab|");
}

#[test]
fn postfix_precedence() {
    let postfix = to_postfix("a|bb*").unwrap();
    assert_eq!(postfix_string(&postfix), "abb*.|");
    let postfix = to_postfix("ab|b").unwrap();
    assert_eq!(postfix_string(&postfix), "ab.b|");
}

#[test]
fn postfix_star_then_literal() {
    let postfix = to_postfix("(a|b)*abb").unwrap();
    assert_eq!(postfix_string(&postfix), "ab|*a.b.b.");
    let postfix = to_postfix("a*b").unwrap();
    assert_eq!(postfix_string(&postfix), "a*b.");
}

#[test]
fn postfix_groups() {
    let postfix = to_postfix("(ab)(ba)").unwrap();
    assert_eq!(postfix_string(&postfix), "ab.ba..");
}

#[test]
fn postfix_empty() {
    assert!(to_postfix("").unwrap().is_empty());
}

#[test]
fn postfix_unbalanced() {
    assert_eq!(
        to_postfix("(a|b"),
        Err(Error::MalformedExpression { pos: 0 })
    );
    assert_eq!(to_postfix(")a("), Err(Error::MalformedExpression { pos: 0 }));
    assert_eq!(to_postfix("ab)"), Err(Error::MalformedExpression { pos: 2 }));
}

#[test]
fn postfix_foreign_character() {
    assert_eq!(
        to_postfix("ac"),
        Err(Error::UnexpectedCharacter { ch: 'c', pos: 1 })
    );
    assert_eq!(
        to_postfix("a.b"),
        Err(Error::UnexpectedCharacter { ch: '.', pos: 1 })
    );
}
