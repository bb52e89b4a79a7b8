use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    #[error("unbalanced parenthesis at position {pos}")]
    MalformedExpression { pos: usize },
    #[error("unexpected character {ch:?} at position {pos}")]
    UnexpectedCharacter { ch: char, pos: usize },
    #[error("operator is missing an operand")]
    EmptyStack,
    #[error("expression left {count} unjoined fragments")]
    UnconsumedFragments { count: usize },
}
