mod error;
mod grammar;

pub use error::ParseError;

use crate::types::Expr;

/// Parse a decision expression into an [`Expr`] AST.
///
/// The grammar is closed (field paths, literals, comparisons, boolean
/// connectives); anything else fails here rather than reaching evaluation.
///
/// # Errors
///
/// Returns [`ParseError`] with the offending offset if the input is not a
/// valid expression.
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    use winnow::Parser;
    grammar::expression
        .parse(input)
        .map_err(|e| ParseError::new(e.inner().to_string(), e.offset()))
}
