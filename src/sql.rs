//! SQL classification module.
//!
//! This module rewrites ODBC escape sequences and classifies statements into
//! the [`ParsedQuery`] shape consumed by the executor.

mod error;
mod escape;
mod lexer;
mod parser;
mod query;
mod token;

pub use error::{Span, SyntaxError};
pub use escape::{count_parameters, preprocess, split_statements, split_top_level};
pub use lexer::Lexer;
pub use parser::{Parser, parse_sql};
pub use query::*;
pub use token::{Keyword, Token, TokenKind};
