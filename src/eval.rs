//! Scalar expression evaluator.
//!
//! Resolves literal expressions (casts, quoted strings, hex and Unicode
//! literals, typed date/time literals) and the fixed set of ODBC scalar
//! functions used by literal SELECTs and `{fn ...}` escapes.

mod function;
mod literal;

pub use function::{MOCK_DATABASE, MOCK_USER, evaluate_scalar_function, is_known_function};
pub use literal::{LiteralValue, MOCK_GUID, coerce, parse_literal, parse_number, unquote};
