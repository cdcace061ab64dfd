//! Syntax layer for gqlapi.
//!
//! This crate provides:
//! - `token`: Token kinds and token structures
//! - `lexer`: Tokenization
//! - `ast`: Abstract syntax tree types
//! - `parser`: Recursive descent parser
//!
//! One grammar covers both schema documents and executable documents.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::*;
pub use lexer::Lexer;
pub use parser::{parse, ParseResult};
pub use token::{DirectiveLocation, Token, TokenKind};
