//! Template expression parsing: lexer, recursive descent parser and AST.

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::*;
pub use lexer::Lexer;
pub use parser::Parser;
