//! CDL Core - front end for the Contract Declaration Language
//!
//! CDL describes behavioral interface contracts: a named contract built on a
//! base type, containing associated-type placeholders, data members, and
//! method signatures marked as required or defaulted. This crate turns a
//! contract source file into a syntax tree precise enough for a code-emission
//! stage to synthesize dispatch glue from it.
//!
//! # Architecture
//!
//! ```text
//! CDL Text → Tokenizer → Tokens → Parser → AST
//!                                            ↓
//!                                  (emission stage, external)
//! ```
//!
//! # Guarantees
//!
//! - **Deterministic**: same input always produces the same token stream
//!   and the same tree
//! - **Ordered**: contract members appear in the tree in declaration order
//! - **Fail-fast**: the first grammar violation aborts the parse with a
//!   typed error carrying the offending token index; no partial tree is
//!   ever returned
//!
//! The tree is textual: type expressions, argument lists, and bodies are
//! captured as literal token spans for the emission stage to echo back.
//! No semantic type resolution happens here.

pub mod ast;
pub mod error;
pub mod parser;
pub mod tokenizer;

pub use ast::*;
pub use error::{Error, Expected, Result};
pub use parser::{parse, Parser};
pub use tokenizer::{dump_tokens, tokenize, Token, TokenKind};
