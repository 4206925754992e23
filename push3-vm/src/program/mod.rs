//! Program toolkit: S-expression source, syntax tree, bytecode writer and
//! listings.

mod ast;
mod listing;
mod sexpr;

pub use ast::Ast;
pub use listing::{listing, to_sexpr, ListingEntry};
pub use sexpr::read_sexpr;

use anyhow::Result;

/// Source text straight to program bytes.
pub fn assemble(text: &str) -> Result<Vec<u8>> {
    read_sexpr(text)?.to_bytecode()
}
