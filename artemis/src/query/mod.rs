//! Query descriptors and the method-name translator.
//!
//! Repository methods named `findBy…` and `deleteBy…` are translated by
//! [QueryParser] into [Query] and [DeleteQuery] descriptors that stores
//! execute. Methods carrying a [LiteralQuery] bypass the translator.

mod condition;
mod literal;
mod parser;
#[allow(clippy::module_inception)]
mod query;
mod tokenizer;

pub use condition::*;
pub use literal::*;
pub use parser::*;
pub use query::*;
pub use tokenizer::split_words;
