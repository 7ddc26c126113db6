//! The two-pass assembler: tokenizer plus deferred label binding.

mod assembler;
mod tokenizer;

pub use assembler::assemble;
pub use tokenizer::{Token, strip_comment, tokenize};
