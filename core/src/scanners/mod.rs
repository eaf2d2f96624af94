/// Text scanners for catalog sources
///
/// `block` finds the translation object inside a source file, `literal`
/// parses that object into JSON values.
pub mod block;
pub mod literal;

pub use block::{locate_block, BlockError, BlockSpan};
pub use literal::LiteralError;
